pub mod answer_service;
pub mod certified_service;
pub mod extract_service;
pub mod generation_service;
pub mod result_service;
pub mod session_service;
