pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    answer_service::AnswerService, certified_service::CertifiedService,
    generation_service::GenerationService, result_service::ResultService,
    session_service::SessionService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub certified_service: CertifiedService,
    pub generation_service: GenerationService,
    pub session_service: SessionService,
    pub answer_service: AnswerService,
    pub result_service: ResultService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let certified_service = CertifiedService::new(config.certified_api_base_url.clone());
        let generation_service = GenerationService::new(pool.clone(), certified_service.clone());
        let session_service = SessionService::new(pool.clone());
        let answer_service = AnswerService::new(pool.clone());
        let result_service = ResultService::new(pool.clone(), certified_service.clone());

        Self {
            pool,
            certified_service,
            generation_service,
            session_service,
            answer_service,
            result_service,
        }
    }
}
