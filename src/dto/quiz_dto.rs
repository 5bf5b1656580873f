use crate::models::session::QuizSession;
use crate::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(length(min = 5))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub subject: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertifiedSkill {
    pub skill_id: i64,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTypeCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub total_questions: usize,
    /// True only when exactly the full question set is persisted; a
    /// partial set in mid-generation never reports true.
    pub questions_generated: bool,
    pub question_types: QuestionTypeCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub question_id: Uuid,
    pub question_no: i32,
    pub question: String,
    pub code_snippet_image_link: Option<String>,
    pub has_code_snippet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartQuizResponse {
    pub user: User,
    pub certified_skill: CertifiedSkill,
    pub session: QuizSession,
    pub quiz: QuizSummary,
    pub first_question: Option<QuestionView>,
    pub question_added: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveAnswerRequest {
    pub session_id: Uuid,
    pub question_id: Uuid,
    #[validate(length(equal = 1))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAnswerResponse {
    /// "pending" while questions remain, "complete" after the last one.
    pub status: String,
    pub question: String,
    pub question_id: Option<Uuid>,
    pub question_no: Option<i32>,
    pub current_question_no: i32,
    pub total_questions: usize,
    pub scenario: String,
    pub code_snippet_image_link: Option<String>,
    pub has_code_snippet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub session_id: Uuid,
    pub score: i32,
    pub total_questions: usize,
    pub percentage: f64,
    pub category: String,
    pub completion_time: String,
    pub order_id: Option<String>,
}
