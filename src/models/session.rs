use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's attempt at one subject's quiz. A session carries either zero
/// or exactly ten question records once generation settles; counts of 1-9
/// only exist while a polling task is still reconciling the upstream set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub skill_id: i64,
    pub auth_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub quiz_completed: bool,
    pub quiz_analysis_generated: bool,
    pub started_quiz: bool,
    pub attempted: bool,
    pub paid: bool,
    pub order_id: Option<String>,
    pub score: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}
