use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted, sequenced question belonging to a session. Created only by
/// the bulk insert of a complete ten-question set; mutated only by the
/// answer sequencer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub question_no: i32,
    pub question: String,
    pub correct_answer: String,
    pub answer: String,
    pub answered: bool,
    pub scenario: Option<String>,
    pub code_snippet_image: Option<String>,
    pub source_question_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}
