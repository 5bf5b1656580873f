use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use crate::services::extract_service::QuizVariant;
use crate::services::session_service::SessionService;
use sqlx::PgPool;
use uuid::Uuid;

/// What the sequencer hands back after recording an answer: either the next
/// question in strict sequence order, or completion when the answered
/// record was the last one.
#[derive(Debug)]
pub struct AnswerOutcome {
    pub answered: QuizQuestion,
    pub next: Option<NextQuestion>,
    pub total_questions: usize,
}

#[derive(Debug)]
pub struct NextQuestion {
    pub question: QuizQuestion,
    /// Scenario text, present only when the next question sits at the
    /// variant's first-medium or first-hard position; empty otherwise.
    pub scenario: String,
    pub code_snippet_image: Option<String>,
    pub has_code_snippet: bool,
}

#[derive(Clone)]
pub struct AnswerService {
    pool: PgPool,
}

impl AnswerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records an answer and computes progression. Re-answering a question
    /// overwrites the previous answer; the update is an idempotent upsert
    /// of the answer fields, never a create.
    pub async fn save_answer(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        answer: &str,
    ) -> Result<AnswerOutcome> {
        let answered = sqlx::query_as::<_, QuizQuestion>(
            r#"
            UPDATE quiz_questions
            SET answer = $1, answered = TRUE
            WHERE id = $2 AND session_id = $3
            RETURNING *
            "#,
        )
        .bind(answer)
        .bind(question_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Question {} not found in session {}",
                question_id, session_id
            ))
        })?;

        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_session(session_id).await?;
        let variant = QuizVariant::for_subject(&session.subject, get_config().cyber_id_ranges);
        let total_questions = variant.total();

        let next = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE session_id = $1 AND question_no = $2"#,
        )
        .bind(session_id)
        .bind(answered.question_no + 1)
        .fetch_optional(&self.pool)
        .await?;

        let Some(next) = next else {
            sqlx::query(r#"UPDATE quiz_sessions SET quiz_completed = TRUE WHERE id = $1"#)
                .bind(session_id)
                .execute(&self.pool)
                .await?;
            return Ok(AnswerOutcome {
                answered,
                next: None,
                total_questions,
            });
        };

        let scenario = if variant.is_scenario_position(next.question_no) {
            next.scenario.clone().unwrap_or_default()
        } else {
            String::new()
        };
        let code_snippet_image = if variant.code_snippets {
            next.code_snippet_image.clone()
        } else {
            None
        };
        let has_code_snippet = code_snippet_image.is_some();

        Ok(AnswerOutcome {
            answered,
            next: Some(NextQuestion {
                question: next,
                scenario,
                code_snippet_image,
                has_code_snippet,
            }),
            total_questions,
        })
    }
}
