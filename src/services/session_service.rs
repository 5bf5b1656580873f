use crate::error::Result;
use crate::models::question::QuizQuestion;
use crate::models::session::QuizSession;
use crate::models::user::User;
use crate::services::certified_service::CreateEntryResponse;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a user by phone. Email and name refresh when provided so a
    /// later start-quiz call can fill in what an earlier one left blank.
    pub async fn find_or_create_user(
        &self,
        phone: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (phone, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email),
                name = COALESCE(EXCLUDED.name, users.name)
            RETURNING *
            "#,
        )
        .bind(phone)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn latest_session(&self, user_id: Uuid, subject: &str) -> Result<Option<QuizSession>> {
        let session = sqlx::query_as::<_, QuizSession>(
            r#"
            SELECT * FROM quiz_sessions
            WHERE user_id = $1 AND subject = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Fetches a session only if it belongs to the given user and subject.
    pub async fn session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        subject: &str,
    ) -> Result<Option<QuizSession>> {
        let session = sqlx::query_as::<_, QuizSession>(
            r#"SELECT * FROM quiz_sessions WHERE id = $1 AND user_id = $2 AND subject = $3"#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<QuizSession> {
        let session =
            sqlx::query_as::<_, QuizSession>(r#"SELECT * FROM quiz_sessions WHERE id = $1"#)
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(session)
    }

    pub async fn create_session(
        &self,
        user_id: Uuid,
        subject: &str,
        entry: &CreateEntryResponse,
    ) -> Result<QuizSession> {
        let session = sqlx::query_as::<_, QuizSession>(
            r#"
            INSERT INTO quiz_sessions (user_id, subject, skill_id, paid)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(subject)
        .bind(entry.skill_id)
        .bind(entry.is_paid)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn mark_started(&self, session_id: Uuid) -> Result<()> {
        sqlx::query(r#"UPDATE quiz_sessions SET started_quiz = TRUE WHERE id = $1"#)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_token(
        &self,
        session_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE quiz_sessions SET auth_token = $1, token_expires_at = $2 WHERE id = $3"#,
        )
        .bind(token)
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_order_id(&self, session_id: Uuid, order_id: &str) -> Result<()> {
        sqlx::query(r#"UPDATE quiz_sessions SET order_id = $1 WHERE id = $2"#)
            .bind(order_id)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_submitted(&self, session_id: Uuid, score: i32) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET quiz_completed = TRUE, attempted = TRUE, score = $1
            WHERE id = $2
            "#,
        )
        .bind(score)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_analysis_generated(&self, session_id: Uuid) -> Result<()> {
        sqlx::query(r#"UPDATE quiz_sessions SET quiz_analysis_generated = TRUE WHERE id = $1"#)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn questions_for_session(&self, session_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE session_id = $1 ORDER BY question_no ASC"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn question_count(&self, session_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM quiz_questions WHERE session_id = $1"#)
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
