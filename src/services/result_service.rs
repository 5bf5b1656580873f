use crate::config::{get_config, ScoreBand};
use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use crate::services::certified_service::{AttemptEntry, CertifiedService};
use crate::services::extract_service::QUIZ_LENGTH;
use crate::services::session_service::SessionService;
use crate::utils::time::format_completion_time;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug)]
pub struct SubmissionResult {
    pub session_id: Uuid,
    pub score: i32,
    pub total_questions: usize,
    pub percentage: f64,
    pub category: String,
    pub completion_time: String,
    pub order_id: Option<String>,
}

/// Scores a finished quiz and walks the upstream certification flow. Only
/// the continue call (which mints the auth token) can fail the submission;
/// the scoring/certificate/order calls after it are best-effort and merely
/// logged when they fail.
#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
    certified: CertifiedService,
}

impl ResultService {
    pub fn new(pool: PgPool, certified: CertifiedService) -> Self {
        Self { pool, certified }
    }

    pub async fn submit_quiz(&self, session_id: Uuid) -> Result<SubmissionResult> {
        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_session(session_id).await?;
        let user = sqlx::query_as::<_, crate::models::user::User>(
            r#"SELECT * FROM users WHERE id = $1"#,
        )
        .bind(session.user_id)
        .fetch_one(&self.pool)
        .await?;

        let questions = sessions.questions_for_session(session_id).await?;
        if questions.len() < QUIZ_LENGTH {
            return Err(Error::BadRequest(
                "Quiz questions are still being generated for this session".to_string(),
            ));
        }

        let score = questions.iter().filter(|q| is_correct(q)).count() as i32;
        let completion_time = format_completion_time(
            session
                .created_at
                .map(|created| Utc::now() - created)
                .unwrap_or_else(Duration::zero),
        );

        let cont = self
            .certified
            .continue_entry(
                session.skill_id,
                user.email.as_deref().unwrap_or_default(),
                &user.phone,
                user.name.as_deref().unwrap_or_default(),
            )
            .await?;
        sessions
            .set_token(session.id, &cont.token, Utc::now() + Duration::hours(1))
            .await?;

        let attempts: Vec<AttemptEntry> = questions
            .iter()
            .map(|q| AttemptEntry {
                question_id: q.source_question_id,
                answer: q.answer.clone(),
                correct: is_correct(q),
            })
            .collect();

        if let Err(e) = self
            .certified
            .save_user_response(session.skill_id, &attempts, &completion_time, score)
            .await
        {
            error!(
                "save-user-response failed for session {}: {:?}",
                session.id, e
            );
        }
        if let Err(e) = self
            .certified
            .claim_certificate(session.skill_id, &cont.token)
            .await
        {
            error!(
                "claim-certificate failed for session {}: {:?}",
                session.id, e
            );
        }
        let order_id = match self
            .certified
            .create_v2_test(session.skill_id, &cont.token)
            .await
        {
            Ok(order) => {
                sessions.set_order_id(session.id, &order.order_id).await?;
                Some(order.order_id)
            }
            Err(e) => {
                error!("create-v2-test failed for session {}: {:?}", session.id, e);
                None
            }
        };

        sessions.mark_submitted(session.id, score).await?;
        info!(
            "Quiz submitted for session {}: score {}/{}",
            session.id,
            score,
            questions.len()
        );

        let total_questions = questions.len();
        let percentage = (score as f64 / total_questions as f64) * 100.0;
        let category = score_category(score, &get_config().score_bands);

        Ok(SubmissionResult {
            session_id: session.id,
            score,
            total_questions,
            percentage,
            category,
            completion_time,
            order_id,
        })
    }

    pub async fn analysis(&self, session_id: Uuid) -> Result<serde_json::Value> {
        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_session(session_id).await?;
        let token = session.auth_token.as_deref().ok_or_else(|| {
            Error::BadRequest("Quiz has not been submitted for this session".to_string())
        })?;
        if let Some(expires_at) = session.token_expires_at {
            if expires_at <= Utc::now() {
                return Err(Error::BadRequest(
                    "Certified API token has expired, submit again to refresh".to_string(),
                ));
            }
        }

        let blob = self.certified.analysis(session.skill_id, token).await?;
        sessions.mark_analysis_generated(session.id).await?;
        Ok(blob)
    }
}

fn is_correct(q: &QuizQuestion) -> bool {
    q.answered && q.answer.trim().eq_ignore_ascii_case(q.correct_answer.trim())
}

/// Maps a score onto the configured bands (highest threshold at or below
/// the score wins). Bands arrive sorted ascending from config parsing.
pub fn score_category(score: i32, bands: &[ScoreBand]) -> String {
    bands
        .iter()
        .rev()
        .find(|b| score >= b.min)
        .or_else(|| bands.first())
        .map(|b| b.label.clone())
        .unwrap_or_default()
}
