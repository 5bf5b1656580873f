use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use crate::models::session::QuizSession;
use crate::models::user::User;
use crate::services::certified_service::CertifiedService;
use crate::services::extract_service::{
    ExtractOutcome, ExtractService, QuestionDraft, QuizVariant, QUIZ_LENGTH,
};
use crate::services::session_service::SessionService;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Readiness of a session's question set. `Generating` carries the partial
/// count so callers can report progress; only `Ready` ever exposes
/// questions.
#[derive(Debug)]
pub enum QuizReadiness {
    Ready(Vec<QuizQuestion>),
    Generating(usize),
}

impl QuizReadiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, QuizReadiness::Ready(_))
    }
}

#[derive(Debug)]
pub struct ResolvedSession {
    pub user: User,
    pub session: QuizSession,
    pub variant: QuizVariant,
    pub readiness: QuizReadiness,
}

/// Reconciles the eventually-consistent upstream generator into a canonical
/// ten-question set per session. Requests never wait on generation: when a
/// set is incomplete, a detached poller (one per session, tracked in
/// `active_polls`) keeps retrying in the background until the set persists
/// or the configured bound expires.
#[derive(Clone)]
pub struct GenerationService {
    pool: PgPool,
    certified: CertifiedService,
    active_polls: Arc<Mutex<HashSet<Uuid>>>,
}

impl GenerationService {
    pub fn new(pool: PgPool, certified: CertifiedService) -> Self {
        Self {
            pool,
            certified,
            active_polls: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start-or-resume entry point. Idempotent per (user, subject): repeat
    /// calls reuse the latest session instead of creating duplicates. A
    /// create-entry failure is fatal and leaves no session behind.
    pub async fn resolve_session(
        &self,
        phone: &str,
        email: Option<&str>,
        name: Option<&str>,
        subject: &str,
        session_id: Option<Uuid>,
    ) -> Result<ResolvedSession> {
        let sessions = SessionService::new(self.pool.clone());
        let user = sessions.find_or_create_user(phone, email, name).await?;

        let mut session = match session_id {
            Some(id) => sessions
                .session_for_user(id, user.id, subject)
                .await?
                .ok_or_else(|| {
                    Error::NotFound(format!("Session {} not found for this user and subject", id))
                })?,
            None => match sessions.latest_session(user.id, subject).await? {
                Some(existing) => existing,
                None => {
                    let entry = self.certified.create_entry(subject).await?;
                    info!(
                        "Created certified entry for subject '{}': skill_id={}",
                        subject, entry.skill_id
                    );
                    sessions.create_session(user.id, subject, &entry).await?
                }
            },
        };

        if !session.started_quiz {
            sessions.mark_started(session.id).await?;
            session.started_quiz = true;
        }

        let variant = QuizVariant::for_subject(subject, get_config().cyber_id_ranges);
        let readiness = self.ensure_questions(&session, user.id, &variant).await?;

        Ok(ResolvedSession {
            user,
            session,
            variant,
            readiness,
        })
    }

    /// Checks the stored set and, when it is incomplete, makes one cheap
    /// synchronous attempt before handing the session to a background
    /// poller. The caller gets the current state immediately either way.
    async fn ensure_questions(
        &self,
        session: &QuizSession,
        user_id: Uuid,
        variant: &QuizVariant,
    ) -> Result<QuizReadiness> {
        let sessions = SessionService::new(self.pool.clone());
        let existing = sessions.questions_for_session(session.id).await?;
        if existing.len() >= QUIZ_LENGTH {
            return Ok(QuizReadiness::Ready(existing));
        }

        match self.certified.generate(session.skill_id).await {
            Ok(payload) => match ExtractService::extract(&payload, variant) {
                ExtractOutcome::Complete(drafts) => {
                    self.insert_question_set(session.id, user_id, &drafts)
                        .await?;
                }
                ExtractOutcome::Insufficient { available } => {
                    debug!(
                        "Generation still partial for session {}: {}/{}",
                        session.id, available, QUIZ_LENGTH
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Initial generate call failed for session {}: {:?}",
                    session.id, e
                );
            }
        }

        let current = sessions.questions_for_session(session.id).await?;
        if current.len() >= QUIZ_LENGTH {
            return Ok(QuizReadiness::Ready(current));
        }

        self.spawn_poller(session.id, session.skill_id, user_id, variant.clone());
        Ok(QuizReadiness::Generating(current.len()))
    }

    /// Launches the detached polling task unless one is already in flight
    /// for this session. The registry entry is dropped when the task ends,
    /// so a later resolve can relaunch after a timeout.
    fn spawn_poller(&self, session_id: Uuid, skill_id: i64, user_id: Uuid, variant: QuizVariant) {
        {
            let mut active = self
                .active_polls
                .lock()
                .expect("poller registry mutex poisoned");
            if !active.insert(session_id) {
                debug!("Poller already active for session {}, not relaunching", session_id);
                return;
            }
        }

        let svc = self.clone();
        tokio::spawn(async move {
            svc.poll_until_ready(session_id, skill_id, user_id, &variant)
                .await;
            svc.active_polls
                .lock()
                .expect("poller registry mutex poisoned")
                .remove(&session_id);
        });
    }

    /// Bounded polling loop. Remote failures and insufficient payloads are
    /// logged and retried; only a persisted full set or the timeout ends
    /// the loop. Exceeding the bound leaves the session not-ready and the
    /// next resolve call resumes polling.
    async fn poll_until_ready(
        &self,
        session_id: Uuid,
        skill_id: i64,
        user_id: Uuid,
        variant: &QuizVariant,
    ) {
        let config = get_config();
        let timeout = Duration::from_secs(config.generation_timeout_secs);
        let interval = Duration::from_secs(config.generation_poll_interval_secs);
        let started = Instant::now();
        info!(
            "Polling question generation for session {} (timeout {}s, interval {}s)",
            session_id,
            timeout.as_secs(),
            interval.as_secs()
        );

        loop {
            if started.elapsed() >= timeout {
                warn!(
                    "Question generation timed out for session {} after {:?}",
                    session_id,
                    started.elapsed()
                );
                return;
            }

            match self.certified.generate(skill_id).await {
                Ok(payload) => match ExtractService::extract(&payload, variant) {
                    ExtractOutcome::Complete(drafts) => {
                        match self.insert_question_set(session_id, user_id, &drafts).await {
                            Ok(true) => {
                                info!("Persisted question set for session {}", session_id);
                                return;
                            }
                            Ok(false) => {
                                info!(
                                    "Question set for session {} already persisted elsewhere",
                                    session_id
                                );
                                return;
                            }
                            Err(e) => {
                                error!(
                                    "Failed to persist question set for session {}: {:?}",
                                    session_id, e
                                );
                            }
                        }
                    }
                    ExtractOutcome::Insufficient { available } => {
                        debug!(
                            "Session {} still generating: {}/{} questions available",
                            session_id, available, QUIZ_LENGTH
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        "Generate call failed for session {}, will retry: {:?}",
                        session_id, e
                    );
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// At-most-once persistence of the canonical set. The transaction
    /// re-checks the count so a finished race becomes a no-op, and the
    /// `(session_id, question_no)` uniqueness constraint absorbs anything
    /// the re-check lets through. Returns false when another writer
    /// already completed the set.
    pub async fn insert_question_set(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        drafts: &[QuestionDraft],
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM quiz_questions WHERE session_id = $1"#)
                .bind(session_id)
                .fetch_one(&mut *tx)
                .await?;
        if existing >= QUIZ_LENGTH as i64 {
            tx.rollback().await?;
            return Ok(false);
        }

        for draft in drafts {
            sqlx::query(
                r#"
                INSERT INTO quiz_questions
                    (session_id, user_id, question_no, question, correct_answer,
                     scenario, code_snippet_image, source_question_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (session_id, question_no) DO NOTHING
                "#,
            )
            .bind(session_id)
            .bind(user_id)
            .bind(draft.question_no)
            .bind(&draft.question)
            .bind(&draft.correct_answer)
            .bind(&draft.scenario)
            .bind(&draft.code_snippet_image)
            .bind(draft.source_question_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
