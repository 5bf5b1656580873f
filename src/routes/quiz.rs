use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{
    CertifiedSkill, QuestionTypeCounts, QuestionView, QuizSummary, SaveAnswerRequest,
    SaveAnswerResponse, StartQuizRequest, StartQuizResponse, SubmitQuizRequest,
    SubmitQuizResponse,
};
use crate::services::generation_service::QuizReadiness;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_quiz(
    State(state): State<AppState>,
    Json(req): Json<StartQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    tracing::info!("Resolving quiz session for subject: {}", req.subject);

    let resolved = state
        .generation_service
        .resolve_session(
            &req.phone,
            req.email.as_deref(),
            req.name.as_deref(),
            &req.subject,
            req.session_id,
        )
        .await?;

    let ready = resolved.readiness.is_ready();
    let first_question = match &resolved.readiness {
        QuizReadiness::Ready(questions) => questions.first().map(|q| QuestionView {
            question_id: q.id,
            question_no: q.question_no,
            question: q.question.clone(),
            code_snippet_image_link: if resolved.variant.code_snippets {
                q.code_snippet_image.clone()
            } else {
                None
            },
            has_code_snippet: resolved.variant.code_snippets && q.code_snippet_image.is_some(),
        }),
        QuizReadiness::Generating(_) => None,
    };

    let response = StartQuizResponse {
        certified_skill: CertifiedSkill {
            skill_id: resolved.session.skill_id,
            subject: resolved.session.subject.clone(),
        },
        quiz: QuizSummary {
            total_questions: resolved.variant.total(),
            questions_generated: ready,
            question_types: QuestionTypeCounts {
                easy: resolved.variant.easy_count,
                medium: resolved.variant.medium_count,
                hard: resolved.variant.hard_count,
            },
        },
        user: resolved.user,
        session: resolved.session,
        first_question,
        question_added: ready,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Json(req): Json<SaveAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let outcome = state
        .answer_service
        .save_answer(req.session_id, req.question_id, &req.answer)
        .await?;

    let response = match outcome.next {
        Some(next) => SaveAnswerResponse {
            status: "pending".to_string(),
            question: next.question.question.clone(),
            question_id: Some(next.question.id),
            question_no: Some(next.question.question_no),
            current_question_no: outcome.answered.question_no,
            total_questions: outcome.total_questions,
            scenario: next.scenario,
            code_snippet_image_link: next.code_snippet_image,
            has_code_snippet: next.has_code_snippet,
        },
        None => SaveAnswerResponse {
            status: "complete".to_string(),
            question: String::new(),
            question_id: None,
            question_no: None,
            current_question_no: outcome.answered.question_no,
            total_questions: outcome.total_questions,
            scenario: String::new(),
            code_snippet_image_link: None,
            has_code_snippet: false,
        },
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let result = state.result_service.submit_quiz(req.session_id).await?;
    let response = SubmitQuizResponse {
        session_id: result.session_id,
        score: result.score,
        total_questions: result.total_questions,
        percentage: result.percentage,
        category: result.category,
        completion_time: result.completion_time,
        order_id: result.order_id,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn analysis(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let blob = state.result_service.analysis(session_id).await?;
    Ok(Json(blob).into_response())
}
