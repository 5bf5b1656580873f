use certification_backend::services::certified_service::{
    CreateEntryResponse, GeneratedQuizPayload,
};
use serde_json::json;

#[test]
fn absent_tiers_deserialize_as_empty() {
    let raw = json!({
        "quiz_status": "generating",
        "questionaire": { "easy": [] }
    });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    assert!(payload.questionaire.easy.is_empty());
    assert!(payload.questionaire.medium.is_empty());
    assert!(payload.questionaire.hard.is_empty());
}

#[test]
fn missing_questionaire_deserializes_as_default() {
    let raw = json!({ "quiz_status": "pending" });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    assert!(payload.questionaire.easy.is_empty());
}

#[test]
fn malformed_question_item_is_a_parse_error() {
    // An item without its option fields must fail at the client boundary
    // rather than surfacing as a half-shaped question downstream.
    let raw = json!({
        "questionaire": {
            "easy": [{ "id": 1, "question": "Q1" }]
        }
    });
    let result: Result<GeneratedQuizPayload, _> = serde_json::from_value(raw);
    assert!(result.is_err());
}

#[test]
fn optional_enrichment_fields_default_to_none() {
    let raw = json!({
        "questionaire": {
            "easy": [{
                "id": 3,
                "question": "Q3",
                "option_a": "A",
                "option_b": "B",
                "option_c": "C",
                "option_d": "D",
                "correct_answer": "c"
            }]
        }
    });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    let item = &payload.questionaire.easy[0];
    assert!(item.scenario_title.is_none());
    assert!(item.code_snippet_image.is_none());
    assert!(item.code_markdown.is_none());
    assert!(item.code_text.is_none());
}

#[test]
fn create_entry_response_contract() {
    let raw = json!({
        "skill_id": 4711,
        "subject_name": "Cloud Fundamentals",
        "quiz_status": "new",
        "is_paid": false
    });
    let entry: CreateEntryResponse = serde_json::from_value(raw).unwrap();
    assert_eq!(entry.skill_id, 4711);
    assert_eq!(entry.subject_name, "Cloud Fundamentals");
    assert!(!entry.is_paid);
}
