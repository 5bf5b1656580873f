use certification_backend::config::parse_id_ranges;
use certification_backend::services::certified_service::GeneratedQuizPayload;
use certification_backend::services::extract_service::{
    ExtractOutcome, ExtractService, QuizVariant, QUIZ_LENGTH,
};
use serde_json::json;

fn bank_item(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "question": format!("Q{}", id),
        "option_a": "A",
        "option_b": "B",
        "option_c": "C",
        "option_d": "D",
        "correct_answer": "a"
    })
}

fn full_payload() -> GeneratedQuizPayload {
    let raw = json!({
        "quiz_status": "generated",
        "questionaire": {
            "easy": (1..=5).map(bank_item).collect::<Vec<_>>(),
            "medium": (6..=8).map(bank_item).collect::<Vec<_>>(),
            "hard": (9..=10).map(bank_item).collect::<Vec<_>>()
        }
    });
    serde_json::from_value(raw).expect("payload deserializes")
}

#[tokio::test]
async fn full_payload_yields_ten_ordered_drafts() {
    let payload = full_payload();
    let drafts = match ExtractService::extract(&payload, &QuizVariant::base()) {
        ExtractOutcome::Complete(drafts) => drafts,
        other => panic!("expected a complete set, got {:?}", other),
    };

    assert_eq!(drafts.len(), QUIZ_LENGTH);
    let sequence: Vec<i32> = drafts.iter().map(|d| d.question_no).collect();
    assert_eq!(sequence, (1..=10).collect::<Vec<i32>>());

    // Rendered text carries the progress indicator, the bank question and
    // the formatted options.
    let first = &drafts[0];
    assert!(first.question.contains("🧠 Q1"));
    assert!(first.question.contains("A) A B) B C) C D) D"));
    assert_eq!(first.correct_answer, "a");

    // Tier ordering: easy fills 1-5, medium 6-8, hard 9-10.
    assert_eq!(drafts[4].source_question_id, 5);
    assert_eq!(drafts[5].source_question_id, 6);
    assert_eq!(drafts[8].source_question_id, 9);
    assert_eq!(drafts[9].source_question_id, 10);
}

#[tokio::test]
async fn extraction_is_deterministic_for_the_same_payload() {
    let payload = full_payload();
    let variant = QuizVariant::base();
    let first = match ExtractService::extract(&payload, &variant) {
        ExtractOutcome::Complete(drafts) => drafts,
        other => panic!("expected a complete set, got {:?}", other),
    };
    let second = match ExtractService::extract(&payload, &variant) {
        ExtractOutcome::Complete(drafts) => drafts,
        other => panic!("expected a complete set, got {:?}", other),
    };
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_hard_tier_reports_insufficient() {
    let raw = json!({
        "questionaire": {
            "easy": (1..=5).map(bank_item).collect::<Vec<_>>(),
            "medium": (6..=8).map(bank_item).collect::<Vec<_>>(),
            "hard": []
        }
    });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    match ExtractService::extract(&payload, &QuizVariant::base()) {
        ExtractOutcome::Insufficient { available } => assert_eq!(available, 8),
        ExtractOutcome::Complete(_) => {
            panic!("an eight-question payload must never extract as ready")
        }
    }
}

#[tokio::test]
async fn cybersecurity_fallback_survives_missing_preferred_id() {
    // Preferred easy ids are 1-4 but the bank shipped 2-5 this round; the
    // earliest available item stands in for the missing id instead of the
    // extraction failing.
    let raw = json!({
        "questionaire": {
            "easy": (2..=5).map(bank_item).collect::<Vec<_>>(),
            "medium": (11..=13).map(bank_item).collect::<Vec<_>>(),
            "hard": (17..=19).map(bank_item).collect::<Vec<_>>()
        }
    });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    let ranges = parse_id_ranges("1-4,11-13,17-19").unwrap();
    let variant = QuizVariant::cybersecurity(ranges);

    let drafts = match ExtractService::extract(&payload, &variant) {
        ExtractOutcome::Complete(drafts) => drafts,
        other => panic!("expected a complete set, got {:?}", other),
    };
    assert_eq!(drafts.len(), QUIZ_LENGTH);
    assert_eq!(drafts[0].source_question_id, 2);
    // Cyber split is 4/3/3, so the first medium question sits at 5 and the
    // first hard question at 8.
    assert_eq!(variant.first_medium_no(), 5);
    assert_eq!(variant.first_hard_no(), 8);
    assert_eq!(drafts[4].source_question_id, 11);
    assert_eq!(drafts[7].source_question_id, 17);
}

#[tokio::test]
async fn scenario_travels_beside_the_rendered_text() {
    let mut medium: Vec<serde_json::Value> = (6..=8).map(bank_item).collect();
    medium[0]["scenario_title"] = json!("Incident report");
    medium[0]["text_context"] = json!("Production latency doubled overnight.");
    let raw = json!({
        "questionaire": {
            "easy": (1..=5).map(bank_item).collect::<Vec<_>>(),
            "medium": medium,
            "hard": (9..=10).map(bank_item).collect::<Vec<_>>()
        }
    });
    let payload: GeneratedQuizPayload = serde_json::from_value(raw).unwrap();
    let drafts = match ExtractService::extract(&payload, &QuizVariant::base()) {
        ExtractOutcome::Complete(drafts) => drafts,
        other => panic!("expected a complete set, got {:?}", other),
    };

    let first_medium = &drafts[5];
    assert_eq!(first_medium.question_no, 6);
    assert_eq!(
        first_medium.scenario.as_deref(),
        Some("Incident report\nProduction latency doubled overnight.")
    );
    assert!(!first_medium.question.contains("Incident report"));
}
