use crate::config::TierIdRanges;
use crate::services::certified_service::{GeneratedQuizPayload, UpstreamQuestion};
use url::Url;

pub const QUIZ_LENGTH: usize = 10;

/// Per-subject extraction policy: how many questions each difficulty tier
/// contributes, whether the bank's preferred id ranges apply, and which
/// content enrichments the rendered text carries.
#[derive(Debug, Clone)]
pub struct QuizVariant {
    pub easy_count: usize,
    pub medium_count: usize,
    pub hard_count: usize,
    pub preferred_ids: Option<TierIdRanges>,
    pub show_progress: bool,
    pub code_snippets: bool,
}

impl QuizVariant {
    pub fn base() -> Self {
        Self {
            easy_count: 5,
            medium_count: 3,
            hard_count: 2,
            preferred_ids: None,
            show_progress: true,
            code_snippets: false,
        }
    }

    pub fn cybersecurity(ranges: TierIdRanges) -> Self {
        Self {
            easy_count: 4,
            medium_count: 3,
            hard_count: 3,
            preferred_ids: Some(ranges),
            show_progress: false,
            code_snippets: true,
        }
    }

    pub fn for_subject(subject: &str, cyber_ranges: TierIdRanges) -> Self {
        if subject.eq_ignore_ascii_case("cybersecurity") {
            Self::cybersecurity(cyber_ranges)
        } else {
            Self::base()
        }
    }

    pub fn total(&self) -> usize {
        self.easy_count + self.medium_count + self.hard_count
    }

    /// Sequence number of the first medium-tier question; one of the two
    /// positions where a scenario is attached and later surfaced.
    pub fn first_medium_no(&self) -> i32 {
        (self.easy_count + 1) as i32
    }

    /// Sequence number of the first hard-tier question.
    pub fn first_hard_no(&self) -> i32 {
        (self.easy_count + self.medium_count + 1) as i32
    }

    pub fn is_scenario_position(&self, question_no: i32) -> bool {
        question_no == self.first_medium_no() || question_no == self.first_hard_no()
    }
}

/// Unpersisted question ready for bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question_no: i32,
    pub question: String,
    pub correct_answer: String,
    pub scenario: Option<String>,
    pub code_snippet_image: Option<String>,
    pub source_question_id: i64,
}

/// Outcome of one extraction pass. `Insufficient` is the normal
/// still-generating case, not a failure; callers keep polling.
#[derive(Debug)]
pub enum ExtractOutcome {
    Complete(Vec<QuestionDraft>),
    Insufficient { available: usize },
}

pub struct ExtractService;

impl ExtractService {
    /// Assembles exactly ten ordered drafts from a raw generation payload,
    /// or reports how many the payload could currently supply. A partial
    /// list is never returned as if final.
    pub fn extract(payload: &GeneratedQuizPayload, variant: &QuizVariant) -> ExtractOutcome {
        let q = &payload.questionaire;
        let tiers = [
            (&q.easy, variant.easy_count, variant.preferred_ids.map(|r| r.easy)),
            (&q.medium, variant.medium_count, variant.preferred_ids.map(|r| r.medium)),
            (&q.hard, variant.hard_count, variant.preferred_ids.map(|r| r.hard)),
        ];

        let mut selected: Vec<Vec<&UpstreamQuestion>> = Vec::with_capacity(3);
        for (items, need, range) in &tiers {
            match select_tier(items.as_slice(), *need, *range) {
                Some(picked) => selected.push(picked),
                None => {
                    let available = tiers
                        .iter()
                        .map(|(items, need, _)| items.len().min(*need))
                        .sum();
                    return ExtractOutcome::Insufficient { available };
                }
            }
        }

        let total = variant.total();
        let mut drafts = Vec::with_capacity(total);
        let mut question_no: i32 = 0;
        for tier in &selected {
            for item in tier {
                question_no += 1;
                let scenario = if variant.is_scenario_position(question_no) {
                    compose_scenario(item)
                } else {
                    None
                };
                let (mut question, code_snippet_image) = if variant.code_snippets {
                    render_with_code(item)
                } else {
                    (render_plain(item), None)
                };
                if variant.show_progress {
                    question = format!("{}/{} 🧠 {}", question_no, total, question);
                }
                drafts.push(QuestionDraft {
                    question_no,
                    question,
                    correct_answer: item.correct_answer.clone(),
                    scenario,
                    code_snippet_image,
                    source_question_id: item.id,
                });
            }
        }
        ExtractOutcome::Complete(drafts)
    }
}

/// Picks `need` items from one tier. With a preferred id range the bank's
/// ids are taken in range order; a missing id falls back to the earliest
/// item not already picked, so an inconsistently reused id range still
/// yields a stable outcome whenever the tier has enough items at all.
fn select_tier<'a>(
    items: &'a [UpstreamQuestion],
    need: usize,
    preferred: Option<(i64, i64)>,
) -> Option<Vec<&'a UpstreamQuestion>> {
    if items.len() < need {
        return None;
    }
    let Some((lo, hi)) = preferred else {
        return Some(items.iter().take(need).collect());
    };

    let mut picked: Vec<&UpstreamQuestion> = Vec::with_capacity(need);
    let mut used = vec![false; items.len()];

    let take_earliest = |used: &mut Vec<bool>| -> Option<&'a UpstreamQuestion> {
        let idx = used.iter().position(|u| !u)?;
        used[idx] = true;
        Some(&items[idx])
    };

    for id in lo..=hi {
        if picked.len() == need {
            break;
        }
        match items.iter().position(|q| q.id == id) {
            Some(idx) if !used[idx] => {
                used[idx] = true;
                picked.push(&items[idx]);
            }
            _ => {
                picked.push(take_earliest(&mut used)?);
            }
        }
    }
    // Range shorter than the tier quota: top up in bank order.
    while picked.len() < need {
        picked.push(take_earliest(&mut used)?);
    }
    Some(picked)
}

fn options_line(q: &UpstreamQuestion) -> String {
    format!(
        "A) {} B) {} C) {} D) {}",
        q.option_a, q.option_b, q.option_c, q.option_d
    )
}

fn render_plain(q: &UpstreamQuestion) -> String {
    format!("{}\n\n{}", q.question, options_line(q))
}

/// Cybersecurity rendering. Code precedence is image > markdown > raw: an
/// image link is stored separately and never inlined; markdown becomes a
/// fenced monospaced block; raw code is appended verbatim only when
/// neither exists.
fn render_with_code(q: &UpstreamQuestion) -> (String, Option<String>) {
    let mut text = render_plain(q);

    if let Some(image) = valid_image_link(q) {
        return (text, Some(image));
    }
    if let Some(md) = q.code_markdown.as_deref().filter(|s| !s.trim().is_empty()) {
        text.push_str(&format!("\n\n```\n{}\n```", md));
    } else if let Some(raw) = q.code_text.as_deref().filter(|s| !s.trim().is_empty()) {
        text.push_str("\n\n");
        text.push_str(raw);
    }
    (text, None)
}

fn valid_image_link(q: &UpstreamQuestion) -> Option<String> {
    let link = q.code_snippet_image.as_deref()?.trim();
    let url = Url::parse(link).ok()?;
    if url.scheme() == "http" || url.scheme() == "https" {
        Some(link.to_string())
    } else {
        None
    }
}

/// Scenario text lives beside the question, not inside it; the answer
/// sequencer exposes it only at the first-medium / first-hard positions.
fn compose_scenario(q: &UpstreamQuestion) -> Option<String> {
    let title = q.scenario_title.as_deref().filter(|s| !s.trim().is_empty())?;
    let context = q.text_context.as_deref().filter(|s| !s.trim().is_empty())?;
    Some(format!("{}\n{}", title, context))
}
