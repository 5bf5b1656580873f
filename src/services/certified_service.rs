use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// One question item as the upstream bank ships it. Absent optional fields
/// stay `None`; shape violations fail deserialization at this boundary
/// instead of leaking into the extraction logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamQuestion {
    pub id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    #[serde(default)]
    pub scenario_title: Option<String>,
    #[serde(default)]
    pub text_context: Option<String>,
    #[serde(default)]
    pub code_snippet_image: Option<String>,
    #[serde(default)]
    pub code_markdown: Option<String>,
    #[serde(default)]
    pub code_text: Option<String>,
}

/// Difficulty tiers of a generation response. The generator is eventually
/// consistent: any tier may be empty or short on a given call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Questionaire {
    #[serde(default)]
    pub easy: Vec<UpstreamQuestion>,
    #[serde(default)]
    pub medium: Vec<UpstreamQuestion>,
    #[serde(default)]
    pub hard: Vec<UpstreamQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuizPayload {
    #[serde(default)]
    pub quiz_status: Option<String>,
    #[serde(default)]
    pub questionaire: Questionaire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryResponse {
    pub skill_id: i64,
    pub subject_name: String,
    #[serde(default)]
    pub quiz_status: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
}

/// One answered question in the shape the upstream scorer expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptEntry {
    pub question_id: i64,
    pub answer: String,
    pub correct: bool,
}

/// Client for the third-party "certified" exam API. All calls go over HTTPS
/// with a 30 second timeout; the fatal/retryable split is the caller's
/// concern (create-entry and continue abort their operation, everything
/// else is logged and survived).
#[derive(Clone)]
pub struct CertifiedService {
    client: Client,
    base_url: String,
}

impl CertifiedService {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client for certified API");
        info!("Certified exam API base URL: {}", base_url);
        Self { client, base_url }
    }

    pub async fn create_entry(&self, subject: &str) -> Result<CreateEntryResponse> {
        let resp = self
            .client
            .post(format!("{}/create-entry", self.base_url))
            .json(&json!({ "subject": subject }))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("create-entry request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "create-entry returned {}",
                resp.status()
            )));
        }
        resp.json::<CreateEntryResponse>()
            .await
            .map_err(|e| Error::Upstream(format!("create-entry response malformed: {}", e)))
    }

    pub async fn generate(&self, skill_id: i64) -> Result<GeneratedQuizPayload> {
        let resp = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&json!({ "skill_id": skill_id }))
            .send()
            .await?
            .error_for_status()?;
        let payload = resp.json::<GeneratedQuizPayload>().await?;
        Ok(payload)
    }

    pub async fn continue_entry(
        &self,
        skill_id: i64,
        email: &str,
        phone: &str,
        name: &str,
    ) -> Result<ContinueResponse> {
        let resp = self
            .client
            .post(format!("{}/continue", self.base_url))
            .json(&json!({
                "skill_id": skill_id,
                "email": email,
                "phone": phone,
                "name": name,
            }))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("continue request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "continue returned {}",
                resp.status()
            )));
        }
        resp.json::<ContinueResponse>()
            .await
            .map_err(|e| Error::Upstream(format!("continue response malformed: {}", e)))
    }

    pub async fn save_user_response(
        &self,
        skill_quiz_id: i64,
        attempts: &[AttemptEntry],
        completion_time: &str,
        score: i32,
    ) -> Result<()> {
        self.client
            .post(format!("{}/save-user-response", self.base_url))
            .json(&json!({
                "skill_quiz_id": skill_quiz_id,
                "attempt_array": attempts,
                "completion_time": completion_time,
                "score": score,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn claim_certificate(&self, skill_id: i64, token: &str) -> Result<()> {
        self.client
            .post(format!("{}/claim-certificate", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "skill_id": skill_id }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn create_v2_test(&self, skill_id: i64, token: &str) -> Result<CreateOrderResponse> {
        let resp = self
            .client
            .post(format!("{}/create-v2-test", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "skill_id": skill_id }))
            .send()
            .await?
            .error_for_status()?;
        let order = resp.json::<CreateOrderResponse>().await?;
        Ok(order)
    }

    pub async fn analysis(&self, skill_quiz_id: i64, token: &str) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(format!("{}/analysis", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "skill_quiz_id": skill_quiz_id }))
            .send()
            .await?
            .error_for_status()?;
        let blob = resp.json::<serde_json::Value>().await?;
        Ok(blob)
    }
}
