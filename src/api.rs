//! HTTP client for the coaching backend.
//!
//! Thin wrapper over the four collaborator endpoints the tracker consumes:
//! progress fetch, gamification fetch, app-open notify, and the streak freeze
//! decision. All substantive logic (meal analysis, streak math, freeze rules)
//! lives server-side; this client only moves JSON.

use serde::Serialize;

use crate::types::{AppOpenResponse, GamificationSummary, ProgressSnapshot, StreakDecisionResponse};

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Serialize)]
struct StreakDecisionBody {
    use_freeze: bool,
}

/// Client for the coaching backend.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /users/{id}/progress`: raw meal/workout/check-in logs plus the
    /// optional pre-aggregated checklist.
    pub async fn fetch_progress(&self, user_id: &str) -> Result<ProgressSnapshot, ApiError> {
        self.get_json(&format!("{}/users/{}/progress", self.base_url, user_id))
            .await
    }

    /// `GET /users/{id}/gamification`: XP/level/streak summary.
    pub async fn fetch_gamification(&self, user_id: &str) -> Result<GamificationSummary, ApiError> {
        self.get_json(&format!("{}/users/{}/gamification", self.base_url, user_id))
            .await
    }

    /// `POST /users/{id}/app-open`: tells the backend the app came to the
    /// foreground; the response may demand a freeze decision.
    pub async fn notify_app_open(&self, user_id: &str) -> Result<AppOpenResponse, ApiError> {
        let url = format!("{}/users/{}/app-open", self.base_url, user_id);
        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(resp).await
    }

    /// `POST /users/{id}/streak-decision`: submit use-freeze (true) or
    /// accept-reset (false). "Later" never reaches the backend.
    pub async fn submit_streak_decision(
        &self,
        user_id: &str,
        use_freeze: bool,
    ) -> Result<StreakDecisionResponse, ApiError> {
        let url = format!("{}/users/{}/streak-decision", self.base_url, user_id);
        let resp = self
            .http
            .post(&url)
            .json(&StreakDecisionBody { use_freeze })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
