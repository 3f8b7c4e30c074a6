// League backend client: the engine's only external collaborator.
//
// The backend owns persistence and the wire format; the engine consumes
// a handful of REST operations behind the [`DraftApi`] trait so the
// session loop can be driven by an in-memory fake in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::draft::pick::{DraftPick, Owner, Player};

/// Errors from the backend collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, bad
    /// body). The backend may or may not have seen it.
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered and refused. `detail` is its human-readable
    /// reason (e.g. a duplicate pick caught at commit time).
    #[error("{detail}")]
    Refused { detail: String },
}

/// Request body for committing a sale, mirroring the backend's
/// draft-pick schema.
#[derive(Debug, Clone, Serialize)]
pub struct PickRequest {
    pub session_id: String,
    pub owner_id: u32,
    pub player_id: u32,
    pub amount: u32,
}

/// Result of asking the backend to finalize the draft and lock rosters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized,
    /// The backend declined, with one message per unmet condition.
    Blocked(Vec<String>),
}

/// The abstract operations the engine needs from the league backend.
#[async_trait]
pub trait DraftApi: Send + Sync {
    async fn fetch_owners(&self) -> Result<Vec<Owner>, ApiError>;
    async fn fetch_players(&self) -> Result<Vec<Player>, ApiError>;
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<DraftPick>, ApiError>;
    async fn commit_pick(&self, request: &PickRequest) -> Result<DraftPick, ApiError>;
    async fn finalize_draft(&self) -> Result<FinalizeOutcome, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Error body shape the backend uses for refusals.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Response body of the finalize endpoint.
#[derive(Debug, Deserialize)]
struct FinalizeBody {
    status: String,
    #[serde(default)]
    messages: Vec<String>,
}

fn finalize_outcome(body: FinalizeBody) -> FinalizeOutcome {
    if body.status == "error" {
        FinalizeOutcome::Blocked(body.messages)
    } else {
        FinalizeOutcome::Finalized
    }
}

/// [`DraftApi`] implementation against the league backend's REST API.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for a backend at `base_url`
    /// (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpApi {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Turn a non-success response into [`ApiError::Refused`], pulling
    /// the backend's `detail` field when the body carries one.
    async fn refusal(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        ApiError::Refused { detail }
    }
}

#[async_trait]
impl DraftApi for HttpApi {
    async fn fetch_owners(&self) -> Result<Vec<Owner>, ApiError> {
        let owners: Vec<Owner> = self
            .http
            .get(self.url("/owners"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = owners.len(), "fetched owners");
        Ok(owners)
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, ApiError> {
        let players: Vec<Player> = self
            .http
            .get(self.url("/players"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = players.len(), "fetched player catalog");
        Ok(players)
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<DraftPick>, ApiError> {
        let history: Vec<DraftPick> = self
            .http
            .get(self.url("/draft-history"))
            .query(&[("session_id", session_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(history)
    }

    async fn commit_pick(&self, request: &PickRequest) -> Result<DraftPick, ApiError> {
        let response = self
            .http
            .post(self.url("/draft-pick"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::refusal(response).await);
        }
        Ok(response.json().await?)
    }

    async fn finalize_draft(&self) -> Result<FinalizeOutcome, ApiError> {
        let body: FinalizeBody = self
            .http
            .post(self.url("/admin/finalize-draft"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(finalize_outcome(body))
    }
}
