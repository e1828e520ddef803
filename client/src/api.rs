//! HTTP client for the card endpoint.
//!
//! The card endpoint is the persistence authority for workspace documents:
//! `GET` returns the saved document, `PUT` replaces it wholesale. The trait
//! seam exists so the session and autosave driver can be exercised against
//! an in-memory fake.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use canvas::store::CardDocument;
use reqwest::StatusCode;
use wire::CardId;

/// Error returned by [`CardApi`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The card does not exist (deleted, or never created). Terminal for
    /// autosave: retrying cannot succeed.
    #[error("card not found")]
    NotFound,
    /// Network or protocol failure; the operation may succeed if retried.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Persistence operations against the card endpoint.
#[async_trait]
pub trait CardApi: Send + Sync {
    /// Fetch the card's saved workspace document.
    async fn fetch_workspace(&self, card_id: CardId) -> Result<CardDocument, ApiError>;

    /// Replace the card's saved workspace document.
    async fn save_workspace(&self, card_id: CardId, doc: &CardDocument) -> Result<(), ApiError>;
}

/// [`CardApi`] over HTTP, targeting `{base_url}/api/cards/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCardApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCardApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    fn card_url(&self, card_id: CardId) -> String {
        format!("{}/api/cards/{card_id}", self.base_url)
    }
}

#[async_trait]
impl CardApi for HttpCardApi {
    async fn fetch_workspace(&self, card_id: CardId) -> Result<CardDocument, ApiError> {
        let response = self.http.get(self.card_url(card_id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn save_workspace(&self, card_id: CardId, doc: &CardDocument) -> Result<(), ApiError> {
        let response = self.http.put(self.card_url(card_id)).json(doc).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        response.error_for_status()?;
        Ok(())
    }
}
