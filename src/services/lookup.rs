//! Document lookup service
//!
//! Resolves stored bibcodes against the external search index. The index is
//! an opaque collaborator: the rest of the service only sees the
//! [`DocumentLookup`] trait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::LookupConfig,
    error::{AppError, AppResult},
    models::document::DocumentRecord,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentLookup: Send + Sync {
    /// Fetch metadata for the given bibcodes. Identifiers unknown to the
    /// index are simply absent from the result.
    async fn resolve(&self, bibcodes: &[String]) -> AppResult<Vec<DocumentRecord>>;
}

/// Resolve a library's documents, preserving the stored order.
///
/// Identifiers the index does not know are still listed, carrying the
/// bibcode alone.
pub async fn resolve_documents(
    lookup: &dyn DocumentLookup,
    bibcodes: &[String],
) -> AppResult<Vec<DocumentRecord>> {
    if bibcodes.is_empty() {
        return Ok(Vec::new());
    }

    let resolved = lookup.resolve(bibcodes).await?;
    let mut by_bibcode: HashMap<String, DocumentRecord> = resolved
        .into_iter()
        .map(|record| (record.bibcode.clone(), record))
        .collect();

    Ok(bibcodes
        .iter()
        .map(|bibcode| {
            by_bibcode
                .remove(bibcode)
                .unwrap_or_else(|| DocumentRecord::unresolved(bibcode))
        })
        .collect())
}

#[derive(Deserialize)]
struct LookupResponse {
    docs: Vec<DocumentRecord>,
}

/// HTTP client for the search index
#[derive(Clone)]
pub struct HttpLookupService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLookupService {
    pub fn new(config: &LookupConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build lookup client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentLookup for HttpLookupService {
    async fn resolve(&self, bibcodes: &[String]) -> AppResult<Vec<DocumentRecord>> {
        let response = self
            .client
            .post(format!("{}/bigquery", self.base_url))
            .json(&serde_json::json!({ "bibcodes": bibcodes }))
            .send()
            .await
            .map_err(|e| AppError::Transient(format!("Lookup service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transient(format!(
                "Lookup service returned {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid lookup response: {}", e)))?;

        Ok(body.docs)
    }
}
