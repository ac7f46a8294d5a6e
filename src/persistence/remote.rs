//! Remote ranked leaderboard
//!
//! Talks to a PostgREST-style endpoint (`/rest/v1/<table>`), the shape a
//! Supabase project exposes. Request building and response parsing are plain
//! data so they can be checked natively; only `send` needs a browser.

use serde::{Deserialize, Serialize};

use super::PersistenceError;
use crate::leaderboard::LeaderboardEntry;

fn default_table() -> String {
    "leaderboard".to_string()
}

/// Where the remote leaderboard lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public (anon) API key
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: default_table(),
        }
    }
}

/// Row as stored remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub player_name: String,
    pub score: u64,
    /// ISO-8601 submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// An HTTP request ready to hand to `fetch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

/// Client for the remote leaderboard table
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    config: RemoteConfig,
}

impl LeaderboardClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.config.api_key.clone()),
            ("Authorization", format!("Bearer {}", self.config.api_key)),
        ]
    }

    /// Insert-or-merge a row
    pub fn upsert_request(&self, row: &LeaderboardRow) -> Result<RemoteRequest, PersistenceError> {
        let body = serde_json::to_string(&[row])?;
        let mut headers = self.auth_headers();
        headers.push(("Content-Type", "application/json".to_string()));
        headers.push(("Prefer", "resolution=merge-duplicates".to_string()));
        Ok(RemoteRequest {
            method: "POST",
            url: self.table_url(),
            headers,
            body: Some(body),
        })
    }

    /// Highest `limit` scores
    pub fn top_scores_request(&self, limit: usize) -> RemoteRequest {
        RemoteRequest {
            method: "GET",
            url: format!(
                "{}?select=player_name,score&order=score.desc&limit={}",
                self.table_url(),
                limit
            ),
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// Parse a top-scores response body, re-sorting defensively
    pub fn parse_top_scores(
        body: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let rows: Vec<LeaderboardRow> = serde_json::from_str(body)?;
        let mut entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .map(|r| LeaderboardEntry {
                player_name: r.player_name,
                score: r.score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Upsert a row remotely
    #[cfg(target_arch = "wasm32")]
    pub async fn submit(&self, row: &LeaderboardRow) -> Result<(), PersistenceError> {
        let request = self.upsert_request(row)?;
        send(&request).await?;
        log::info!("Submitted {} for {}", row.score, row.player_name);
        Ok(())
    }

    /// Fetch the highest `limit` scores
    #[cfg(target_arch = "wasm32")]
    pub async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let body = send(&self.top_scores_request(limit)).await?;
        Self::parse_top_scores(&body, limit)
    }
}

/// Perform a request with `window.fetch`, returning the response text
#[cfg(target_arch = "wasm32")]
async fn send(request: &RemoteRequest) -> Result<String, PersistenceError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let js_err = |e: JsValue| PersistenceError::Js(format!("{:?}", e));

    let init = RequestInit::new();
    init.set_method(request.method);
    init.set_mode(RequestMode::Cors);
    if let Some(body) = &request.body {
        init.set_body(&JsValue::from_str(body));
    }

    let req = Request::new_with_str_and_init(&request.url, &init).map_err(js_err)?;
    for (name, value) in &request.headers {
        req.headers().set(name, value).map_err(js_err)?;
    }

    let window = web_sys::window().ok_or_else(|| PersistenceError::Js("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;

    if !response.ok() {
        return Err(PersistenceError::Http {
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(text.as_string().unwrap_or_default())
}
