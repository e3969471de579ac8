// src/source/mod.rs

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Demo body served by [`OfflineSource`]; the labels exercise the
/// trailing-digit extraction the same way a hand-typed sheet would.
pub const OFFLINE_CSV: &str =
    "Event,Heat,Last Updated\n\"Event 99\",\"Heat 10\",\"Offline Demo\"\n";

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Where a tick reads its CSV text from.
#[derive(Clone, Debug)]
pub enum Source {
    Sheet(SheetSource),
    Offline(OfflineSource),
}

impl Source {
    /// Fetch the raw CSV body. Network errors and non-2xx statuses are errors.
    pub async fn fetch_csv(&self) -> Result<String> {
        match self {
            Source::Sheet(sheet) => sheet.fetch_csv().await,
            Source::Offline(offline) => Ok(offline.body.clone()),
        }
    }

    /// Short human-readable description for logs and the diagnostic overlay.
    pub fn describe(&self) -> String {
        match self {
            Source::Sheet(sheet) => format!("sheet {}", sheet.sheet_id),
            Source::Offline(_) => "offline demo".to_string(),
        }
    }
}

/// Reads the first tab of a published Google Sheet through its CSV export.
#[derive(Clone, Debug)]
pub struct SheetSource {
    client: Client,
    base: Url,
    sheet_id: String,
}

impl SheetSource {
    pub fn new(client: Client, sheet_id: impl Into<String>) -> Self {
        Self {
            client,
            base: Url::parse(SHEETS_BASE).expect("sheets base URL should parse"),
            sheet_id: sheet_id.into(),
        }
    }

    /// Point at a different export host (a mirror, or a local test server).
    /// `base` must end with `/`; the sheet id is joined onto it.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    /// CSV export URL for the sheet. `cache_bust` is appended so proxies
    /// and the export service never hand back a stale copy.
    pub fn export_url(&self, cache_bust: i64) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("{}/export", self.sheet_id))
            .with_context(|| format!("building export URL for sheet {}", self.sheet_id))?;
        url.query_pairs_mut()
            .append_pair("format", "csv")
            .append_pair("id", &self.sheet_id)
            .append_pair("gid", "0")
            .append_pair("cacheBust", &cache_bust.to_string());
        Ok(url)
    }

    async fn fetch_csv(&self) -> Result<String> {
        let url = self.export_url(Utc::now().timestamp_millis())?;
        debug!("Fetching CSV from {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }
}

/// Fixed in-memory body, used for `--offline` demos and tests.
#[derive(Clone, Debug)]
pub struct OfflineSource {
    body: String,
}

impl OfflineSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl Default for OfflineSource {
    fn default() -> Self {
        Self::new(OFFLINE_CSV)
    }
}
