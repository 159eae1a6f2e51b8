use std::time::Duration;

use {anyhow::Context, reqwest::blocking::Client, tracing::info};

use super::{gviz::parse_gviz, DataSource, Row};
use crate::RepertoireError;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// A published spreadsheet read through its "gviz" JSON endpoint.
#[derive(Clone, Debug)]
pub struct SheetSource {
    pub sheet_id: String,
    pub sheet_name: String,
    pub timeout: Duration,
}

impl SheetSource {
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:json&sheet={}",
            urlencoding::encode(&self.sheet_id),
            urlencoding::encode(&self.sheet_name)
        )
    }
}

impl DataSource for SheetSource {
    // A single attempt; failures are returned to the caller.
    fn fetch_rows(&self) -> Result<Vec<Row>, RepertoireError> {
        let url = self.url();
        info!(%url, "fetching spreadsheet");

        let client = Client::builder()
            .user_agent("repertoire")
            .timeout(self.timeout)
            .build()?;

        let text = client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("failed to fetch spreadsheet '{}'", self.sheet_id))?;

        parse_gviz(&text)
    }

    fn describe(&self) -> String {
        format!("spreadsheet '{}'", self.sheet_id)
    }
}
