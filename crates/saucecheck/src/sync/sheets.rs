//! Google Sheets v4 values API over reqwest.
//!
//! Authentication is a bearer token obtained elsewhere (service account
//! exchange, `gcloud auth print-access-token`).

use super::{CellRef, ColumnRange, SheetTransport};
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public endpoint of the values API
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: String,
    major_dimension: &'static str,
    values: [[&'a str; 1]; 1],
}

/// Values API client for one spreadsheet
#[derive(Debug, Clone)]
pub struct GoogleSheetsTransport {
    base_url: String,
    spreadsheet_id: String,
    token: String,
    client: reqwest::Client,
}

impl GoogleSheetsTransport {
    /// Client for `spreadsheet_id` authenticating with `token`
    pub fn new(spreadsheet_id: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
            client,
        }
    }

    /// Talk to another endpoint
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// `{base}/{id}/values/{range}` with the range percent-encoded
    fn values_url(&self, range: &str) -> SauceResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|err| SauceError::SheetError {
            message: format!("bad base URL {:?}: {err}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|()| SauceError::SheetError {
                message: format!("base URL {:?} cannot take a path", self.base_url),
            })?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> SauceResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SauceError::SheetError {
            message: format!("{status}: {body}"),
        })
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetTransport for GoogleSheetsTransport {
    async fn read_column(&self, range: &ColumnRange) -> SauceResult<Vec<String>> {
        let url = self.values_url(&range.to_string())?;
        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let body: ValueRange = Self::check(response).await?.json().await?;
        tracing::debug!(%range, rows = body.values.len(), "column read");
        Ok(body
            .values
            .iter()
            .map(|row| row.first().map(cell_text).unwrap_or_default())
            .collect())
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> SauceResult<()> {
        let range = cell.to_string();
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueUpdate {
            range,
            major_dimension: "ROWS",
            values: [[value]],
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(%cell, value, "cell written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_is_percent_encoded() {
        let transport = GoogleSheetsTransport::new("abc", "t");
        let url = transport.values_url("Test UI!A9:A").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Test%20UI!A9:A"
        );
    }

    #[test]
    fn test_update_body_shape() {
        let body = ValueUpdate {
            range: "S!I9:I9".to_string(),
            major_dimension: "ROWS",
            values: [["Pass"]],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"range": "S!I9:I9", "majorDimension": "ROWS", "values": [["Pass"]]})
        );
    }

    #[test]
    fn test_blank_rows_read_as_empty() {
        let body: ValueRange =
            serde_json::from_value(json!({"range": "S!A1:A3", "values": [["a"], [], [7]]})).unwrap();
        let cells: Vec<String> = body
            .values
            .iter()
            .map(|row| row.first().map(cell_text).unwrap_or_default())
            .collect();
        assert_eq!(cells, ["a", "", "7"]);
        let empty: ValueRange = serde_json::from_value(json!({"range": "S!A1:A"})).unwrap();
        assert!(empty.values.is_empty());
    }
}
