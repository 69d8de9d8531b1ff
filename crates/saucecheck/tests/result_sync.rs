//! Report-to-spreadsheet sync over the in-memory sheet and a stub of the
//! Sheets values API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use saucecheck::sync::{sync_report, GoogleSheetsTransport, MemorySheet, SyncConfig, SyncContext, SyncOutcome, FAIL, PASS};
use saucecheck::TestReport;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const STAMP: &str = "10/19/2026, 9:30:00 AM";

/// Reporter output with the extra keys a real run carries
const REPORT_JSON: &str = r#"{
  "config": {"workers": 1},
  "suites": [
    {
      "title": "api.spec",
      "file": "api.spec",
      "suites": [
        {
          "title": "GET - SINGLE USER",
          "specs": [
            {"title": "TC-001: Successful", "ok": true, "tests": []},
            {"title": "TC-002: Not found", "ok": false, "tests": []}
          ]
        },
        {
          "title": "GET - SINGLE USER<RESOURCE>",
          "suites": [
            {
              "title": "nested",
              "specs": [{"title": "TC-003: Successful", "ok": false}]
            }
          ]
        }
      ]
    }
  ],
  "stats": {"expected": 1, "unexpected": 2}
}"#;

fn config() -> SyncConfig {
    SyncConfig::from_yaml(
        "columnFind: A\ncolumnUpdate: I\ncolumnUpdatedAt: J\nsheetRowStart: 7\nsheetName: API Test\nspreadsheetId: sheet-1\n",
    )
    .unwrap()
}

fn report() -> TestReport {
    TestReport::from_json(REPORT_JSON).unwrap()
}

mod memory {
    use super::*;

    #[tokio::test]
    async fn test_report_file_drives_row_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("report.json");
        report().write(&path).unwrap();
        let report = TestReport::read(&path).unwrap();
        assert_eq!(report.total(), 3);

        let sheet = MemorySheet::new().with_column("API Test", "A", 7, &["TC-001", "", "TC-003", "TC-999"]);
        let context = SyncContext::new(&sheet, config()).with_clock(|| STAMP.to_string());
        let outcome = sync_report(&context, &report).await;

        assert_eq!(outcome, SyncOutcome { matched: 2, written: 4, failed_writes: 0 });
        assert_eq!(sheet.get("API Test", "I", 7).as_deref(), Some(PASS));
        assert_eq!(sheet.get("API Test", "I", 9).as_deref(), Some(FAIL));
        assert_eq!(sheet.get("API Test", "J", 9).as_deref(), Some(STAMP));
        assert_eq!(sheet.get("API Test", "I", 10), None);

        let written: Vec<String> = sheet.writes().iter().map(|(cell, _)| cell.to_string()).collect();
        assert_eq!(
            written,
            ["API Test!I7:I7", "API Test!J7:J7", "API Test!I9:I9", "API Test!J9:J9"]
        );
    }

    #[tokio::test]
    async fn test_timestamp_column_failures_are_counted() {
        let sheet = MemorySheet::new()
            .with_column("API Test", "A", 7, &["TC-001", "TC-002", "TC-003"])
            .with_failing_column("J");
        let context = SyncContext::new(&sheet, config()).with_clock(|| STAMP.to_string());
        let outcome = sync_report(&context, &report()).await;
        assert_eq!(outcome, SyncOutcome { matched: 3, written: 3, failed_writes: 3 });
        assert_eq!(sheet.get("API Test", "I", 8).as_deref(), Some(FAIL));
    }
}

mod google_sheets {
    use super::*;

    const TOKEN: &str = "ya29.stub-token";

    #[derive(Debug, Default)]
    struct Recorded {
        reads: Vec<String>,
        writes: Vec<(String, Value)>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    async fn read_values(
        State(recorded): State<Shared>,
        Path((id, range)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) || id != "sheet-1" {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"code": 401}})));
        }
        recorded.lock().unwrap().reads.push(range.clone());
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [["TC-001"], [], ["TC-003"], ["TC-999"]]
        });
        (StatusCode::OK, Json(body))
    }

    async fn write_values(
        State(recorded): State<Shared>,
        Path((_id, range)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"code": 401}})));
        }
        if query.get("valueInputOption").map(String::as_str) != Some("RAW") {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": {"code": 400}})));
        }
        recorded.lock().unwrap().writes.push((range.clone(), body));
        (StatusCode::OK, Json(json!({"updatedRange": range, "updatedCells": 1})))
    }

    async fn serve() -> (String, Shared) {
        let recorded = Shared::default();
        let app = Router::new()
            .route(
                "/v4/spreadsheets/{id}/values/{range}",
                get(read_values).put(write_values),
            )
            .with_state(Arc::clone(&recorded));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v4/spreadsheets"), recorded)
    }

    #[tokio::test]
    async fn test_sync_through_values_api() {
        let (base_url, recorded) = serve().await;
        let transport = GoogleSheetsTransport::new("sheet-1", TOKEN).with_base_url(base_url);
        let context = SyncContext::new(transport, config()).with_clock(|| STAMP.to_string());

        let outcome = sync_report(&context, &report()).await;
        assert_eq!(outcome, SyncOutcome { matched: 2, written: 4, failed_writes: 0 });

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.reads.len(), 3);
        assert!(recorded.reads.iter().all(|range| range == "API Test!A7:A"));

        let (range, body) = &recorded.writes[2];
        assert_eq!(range, "API Test!I9:I9");
        assert_eq!(
            body,
            &json!({"range": "API Test!I9:I9", "majorDimension": "ROWS", "values": [["Fail"]]})
        );
        assert_eq!(recorded.writes[1].1["values"], json!([[STAMP]]));
    }

    #[tokio::test]
    async fn test_rejected_token_matches_nothing() {
        let (base_url, recorded) = serve().await;
        let transport = GoogleSheetsTransport::new("sheet-1", "expired").with_base_url(base_url);
        let context = SyncContext::new(transport, config());

        let outcome = sync_report(&context, &report()).await;
        assert_eq!(outcome, SyncOutcome::default());
        assert!(recorded.lock().unwrap().writes.is_empty());
    }
}
