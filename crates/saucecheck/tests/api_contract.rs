//! REST contract suite against a local stub of the user API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use saucecheck::api::{ApiClient, API_KEY_HEADER};
use saucecheck::suite::{api_suite, create_payload, KNOWN_ID, UNKNOWN_ID};
use saucecheck::{run_suite, ReportSuite, RunOptions, SauceResult};
use serde_json::{json, Value};

type Reply = (StatusCode, Json<Value>);

fn support() -> Value {
    json!({
        "url": "https://contentcaddy.io?utm_source=reqres",
        "text": "Tired of writing endless social media content? Let Content Caddy generate it for you."
    })
}

async fn get_user(Path(id): Path<u32>) -> Reply {
    if id != KNOWN_ID {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    }
    let body = json!({
        "data": {
            "id": 2,
            "email": "janet.weaver@reqres.in",
            "first_name": "Janet",
            "last_name": "Weaver",
            "avatar": "https://reqres.in/img/faces/2-image.jpg"
        },
        "support": support()
    });
    (StatusCode::OK, Json(body))
}

async fn get_resource(Path(id): Path<u32>) -> Reply {
    if id != KNOWN_ID {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    }
    let body = json!({
        "data": {
            "id": 2,
            "name": "fuchsia rose",
            "year": 2001,
            "color": "#C74375",
            "pantone_value": "17-2031"
        },
        "support": support()
    });
    (StatusCode::OK, Json(body))
}

fn stamped(body: Value, extra: &[(&str, Value)]) -> Value {
    let mut object = body.as_object().cloned().unwrap_or_default();
    for (key, value) in extra {
        object.insert((*key).to_string(), value.clone());
    }
    Value::Object(object)
}

async fn create_user(Json(body): Json<Value>) -> Reply {
    let created = stamped(
        body,
        &[("id", json!("811")), ("createdAt", json!("2026-10-19T09:00:00.000Z"))],
    );
    (StatusCode::CREATED, Json(created))
}

async fn update_user(Path(_id): Path<u32>, Json(body): Json<Value>) -> Reply {
    let updated = stamped(body, &[("updatedAt", json!("2026-10-19T09:00:00.000Z"))]);
    (StatusCode::OK, Json(updated))
}

async fn delete_user(Path(_id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn reqres() -> Router {
    Router::new()
        .route("/api/users", axum::routing::post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/api/unknown/{id}", get(get_resource))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn fresh_client(base_url: String) -> SauceResult<ApiClient> {
    Ok(ApiClient::new(base_url))
}

async fn run_against(app: Router) -> ReportSuite {
    let base_url = serve(app).await;
    let factory = move || fresh_client(base_url.clone());
    run_suite(&api_suite(), &factory, &RunOptions::default()).await
}

fn outcomes(report: &ReportSuite) -> Vec<(String, bool)> {
    report
        .suites
        .iter()
        .flat_map(|group| &group.specs)
        .map(|spec| (spec.title.clone(), spec.ok))
        .collect()
}

#[tokio::test]
async fn test_contract_holds_against_conforming_api() {
    let report = run_against(reqres()).await;
    assert_eq!(report.title, "api.spec");
    assert_eq!(report.suites.len(), 6);
    let results = outcomes(&report);
    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|(_, ok)| *ok), "{results:?}");
}

#[tokio::test]
async fn test_client_reports_status_type_and_body() {
    let client = ApiClient::new(serve(reqres()).await);

    let found = client.get_user(KNOWN_ID).await.unwrap();
    assert_eq!(found.status, 200);
    assert!(found.is_json());
    assert_eq!(found.body["data"]["first_name"], "Janet");

    let missing = client.get_resource(UNKNOWN_ID).await.unwrap();
    assert_eq!(missing.status, 404);
    assert!(missing.is_empty_object());

    let created = client.create_user(&create_payload()).await.unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.body["job"], "leader");

    let deleted = client.delete_user(KNOWN_ID).await.unwrap();
    assert_eq!(deleted.status, 204);
    assert_eq!(deleted.body, Value::Null);
}

#[tokio::test]
async fn test_extra_field_breaks_single_user_contract() {
    async fn chatty_user() -> Reply {
        let body = json!({
            "data": {
                "id": 2,
                "email": "janet.weaver@reqres.in",
                "first_name": "Janet",
                "last_name": "Weaver",
                "avatar": "https://reqres.in/img/faces/2-image.jpg"
            },
            "support": support(),
            "_meta": {"powered_by": "stub"}
        });
        (StatusCode::OK, Json(body))
    }

    let app = Router::new()
        .route("/api/users/{id}", get(chatty_user))
        .route("/api/unknown/{id}", get(get_resource));
    let report = run_against(app).await;
    let results = outcomes(&report);
    assert_eq!(results[0], ("TC-001: Successful".to_string(), false));
    let error = report.suites[0].specs[0].error.as_deref().unwrap();
    assert!(error.contains("single user"), "{error}");
    assert_eq!(results[2], ("TC-003: Successful".to_string(), true));
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    async fn keyed(headers: HeaderMap) -> Reply {
        match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
            Some("reqres-free-v1") => (StatusCode::OK, Json(json!({"ok": true}))),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({"error": "Missing API key"}))),
        }
    }

    let base_url = serve(Router::new().route("/api/users/{id}", get(keyed))).await;
    let anonymous = ApiClient::new(&base_url).get_user(KNOWN_ID).await.unwrap();
    assert_eq!(anonymous.status, 401);

    let keyed_client = ApiClient::new(&base_url).with_api_key("reqres-free-v1");
    assert_eq!(keyed_client.get_user(KNOWN_ID).await.unwrap().status, 200);
}

#[tokio::test]
#[ignore = "talks to the public reqres.in API"]
async fn test_live_contract() {
    let config = saucecheck::SuiteConfig::default().with_api_key("reqres-free-v1");
    let factory = move || {
        let client = ApiClient::from_config(&config);
        async move { SauceResult::Ok(client) }
    };
    let report = run_suite(&api_suite(), &factory, &RunOptions::default()).await;
    assert!(outcomes(&report).iter().all(|(_, ok)| *ok));
}
