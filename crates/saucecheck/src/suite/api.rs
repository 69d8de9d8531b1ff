//! REST contract suite (`TC-001`..`TC-008`).

use crate::api::{
    json_contains, ApiClient, ApiResponse, CreatedUser, PatchedUser, Schema, SingleResource,
    SingleUser, UpdatedUser, UserPayload,
};
use crate::assertion::{ensure, ensure_eq};
use crate::harness::{TestGroup, TestSuite};
use crate::result::SauceResult;
use futures::FutureExt;

/// Title of the API suite in reports
pub const API_SUITE_TITLE: &str = "api.spec";

/// Existing user and resource id
pub const KNOWN_ID: u32 = 2;

/// Id that does not exist
pub const UNKNOWN_ID: u32 = 23;

/// Body of the create call
pub fn create_payload() -> UserPayload {
    UserPayload::new("morpheus", "leader")
}

/// Body of the update and patch calls
pub fn update_payload() -> UserPayload {
    UserPayload::new("morpheus", "zion resident")
}

/// Build the API suite
pub fn api_suite() -> TestSuite<ApiClient> {
    TestSuite::new(API_SUITE_TITLE)
        .group(
            TestGroup::new("GET - SINGLE USER")
                .case("TC-001: Successful", |c: &ApiClient| get_user(c).boxed())
                .case("TC-002: Not found", |c: &ApiClient| {
                    async move { expect_not_found(c.get_user(UNKNOWN_ID).await?) }.boxed()
                }),
        )
        .group(
            TestGroup::new("GET - SINGLE USER<RESOURCE>")
                .case("TC-003: Successful", |c: &ApiClient| get_resource(c).boxed())
                .case("TC-004: Not found", |c: &ApiClient| {
                    async move { expect_not_found(c.get_resource(UNKNOWN_ID).await?) }.boxed()
                }),
        )
        .group(
            TestGroup::new("POST - CREATE USER")
                .case("TC-005: Successful", |c: &ApiClient| create_user(c).boxed()),
        )
        .group(
            TestGroup::new("PUT - UPDATE")
                .case("TC-006: Successful", |c: &ApiClient| update_user(c).boxed()),
        )
        .group(
            TestGroup::new("PATCH - PARTIAL UPDATE")
                .case("TC-007: Successful", |c: &ApiClient| patch_user(c).boxed()),
        )
        .group(
            TestGroup::new("DELETE - DELETE")
                .case("TC-008: Successful", |c: &ApiClient| delete_user(c).boxed()),
        )
}

/// Status and content type, then the body contract
fn expect_json<S: Schema>(response: &ApiResponse, status: u16) -> SauceResult<S> {
    ensure_eq(&response.status, &status, "Response code")?;
    ensure(
        response.is_json(),
        format!(
            "content-type should contain application/json, got {:?}",
            response.content_type
        ),
    )?;
    S::validate(&response.body)
}

fn expect_not_found(response: ApiResponse) -> SauceResult<()> {
    ensure_eq(&response.status, &404, "Response code")?;
    ensure(response.is_json(), "content-type should contain application/json")?;
    ensure(
        response.is_empty_object(),
        format!("Body should be an empty object, got {}", response.body),
    )
}

fn expect_containing(response: &ApiResponse, payload: &UserPayload) -> SauceResult<()> {
    let expected = serde_json::to_value(payload)?;
    ensure(
        json_contains(&response.body, &expected),
        format!("Body {} should contain {expected}", response.body),
    )
}

async fn get_user(client: &ApiClient) -> SauceResult<()> {
    let response = client.get_user(KNOWN_ID).await?;
    let user: SingleUser = expect_json(&response, 200)?;
    tracing::debug!(email = %user.data.email, "user fetched");
    Ok(())
}

async fn get_resource(client: &ApiClient) -> SauceResult<()> {
    let response = client.get_resource(KNOWN_ID).await?;
    expect_json::<SingleResource>(&response, 200).map(drop)
}

async fn create_user(client: &ApiClient) -> SauceResult<()> {
    let payload = create_payload();
    let response = client.create_user(&payload).await?;
    let created: CreatedUser = expect_json(&response, 201)?;
    tracing::debug!(id = %created.id, "user created");
    expect_containing(&response, &payload)
}

async fn update_user(client: &ApiClient) -> SauceResult<()> {
    let payload = update_payload();
    let response = client.update_user(KNOWN_ID, &payload).await?;
    expect_json::<UpdatedUser>(&response, 200)?;
    expect_containing(&response, &payload)
}

async fn patch_user(client: &ApiClient) -> SauceResult<()> {
    let payload = update_payload();
    let response = client.patch_user(KNOWN_ID, &payload).await?;
    expect_json::<PatchedUser>(&response, 200)?;
    expect_containing(&response, &payload)
}

async fn delete_user(client: &ApiClient) -> SauceResult<()> {
    let response = client.delete_user(KNOWN_ID).await?;
    ensure_eq(&response.status, &204, "Response code")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: serde_json::Value) -> ApiResponse {
        ApiResponse {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body,
        }
    }

    #[test]
    fn test_suite_layout() {
        let suite = api_suite();
        assert_eq!(suite.groups.len(), 6);
        assert_eq!(suite.test_count(), 8);
        assert_eq!(suite.groups[1].title, "GET - SINGLE USER<RESOURCE>");
    }

    #[test]
    fn test_not_found_needs_empty_object() {
        assert!(expect_not_found(response(404, json!({}))).is_ok());
        assert!(expect_not_found(response(404, json!({"error": "x"}))).is_err());
        assert!(expect_not_found(response(200, json!({}))).is_err());
    }

    #[test]
    fn test_wrong_status_fails_before_schema() {
        let err = expect_json::<PatchedUser>(&response(500, json!({})), 200).unwrap_err();
        assert!(err.to_string().contains("Response code"));
    }

    #[test]
    fn test_html_content_type_rejected() {
        let mut html = response(200, json!({"updatedAt": "x"}));
        html.content_type = Some("text/html".to_string());
        assert!(expect_json::<PatchedUser>(&html, 200).is_err());
    }

    #[test]
    fn test_containing_payload() {
        let body = json!({"name": "morpheus", "job": "leader", "id": "7", "createdAt": "t"});
        assert!(expect_containing(&response(201, body), &create_payload()).is_ok());
        let other = json!({"name": "morpheus", "job": "zion resident"});
        assert!(expect_containing(&response(200, other), &create_payload()).is_err());
    }
}
