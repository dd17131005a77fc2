use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ACCOUNT_TOKEN, CLIENT_ID, CLIENT_SECRET};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("API-Version", "2021-11-21")
        .header("Client-Id", CLIENT_ID)
        .header("Client-Secret", CLIENT_SECRET)
}

fn account_get(uri: &str) -> Request<String> {
    authed("GET", uri)
        .header("Account-Token", ACCOUNT_TOKEN)
        .body(String::new())
        .unwrap()
}

fn project_get(uri: &str, project_id: &str) -> Request<String> {
    authed("GET", uri)
        .header("Account-Token", ACCOUNT_TOKEN)
        .header("Project-Id", project_id)
        .body(String::new())
        .unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<String> {
    authed("POST", uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- credentials ---

#[tokio::test]
async fn missing_client_credentials_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/projects")
                .header("Account-Token", ACCOUNT_TOKEN)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "invalid client credentials");
}

#[tokio::test]
async fn missing_account_token_returns_401() {
    let resp = app()
        .oneshot(authed("GET", "/projects").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_account_token_returns_401() {
    let resp = app()
        .oneshot(
            authed("GET", "/projects")
                .header("Account-Token", "forged")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- projects ---

#[tokio::test]
async fn list_projects_returns_envelope() {
    let resp = app().oneshot(account_get("/projects")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_count"], 2);
    assert!(body["pagination"]["next_page"].is_null());
}

#[tokio::test]
async fn list_projects_paginates() {
    let resp = app()
        .oneshot(account_get("/projects?page=1&per_page=1"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], "p1");
    assert_eq!(body["pagination"]["next_page"], 2);

    let resp = app()
        .oneshot(account_get("/projects?page=2&per_page=1"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["id"], "p2");
    assert!(body["pagination"]["next_page"].is_null());
}

#[tokio::test]
async fn list_projects_past_the_last_page_is_empty() {
    let resp = app()
        .oneshot(account_get("/projects?page=18446744073709551615&per_page=2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total_count"], 2);
    assert!(body["pagination"]["next_page"].is_null());
}

#[tokio::test]
async fn get_project() {
    let resp = app().oneshot(account_get("/projects/p1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Roof");
}

#[tokio::test]
async fn get_project_not_found() {
    let resp = app().oneshot(account_get("/projects/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "projects missing not found");
}

// --- project-scoped records ---

#[tokio::test]
async fn rfis_require_project_id() {
    let resp = app().oneshot(account_get("/rfis")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rfis_are_filtered_by_project() {
    let resp = app().oneshot(project_get("/rfis", "p1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["r1", "r2"]);
}

#[tokio::test]
async fn rfi_from_other_project_is_not_found() {
    let resp = app().oneshot(project_get("/rfis/r3", "p1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vendors_do_not_need_project_id() {
    let resp = app().oneshot(account_get("/vendors")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["name"], "Acme Roofing");
}

// --- files ---

#[tokio::test]
async fn root_folder_for_project() {
    let resp = app().oneshot(project_get("/root-folder", "p1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], "f-root");
    assert_eq!(body["folders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn root_folder_unknown_project() {
    let resp = app().oneshot(project_get("/root-folder", "p2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn folder_files_listed() {
    let resp = app()
        .oneshot(account_get("/folders/f-drawings/files"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["name"], "A-501.pdf");
}

// --- link ---

#[tokio::test]
async fn create_link_token() {
    let resp = app()
        .oneshot(json_post("/link/token/create", r#"{"reference_id":"tenant-7"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["link_token"].as_str().unwrap().starts_with("link-"));
}

#[tokio::test]
async fn create_link_token_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_post("/link/token/create", r#"{"not_reference":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn exchanged_token_unlocks_account_routes() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_post("/link/token/exchange", r#"{"public_token":"public-abc"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let token = body["account_token"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            authed("GET", "/projects/p2")
                .header("Account-Token", token)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Foundation");
}

#[tokio::test]
async fn exchange_rejects_bad_public_token() {
    let resp = app()
        .oneshot(json_post("/link/token/exchange", r#"{"public_token":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
