//! Verify requests and parsed results against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector file describes inputs, the expected request, a simulated
//! response, and either the expected parsed result or the expected error.
//! Results are compared as JSON values so field ordering never matters.

mod common;

use agave_core::{Error, HttpMethod, HttpRequest, Project};
use common::{client, FakeTransport, BASE_URL};
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    if let Some(query) = expected.get("query") {
        let expected_query: Vec<(String, String)> = query
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| {
                let arr = pair.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.query, expected_query, "{name}: query");
    }

    for (header, value) in expected["headers"].as_object().unwrap() {
        assert_eq!(req.header(header), value.as_str(), "{name}: header {header}");
    }
    assert!(req.body.is_none(), "{name}: body should be None");
}

fn check_error(name: &str, err: Error, expected: &str) {
    match expected {
        "NotFound" => assert!(matches!(err, Error::NotFound { .. }), "{name}: expected NotFound, got {err:?}"),
        "Auth" => assert!(matches!(err, Error::Auth { .. }), "{name}: expected Auth, got {err:?}"),
        "Api" => assert!(matches!(err, Error::Api { .. }), "{name}: expected Api, got {err:?}"),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn projects_test_vectors() {
    let raw = include_str!("../../test-vectors/projects.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];

        let transport = FakeTransport::new();
        transport.respond(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap());

        let result = client(&transport)
            .project_management()
            .projects(case["account_token"].as_str().unwrap());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        check_request(name, &requests[0], &case["expected_request"]);

        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let projects = result.unwrap();
            let expected: Vec<Project> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(projects, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn project_test_vectors() {
    let raw = include_str!("../../test-vectors/project.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];

        let transport = FakeTransport::new();
        transport.respond(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap());

        let result = client(&transport).project_management().project(
            case["input_id"].as_str().unwrap(),
            case["account_token"].as_str().unwrap(),
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        check_request(name, &requests[0], &case["expected_request"]);

        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let project = result.unwrap();
            let expected: Project = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(project, expected, "{name}: parsed result");
        }
    }
}
