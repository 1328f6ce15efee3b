//! Verify request building and response decoding against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use spendly_core::types::{AuthResponse, Country, SavingsGoal};
use spendly_core::{ApiClient, Envelope, HttpMethod, MemorySessionStore, ReqwestTransport, SessionStore};

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let session = Arc::new(MemorySessionStore::new());
        if let Some(token) = case["token"].as_str() {
            session.set(token.to_string());
        }
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let client = ApiClient::new(base_url, session, Arc::new(transport));

        let req = client
            .build_json_request(
                parse_method(case["method"].as_str().unwrap()),
                case["path"].as_str().unwrap(),
                &case["body"],
            )
            .unwrap();

        let expected = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{base_url}{}", expected["path"].as_str().unwrap()), "{name}: path");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, expected["body"], "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// List envelopes
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    for case in load(include_str!("../../test-vectors/envelopes.json")) {
        let name = case["name"].as_str().unwrap();
        let envelope: Envelope<Country> = Envelope::decode_str(case["body"].as_str().unwrap());

        let shape = match &envelope {
            Envelope::Direct(_) => "direct",
            Envelope::Wrapped(_) => "wrapped",
            Envelope::Malformed(_) => "malformed",
        };
        assert_eq!(shape, case["expected"]["shape"], "{name}: shape");

        let codes: Vec<String> = envelope.into_items().into_iter().map(|c| c.code).collect();
        let expected: Vec<String> = serde_json::from_value(case["expected"]["codes"].clone()).unwrap();
        assert_eq!(codes, expected, "{name}: codes");
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[test]
fn goal_test_vectors() {
    let raw = include_str!("../../test-vectors/goals.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let today = NaiveDate::parse_from_str(vectors["today"].as_str().unwrap(), "%Y-%m-%d").unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let goal: SavingsGoal = serde_json::from_value(case["payload"].clone()).unwrap();

        assert_eq!(serde_json::to_value(&goal).unwrap(), case["expected"], "{name}: canonical form");
        assert_eq!(goal.progress(), case["progress"].as_f64().unwrap(), "{name}: progress");
        assert_eq!(
            goal.days_remaining_from(today),
            case["days_remaining"].as_i64().unwrap(),
            "{name}: days remaining"
        );
    }
}

// ---------------------------------------------------------------------------
// Auth responses
// ---------------------------------------------------------------------------

#[test]
fn auth_test_vectors() {
    for case in load(include_str!("../../test-vectors/auth.json")) {
        let name = case["name"].as_str().unwrap();
        let res: AuthResponse = serde_json::from_value(case["response"].clone()).unwrap();

        assert_eq!(res.token.as_deref(), case["token"].as_str(), "{name}: token");
        assert_eq!(res.user.as_ref().map(|u| u.id), case["user_id"].as_u64(), "{name}: user");
        assert_eq!(
            res.new_user.is_new_after_login(),
            case["new_after_login"].as_bool().unwrap(),
            "{name}: login"
        );
        assert_eq!(
            res.new_user.is_new_after_signup(),
            case["new_after_signup"].as_bool().unwrap(),
            "{name}: signup"
        );
    }
}
