use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{MemoryUserStore, RecordingQueryBase, TestApp};
use crate::query::SqlParam;

fn rows(n: i64) -> Vec<serde_json::Value> {
    (1..=n).map(|id| json!({ "id": id, "title": format!("Recipe {}", id) })).collect()
}

#[tokio::test]
async fn short_search_term_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.get("/ingredients/search/ab", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search must be at least 3 characters long");
    assert!(app.queries.queries().is_empty());
}

#[tokio::test]
async fn unknown_sort_falls_back_to_primary_key() {
    let app = TestApp::with_query_base(RecordingQueryBase::new(2, rows(2)));
    let (status, body) = app.get("/recipes?sort=bogusColumn:asc", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let selects = app.queries.selects();
    assert_eq!(selects.len(), 1);
    assert!(selects[0]
        .query
        .ends_with(r#"FROM "recipes" WHERE "is_public" = $1 ORDER BY "id" ASC LIMIT 15"#));
    assert_eq!(selects[0].params, vec![SqlParam::Bool(true)]);
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_accurate_meta() {
    let app = TestApp::with_query_base(RecordingQueryBase::new(30, rows(15)));
    let (status, body) = app.get("/ingredients?page=5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": [],
            "meta": { "count": 0, "total": 30, "per_page": 15, "current_page": 5, "last_page": 2 }
        })
    );
    assert!(app.queries.selects().is_empty());
}

#[tokio::test]
async fn admin_config_requires_an_admin() {
    let app = TestApp::new();
    let update = json!({ "path": "mail.from_address", "value": "kitchen@example.com" });

    let (status, _) = app.request(Method::PUT, "/admin/config", None, Some(update.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let member = app.access_token(MemoryUserStore::MEMBER_ID).await;
    let (status, _) = app.request(Method::PUT, "/admin/config", Some(&member), Some(update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.access_token(MemoryUserStore::ADMIN_ID).await;
    let (status, body) = app.request(Method::PUT, "/admin/config", Some(&admin), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["path"], "mail.from_address");

    let (status, body) = app.get("/admin/config", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mail.from_address"], "kitchen@example.com");
}

#[tokio::test]
async fn admin_config_rejects_bad_paths() {
    let app = TestApp::new();
    let admin = app.access_token(MemoryUserStore::ADMIN_ID).await;
    let update = json!({ "path": "Mail..From", "value": 1 });

    let (status, body) = app.request(Method::PUT, "/admin/config", Some(&admin), Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["path"].is_string());
    assert!(app.settings.all_paths().is_empty());
}

#[tokio::test]
async fn demo_credential_is_never_unauthorized() {
    let app = TestApp::new();

    for _ in 0..3 {
        let (status, body) = app.get("/auth/me", Some("demo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["demo"], true);
        assert_eq!(body["data"]["admin"], false);
    }

    let group = app.tokens.records()[0].group_id;
    app.tokens.expire_group(group);
    let (status, _) = app.get("/auth/me", Some("demo")).await;
    assert_eq!(status, StatusCode::OK);

    // Logging out of the shared demo session is a no-op.
    let (status, _) = app.request(Method::POST, "/auth/logout", Some("demo"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.tokens.records().iter().all(|r| !r.revoked));
}

#[tokio::test]
async fn logout_revokes_both_tokens_of_the_pair() {
    let app = TestApp::new();
    let pair = app.state.tokens.issue_pair(MemoryUserStore::MEMBER_ID).await.unwrap();

    let (status, _) = app.get("/auth/me", Some(&pair.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::POST, "/auth/logout", Some(&pair.access_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    let (status, body) = app.get("/auth/me", Some(&pair.access_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let refresh = json!({ "refresh_token": pair.refresh_token });
    let (status, _) = app.request(Method::POST, "/auth/refresh", None, Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_then_refresh() {
    let app = TestApp::new();
    app.users.set_password(MemoryUserStore::MEMBER_ID, "s3cret-pass");

    let wrong = json!({ "email": MemoryUserStore::MEMBER_EMAIL, "password": "nope" });
    let (status, _) = app.request(Method::POST, "/auth/login", None, Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = json!({ "email": "Cook@Example.com", "password": "s3cret-pass" });
    let (status, body) = app.request(Method::POST, "/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = app.get("/auth/me", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], MemoryUserStore::MEMBER_EMAIL);

    // A refresh token is not a bearer credential.
    let (status, _) = app.get("/auth/me", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(Method::POST, "/auth/refresh", None, Some(json!({ "refresh_token": refresh })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["access_token"].as_str().unwrap().to_string();

    assert_eq!(app.get("/auth/me", Some(&access)).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/auth/me", Some(&rotated)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn login_body_must_be_json() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::POST, "/auth/login", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn recipe_visibility_follows_the_principal() {
    let app = TestApp::with_query_base(RecordingQueryBase::new(1, rows(1)));

    let member = app.access_token(MemoryUserStore::MEMBER_ID).await;
    app.get("/recipes", Some(&member)).await;
    let admin = app.access_token(MemoryUserStore::ADMIN_ID).await;
    app.get("/recipes", Some(&admin)).await;
    // Optional auth: an unusable token is treated as no token.
    let (status, _) = app.get("/recipes", Some("garbage")).await;
    assert_eq!(status, StatusCode::OK);

    let selects = app.queries.selects();
    assert!(selects[0].query.contains(r#"WHERE ("is_public" = $1 OR "user_id" = $2)"#));
    assert_eq!(
        selects[0].params,
        vec![SqlParam::Bool(true), SqlParam::Int(MemoryUserStore::MEMBER_ID)]
    );
    assert!(!selects[1].query.contains("WHERE"));
    assert!(selects[2].query.contains(r#"WHERE "is_public" = $1"#));
}

#[tokio::test]
async fn recipe_search_combines_filter_and_term() {
    let app = TestApp::with_query_base(RecordingQueryBase::new(1, rows(1)));
    let (status, _) = app
        .get("/recipes/search/100%25%20rye?filter[difficulty]=easy&filter[password]=x&sort=title:desc", None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let select = &app.queries.selects()[0];
    assert!(select.query.contains(
        r#"WHERE "is_public" = $1 AND "difficulty" = $2 AND ("title" ILIKE $3 OR "description" ILIKE $3)"#
    ));
    assert!(select.query.contains(r#"ORDER BY "title" DESC"#));
    assert_eq!(select.params[2], SqlParam::Text(r"%100\% rye%".to_string()));
}

#[tokio::test]
async fn uncoercible_filter_value_is_a_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.get("/recipes?filter[servings]=lots", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["filter[servings]"].is_string());
}

#[tokio::test]
async fn invalid_pagination_is_a_bad_request() {
    let app = TestApp::new();
    assert_eq!(app.get("/ingredients?page=0", None).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/ingredients?per_page=ten", None).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_integer_id_is_no_route() {
    let app = TestApp::new();
    let (status, body) = app.get("/recipes/abc", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn show_reports_missing_records() {
    let app = TestApp::new();
    let (status, body) = app.get("/ingredients/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ingredient 42 not found");

    let app = TestApp::with_query_base(RecordingQueryBase::new(1, rows(1)));
    let (status, body) = app.get("/ingredients/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
    assert!(app.queries.selects()[0].query.contains(r#"WHERE "id" = $1"#));
}

#[tokio::test]
async fn email_verification_link_round_trip() {
    let app = TestApp::new();
    let member = app.access_token(MemoryUserStore::MEMBER_ID).await;

    let (status, body) = app
        .request(Method::POST, "/auth/email/verification", Some(&member), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["signature"].is_string());
    assert!(body["data"]["expires"].is_string());
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/auth/email/verify/1/"));

    let tampered = url.replacen("/verify/1/", "/verify/2/", 1);
    let (status, body) = app.get(&tampered, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid signature");

    let (status, _) = app.get(&url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app
        .users
        .get(MemoryUserStore::MEMBER_ID)
        .unwrap()
        .email_verified_at
        .is_some());
}

#[tokio::test]
async fn verification_of_a_vanished_user_is_not_found() {
    let app = TestApp::new();
    let member = app.access_token(MemoryUserStore::MEMBER_ID).await;
    let (_, body) = app
        .request(Method::POST, "/auth/email/verification", Some(&member), None)
        .await;
    let url = body["data"]["url"].as_str().unwrap().to_string();

    app.users.lose_updates();
    let (status, body) = app.get(&url, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User 1 not found");
}

#[tokio::test]
async fn health_reports_datastore_outage() {
    let app = TestApp::new();
    assert_eq!(app.get("/health", None).await.0, StatusCode::OK);

    let app = TestApp::with_query_base(RecordingQueryBase {
        unavailable: true,
        ..RecordingQueryBase::default()
    });
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body["message"].as_str().unwrap().contains("refused"));
}
