mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{Portal, SECRET, token, token_issued_at};

#[tokio::test]
async fn school_administrator_can_manage_their_school_but_not_another() {
    let portal = Portal::new();
    let root = portal.user("root@portal.edu", true).await;
    let head = portal.user("head@lincoln.edu", false).await;
    let root_token = token(root.id, SECRET, 300);
    let head_token = token(head.id, SECRET, 300);

    let (status, lincoln) = portal
        .call(
            Some(&root_token),
            json!({"operation": "create_school", "input": {"name": "Lincoln High"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let lincoln_id = lincoln["query"]["id"].as_i64().expect("school id");

    let (_, roosevelt) = portal
        .call(
            Some(&root_token),
            json!({"operation": "create_school", "input": {"name": "Roosevelt High"}}),
        )
        .await;
    let roosevelt_id = roosevelt["query"]["id"].as_i64().expect("school id");

    let (status, _) = portal
        .call(
            Some(&root_token),
            json!({
                "operation": "add_administrator",
                "input": {"school_id": lincoln_id, "user_id": head.id}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, news) = portal
        .call(
            Some(&head_token),
            json!({
                "operation": "publish_news",
                "input": {"school_id": lincoln_id, "title": "Science fair", "body": "Friday at noon."}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(news["query"]["author_id"], head.id);

    let (_, grade) = portal
        .call(
            Some(&head_token),
            json!({"operation": "create_grade", "input": {"school_id": lincoln_id, "name": "9th grade"}}),
        )
        .await;
    let grade_id = grade["query"]["id"].as_i64().expect("grade id");

    let (status, repository) = portal
        .call(
            Some(&head_token),
            json!({
                "operation": "create_repository",
                "input": {
                    "school_id": lincoln_id,
                    "grade_id": grade_id,
                    "title": "Algebra worksheets",
                    "url": "https://drive.example.org/algebra"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repository["query"]["grade_id"], grade_id);

    let (status, office_hour) = portal
        .call(
            Some(&head_token),
            json!({
                "operation": "create_office_hour",
                "input": {
                    "school_id": lincoln_id,
                    "title": "Front office",
                    "time_groups": [
                        {"day": "monday", "opens_at": "08:00:00", "closes_at": "16:00:00"}
                    ]
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(office_hour["query"]["time_groups"][0]["day"], "monday");

    let (status, denied) = portal
        .call(
            Some(&head_token),
            json!({"operation": "create_grade", "input": {"school_id": roosevelt_id, "name": "9th grade"}}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(denied["error_code"], 403);
}

#[tokio::test]
async fn token_signed_with_another_secret_fails_the_request() {
    let portal = Portal::new();
    let root = portal.user("root@portal.edu", true).await;

    let (status, payload) = portal
        .call(
            Some(&token(root.id, "not-the-portal-secret", 300)),
            json!({"operation": "find_school", "input": {"school_id": 1}}),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(payload["data"].is_null());
    assert_eq!(payload["errors"][0]["message"], "Error decoding signature");
}

#[tokio::test]
async fn expired_token_fails_the_request() {
    let portal = Portal::new();
    let root = portal.user("root@portal.edu", true).await;

    let (status, payload) = portal
        .call(
            Some(&token_issued_at(root.id, SECRET, 1_000_000, 300)),
            json!({"operation": "find_school", "input": {"school_id": 1}}),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["errors"][0]["message"], "Signature has expired");
}

#[tokio::test]
async fn token_for_deleted_user_resolves_as_anonymous() {
    let portal = Portal::new();

    let (status, payload) = portal
        .call(
            Some(&token(9_999, SECRET, 300)),
            json!({
                "operation": "register_user",
                "input": {"email": "new@lincoln.edu", "first_name": "Alan", "last_name": "Turing"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], true);

    let (status, payload) = portal
        .call(
            Some(&token(9_999, SECRET, 300)),
            json!({"operation": "create_school", "input": {"name": "Lincoln High"}}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["status"], false);
}

#[tokio::test]
async fn short_school_name_is_reported_on_the_name_field() {
    let portal = Portal::new();
    let root = portal.user("root@portal.edu", true).await;

    let (status, payload) = portal
        .call(
            Some(&token(root.id, SECRET, 300)),
            json!({"operation": "create_school", "input": {"name": "Abc"}}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], false);
    assert!(payload["query"].is_null());
    assert_eq!(payload["errors"][0]["field"], "name");
}

#[tokio::test]
async fn registering_the_same_email_twice_is_rejected_on_email() {
    let portal = Portal::new();
    let input = json!({
        "operation": "register_user",
        "input": {"email": "twin@lincoln.edu", "first_name": "Ada", "last_name": "Byron"}
    });

    let (status, _) = portal.call(None, input.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, payload) = portal.call(None, input).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["errors"][0]["field"], "email");
    assert_eq!(payload["errors"][0]["details"]["code"], "already-exists");
}
