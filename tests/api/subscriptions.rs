use chrono::NaiveDate;
use sqlx::{postgres::PgRow, Row};
use uuid::Uuid;

use crate::helpers::{subscription_body, TestApp};

#[tokio::test]
async fn create_returns_201_when_body_is_valid() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();
    let body = subscription_body("Netflix", 999, &user_id, "07-2025", Some("12-2025"));

    let response = test_app.post_subscription(&body).await;

    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn create_persists_the_new_subscription_at_month_granularity() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4();
    let body = subscription_body("Netflix", 999, &user_id.to_string(), "07-2025", None);

    test_app.post_subscription(&body).await;

    let (service_name, price, stored_user_id, start_date, end_date) = sqlx::query(
        "SELECT service_name, price, user_id, start_date, end_date FROM subscriptions;",
    )
    .map(|row: PgRow| {
        (
            row.get::<String, _>("service_name"),
            row.get::<i32, _>("price"),
            row.get::<Uuid, _>("user_id"),
            row.get::<NaiveDate, _>("start_date"),
            row.get::<Option<NaiveDate>, _>("end_date"),
        )
    })
    .fetch_one(&test_app.db_pool)
    .await
    .expect("Query to fetch subscriptions failed.");

    assert_eq!(service_name, "Netflix");
    assert_eq!(price, 999);
    assert_eq!(stored_user_id, user_id);
    assert_eq!(start_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    assert_eq!(end_date, None);
}

#[tokio::test]
async fn create_returns_400_when_body_require_field_is_missing() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (serde_json::json!({}), "missing body parameters"),
        (
            serde_json::json!({"price": 999, "user_id": user_id, "start_date": "07-2025"}),
            "missing service_name",
        ),
        (
            serde_json::json!({"service_name": "Netflix", "user_id": user_id, "start_date": "07-2025"}),
            "missing price",
        ),
        (
            serde_json::json!({"service_name": "Netflix", "price": 999, "start_date": "07-2025"}),
            "missing user_id",
        ),
        (
            serde_json::json!({"service_name": "Netflix", "price": 999, "user_id": user_id}),
            "missing start_date",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn create_returns_400_when_body_is_present_but_not_valid() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();

    let test_cases = vec![
        (
            subscription_body("", 999, &user_id, "07-2025", None),
            "service_name",
        ),
        (
            subscription_body("Netflix", -1, &user_id, "07-2025", None),
            "price",
        ),
        (
            subscription_body("Netflix", 999, "not-a-uuid", "07-2025", None),
            "user_id",
        ),
        (
            subscription_body("Netflix", 999, &user_id, "13-2025", None),
            "start_date",
        ),
        (
            subscription_body("Netflix", 999, &user_id, "07-2025", Some("2025-12")),
            "end_date",
        ),
    ];

    for (invalid_body, field) in test_cases {
        let response = test_app.post_subscription(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when {} was invalid",
            field
        );

        let body: serde_json::Value = response.json().await.unwrap();
        let error = body["error"].as_str().unwrap();

        assert!(
            error.contains(field),
            "Error message {:?} does not name the {} field",
            error,
            field
        );
    }

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions;")
        .fetch_one(&test_app.db_pool)
        .await
        .unwrap();

    assert_eq!(stored, 0);
}

#[tokio::test]
async fn create_returns_500_without_leaking_details_when_key_already_exists() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();
    let body = subscription_body("Netflix", 999, &user_id, "07-2025", None);

    test_app.post_subscription(&body).await;
    let response = test_app.post_subscription(&body).await;

    assert_eq!(500, response.status().as_u16());

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn list_without_filters_returns_every_subscription() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();

    for (service_name, start_date) in [("Netflix", "01-2025"), ("Spotify", "02-2025")] {
        let body = subscription_body(service_name, 500, &user_id, start_date, None);
        assert_eq!(201, test_app.post_subscription(&body).await.status().as_u16());
    }

    let response = test_app.list_subscriptions(&[]).await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions: Vec<serde_json::Value> = response.json().await.unwrap();

    assert_eq!(subscriptions.len(), 2);
}

#[tokio::test]
async fn list_matches_service_name_as_case_insensitive_substring() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();

    for service_name in ["Netflix", "Spotify"] {
        let body = subscription_body(service_name, 500, &user_id, "01-2025", None);
        test_app.post_subscription(&body).await;
    }

    let response = test_app.list_subscriptions(&[("service_name", "FLIX")]).await;
    let subscriptions: Vec<serde_json::Value> = response.json().await.unwrap();

    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0]["service_name"], "Netflix");
}

#[tokio::test]
async fn list_filters_by_exact_user_id() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();
    let other_user_id = Uuid::new_v4().to_string();

    for user in [&user_id, &other_user_id] {
        let body = subscription_body("Netflix", 500, user, "01-2025", None);
        test_app.post_subscription(&body).await;
    }

    let response = test_app
        .list_subscriptions(&[("user_id", user_id.as_str())])
        .await;
    let subscriptions: Vec<serde_json::Value> = response.json().await.unwrap();

    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0]["user_id"], user_id);
}

#[tokio::test]
async fn list_bounds_only_the_start_date() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();

    let bodies = [
        subscription_body("Before", 100, &user_id, "12-2024", Some("06-2025")),
        subscription_body("Inside", 100, &user_id, "03-2025", None),
        subscription_body("Edge", 100, &user_id, "06-2025", None),
        subscription_body("After", 100, &user_id, "07-2025", None),
    ];

    for body in &bodies {
        test_app.post_subscription(body).await;
    }

    let response = test_app
        .list_subscriptions(&[("start_date", "01-2025"), ("end_date", "06-2025")])
        .await;
    let subscriptions: Vec<serde_json::Value> = response.json().await.unwrap();
    let mut names: Vec<&str> = subscriptions
        .iter()
        .map(|subscription| subscription["service_name"].as_str().unwrap())
        .collect();
    names.sort();

    assert_eq!(names, vec!["Edge", "Inside"]);
}

#[tokio::test]
async fn list_returns_400_when_filters_are_malformed() {
    let test_app = TestApp::spawn_app().await;

    let test_cases = vec![
        (vec![("user_id", "42")], "invalid user_id"),
        (vec![("start_date", "2025-01")], "invalid start_date"),
        (vec![("end_date", "1-2025")], "invalid end_date"),
    ];

    for (query, error_message) in test_cases {
        let response = test_app.list_subscriptions(&query).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status for {}",
            error_message
        );
    }
}

#[tokio::test]
async fn list_treats_empty_parameters_as_absent() {
    let test_app = TestApp::spawn_app().await;
    let user_id = Uuid::new_v4().to_string();
    let body = subscription_body("Netflix", 500, &user_id, "01-2025", None);

    test_app.post_subscription(&body).await;

    let response = test_app
        .list_subscriptions(&[("user_id", ""), ("service_name", ""), ("start_date", "")])
        .await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions: Vec<serde_json::Value> = response.json().await.unwrap();

    assert_eq!(subscriptions.len(), 1);
}
