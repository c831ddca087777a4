//! End-to-end tests of the ingestion endpoint over HTTP.

use reqwest::multipart::Form;
use serde_json::{json, Value};

mod common;

fn full_record() -> Value {
    json!({
        "name": "Budi",
        "phone": "081234567890",
        "email": "budi@example.com",
        "company": "Warung Budi",
        "message": "Mau promosi",
        "timestamp": "16/10/2026, 09.30.00"
    })
}

#[tokio::test]
async fn test_json_body_appends_row() {
    let intake = common::start_intake().await;
    let client = common::client();

    let res = client
        .post(intake.url("/"))
        .json(&json!({"name": "A", "email": "b@c.d", "message": "hi"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "success");
    assert_eq!(reply["row"], 1);
    assert_eq!(reply["message"], "Data saved successfully via POST");

    let rows = intake.store.rows().await;
    let columns = rows[0].columns();
    assert!(!columns[0].is_empty());
    assert_eq!(&columns[1..], &["A", "", "b@c.d", "", "hi"].map(String::from));
}

#[tokio::test]
async fn test_every_encoding_lands_the_same_row() {
    let intake = common::start_intake().await;
    let client = common::client();
    let packed = full_record().to_string();

    client.post(intake.url("/")).json(&full_record()).send().await.unwrap();
    client
        .post(intake.url("/"))
        .form(&[("data", packed.as_str())])
        .send()
        .await
        .unwrap();
    client
        .post(intake.url("/"))
        .multipart(Form::new().text("data", packed.clone()))
        .send()
        .await
        .unwrap();
    client
        .post(intake.url("/"))
        .form(&[
            ("name", "Budi"),
            ("phone", "081234567890"),
            ("email", "budi@example.com"),
            ("company", "Warung Budi"),
            ("message", "Mau promosi"),
            ("timestamp", "16/10/2026, 09.30.00"),
        ])
        .send()
        .await
        .unwrap();

    let rows = intake.store.rows().await;
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row == &rows[0]));
}

#[tokio::test]
async fn test_discrete_phone_only_post() {
    let intake = common::start_intake().await;

    let res = common::client()
        .post(intake.url("/exec"))
        .form(&[("phone", "0812")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let rows = intake.store.rows().await;
    assert_eq!(&rows[0].columns()[1..], &["", "0812", "", "", ""].map(String::from));
    assert!(!rows[0].timestamp().is_empty());
}

#[tokio::test]
async fn test_get_liveness_checks() {
    let intake = common::start_intake().await;
    let client = common::client();

    for path in ["/", "/exec", "/?company=Warung"] {
        let res = client.get(intake.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200);
        let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"), "{}", content_type);
        assert!(res.text().await.unwrap().starts_with("Lead intake is running!"));
    }

    assert_eq!(intake.store.rows().await.len(), 0);
}

#[tokio::test]
async fn test_get_with_contact_fields_appends() {
    let intake = common::start_intake().await;

    let res = common::client()
        .get(intake.url("/"))
        .query(&[("name", "Sari"), ("email", "sari@example.com"), ("message", "Halo")])
        .send()
        .await
        .unwrap();

    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "success");
    assert_eq!(reply["message"], "Data saved successfully via GET");
    assert_eq!(intake.store.rows().await[0].columns()[1], "Sari");
}

#[tokio::test]
async fn test_malformed_json_is_error_shaped() {
    let intake = common::start_intake().await;
    let client = common::client();
    client.post(intake.url("/")).json(&full_record()).send().await.unwrap();

    let res = client
        .post(intake.url("/"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "error");
    assert_eq!(reply["message"], "Failed to save data via POST");
    assert!(reply["error"].as_str().unwrap().contains("malformed JSON"));
    assert_eq!(intake.store.rows().await.len(), 1);
}

#[tokio::test]
async fn test_empty_post_is_data_absent() {
    let intake = common::start_intake().await;

    let res = common::client().post(intake.url("/")).send().await.unwrap();

    assert_eq!(res.status(), 400);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "error");
    assert!(reply["error"].as_str().unwrap().contains("no data received"));
}

#[tokio::test]
async fn test_store_failure_is_error_shaped() {
    let intake = common::start_intake().await;
    intake.store.set_failing(true);

    let res = common::client()
        .post(intake.url("/"))
        .json(&full_record())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "error");
}

#[tokio::test]
async fn test_request_id_and_cors_headers() {
    let intake = common::start_intake().await;

    let res = common::client()
        .get(intake.url("/"))
        .header("origin", "https://landing.example.com")
        .send()
        .await
        .unwrap();

    let request_id = res.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
    assert!(res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = lead_intake::IntakeConfig::default();
    config.security.max_body_size = 128;
    let intake = common::start_intake_with(config).await;

    let res = common::client()
        .post(intake.url("/"))
        .header("content-type", "application/json")
        .body(format!("{{\"message\":\"{}\"}}", "x".repeat(1024)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["result"], "error");
    assert_eq!(reply["message"], "Failed to save data via POST");
    assert_eq!(intake.store.rows().await.len(), 0);
}
