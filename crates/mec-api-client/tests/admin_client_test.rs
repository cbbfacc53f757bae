//! Contract tests for AdminApiClient against a simulated admin API.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/api/v1/{collection}` | `list_*` |
//! | GET    | `/api/v1/{collection}/{id}` | `get_*` |
//! | POST   | `/api/v1/{collection}` | `create_*` |
//! | PUT    | `/api/v1/{collection}/{id}` | `update_*` |
//! | DELETE | `/api/v1/{collection}/{id}` | `delete_*` |
//! | POST   | `/api/v1/{collection}/delete` | `bulk_delete_*` |
//! | POST   | `/api/v1/upload` | `upload_*` |
//! | POST   | `/api/v1/upload/delete` | `delete_uploads_*` |
//! | GET    | `/api/v1/dashboard` | `dashboard_*` |

use mec_api_client::{AdminApiClient, AdminApiConfig};
use mec_core::{AdminBackend, AssetUpload, AssetUrl, BackendError, EntityKind, FieldMap, RecordId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client pointed at a wiremock server.
async fn test_client(mock_server: &MockServer) -> AdminApiClient {
    let config =
        AdminApiConfig::new(&format!("{}/api/v1", mock_server.uri()), "test-token").unwrap();
    AdminApiClient::new(config).unwrap()
}

fn payload(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("payload must be an object"),
    }
}

// ── GET /api/v1/{collection} ─────────────────────────────────────────

#[tokio::test]
async fn list_sends_bearer_token_and_decodes_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/banners"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"_id": "b1", "name": "Hero", "position": 1, "is_active": true, "img": "https://cdn/h.png"},
                {"_id": "b2", "name": "Footer", "position": 2, "is_active": false, "img": "https://cdn/f.png"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let records = client.fetch_list(EntityKind::Banner).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_str(), "b1");
    assert_eq!(records[1].bool_field("is_active"), Some(false));
}

#[tokio::test]
async fn list_subscribers_accepts_wrapped_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/subscribers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"subscribers": [{"_id": "s1", "email": "a@x.io"}]}
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let records = client.fetch_list(EntityKind::Subscriber).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].str_field("email"), Some("a@x.io"));
}

#[tokio::test]
async fn list_rejection_carries_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Session expired"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let err = client.fetch_list(EntityKind::Work).await.unwrap_err();
    assert_eq!(err, BackendError::rejected("Session expired"));
}

#[tokio::test]
async fn list_unreachable_server_is_transport_failure() {
    let config = AdminApiConfig::local_mock(1, "t").unwrap();
    let client = AdminApiClient::new(config).unwrap();
    let err = client.fetch_list(EntityKind::Client).await.unwrap_err();
    assert!(!err.is_rejection());
}

// ── GET /api/v1/{collection}/{id} ────────────────────────────────────

#[tokio::test]
async fn get_enquiry_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/enquiries/e1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"_id": "e1", "name": "Dee", "is_opened": false}
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let record = client
        .fetch_record(EntityKind::Enquiry, &RecordId::new("e1").unwrap())
        .await
        .unwrap();
    assert_eq!(record.str_field("name"), Some("Dee"));
}

#[tokio::test]
async fn get_not_found_is_rejection_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Project not found"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let err = client
        .fetch_record(EntityKind::Project, &RecordId::new("missing").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.backend_message(), Some("Project not found"));
}

// ── POST / PUT / DELETE ──────────────────────────────────────────────

#[tokio::test]
async fn create_posts_payload_and_returns_message() {
    let mock_server = MockServer::start().await;
    let body = json!({
        "client_name": "Acme",
        "companies": [{"name": "Acme Inc"}],
        "client_emails": ["a@acme.com"],
        "client_phones": []
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/clients"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Client added successfully"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let ack = AdminBackend::create_record(&client, EntityKind::Client, &payload(body))
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Client added successfully"));
}

#[tokio::test]
async fn create_422_surfaces_body_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/banners"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "Position already taken"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let err = AdminBackend::create_record(&client, EntityKind::Banner, &FieldMap::new())
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::rejected("Position already taken"));
}

#[tokio::test]
async fn update_puts_partial_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/reviews/r1"))
        .and(body_json(json!({"is_verified": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let ack = AdminBackend::update_record(
        &client,
        EntityKind::Review,
        &RecordId::new("r1").unwrap(),
        &payload(json!({"is_verified": true})),
    )
    .await
    .unwrap();
    assert!(ack.message.is_none());
}

#[tokio::test]
async fn delete_one_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/works/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Work deleted successfully"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let ack = AdminBackend::delete_record(&client, EntityKind::Work, &RecordId::new("w1").unwrap())
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Work deleted successfully"));
}

#[tokio::test]
async fn bulk_delete_sends_all_ids_in_one_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/subscribers/delete"))
        .and(body_json(json!({"ids": ["s1", "s2", "s3"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Subscribers deleted"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let ids: Vec<RecordId> = ["s1", "s2", "s3"]
        .iter()
        .map(|s| RecordId::new(*s).unwrap())
        .collect();
    let ack = AdminBackend::delete_records(&client, EntityKind::Subscriber, &ids)
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Subscribers deleted"));
}

// ── Media ────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_returns_reported_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "files": [{"url": "https://cdn.example/uploads/hero.png"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let file = AssetUpload::new("hero.png", vec![1, 2, 3]).with_content_type("image/png");
    let urls = client.upload_asset(&file).await.unwrap();
    assert_eq!(
        urls,
        vec![AssetUrl::new("https://cdn.example/uploads/hero.png").unwrap()]
    );

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"images\""));
    assert!(body.contains("filename=\"hero.png\""));
}

#[tokio::test]
async fn upload_failure_is_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let err = client
        .upload_asset(&AssetUpload::new("a.png", vec![0]))
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::Rejected { message: None });
}

#[tokio::test]
async fn delete_uploads_sends_url_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/upload/delete"))
        .and(body_json(json!({"urls": ["https://cdn.example/uploads/old.png"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let url = AssetUrl::new("https://cdn.example/uploads/old.png").unwrap();
    client.delete_assets(&[url]).await.unwrap();
}

// ── GET /api/v1/dashboard ────────────────────────────────────────────

#[tokio::test]
async fn dashboard_decodes_nested_counts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "blogs": 4, "banners": 3, "clients": 8, "projects": 5,
                "works": 2, "subscribers": 40,
                "reviews": {"total": 6},
                "enquiries": {"unopened": 1},
                "admins": {"total": 3, "superadmin": 1}
            }
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let summary = client.fetch_dashboard_summary().await.unwrap();
    assert_eq!(summary.subscribers, 40);
    assert_eq!(summary.reviews.total, 6);
    assert_eq!(summary.enquiries.unopened, 1);
    assert_eq!(summary.admins.superadmin, 1);
}

#[tokio::test]
async fn dashboard_missing_or_null_domains_read_as_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"clients": 2, "blogs": null, "reviews": null}
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let summary = client.fetch_dashboard_summary().await.unwrap();
    assert_eq!(summary.clients, 2);
    assert_eq!(summary.blogs, 0);
    assert_eq!(summary.reviews.total, 0);
    assert_eq!(summary.admins.total, 0);
}

#[tokio::test]
async fn dashboard_server_error_is_rejection_without_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let err = client.fetch_dashboard_summary().await.unwrap_err();
    assert_eq!(err.backend_message(), None);
}
