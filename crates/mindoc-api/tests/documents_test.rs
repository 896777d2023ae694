//! Document upload, metadata, and download integration tests.
//!
//! Run with: `cargo test -p mindoc-api --test documents_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{
    api_path, login, pdf_bytes, setup_test_app, upload_document, upload_form, ADMIN_PASSWORD,
    MANAGER_PASSWORD, USER_PASSWORD,
};
use mindoc_core::models::NewDocument;
use mindoc_db::DocumentRepositoryTrait;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_upload_document_created() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "report.pdf",
            "Quarterly earnings",
            "finance",
            "report.pdf",
            "application/pdf",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());

    let body: Value = response.json();
    assert_eq!(body["name"], "report.pdf");
    assert_eq!(body["category"], "finance");
    assert_eq!(body["uploaded"], true);
    assert!(body["id"].as_str().is_some());
    // Storage internals stay out of API responses.
    assert!(body.get("storage_key").is_none());
}

#[tokio::test]
async fn test_uploaded_bytes_survive_the_round_trip() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    // Several times the configured part size, so the upload spans parts.
    let bytes = pdf_bytes();
    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "roundtrip.pdf",
            "Round trip payload",
            "qa",
            "roundtrip.pdf",
            "application/pdf",
            bytes.clone(),
        ))
        .await;
    assert_eq!(response.status_code(), 201);
    let id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    let response = client
        .get(&api_path(&format!("/documents/{}/file", id)))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().to_vec(), bytes);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"roundtrip.pdf\""
    );
    assert_eq!(response.header("cache-control"), "private, no-store");
    assert_eq!(
        response.header("content-length"),
        bytes.len().to_string().as_str()
    );
}

#[tokio::test]
async fn test_upload_requires_elevated_role() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "user", USER_PASSWORD).await;

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "report.pdf",
            "Quarterly earnings",
            "finance",
            "report.pdf",
            "application/pdf",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_duplicate_upload_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    upload_document(client, &token, "dup.pdf", "Same key", "finance").await;

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "dup.pdf",
            "Same key",
            "finance",
            "dup.pdf",
            "application/pdf",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_same_name_different_description_is_not_a_duplicate() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let first = upload_document(client, &token, "dup.pdf", "First revision", "finance").await;
    let second = upload_document(client, &token, "dup.pdf", "Second revision", "finance").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_upload_resumes_pending_document_row() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    // A row left behind by an interrupted upload.
    let pending = app
        .documents
        .insert_pending(NewDocument {
            name: "stuck.pdf".to_string(),
            description: "Interrupted earlier".to_string(),
            category: "finance".to_string(),
            storage_key: "20240101000000000stuck.pdf".to_string(),
            inserted_by: "manager".to_string(),
        })
        .await
        .expect("seed failed");

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "stuck.pdf",
            "Interrupted earlier",
            "finance",
            "stuck.pdf",
            "application/pdf",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());

    let body: Value = response.json();
    assert_eq!(body["id"].as_str().unwrap(), pending.id.to_string());
    assert_eq!(body["uploaded"], true);
}

#[tokio::test]
async fn test_upload_without_file_part_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let form = MultipartForm::new()
        .add_text("name", "report.pdf".to_string())
        .add_text("description", "No file here".to_string())
        .add_text("category", "finance".to_string());

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_with_file_before_metadata_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    // Metadata must be complete before the file section arrives.
    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(pdf_bytes())
                .file_name("early.pdf".to_string())
                .mime_type("application/pdf".to_string()),
        )
        .add_text("name", "early.pdf".to_string())
        .add_text("description", "Too late".to_string())
        .add_text("category", "finance".to_string());

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn test_unknown_form_fields_are_ignored() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let form = MultipartForm::new()
        .add_text("name", "extra.pdf".to_string())
        .add_text("description", "Carries extra fields".to_string())
        .add_text("category", "finance".to_string())
        .add_text("color", "blue".to_string())
        .add_part(
            "file",
            Part::bytes(pdf_bytes())
                .file_name("extra.pdf".to_string())
                .mime_type("application/pdf".to_string()),
        );

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_upload_with_disallowed_content_type_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "tool.zip",
            "Not on the allow list",
            "software",
            "tool.zip",
            "application/zip",
            vec![0x50, 0x4b, 0x03, 0x04],
        ))
        .await;
    assert_eq!(response.status_code(), 415);
}

#[tokio::test]
async fn test_upload_with_mismatched_extension_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    // text/plain is allow-listed, but contradicts the .pdf extension.
    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            "report.pdf",
            "Lying about its type",
            "finance",
            "report.pdf",
            "text/plain",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(response.status_code(), 415);
}

#[tokio::test]
async fn test_upload_with_non_multipart_body_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let response = client
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "report.pdf" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_list_and_get_documents() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "manager", MANAGER_PASSWORD).await;

    let id = upload_document(client, &token, "listed.pdf", "Listing test", "finance").await;

    let response = client
        .get(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let documents = body.as_array().expect("expected an array");
    assert!(documents
        .iter()
        .any(|d| d["id"].as_str() == Some(id.to_string().as_str())));

    let response = client
        .get(&api_path(&format!("/documents/{}", id)))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["name"], "listed.pdf");
}

#[tokio::test]
async fn test_list_shows_pending_documents_as_not_uploaded() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "user", USER_PASSWORD).await;

    app.documents
        .insert_pending(NewDocument {
            name: "pending.pdf".to_string(),
            description: "Never finished".to_string(),
            category: "finance".to_string(),
            storage_key: "20240101000000000pending.pdf".to_string(),
            inserted_by: "manager".to_string(),
        })
        .await
        .expect("seed failed");

    let response = client
        .get(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let pending = body
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == "pending.pdf")
        .expect("pending row missing from list")
        .clone();
    assert_eq!(pending["uploaded"], false);
}

#[tokio::test]
async fn test_get_unknown_document_not_found() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "user", USER_PASSWORD).await;

    let response = client
        .get(&api_path(&format!("/documents/{}", Uuid::new_v4())))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_download_pending_document_not_found() {
    let app = setup_test_app().await;
    let client = app.client();
    let (token, _) = login(client, "admin", ADMIN_PASSWORD).await;

    let pending = app
        .documents
        .insert_pending(NewDocument {
            name: "ghost.pdf".to_string(),
            description: "Bytes never arrived".to_string(),
            category: "finance".to_string(),
            storage_key: "20240101000000000ghost.pdf".to_string(),
            inserted_by: "manager".to_string(),
        })
        .await
        .expect("seed failed");

    let response = client
        .get(&api_path(&format!("/documents/{}/file", pending.id)))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 404);
}
