//! HTTP workflow: upload, map, merge in the background, download.

mod support;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::jobs::JobStatus;
use docmerge_server::job_controller::state::{start_job_updater, JobsState};
use docmerge_server::services;
use docmerge_server::state::AppState;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use support::{app_state, docx, multipart_body, multipart_content_type};
use tempfile::TempDir;

fn jobs() -> JobsState {
    let (jobs, rx) = JobsState::new(100);
    tokio::spawn(start_job_updater(jobs.clone(), rx));
    jobs
}

macro_rules! app {
    ($state:expr, $jobs:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($jobs.clone()))
                .app_data(web::Data::new($state.clone()))
                .configure(services::configure),
        )
        .await
    };
}

macro_rules! upload_csv {
    ($app:expr, $csv:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/data_sources/csv/upload")
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart_body(&[("file", Some("people.csv"), $csv as &[u8])]))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let summary: Value = test::read_body_json(resp).await;
        summary
    }};
}

/// Polls the status endpoint until the job has finished.
macro_rules! wait_for_job {
    ($app:expr, $job_id:expr) => {{
        let mut finished = None;
        for _ in 0..500 {
            let req = test::TestRequest::get()
                .uri(&format!("/api/merge/status/{}", $job_id))
                .to_request();
            let status: JobStatus = test::call_and_read_body_json(&$app, req).await;
            if status.is_finished() {
                finished = Some(status);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        finished.expect("job did not finish")
    }};
}

#[actix_web::test]
async fn text_batch_from_upload_to_archive() {
    let dir = TempDir::new().unwrap();
    let state: AppState = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    let summary = upload_csv!(app, b"Name,Email\nAnn,ann@example.com\nBob,bob@example.com\n");
    assert_eq!(summary["row_count"], 2);
    assert_eq!(summary["field_names"], json!(["Name", "Email"]));
    let dataset_id = summary["dataset_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/templates")
        .set_json(json!({ "name": "Greeting", "content": "Hi {{Name}}" }))
        .to_request();
    let template: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(template["placeholders"], json!(["Name"]));
    let template_id = template["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/mapping/auto")
        .set_json(json!({ "placeholders": ["Name"], "data_fields": ["Name", "Email"] }))
        .to_request();
    let mapping: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mapping["complete"], true);

    let req = test::TestRequest::post()
        .uri("/api/merge/start")
        .set_json(json!({
            "template_id": template_id,
            "dataset_id": dataset_id,
            "mappings": mapping["mappings"],
        }))
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    let job_id = started["job_id"].as_str().unwrap().to_string();

    assert!(matches!(wait_for_job!(app, job_id), JobStatus::Completed(_)));

    let req = test::TestRequest::get()
        .uri(&format!("/api/merge/{job_id}/documents"))
        .to_request();
    let documents: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(documents[0]["file_name"], "document-1.html");
    assert_eq!(documents[0]["preview"], "Hi Ann");
    assert_eq!(documents[1]["id"], "doc-1");
    assert_eq!(documents[1]["preview"], "Hi Bob");

    let req = test::TestRequest::get()
        .uri(&format!("/api/merge/{job_id}/documents/1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("document-2.html"));
    assert_eq!(test::read_body(resp).await, "Hi Bob");

    let req = test::TestRequest::get()
        .uri(&format!("/api/merge/{job_id}/archive"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/zip");
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("merged-documents-"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/merge/{job_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/merge/status/{job_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn incomplete_mapping_is_rejected_before_a_job_starts() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    let summary = upload_csv!(app, b"Name\nAnn\n");
    let req = test::TestRequest::post()
        .uri("/api/templates")
        .set_json(json!({ "name": "Two", "content": "{{Name}} {{Email}}" }))
        .to_request();
    let template: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/merge/start")
        .set_json(json!({
            "template_id": template["id"],
            "dataset_id": summary["dataset_id"],
            "mappings": [{ "placeholder": "Name", "data_field": "Name" }],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Email"));
    assert!(jobs.jobs.read().await.is_empty());
}

#[actix_web::test]
async fn word_template_upload_and_manual_merge() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    let document = docx(&[&["Dear {First} {La", "st}"]]);
    let req = test::TestRequest::post()
        .uri("/api/templates/save")
        .insert_header((header::CONTENT_TYPE, multipart_content_type()))
        .set_payload(multipart_body(&[
            ("json", None, &br#"{"name":"Letter","is_word_template":true}"#[..]),
            ("file", Some("letter.docx"), document.as_slice()),
        ]))
        .to_request();
    let template: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(template["placeholders"], json!(["First", "Last"]));
    assert_eq!(template["is_word_template"], true);

    let req = test::TestRequest::put()
        .uri("/api/drafts/session-1")
        .set_json(json!({ "First": "Ann" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = test::TestRequest::get().uri("/api/drafts/session-1").to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(draft, json!({ "First": "Ann" }));

    let req = test::TestRequest::post()
        .uri("/api/merge/manual")
        .set_json(json!({
            "template_id": template["id"],
            "session_id": "session-1",
            "values": { "First": "Ann" },
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "Error: Please fill in all fields: Last");

    let req = test::TestRequest::post()
        .uri("/api/merge/manual")
        .set_json(json!({
            "template_id": template["id"],
            "session_id": "session-1",
            "values": { "First": "Ann", "Last": "Lee" },
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    let bytes = test::read_body(resp).await;
    let merged = docmerge_server::engine::docx::DocxTemplate::load(&bytes).unwrap();
    assert_eq!(merged.full_text().unwrap(), "Dear Ann Lee");

    let req = test::TestRequest::get().uri("/api/drafts/session-1").to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(draft, json!({}));
}

#[actix_web::test]
async fn unknown_resources_are_not_found() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    for uri in [
        "/api/templates/missing",
        "/api/data_sources/missing",
        "/api/merge/status/missing",
        "/api/merge/missing/archive",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

/// Saves a Word template through the multipart route and returns its JSON.
macro_rules! save_word_template {
    ($app:expr, $document:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/templates/save")
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart_body(&[
                ("json", None, &br#"{"name":"Letter","is_word_template":true}"#[..]),
                ("file", Some("letter.docx"), $document.as_slice()),
            ]))
            .to_request();
        let template: Value = test::call_and_read_body_json(&$app, req).await;
        template
    }};
}

macro_rules! start_merge {
    ($app:expr, $template:expr, $summary:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/merge/start")
            .set_json(json!({
                "template_id": $template["id"],
                "dataset_id": $summary["dataset_id"],
                "mappings": [{ "placeholder": "Name", "data_field": "Name" }],
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let started: Value = test::read_body_json(resp).await;
        started["job_id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn a_failing_row_fails_the_job_without_documents() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    // The trailing brace closes no tag, so rendering any row fails.
    let template = save_word_template!(app, docx(&[&["Hi {Name} }"]]));
    assert_eq!(template["placeholders"], json!(["Name"]));
    let summary = upload_csv!(app, b"Name\nAnn\nBob\n");
    let job_id = start_merge!(app, template, summary);

    match wait_for_job!(app, job_id) {
        JobStatus::Failed(cause) => assert!(cause.contains("row"), "{cause}"),
        other => panic!("expected a failed job, got {other:?}"),
    }

    for uri in [
        format!("/api/merge/{job_id}/documents"),
        format!("/api/merge/{job_id}/documents/0"),
        format!("/api/merge/{job_id}/archive"),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT, "{uri}");
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("failed"), "{uri}");
    }
    assert!(jobs.results(&job_id).await.is_none());
}

#[actix_web::test]
async fn discarding_a_started_job_drops_its_documents() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    let template = save_word_template!(app, docx(&[&["Hi {Name}"]]));
    let csv: Vec<u8> = std::iter::once("Name".to_string())
        .chain((0..200).map(|i| format!("Person {i}")))
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes();
    let summary = upload_csv!(app, csv.as_slice());
    let job_id = start_merge!(app, template, summary);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/merge/{job_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    // Give the background job time to finish; whatever it produces is dropped.
    tokio::time::sleep(Duration::from_millis(500)).await;

    for uri in [
        format!("/api/merge/status/{job_id}"),
        format!("/api/merge/{job_id}/documents"),
        format!("/api/merge/{job_id}/archive"),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    assert!(jobs.results(&job_id).await.is_none());
}

#[actix_web::test]
async fn deleted_datasets_cannot_be_merged() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir);
    let jobs = jobs();
    let app = app!(state, jobs);

    let summary = upload_csv!(app, b"Name\nAnn\n");
    let dataset_id = summary["dataset_id"].as_str().unwrap().to_string();
    let uri = format!("/api/data_sources/{dataset_id}");

    let req = test::TestRequest::delete().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(state.dataset(&dataset_id).await.is_none());

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    let req = test::TestRequest::delete().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/templates")
        .set_json(json!({ "name": "Greeting", "content": "Hi {{Name}}" }))
        .to_request();
    let template: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/merge/start")
        .set_json(json!({
            "template_id": template["id"],
            "dataset_id": dataset_id,
            "mappings": [{ "placeholder": "Name", "data_field": "Name" }],
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
