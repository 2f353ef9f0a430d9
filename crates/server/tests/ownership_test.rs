//! # Ownership Isolation Integration Test
//!
//! Verifies the single access-control invariant of the system: every
//! entity is scoped to exactly one user at the query boundary. A request
//! bearing user A's key can never read, modify, or delete anything created
//! under user B's key, and such attempts are answered with the same
//! not-found response a nonexistent id would get.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, LICENSE_HEADER, USER_A_KEY, USER_B_KEY};
use serde_json::{json, Value};

async fn create_project(app: &TestApp, key: &str, name: &str) -> Result<String> {
    let response = app
        .client
        .post(format!("{}/projects", app.address))
        .header(LICENSE_HEADER, key)
        .json(&json!({ "name": name, "client_name": "Client" }))
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    Ok(body["project"]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_projects_are_invisible_across_users() -> Result<()> {
    let app = TestApp::spawn().await?;
    let project_id = create_project(&app, USER_A_KEY, "A's project").await?;

    // B's listing is empty.
    let response = app
        .client
        .get(format!("{}/projects", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert!(body["projects"].as_array().unwrap().is_empty());

    // B cannot read, update, or delete A's project; every attempt is 404.
    let read = app
        .client
        .get(format!("{}/projects/{project_id}", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);

    let update = app
        .client
        .put(format!("{}/projects/{project_id}", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .json(&json!({ "name": "hijacked" }))
        .send()
        .await?;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let delete = app
        .client
        .delete(format!("{}/projects/{project_id}", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    // A still sees their project, unchanged.
    let response = app
        .client
        .get(format!("{}/projects/{project_id}", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["project"]["name"], "A's project");
    Ok(())
}

#[tokio::test]
async fn test_transcripts_cannot_target_another_users_project() -> Result<()> {
    let app = TestApp::spawn().await?;
    let project_id = create_project(&app, USER_A_KEY, "A's project").await?;

    let form = reqwest::multipart::Form::new()
        .text("project_id", project_id)
        .text("title", "Sneaky call")
        .text("content", "transcript content");
    let response = app
        .client
        .post(format!("{}/transcripts", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_training_data_is_scoped_per_user() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.client
        .post(format!("{}/trainer/answer/1", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({ "answer": "A's private answer" }))
        .send()
        .await?
        .error_for_status()?;
    app.client
        .post(format!("{}/trainer/commit", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;

    // B sees no answers, no history, and a fresh version counter.
    let response = app
        .client
        .get(format!("{}/trainer/status", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["answered_count"], 0);

    let response = app
        .client
        .get(format!("{}/trainer/answer/1", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["answer"], "");

    let response = app
        .client
        .get(format!("{}/trainer/history", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["total_versions"], 0);

    let response = app
        .client
        .post(format!("{}/trainer/commit", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["voice_version"], 1, "B's counter starts fresh");
    Ok(())
}

#[tokio::test]
async fn test_chat_history_is_scoped_per_user() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.mock_server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(TestApp::completion_body("reply"));
    });

    app.client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(
            reqwest::multipart::Form::new()
                .text("message", "A's secret question")
                .text("coach_name", "Coach"),
        )
        .send()
        .await?
        .error_for_status()?;

    // B's history is empty, and B's bulk delete does not touch A's log.
    let response = app
        .client
        .get(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["total_messages"], 0);

    app.client
        .delete(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_B_KEY)
        .send()
        .await?
        .error_for_status()?;

    let response = app
        .client
        .get(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["total_messages"], 2);
    Ok(())
}
