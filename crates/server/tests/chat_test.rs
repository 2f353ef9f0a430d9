//! End-to-end tests for the chat surface: prompt assembly from committed
//! notes, provider-failure fallback, the message log, and transcription.

mod common;

use anyhow::Result;
use common::{TestApp, LICENSE_HEADER, USER_A_KEY};
use httpmock::Method;
use serde_json::{json, Value};

fn chat_form(message: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("message", message.to_string())
        .text("coach_name", "Jordan")
}

#[tokio::test]
async fn test_chat_uses_latest_committed_notes() -> Result<()> {
    let app = TestApp::spawn().await?;

    // Train: answer a question and commit it.
    app.client
        .post(format!("{}/trainer/answer/1", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({ "answer": "I started coaching after my own transformation." }))
        .send()
        .await?
        .error_for_status()?;
    app.client
        .post(format!("{}/trainer/commit", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;

    // The chat request's system prompt must carry the persona, the coach
    // name, and the committed notes.
    let chat_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("COACH NOTES START")
            .body_contains("Jordan")
            .body_contains("I started coaching after my own transformation.");
        then.status(200)
            .json_body(TestApp::completion_body("Here is your check-in plan."));
    });

    let response = app
        .client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(chat_form("Write my Monday check-in"))
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["reply"], "Here is your check-in plan.");
    assert!(body["error_code"].is_null());
    chat_mock.assert();

    // Both sides of the exchange landed in the log.
    let response = app
        .client
        .get(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["total_messages"], 2);
    let conversations = body["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    let messages = conversations[0]["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Write my Monday check-in");
    assert_eq!(messages[1]["role"], "assistant");
    Ok(())
}

#[tokio::test]
async fn test_chat_without_commits_uses_the_placeholder_notes() -> Result<()> {
    let app = TestApp::spawn().await?;

    let chat_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("No coach notes provided yet.");
        then.status(200)
            .json_body(TestApp::completion_body("General advice."));
    });

    app.client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(chat_form("hello"))
        .send()
        .await?
        .error_for_status()?;
    chat_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_chat_provider_failure_returns_fallback_not_5xx() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(500).body("upstream exploded");
    });

    let response = app
        .client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(chat_form("are you there?"))
        .send()
        .await?;
    assert!(response.status().is_success());
    let body: Value = response.json().await?;
    assert_eq!(body["error_code"], "provider_unavailable");
    let reply = body["reply"].as_str().unwrap();
    assert!(!reply.is_empty());

    // The user's message survived, and the fallback reply was logged too.
    let response = app
        .client
        .get(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["total_messages"], 2);
    let messages = body["conversations"][0]["messages"].as_array().unwrap();
    assert_eq!(messages[0]["content"], "are you there?");
    assert_eq!(messages[1]["content"], reply);
    Ok(())
}

#[tokio::test]
async fn test_chat_requires_a_message() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = reqwest::multipart::Form::new().text("coach_name", "Jordan");
    let response = app
        .client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_clear_chat_history() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(TestApp::completion_body("ok"));
    });

    app.client
        .post(format!("{}/bot/chat", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(chat_form("first message"))
        .send()
        .await?
        .error_for_status()?;

    app.client
        .delete(format!("{}/bot/chat/history", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
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
    assert_eq!(body["total_messages"], 0);
    Ok(())
}

fn audio_form() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![0u8; 128]).file_name("answer.webm"),
    )
}

#[tokio::test]
async fn test_whisper_transcribes_audio() -> Result<()> {
    let app = TestApp::spawn().await?;

    let whisper_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/audio/transcriptions");
        then.status(200)
            .json_body(json!({ "text": "my spoken answer" }));
    });

    let response = app
        .client
        .post(format!("{}/trainer/whisper", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(audio_form())
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    assert_eq!(body["text"], "my spoken answer");
    assert!(body["error_code"].is_null());
    whisper_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_whisper_failure_returns_placeholder() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/audio/transcriptions");
        then.status(503).body("transcription down");
    });

    let response = app
        .client
        .post(format!("{}/trainer/whisper", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(audio_form())
        .send()
        .await?;
    assert!(response.status().is_success());
    let body: Value = response.json().await?;
    assert_eq!(body["error_code"], "provider_unavailable");
    assert!(body["text"].as_str().unwrap().starts_with('['));
    Ok(())
}

#[tokio::test]
async fn test_whisper_rejects_empty_audio() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(Vec::new()).file_name("empty.webm"),
    );
    let response = app
        .client
        .post(format!("{}/trainer/whisper", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    Ok(())
}
