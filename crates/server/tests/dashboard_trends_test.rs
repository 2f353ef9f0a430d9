//! End-to-end tests for the dashboard metrics and trend analysis surfaces.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, LICENSE_HEADER, USER_A_KEY};
use httpmock::Method;
use serde_json::{json, Value};

async fn seed_project_with_transcript(app: &TestApp) -> Result<String> {
    let response = app
        .client
        .post(format!("{}/projects", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({
            "name": "Scaling offer",
            "client_name": "Alex",
            "milestones": [
                { "title": "Kickoff" },
                { "title": "First win" }
            ]
        }))
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    let project_id = body["project"]["id"].as_str().unwrap().to_string();

    app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("expert business analyst");
        then.status(200).json_body(TestApp::completion_body(
            &json!({
                "summary": "Strong call.",
                "keyPoints": ["pricing"],
                "painPoints": ["pricing anxiety"],
                "opportunities": [],
                "actionItems": [],
                "sentiment": "positive"
            })
            .to_string(),
        ));
    });

    let form = reqwest::multipart::Form::new()
        .text("project_id", project_id.clone())
        .text("title", "Kickoff call")
        .text("content", "We talked about pricing.");
    app.client
        .post(format!("{}/transcripts", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .multipart(form)
        .send()
        .await?
        .error_for_status()?;

    Ok(project_id)
}

#[tokio::test]
async fn test_project_dashboard_metrics() -> Result<()> {
    let app = TestApp::spawn().await?;
    let project_id = seed_project_with_transcript(&app).await?;

    let response = app
        .client
        .get(format!(
            "{}/dashboard?project_id={project_id}",
            app.address
        ))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    let metrics = &body["project"]["metrics"];
    assert_eq!(metrics["total_milestones"], 2);
    assert_eq!(metrics["completed_milestones"], 0);
    assert_eq!(metrics["completion_rate"], 0.0);
    assert_eq!(metrics["total_transcripts"], 1);
    assert_eq!(metrics["total_insights"], 1);
    assert_eq!(metrics["open_insights"], 1);
    assert_eq!(metrics["sentiment_counts"]["positive"], 1);
    Ok(())
}

#[tokio::test]
async fn test_overview_dashboard_aggregates_across_projects() -> Result<()> {
    let app = TestApp::spawn().await?;
    seed_project_with_transcript(&app).await?;

    let response = app
        .client
        .get(format!("{}/dashboard", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    let overview = &body["overview"];
    assert_eq!(overview["total_projects"], 1);
    assert_eq!(overview["active_projects"], 1);
    assert_eq!(overview["total_milestones"], 2);
    assert_eq!(overview["total_transcripts"], 1);
    assert_eq!(overview["total_insights"], 1);

    let recent = &body["recent_activity"];
    assert_eq!(recent["transcripts"].as_array().unwrap().len(), 1);
    assert_eq!(recent["insights"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_for_foreign_project_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let project_id = seed_project_with_transcript(&app).await?;

    let response = app
        .client
        .get(format!(
            "{}/dashboard?project_id={project_id}",
            app.address
        ))
        .header(LICENSE_HEADER, common::USER_B_KEY)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_trends_analyzes_and_caches_a_report() -> Result<()> {
    let app = TestApp::spawn().await?;
    seed_project_with_transcript(&app).await?;

    let trend_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("coaching trends");
        then.status(200).json_body(TestApp::completion_body(
            &json!({
                "trendingTopics": [
                    { "topic": "Pricing", "frequency": 10, "sentiment": "neutral",
                      "trendDirection": "up", "confidence": 0.9 }
                ],
                "coachingPatterns": [],
                "clientInsights": [],
                "recommendations": []
            })
            .to_string(),
        ));
    });

    let response = app
        .client
        .get(format!("{}/trends", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    trend_mock.assert();
    assert_eq!(body["trends"]["trendingTopics"][0]["topic"], "Pricing");
    assert_eq!(body["metadata"]["transcripts_analyzed"], 1);
    assert!(body["error_code"].is_null());

    // The report was cached.
    let conn = app.app_state.sqlite_provider.db.connect()?;
    let mut rows = conn
        .query("SELECT COUNT(*) FROM trend_analyses", ())
        .await?;
    let count: i64 = rows.next().await?.unwrap().get(0)?;
    assert_eq!(count, 1);

    // update_trends clears the cache.
    app.client
        .post(format!("{}/trends", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({ "action": "update_trends" }))
        .send()
        .await?
        .error_for_status()?;
    let mut rows = conn
        .query("SELECT COUNT(*) FROM trend_analyses", ())
        .await?;
    let count: i64 = rows.next().await?.unwrap().get(0)?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn test_trends_provider_failure_degrades_to_empty_report() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(500).body("down");
    });

    let response = app
        .client
        .get(format!("{}/trends", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .send()
        .await?;
    assert!(response.status().is_success());
    let body: Value = response.json().await?;
    assert_eq!(body["error_code"], "provider_unavailable");
    assert!(body["trends"]["trendingTopics"]
        .as_array()
        .unwrap()
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_trends_unknown_action_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(format!("{}/trends", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({ "action": "do_something_else" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_generate_insight_from_trend_data() -> Result<()> {
    let app = TestApp::spawn().await?;

    let insight_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("coaching consultant");
        then.status(200).json_body(TestApp::completion_body(
            &json!({
                "insight": "Clients stall on pricing conversations.",
                "category": "pain_point",
                "severity": "high",
                "action": "Add a pricing script to week one.",
                "impact": "Faster closes."
            })
            .to_string(),
        ));
    });

    let response = app
        .client
        .post(format!("{}/trends", app.address))
        .header(LICENSE_HEADER, USER_A_KEY)
        .json(&json!({
            "action": "generate_insight",
            "data": { "topic": "Pricing", "frequency": 10 }
        }))
        .send()
        .await?
        .error_for_status()?;
    let body: Value = response.json().await?;
    insight_mock.assert();
    assert_eq!(
        body["insight"]["insight"],
        "Clients stall on pricing conversations."
    );
    assert_eq!(body["insight"]["severity"], "high");
    Ok(())
}
