//! The full in-process assistant flow: answers → commit → retrieval →
//! prompt assembly → chat provider, with the provider mocked at the trait
//! boundary.

use anyhow::Result;
use coachvoice::prompts::build_system_prompt;
use coachvoice::providers::ai::AiProvider;
use coachvoice::trainer::commit::commit;
use coachvoice::trainer::knowledge::latest_qa_notes;
use coachvoice::trainer::set_answer;
use coachvoice_test_utils::{MockAiProvider, TestSetup};

#[tokio::test]
async fn trained_voice_reaches_the_chat_provider() -> Result<()> {
    let setup = TestSetup::new().await?;
    let db = &setup.db;

    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO users (id, license_key) VALUES ('coach-1', 'cv-CCCCCCCCCCCC')",
        (),
    )
    .await?;

    set_answer(db, "coach-1", 1, "I coach founders through their first hire.").await?;
    let version = commit(db, "coach-1").await?;
    assert_eq!(version, 1);

    let notes = latest_qa_notes(db, "coach-1").await?;
    let system = build_system_prompt("Jordan", &notes);

    let provider = MockAiProvider::new();
    // Keyed on a stable phrase from the persona template.
    provider.add_response("replication engine", "Your next check-in: ask about the hire.");

    let reply = provider
        .generate(&system, "What should I ask this week?", 0.6)
        .await?;
    assert_eq!(reply, "Your next check-in: ask about the hire.");

    // The provider saw the committed notes inside the delimited block, at
    // the requested temperature.
    let calls = provider.get_calls();
    assert_eq!(calls.len(), 1);
    let (system_seen, user_seen, temperature) = &calls[0];
    assert!(system_seen.contains("COACH NOTES START"));
    assert!(system_seen.contains("I coach founders through their first hire."));
    assert_eq!(user_seen, "What should I ask this week?");
    assert_eq!(*temperature, 0.6);
    Ok(())
}

#[tokio::test]
async fn provider_failure_is_an_explicit_error_for_the_caller() -> Result<()> {
    let provider = MockAiProvider::new();
    // Nothing programmed: every call fails like a broken upstream.
    let result = provider.generate("system", "user", 0.0).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().is_provider_failure());
    Ok(())
}
