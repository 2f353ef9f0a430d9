//! Integration tests for the answer store and the commit/versioning engine.

use anyhow::Result;
use coachvoice::providers::db::sqlite::SqliteProvider;
use coachvoice::trainer::commit::{commit, EMPTY_COMMIT_PLACEHOLDER};
use coachvoice::trainer::knowledge::store_upload;
use coachvoice::trainer::{get_answer, list_answers, set_answer};
use turso::params;

async fn setup() -> Result<SqliteProvider> {
    let provider = SqliteProvider::new(":memory:").await?;
    provider.initialize_schema().await?;
    let conn = provider.db.connect()?;
    conn.execute(
        "INSERT INTO users (id, license_key) VALUES ('user-1', 'cv-AAAAAAAAAAAA')",
        (),
    )
    .await?;
    conn.execute(
        "INSERT INTO users (id, license_key) VALUES ('user-2', 'cv-BBBBBBBBBBBB')",
        (),
    )
    .await?;
    Ok(provider)
}

#[tokio::test]
async fn answer_store_upserts_with_last_writer_wins() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    assert_eq!(get_answer(db, "user-1", 4).await?, "");

    set_answer(db, "user-1", 4, "first draft").await?;
    assert_eq!(get_answer(db, "user-1", 4).await?, "first draft");

    set_answer(db, "user-1", 4, "second draft").await?;
    assert_eq!(get_answer(db, "user-1", 4).await?, "second draft");

    // Only one row exists for the (user, index) pair.
    let answers = list_answers(db, "user-1").await?;
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].question_index, 4);

    // Another user's answers are invisible.
    assert_eq!(get_answer(db, "user-2", 4).await?, "");
    Ok(())
}

#[tokio::test]
async fn sequential_commits_produce_gapless_versions() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    set_answer(db, "user-1", 1, "an answer").await?;
    for _ in 0..5 {
        commit(db, "user-1").await?;
    }

    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT version FROM voice_blobs WHERE user_id = ? AND kind = 'qa' ORDER BY version",
            params!["user-1"],
        )
        .await?;
    let mut versions = Vec::new();
    while let Some(row) = rows.next().await? {
        versions.push(row.get::<i64>(0)?);
    }
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[tokio::test]
async fn commit_renders_only_answered_questions_in_order() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    set_answer(db, "user-1", 9, "ninth answer").await?;
    set_answer(db, "user-1", 2, "second answer").await?;
    set_answer(db, "user-1", 5, "fifth answer").await?;
    // Stored but empty: must not appear in the blob.
    set_answer(db, "user-1", 12, "   ").await?;

    let version = commit(db, "user-1").await?;
    assert_eq!(version, 1);

    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT content FROM voice_blobs WHERE user_id = ? AND kind = 'qa'",
            params!["user-1"],
        )
        .await?;
    let content: String = rows.next().await?.unwrap().get(0)?;

    for idx in [2, 5, 9] {
        assert!(content.contains(&format!("Q{idx}:")));
        assert!(content.contains(&format!("A{idx}:")));
    }
    assert!(!content.contains("Q12:"));
    let q2 = content.find("Q2:").unwrap();
    let q5 = content.find("Q5:").unwrap();
    let q9 = content.find("Q9:").unwrap();
    assert!(q2 < q5 && q5 < q9);
    Ok(())
}

#[tokio::test]
async fn empty_commit_stores_the_placeholder() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    let version = commit(db, "user-1").await?;
    assert_eq!(version, 1);

    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT content FROM voice_blobs WHERE user_id = ? AND kind = 'qa'",
            params!["user-1"],
        )
        .await?;
    let content: String = rows.next().await?.unwrap().get(0)?;
    assert_eq!(content, EMPTY_COMMIT_PLACEHOLDER);
    Ok(())
}

#[tokio::test]
async fn commit_stamps_last_trained_at() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    commit(db, "user-1").await?;

    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT last_trained_at FROM users WHERE id = ?",
            params!["user-1"],
        )
        .await?;
    let value = rows.next().await?.unwrap().get_value(0)?;
    assert!(matches!(value, turso::Value::Text(_)));
    Ok(())
}

#[tokio::test]
async fn upload_alone_does_not_advance_the_version() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    // Upload before any commit: records version 0, and the first commit is
    // still version 1.
    let upload = store_upload(db, "user-1", "transcript text").await?;
    assert_eq!(upload.version, 0);
    assert_eq!(commit(db, "user-1").await?, 1);

    // Upload between commits: records the current max (1) and the next
    // commit is 2, exactly what it would have been without the upload.
    let upload = store_upload(db, "user-1", "more transcript text").await?;
    assert_eq!(upload.version, 1);
    assert_eq!(commit(db, "user-1").await?, 2);
    Ok(())
}

#[tokio::test]
async fn versions_are_scoped_per_user() -> Result<()> {
    let provider = setup().await?;
    let db = &provider.db;

    assert_eq!(commit(db, "user-1").await?, 1);
    assert_eq!(commit(db, "user-1").await?, 2);
    // A different user's counter starts fresh.
    assert_eq!(commit(db, "user-2").await?, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_commits_never_duplicate_versions() -> Result<()> {
    let provider = setup().await?;
    let db = provider.db.clone();

    set_answer(&db, "user-1", 1, "racing answer").await?;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let db = db.clone();
        handles.push(tokio::spawn(
            async move { commit(&db, "user-1").await },
        ));
    }

    let mut versions = Vec::new();
    for handle in handles {
        versions.push(handle.await??);
    }
    versions.sort_unstable();
    assert_eq!(versions, vec![1, 2, 3, 4]);
    Ok(())
}
