//! # Core Access Crate
//!
//! This crate is the central authority for identity in `coachvoice`: license
//! key generation and validation, user records, and the resolution of an
//! opaque license key to a `User`, creating one on first sight.

pub const LICENSE_KEY_PREFIX: &str = "cv-";
pub const LICENSE_KEY_SUFFIX_LENGTH: usize = 12;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use turso::{Database, Error as TursoError, Row, params};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreAccessError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("Failed to create or find user for license key: {0}")]
    UserPersistenceFailed(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// Represents a coach account in the system.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    /// The unique ID of the user (UUIDv4, assigned at creation).
    pub id: String,
    /// The opaque bearer key the client presents on every request.
    pub license_key: String,
    /// The linked external account id, if the user has connected one.
    pub external_account_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Set on every successful voice commit; `None` until the first one.
    pub last_trained_at: Option<DateTime<Utc>>,
    /// The timestamp when the user was first created.
    pub created_at: DateTime<Utc>,
}

/// Profile data returned by the external account provider, used when a user
/// links their account.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExternalProfile {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CoreAccessError> {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .map_err(|e| CoreAccessError::DataIntegrity(format!("Failed to parse date '{value}': {e}")))
}

fn optional_text(row: &Row, index: usize) -> Result<Option<String>, CoreAccessError> {
    match row.get_value(index)? {
        turso::Value::Text(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn text_or_null(value: &Option<String>) -> turso::Value {
    match value {
        Some(s) => turso::Value::Text(s.clone()),
        None => turso::Value::Null,
    }
}

impl TryFrom<&Row> for User {
    type Error = CoreAccessError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let last_trained_at = match optional_text(row, 6)? {
            Some(s) => Some(parse_timestamp(&s)?),
            None => None,
        };
        let created_at_str: String = row.get(7)?;

        Ok(User {
            id: row.get(0)?,
            license_key: row.get(1)?,
            external_account_id: optional_text(row, 2)?,
            display_name: optional_text(row, 3)?,
            email: optional_text(row, 4)?,
            avatar_url: optional_text(row, 5)?,
            last_trained_at,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

const USER_COLUMNS: &str = "id, license_key, external_account_id, display_name, email, \
                            avatar_url, last_trained_at, created_at";

/// Mints a fresh license key: the `cv-` prefix followed by 12 characters
/// drawn from `[A-Z0-9]`.
pub fn generate_license_key() -> String {
    let entropy = Uuid::new_v4().simple().to_string().to_uppercase();
    format!(
        "{LICENSE_KEY_PREFIX}{}",
        &entropy[..LICENSE_KEY_SUFFIX_LENGTH]
    )
}

/// Checks whether a key has the shape this application issues.
pub fn is_valid_license_format(license_key: &str) -> bool {
    license_key.starts_with(LICENSE_KEY_PREFIX)
        && license_key.len() == LICENSE_KEY_PREFIX.len() + LICENSE_KEY_SUFFIX_LENGTH
        && license_key[LICENSE_KEY_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Validates a license key. Format problems fail immediately; a well-formed
/// key is accepted. Liveness against the upstream license service is the
/// caller's concern and is deliberately not performed here.
pub fn verify_license(license_key: &str) -> bool {
    is_valid_license_format(license_key)
}

/// Finds a user by their license key, creating them if they don't exist.
///
/// Resolution never fails on an unknown key: the first request bearing a
/// well-formed key provisions the account.
pub async fn get_or_create_user(
    db: &Database,
    license_key: &str,
) -> Result<User, CoreAccessError> {
    let conn = db.connect()?;

    // Try to SELECT the user first for maximum compatibility.
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE license_key = ?"),
            params![license_key],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        return User::try_from(&row);
    }

    let user_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO users (id, license_key) VALUES (?, ?)",
        params![user_id.clone(), license_key],
    )
    .await?;

    // SELECT the newly created user to get all fields (like created_at).
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            params![user_id],
        )
        .await?;

    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreAccessError::UserPersistenceFailed(license_key.to_string()))?;

    User::try_from(&row)
}

/// Looks a user up by license key without creating one.
pub async fn find_user(db: &Database, license_key: &str) -> Result<Option<User>, CoreAccessError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE license_key = ?"),
            params![license_key],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(User::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Links an external account to a user record, keyed by the external id.
///
/// An existing user gets their profile fields refreshed; an unknown external
/// id provisions a new user with a freshly minted license key.
pub async fn link_external_account(
    db: &Database,
    profile: &ExternalProfile,
) -> Result<User, CoreAccessError> {
    let conn = db.connect()?;

    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE external_account_id = ?"),
            params![profile.id.clone()],
        )
        .await?;

    let user_id = if let Some(row) = rows.next().await? {
        let existing = User::try_from(&row)?;
        let values: Vec<turso::Value> = vec![
            text_or_null(&profile.username),
            text_or_null(&profile.email),
            text_or_null(&profile.profile_picture),
            turso::Value::Text(existing.id.clone()),
        ];
        conn.execute(
            "UPDATE users SET display_name = ?, email = ?, avatar_url = ? WHERE id = ?",
            values,
        )
        .await?;
        existing.id
    } else {
        let user_id = Uuid::new_v4().to_string();
        let license_key = generate_license_key();
        let values: Vec<turso::Value> = vec![
            turso::Value::Text(user_id.clone()),
            turso::Value::Text(license_key),
            turso::Value::Text(profile.id.clone()),
            text_or_null(&profile.username),
            text_or_null(&profile.email),
            text_or_null(&profile.profile_picture),
        ];
        conn.execute(
            "INSERT INTO users (id, license_key, external_account_id, display_name, email, avatar_url) \
             VALUES (?, ?, ?, ?, ?, ?)",
            values,
        )
        .await?;
        user_id
    };

    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            params![user_id],
        )
        .await?;

    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreAccessError::UserPersistenceFailed(profile.id.clone()))?;

    User::try_from(&row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachvoice::providers::db::sqlite::SqliteProvider;

    #[test]
    fn test_license_key_format() {
        let key = generate_license_key();
        assert!(is_valid_license_format(&key), "generated key: {key}");
        assert!(!is_valid_license_format("cv-short"));
        assert!(!is_valid_license_format("xx-ABCDEF123456"));
        assert!(
            !is_valid_license_format("cv-abcdef123456"),
            "lowercase suffix"
        );
        assert!(!is_valid_license_format(""));
    }

    #[tokio::test]
    async fn test_get_or_create_user_flow() {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        let db = provider.db;
        let key = generate_license_key();

        // First call should create the user.
        let user1 = get_or_create_user(&db, &key).await.unwrap();
        assert_eq!(user1.license_key, key);
        assert!(user1.last_trained_at.is_none());

        // Second call should retrieve the same user.
        let user2 = get_or_create_user(&db, &key).await.unwrap();
        assert_eq!(user1.id, user2.id);
        assert_eq!(user1.created_at.timestamp(), user2.created_at.timestamp());

        // A different key creates a different user.
        let user3 = get_or_create_user(&db, &generate_license_key())
            .await
            .unwrap();
        assert_ne!(user1.id, user3.id);
    }

    #[tokio::test]
    async fn test_link_external_account_creates_then_updates() {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        let db = provider.db;

        let profile = ExternalProfile {
            id: "acct_123".to_string(),
            username: Some("coach_jane".to_string()),
            email: Some("jane@example.com".to_string()),
            profile_picture: None,
        };

        let created = link_external_account(&db, &profile).await.unwrap();
        assert_eq!(created.external_account_id.as_deref(), Some("acct_123"));
        assert_eq!(created.display_name.as_deref(), Some("coach_jane"));
        assert!(is_valid_license_format(&created.license_key));

        // Re-linking refreshes profile fields but keeps the same user and key.
        let updated_profile = ExternalProfile {
            id: "acct_123".to_string(),
            username: Some("coach_jane_v2".to_string()),
            email: Some("jane@example.com".to_string()),
            profile_picture: Some("https://example.com/pic.png".to_string()),
        };
        let updated = link_external_account(&db, &updated_profile).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.license_key, created.license_key);
        assert_eq!(updated.display_name.as_deref(), Some("coach_jane_v2"));
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some("https://example.com/pic.png")
        );
    }
}
