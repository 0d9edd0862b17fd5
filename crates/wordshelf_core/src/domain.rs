//! crates/wordshelf_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database layer; identifiers and
//! creation timestamps are assigned by the storage engine at insert time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reading status of a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    Reading,
    Finished,
    WantToRead,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
            ReadingStatus::WantToRead => "want-to-read",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reading" => Some(ReadingStatus::Reading),
            "finished" => Some(ReadingStatus::Finished),
            "want-to-read" => Some(ReadingStatus::WantToRead),
            _ => None,
        }
    }
}

/// Per-user display and privacy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub dark_mode: bool,
    pub dyslexia_font: bool,
    pub public_profile: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            dyslexia_font: false,
            public_profile: true,
        }
    }
}

/// Denormalized per-user activity counters. Mutated only by the counter
/// engine (see `counters`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub books_count: u32,
    pub words_count: u32,
    pub current_streak: u32,
}

// Represents a user - used throughout the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub settings: UserSettings,
    pub stats: UserStats,
    /// Earned badge names. Written empty at signup; nothing appends to it
    /// yet.
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The restricted view of a user exposed to other users. Never carries
    /// `email` or `settings`.
    pub fn public_projection(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
            stats: self.stats,
            badges: self.badges.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub stats: UserStats,
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized per-book counters. `readers_count` tracks library entries
/// referencing the book, `words_count` tracks words referencing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    pub readers_count: u32,
    pub words_count: u32,
}

/// Canonical catalog entry, one per distinct external catalog key.
/// Created lazily the first time a user adds the key; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub catalog_key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub first_publish_year: Option<i32>,
    pub stats: BookStats,
    pub created_at: DateTime<Utc>,
}

/// The relationship between one user and one book. At most one entry per
/// (user, book) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: ReadingStatus,
    pub notes: Option<String>,
    /// Denormalized count of words attached to this entry.
    pub words_count: u32,
    /// Set the first time status becomes `Reading`; never overwritten.
    pub started_at: Option<DateTime<Utc>>,
    /// Set the first time status becomes `Finished`; never overwritten.
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A vocabulary entry scoped to one library entry. `book_id` is copied
/// from the entry at creation time for direct book-scoped queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_id: Uuid,
    pub book_id: Uuid,
    /// Stored trimmed and lowercased; non-empty.
    pub word: String,
    pub definition: Option<String>,
    pub context: Option<String>,
    pub page_number: Option<u32>,
    pub notes: Option<String>,
    pub likes_count: u32,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Join entity between a user and a word. At most one per (user, word).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub word_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

// Represents a login session (auth cookie).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Insert payloads (ids and created_at are assigned by the store)
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub settings: UserSettings,
    pub stats: UserStats,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub catalog_key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub first_publish_year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: ReadingStatus,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewWord {
    pub user_id: Uuid,
    pub entry_id: Uuid,
    pub book_id: Uuid,
    pub word: String,
    pub definition: Option<String>,
    pub context: Option<String>,
    pub page_number: Option<u32>,
    pub notes: Option<String>,
    pub is_public: bool,
}

//=========================================================================================
// Partial updates (a `None` field is left untouched)
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPatch {
    pub definition: Option<String>,
    pub context: Option<String>,
    pub page_number: Option<u32>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub settings: Option<UserSettings>,
}

//=========================================================================================
// Operation inputs and enriched read models
//=========================================================================================

/// Everything needed to add a catalog book to a library: the candidate
/// metadata (from search) plus the initial reading status.
#[derive(Debug, Clone)]
pub struct AddBookRequest {
    pub catalog_key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub first_publish_year: Option<i32>,
    pub status: ReadingStatus,
}

#[derive(Debug, Clone)]
pub struct AddWordRequest {
    pub entry_id: Uuid,
    pub word: String,
    pub definition: Option<String>,
    pub context: Option<String>,
    pub page_number: Option<u32>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

/// A library entry enriched with its resolved book. The book is `None`
/// only if it was somehow removed; books are never deleted in normal
/// operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryWithBook {
    pub entry: LibraryEntry,
    pub book: Option<Book>,
    pub words_count: u32,
}

/// A word enriched with its book's title and author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordWithBook {
    #[serde(flatten)]
    pub word: Word,
    pub book_title: String,
    pub book_author: String,
}

/// A public reader of a book: their public profile plus where they are
/// with this particular book.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReader {
    #[serde(flatten)]
    pub profile: PublicProfile,
    pub status: ReadingStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// A candidate book returned by the external catalog search. Not
/// persisted until a user adds it to their library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBook {
    pub catalog_key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub first_publish_year: Option<i32>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
}

/// Normalize a raw word to its stored form: trimmed and lowercased.
/// Returns `None` when nothing is left after trimming.
pub fn normalize_word(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_word("  Ephemeral  "), Some("ephemeral".to_string()));
    }

    #[test]
    fn normalize_rejects_whitespace_only() {
        assert_eq!(normalize_word("   "), None);
        assert_eq!(normalize_word(""), None);
    }

    #[test]
    fn status_round_trips_through_wire_strings() {
        for status in [
            ReadingStatus::Reading,
            ReadingStatus::Finished,
            ReadingStatus::WantToRead,
        ] {
            assert_eq!(ReadingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReadingStatus::parse("abandoned"), None);
    }
}
