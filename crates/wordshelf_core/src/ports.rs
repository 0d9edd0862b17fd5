//! crates/wordshelf_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AuthSession, Book, BookStats, CandidateBook, Credentials, Like, LibraryEntry, NewBook,
    NewEntry, NewUser, NewWord, ProfilePatch, ReadingStatus, User, UserStats, Word,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network)
/// and carries the application's own failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// No resolvable caller identity.
    #[error("Not authenticated")]
    Unauthenticated,
    /// Target entity missing, or owned by another user. The two cases are
    /// deliberately indistinguishable so callers cannot probe for existence.
    #[error("{0} not found")]
    NotFound(String),
    /// A library entry for this (user, book) pair already exists.
    #[error("Book already in your library")]
    DuplicateEntry,
    /// Word text was empty after trimming.
    #[error("Word text must not be empty")]
    EmptyWord,
    /// Malformed input (e.g., password too short at signup).
    #[error("Invalid input: {0}")]
    Validation(String),
    /// External search provider failure. Callers recover by returning an
    /// empty result set instead of propagating.
    #[error("Search provider error: {0}")]
    Provider(String),
    /// Anything else.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Engine Port
//=========================================================================================

/// The transactional document store.
///
/// Every logical operation begins one transaction, runs all of its reads
/// and writes against it, and commits at the end. Implementations must
/// serialize conflicting writers so that two concurrent operations each
/// observe a consistent prior state and neither update is lost.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> PortResult<Box<dyn StoreTx>>;
}

/// One transaction against the store: snapshot-consistent reads plus
/// buffered writes. Dropping the transaction without calling [`commit`]
/// discards every effect.
///
/// The lookup methods mirror the secondary indexes the schema maintains
/// (book by catalog key, entry by (user, book) and (user, status), words
/// by entry / user / (book, public), like by (user, word)); listing
/// methods filter and cap at the lookup level, never in memory.
///
/// [`commit`]: StoreTx::commit
#[async_trait]
pub trait StoreTx: Send {
    // --- Users ---
    async fn insert_user(&mut self, user: NewUser) -> PortResult<Uuid>;
    async fn get_user(&mut self, id: Uuid) -> PortResult<Option<User>>;
    async fn get_user_by_username(&mut self, username: &str) -> PortResult<Option<User>>;
    async fn patch_user_profile(&mut self, id: Uuid, patch: ProfilePatch) -> PortResult<()>;
    async fn set_user_stats(&mut self, id: Uuid, stats: UserStats) -> PortResult<()>;

    // --- Books ---
    async fn insert_book(&mut self, book: NewBook) -> PortResult<Uuid>;
    async fn get_book(&mut self, id: Uuid) -> PortResult<Option<Book>>;
    async fn find_book_by_catalog_key(&mut self, key: &str) -> PortResult<Option<Book>>;
    async fn set_book_stats(&mut self, id: Uuid, stats: BookStats) -> PortResult<()>;
    /// Newest books first.
    async fn list_recent_books(&mut self, limit: usize) -> PortResult<Vec<Book>>;

    // --- Library entries ---
    async fn insert_entry(&mut self, entry: NewEntry) -> PortResult<Uuid>;
    async fn get_entry(&mut self, id: Uuid) -> PortResult<Option<LibraryEntry>>;
    async fn find_entry_for_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<LibraryEntry>>;
    /// All of a user's entries; when `status` is given the filter is
    /// applied via the compound (user, status) lookup.
    async fn list_entries_for_user(
        &mut self,
        user_id: Uuid,
        status: Option<ReadingStatus>,
    ) -> PortResult<Vec<LibraryEntry>>;
    async fn list_entries_for_book(&mut self, book_id: Uuid) -> PortResult<Vec<LibraryEntry>>;
    async fn update_entry(&mut self, entry: &LibraryEntry) -> PortResult<()>;
    async fn delete_entry(&mut self, id: Uuid) -> PortResult<()>;

    // --- Words ---
    async fn insert_word(&mut self, word: NewWord) -> PortResult<Uuid>;
    async fn get_word(&mut self, id: Uuid) -> PortResult<Option<Word>>;
    async fn update_word(&mut self, word: &Word) -> PortResult<()>;
    async fn delete_word(&mut self, id: Uuid) -> PortResult<()>;
    /// Newest first. `limit: None` enumerates everything (cascade path).
    async fn list_words_for_entry(
        &mut self,
        entry_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<Word>>;
    /// Newest first.
    async fn list_words_for_user(&mut self, user_id: Uuid, limit: usize) -> PortResult<Vec<Word>>;
    /// Public words only, filtered at the lookup level. Newest first.
    async fn list_public_words_for_book(
        &mut self,
        book_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Word>>;

    // --- Likes ---
    async fn insert_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Uuid>;
    async fn find_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Option<Like>>;
    async fn delete_like(&mut self, id: Uuid) -> PortResult<()>;
    /// Returns how many likes were deleted.
    async fn delete_likes_for_word(&mut self, word_id: Uuid) -> PortResult<u64>;

    // --- Credentials & auth sessions ---
    async fn insert_credentials(&mut self, credentials: Credentials) -> PortResult<()>;
    async fn find_credentials_by_email(&mut self, email: &str)
        -> PortResult<Option<Credentials>>;
    async fn insert_auth_session(&mut self, session: AuthSession) -> PortResult<()>;
    async fn get_auth_session(&mut self, id: &str) -> PortResult<Option<AuthSession>>;
    async fn delete_auth_session(&mut self, id: &str) -> PortResult<()>;

    /// Atomically publish every write in this transaction.
    async fn commit(self: Box<Self>) -> PortResult<()>;
}

//=========================================================================================
// External Service Ports
//=========================================================================================

/// External book catalog search. Results are candidates only; nothing is
/// persisted until a user adds one to their library.
#[async_trait]
pub trait BookSearchService: Send + Sync {
    /// Free-text search returning up to a provider-bounded number of
    /// candidates. A blank query yields an empty result without calling
    /// the provider.
    async fn search(&self, query: &str) -> PortResult<Vec<CandidateBook>>;
}
