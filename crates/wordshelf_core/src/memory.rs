//! crates/wordshelf_core/src/memory.rs
//!
//! In-memory implementation of the `Store` port, for tests and embedding.
//!
//! A transaction clones the current state while holding the store lock,
//! mutates the clone, and writes it back on commit; dropping a transaction
//! without committing discards the clone. Because the lock is held for the
//! whole transaction, operations are strictly serialized, which satisfies
//! the no-lost-update requirement of the port contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Book, BookStats, Credentials, Like, LibraryEntry, NewBook, NewEntry, NewUser,
    NewWord, ProfilePatch, ReadingStatus, User, UserStats, Word,
};
use crate::ports::{PortError, PortResult, Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemState {
    users: HashMap<Uuid, User>,
    books: HashMap<Uuid, Book>,
    entries: HashMap<Uuid, LibraryEntry>,
    words: HashMap<Uuid, Word>,
    likes: HashMap<Uuid, Like>,
    credentials: HashMap<String, Credentials>,
    sessions: HashMap<String, AuthSession>,
    /// Insertion sequence per record id; tie-breaker for newest-first
    /// listings when two timestamps collide.
    order: HashMap<Uuid, u64>,
    seq: u64,
}

impl MemState {
    fn stamp(&mut self, id: Uuid) {
        self.seq += 1;
        self.order.insert(id, self.seq);
    }

    fn rank(&self, id: Uuid) -> u64 {
        self.order.get(&id).copied().unwrap_or(0)
    }
}

/// In-memory, HashMap-based document store.
pub struct MemoryStore {
    inner: Arc<Mutex<MemState>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemState::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> PortResult<Box<dyn StoreTx>> {
        let guard = self.inner.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemState>,
    staged: MemState,
}

impl MemoryTx {
    /// Sort newest first: creation time, then insertion order.
    fn newest_first<T>(&self, mut items: Vec<(Uuid, chrono::DateTime<Utc>, T)>) -> Vec<T> {
        items.sort_by(|a, b| (b.1, self.staged.rank(b.0)).cmp(&(a.1, self.staged.rank(a.0))));
        items.into_iter().map(|(_, _, item)| item).collect()
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    // --- Users ---

    async fn insert_user(&mut self, user: NewUser) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        self.staged.users.insert(
            id,
            User {
                id,
                username: user.username,
                email: user.email,
                avatar_url: user.avatar_url,
                bio: user.bio,
                settings: user.settings,
                stats: user.stats,
                badges: user.badges,
                created_at: Utc::now(),
            },
        );
        self.staged.stamp(id);
        Ok(id)
    }

    async fn get_user(&mut self, id: Uuid) -> PortResult<Option<User>> {
        Ok(self.staged.users.get(&id).cloned())
    }

    async fn get_user_by_username(&mut self, username: &str) -> PortResult<Option<User>> {
        Ok(self
            .staged
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn patch_user_profile(&mut self, id: Uuid, patch: ProfilePatch) -> PortResult<()> {
        if let Some(user) = self.staged.users.get_mut(&id) {
            if let Some(bio) = patch.bio {
                user.bio = Some(bio);
            }
            if let Some(avatar_url) = patch.avatar_url {
                user.avatar_url = Some(avatar_url);
            }
            if let Some(settings) = patch.settings {
                user.settings = settings;
            }
        }
        Ok(())
    }

    async fn set_user_stats(&mut self, id: Uuid, stats: UserStats) -> PortResult<()> {
        if let Some(user) = self.staged.users.get_mut(&id) {
            user.stats = stats;
        }
        Ok(())
    }

    // --- Books ---

    async fn insert_book(&mut self, book: NewBook) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        self.staged.books.insert(
            id,
            Book {
                id,
                catalog_key: book.catalog_key,
                title: book.title,
                author: book.author,
                cover_url: book.cover_url,
                isbn: book.isbn,
                first_publish_year: book.first_publish_year,
                stats: BookStats::default(),
                created_at: Utc::now(),
            },
        );
        self.staged.stamp(id);
        Ok(id)
    }

    async fn get_book(&mut self, id: Uuid) -> PortResult<Option<Book>> {
        Ok(self.staged.books.get(&id).cloned())
    }

    async fn find_book_by_catalog_key(&mut self, key: &str) -> PortResult<Option<Book>> {
        Ok(self
            .staged
            .books
            .values()
            .find(|book| book.catalog_key == key)
            .cloned())
    }

    async fn set_book_stats(&mut self, id: Uuid, stats: BookStats) -> PortResult<()> {
        if let Some(book) = self.staged.books.get_mut(&id) {
            book.stats = stats;
        }
        Ok(())
    }

    async fn list_recent_books(&mut self, limit: usize) -> PortResult<Vec<Book>> {
        let items = self
            .staged
            .books
            .values()
            .map(|book| (book.id, book.created_at, book.clone()))
            .collect();
        let mut books = self.newest_first(items);
        books.truncate(limit);
        Ok(books)
    }

    // --- Library entries ---

    async fn insert_entry(&mut self, entry: NewEntry) -> PortResult<Uuid> {
        // Backstop for the (user, book) uniqueness invariant; the service
        // checks first, so hitting this means a caller skipped the check.
        if self
            .staged
            .entries
            .values()
            .any(|e| e.user_id == entry.user_id && e.book_id == entry.book_id)
        {
            return Err(PortError::DuplicateEntry);
        }
        let id = Uuid::new_v4();
        self.staged.entries.insert(
            id,
            LibraryEntry {
                id,
                user_id: entry.user_id,
                book_id: entry.book_id,
                status: entry.status,
                notes: None,
                words_count: 0,
                started_at: entry.started_at,
                finished_at: None,
                created_at: Utc::now(),
            },
        );
        self.staged.stamp(id);
        Ok(id)
    }

    async fn get_entry(&mut self, id: Uuid) -> PortResult<Option<LibraryEntry>> {
        Ok(self.staged.entries.get(&id).cloned())
    }

    async fn find_entry_for_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<LibraryEntry>> {
        Ok(self
            .staged
            .entries
            .values()
            .find(|entry| entry.user_id == user_id && entry.book_id == book_id)
            .cloned())
    }

    async fn list_entries_for_user(
        &mut self,
        user_id: Uuid,
        status: Option<ReadingStatus>,
    ) -> PortResult<Vec<LibraryEntry>> {
        let items = self
            .staged
            .entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .filter(|entry| status.map_or(true, |wanted| entry.status == wanted))
            .map(|entry| (entry.id, entry.created_at, entry.clone()))
            .collect();
        Ok(self.newest_first(items))
    }

    async fn list_entries_for_book(&mut self, book_id: Uuid) -> PortResult<Vec<LibraryEntry>> {
        let items = self
            .staged
            .entries
            .values()
            .filter(|entry| entry.book_id == book_id)
            .map(|entry| (entry.id, entry.created_at, entry.clone()))
            .collect();
        Ok(self.newest_first(items))
    }

    async fn update_entry(&mut self, entry: &LibraryEntry) -> PortResult<()> {
        if self.staged.entries.contains_key(&entry.id) {
            self.staged.entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn delete_entry(&mut self, id: Uuid) -> PortResult<()> {
        self.staged.entries.remove(&id);
        self.staged.order.remove(&id);
        Ok(())
    }

    // --- Words ---

    async fn insert_word(&mut self, word: NewWord) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        self.staged.words.insert(
            id,
            Word {
                id,
                user_id: word.user_id,
                entry_id: word.entry_id,
                book_id: word.book_id,
                word: word.word,
                definition: word.definition,
                context: word.context,
                page_number: word.page_number,
                notes: word.notes,
                likes_count: 0,
                is_public: word.is_public,
                created_at: Utc::now(),
            },
        );
        self.staged.stamp(id);
        Ok(id)
    }

    async fn get_word(&mut self, id: Uuid) -> PortResult<Option<Word>> {
        Ok(self.staged.words.get(&id).cloned())
    }

    async fn update_word(&mut self, word: &Word) -> PortResult<()> {
        if self.staged.words.contains_key(&word.id) {
            self.staged.words.insert(word.id, word.clone());
        }
        Ok(())
    }

    async fn delete_word(&mut self, id: Uuid) -> PortResult<()> {
        self.staged.words.remove(&id);
        self.staged.order.remove(&id);
        Ok(())
    }

    async fn list_words_for_entry(
        &mut self,
        entry_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<Word>> {
        let items = self
            .staged
            .words
            .values()
            .filter(|word| word.entry_id == entry_id)
            .map(|word| (word.id, word.created_at, word.clone()))
            .collect();
        let mut words = self.newest_first(items);
        if let Some(limit) = limit {
            words.truncate(limit);
        }
        Ok(words)
    }

    async fn list_words_for_user(&mut self, user_id: Uuid, limit: usize) -> PortResult<Vec<Word>> {
        let items = self
            .staged
            .words
            .values()
            .filter(|word| word.user_id == user_id)
            .map(|word| (word.id, word.created_at, word.clone()))
            .collect();
        let mut words = self.newest_first(items);
        words.truncate(limit);
        Ok(words)
    }

    async fn list_public_words_for_book(
        &mut self,
        book_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Word>> {
        let items = self
            .staged
            .words
            .values()
            .filter(|word| word.book_id == book_id && word.is_public)
            .map(|word| (word.id, word.created_at, word.clone()))
            .collect();
        let mut words = self.newest_first(items);
        words.truncate(limit);
        Ok(words)
    }

    // --- Likes ---

    async fn insert_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        self.staged.likes.insert(
            id,
            Like {
                id,
                user_id,
                word_id,
                created_at: Utc::now(),
            },
        );
        self.staged.stamp(id);
        Ok(id)
    }

    async fn find_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Option<Like>> {
        Ok(self
            .staged
            .likes
            .values()
            .find(|like| like.user_id == user_id && like.word_id == word_id)
            .cloned())
    }

    async fn delete_like(&mut self, id: Uuid) -> PortResult<()> {
        self.staged.likes.remove(&id);
        self.staged.order.remove(&id);
        Ok(())
    }

    async fn delete_likes_for_word(&mut self, word_id: Uuid) -> PortResult<u64> {
        let doomed: Vec<Uuid> = self
            .staged
            .likes
            .values()
            .filter(|like| like.word_id == word_id)
            .map(|like| like.id)
            .collect();
        for id in &doomed {
            self.staged.likes.remove(id);
            self.staged.order.remove(id);
        }
        Ok(doomed.len() as u64)
    }

    // --- Credentials & auth sessions ---

    async fn insert_credentials(&mut self, credentials: Credentials) -> PortResult<()> {
        self.staged
            .credentials
            .insert(credentials.email.clone(), credentials);
        Ok(())
    }

    async fn find_credentials_by_email(
        &mut self,
        email: &str,
    ) -> PortResult<Option<Credentials>> {
        Ok(self.staged.credentials.get(email).cloned())
    }

    async fn insert_auth_session(&mut self, session: AuthSession) -> PortResult<()> {
        self.staged.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_auth_session(&mut self, id: &str) -> PortResult<Option<AuthSession>> {
        Ok(self.staged.sessions.get(id).cloned())
    }

    async fn delete_auth_session(&mut self, id: &str) -> PortResult<()> {
        self.staged.sessions.remove(id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserSettings, UserStats};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            avatar_url: None,
            bio: None,
            settings: UserSettings::default(),
            stats: UserStats::default(),
            badges: Vec::new(),
        }
    }

    fn new_word(user_id: Uuid, entry_id: Uuid, book_id: Uuid, word: &str) -> NewWord {
        NewWord {
            user_id,
            entry_id,
            book_id,
            word: word.to_string(),
            definition: None,
            context: None,
            page_number: None,
            notes: None,
            is_public: true,
        }
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_user(new_user("ghost")).await.unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_user_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let id = tx.insert_user(new_user("alice")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let user = tx.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn word_listings_are_newest_first_and_capped() {
        let store = MemoryStore::new();
        let (user_id, entry_id, book_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        for word in ["first", "second", "third"] {
            tx.insert_word(new_word(user_id, entry_id, book_id, word))
                .await
                .unwrap();
        }

        let words = tx.list_words_for_entry(entry_id, None).await.unwrap();
        let spelled: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(spelled, ["third", "second", "first"]);

        let capped = tx.list_words_for_entry(entry_id, Some(2)).await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].word, "third");
    }

    #[tokio::test]
    async fn public_book_listing_excludes_private_words() {
        let store = MemoryStore::new();
        let (user_id, entry_id, book_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.insert_word(new_word(user_id, entry_id, book_id, "shared"))
            .await
            .unwrap();
        let mut private = new_word(user_id, entry_id, book_id, "hidden");
        private.is_public = false;
        tx.insert_word(private).await.unwrap();

        let words = tx.list_public_words_for_book(book_id, 200).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "shared");
    }

    #[tokio::test]
    async fn deleting_likes_for_word_reports_count() {
        let store = MemoryStore::new();
        let word_id = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        tx.insert_like(Uuid::new_v4(), word_id).await.unwrap();
        tx.insert_like(Uuid::new_v4(), word_id).await.unwrap();
        tx.insert_like(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        assert_eq!(tx.delete_likes_for_word(word_id).await.unwrap(), 2);
        assert_eq!(tx.delete_likes_for_word(word_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_entry_insert_is_rejected() {
        let store = MemoryStore::new();
        let (user_id, book_id) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.insert_entry(NewEntry {
            user_id,
            book_id,
            status: ReadingStatus::Reading,
            started_at: None,
        })
        .await
        .unwrap();

        let result = tx
            .insert_entry(NewEntry {
                user_id,
                book_id,
                status: ReadingStatus::Finished,
                started_at: None,
            })
            .await;
        assert!(matches!(result, Err(PortError::DuplicateEntry)));
    }
}
