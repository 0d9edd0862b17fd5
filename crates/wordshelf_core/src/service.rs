//! crates/wordshelf_core/src/service.rs
//!
//! The application service: every exposed library/word/profile operation,
//! each executed as one transaction in the order gate -> primary write ->
//! counter updates -> commit. Counter arithmetic lives in `counters`,
//! dependent-row deletion in `cascade`; this module wires them to the
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    normalize_word, AddBookRequest, AddWordRequest, Book, BookReader, BookStats, EntryWithBook,
    LibraryEntry, LikeToggle, NewBook, NewEntry, NewWord, ProfilePatch, PublicProfile,
    ReadingStatus, User, UserStats, Word, WordPatch, WordWithBook,
};
use crate::ports::{PortError, PortResult, Store, StoreTx};
use crate::{cascade, counters, gate};

/// Listing caps bound response sizes; listings are newest-first.
const ENTRY_WORDS_CAP: usize = 200;
const USER_WORDS_CAP: usize = 500;
const BOOK_WORDS_CAP: usize = 200;
const RECENT_BOOKS_CAP: usize = 20;

/// The library service, generic over the storage engine via the `Store`
/// port. Cheap to clone; all state lives behind the store.
#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn Store>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    //=====================================================================================
    // Library entries
    //=====================================================================================

    /// Add a catalog book to the caller's library, creating the canonical
    /// `Book` record on first use of its catalog key.
    pub async fn add_library_entry(
        &self,
        caller: Option<Uuid>,
        request: AddBookRequest,
    ) -> PortResult<Uuid> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;

        let book = match tx.find_book_by_catalog_key(&request.catalog_key).await? {
            Some(existing) => existing,
            None => {
                let book_id = tx
                    .insert_book(NewBook {
                        catalog_key: request.catalog_key,
                        title: request.title,
                        author: request.author,
                        cover_url: request.cover_url,
                        isbn: request.isbn,
                        first_publish_year: request.first_publish_year,
                    })
                    .await?;
                tx.get_book(book_id).await?.ok_or_else(|| {
                    PortError::Unexpected("book vanished after insert".to_string())
                })?
            }
        };

        if tx.find_entry_for_book(caller, book.id).await?.is_some() {
            return Err(PortError::DuplicateEntry);
        }

        let started_at = (request.status == ReadingStatus::Reading).then(Utc::now);
        let entry_id = tx
            .insert_entry(NewEntry {
                user_id: caller,
                book_id: book.id,
                status: request.status,
                started_at,
            })
            .await?;

        adjust_book_stats(tx.as_mut(), book.id, counters::book_entry_added).await?;
        adjust_user_stats(tx.as_mut(), caller, counters::user_entry_added).await?;

        tx.commit().await?;
        Ok(entry_id)
    }

    /// Change the reading status. `started_at`/`finished_at` are stamped on
    /// the first transition into their status and never overwritten.
    pub async fn update_entry_status(
        &self,
        caller: Option<Uuid>,
        entry_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<LibraryEntry> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let mut entry = gate::ensure_owner(tx.get_entry(entry_id).await?, caller)?;

        entry.status = status;
        if status == ReadingStatus::Reading && entry.started_at.is_none() {
            entry.started_at = Some(Utc::now());
        }
        if status == ReadingStatus::Finished && entry.finished_at.is_none() {
            entry.finished_at = Some(Utc::now());
        }

        tx.update_entry(&entry).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Replace the free-form notes on an entry.
    pub async fn update_entry_notes(
        &self,
        caller: Option<Uuid>,
        entry_id: Uuid,
        notes: String,
    ) -> PortResult<LibraryEntry> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let mut entry = gate::ensure_owner(tx.get_entry(entry_id).await?, caller)?;

        entry.notes = Some(notes);
        tx.update_entry(&entry).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Remove an entry and cascade to its words and their likes, keeping
    /// every counter consistent with the cascade size.
    pub async fn remove_library_entry(
        &self,
        caller: Option<Uuid>,
        entry_id: Uuid,
    ) -> PortResult<()> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let entry = gate::ensure_owner(tx.get_entry(entry_id).await?, caller)?;

        let words_removed = cascade::delete_entry(tx.as_mut(), entry.id).await?;

        adjust_book_stats(tx.as_mut(), entry.book_id, |stats| {
            counters::book_entry_removed(stats, words_removed)
        })
        .await?;
        adjust_user_stats(tx.as_mut(), caller, |stats| {
            counters::user_entry_removed(stats, words_removed)
        })
        .await?;

        tx.commit().await
    }

    /// A single entry with its resolved book. Foreign or missing entries
    /// read as `None` rather than an error.
    pub async fn get_library_entry(
        &self,
        caller: Option<Uuid>,
        entry_id: Uuid,
    ) -> PortResult<Option<EntryWithBook>> {
        let Some(caller) = caller else {
            return Ok(None);
        };
        let mut tx = self.store.begin().await?;
        let Some(entry) = tx.get_entry(entry_id).await? else {
            return Ok(None);
        };
        if entry.user_id != caller {
            return Ok(None);
        }
        let book = tx.get_book(entry.book_id).await?;
        let words_count = entry.words_count;
        Ok(Some(EntryWithBook {
            entry,
            book,
            words_count,
        }))
    }

    /// The caller's library, optionally filtered by status via the
    /// compound (user, status) lookup.
    pub async fn list_my_library(
        &self,
        caller: Option<Uuid>,
        status: Option<ReadingStatus>,
    ) -> PortResult<Vec<EntryWithBook>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        let mut tx = self.store.begin().await?;
        let entries = tx.list_entries_for_user(caller, status).await?;
        enrich_entries(tx.as_mut(), entries).await
    }

    /// Another user's library. Empty unless their profile is public.
    pub async fn list_user_library(
        &self,
        user_id: Uuid,
        status: Option<ReadingStatus>,
    ) -> PortResult<Vec<EntryWithBook>> {
        let mut tx = self.store.begin().await?;
        match tx.get_user(user_id).await? {
            Some(user) if user.settings.public_profile => {}
            _ => return Ok(Vec::new()),
        }
        let entries = tx.list_entries_for_user(user_id, status).await?;
        enrich_entries(tx.as_mut(), entries).await
    }

    //=====================================================================================
    // Words
    //=====================================================================================

    /// Attach a vocabulary word to one of the caller's entries. The word
    /// is stored trimmed and lowercased.
    pub async fn add_word(
        &self,
        caller: Option<Uuid>,
        request: AddWordRequest,
    ) -> PortResult<Uuid> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let mut entry = gate::ensure_owner(tx.get_entry(request.entry_id).await?, caller)?;

        let word = normalize_word(&request.word).ok_or(PortError::EmptyWord)?;
        let word_id = tx
            .insert_word(NewWord {
                user_id: caller,
                entry_id: entry.id,
                book_id: entry.book_id,
                word,
                definition: request.definition,
                context: request.context,
                page_number: request.page_number,
                notes: request.notes,
                is_public: request.is_public.unwrap_or(true),
            })
            .await?;

        adjust_user_stats(tx.as_mut(), caller, counters::user_word_added).await?;
        adjust_book_stats(tx.as_mut(), entry.book_id, counters::book_word_added).await?;
        counters::entry_word_added(&mut entry.words_count);
        tx.update_entry(&entry).await?;

        tx.commit().await?;
        Ok(word_id)
    }

    /// Patch the optional fields of a word. Absent fields stay untouched.
    pub async fn update_word(
        &self,
        caller: Option<Uuid>,
        word_id: Uuid,
        patch: WordPatch,
    ) -> PortResult<Word> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let mut word = gate::ensure_owner(tx.get_word(word_id).await?, caller)?;

        if let Some(definition) = patch.definition {
            word.definition = Some(definition);
        }
        if let Some(context) = patch.context {
            word.context = Some(context);
        }
        if let Some(page_number) = patch.page_number {
            word.page_number = Some(page_number);
        }
        if let Some(notes) = patch.notes {
            word.notes = Some(notes);
        }
        if let Some(is_public) = patch.is_public {
            word.is_public = is_public;
        }

        tx.update_word(&word).await?;
        tx.commit().await?;
        Ok(word)
    }

    /// Delete a word, its likes, and the three word counters it backs.
    pub async fn remove_word(&self, caller: Option<Uuid>, word_id: Uuid) -> PortResult<()> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        let word = gate::ensure_owner(tx.get_word(word_id).await?, caller)?;

        cascade::delete_word(tx.as_mut(), word.id).await?;

        adjust_user_stats(tx.as_mut(), caller, counters::user_word_removed).await?;
        adjust_book_stats(tx.as_mut(), word.book_id, counters::book_word_removed).await?;
        if let Some(mut entry) = tx.get_entry(word.entry_id).await? {
            counters::entry_word_removed(&mut entry.words_count);
            tx.update_entry(&entry).await?;
        }

        tx.commit().await
    }

    /// Words for one of the caller's entries, newest first. Foreign
    /// entries read as empty.
    pub async fn list_words_for_entry(
        &self,
        caller: Option<Uuid>,
        entry_id: Uuid,
    ) -> PortResult<Vec<Word>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        let mut tx = self.store.begin().await?;
        match tx.get_entry(entry_id).await? {
            Some(entry) if entry.user_id == caller => {
                tx.list_words_for_entry(entry_id, Some(ENTRY_WORDS_CAP)).await
            }
            _ => Ok(Vec::new()),
        }
    }

    /// All of the caller's words across books, enriched with book title
    /// and author. Book lookups are deduplicated within the call since
    /// many words share a book.
    pub async fn list_my_words(&self, caller: Option<Uuid>) -> PortResult<Vec<WordWithBook>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        let mut tx = self.store.begin().await?;
        let words = tx.list_words_for_user(caller, USER_WORDS_CAP).await?;

        let mut book_cache: HashMap<Uuid, (String, String)> = HashMap::new();
        let mut enriched = Vec::with_capacity(words.len());
        for word in words {
            if !book_cache.contains_key(&word.book_id) {
                let info = tx
                    .get_book(word.book_id)
                    .await?
                    .map(|book| (book.title, book.author))
                    .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()));
                book_cache.insert(word.book_id, info);
            }
            let (book_title, book_author) = book_cache[&word.book_id].clone();
            enriched.push(WordWithBook {
                word,
                book_title,
                book_author,
            });
        }
        Ok(enriched)
    }

    /// Public words for a book, from all users, filtered at the lookup
    /// level.
    pub async fn list_public_words_for_book(&self, book_id: Uuid) -> PortResult<Vec<Word>> {
        let mut tx = self.store.begin().await?;
        tx.list_public_words_for_book(book_id, BOOK_WORDS_CAP).await
    }

    /// Toggle the caller's like on a word. Involution: two calls return
    /// to the prior state.
    pub async fn toggle_like(&self, caller: Option<Uuid>, word_id: Uuid) -> PortResult<LikeToggle> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;

        let existing = tx.find_like(caller, word_id).await?;
        let mut word = tx
            .get_word(word_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Word".to_string()))?;

        let liked = match existing {
            Some(like) => {
                tx.delete_like(like.id).await?;
                counters::word_unliked(&mut word.likes_count);
                false
            }
            None => {
                tx.insert_like(caller, word_id).await?;
                counters::word_liked(&mut word.likes_count);
                true
            }
        };
        tx.update_word(&word).await?;
        tx.commit().await?;
        Ok(LikeToggle { liked })
    }

    //=====================================================================================
    // Profiles
    //=====================================================================================

    pub async fn get_my_profile(&self, caller: Option<Uuid>) -> PortResult<Option<User>> {
        let Some(caller) = caller else {
            return Ok(None);
        };
        let mut tx = self.store.begin().await?;
        tx.get_user(caller).await
    }

    /// Look up a user by username. `None` unless their profile is public;
    /// only the restricted projection is exposed.
    pub async fn get_public_profile(&self, username: &str) -> PortResult<Option<PublicProfile>> {
        let mut tx = self.store.begin().await?;
        Ok(tx
            .get_user_by_username(username)
            .await?
            .filter(|user| user.settings.public_profile)
            .map(|user| user.public_projection()))
    }

    /// Patch the caller's profile fields. Absent fields stay untouched.
    pub async fn update_my_profile(
        &self,
        caller: Option<Uuid>,
        patch: ProfilePatch,
    ) -> PortResult<User> {
        let caller = gate::require_caller(caller)?;
        let mut tx = self.store.begin().await?;
        tx.patch_user_profile(caller, patch).await?;
        let user = tx
            .get_user(caller)
            .await?
            .ok_or_else(|| PortError::NotFound("User".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    //=====================================================================================
    // Books
    //=====================================================================================

    pub async fn get_book_by_catalog_key(&self, key: &str) -> PortResult<Option<Book>> {
        let mut tx = self.store.begin().await?;
        tx.find_book_by_catalog_key(key).await
    }

    /// Recently added books, newest first. There is no popularity sort;
    /// the name is honest about that.
    pub async fn list_recent_books(&self) -> PortResult<Vec<Book>> {
        let mut tx = self.store.begin().await?;
        tx.list_recent_books(RECENT_BOOKS_CAP).await
    }

    /// Everyone with this book in their library whose profile is public,
    /// as public projections plus their per-book reading state.
    pub async fn list_book_readers(&self, book_id: Uuid) -> PortResult<Vec<BookReader>> {
        let mut tx = self.store.begin().await?;
        let entries = tx.list_entries_for_book(book_id).await?;

        let mut readers = Vec::new();
        for entry in entries {
            let Some(user) = tx.get_user(entry.user_id).await? else {
                continue;
            };
            if !user.settings.public_profile {
                continue;
            }
            readers.push(BookReader {
                profile: user.public_projection(),
                status: entry.status,
                started_at: entry.started_at,
                finished_at: entry.finished_at,
            });
        }
        Ok(readers)
    }
}

/// Load-modify-store a user's stats inside the current transaction. A
/// missing user is tolerated (stats simply are not written).
async fn adjust_user_stats(
    tx: &mut dyn StoreTx,
    user_id: Uuid,
    apply: impl FnOnce(&mut UserStats) + Send,
) -> PortResult<()> {
    if let Some(mut user) = tx.get_user(user_id).await? {
        apply(&mut user.stats);
        tx.set_user_stats(user_id, user.stats).await?;
    }
    Ok(())
}

/// Same as [`adjust_user_stats`] for a book's stats.
async fn adjust_book_stats(
    tx: &mut dyn StoreTx,
    book_id: Uuid,
    apply: impl FnOnce(&mut BookStats) + Send,
) -> PortResult<()> {
    if let Some(mut book) = tx.get_book(book_id).await? {
        apply(&mut book.stats);
        tx.set_book_stats(book_id, book.stats).await?;
    }
    Ok(())
}

async fn enrich_entries(
    tx: &mut dyn StoreTx,
    entries: Vec<LibraryEntry>,
) -> PortResult<Vec<EntryWithBook>> {
    let mut enriched = Vec::with_capacity(entries.len());
    for entry in entries {
        let book = tx.get_book(entry.book_id).await?;
        let words_count = entry.words_count;
        enriched.push(EntryWithBook {
            entry,
            book,
            words_count,
        });
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewUser, UserSettings};
    use crate::memory::MemoryStore;

    fn setup() -> (LibraryService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LibraryService::new(store.clone()), store)
    }

    async fn seed_user(store: &MemoryStore, username: &str) -> Uuid {
        let mut tx = store.begin().await.unwrap();
        let id = tx
            .insert_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                avatar_url: None,
                bio: None,
                settings: UserSettings::default(),
                stats: UserStats::default(),
                badges: Vec::new(),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    fn book_request(key: &str, status: ReadingStatus) -> AddBookRequest {
        AddBookRequest {
            catalog_key: key.to_string(),
            title: "Book".to_string(),
            author: "Author".to_string(),
            cover_url: None,
            isbn: None,
            first_publish_year: Some(1999),
            status,
        }
    }

    fn word_request(entry_id: Uuid, word: &str) -> AddWordRequest {
        AddWordRequest {
            entry_id,
            word: word.to_string(),
            definition: None,
            context: None,
            page_number: None,
            notes: None,
            is_public: None,
        }
    }

    async fn user_stats(service: &LibraryService, user_id: Uuid) -> UserStats {
        service
            .get_my_profile(Some(user_id))
            .await
            .unwrap()
            .unwrap()
            .stats
    }

    async fn book_stats(service: &LibraryService, key: &str) -> BookStats {
        service
            .get_book_by_catalog_key(key)
            .await
            .unwrap()
            .unwrap()
            .stats
    }

    #[tokio::test]
    async fn add_entry_creates_book_and_increments_counters() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;

        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();

        let enriched = service
            .get_library_entry(Some(user), entry_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(enriched.entry.status, ReadingStatus::Reading);
        assert!(enriched.entry.started_at.is_some());
        assert_eq!(enriched.words_count, 0);
        assert_eq!(enriched.book.unwrap().stats.readers_count, 1);

        assert_eq!(user_stats(&service, user).await.books_count, 1);
    }

    #[tokio::test]
    async fn want_to_read_does_not_stamp_started_at() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;

        let entry_id = service
            .add_library_entry(
                Some(user),
                book_request("/works/OL1", ReadingStatus::WantToRead),
            )
            .await
            .unwrap();

        let enriched = service
            .get_library_entry(Some(user), entry_id)
            .await
            .unwrap()
            .unwrap();
        assert!(enriched.entry.started_at.is_none());
    }

    #[tokio::test]
    async fn readers_count_tracks_distinct_users() {
        let (service, store) = setup();
        for name in ["alice", "bob", "carol"] {
            let user = seed_user(&store, name).await;
            service
                .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
                .await
                .unwrap();
        }
        assert_eq!(book_stats(&service, "/works/OL1").await.readers_count, 3);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_with_counters_unchanged() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;

        service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();
        let err = service
            .add_library_entry(
                Some(user),
                book_request("/works/OL1", ReadingStatus::Finished),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::DuplicateEntry));
        assert_eq!(book_stats(&service, "/works/OL1").await.readers_count, 1);
        assert_eq!(user_stats(&service, user).await.books_count, 1);
    }

    #[tokio::test]
    async fn started_at_is_stamped_once_and_never_overwritten() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(
                Some(user),
                book_request("/works/OL1", ReadingStatus::WantToRead),
            )
            .await
            .unwrap();

        let entry = service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Reading)
            .await
            .unwrap();
        let first_started = entry.started_at.unwrap();

        // re-entering `reading` while already reading
        let entry = service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Reading)
            .await
            .unwrap();
        assert_eq!(entry.started_at, Some(first_started));

        // leaving and coming back also keeps the original stamp
        service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Finished)
            .await
            .unwrap();
        let entry = service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Reading)
            .await
            .unwrap();
        assert_eq!(entry.started_at, Some(first_started));
    }

    #[tokio::test]
    async fn finished_at_is_stamped_once() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();

        let entry = service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Finished)
            .await
            .unwrap();
        let first_finished = entry.finished_at.unwrap();

        service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Reading)
            .await
            .unwrap();
        let entry = service
            .update_entry_status(Some(user), entry_id, ReadingStatus::Finished)
            .await
            .unwrap();
        assert_eq!(entry.finished_at, Some(first_finished));
    }

    #[tokio::test]
    async fn notes_update_replaces_text_without_counter_changes() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();

        let entry = service
            .update_entry_notes(Some(user), entry_id, "great so far".to_string())
            .await
            .unwrap();
        assert_eq!(entry.notes.as_deref(), Some("great so far"));
        assert_eq!(user_stats(&service, user).await.books_count, 1);
    }

    #[tokio::test]
    async fn add_word_normalizes_and_updates_all_three_counters() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();

        service
            .add_word(Some(user), word_request(entry_id, "  Ephemeral  "))
            .await
            .unwrap();

        let words = service
            .list_words_for_entry(Some(user), entry_id)
            .await
            .unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "ephemeral");
        assert_eq!(words[0].likes_count, 0);
        assert!(words[0].is_public);

        assert_eq!(user_stats(&service, user).await.words_count, 1);
        assert_eq!(book_stats(&service, "/works/OL1").await.words_count, 1);
        let enriched = service
            .get_library_entry(Some(user), entry_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(enriched.words_count, 1);
    }

    #[tokio::test]
    async fn empty_word_is_rejected_without_side_effects() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();

        let err = service
            .add_word(Some(user), word_request(entry_id, "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::EmptyWord));
        assert_eq!(user_stats(&service, user).await.words_count, 0);
    }

    #[tokio::test]
    async fn adding_word_to_foreign_entry_is_not_found() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let entry_id = service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();

        let err = service
            .add_word(Some(bob), word_request(entry_id, "ephemeral"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn word_patch_updates_only_the_given_fields() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();
        let mut request = word_request(entry_id, "ephemeral");
        request.definition = Some("lasting a short time".to_string());
        request.context = Some("an ephemeral stream".to_string());
        let word_id = service.add_word(Some(user), request).await.unwrap();

        let word = service
            .update_word(
                Some(user),
                word_id,
                WordPatch {
                    definition: Some("short-lived".to_string()),
                    is_public: Some(false),
                    ..WordPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(word.definition.as_deref(), Some("short-lived"));
        assert_eq!(word.context.as_deref(), Some("an ephemeral stream"));
        assert!(!word.is_public);
    }

    #[tokio::test]
    async fn remove_word_cascades_likes_and_decrements_counters() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let entry_id = service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();
        let word_id = service
            .add_word(Some(alice), word_request(entry_id, "ephemeral"))
            .await
            .unwrap();
        service.toggle_like(Some(bob), word_id).await.unwrap();

        service.remove_word(Some(alice), word_id).await.unwrap();

        assert!(service
            .list_words_for_entry(Some(alice), entry_id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(user_stats(&service, alice).await.words_count, 0);
        assert_eq!(book_stats(&service, "/works/OL1").await.words_count, 0);
        let enriched = service
            .get_library_entry(Some(alice), entry_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(enriched.words_count, 0);

        // the like went with the word
        let err = service.toggle_like(Some(bob), word_id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_entry_cascades_words_and_likes() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let entry_id = service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();
        let liked_word = service
            .add_word(Some(alice), word_request(entry_id, "ephemeral"))
            .await
            .unwrap();
        service
            .add_word(Some(alice), word_request(entry_id, "sonder"))
            .await
            .unwrap();
        service.toggle_like(Some(bob), liked_word).await.unwrap();

        service
            .remove_library_entry(Some(alice), entry_id)
            .await
            .unwrap();

        assert!(service
            .get_library_entry(Some(alice), entry_id)
            .await
            .unwrap()
            .is_none());
        let stats = user_stats(&service, alice).await;
        assert_eq!(stats.books_count, 0);
        assert_eq!(stats.words_count, 0);
        let book = book_stats(&service, "/works/OL1").await;
        assert_eq!(book.readers_count, 0);
        assert_eq!(book.words_count, 0);
        assert!(matches!(
            service.toggle_like(Some(bob), liked_word).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn toggle_like_is_an_involution() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let entry_id = service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();
        let word_id = service
            .add_word(Some(alice), word_request(entry_id, "ephemeral"))
            .await
            .unwrap();

        let first = service.toggle_like(Some(bob), word_id).await.unwrap();
        assert!(first.liked);
        let words = service
            .list_words_for_entry(Some(alice), entry_id)
            .await
            .unwrap();
        assert_eq!(words[0].likes_count, 1);

        let second = service.toggle_like(Some(bob), word_id).await.unwrap();
        assert!(!second.liked);
        let words = service
            .list_words_for_entry(Some(alice), entry_id)
            .await
            .unwrap();
        assert_eq!(words[0].likes_count, 0);
    }

    #[tokio::test]
    async fn status_filter_narrows_the_listing() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        for (key, status) in [
            ("/works/OL1", ReadingStatus::Reading),
            ("/works/OL2", ReadingStatus::Finished),
            ("/works/OL3", ReadingStatus::WantToRead),
        ] {
            service
                .add_library_entry(Some(user), book_request(key, status))
                .await
                .unwrap();
        }

        let reading = service
            .list_my_library(Some(user), Some(ReadingStatus::Reading))
            .await
            .unwrap();
        assert_eq!(reading.len(), 1);
        assert_eq!(reading[0].entry.status, ReadingStatus::Reading);

        let all = service.list_my_library(Some(user), None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn my_words_are_enriched_and_newest_first() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();
        service
            .add_word(Some(user), word_request(entry_id, "first"))
            .await
            .unwrap();
        service
            .add_word(Some(user), word_request(entry_id, "second"))
            .await
            .unwrap();

        let words = service.list_my_words(Some(user)).await.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word.word, "second");
        assert_eq!(words[0].book_title, "Book");
        assert_eq!(words[1].book_author, "Author");
    }

    #[tokio::test]
    async fn public_book_words_exclude_private_ones() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();
        service
            .add_word(Some(user), word_request(entry_id, "shared"))
            .await
            .unwrap();
        let mut private = word_request(entry_id, "hidden");
        private.is_public = Some(false);
        service.add_word(Some(user), private).await.unwrap();

        let book = service
            .get_book_by_catalog_key("/works/OL1")
            .await
            .unwrap()
            .unwrap();
        let words = service.list_public_words_for_book(book.id).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "shared");
    }

    #[tokio::test]
    async fn foreign_library_reads_as_empty_or_none() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let entry_id = service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();

        assert!(service
            .get_library_entry(Some(bob), entry_id)
            .await
            .unwrap()
            .is_none());
        assert!(service
            .list_words_for_entry(Some(bob), entry_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn user_library_respects_profile_privacy() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();

        assert_eq!(service.list_user_library(alice, None).await.unwrap().len(), 1);

        service
            .update_my_profile(
                Some(alice),
                ProfilePatch {
                    settings: Some(UserSettings {
                        public_profile: false,
                        ..UserSettings::default()
                    }),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();

        assert!(service.list_user_library(alice, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn public_profile_lookup_respects_privacy() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;

        let profile = service.get_public_profile("alice").await.unwrap().unwrap();
        assert_eq!(profile.username, "alice");

        service
            .update_my_profile(
                Some(alice),
                ProfilePatch {
                    settings: Some(UserSettings {
                        public_profile: false,
                        ..UserSettings::default()
                    }),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        assert!(service.get_public_profile("alice").await.unwrap().is_none());
        assert!(service.get_public_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_patch_keeps_absent_fields() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;

        let user = service
            .update_my_profile(
                Some(alice),
                ProfilePatch {
                    bio: Some("reader of odd words".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.bio.as_deref(), Some("reader of odd words"));
        assert!(user.settings.public_profile);
    }

    #[tokio::test]
    async fn book_readers_lists_public_profiles_with_reading_state() {
        let (service, store) = setup();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        service
            .add_library_entry(
                Some(alice),
                book_request("/works/OL1", ReadingStatus::Reading),
            )
            .await
            .unwrap();
        service
            .add_library_entry(
                Some(bob),
                book_request("/works/OL1", ReadingStatus::Finished),
            )
            .await
            .unwrap();
        service
            .update_my_profile(
                Some(bob),
                ProfilePatch {
                    settings: Some(UserSettings {
                        public_profile: false,
                        ..UserSettings::default()
                    }),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();

        let book = service
            .get_book_by_catalog_key("/works/OL1")
            .await
            .unwrap()
            .unwrap();
        let readers = service.list_book_readers(book.id).await.unwrap();
        assert_eq!(readers.len(), 1);
        assert_eq!(readers[0].profile.username, "alice");
        assert_eq!(readers[0].status, ReadingStatus::Reading);
    }

    #[tokio::test]
    async fn recent_books_are_newest_first() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;
        for key in ["/works/OL1", "/works/OL2"] {
            service
                .add_library_entry(Some(user), book_request(key, ReadingStatus::Reading))
                .await
                .unwrap();
        }

        let books = service.list_recent_books().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].catalog_key, "/works/OL2");
    }

    #[tokio::test]
    async fn unauthenticated_mutations_are_rejected() {
        let (service, _store) = setup();
        assert!(matches!(
            service
                .add_library_entry(None, book_request("/works/OL1", ReadingStatus::Reading))
                .await,
            Err(PortError::Unauthenticated)
        ));
        assert!(matches!(
            service
                .add_word(None, word_request(Uuid::new_v4(), "ephemeral"))
                .await,
            Err(PortError::Unauthenticated)
        ));
        assert!(matches!(
            service.toggle_like(None, Uuid::new_v4()).await,
            Err(PortError::Unauthenticated)
        ));
    }

    /// The end-to-end walk: add a book, attach a word, like it, then tear
    /// the entry down and watch every counter return to zero.
    #[tokio::test]
    async fn full_lifecycle_returns_all_counters_to_zero() {
        let (service, store) = setup();
        let user = seed_user(&store, "alice").await;

        let entry_id = service
            .add_library_entry(Some(user), book_request("/works/OL1", ReadingStatus::Reading))
            .await
            .unwrap();
        let enriched = service
            .get_library_entry(Some(user), entry_id)
            .await
            .unwrap()
            .unwrap();
        assert!(enriched.entry.started_at.is_some());
        assert_eq!(book_stats(&service, "/works/OL1").await.readers_count, 1);
        assert_eq!(user_stats(&service, user).await.books_count, 1);

        let word_id = service
            .add_word(Some(user), {
                let mut request = word_request(entry_id, "ephemeral");
                request.definition = Some("brief".to_string());
                request
            })
            .await
            .unwrap();
        assert_eq!(user_stats(&service, user).await.words_count, 1);
        assert_eq!(book_stats(&service, "/works/OL1").await.words_count, 1);

        let toggle = service.toggle_like(Some(user), word_id).await.unwrap();
        assert!(toggle.liked);
        let words = service
            .list_words_for_entry(Some(user), entry_id)
            .await
            .unwrap();
        assert_eq!(words[0].likes_count, 1);

        service
            .remove_library_entry(Some(user), entry_id)
            .await
            .unwrap();
        let stats = user_stats(&service, user).await;
        assert_eq!(stats.books_count, 0);
        assert_eq!(stats.words_count, 0);
        let book = book_stats(&service, "/works/OL1").await;
        assert_eq!(book.readers_count, 0);
        assert_eq!(book.words_count, 0);
    }
}
