//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `Store` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Each `StoreTx` wraps one `sqlx` transaction, so a logical operation's
//! reads and writes commit together or not at all. Unique indexes on
//! `books.catalog_key`, `library_entries (user_id, book_id)`, and
//! `word_likes (user_id, word_id)` back the corresponding invariants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use wordshelf_core::domain::{
    AuthSession, Book, BookStats, Credentials, Like, LibraryEntry, NewBook, NewEntry, NewUser,
    NewWord, ProfilePatch, ReadingStatus, User, UserSettings, UserStats, Word,
};
use wordshelf_core::ports::{PortError, PortResult, Store, StoreTx};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `Store` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> PortResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await.map_err(unexpected)?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    avatar_url: Option<String>,
    bio: Option<String>,
    dark_mode: bool,
    dyslexia_font: bool,
    public_profile: bool,
    books_count: i32,
    words_count: i32,
    current_streak: i32,
    badges: Vec<String>,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            avatar_url: self.avatar_url,
            bio: self.bio,
            settings: UserSettings {
                dark_mode: self.dark_mode,
                dyslexia_font: self.dyslexia_font,
                public_profile: self.public_profile,
            },
            stats: UserStats {
                books_count: self.books_count as u32,
                words_count: self.words_count as u32,
                current_streak: self.current_streak as u32,
            },
            badges: self.badges,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, avatar_url, bio, dark_mode, dyslexia_font, \
     public_profile, books_count, words_count, current_streak, badges, created_at";

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    catalog_key: String,
    title: String,
    author: String,
    cover_url: Option<String>,
    isbn: Option<String>,
    first_publish_year: Option<i32>,
    readers_count: i32,
    words_count: i32,
    created_at: DateTime<Utc>,
}

impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            catalog_key: self.catalog_key,
            title: self.title,
            author: self.author,
            cover_url: self.cover_url,
            isbn: self.isbn,
            first_publish_year: self.first_publish_year,
            stats: BookStats {
                readers_count: self.readers_count as u32,
                words_count: self.words_count as u32,
            },
            created_at: self.created_at,
        }
    }
}

const BOOK_COLUMNS: &str = "id, catalog_key, title, author, cover_url, isbn, \
     first_publish_year, readers_count, words_count, created_at";

#[derive(FromRow)]
struct EntryRecord {
    id: Uuid,
    user_id: Uuid,
    book_id: Uuid,
    status: String,
    notes: Option<String>,
    words_count: i32,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl EntryRecord {
    fn to_domain(self) -> PortResult<LibraryEntry> {
        let status = ReadingStatus::parse(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("unknown reading status '{}'", self.status))
        })?;
        Ok(LibraryEntry {
            id: self.id,
            user_id: self.user_id,
            book_id: self.book_id,
            status,
            notes: self.notes,
            words_count: self.words_count as u32,
            started_at: self.started_at,
            finished_at: self.finished_at,
            created_at: self.created_at,
        })
    }
}

const ENTRY_COLUMNS: &str =
    "id, user_id, book_id, status, notes, words_count, started_at, finished_at, created_at";

#[derive(FromRow)]
struct WordRecord {
    id: Uuid,
    user_id: Uuid,
    entry_id: Uuid,
    book_id: Uuid,
    word: String,
    definition: Option<String>,
    context: Option<String>,
    page_number: Option<i32>,
    notes: Option<String>,
    likes_count: i32,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl WordRecord {
    fn to_domain(self) -> Word {
        Word {
            id: self.id,
            user_id: self.user_id,
            entry_id: self.entry_id,
            book_id: self.book_id,
            word: self.word,
            definition: self.definition,
            context: self.context,
            page_number: self.page_number.map(|p| p as u32),
            notes: self.notes,
            likes_count: self.likes_count as u32,
            is_public: self.is_public,
            created_at: self.created_at,
        }
    }
}

const WORD_COLUMNS: &str = "id, user_id, entry_id, book_id, word, definition, context, \
     page_number, notes, likes_count, is_public, created_at";

#[derive(FromRow)]
struct LikeRecord {
    id: Uuid,
    user_id: Uuid,
    word_id: Uuid,
    created_at: DateTime<Utc>,
}

impl LikeRecord {
    fn to_domain(self) -> Like {
        Like {
            id: self.id,
            user_id: self.user_id,
            word_id: self.word_id,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

//=========================================================================================
// `StoreTx` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoreTx for PgStoreTx {
    // --- Users ---

    async fn insert_user(&mut self, user: NewUser) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, username, email, avatar_url, bio, dark_mode, dyslexia_font, \
             public_profile, books_count, words_count, current_streak, badges, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(user.settings.dark_mode)
        .bind(user.settings.dyslexia_font)
        .bind(user.settings.public_profile)
        .bind(user.stats.books_count as i32)
        .bind(user.stats.words_count as i32)
        .bind(user.stats.current_streak as i32)
        .bind(&user.badges)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn get_user(&mut self, id: Uuid) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn get_user_by_username(&mut self, username: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn patch_user_profile(&mut self, id: Uuid, patch: ProfilePatch) -> PortResult<()> {
        sqlx::query(
            "UPDATE users SET \
             bio = COALESCE($2, bio), \
             avatar_url = COALESCE($3, avatar_url), \
             dark_mode = COALESCE($4, dark_mode), \
             dyslexia_font = COALESCE($5, dyslexia_font), \
             public_profile = COALESCE($6, public_profile) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.bio)
        .bind(patch.avatar_url)
        .bind(patch.settings.map(|s| s.dark_mode))
        .bind(patch.settings.map(|s| s.dyslexia_font))
        .bind(patch.settings.map(|s| s.public_profile))
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn set_user_stats(&mut self, id: Uuid, stats: UserStats) -> PortResult<()> {
        sqlx::query(
            "UPDATE users SET books_count = $2, words_count = $3, current_streak = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(stats.books_count as i32)
        .bind(stats.words_count as i32)
        .bind(stats.current_streak as i32)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    // --- Books ---

    async fn insert_book(&mut self, book: NewBook) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO books (id, catalog_key, title, author, cover_url, isbn, \
             first_publish_year, readers_count, words_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, $8)",
        )
        .bind(id)
        .bind(&book.catalog_key)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.cover_url)
        .bind(&book.isbn)
        .bind(book.first_publish_year)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn get_book(&mut self, id: Uuid) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(BookRecord::to_domain))
    }

    async fn find_book_by_catalog_key(&mut self, key: &str) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE catalog_key = $1"
        ))
        .bind(key)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(BookRecord::to_domain))
    }

    async fn set_book_stats(&mut self, id: Uuid, stats: BookStats) -> PortResult<()> {
        sqlx::query("UPDATE books SET readers_count = $2, words_count = $3 WHERE id = $1")
            .bind(id)
            .bind(stats.readers_count as i32)
            .bind(stats.words_count as i32)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_recent_books(&mut self, limit: usize) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(BookRecord::to_domain).collect())
    }

    // --- Library entries ---

    async fn insert_entry(&mut self, entry: NewEntry) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO library_entries (id, user_id, book_id, status, notes, words_count, \
             started_at, finished_at, created_at) \
             VALUES ($1, $2, $3, $4, NULL, 0, $5, NULL, $6)",
        )
        .bind(id)
        .bind(entry.user_id)
        .bind(entry.book_id)
        .bind(entry.status.as_str())
        .bind(entry.started_at)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::DuplicateEntry
            } else {
                unexpected(e)
            }
        })?;
        Ok(id)
    }

    async fn get_entry(&mut self, id: Uuid) -> PortResult<Option<LibraryEntry>> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM library_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        record.map(EntryRecord::to_domain).transpose()
    }

    async fn find_entry_for_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<LibraryEntry>> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM library_entries WHERE user_id = $1 AND book_id = $2"
        ))
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        record.map(EntryRecord::to_domain).transpose()
    }

    async fn list_entries_for_user(
        &mut self,
        user_id: Uuid,
        status: Option<ReadingStatus>,
    ) -> PortResult<Vec<LibraryEntry>> {
        // Status filtering rides the compound (user_id, status) index.
        let records = match status {
            Some(status) => {
                sqlx::query_as::<_, EntryRecord>(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM library_entries \
                     WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .bind(status.as_str())
                .fetch_all(&mut *self.tx)
                .await
            }
            None => {
                sqlx::query_as::<_, EntryRecord>(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM library_entries \
                     WHERE user_id = $1 ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(&mut *self.tx)
                .await
            }
        }
        .map_err(unexpected)?;
        records.into_iter().map(EntryRecord::to_domain).collect()
    }

    async fn list_entries_for_book(&mut self, book_id: Uuid) -> PortResult<Vec<LibraryEntry>> {
        let records = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM library_entries \
             WHERE book_id = $1 ORDER BY created_at DESC"
        ))
        .bind(book_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(EntryRecord::to_domain).collect()
    }

    async fn update_entry(&mut self, entry: &LibraryEntry) -> PortResult<()> {
        sqlx::query(
            "UPDATE library_entries SET status = $2, notes = $3, words_count = $4, \
             started_at = $5, finished_at = $6 WHERE id = $1",
        )
        .bind(entry.id)
        .bind(entry.status.as_str())
        .bind(&entry.notes)
        .bind(entry.words_count as i32)
        .bind(entry.started_at)
        .bind(entry.finished_at)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_entry(&mut self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM library_entries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Words ---

    async fn insert_word(&mut self, word: NewWord) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO words (id, user_id, entry_id, book_id, word, definition, context, \
             page_number, notes, likes_count, is_public, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, $11)",
        )
        .bind(id)
        .bind(word.user_id)
        .bind(word.entry_id)
        .bind(word.book_id)
        .bind(&word.word)
        .bind(&word.definition)
        .bind(&word.context)
        .bind(word.page_number.map(|p| p as i32))
        .bind(&word.notes)
        .bind(word.is_public)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn get_word(&mut self, id: Uuid) -> PortResult<Option<Word>> {
        let record = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(WordRecord::to_domain))
    }

    async fn update_word(&mut self, word: &Word) -> PortResult<()> {
        sqlx::query(
            "UPDATE words SET definition = $2, context = $3, page_number = $4, notes = $5, \
             likes_count = $6, is_public = $7 WHERE id = $1",
        )
        .bind(word.id)
        .bind(&word.definition)
        .bind(&word.context)
        .bind(word.page_number.map(|p| p as i32))
        .bind(&word.notes)
        .bind(word.likes_count as i32)
        .bind(word.is_public)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_word(&mut self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_words_for_entry(
        &mut self,
        entry_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<Word>> {
        // LIMIT NULL means "no limit" in Postgres, which covers the
        // uncapped cascade enumeration.
        let records = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE entry_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(entry_id)
        .bind(limit.map(|l| l as i64))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(WordRecord::to_domain).collect())
    }

    async fn list_words_for_user(&mut self, user_id: Uuid, limit: usize) -> PortResult<Vec<Word>> {
        let records = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(WordRecord::to_domain).collect())
    }

    async fn list_public_words_for_book(
        &mut self,
        book_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Word>> {
        let records = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE book_id = $1 AND is_public = TRUE \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(book_id)
        .bind(limit as i64)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(WordRecord::to_domain).collect())
    }

    // --- Likes ---

    async fn insert_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO word_likes (id, user_id, word_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(user_id)
        .bind(word_id)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn find_like(&mut self, user_id: Uuid, word_id: Uuid) -> PortResult<Option<Like>> {
        let record = sqlx::query_as::<_, LikeRecord>(
            "SELECT id, user_id, word_id, created_at FROM word_likes \
             WHERE user_id = $1 AND word_id = $2",
        )
        .bind(user_id)
        .bind(word_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(LikeRecord::to_domain))
    }

    async fn delete_like(&mut self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM word_likes WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_likes_for_word(&mut self, word_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM word_likes WHERE word_id = $1")
            .bind(word_id)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Credentials & auth sessions ---

    async fn insert_credentials(&mut self, credentials: Credentials) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_credentials (user_id, email, password_hash) VALUES ($1, $2, $3)",
        )
        .bind(credentials.user_id)
        .bind(&credentials.email)
        .bind(&credentials.password_hash)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Validation("An account with this email already exists".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(())
    }

    async fn find_credentials_by_email(
        &mut self,
        email: &str,
    ) -> PortResult<Option<Credentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, password_hash FROM user_credentials WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| Credentials {
            user_id: r.user_id,
            email: r.email,
            password_hash: r.password_hash,
        }))
    }

    async fn insert_auth_session(&mut self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_auth_session(&mut self, id: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| AuthSession {
            id: r.id,
            user_id: r.user_id,
            expires_at: r.expires_at,
        }))
    }

    async fn delete_auth_session(&mut self, id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        self.tx.commit().await.map_err(unexpected)
    }
}
