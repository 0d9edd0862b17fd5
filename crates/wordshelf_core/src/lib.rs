pub mod cascade;
pub mod counters;
pub mod domain;
pub mod gate;
pub mod identity;
pub mod memory;
pub mod ports;
pub mod service;

pub use domain::{
    AddBookRequest, AddWordRequest, AuthSession, Book, BookReader, BookStats, CandidateBook,
    Credentials, EntryWithBook, Like, LibraryEntry, LikeToggle, NewBook, NewEntry, NewUser,
    NewWord, ProfilePatch, PublicProfile, ReadingStatus, User, UserSettings, UserStats, Word,
    WordPatch, WordWithBook,
};
pub use identity::IdentityService;
pub use memory::MemoryStore;
pub use ports::{BookSearchService, PortError, PortResult, Store, StoreTx};
pub use service::LibraryService;
