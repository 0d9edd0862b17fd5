//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use wordshelf_core::ports::BookSearchService;
use wordshelf_core::{IdentityService, LibraryService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub library: LibraryService,
    pub identity: IdentityService,
    pub search: Arc<dyn BookSearchService>,
    pub config: Arc<Config>,
}
