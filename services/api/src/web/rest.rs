//! services/api/src/web/rest.rs
//!
//! Master definition for the OpenAPI specification. Only the core
//! mutating endpoints and auth flow are documented here; the read-side
//! endpoints return plain domain JSON.

use utoipa::OpenApi;

use crate::web::{auth, books, library, words};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        library::add_entry_handler,
        words::add_word_handler,
        words::toggle_like_handler,
        books::search_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            library::AddLibraryEntryRequest,
            library::CreatedResponse,
            words::AddWordBody,
        )
    ),
    tags(
        (name = "Wordshelf API", description = "API endpoints for the reading & vocabulary tracker.")
    )
)]
pub struct ApiDoc;
