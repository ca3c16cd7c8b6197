mod auth;
mod redirect;

pub use auth::TOKEN_CACHE_FILE;
pub use auth::TokenManager;
pub use redirect::FIRST_RUN_FILE;
pub use redirect::LAST_CALLBACK_FILE;
pub use redirect::RedirectStateStore;
