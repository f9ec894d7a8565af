/// Authentication module
///
/// Access-token generation/validation, password hashing, the refresh token
/// codec, and the rotating session state machine.

mod claims;
mod context;
mod jwt;
mod password;
mod refresh_token;
mod session;
mod session_store;

pub use claims::Claims;
pub use context::require_identity;
pub use context::AuthContext;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::digest_refresh_token;
pub use refresh_token::generate_refresh_token;
pub use session::NewSession;
pub use session::RotatedSession;
pub use session::SessionManager;
pub use session::SessionRow;
pub use session::SessionStore;
pub use session_store::PgSessionStore;
