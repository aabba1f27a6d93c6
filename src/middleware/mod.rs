pub mod auth;
pub mod signed;

pub use auth::{require_auth, RequireAuth};
pub use signed::{signed, ValidateSignature};
