pub mod manager;
pub mod query_base;
pub mod settings;
pub mod tokens;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use query_base::{PgQueryBase, QueryBase};
pub use settings::{PgSettingsStore, SettingsStore};
pub use tokens::{PgTokenStore, TokenStore};
pub use users::{PgUserStore, UserRecord, UserStore};
