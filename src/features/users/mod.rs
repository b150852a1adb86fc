//! User accounts, as far as this service needs them.
//!
//! Users are read-only here: the user auth middleware resolves the subject of a
//! verified token to an active account before write operations run.

pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use middleware::user_auth_middleware;
pub use repositories::PgUserRepository;
pub use services::UserService;
