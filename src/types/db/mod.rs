// Database entities - SeaORM models
pub mod phone_binding;
pub mod revocation_entry;
pub mod social_account;
pub mod user;
pub mod verification_code;

pub use social_account::AuthProvider;
pub use user::UserRole;
