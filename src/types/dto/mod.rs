// Data transfer objects returned to callers
pub mod auth;

pub use auth::{PhoneCodeSent, TokenPair, UserProfile};
