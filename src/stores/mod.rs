// Stores layer - Data access; every operation takes the connection or transaction to run on
pub mod phone_binding_store;
pub mod revocation_store;
pub mod social_account_store;
pub mod user_store;
pub mod verification_code_store;

pub use phone_binding_store::PhoneBindingStore;
pub use revocation_store::RevocationStore;
pub use social_account_store::SocialAccountStore;
pub use user_store::UserStore;
pub use verification_code_store::VerificationCodeStore;
