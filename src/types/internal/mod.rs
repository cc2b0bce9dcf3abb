// Internal types - not exposed outside the service layer
pub mod claims;
pub mod identity;
pub mod token;

pub use claims::{
    AccessClaims, Claims, ClaimsHeader, CustomClaims, EmailVerificationClaims,
    PhoneVerificationClaims, RefreshClaims,
};
pub use identity::{ProviderProfile, normalize_email};
pub use token::{NewRevocation, RevocationReason, TokenPurpose, TokenType};
