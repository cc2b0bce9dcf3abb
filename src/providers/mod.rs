// Providers layer - Work performers and business logic
//
// Providers compose store operations into the identity and token workflows
// that coordinators orchestrate.

pub mod clock_provider;
pub mod crypto_provider;
pub mod email_provider;
pub mod identity_provider;
pub mod token_codec;
pub mod token_provider;

pub use clock_provider::{ClockProvider, SystemClock};
pub use crypto_provider::CryptoProvider;
pub use email_provider::{
    EmailDispatchError, EmailDispatcher, LogOnlyEmailDispatcher, OutboundEmail,
    dispatch_in_background,
};

// Test doubles for integration tests and downstream crates
#[cfg(any(test, feature = "test-util"))]
pub use clock_provider::ManualClock;
#[cfg(any(test, feature = "test-util"))]
pub use email_provider::RecordingEmailDispatcher;
pub use identity_provider::{IdentityProvider, LinkedIdentity};
pub use token_codec::TokenCodec;
pub use token_provider::TokenProvider;
