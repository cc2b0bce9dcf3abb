use std::sync::Arc;
#[cfg(any(test, feature = "test-util"))]
use std::sync::Mutex;
#[cfg(any(test, feature = "test-util"))]
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Message handed to the email transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEmail {
    /// Magic-link login; `token` is an email-verification token
    LoginLink { email: String, token: String },

    /// Code that binds `phone_number` to the account behind `email`
    PhoneVerificationCode {
        email: String,
        phone_number: String,
        code: String,
    },
}

impl OutboundEmail {
    pub fn recipient(&self) -> &str {
        match self {
            OutboundEmail::LoginLink { email, .. } => email,
            OutboundEmail::PhoneVerificationCode { email, .. } => email,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            OutboundEmail::LoginLink { .. } => "login_link",
            OutboundEmail::PhoneVerificationCode { .. } => "phone_verification_code",
        }
    }
}

#[derive(Debug, Error)]
pub enum EmailDispatchError {
    #[error("Email transport rejected message to {recipient}: {reason}")]
    Rejected { recipient: String, reason: String },

    #[error("Email transport unavailable: {0}")]
    Unavailable(String),
}

/// Delivery seam for outbound email
///
/// Transport (SMTP, templating) lives behind this trait and outside this crate.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailDispatchError>;
}

/// Hand an email to the dispatcher on a background task
///
/// Failures are logged and never reach the caller.
pub fn dispatch_in_background(
    dispatcher: Arc<dyn EmailDispatcher>,
    email: OutboundEmail,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match dispatcher.deliver(&email).await {
            Ok(()) => {
                tracing::debug!(kind = email.kind(), recipient = email.recipient(), "Email dispatched");
            }
            Err(e) => {
                tracing::error!(kind = email.kind(), "Email dispatch failed: {}", e);
            }
        }
    })
}

/// Dispatcher that only logs; used when no transport is configured
pub struct LogOnlyEmailDispatcher;

#[async_trait]
impl EmailDispatcher for LogOnlyEmailDispatcher {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailDispatchError> {
        tracing::info!(kind = email.kind(), recipient = email.recipient(), "Outbound email (not sent)");
        Ok(())
    }
}

/// Dispatcher that records every message, optionally failing each delivery
///
/// Test double, available to dependents through the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub struct RecordingEmailDispatcher {
    sent: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingEmailDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Record each message, then report a transport failure
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Wait (up to about a second) until at least `count` messages were handed over
    pub async fn wait_for_deliveries(&self, count: usize) -> Vec<OutboundEmail> {
        for _ in 0..200 {
            if self.sent().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }

    /// Most recent phone verification code sent to `phone_number`
    pub fn last_code_for(&self, phone_number: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|email| match email {
            OutboundEmail::PhoneVerificationCode {
                phone_number: phone,
                code,
                ..
            } if phone == phone_number => Some(code),
            _ => None,
        })
    }

    /// Most recent login-link token sent to `address`
    pub fn last_login_token_for(&self, address: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|email| match email {
            OutboundEmail::LoginLink { email, token } if email == address => Some(token),
            _ => None,
        })
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for RecordingEmailDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl EmailDispatcher for RecordingEmailDispatcher {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), EmailDispatchError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }

        if self.fail {
            return Err(EmailDispatchError::Unavailable("recording dispatcher set to fail".to_string()));
        }
        Ok(())
    }
}
