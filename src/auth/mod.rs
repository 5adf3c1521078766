//! Access tokens for the travel data provider
//!
//! A [`TokenScope`] belongs to exactly one search run: the first provider
//! call of the run acquires the token, every later call reuses it, and the
//! token is dropped together with the run.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::Result;

pub mod client_credentials;

pub use client_credentials::ClientCredentialsIssuer;

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// Raw token for the `Authorization` header
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Something that can hand out fresh access tokens
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn acquire_token(&self) -> Result<AccessToken>;
}

/// Lazily acquired token shared by all provider calls of one run
pub struct TokenScope<'a, I: TokenIssuer + ?Sized> {
    issuer: &'a I,
    token: OnceCell<AccessToken>,
}

impl<'a, I: TokenIssuer + ?Sized> TokenScope<'a, I> {
    pub fn new(issuer: &'a I) -> Self {
        Self {
            issuer,
            token: OnceCell::new(),
        }
    }

    /// The run's token, acquired on first use.
    ///
    /// Concurrent first callers wait for the same acquisition. A failed
    /// acquisition is not stored.
    pub async fn token(&self) -> Result<&AccessToken> {
        self.token
            .get_or_try_init(|| async {
                debug!("Acquiring access token for this run");
                self.issuer.acquire_token().await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GetawayError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingIssuer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TokenIssuer for CountingIssuer {
        async fn acquire_token(&self) -> Result<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(GetawayError::credential("rejected"))
            } else {
                Ok(AccessToken::new("token-1"))
            }
        }
    }

    #[tokio::test]
    async fn test_token_is_acquired_once_per_scope() {
        let issuer = CountingIssuer {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let scope = TokenScope::new(&issuer);

        let tokens = futures::future::join_all((0..5).map(|_| scope.token())).await;
        assert!(tokens.iter().all(|t| t.as_ref().unwrap().secret() == "token-1"));
        assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);

        // a new run gets a new token
        let second = TokenScope::new(&issuer);
        second.token().await.unwrap();
        assert_eq!(issuer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_acquisition_is_reported() {
        let issuer = CountingIssuer {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let scope = TokenScope::new(&issuer);
        let result = scope.token().await;
        assert!(matches!(result, Err(GetawayError::Credential { .. })));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
