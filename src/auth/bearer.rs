//! Bearer-token authentication stage with a lazily-refreshed token cache.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use tokio::sync::Mutex;

use super::{AccessToken, TokenCredential};
use crate::context::Context;
use crate::error::ClientError;
use crate::http::{Request, Response};
use crate::pipeline::{Next, Policy};

/// Refresh this many seconds before the recorded expiry so a token never
/// goes stale mid-request.
const EXPIRY_SAFETY_WINDOW: i64 = 120;

/// Attaches `authorization: Bearer <token>` to every outgoing request,
/// fetching a token only when the cached one is missing or expiring.
///
/// One instance may be shared by concurrent calls on the same credential
/// scope. The check-expiry/refresh/read sequence is a single critical
/// section: the cache mutex is held across the credential fetch, so
/// concurrent callers serialize on refresh, at most one fetch is in flight
/// at a time, and every caller reads a token that was valid at read time.
pub struct BearerTokenPolicy {
    credential: Arc<dyn TokenCredential>,
    scopes: Vec<String>,
    cache: Mutex<Option<AccessToken>>,
}

impl BearerTokenPolicy {
    pub fn new(credential: Arc<dyn TokenCredential>, scopes: impl Into<Vec<String>>) -> Self {
        Self {
            credential,
            scopes: scopes.into(),
            cache: Mutex::new(None),
        }
    }

    async fn authorization_value(&self, ctx: &Context) -> Result<HeaderValue, ClientError> {
        let now = Utc::now();
        let mut cache = self.cache.lock().await;
        let expiring = match cache.as_ref() {
            Some(token) => token.expires_on() - chrono::Duration::seconds(EXPIRY_SAFETY_WINDOW) <= now,
            None => true,
        };
        if expiring {
            let fresh = self.credential.get_token(ctx, &self.scopes).await?;
            tracing::debug!(expires_on = %fresh.expires_on(), "refreshed bearer token");
            *cache = Some(fresh);
        }
        let token = cache
            .as_ref()
            .ok_or_else(|| ClientError::Internal("token cache empty after refresh".into()))?;
        let value = format!("Bearer {}", token.secret().expose_secret());
        HeaderValue::from_str(&value)
            .map_err(|e| ClientError::Credential(format!("token is not a valid header value: {e}")))
    }
}

#[async_trait]
impl Policy for BearerTokenPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, ClientError> {
        // A credential failure fails the call here: no partial header is
        // attached and the rest of the chain never runs.
        let value = self.authorization_value(ctx).await?;
        request.headers_mut().insert(AUTHORIZATION, value);
        next.run(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCredential {
        fetches: AtomicUsize,
        lifetime: chrono::Duration,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(
            &self,
            _ctx: &Context,
            _scopes: &[String],
        ) -> Result<AccessToken, ClientError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("tok-{n}"), Utc::now() + self.lifetime))
        }
    }

    #[tokio::test]
    async fn token_is_cached_until_expiry_window() {
        let credential = Arc::new(CountingCredential {
            fetches: AtomicUsize::new(0),
            lifetime: chrono::Duration::hours(1),
        });
        let policy = BearerTokenPolicy::new(credential.clone(), vec!["store/.default".into()]);
        let ctx = Context::background();

        let first = policy.authorization_value(&ctx).await.unwrap();
        let second = policy.authorization_value(&ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(credential.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed() {
        // Lifetime shorter than the safety window forces a refresh per call.
        let credential = Arc::new(CountingCredential {
            fetches: AtomicUsize::new(0),
            lifetime: chrono::Duration::seconds(30),
        });
        let policy = BearerTokenPolicy::new(credential.clone(), vec!["store/.default".into()]);
        let ctx = Context::background();

        let first = policy.authorization_value(&ctx).await.unwrap();
        let second = policy.authorization_value(&ctx).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(credential.fetches.load(Ordering::SeqCst), 2);
    }
}
