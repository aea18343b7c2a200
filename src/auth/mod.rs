//! Credentials and the bearer-token pipeline stage.

mod bearer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::context::Context;
use crate::error::ClientError;

pub use bearer::BearerTokenPolicy;

/// A bearer token together with its absolute expiry.
pub struct AccessToken {
    token: SecretString,
    expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_on,
        }
    }

    pub fn secret(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_on", &self.expires_on)
            .finish_non_exhaustive()
    }
}

/// External credential provider the bearer-token policy delegates to.
///
/// Invoked with the same cancellation context as the outer call; a fetch
/// must not outlive the operation that triggered it.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, ctx: &Context, scopes: &[String])
    -> Result<AccessToken, ClientError>;
}
