//! Cancellation context threaded through every pipeline call.
//!
//! A [`Context`] is an immutable snapshot of "this operation's deadline and
//! cancellation signal" plus a small key/value extension bag. It is created
//! once at the top of an operation, passed by reference down the call chain,
//! and never stored beyond the call. Derived contexts may narrow a deadline
//! but never widen it, and inherit the parent's cancellation one-directionally.
//!
//! Every suspension point in the crate (transport I/O, credential fetches,
//! body reads, retry sleeps) goes through [`Context::run`] or
//! [`Context::sleep`], so no call blocks past its deadline.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

struct ValueNode {
    key: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<ValueNode>>,
}

/// Propagable cancellation/deadline handle.
///
/// Cloning is cheap; clones share the same cancellation signal. Use
/// [`Context::child`] and the `with_*` constructors to derive narrowed
/// contexts instead.
#[derive(Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<DateTime<Utc>>,
    values: Option<Arc<ValueNode>>,
}

impl Context {
    /// Root context with no deadline and no cancellation signal.
    ///
    /// Permitted only at a program's true root; everything below derives
    /// from an existing context.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            values: None,
        }
    }

    /// Derive a child context. Cancelling the parent cancels the child;
    /// cancelling the child leaves the parent untouched.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            values: self.values.clone(),
        }
    }

    /// Derive a child whose deadline is `min(parent deadline, deadline)`.
    pub fn with_deadline(&self, deadline: DateTime<Utc>) -> Self {
        let mut ctx = self.child();
        ctx.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        ctx
    }

    /// Derive a child that expires `timeout` from now (narrowing only).
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta));
        match deadline {
            Some(deadline) => self.with_deadline(deadline),
            // A timeout too large to represent adds no bound.
            None => self.child(),
        }
    }

    /// Derive a child carrying `value` under `key` in the extension bag.
    pub fn with_value<V: Any + Send + Sync>(&self, key: &'static str, value: V) -> Self {
        let mut ctx = self.child();
        ctx.values = Some(Arc::new(ValueNode {
            key,
            value: Arc::new(value),
            parent: self.values.clone(),
        }));
        ctx
    }

    /// Look up a value by key, walking up through ancestor contexts.
    pub fn value<V: Any + Send + Sync>(&self, key: &'static str) -> Option<&V> {
        let mut node = self.values.as_deref();
        while let Some(n) = node {
            if n.key == key {
                return n.value.downcast_ref::<V>();
            }
            node = n.parent.as_deref();
        }
        None
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Fire the cancellation signal for this context and its descendants.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the signal fired or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Utc::now() >= deadline)
    }

    /// Fail fast with [`ClientError::Cancelled`] if the context is done.
    pub fn check(&self) -> Result<(), ClientError> {
        if self.is_cancelled() {
            Err(ClientError::Cancelled(self.reason()))
        } else {
            Ok(())
        }
    }

    /// Resolves once the signal fires or the deadline passes. Pending
    /// forever on a background context.
    pub async fn cancelled(&self) {
        match self.remaining() {
            Some(remaining) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep(remaining) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Race `fut` against this context. The future's own error passes
    /// through unchanged; cancellation wins with [`ClientError::Cancelled`].
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.check()?;
        tokio::select! {
            _ = self.cancelled() => Err(ClientError::Cancelled(self.reason())),
            out = fut => out,
        }
    }

    /// Sleep for `delay`, aborting early if the context is done.
    pub async fn sleep(&self, delay: Duration) -> Result<(), ClientError> {
        self.run(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }

    fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }

    fn reason(&self) -> String {
        if self.token.is_cancelled() {
            "context cancelled".to_string()
        } else {
            "deadline exceeded".to_string()
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.token.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
