use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{Context as _, Error};
use mio::{event::Source, Interest, Token};
use tracing::{event, Level};

/// Shared mio registration handle.
///
/// Sources register through this to receive readiness in the owning [`Poller`](crate::Poller).
/// Clones share the token counter, so tokens are unique per poller.
pub struct Registry {
    inner: mio::Registry,
    next_token: Arc<AtomicUsize>,
}

impl Registry {
    pub(crate) fn new(inner: mio::Registry, next_token: Arc<AtomicUsize>) -> Self {
        Self { inner, next_token }
    }

    /// Create a new unique token for this registry.
    pub fn token(&self) -> Token {
        let index = self.next_token.fetch_add(1, Ordering::SeqCst);
        Token(index)
    }

    /// Register a source with a freshly allocated token.
    pub fn register<S>(&self, source: &mut S, interest: Interest) -> Result<Token, Error>
    where
        S: Source + ?Sized,
    {
        let token = self.token();
        event!(Level::TRACE, ?token, "registering source");

        self.inner
            .register(source, token, interest)
            .context("failed to register source")?;

        Ok(token)
    }

    pub fn reregister<S>(&self, source: &mut S, token: Token, interest: Interest) -> Result<(), Error>
    where
        S: Source + ?Sized,
    {
        self.inner
            .reregister(source, token, interest)
            .context("failed to reregister source")?;
        Ok(())
    }

    pub fn deregister<S>(&self, source: &mut S) -> Result<(), Error>
    where
        S: Source + ?Sized,
    {
        self.inner
            .deregister(source)
            .context("failed to deregister source")?;
        Ok(())
    }

    pub fn try_clone(&self) -> Result<Self, Error> {
        let inner = self.inner.try_clone()?;
        Ok(Self::new(inner, self.next_token.clone()))
    }
}
