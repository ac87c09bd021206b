use std::{
    collections::HashMap,
    io::ErrorKind,
    sync::{atomic::AtomicUsize, Arc},
    time::Duration,
};

use anyhow::{Context as _, Error};
use mio::{Events, Interest, Poll, Token, Waker};
use tracing::{event, instrument, Level};

use crate::Registry;

/// Token reserved for the poller's waker.
const WAKE_TOKEN: Token = Token(usize::MAX);

/// Observed readiness of a single handle.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    pub readable: bool,
    pub writable: bool,
    pub error: bool,
}

impl Ready {
    pub fn is_empty(&self) -> bool {
        !(self.readable || self.writable || self.error)
    }
}

/// One entry of a readiness query.
///
/// Callers build a list of entries, hand it to [`Poller::wait`], and read back `ready`.
#[derive(Debug, Clone, Copy)]
pub struct PollEntry {
    pub token: Token,
    pub interest: Interest,
    pub ready: Ready,
}

impl PollEntry {
    pub fn new(token: Token, interest: Interest) -> Self {
        Self {
            token,
            interest,
            ready: Ready::default(),
        }
    }
}

/// Readiness multiplexer over a mio `Poll`.
pub struct Poller {
    poll: Poll,
    events: Events,
    next_token: Arc<AtomicUsize>,
}

impl Poller {
    pub fn new(events_capacity: usize) -> Result<Self, Error> {
        let poll = Poll::new().context("failed to create poll instance")?;

        Ok(Self {
            poll,
            events: Events::with_capacity(events_capacity),
            next_token: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get a registry handle for registering sources with this poller.
    pub fn registry(&self) -> Result<Registry, Error> {
        let inner = self
            .poll
            .registry()
            .try_clone()
            .context("failed to clone registry")?;

        Ok(Registry::new(inner, self.next_token.clone()))
    }

    /// Create the waker of this poller, which can interrupt `wait` from any thread.
    ///
    /// Only one waker may exist per poller.
    pub fn waker(&self) -> Result<Waker, Error> {
        let waker = Waker::new(self.poll.registry(), WAKE_TOKEN).context("failed to create waker")?;
        Ok(waker)
    }

    /// Block until any entry is ready, the waker fires, or `timeout` elapses.
    ///
    /// All `ready` flags are reset before waiting. Returns true if the waker fired.
    #[instrument("Poller::wait", level = "trace", skip_all)]
    pub fn wait(
        &mut self,
        entries: &mut [PollEntry],
        timeout: Option<Duration>,
    ) -> Result<bool, Error> {
        for entry in entries.iter_mut() {
            entry.ready = Ready::default();
        }

        if let Err(error) = self.poll.poll(&mut self.events, timeout) {
            // A signal interrupted the wait, report back as a wake without events
            if error.kind() == ErrorKind::Interrupted {
                return Ok(false);
            }

            return Err(Error::new(error).context("failed to poll"));
        }

        let lookup: HashMap<Token, usize> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.token, index))
            .collect();

        let mut woken = false;
        for event in self.events.iter() {
            if event.token() == WAKE_TOKEN {
                woken = true;
                continue;
            }

            let Some(index) = lookup.get(&event.token()) else {
                event!(Level::TRACE, token = ?event.token(), "event for unknown token");
                continue;
            };

            let entry = &mut entries[*index];
            let readable = event.is_readable() || event.is_read_closed();
            let writable = event.is_writable() || event.is_write_closed();

            entry.ready.readable |= readable && entry.interest.is_readable();
            entry.ready.writable |= writable && entry.interest.is_writable();
            entry.ready.error |= event.is_error();
        }

        Ok(woken)
    }
}
