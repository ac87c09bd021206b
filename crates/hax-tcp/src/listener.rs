use std::net::SocketAddr;

use anyhow::{Context as _, Error};
use mio::{net::TcpStream, Interest, Token};
use tracing::{event, instrument, Level};

use crate::{check_io, PollEntry, Registry};

/// Listening TCP socket, registered for readable readiness.
///
/// TCP, unlike UDP, works with ongoing connections.
/// Before a connection is established, you first need to 'listen' for those on a port.
pub struct Listener {
    listener: mio::net::TcpListener,
    token: Token,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind a listening socket on the given address.
    #[instrument("Listener::bind", skip_all)]
    pub fn bind(registry: &Registry, addr: SocketAddr) -> Result<Self, Error> {
        event!(Level::DEBUG, ?addr, "binding");

        // Create the socket
        let mut listener = mio::net::TcpListener::bind(addr)
            .with_context(|| format!("failed to bind listener on {}", addr))?;
        let local_addr = listener.local_addr()?;

        // Register the socket for ready events
        let token = registry.register(&mut listener, Interest::READABLE)?;

        Ok(Self {
            listener,
            token,
            local_addr,
        })
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Readiness query entry for this listener.
    pub fn poll_entry(&self) -> PollEntry {
        PollEntry::new(self.token, Interest::READABLE)
    }

    /// Accept one pending raw stream, if any.
    pub fn accept(&mut self) -> Result<Option<(TcpStream, SocketAddr)>, Error> {
        let result = check_io(self.listener.accept()).context("failed to accept stream")?;

        if let Some((_, remote_addr)) = &result {
            event!(Level::DEBUG, ?remote_addr, "stream accepted");
        }

        Ok(result)
    }

    /// Stop receiving readiness for this listener.
    pub fn deregister(&mut self, registry: &Registry) {
        if let Err(error) = registry.deregister(&mut self.listener) {
            event!(Level::WARN, ?error, "failed to deregister listener");
        }
    }

    /// Deregister and close the listening socket.
    pub fn close(mut self, registry: &Registry) {
        event!(Level::DEBUG, addr = ?self.local_addr, "closing listener");
        self.deregister(registry);
    }
}
