//! Buffered non-blocking TCP connections, driven by a mio readiness loop.
//!
//! A [`Poller`] reports readiness for a list of [`PollEntry`] values, a [`Listener`] accepts raw
//! streams, and a [`BufferedConnection`] turns readiness into `recv`/`send` calls on top of two
//! [`ChunkQueue`]s.

mod buffered;
mod listener;
mod poller;
mod queue;
mod registry;

use std::io::ErrorKind;

pub use mio::{net::TcpStream, Interest, Token, Waker};

pub use self::{
    buffered::{BufferedConnection, TransportError, DEFAULT_CHUNK_SIZE},
    listener::Listener,
    poller::{PollEntry, Poller, Ready},
    queue::ChunkQueue,
    registry::Registry,
};

fn check_io<T>(value: Result<T, std::io::Error>) -> Result<Option<T>, std::io::Error> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            // WouldBlock just means we've run out of things to handle
            if error.kind() == ErrorKind::WouldBlock {
                Ok(None)
            } else {
                Err(error)
            }
        }
    }
}
