use std::{
    io::{ErrorKind, Read, Write},
    net::SocketAddr,
};

use anyhow::{Context as _, Error};
use bytes::Bytes;
use mio::{event::Source, net::TcpStream, Interest, Token};
use thiserror::Error;
use tracing::{event, Level};

use crate::{ChunkQueue, PollEntry, Ready, Registry};

/// Default size of a single receive chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Failure of the underlying transport.
///
/// Any of these means the connection should be closed and discarded, there's no retry.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The stream accepted zero bytes on send.
    #[error("connection closed by peer")]
    Closed,
    #[error("transport i/o failed")]
    Io(#[from] std::io::Error),
}

/// Stream with inbound and outbound chunk queues.
///
/// Reads are all-or-nothing against already buffered data, writes are queued immediately and put
/// on the wire by [`pump`](Self::pump) once the stream reports writable.
pub struct BufferedConnection<S> {
    stream: S,
    token: Token,
    inbound: ChunkQueue,
    outbound: ChunkQueue,
    scratch: Vec<u8>,
    registered: Interest,
    read_closed: bool,
}

impl<S> BufferedConnection<S> {
    /// Wrap an already registered stream.
    pub fn new(stream: S, token: Token, chunk_size: usize) -> Self {
        Self {
            stream,
            token,
            inbound: ChunkQueue::new(),
            outbound: ChunkQueue::new(),
            scratch: vec![0; chunk_size.max(1)],
            registered: Interest::READABLE,
            read_closed: false,
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Bytes received but not yet read.
    pub fn available_bytes(&self) -> usize {
        self.inbound.len()
    }

    /// Bytes written but not yet sent.
    pub fn queued_bytes(&self) -> usize {
        self.outbound.len()
    }

    /// If the peer has closed its sending side, no more inbound data will arrive.
    ///
    /// Data received before the close stays buffered and can still be read.
    pub fn is_read_closed(&self) -> bool {
        self.read_closed
    }

    /// Events this connection currently wants.
    ///
    /// Readable always, writable only while there's outbound data queued.
    pub fn interest(&self) -> Interest {
        if self.outbound.is_empty() {
            Interest::READABLE
        } else {
            Interest::READABLE | Interest::WRITABLE
        }
    }

    /// Readiness query entry for this connection.
    pub fn poll_entry(&self) -> PollEntry {
        PollEntry::new(self.token, self.interest())
    }

    /// Read exactly `count` bytes, or nothing if fewer are buffered.
    pub fn read(&mut self, count: usize) -> Option<Bytes> {
        self.inbound.take(count)
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_byte()
    }

    /// Queue data to be sent.
    pub fn write(&mut self, data: impl Into<Bytes>) {
        self.outbound.push(data.into());
    }

    /// Discard the connection, unsent outbound data is dropped.
    pub fn into_inner(self) -> S {
        if !self.outbound.is_empty() {
            event!(
                Level::DEBUG,
                token = ?self.token,
                bytes = self.outbound.len(),
                "dropping unsent data"
            );
        }

        self.stream
    }
}

impl<S> BufferedConnection<S>
where
    S: Read + Write,
{
    /// Perform the I/O that `ready` allows.
    ///
    /// Readable drains the stream into the inbound queue, one chunk per `recv`, until it would
    /// block or the peer closes. A peer close is not an error, it's reported by
    /// [`is_read_closed`](Self::is_read_closed) so the data before it can still be processed.
    /// Writable sends from the outbound queue until it's empty or the stream would block.
    pub fn pump(&mut self, ready: Ready) -> Result<(), TransportError> {
        if ready.readable && !self.read_closed {
            self.recv_all()?;
        }

        if ready.writable {
            self.send_all()?;
        }

        Ok(())
    }

    fn recv_all(&mut self) -> Result<(), TransportError> {
        loop {
            match self.stream.read(&mut self.scratch) {
                // Read of zero means the peer won't send anything more
                Ok(0) => {
                    event!(Level::DEBUG, token = ?self.token, "peer closed");
                    self.read_closed = true;
                    return Ok(());
                }
                Ok(len) => {
                    event!(Level::TRACE, token = ?self.token, len, "received data");
                    let chunk = Bytes::copy_from_slice(&self.scratch[..len]);
                    self.inbound.push(chunk);
                }
                Err(error) => match error.kind() {
                    ErrorKind::WouldBlock => return Ok(()),
                    ErrorKind::Interrupted => continue,
                    _ => return Err(error.into()),
                },
            }
        }
    }

    fn send_all(&mut self) -> Result<(), TransportError> {
        while let Some(data) = self.outbound.front() {
            match self.stream.write(data) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(len) => {
                    event!(Level::TRACE, token = ?self.token, len, "sent data");
                    self.outbound.advance(len);
                }
                Err(error) => match error.kind() {
                    ErrorKind::WouldBlock => return Ok(()),
                    ErrorKind::Interrupted => continue,
                    _ => return Err(error.into()),
                },
            }
        }

        Ok(())
    }
}

impl<S> BufferedConnection<S>
where
    S: Source,
{
    /// Register `stream` and wrap it.
    pub fn register(registry: &Registry, mut stream: S, chunk_size: usize) -> Result<Self, Error> {
        let token = registry.register(&mut stream, Interest::READABLE)?;
        Ok(Self::new(stream, token, chunk_size))
    }

    /// Update the registration if the wanted events changed since the last sync.
    pub fn sync_interest(&mut self, registry: &Registry) -> Result<(), Error> {
        let interest = self.interest();
        if interest == self.registered {
            return Ok(());
        }

        event!(Level::TRACE, token = ?self.token, ?interest, "updating interest");
        registry.reregister(&mut self.stream, self.token, interest)?;
        self.registered = interest;

        Ok(())
    }

    /// Stop receiving readiness for this connection.
    pub fn deregister(&mut self, registry: &Registry) {
        if let Err(error) = registry.deregister(&mut self.stream) {
            event!(Level::WARN, ?error, "failed to deregister connection");
        }
    }

    /// Deregister and close, unsent outbound data is dropped.
    pub fn close(mut self, registry: &Registry) {
        event!(Level::DEBUG, token = ?self.token, "closing connection");

        self.deregister(registry);
        drop(self.into_inner());
    }
}

impl BufferedConnection<TcpStream> {
    /// Open an outbound connection.
    ///
    /// The connect completes asynchronously, queued writes are sent once the stream turns
    /// writable.
    pub fn connect(registry: &Registry, addr: SocketAddr, chunk_size: usize) -> Result<Self, Error> {
        event!(Level::DEBUG, ?addr, "connecting");

        let stream =
            TcpStream::connect(addr).with_context(|| format!("failed to connect to {}", addr))?;
        Self::register(registry, stream, chunk_size)
    }
}
