use std::{net::SocketAddr, ops::ControlFlow, time::Duration};

use anyhow::{bail, Context as _, Error};
use hax_tcp::{BufferedConnection, Listener, PollEntry, Poller, Ready, Registry, TcpStream};
use thunderdome::{Arena, Index};
use tracing::{event, instrument, Level};

use crate::{Handler, HttpConfig, HttpConnection};

/// HTTP server: a listener plus the set of live connections.
///
/// Every cycle is split in two steps. [`poll`](Self::poll) builds the readiness query, the caller
/// waits on it, and [`process`](Self::process) applies the results. The connection list may not
/// change between the two, so don't interleave cycles.
pub struct HttpService {
    registry: Registry,
    listener: Listener,
    connections: Arena<HttpConnection<TcpStream>>,
    /// Live connections, most recently accepted first.
    order: Vec<Index>,
    config: HttpConfig,
}

impl HttpService {
    /// Start listening on the given address.
    #[instrument("HttpService::bind", skip_all)]
    pub fn bind(registry: Registry, addr: SocketAddr, config: HttpConfig) -> Result<Self, Error> {
        let listener = Listener::bind(&registry, addr)?;
        event!(Level::INFO, addr = ?listener.local_addr(), "listening");

        Ok(Self {
            registry,
            listener,
            connections: Arena::new(),
            order: Vec::new(),
            config,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn connection_count(&self) -> usize {
        self.order.len()
    }

    /// Build the readiness query for this cycle.
    ///
    /// Entry 0 is always the listener, entry `i + 1` is the `i`-th live connection. Connections
    /// that fail to update their registration are closed first.
    pub fn poll(&mut self) -> Result<Vec<PollEntry>, Error> {
        let mut failed = Vec::new();
        for index in &self.order {
            let connection = self
                .connections
                .get_mut(*index)
                .context("live connection missing from arena")?
                .connection_mut();

            if let Err(error) = connection.sync_interest(&self.registry) {
                event!(Level::WARN, ?error, token = ?connection.token(), "failed to update interest");
                failed.push(*index);
            }
        }

        for index in failed {
            self.remove(index);
        }

        let mut entries = Vec::with_capacity(1 + self.order.len());
        entries.push(self.listener.poll_entry());

        for index in &self.order {
            let connection = self
                .connections
                .get(*index)
                .context("live connection missing from arena")?;
            entries.push(connection.connection().poll_entry());
        }

        Ok(entries)
    }

    /// Apply readiness results from the matching [`poll`](Self::poll) call.
    ///
    /// Pumps and feeds every ready connection, removes failed and finished ones, then accepts new
    /// connections. Passing `None` checks everything without readiness information.
    pub fn process<H>(&mut self, ready: Option<&[PollEntry]>, handler: &mut H) -> Result<(), Error>
    where
        H: Handler,
    {
        if let Some(entries) = ready {
            if entries.len() != 1 + self.order.len() || entries[0].token != self.listener.token() {
                bail!("readiness entries don't match the connection list");
            }
        }

        let mut closed = Vec::new();
        for (i, index) in self.order.iter().enumerate() {
            let connection = self
                .connections
                .get_mut(*index)
                .context("live connection missing from arena")?;

            let observed = match ready {
                Some(entries) => {
                    let entry = &entries[i + 1];
                    if entry.token != connection.connection().token() {
                        bail!("readiness entry token doesn't match connection");
                    }
                    entry.ready
                }
                None => Ready {
                    readable: true,
                    writable: connection.connection().queued_bytes() > 0,
                    error: false,
                },
            };

            if observed.is_empty() {
                continue;
            }

            if observed.error {
                event!(Level::DEBUG, token = ?connection.connection().token(), "connection error");
                closed.push(*index);
                continue;
            }

            if let Err(error) = connection.connection_mut().pump(observed) {
                event!(Level::DEBUG, %error, "connection failed");
                closed.push(*index);
                continue;
            }

            if connection.process(handler).is_break() {
                closed.push(*index);
            }
        }

        for index in closed {
            self.remove(index);
        }

        let listener_ready = ready.map_or(true, |entries| !entries[0].ready.is_empty());
        if listener_ready {
            self.accept_pending(handler);
        }

        Ok(())
    }

    /// Run one full cycle, waiting on `poller` for at most `timeout`.
    pub fn run_once<H>(
        &mut self,
        poller: &mut Poller,
        timeout: Option<Duration>,
        handler: &mut H,
    ) -> Result<(), Error>
    where
        H: Handler,
    {
        let mut entries = self.poll()?;
        poller.wait(&mut entries, timeout)?;
        self.process(Some(&entries), handler)
    }

    /// Close the listener and all connections, dropping unsent data.
    pub fn close(self) {
        drop(self);
    }

    fn accept_pending<H>(&mut self, handler: &mut H)
    where
        H: Handler,
    {
        loop {
            let (stream, remote_addr) = match self.listener.accept() {
                Ok(Some(value)) => value,
                Ok(None) => break,
                Err(error) => {
                    event!(Level::WARN, ?error, "failed to accept connection");
                    break;
                }
            };

            let connection =
                match BufferedConnection::register(&self.registry, stream, self.config.chunk_size) {
                    Ok(connection) => connection,
                    Err(error) => {
                        event!(Level::WARN, ?error, ?remote_addr, "failed to register connection");
                        continue;
                    }
                };
            let mut connection = HttpConnection::new(connection, &self.config);
            event!(Level::DEBUG, ?remote_addr, token = ?connection.connection().token(), "accepted");

            // Request data commonly arrives together with the connection itself
            let ready = Ready {
                readable: true,
                writable: false,
                error: false,
            };
            let flow = match connection.connection_mut().pump(ready) {
                Ok(()) => connection.process(handler),
                Err(error) => {
                    event!(Level::DEBUG, %error, "connection failed");
                    ControlFlow::Break(())
                }
            };

            if flow.is_break() {
                connection.into_connection().close(&self.registry);
                continue;
            }

            let index = self.connections.insert(connection);
            self.order.insert(0, index);
        }
    }

    fn remove(&mut self, index: Index) {
        self.order.retain(|value| *value != index);

        if let Some(connection) = self.connections.remove(index) {
            connection.into_connection().close(&self.registry);
        }
    }
}

impl Drop for HttpService {
    fn drop(&mut self) {
        event!(Level::DEBUG, connections = self.order.len(), "closing service");

        for (_, connection) in self.connections.iter_mut() {
            connection.connection_mut().deregister(&self.registry);
        }
        self.connections.clear();
        self.order.clear();

        self.listener.deregister(&self.registry);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::TcpStream as StdTcpStream,
        thread,
        time::{Duration, Instant},
    };

    use tracing_test::traced_test;

    use super::*;
    use crate::RequestContext;

    #[test]
    #[traced_test]
    fn failed_registration_closes_only_that_connection() -> Result<(), Error> {
        let poller = Poller::new(16)?;
        let mut service = HttpService::bind(
            poller.registry()?,
            "127.0.0.1:0".parse()?,
            HttpConfig::default(),
        )?;
        let mut handler = |_path: &str, _ctx: &mut RequestContext| false;

        let _first = StdTcpStream::connect(service.local_addr())?;
        accept_until(&mut service, &mut handler, 1)?;

        // Updating the interest of a stream the poller doesn't know fails
        let index = service.order[0];
        let connection = service
            .connections
            .get_mut(index)
            .context("connection in arena")?
            .connection_mut();
        connection.deregister(&service.registry);
        connection.write(&b"pending"[..]);

        let entries = service.poll()?;
        assert_eq!(entries.len(), 1);
        assert_eq!(service.connection_count(), 0);

        // The service keeps accepting
        let _second = StdTcpStream::connect(service.local_addr())?;
        accept_until(&mut service, &mut handler, 1)?;

        Ok(())
    }

    fn accept_until<H>(service: &mut HttpService, handler: &mut H, count: usize) -> Result<(), Error>
    where
        H: Handler,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while service.connection_count() < count {
            if Instant::now() > deadline {
                bail!("timed out waiting for accept");
            }

            service.process(None, handler)?;
            thread::sleep(Duration::from_millis(10));
        }

        Ok(())
    }
}
