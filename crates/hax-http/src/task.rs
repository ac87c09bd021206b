use std::{
    net::SocketAddr,
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context as _, Error};
use hax_tcp::{Poller, Waker};
use tracing::{event, instrument, Level};

use crate::{Handler, HttpConfig, HttpService};

/// HTTP service running on a dedicated worker thread.
///
/// The worker polls the service together with a cancellation waker, and closes the service when
/// canceled. Dropping the task cancels it as well.
pub struct ServiceTask {
    waker: Waker,
    handle: Option<JoinHandle<Result<(), Error>>>,
    local_addr: SocketAddr,
}

/// Bind a service on `addr` and run it on a new worker thread.
pub fn spawn<H>(addr: SocketAddr, config: HttpConfig, handler: H) -> Result<ServiceTask, Error>
where
    H: Handler + Send + 'static,
{
    let poller = Poller::new(config.events_capacity)?;
    let waker = poller.waker()?;
    let service = HttpService::bind(poller.registry()?, addr, config)?;
    let local_addr = service.local_addr();

    let handle = thread::Builder::new()
        .name("http-service".to_string())
        .spawn(move || run_worker(poller, service, handler))
        .context("failed to spawn service thread")?;

    Ok(ServiceTask {
        waker,
        handle: Some(handle),
        local_addr,
    })
}

impl ServiceTask {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the worker to stop, and wait for it to exit.
    ///
    /// The worker checks for cancellation once per cycle, a handler that's running is not
    /// interrupted.
    pub fn cancel_and_join(mut self) -> Result<(), Error> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), Error> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        if let Err(error) = self.waker.wake() {
            event!(Level::WARN, ?error, "failed to wake service thread");
        }

        handle
            .join()
            .map_err(|_| anyhow!("service thread panicked"))??;

        Ok(())
    }
}

impl Drop for ServiceTask {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            event!(Level::ERROR, "error in service task: {:?}", error);
        }
    }
}

#[instrument("http-service", skip_all)]
fn run_worker<H>(mut poller: Poller, mut service: HttpService, mut handler: H) -> Result<(), Error>
where
    H: Handler,
{
    event!(Level::INFO, "service task started");

    loop {
        let mut entries = service.poll()?;

        let canceled = poller.wait(&mut entries, None)?;
        if canceled {
            break;
        }

        event!(Level::TRACE, entries = entries.len(), "processing poll step");
        service.process(Some(&entries), &mut handler)?;
    }

    event!(Level::INFO, "service task stopped");
    service.close();

    Ok(())
}
