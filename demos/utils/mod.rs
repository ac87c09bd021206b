use std::net::SocketAddr;

use anyhow::{Context as _, Error};

const DEFAULT_LISTEN: &str = "127.0.0.1:1234";

pub fn init_logging() {
    devutils::init_logging("debug");
}

/// Address to listen on, taken from `HAX_LISTEN` if set.
pub fn listen_addr() -> Result<SocketAddr, Error> {
    let value = std::env::var("HAX_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
    value
        .parse()
        .with_context(|| format!("invalid listen address \"{}\"", value))
}
