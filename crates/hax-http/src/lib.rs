//! Minimal HTTP/1.1 request-response engine.
//!
//! An [`HttpService`] owns a listener and its live [`HttpConnection`]s, and runs one poll/dispatch
//! cycle per [`process`](HttpService::process) call. Completed requests are handed to a
//! [`Handler`] together with a [`RequestContext`] it fills with the response.
//!
//! Bodies are fully buffered and delimited by `Content-Length`, connections are kept alive
//! between sequential requests.

pub mod asset;
mod config;
mod connection;
mod context;
pub mod cookies;
mod error;
pub mod form;
mod header;
mod pairs;
mod response;
mod service;
mod task;

pub use self::{
    config::HttpConfig,
    connection::{HttpConnection, State},
    context::{Handler, RequestContext},
    error::{FieldError, FormError, ParseError},
    header::Header,
    pairs::{Pair, Pairs},
    service::HttpService,
    task::{spawn, ServiceTask},
};
