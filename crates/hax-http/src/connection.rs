use std::ops::ControlFlow;

use bytes::{BufMut, BytesMut};
use hax_tcp::BufferedConnection;
use tracing::{event, Level};

use crate::{response, Handler, Header, HttpConfig, ParseError, RequestContext};

/// Protocol state of an [`HttpConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Accumulating the request line and header fields.
    ReadingHead,
    /// Accumulating `Content-Length` bytes of body.
    ReadingBody,
    /// No further requests are accepted, the connection closes once its response is sent.
    Done,
}

/// HTTP/1.1 request state machine on top of a buffered connection.
pub struct HttpConnection<S> {
    connection: BufferedConnection<S>,
    state: State,
    buffer: BytesMut,
    content_length: usize,
    request: Option<Header>,
    max_head_len: usize,
    max_body_len: usize,
}

impl<S> HttpConnection<S> {
    pub fn new(connection: BufferedConnection<S>, config: &HttpConfig) -> Self {
        event!(Level::DEBUG, token = ?connection.token(), "connection opened");

        Self {
            connection,
            state: State::ReadingHead,
            buffer: BytesMut::with_capacity(256),
            content_length: 0,
            request: None,
            max_head_len: config.max_head_len,
            max_body_len: config.max_body_len,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn connection(&self) -> &BufferedConnection<S> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut BufferedConnection<S> {
        &mut self.connection
    }

    pub fn into_connection(self) -> BufferedConnection<S> {
        self.connection
    }

    /// Feed all buffered input through the state machine, dispatching completed requests.
    ///
    /// Breaks once the connection is done, or the peer has stopped sending and all buffered input
    /// has been handled, and the last response has been sent.
    pub fn process<H>(&mut self, handler: &mut H) -> ControlFlow<()>
    where
        H: Handler,
    {
        while self.state != State::Done {
            let Some(byte) = self.connection.read_byte() else {
                break;
            };

            self.feed(byte, handler);
        }

        let finished = self.state == State::Done || self.connection.is_read_closed();
        if finished && self.connection.queued_bytes() == 0 {
            return ControlFlow::Break(());
        }

        ControlFlow::Continue(())
    }

    fn feed<H>(&mut self, byte: u8, handler: &mut H)
    where
        H: Handler,
    {
        match self.state {
            State::ReadingHead => match byte {
                b'\r' => {}
                // Blank lines before a request line are ignored
                b'\n' if self.buffer.is_empty() => {}
                b'\n' if self.buffer.last() == Some(&b'\n') => self.on_head_complete(handler),
                b'\n' | 0x20..=0x7F => self.push_head(byte),
                _ => {}
            },
            State::ReadingBody => {
                self.buffer.put_u8(byte);

                if self.buffer.len() == self.content_length {
                    self.dispatch(handler);
                }
            }
            State::Done => {}
        }
    }

    fn push_head(&mut self, byte: u8) {
        if self.buffer.len() >= self.max_head_len {
            event!(Level::DEBUG, limit = self.max_head_len, "request head too large");
            self.fail(response::BAD_REQUEST);
            return;
        }

        self.buffer.put_u8(byte);
    }

    fn on_head_complete<H>(&mut self, handler: &mut H)
    where
        H: Handler,
    {
        let parsed = std::str::from_utf8(&self.buffer)
            .map_err(|_| ParseError::InvalidRequestLine)
            .and_then(Header::parse)
            .and_then(|header| header.content_length().map(|length| (header, length)));

        let (header, length) = match parsed {
            Ok(value) => value,
            Err(error) => {
                event!(Level::DEBUG, %error, "malformed request head");
                self.fail(response::BAD_REQUEST);
                return;
            }
        };

        if length > self.max_body_len {
            event!(Level::DEBUG, length, limit = self.max_body_len, "request body too large");
            self.fail(response::PAYLOAD_TOO_LARGE);
            return;
        }

        self.buffer.clear();
        self.request = Some(header);
        self.content_length = length;

        if length == 0 {
            self.dispatch(handler);
        } else {
            self.state = State::ReadingBody;
        }
    }

    fn dispatch<H>(&mut self, handler: &mut H)
    where
        H: Handler,
    {
        let request = self.request.take().unwrap_or_default();
        let body = self.buffer.split().freeze();
        let close = request.wants_close();

        let mut ctx = RequestContext::new(request, body);
        let path = ctx.request.path.clone();
        let handled = handler.handle(&path, &mut ctx);

        event!(
            Level::DEBUG,
            verb = %ctx.request.verb,
            path = %path,
            handled,
            status = ctx.status,
            "dispatched request"
        );

        let data = if handled {
            response::serialize(ctx, close)
        } else if close {
            response::NOT_FOUND_CLOSE.into()
        } else {
            response::NOT_FOUND.into()
        };
        self.connection.write(data);

        // Reset for the next request on this connection
        self.content_length = 0;
        self.state = if close { State::Done } else { State::ReadingHead };
    }

    /// Answer with a fixed error response and stop accepting requests.
    fn fail(&mut self, data: &'static [u8]) {
        self.connection.write(data);

        self.buffer.clear();
        self.request = None;
        self.content_length = 0;
        self.state = State::Done;
    }
}
