use bytes::{BufMut, Bytes, BytesMut};

use crate::{cookies, form, FormError, Header, Pairs};

/// Application callback for completed requests.
///
/// Returns true if the request was handled, false answers it with a 404.
pub trait Handler {
    fn handle(&mut self, path: &str, ctx: &mut RequestContext) -> bool;
}

impl<F> Handler for F
where
    F: FnMut(&str, &mut RequestContext) -> bool,
{
    fn handle(&mut self, path: &str, ctx: &mut RequestContext) -> bool {
        self(path, ctx)
    }
}

/// State of a single request, handed to a [`Handler`].
///
/// The handler reads `request` and `body`, and writes the response into `output`, `status`, and
/// `response`.
#[derive(Debug)]
pub struct RequestContext {
    /// Response body.
    pub output: BytesMut,
    /// Response status code, 200 unless changed.
    pub status: u16,
    pub request: Header,
    pub body: Bytes,
    /// Response header fields.
    pub response: Pairs,
}

impl RequestContext {
    pub fn new(request: Header, body: Bytes) -> Self {
        Self {
            output: BytesMut::new(),
            status: 200,
            request,
            body,
            response: Pairs::new(),
        }
    }

    /// Append raw bytes to the response body.
    pub fn write(&mut self, data: &[u8]) {
        self.output.put_slice(data);
    }

    /// Cookies sent with the request.
    pub fn cookies(&self) -> Pairs {
        self.request
            .get("Cookie")
            .map(cookies::parse)
            .unwrap_or_default()
    }

    /// The request body, parsed as url-encoded form data.
    pub fn form(&self) -> Result<Pairs, FormError> {
        let text = std::str::from_utf8(&self.body).map_err(|_| FormError::InvalidUtf8)?;
        form::parse(text)
    }
}
