use bytes::{BufMut, Bytes, BytesMut};

use crate::RequestContext;

pub const NOT_FOUND: &[u8] =
    b"HTTP/1.1 404 Not Found\nContent-Length: 9\nConnection: keep-alive\n\nNot Found";

pub const NOT_FOUND_CLOSE: &[u8] =
    b"HTTP/1.1 404 Not Found\nContent-Length: 9\nConnection: close\n\nNot Found";

pub const BAD_REQUEST: &[u8] =
    b"HTTP/1.1 400 Bad Request\nContent-Length: 11\nConnection: close\n\nBad Request";

pub const PAYLOAD_TOO_LARGE: &[u8] =
    b"HTTP/1.1 413 Payload Too Large\nContent-Length: 17\nConnection: close\n\nPayload Too Large";

const DEFAULT_CONTENT_TYPE: &str = "application/xhtml+xml";

/// Serialize the response a handler wrote into `ctx`.
pub fn serialize(ctx: RequestContext, close: bool) -> Bytes {
    let RequestContext {
        output,
        status,
        mut response,
        ..
    } = ctx;

    if response.get("Content-Type").is_none() {
        response.append("Content-Type", DEFAULT_CONTENT_TYPE);
    }

    // These are always decided here, never merged with handler values
    response.remove("Content-Length");
    response.remove("Connection");
    response.append("Content-Length", output.len().to_string());
    response.append("Connection", if close { "close" } else { "keep-alive" });

    let reason = if status == 200 { "OK" } else { "Redirect" };

    let mut data = BytesMut::new();
    data.put(format!("HTTP/1.1 {} {}\n", status, reason).as_bytes());
    for pair in &response {
        data.put(pair.key.as_bytes());
        data.put(&b": "[..]);
        data.put(pair.value.as_bytes());
        data.put_u8(b'\n');
    }
    data.put_u8(b'\n');
    data.put(output);

    data.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Header;

    #[test]
    fn injects_default_and_length_fields() {
        let mut ctx = RequestContext::new(Header::default(), Bytes::new());
        ctx.write(b"hello");
        ctx.response.add("Content-Length", "999");

        let data = serialize(ctx, false);
        assert_eq!(
            &data[..],
            b"HTTP/1.1 200 OK\nContent-Type: application/xhtml+xml\nContent-Length: 5\nConnection: keep-alive\n\nhello"
        );
    }

    #[test]
    fn non_ok_status_and_close() {
        let mut ctx = RequestContext::new(Header::default(), Bytes::new());
        ctx.status = 302;
        ctx.response.add("Location", "/next");
        ctx.response.add("Content-Type", "text/plain");

        let data = serialize(ctx, true);
        assert_eq!(
            &data[..],
            b"HTTP/1.1 302 Redirect\nLocation: /next\nContent-Type: text/plain\nContent-Length: 0\nConnection: close\n\n"
        );
    }
}
