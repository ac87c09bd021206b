mod utils;

use anyhow::Error;
use hax_tcp::{BufferedConnection, Interest, Ready, Token, TransportError};
use tracing_test::traced_test;

use crate::utils::{MockStream, Recv};

const READABLE: Ready = Ready {
    readable: true,
    writable: false,
    error: false,
};

const WRITABLE: Ready = Ready {
    readable: false,
    writable: true,
    error: false,
};

#[test]
#[traced_test]
fn reassembles_fragmented_input() -> Result<(), Error> {
    let message = b"GET /fragmented HTTP/1.1\r\n\r\n";
    let chunks: Vec<&[u8]> = message.chunks(3).collect();
    let mut connection = given_connection(MockStream::with_chunks(&chunks), 4);

    connection.pump(READABLE)?;

    assert_eq!(connection.available_bytes(), message.len());
    let data = connection.read(message.len()).expect("all bytes buffered");
    assert_eq!(&data[..], &message[..]);
    assert_eq!(connection.available_bytes(), 0);

    Ok(())
}

#[test]
#[traced_test]
fn read_is_all_or_nothing() -> Result<(), Error> {
    let mut stream = MockStream::with_chunks(&[b"abc"]);
    stream.recv.push_back(Recv::WouldBlock);
    stream.recv.push_back(Recv::Data(b"de".to_vec()));
    let mut connection = given_connection(stream, 16);

    // Only the first chunk arrives before the stream would block
    connection.pump(READABLE)?;
    assert!(connection.read(5).is_none());
    assert_eq!(connection.available_bytes(), 3);

    connection.pump(READABLE)?;
    let data = connection.read(5).expect("all bytes buffered");
    assert_eq!(&data[..], b"abcde");

    Ok(())
}

#[test]
#[traced_test]
fn single_bytes_follow_arrival_order() -> Result<(), Error> {
    let mut connection = given_connection(MockStream::with_chunks(&[b"ab", b"c"]), 16);
    connection.pump(READABLE)?;

    let mut bytes = Vec::new();
    while let Some(byte) = connection.read_byte() {
        bytes.push(byte);
    }

    assert_eq!(bytes, b"abc");
    Ok(())
}

#[test]
#[traced_test]
fn drains_outbound_in_order_with_short_writes() -> Result<(), Error> {
    let mut stream = MockStream::default();
    stream.max_send = Some(3);
    stream.send_budget = Some(7);
    let mut connection = given_connection(stream, 16);

    connection.write(&b"first,"[..]);
    connection.write(&b"second,"[..]);
    connection.write(&b"third"[..]);
    assert_eq!(connection.queued_bytes(), 18);
    assert_eq!(connection.interest(), Interest::READABLE | Interest::WRITABLE);

    // The peer only accepts part of the data before blocking
    connection.pump(WRITABLE)?;
    assert_eq!(connection.stream().sent, b"first,s");
    assert_eq!(connection.queued_bytes(), 11);

    connection.stream_mut().send_budget = None;
    connection.pump(WRITABLE)?;
    assert_eq!(connection.stream().sent, b"first,second,third");
    assert_eq!(connection.queued_bytes(), 0);
    assert_eq!(connection.interest(), Interest::READABLE);

    Ok(())
}

#[test]
#[traced_test]
fn peer_close_keeps_received_data() -> Result<(), Error> {
    let mut stream = MockStream::with_chunks(&[b"request"]);
    stream.recv.push_back(Recv::Eof);
    stream.recv.push_back(Recv::Data(b"never read".to_vec()));
    let mut connection = given_connection(stream, 16);

    connection.pump(READABLE)?;

    assert!(connection.is_read_closed());
    let data = connection.read(7).expect("data before close buffered");
    assert_eq!(&data[..], b"request");

    // Nothing is received after the close, but queued data can still be sent
    connection.write(&b"response"[..]);
    connection.pump(Ready {
        readable: true,
        writable: true,
        error: false,
    })?;
    assert_eq!(connection.available_bytes(), 0);
    assert_eq!(connection.stream().sent, b"response");

    Ok(())
}

#[test]
#[traced_test]
fn zero_length_send_is_reported() {
    let mut stream = MockStream::default();
    stream.max_send = Some(0);
    let mut connection = given_connection(stream, 16);
    connection.write(&b"data"[..]);

    let result = connection.pump(WRITABLE);
    assert!(matches!(result, Err(TransportError::Closed)));
}

fn given_connection(stream: MockStream, chunk_size: usize) -> BufferedConnection<MockStream> {
    BufferedConnection::new(stream, Token(1), chunk_size)
}
