use std::{
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
};

/// One scripted result of a `recv` call.
pub enum Recv {
    Data(Vec<u8>),
    WouldBlock,
    Eof,
}

/// In-memory stream replaying scripted receives and accepting limited writes.
#[derive(Default)]
pub struct MockStream {
    pub recv: VecDeque<Recv>,
    pub sent: Vec<u8>,
    /// Maximum bytes accepted per `send`, `None` for unlimited.
    pub max_send: Option<usize>,
    /// Remaining bytes the peer accepts before the stream would block.
    pub send_budget: Option<usize>,
}

impl MockStream {
    pub fn with_chunks(chunks: &[&[u8]]) -> Self {
        let mut stream = Self::default();
        for chunk in chunks {
            stream.recv.push_back(Recv::Data(chunk.to_vec()));
        }
        stream
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.recv.pop_front() {
            Some(Recv::Data(mut data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);

                // Keep what didn't fit for the next call
                if len < data.len() {
                    data.drain(..len);
                    self.recv.push_front(Recv::Data(data));
                }

                Ok(len)
            }
            Some(Recv::Eof) => Ok(0),
            Some(Recv::WouldBlock) | None => Err(ErrorKind::WouldBlock.into()),
        }
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut len = buf.len();
        if let Some(max) = self.max_send {
            len = len.min(max);
        }

        if let Some(budget) = self.send_budget.as_mut() {
            if *budget == 0 {
                return Err(ErrorKind::WouldBlock.into());
            }
            len = len.min(*budget);
            *budget -= len;
        }

        self.sent.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
