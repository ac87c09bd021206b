use std::collections::VecDeque;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// FIFO queue of byte chunks.
///
/// Every chunk keeps its own read cursor, and is evicted from the front of the queue exactly when
/// it has been fully consumed. The queue never holds empty chunks, so `len` always equals the sum
/// of the unread bytes of all chunks.
#[derive(Default, Debug)]
pub struct ChunkQueue {
    chunks: VecDeque<Bytes>,
    len: usize,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total unread bytes over all chunks.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks currently held.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Append a chunk to the tail of the queue.
    pub fn push(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }

        self.len += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Take exactly `count` bytes from the front of the queue.
    ///
    /// Returns `None` without consuming anything if fewer than `count` bytes are queued.
    pub fn take(&mut self, count: usize) -> Option<Bytes> {
        if self.len < count {
            return None;
        }

        if count == 0 {
            return Some(Bytes::new());
        }

        // Fast path, the data is contained in the front chunk
        let front = self.chunks.front_mut()?;
        if front.len() >= count {
            let data = front.split_to(count);
            self.consumed(count);
            return Some(data);
        }

        // Slow path, stitch the data together over multiple chunks
        let mut data = BytesMut::with_capacity(count);
        while data.len() < count {
            let Some(front) = self.chunks.front_mut() else {
                break;
            };

            let part = (count - data.len()).min(front.len());
            data.put(front.split_to(part));
            self.consumed(part);
        }

        Some(data.freeze())
    }

    /// Take a single byte from the front of the queue.
    pub fn pop_byte(&mut self) -> Option<u8> {
        let front = self.chunks.front_mut()?;
        let byte = *front.first()?;

        front.advance(1);
        self.consumed(1);

        Some(byte)
    }

    /// The unread part of the front chunk.
    pub fn front(&self) -> Option<&[u8]> {
        self.chunks.front().map(|chunk| &chunk[..])
    }

    /// Advance the cursor of the front chunk by `count` bytes, at most up to its end.
    pub fn advance(&mut self, count: usize) {
        let Some(front) = self.chunks.front_mut() else {
            return;
        };

        let count = count.min(front.len());
        front.advance(count);
        self.consumed(count);
    }

    /// Drop all queued data.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Account for `count` bytes consumed from the front chunk, evicting it if it's exhausted.
    fn consumed(&mut self, count: usize) {
        self.len -= count;

        if self.chunks.front().map_or(false, |chunk| chunk.is_empty()) {
            self.chunks.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_spans_chunks() {
        let mut queue = ChunkQueue::new();
        queue.push(Bytes::from_static(b"ab"));
        queue.push(Bytes::from_static(b""));
        queue.push(Bytes::from_static(b"cde"));

        assert_eq!(queue.len(), 5);
        assert_eq!(queue.chunk_count(), 2);

        assert_eq!(queue.take(6), None);
        assert_eq!(queue.len(), 5);

        assert_eq!(queue.take(3).as_deref(), Some(&b"abc"[..]));
        assert_eq!(queue.chunk_count(), 1);
        assert_eq!(queue.pop_byte(), Some(b'd'));
        assert_eq!(queue.take(1).as_deref(), Some(&b"e"[..]));

        assert!(queue.is_empty());
        assert_eq!(queue.chunk_count(), 0);
        assert_eq!(queue.pop_byte(), None);
    }

    #[test]
    fn advance_evicts_exhausted_front() {
        let mut queue = ChunkQueue::new();
        queue.push(Bytes::from_static(b"hello"));
        queue.push(Bytes::from_static(b"world"));

        queue.advance(3);
        assert_eq!(queue.front(), Some(&b"lo"[..]));

        // Advancing never crosses into the next chunk
        queue.advance(10);
        assert_eq!(queue.front(), Some(&b"world"[..]));
        assert_eq!(queue.len(), 5);
    }
}
