use hax_tcp::DEFAULT_CHUNK_SIZE;

/// Options for an [`HttpService`](crate::HttpService) and its connections.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Size of a single receive chunk.
    pub chunk_size: usize,
    /// Maximum size of a request head, larger heads are answered with 400.
    pub max_head_len: usize,
    /// Maximum accepted `Content-Length`, larger bodies are answered with 413.
    pub max_body_len: usize,
    /// Event capacity of the poller used by a spawned service task.
    pub events_capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_head_len: 64 * 1024,
            max_body_len: 16 * 1024 * 1024,
            events_capacity: 128,
        }
    }
}

impl HttpConfig {
    pub fn with_chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value;
        self
    }

    pub fn with_max_head_len(mut self, value: usize) -> Self {
        self.max_head_len = value;
        self
    }

    pub fn with_max_body_len(mut self, value: usize) -> Self {
        self.max_body_len = value;
        self
    }

    pub fn with_events_capacity(mut self, value: usize) -> Self {
        self.events_capacity = value;
        self
    }
}
