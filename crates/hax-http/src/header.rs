use crate::{ParseError, Pairs};

/// Parsed request head: request line plus header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub verb: String,
    pub path: String,
    pub proto: String,
    pub pairs: Pairs,
}

impl Header {
    /// Parse a request head.
    ///
    /// Expects `VERB SP PATH SP PROTO EOL (KEY ':' SP? VALUE EOL)*`, where EOL is either LF or
    /// CRLF. Repeated keys are merged.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(text);
        let mut header = Header::default();

        header.verb = cursor.word().ok_or(ParseError::MissingVerb)?.to_string();
        header.path = cursor.word().ok_or(ParseError::MissingPath)?.to_string();
        header.proto = cursor.word().ok_or(ParseError::MissingProtocol)?.to_string();

        cursor.skip_hspace();
        if !cursor.at_eol() {
            return Err(ParseError::InvalidRequestLine);
        }

        let mut line = 1;
        loop {
            line += cursor.skip_newlines();
            if cursor.is_empty() {
                break;
            }

            let key = cursor.until(b':').ok_or(ParseError::MissingValue { line })?;
            cursor.skip_hspace();
            let value = cursor.rest_of_line();

            header.pairs.add(key, value);
        }

        Ok(header)
    }

    /// First value of the given field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key)
    }

    /// Add a field, merging into an existing one with the same key.
    pub fn add(&mut self, key: &str, value: &str) {
        self.pairs.add(key, value);
    }

    /// Declared body length, zero if there's no `Content-Length` field.
    ///
    /// Only plain decimal digits are accepted, no sign.
    pub fn content_length(&self) -> Result<usize, ParseError> {
        let Some(value) = self.get("Content-Length") else {
            return Ok(0);
        };

        let invalid = || ParseError::InvalidContentLength(value.to_string());
        let digits = value.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        digits.parse().map_err(|_| invalid())
    }

    /// If the client asked for the connection to be closed after this request.
    pub fn wants_close(&self) -> bool {
        self.get("Connection").map_or(false, |value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("close"))
        })
    }
}

struct Cursor<'a> {
    text: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn at_eol(&self) -> bool {
        self.text.is_empty() || self.text.starts_with(['\n', '\r'])
    }

    fn skip_hspace(&mut self) {
        self.text = self.text.trim_start_matches([' ', '\t']);
    }

    /// Skip line breaks, returning how many lines were passed.
    fn skip_newlines(&mut self) -> usize {
        let lines = self.text.bytes().take_while(|b| *b == b'\n' || *b == b'\r');
        let count = lines.clone().filter(|b| *b == b'\n').count();
        let skip = lines.count();

        self.text = &self.text[skip..];
        count
    }

    /// Next whitespace-delimited word on the current line.
    fn word(&mut self) -> Option<&'a str> {
        self.skip_hspace();
        if self.at_eol() {
            return None;
        }

        let end = self
            .text
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(self.text.len());
        let (word, rest) = self.text.split_at(end);
        self.text = rest;

        Some(word)
    }

    /// Text up to `delimiter` on the current line, consuming the delimiter.
    fn until(&mut self, delimiter: u8) -> Option<&'a str> {
        let end = self
            .text
            .bytes()
            .position(|b| b == delimiter || b == b'\n' || b == b'\r')?;
        if self.text.as_bytes()[end] != delimiter {
            return None;
        }

        let value = &self.text[..end];
        self.text = &self.text[end + 1..];

        Some(value)
    }

    fn rest_of_line(&mut self) -> &'a str {
        let end = self.text.find(['\n', '\r']).unwrap_or(self.text.len());
        let (line, rest) = self.text.split_at(end);
        self.text = rest;

        line
    }
}
