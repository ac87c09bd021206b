use thiserror::Error;

/// Malformed request head.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid header, missing verb")]
    MissingVerb,
    #[error("invalid header, missing path")]
    MissingPath,
    #[error("invalid header, missing protocol")]
    MissingProtocol,
    #[error("invalid header, invalid request line")]
    InvalidRequestLine,
    #[error("invalid header, missing value on line {line}")]
    MissingValue { line: usize },
    #[error("invalid content length {0:?}")]
    InvalidContentLength(String),
}

/// Malformed `application/x-www-form-urlencoded` data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid form data, missing '=' after key")]
    MissingValue,
    #[error("invalid form data, malformed percent escape")]
    InvalidEscape,
    #[error("invalid form data, decoded text is not utf-8")]
    InvalidUtf8,
}

/// Failed extraction of fields from a pair list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("cannot find key {0:?}")]
    MissingKey(String),
    #[error("extra pairs in list")]
    ExtraPairs,
}
