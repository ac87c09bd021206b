//! `application/x-www-form-urlencoded` body parsing.

use crate::{FormError, Pairs};

/// Parse url-encoded form data.
///
/// Pairs are separated by `&`, `+` decodes to a space and `%XX` to the byte `XX`. A key without
/// `=` or a malformed escape fails the whole parse.
pub fn parse(text: &str) -> Result<Pairs, FormError> {
    let mut pairs = Pairs::new();
    let mut rest = text.as_bytes();

    loop {
        let split = rest
            .iter()
            .position(|b| *b == b'=' || *b == b'&')
            .filter(|split| rest[*split] == b'=')
            .ok_or(FormError::MissingValue)?;
        let key = decode(&rest[..split])?;
        rest = &rest[split + 1..];

        let end = rest.iter().position(|b| *b == b'&').unwrap_or(rest.len());
        let value = decode(&rest[..end])?;
        pairs.append(key, value);

        if end == rest.len() {
            break;
        }
        rest = &rest[end + 1..];
    }

    Ok(pairs)
}

fn decode(encoded: &[u8]) -> Result<String, FormError> {
    let mut decoded = Vec::with_capacity(encoded.len());
    let mut bytes = encoded.iter();

    while let Some(byte) = bytes.next() {
        match byte {
            b'+' => decoded.push(b' '),
            b'%' => {
                let high = bytes.next().and_then(|b| hex(*b));
                let low = bytes.next().and_then(|b| hex(*b));
                let (Some(high), Some(low)) = (high, low) else {
                    return Err(FormError::InvalidEscape);
                };

                decoded.push(high << 4 | low);
            }
            byte => decoded.push(*byte),
        }
    }

    String::from_utf8(decoded).map_err(|_| FormError::InvalidUtf8)
}

fn hex(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}
