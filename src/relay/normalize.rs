//! Message text normalization
//!
//! Query-sourced text goes through one extra strict percent-decoding pass,
//! then every text gets the literal escape rewrite below. The rewrite also
//! touches text that merely contains e.g. `%0A` as written characters.

use percent_encoding::percent_decode_str;

use super::error::RelayError;
use super::params::TextOrigin;

/// Literal sequences rewritten after decoding, applied in this order
const LITERAL_ESCAPES: [(&str, &str); 4] = [("%0A", "\n"), ("%20", " "), ("%3A", ":"), ("%2F", "/")];

const URI_MALFORMED: &str = "URI malformed";

/// Produce the text that is sent upstream
pub fn normalize_text(text: &str, origin: TextOrigin) -> Result<String, RelayError> {
    let decoded = match origin {
        TextOrigin::Query => decode_component(text)?,
        TextOrigin::Form => text.to_string(),
    };

    Ok(LITERAL_ESCAPES
        .iter()
        .fold(decoded, |acc, (from, to)| acc.replace(from, to)))
}

/// Percent-decode one URI component, rejecting malformed escapes and non UTF-8 output
fn decode_component(text: &str) -> Result<String, RelayError> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let well_formed = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(RelayError::Decode(URI_MALFORMED));
        }
        i = at + 3;
    }

    percent_decode_str(text)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| RelayError::Decode(URI_MALFORMED))
}
