//! Relay parameter extraction
//!
//! Query strings and urlencoded bodies share the `application/x-www-form-urlencoded`
//! grammar and are read the same way. Multipart bodies are parsed into their
//! text fields up front. All three converge on one [`RelayParams`] record;
//! only the text normalization differs per origin.

use std::borrow::Cow;
use std::convert::Infallible;

use futures_util::stream;
use hyper::body::Bytes;
use url::form_urlencoded;

pub const DEFAULT_PARSE_MODE: &str = "HTML";

pub const MISSING_PARAMS: &str = "Missing required parameters: token, chat_id, text";

/// Where the relay fields were read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// URL query string (GET and every other non-POST method)
    Query,
    /// Urlencoded or multipart request body (POST)
    Form,
}

/// A lookup over one request's fields
pub trait ParamSource {
    /// First value for `name`; empty values count as absent
    fn get(&self, name: &str) -> Option<Cow<'_, str>>;

    fn origin(&self) -> TextOrigin;
}

/// Fields from a raw (still encoded) query string
pub struct QueryParams<'a>(pub &'a str);

/// Fields from a raw form-encoded body
pub struct FormParams<'a>(pub &'a [u8]);

/// Text fields of a `multipart/form-data` body, in body order
#[derive(Debug)]
pub struct MultipartParams(Vec<(String, String)>);

impl MultipartParams {
    /// Parse `body` using the boundary from `content_type`.
    ///
    /// File parts are skipped, so a field sent as a file counts as absent.
    pub async fn parse(content_type: &str, body: Bytes) -> Result<Self, multer::Error> {
        let boundary = multer::parse_boundary(content_type)?;
        let chunks = stream::iter(Some(Ok::<_, Infallible>(body)));
        let mut multipart = multer::Multipart::new(chunks, boundary);

        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };
            fields.push((name, field.text().await?));
        }
        Ok(Self(fields))
    }
}

fn first_non_empty<'a>(mut pairs: form_urlencoded::Parse<'a>, name: &str) -> Option<Cow<'a, str>> {
    pairs
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

impl ParamSource for QueryParams<'_> {
    fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        first_non_empty(form_urlencoded::parse(self.0.as_bytes()), name)
    }

    fn origin(&self) -> TextOrigin {
        TextOrigin::Query
    }
}

impl ParamSource for FormParams<'_> {
    fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        first_non_empty(form_urlencoded::parse(self.0), name)
    }

    fn origin(&self) -> TextOrigin {
        TextOrigin::Form
    }
}

impl ParamSource for MultipartParams {
    fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
            .filter(|value| !value.is_empty())
    }

    fn origin(&self) -> TextOrigin {
        TextOrigin::Form
    }
}

/// Normalized relay request, before text decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayParams {
    pub token: String,
    pub chat_id: String,
    pub text: String,
    pub parse_mode: String,
    pub origin: TextOrigin,
}

impl RelayParams {
    /// Read the three required fields and the format mode.
    ///
    /// `parse_mode` wins over `mode`; both absent gives `HTML`.
    /// Returns `None` when `token`, `chat_id` or `text` is missing or empty.
    pub fn extract(source: &impl ParamSource) -> Option<Self> {
        let token = source.get("token")?;
        let chat_id = source.get("chat_id")?;
        let text = source.get("text")?;
        let parse_mode = source
            .get("parse_mode")
            .or_else(|| source.get("mode"))
            .unwrap_or(Cow::Borrowed(DEFAULT_PARSE_MODE));

        Some(Self {
            token: token.into_owned(),
            chat_id: chat_id.into_owned(),
            text: text.into_owned(),
            parse_mode: parse_mode.into_owned(),
            origin: source.origin(),
        })
    }
}
