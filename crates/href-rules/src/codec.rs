//! Percent-encoding of single URL components
//!
//! Path captures are decoded after matching, query values are re-encoded before
//! matching, and generated values are encoded before substitution. All three go
//! through this module so both directions agree on the escape set.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::Params;

/// Escape set matching `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encodes a value for use as one path segment or one query value
///
/// Everything except ASCII alphanumerics and `-_.!~*'()` is escaped, so `/`, `&`,
/// `#`, `?` and space can never leak out of the component.
pub fn encode_component(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, COMPONENT).into()
}

/// Decodes a percent-encoded component
///
/// Returns `None` when the decoded bytes are not valid UTF-8.
pub fn decode_component(value: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(value).ok()
}

/// Encodes every value of a parameter map, keeping the keys
pub fn encode_params(params: &Params) -> Params {
    params
        .iter()
        .map(|(key, value)| (key.clone(), encode_component(value).into_owned()))
        .collect()
}
