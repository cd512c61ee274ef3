//! Percent-encoding and path segment helpers shared by the parser and the
//! formatter.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, PercentEncode};

use crate::ParseError;

/// Bytes that are escaped in every PURL component.
///
/// This is the `application/x-www-form-urlencoded` set, where only ASCII
/// alphanumerics and `*-._` are left alone, except that `:` and `/` are also
/// written literally. Spaces become `%20`, never `+`.
// https://url.spec.whatwg.org/#application-x-www-form-urlencoded-percent-encode-set
const COMPONENT: &AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b':')
    .remove(b'/');

/// Percent-encode a single component.
pub(crate) fn encode(input: &str) -> PercentEncode<'_> {
    utf8_percent_encode(input, COMPONENT)
}

/// Percent-decode a single component.
///
/// Only `%XX` sequences are decoded. A `+` is a literal plus sign.
pub(crate) fn decode(input: &str) -> Result<Cow<str>, ParseError> {
    percent_decode_str(input).decode_utf8().map_err(|_| ParseError::InvalidEscape)
}

/// Check whether `s` contains a `%XX` escape sequence.
#[must_use]
pub(crate) fn contains_escape(s: &str) -> bool {
    s.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
}

/// Split a path-like value into its segments.
///
/// Leading and trailing slashes are ignored. Empty, `.` and `..` segments are
/// returned as-is; filtering is up to the caller because namespaces and
/// subpaths have different rules.
pub(crate) fn segments(s: &str) -> impl Iterator<Item = &str> {
    s.trim_matches('/').split('/')
}

/// Whether a segment is `.` or `..`.
#[must_use]
pub(crate) fn is_relative_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}
