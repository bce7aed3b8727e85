//! Path separator recovery.
//!
//! The inbound path reaches the router already percent-decoded once, so a
//! title such as `a%2Fb` arrives as `a/b` and is indistinguishable from two
//! segments. The API grammar tells them apart: separators next to a namespace
//! keyword, or inside and right after a leading server prefix, are
//! structural. Every other one was part of a segment.
//!
//! Decoding yields bytes, not text, so escapes that are not UTF-8 survive
//! the trip. `encode_path` splits those bytes into pieces, decides each
//! boundary from the grammar, and serializes the resulting segments with
//! their own escaping. The output is what the origin expects on the wire.

use percent_encoding::{percent_decode_str, percent_encode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// A separator after one of these pieces is structural (`bags/<name>`).
pub const OPENING_KEYWORDS: &[&str] = &[
    "users",
    "spaces",
    "bags",
    "recipes",
    "tiddlers",
    "revisions",
    "members",
    "challenge",
];

/// A separator before a piece starting with one of these is structural
/// (`<bag>/tiddlers`, `<title>/revisions.json`).
pub const CLOSING_KEYWORDS: &[&str] = &["tiddlers", "revisions", "members"];

/// Bytes escaped inside a segment: everything but unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Re-encode a once-decoded absolute path for forwarding.
///
/// `prefix` is the configured server prefix. When the path starts with it,
/// the separators inside it and the one following it are kept.
pub fn encode_path(decoded: impl AsRef<[u8]>, prefix: Option<&str>) -> String {
    let decoded = decoded.as_ref();
    let body = decoded.strip_prefix(b"/").unwrap_or(decoded);
    let pieces: Vec<&[u8]> = body.split(|&b| b == b'/').collect();
    let prefix_len = prefix.map_or(0, |p| leading_prefix_len(&pieces, p));

    let mut encoded = String::with_capacity(decoded.len() + 1);
    encoded.push('/');
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            if i <= prefix_len || is_structural(pieces[i - 1], piece) {
                encoded.push('/');
            } else {
                encoded.push_str("%2F");
            }
        }
        encoded.extend(percent_encode(piece, SEGMENT));
    }
    encoded
}

/// Number of leading pieces spelling out `prefix`, or 0 when it is absent.
fn leading_prefix_len(pieces: &[&[u8]], prefix: &str) -> usize {
    let wanted: Vec<&[u8]> = prefix
        .split('/')
        .filter(|p| !p.is_empty())
        .map(str::as_bytes)
        .collect();
    if wanted.is_empty() || pieces.len() <= wanted.len() || pieces[..wanted.len()] != wanted[..] {
        return 0;
    }
    wanted.len()
}

fn is_structural(before: &[u8], after: &[u8]) -> bool {
    OPENING_KEYWORDS.iter().any(|k| k.as_bytes() == before)
        || CLOSING_KEYWORDS.iter().any(|k| after.starts_with(k.as_bytes()))
}

/// Escape one segment completely, separators included.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Decode a raw request path once, as an embedding server would.
pub fn decode_path(raw: &str) -> Vec<u8> {
    percent_decode_str(raw).collect()
}

/// Canonical address of a document: `/bags/<bag>/tiddlers/<title>`.
pub fn document_path(bag: &str, title: &str) -> String {
    format!("/bags/{}/tiddlers/{}", encode_segment(bag), encode_segment(title))
}
