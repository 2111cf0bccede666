//! Percent-encoding for identifiers interpolated into API paths.
//!
//! Job ids are opaque server-issued strings. They are hex today, but nothing
//! guarantees it, so every id passes through [`encode_path_segment`] before it
//! becomes part of a URL path.
//!
//! ```
//! use sumo_client::endpoints::url_encoding::encode_path_segment;
//!
//! assert_eq!(encode_path_segment("750D3ABE4460BA73"), "750D3ABE4460BA73");
//! assert_eq!(encode_path_segment("a/b"), "a%2Fb");
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters is encoded.
pub const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string for safe use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}
