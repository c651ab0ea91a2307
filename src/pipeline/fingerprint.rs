//! Stable page identifiers derived from URL paths.
//!
//! A fingerprint is the lowercase hex MD5 of a URL's path (query included,
//! scheme and host stripped). Comment widgets compute the same digest in the
//! browser, so it is the join key between sitemap pages and thread issues.

use md5::{Digest, Md5};

use crate::utils::url::path_of;

/// Fingerprint of the page at `url`.
pub fn fingerprint(url: &str) -> String {
    fingerprint_path(&path_of(url))
}

/// Fingerprint of an already extracted path.
pub fn fingerprint_path(path: &str) -> String {
    hex::encode(Md5::digest(path.as_bytes()))
}
