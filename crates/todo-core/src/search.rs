//! Search parameter vocabulary.
//!
//! The names below are the only keys the search endpoint understands. The
//! store turns them into typed filters; the HTTP layer uses
//! [`SEARCH_DEFAULTS`] to fill in whatever the client left out.

use std::collections::HashMap;

/// Exact match on the primary key.
pub const ID: &str = "id";
/// Exact match on the status label.
pub const STATUS: &str = "status";
/// Lower bound (inclusive) on `addedOn`.
pub const ADDED_ON_FROM: &str = "addedOnFrom";
/// Upper bound (inclusive) on `addedOn`.
pub const ADDED_ON_TO: &str = "addedOnTo";
/// Lower bound (inclusive) on `dueBy`.
pub const DUE_BY_FROM: &str = "dueByFrom";
/// Upper bound (inclusive) on `dueBy`.
pub const DUE_BY_TO: &str = "dueByTo";
/// Zero-indexed page number.
pub const PAGE: &str = "page";
/// Page size.
pub const PER_PAGE: &str = "perPage";

/// Upper bound used when a client gives no `*To` bound.
pub const MAX_TIMESTAMP: &str = "9999999999999";

/// Lower bound used when a client gives no `*From` bound.
pub const MIN_TIMESTAMP: &str = "-1";

/// Default value per supported key. An empty default means "omit the key
/// unless the client supplied a non-empty value".
pub const SEARCH_DEFAULTS: [(&str, &str); 8] = [
    (PAGE, "0"),
    (PER_PAGE, "10"),
    (DUE_BY_FROM, MIN_TIMESTAMP),
    (ADDED_ON_FROM, MIN_TIMESTAMP),
    (DUE_BY_TO, MAX_TIMESTAMP),
    (ADDED_ON_TO, MAX_TIMESTAMP),
    (ID, ""),
    (STATUS, ""),
];

/// Whether `key` is one of the recognized search keys.
pub fn is_supported(key: &str) -> bool {
    SEARCH_DEFAULTS.iter().any(|(k, _)| *k == key)
}

/// Fill missing search keys with their defaults.
///
/// An empty value counts as missing. Non-empty client values are kept as-is
/// (including unknown keys, which the store ignores). A key with an empty
/// default is dropped unless the client gave it a non-empty value.
pub fn with_defaults(mut params: HashMap<String, String>) -> HashMap<String, String> {
    for (key, default) in SEARCH_DEFAULTS {
        if params.get(key).is_none_or(String::is_empty) {
            if default.is_empty() {
                let _ = params.remove(key);
            } else {
                let _ = params.insert(key.to_string(), default.to_string());
            }
        }
    }
    params
}
