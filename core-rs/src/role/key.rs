/**
 * key.rs
 * Role key derivation
 *
 * A key is derived once from the human-readable name when a role is
 * created and never re-derived afterwards:
 * - lowercase
 * - every run of characters outside [a-z0-9] becomes a single '_';
 *   '_' itself counts as a separator, so "a__b" becomes "a_b"
 * - leading/trailing '_' are trimmed, so "_legacy_" becomes "legacy"
 *
 * "Sales Manager"   -> "sales_manager"
 * "  QA / Release " -> "qa_release"
 * "!!!"             -> ""  (rejected by the registry)
 */

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("separator pattern is a valid regex")
});

static VALID_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_]+$").expect("key pattern is a valid regex")
});

/// Derive a role key from a display name
///
/// # Arguments
/// * `name` - Human-readable role name
///
/// # Returns
/// Normalized key, possibly empty when the name has no usable characters
pub fn derive_key(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = SEPARATOR_RUN.replace_all(&lowered, "_");
    replaced.trim_matches('_').to_string()
}

/// Check whether a string is usable as a role key as-is
///
/// Imported documents carry their keys verbatim, so they are checked
/// against the key alphabet instead of being re-derived.
pub fn is_valid_key(key: &str) -> bool {
    VALID_KEY.is_match(key)
}
