//! Parser warnings routed through `tracing`.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the parser and loader to report input that is accepted but lossy.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about lossy or unusual input (emitted once per unique message)
///
/// # Example
/// ```
/// use arbor_common::warning::warn_once;
///
/// warn_once("XML", "duplicate attribute 'id' on <item>");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Clear all recorded warnings (call before parsing an unrelated document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
