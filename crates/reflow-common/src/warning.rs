//! Layout warnings with deduplication.
//!
//! Reflow runs the same subtree many times (resize, incremental updates,
//! shrink-to-fit correction passes), so an unsupported construct would
//! otherwise be reported once per pass. Each unique message is logged once.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings we've already emitted (to deduplicate).
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported construct (logged once per unique message).
///
/// Returns `true` if this call emitted the warning, `false` if it had
/// already been reported.
///
/// # Example
/// ```
/// use reflow_common::warning::warn_once;
///
/// let first = warn_once("Layout", "block-level box inside inline box");
/// let second = warn_once("Layout", "block-level box inside inline box");
/// assert!(first && !second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    // A poisoned set only means another thread panicked mid-insert; the
    // set itself is still usable.
    let should_log = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_log {
        log::warn!(target: "reflow", "[{component}] {message}");
    }
    should_log
}

/// Forget all recorded warnings (call when a new document is loaded).
pub fn clear_warnings() {
    let mut guard = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
