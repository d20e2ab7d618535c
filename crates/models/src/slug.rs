//! URL-safe tokens derived from display names.

/// Derive a slug from `name`.
///
/// ASCII letters and digits are kept (lowercased); every run of anything
/// else collapses to a single `-`, and leading/trailing separators are
/// dropped. The result only depends on `name`, and applying it to its own
/// output returns the same string.
///
/// ```
/// assert_eq!(models::slug::slugify("Red Mug"), "red-mug");
/// assert_eq!(models::slug::slugify("  Tea & Coffee -- Set!"), "tea-coffee-set");
/// ```
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
