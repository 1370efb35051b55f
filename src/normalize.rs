//! Parameter key normalization
//!
//! Every key the builders derive from provider data (stack outputs, stream
//! lookups) goes through [`normalize`]. The rule is:
//!
//! - every whitespace character and the *first* `.` become a `-` separator
//! - the string is split on `-`, empty segments are dropped
//! - each remaining segment gets its first character uppercased
//! - segments are joined with no delimiter
//!
//! Only the first dot is treated as a separator. `"a.b"` normalizes to `"AB"`
//! and `"a.b.c"` to `"AB.c"`, and existing generated configuration depends on
//! that.

/// Separator that whitespace and the first dot are folded into
const SEPARATOR: char = '-';

/// Converts an identifier into a PascalCase-like parameter key.
///
/// Total over any input: the empty string maps to the empty string.
///
/// # Example
///
/// ```
/// use gordon_config::normalize;
///
/// assert_eq!(normalize("db.host"), "DbHost");
/// assert_eq!(normalize("users-table-streamArn"), "UsersTableStreamArn");
/// ```
pub fn normalize(name: &str) -> String {
    let mut first_dot = true;
    name.split(|c: char| {
        c == SEPARATOR
            || c.is_whitespace()
            || (c == '.' && std::mem::replace(&mut first_dot, false))
    })
    .filter(|segment| !segment.is_empty())
    .map(capitalize)
    .collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
