//! Project scope: the longest common prefix of the test classes' names.

use tracing::warn;

use crate::domain::method::Method;

/// Longest string that prefixes every entry of `strs`.
///
/// Starts from the first entry and shortens it one character at a time until
/// it prefixes each following entry.
pub fn longest_common_prefix<S: AsRef<str>>(strs: &[S]) -> String {
    let Some((first, rest)) = strs.split_first() else {
        return String::new();
    };
    let mut prefix = first.as_ref().to_string();
    for s in rest {
        while !s.as_ref().starts_with(prefix.as_str()) {
            prefix.pop();
        }
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}

/// Prefix scoping traversal to in-project code.
pub fn extract_project_prefix(tests: &[Method]) -> String {
    if tests.is_empty() {
        warn!("no unit tests selected; check the test naming convention");
        return String::new();
    }
    let types: Vec<&str> = tests.iter().map(Method::declaring_type).collect();
    longest_common_prefix(&types)
}
