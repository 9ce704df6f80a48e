//! Ref name validation following git-style conventions.
//!
//! A valid branch name:
//! - is non-empty
//! - contains no whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - contains neither `..` nor `@{`
//! - does not start or end with `/`, does not end with `.` or `.lock`
//! - has no empty path component and no component starting with `.`
//!
//! A full ref name is either `HEAD` or `refs/<valid branch-style path>`.

use crate::error::{RefError, Result};
use crate::types::HEAD;

const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

fn violation(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("must not be empty".into());
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Some(format!("contains forbidden character {ch:?}"));
    }
    for seq in ["..", "@{"] {
        if name.contains(seq) {
            return Some(format!("must not contain {seq:?}"));
        }
    }
    if name.ends_with('.') || name.ends_with(".lock") {
        return Some("must not end with '.' or '.lock'".into());
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Some("must not have empty path components".into());
        }
        if component.starts_with('.') {
            return Some(format!("component {component:?} starts with '.'"));
        }
    }
    None
}

/// Validate a short branch name such as `main` or `survey/2013`.
///
/// ```
/// use geovc_refs::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("survey/2013").is_ok());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    match violation(name) {
        None => Ok(()),
        Some(reason) => Err(RefError::InvalidName {
            name: name.to_string(),
            reason,
        }),
    }
}

/// Validate a full ref name (`HEAD` or `refs/...`).
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name == HEAD {
        return Ok(());
    }
    let Some(rest) = name.strip_prefix("refs/") else {
        return Err(RefError::InvalidName {
            name: name.to_string(),
            reason: "must be HEAD or start with 'refs/'".into(),
        });
    };
    validate_branch_name(rest).map_err(|_| RefError::InvalidName {
        name: name.to_string(),
        reason: violation(rest).unwrap_or_default(),
    })
}
