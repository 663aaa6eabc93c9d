//! Call-log record parsing.
//!
//! Record lines look like
//! `M:<callerType>:<callerName>(<args>)XY<calleeType>:<calleeName>(<args>)`
//! where `XY` is a two-character call-kind separator. java-callgraph writes
//! the separator as ` (K)`; that form is accepted too and yields `K`.

use crate::domain::method::Method;
use crate::error::{ReachError, Result};

/// Marker every call record line starts with.
pub const RECORD_MARKER: &str = "M:";

/// Width of the compact call-kind separator.
const SEPARATOR_LEN: usize = 2;

/// One directed edge parsed from a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub caller: Method,
    pub callee: Method,
    /// Kept verbatim; the analysis never interprets it.
    pub call_kind: String,
}

/// Parse one log line.
///
/// Lines without the record marker yield `Ok(None)`. A marked line whose
/// methods do not follow the grammar is a `MalformedRecord` error.
pub fn parse_record(line: &str, line_no: usize) -> Result<Option<CallRecord>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(RECORD_MARKER) else {
        return Ok(None);
    };
    let malformed = || ReachError::MalformedRecord {
        line_no,
        line: line.to_string(),
    };

    let (caller, caller_end) = Method::parse_prefix(rest).ok_or_else(malformed)?;
    let after_caller = &rest[caller_end..];
    let (call_kind, callee_text) = split_call_kind(after_caller).ok_or_else(malformed)?;
    let (callee, _) = Method::parse_prefix(callee_text).ok_or_else(malformed)?;

    Ok(Some(CallRecord {
        caller,
        callee,
        call_kind: call_kind.to_string(),
    }))
}

/// Split the separator off the text following the caller.
fn split_call_kind(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    // java-callgraph: " (M)"
    if bytes.len() > 4 && bytes[0] == b' ' && bytes[1] == b'(' && bytes[3] == b')' && bytes[2].is_ascii() {
        return Some((&text[2..3], &text[4..]));
    }
    let split = text.char_indices().nth(SEPARATOR_LEN).map(|(i, _)| i)?;
    Some((&text[..split], &text[split..]))
}
