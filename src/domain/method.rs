//! Method identifiers as they appear in call-graph logs.
//!
//! A method is identified by `declaring_type:name(p1,p2,...)`. Every
//! comparison goes through that canonical string, so a callee parsed from one
//! log line equals the same method parsed as a caller from another.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ReachError;

static METHOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\[\]$.]+):([\w<>$]+)\(([\w.\[\]$,]*)\)")
        .expect("method pattern is a valid regex")
});

/// An immutable callable identifier.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Method {
    declaring_type: String,
    name: String,
    param_types: Vec<String>,
    canonical: String,
}

impl Method {
    pub fn new<T, N, P>(declaring_type: T, name: N, param_types: P) -> Self
    where
        T: Into<String>,
        N: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let declaring_type = declaring_type.into();
        let name = name.into();
        let mut param_types: Vec<String> = param_types.into_iter().map(Into::into).collect();
        // "()" splits into one empty parameter
        if param_types.len() == 1 && param_types[0].is_empty() {
            param_types.clear();
        }
        let canonical = format!("{}:{}({})", declaring_type, name, param_types.join(","));
        Self {
            declaring_type,
            name,
            param_types,
            canonical,
        }
    }

    /// Parse a method at the start of `text`.
    ///
    /// Returns the method and the number of bytes it spans, or `None` when the
    /// text does not start with a method.
    pub fn parse_prefix(text: &str) -> Option<(Method, usize)> {
        let caps = METHOD_PATTERN.captures(text)?;
        let end = caps.get(0)?.end();
        let method = Method::new(&caps[1], &caps[2], caps[3].split(','));
        Some((method, end))
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    /// The `type:name(args)` form all equality is based on.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl FromStr for Method {
    type Err = ReachError;

    /// Parse a whole canonical string; trailing text is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Method::parse_prefix(s) {
            Some((method, end)) if end == s.len() => Ok(method),
            _ => Err(ReachError::MalformedMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = ReachError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.canonical
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Method {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Method {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method({})", self.canonical)
    }
}
