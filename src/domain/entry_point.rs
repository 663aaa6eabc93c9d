//! Unit-Test Entry Point Detection
//!
//! Picks the callers of a call graph that are unit tests, either by naming
//! convention or by matching a test list reported by the build.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::callgraph::CallGraph;
use crate::domain::method::Method;

/// Suffix of parameterized test names in surefire reports, e.g. `(String)[2]`.
static PARAMETERIZED_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([\w\s,]+\)\[\d+\]$").expect("parameterized suffix pattern is a valid regex")
});

/// Naming convention identifying unit-test methods.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestNaming {
    /// Required suffix of the declaring type, e.g. `Test`
    pub class_suffix: String,
    /// Required prefix of the method name, e.g. `test`
    pub method_prefix: String,
}

impl Default for TestNaming {
    fn default() -> Self {
        Self {
            class_suffix: "Test".to_string(),
            method_prefix: "test".to_string(),
        }
    }
}

impl TestNaming {
    pub fn is_unit_test(&self, method: &Method) -> bool {
        method.declaring_type().ends_with(&self.class_suffix)
            && method.name().starts_with(&self.method_prefix)
    }

    /// All graph callers following the convention, in canonical order.
    pub fn select(&self, graph: &CallGraph) -> Vec<Method> {
        let selected: Vec<Method> = graph
            .callers()
            .filter(|m| self.is_unit_test(m))
            .cloned()
            .collect();
        info!(
            selected = selected.len(),
            callers = graph.caller_count(),
            suffix = %self.class_suffix,
            prefix = %self.method_prefix,
            "unit tests selected by naming convention"
        );
        selected
    }
}

/// Result of matching an externally supplied test list against a graph.
#[derive(Debug, Clone, Default)]
pub struct ListSelection {
    pub tests: Vec<Method>,
    /// Listed identifiers with no caller in the graph
    pub unmatched: Vec<String>,
}

/// Normalize a surefire identifier `pkg.Class#method(args)[n]` to `pkg.Class#method`.
pub fn strip_parameterized_suffix(test_id: &str) -> String {
    PARAMETERIZED_SUFFIX.replace(test_id.trim(), "").into_owned()
}

/// Select graph callers named by `pkg.Class#method` identifiers.
///
/// Overloads share an identifier, so every caller with a matching
/// `declaring_type#name` is selected.
pub fn select_from_list(graph: &CallGraph, test_ids: &[String]) -> ListSelection {
    let wanted: HashSet<String> = test_ids.iter().map(|id| strip_parameterized_suffix(id)).collect();
    let mut matched: HashSet<String> = HashSet::new();
    let mut tests = Vec::new();

    for caller in graph.callers() {
        let key = format!("{}#{}", caller.declaring_type(), caller.name());
        if wanted.contains(&key) {
            tests.push(caller.clone());
            matched.insert(key);
        }
    }

    let mut unmatched: Vec<String> = wanted.difference(&matched).cloned().collect();
    unmatched.sort();
    for id in &unmatched {
        debug!(test = %id, "listed test has no recorded calls");
    }
    info!(
        selected = tests.len(),
        unmatched = unmatched.len(),
        "unit tests selected from test list"
    );
    ListSelection { tests, unmatched }
}
