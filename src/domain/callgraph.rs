// Call graph structures for testreach.
// Maps every caller seen in a call log to the distinct methods it invokes.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::domain::method::Method;
use crate::domain::record::{parse_record, CallRecord};
use crate::error::{ReachError, Result};

/// Caller -> distinct callees.
///
/// Ordered containers keep callee iteration, and therefore traversal output,
/// reproducible across runs on the same log.
#[derive(Debug, Default, Clone)]
pub struct CallGraph {
    edges: BTreeMap<Method, BTreeSet<Method>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a call log, one line at a time.
    ///
    /// Lines are read as raw bytes; a line that is not valid UTF-8 is reported
    /// as a malformed record with its line number.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut graph = CallGraph::new();
        let mut buf = Vec::new();
        let mut lines = 0usize;
        let mut records = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lines += 1;
            let line = std::str::from_utf8(&buf).map_err(|_| ReachError::MalformedRecord {
                line_no: lines,
                line: String::from_utf8_lossy(&buf).trim_end_matches(['\r', '\n']).to_string(),
            })?;
            if let Some(record) = parse_record(line, lines)? {
                records += 1;
                graph.add_record(record);
            }
        }

        if graph.is_empty() {
            warn!(lines, "call log holds no call records");
        }
        debug!(lines, records, "call log consumed");
        info!(
            callers = graph.caller_count(),
            edges = graph.edge_count(),
            "call graph built"
        );
        Ok(graph)
    }

    pub fn add_record(&mut self, record: CallRecord) {
        self.add_edge(record.caller, record.callee);
    }

    pub fn add_edge(&mut self, caller: Method, callee: Method) {
        self.edges.entry(caller).or_default().insert(callee);
    }

    /// Callees of `caller`, or `None` when it never calls anything.
    pub fn callees(&self, caller: &Method) -> Option<&BTreeSet<Method>> {
        self.edges.get(caller)
    }

    pub fn callers(&self) -> impl Iterator<Item = &Method> {
        self.edges.keys()
    }

    pub fn caller_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl FromIterator<(Method, Method)> for CallGraph {
    fn from_iter<I: IntoIterator<Item = (Method, Method)>>(iter: I) -> Self {
        let mut graph = CallGraph::new();
        for (caller, callee) in iter {
            graph.add_edge(caller, callee);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = "\
C:org.acme.FooTest org.acme.Foo
M:org.acme.FooTest:testRun() (M)org.acme.Foo:run(int)
M:org.acme.FooTest:testRun() (M)org.acme.Foo:run(int)
M:org.acme.FooTest:testRun() (S)org.acme.Util:log(java.lang.String)
M:org.acme.Foo:run(int) (I)java.util.List:size()
";

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = CallGraph::from_reader(Cursor::new(LOG)).unwrap();
        let root: Method = "org.acme.FooTest:testRun()".parse().unwrap();
        let callees = graph.callees(&root).unwrap();
        assert_eq!(callees.len(), 2);
        assert_eq!(graph.caller_count(), 2);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_leaf_has_no_entry() {
        let graph = CallGraph::from_reader(Cursor::new(LOG)).unwrap();
        let leaf: Method = "java.util.List:size()".parse().unwrap();
        assert!(graph.callees(&leaf).is_none());
    }

    #[test]
    fn test_callee_order_is_canonical() {
        let graph = CallGraph::from_reader(Cursor::new(LOG)).unwrap();
        let root: Method = "org.acme.FooTest:testRun()".parse().unwrap();
        let order: Vec<&str> = graph.callees(&root).unwrap().iter().map(Method::canonical).collect();
        assert_eq!(order, ["org.acme.Foo:run(int)", "org.acme.Util:log(java.lang.String)"]);
    }

    #[test]
    fn test_malformed_line_aborts_with_line_number() {
        let log = "M:a.B:foo()CDa.C:bar()\nM:broken\n";
        let err = CallGraph::from_reader(Cursor::new(log)).unwrap_err();
        assert!(matches!(err, ReachError::MalformedRecord { line_no: 2, .. }));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let log: &[u8] = b"M:a.B:foo()CDa.C:bar()\nM:a.B:f\xff()CDa.C:bar()\n";
        match CallGraph::from_reader(Cursor::new(log)).unwrap_err() {
            ReachError::MalformedRecord { line_no, line } => {
                assert_eq!(line_no, 2);
                assert!(line.starts_with("M:a.B:f"));
                assert!(!line.ends_with('\n'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_log_without_records_is_empty() {
        let graph = CallGraph::from_reader(Cursor::new("C:a.B a.C\r\n\n")).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
