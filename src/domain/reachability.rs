//! Reachability from unit tests.
//!
//! For each test root, walks the call graph and records every in-project
//! method it reaches together with the depth it was first discovered at.

use std::collections::{btree_set, HashSet, VecDeque};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::call_entry::{CallEntry, CallEntryIndex};
use crate::domain::callgraph::CallGraph;
use crate::domain::method::Method;

/// How depth is assigned when a method is reachable along several paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalStrategy {
    /// Pre-order DFS; the first path to reach a method fixes its level.
    #[default]
    DepthFirst,
    /// BFS; every method is recorded at its minimum depth.
    ShortestDepth,
}

#[derive(Debug, Clone, Default)]
pub struct TraversalConfig {
    /// Methods whose declaring type lacks this prefix are out of project.
    pub project_prefix: String,
    pub strategy: TraversalStrategy,
}

pub struct ReachabilityEngine<'g> {
    graph: &'g CallGraph,
    config: TraversalConfig,
}

/// One pending node: the callees left to visit and the level they get.
struct Frame<'g> {
    callees: btree_set::Iter<'g, Method>,
    level: usize,
}

impl<'g> ReachabilityEngine<'g> {
    pub fn new(graph: &'g CallGraph, config: TraversalConfig) -> Self {
        Self { graph, config }
    }

    fn in_project(&self, method: &Method) -> bool {
        method.declaring_type().starts_with(&self.config.project_prefix)
    }

    /// Reachable methods of one root, in discovery order.
    pub fn entries_for(&self, root: &Method) -> Vec<CallEntry> {
        match self.config.strategy {
            TraversalStrategy::DepthFirst => self.depth_first(root),
            TraversalStrategy::ShortestDepth => self.shortest_depth(root),
        }
    }

    fn depth_first(&self, root: &Method) -> Vec<CallEntry> {
        let mut entries = Vec::new();
        let mut visited: HashSet<&'g Method> = HashSet::new();
        let mut stack: Vec<Frame<'g>> = Vec::new();

        if let Some(callees) = self.graph.callees(root) {
            stack.push(Frame { callees: callees.iter(), level: 1 });
        }

        while let Some(frame) = stack.last_mut() {
            let level = frame.level;
            let Some(callee) = frame.callees.next() else {
                stack.pop();
                continue;
            };
            if visited.contains(callee) || !self.in_project(callee) {
                continue;
            }
            visited.insert(callee);
            entries.push(CallEntry { callee: callee.clone(), level });
            if let Some(next) = self.graph.callees(callee) {
                stack.push(Frame { callees: next.iter(), level: level + 1 });
            }
        }
        entries
    }

    fn shortest_depth(&self, root: &Method) -> Vec<CallEntry> {
        let mut entries = Vec::new();
        let mut visited: HashSet<&'g Method> = HashSet::new();
        let mut queue: VecDeque<(&Method, usize)> = VecDeque::from([(root, 1)]);

        while let Some((node, level)) = queue.pop_front() {
            let Some(callees) = self.graph.callees(node) else {
                continue;
            };
            for callee in callees {
                if visited.contains(callee) || !self.in_project(callee) {
                    continue;
                }
                visited.insert(callee);
                entries.push(CallEntry { callee: callee.clone(), level });
                queue.push_back((callee, level + 1));
            }
        }
        entries
    }

    /// Run the traversal for every root.
    pub fn build_index(&self, roots: &[Method]) -> CallEntryIndex {
        let mut index = CallEntryIndex::new();
        for root in roots {
            let entries = self.entries_for(root);
            debug!(root = %root, reached = entries.len(), "traversed test");
            index.insert(root.clone(), entries);
        }
        info!(
            tests = index.len(),
            entries = index.total_entries(),
            prefix = %self.config.project_prefix,
            strategy = ?self.config.strategy,
            "call entries computed"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(s: &str) -> Method {
        s.parse().unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> CallGraph {
        edges.iter().map(|(a, b)| (m(a), m(b))).collect()
    }

    fn engine<'a>(graph: &'a CallGraph, prefix: &str, strategy: TraversalStrategy) -> ReachabilityEngine<'a> {
        ReachabilityEngine::new(
            graph,
            TraversalConfig {
                project_prefix: prefix.to_string(),
                strategy,
            },
        )
    }

    fn pairs(entries: &[CallEntry]) -> Vec<(String, usize)> {
        entries.iter().map(|e| (e.callee.to_string(), e.level)).collect()
    }

    /// Straightforward recursive walk the explicit stack must agree with.
    fn recursive(graph: &CallGraph, node: &Method, depth: usize, prefix: &str, out: &mut Vec<CallEntry>) {
        let Some(callees) = graph.callees(node) else {
            return;
        };
        for callee in callees {
            if out.iter().any(|e| &e.callee == callee) {
                continue;
            }
            if !callee.declaring_type().starts_with(prefix) {
                continue;
            }
            out.push(CallEntry { callee: callee.clone(), level: depth });
            recursive(graph, callee, depth + 1, prefix, out);
        }
    }

    #[test]
    fn test_cycle_is_suppressed() {
        let g = graph(&[("T:test()", "A:m()"), ("A:m()", "B:n()"), ("B:n()", "A:m()")]);
        let entries = engine(&g, "", TraversalStrategy::DepthFirst).entries_for(&m("T:test()"));
        assert_eq!(pairs(&entries), [("A:m()".to_string(), 1), ("B:n()".to_string(), 2)]);
    }

    #[test]
    fn test_first_discovery_wins_over_shallower_path() {
        // A:a() sorts first, so C:c() is found at level 3 before its direct edge
        let g = graph(&[
            ("T:test()", "A:a()"),
            ("T:test()", "C:c()"),
            ("A:a()", "B:b()"),
            ("B:b()", "C:c()"),
        ]);
        let dfs = engine(&g, "", TraversalStrategy::DepthFirst).entries_for(&m("T:test()"));
        assert_eq!(
            pairs(&dfs),
            [("A:a()".to_string(), 1), ("B:b()".to_string(), 2), ("C:c()".to_string(), 3)]
        );
        let bfs = engine(&g, "", TraversalStrategy::ShortestDepth).entries_for(&m("T:test()"));
        assert_eq!(
            pairs(&bfs),
            [("A:a()".to_string(), 1), ("C:c()".to_string(), 1), ("B:b()".to_string(), 2)]
        );
    }

    #[test]
    fn test_prefix_filter_stops_descent() {
        let g = graph(&[
            ("org.acme.FooTest:testRun()", "org.acme.Foo:run()"),
            ("org.acme.FooTest:testRun()", "java.util.List:size()"),
            ("java.util.List:size()", "org.acme.Hidden:call()"),
            ("org.acme.Foo:run()", "org.acme.Bar:go()"),
        ]);
        let entries = engine(&g, "org.acme.", TraversalStrategy::DepthFirst)
            .entries_for(&m("org.acme.FooTest:testRun()"));
        assert_eq!(
            pairs(&entries),
            [("org.acme.Foo:run()".to_string(), 1), ("org.acme.Bar:go()".to_string(), 2)]
        );
    }

    #[test]
    fn test_root_without_calls_is_empty() {
        let g = graph(&[("A:a()", "B:b()")]);
        let index = engine(&g, "", TraversalStrategy::DepthFirst).build_index(&[m("T:lonely()")]);
        assert_eq!(index.get(&m("T:lonely()")), Some(&[][..]));
    }

    #[test]
    fn test_empty_roots_give_empty_index() {
        let g = graph(&[("T:test()", "A:a()")]);
        let index = engine(&g, "", TraversalStrategy::DepthFirst).build_index(&[]);
        assert!(index.is_empty());
    }

    fn arb_graph() -> impl Strategy<Value = Vec<(u8, u8)>> {
        proptest::collection::vec((0u8..12, 0u8..12), 0..60)
    }

    fn node(i: u8) -> Method {
        let ty = if i % 4 == 0 { "ext.Lib" } else { "p.N" };
        Method::new(format!("{ty}{i}"), "m", Vec::<String>::new())
    }

    proptest! {
        #[test]
        fn explicit_stack_matches_recursion(edges in arb_graph(), root in 0u8..12, scoped in any::<bool>()) {
            let g: CallGraph = edges.iter().map(|(a, b)| (node(*a), node(*b))).collect();
            let prefix = if scoped { "p." } else { "" };
            let root = node(root);
            let mut expected = Vec::new();
            recursive(&g, &root, 1, prefix, &mut expected);
            let actual = engine(&g, prefix, TraversalStrategy::DepthFirst).entries_for(&root);
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn entries_are_unique_and_levels_valid(edges in arb_graph(), root in 0u8..12) {
            let g: CallGraph = edges.iter().map(|(a, b)| (node(*a), node(*b))).collect();
            let root = node(root);
            for strategy in [TraversalStrategy::DepthFirst, TraversalStrategy::ShortestDepth] {
                let entries = engine(&g, "", strategy).entries_for(&root);
                let distinct: HashSet<&Method> = entries.iter().map(|e| &e.callee).collect();
                prop_assert_eq!(distinct.len(), entries.len());
                prop_assert!(entries.iter().all(|e| e.level >= 1));
                let direct = g.callees(&root);
                for e in &entries {
                    let is_direct = direct.is_some_and(|d| d.contains(&e.callee));
                    // level 1 is only ever assigned to direct callees
                    if e.level == 1 {
                        prop_assert!(is_direct);
                    }
                    if is_direct && strategy == TraversalStrategy::ShortestDepth {
                        prop_assert_eq!(e.level, 1);
                    }
                }
                if let Some(first) = direct.and_then(|d| d.iter().next()) {
                    prop_assert_eq!(entries.first().map(|e| (&e.callee, e.level)), Some((first, 1)));
                }
            }
        }
    }
}
