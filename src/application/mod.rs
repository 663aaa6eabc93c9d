//! Analysis pipeline: call log -> call graph -> unit tests -> project prefix
//! -> call entries -> persisted artifacts.

use tracing::info;

use crate::config::ReachConfig;
use crate::domain::call_entry::CallEntryIndex;
use crate::domain::callgraph::CallGraph;
use crate::domain::entry_point::select_from_list;
use crate::domain::method::Method;
use crate::domain::reachability::ReachabilityEngine;
use crate::domain::scope::extract_project_prefix;
use crate::error::{ReachError, Result};
use crate::infrastructure::{
    load_test_list, open_call_log, Artifact, CacheStatus, MethodListCodec, SnapshotCodec,
};
use crate::ports::EntryIndexExporter;

/// Facts about one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub tests: usize,
    pub total_entries: usize,
    pub max_level: usize,
    pub snapshot: CacheStatus,
    /// Only known when the index was computed this run
    pub computed: Option<ComputeDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeDetails {
    pub callers: usize,
    pub edges: usize,
    pub unit_tests: CacheStatus,
    pub project_prefix: String,
    /// Listed tests absent from the call log
    pub unmatched_tests: usize,
}

pub struct AnalyzeUsecase<'a> {
    pub config: &'a ReachConfig,
    pub exporter: &'a dyn EntryIndexExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    fn unit_test_artifact(&self) -> Artifact<MethodListCodec> {
        Artifact::new(self.config.unit_test_cache_path(), MethodListCodec)
    }

    fn snapshot_artifact(&self) -> Artifact<SnapshotCodec> {
        Artifact::new(self.config.entry_snapshot_path(), SnapshotCodec)
    }

    /// Produce the call-entry index, reusing the snapshot when one exists.
    ///
    /// A computed index is exported before the snapshot is stored, so a
    /// failed export leaves no snapshot behind and the next run recomputes.
    pub fn run(&self) -> Result<(CallEntryIndex, AnalysisReport)> {
        let mut computed = None;
        let (index, snapshot) = self.snapshot_artifact().load_or_compute(|| {
            let (index, details) = self.compute()?;
            self.exporter.export(&index, &self.config.entry_json_path())?;
            computed = Some(details);
            Ok(index)
        })?;

        let report = AnalysisReport {
            tests: index.len(),
            total_entries: index.total_entries(),
            max_level: index.max_level(),
            snapshot,
            computed,
        };
        Ok((index, report))
    }

    /// Drop every cached artifact so the next run recomputes from the log.
    pub fn refresh(&self) -> Result<()> {
        self.unit_test_artifact().invalidate()?;
        self.snapshot_artifact().invalidate()
    }

    /// Rewrite the JSON document from the stored snapshot.
    pub fn export(&self) -> Result<CallEntryIndex> {
        let snapshot = self.snapshot_artifact();
        let index = snapshot
            .load()?
            .ok_or_else(|| ReachError::MissingArtifact(snapshot.path().to_path_buf()))?;
        self.exporter.export(&index, &self.config.entry_json_path())?;
        Ok(index)
    }

    fn compute(&self) -> Result<(CallEntryIndex, ComputeDetails)> {
        let graph = CallGraph::from_reader(open_call_log(&self.config.call_log)?)?;

        let mut unmatched_tests = 0;
        let (tests, unit_tests) = self.unit_test_artifact().load_or_compute(|| {
            let (tests, unmatched) = self.select_tests(&graph)?;
            unmatched_tests = unmatched;
            Ok(tests)
        })?;

        let traversal = self.config.traversal_config(extract_project_prefix(&tests));
        info!(prefix = %traversal.project_prefix, tests = tests.len(), "project scope resolved");
        let project_prefix = traversal.project_prefix.clone();
        let index = ReachabilityEngine::new(&graph, traversal).build_index(&tests);

        let details = ComputeDetails {
            callers: graph.caller_count(),
            edges: graph.edge_count(),
            unit_tests,
            project_prefix,
            unmatched_tests,
        };
        Ok((index, details))
    }

    fn select_tests(&self, graph: &CallGraph) -> Result<(Vec<Method>, usize)> {
        match &self.config.test_list {
            Some(path) => {
                let ids = load_test_list(path)?;
                let selection = select_from_list(graph, &ids);
                Ok((selection.tests, selection.unmatched.len()))
            }
            None => Ok((self.config.naming.select(graph), 0)),
        }
    }
}
