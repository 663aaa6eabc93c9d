// Core model for testreach: methods, call graphs, test roots and reachability.

pub mod call_entry;
pub mod callgraph;
pub mod entry_point;
pub mod method;
pub mod reachability;
pub mod record;
pub mod scope;
