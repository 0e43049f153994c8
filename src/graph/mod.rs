pub mod edge;
pub mod node;

use std::collections::{HashMap, HashSet};

use edge::{Edge, EdgeKind};
use node::{Entity, EntityKind};

use crate::extract::{CallObservation, EntityObservation, FileObservations};

/// The final deduplicated call/reference graph.
///
/// Invariants:
/// - exactly one node per `(id, kind)` pair, all observed provenance ranges
///   preserved in first-seen order;
/// - exactly one edge per `(source, target, kind)` triple;
/// - every node's id appears as the source or target of at least one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub nodes: Vec<Entity>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Node count broken down by entity kind.
    pub fn nodes_by_kind(&self) -> HashMap<EntityKind, usize> {
        let mut map: HashMap<EntityKind, usize> = HashMap::new();
        for n in &self.nodes {
            *map.entry(n.kind).or_insert(0) += 1;
        }
        map
    }

    /// Edge count broken down by edge kind.
    pub fn edges_by_kind(&self) -> HashMap<EdgeKind, usize> {
        let mut map: HashMap<EdgeKind, usize> = HashMap::new();
        for e in &self.edges {
            *map.entry(e.kind).or_insert(0) += 1;
        }
        map
    }
}

/// Accumulates per-file observations and resolves them into a [`Graph`].
///
/// An explicit accumulator value rather than shared mutable state: per-file
/// extraction can run in parallel, and feeding results in here in file-scan
/// order keeps provenance concatenation deterministic. The builder only
/// merges and filters — it never invents identities.
pub struct GraphBuilder {
    /// Deduplicated entities in first-seen order.
    entities: Vec<Entity>,
    /// `(id, kind)` -> index into `entities`.
    entity_index: HashMap<(String, EntityKind), usize>,
    /// Bare local name -> indices of every entity bearing that name.
    name_index: HashMap<String, Vec<usize>>,
    /// Raw call observations, resolved against `name_index` at finish time.
    calls: Vec<CallObservation>,
    /// Import edges in observation order.
    import_edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            entity_index: HashMap::new(),
            name_index: HashMap::new(),
            calls: Vec::new(),
            import_edges: Vec::new(),
        }
    }

    /// Fold one file's observations into the accumulator.
    pub fn add_file(&mut self, obs: FileObservations) {
        for entity in obs.entities {
            self.observe_entity(entity);
        }
        self.calls.extend(obs.calls);
        self.import_edges.extend(obs.edges);
    }

    /// Merge one entity observation. A repeat of a known `(id, kind)` pair
    /// only appends provenance; the first observation stays the
    /// representative.
    fn observe_entity(&mut self, obs: EntityObservation) {
        let key = (obs.id.clone(), obs.kind);
        if let Some(&idx) = self.entity_index.get(&key) {
            if let Some(range) = obs.range {
                self.entities[idx].lines.push(range);
            }
            return;
        }

        let idx = self.entities.len();
        self.name_index.entry(obs.name.clone()).or_default().push(idx);
        self.entities.push(Entity {
            id: obs.id,
            name: obs.name,
            label: obs.label,
            kind: obs.kind,
            lines: obs.range.into_iter().collect(),
        });
        self.entity_index.insert(key, idx);
    }

    /// Resolve calls, deduplicate edges, and restrict nodes to those touched
    /// by at least one edge.
    pub fn finish(self) -> Graph {
        let GraphBuilder {
            entities,
            name_index,
            calls,
            import_edges,
            ..
        } = self;

        // Resolve each call observation against every entity sharing the
        // callee's local name, across all files. A callee declared in
        // several files fans out to one edge per declaration; an unmatched
        // callee keeps its bare name as the target.
        let mut edges = import_edges;
        for call in calls {
            match name_index.get(&call.callee) {
                Some(indices) => {
                    for &idx in indices {
                        edges.push(Edge {
                            source: call.caller.clone(),
                            target: entities[idx].id.clone(),
                            kind: EdgeKind::Calls,
                            detail: Some(call.args.clone()),
                        });
                    }
                }
                None => edges.push(Edge {
                    source: call.caller,
                    target: call.callee,
                    kind: EdgeKind::Calls,
                    detail: Some(call.args),
                }),
            }
        }

        // One edge per (source, target, kind); later duplicates are dropped
        // entirely, their detail included.
        let mut seen: HashSet<(String, String, EdgeKind)> = HashSet::new();
        let mut final_edges: Vec<Edge> = Vec::new();
        for e in edges {
            if seen.insert((e.source.clone(), e.target.clone(), e.kind)) {
                final_edges.push(e);
            }
        }

        // Referenced-only filter: keep exactly the entities whose id is an
        // endpoint of a surviving edge.
        let referenced: HashSet<&str> = final_edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        let nodes: Vec<Entity> = entities
            .into_iter()
            .filter(|n| referenced.contains(n.id.as_str()))
            .collect();

        Graph {
            nodes,
            edges: final_edges,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::LineRange;

    fn entity(id: &str, name: &str, kind: EntityKind, range: Option<(usize, usize)>) -> EntityObservation {
        EntityObservation {
            id: id.into(),
            name: name.into(),
            label: name.into(),
            kind,
            range: range.map(|(start, end)| LineRange { start, end }),
        }
    }

    fn call(caller: &str, callee: &str) -> CallObservation {
        CallObservation {
            caller: caller.into(),
            callee: callee.into(),
            args: "()".into(),
        }
    }

    fn single_file(entities: Vec<EntityObservation>, calls: Vec<CallObservation>) -> Graph {
        let mut builder = GraphBuilder::new();
        builder.add_file(FileObservations {
            entities,
            calls,
            edges: vec![],
        });
        builder.finish()
    }

    #[test]
    fn test_caller_callee_scenario() {
        // `function a(){ b(); } function b(){}` in one file.
        let graph = single_file(
            vec![
                entity("file:a", "a", EntityKind::Function, Some((1, 1))),
                entity("file:b", "b", EntityKind::Function, Some((2, 2))),
            ],
            vec![call("file:a", "b")],
        );

        assert_eq!(graph.edges.len(), 1);
        let e = &graph.edges[0];
        assert_eq!((e.source.as_str(), e.target.as_str()), ("file:a", "file:b"));
        assert_eq!(e.kind, EdgeKind::Calls);

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["file:a", "file:b"], "both survive the filter");
    }

    #[test]
    fn test_isolated_entity_is_dropped() {
        let graph = single_file(
            vec![entity("file:isolated", "isolated", EntityKind::Function, Some((1, 1)))],
            vec![],
        );
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_provenance_accumulates_in_first_seen_order() {
        let graph = single_file(
            vec![
                entity("file:f", "f", EntityKind::Function, Some((1, 3))),
                entity("file:f", "f", EntityKind::Function, Some((10, 12))),
                entity("file:f", "f", EntityKind::Function, Some((20, 25))),
            ],
            vec![call("global", "f")],
        );
        let node = graph.nodes.iter().find(|n| n.id == "file:f").expect("f");
        assert_eq!(node.lines_rendering(), "1-3,10-12,20-25");
    }

    #[test]
    fn test_merge_keeps_missing_provenance_empty() {
        let graph = single_file(
            vec![
                entity("libX", "libX", EntityKind::Library, None),
                entity("libX", "libX", EntityKind::Library, None),
            ],
            vec![call("global", "libX")],
        );
        let node = graph.nodes.iter().find(|n| n.id == "libX").expect("libX");
        assert!(node.lines.is_empty(), "no empty ranges injected");
    }

    #[test]
    fn test_same_id_different_kind_stay_distinct() {
        let graph = single_file(
            vec![
                entity("file:x", "x", EntityKind::Function, Some((1, 1))),
                entity("file:x", "x", EntityKind::Class, Some((5, 9))),
            ],
            vec![call("global", "x")],
        );
        assert_eq!(graph.nodes.len(), 2, "dedup key is (id, kind)");
    }

    #[test]
    fn test_edge_dedup_keeps_first_detail() {
        let mut builder = GraphBuilder::new();
        builder.add_file(FileObservations {
            entities: vec![entity("file:b", "b", EntityKind::Function, Some((1, 1)))],
            calls: vec![
                CallObservation {
                    caller: "file:a".into(),
                    callee: "b".into(),
                    args: "(1)".into(),
                },
                CallObservation {
                    caller: "file:a".into(),
                    callee: "b".into(),
                    args: "(2)".into(),
                },
            ],
            edges: vec![],
        });
        let graph = builder.finish();
        assert_eq!(graph.edges.len(), 1, "repeat calls collapse to one edge");
        assert_eq!(graph.edges[0].detail.as_deref(), Some("(1)"));
    }

    #[test]
    fn test_edge_uniqueness_invariant() {
        let graph = single_file(
            vec![
                entity("file:a", "a", EntityKind::Function, Some((1, 1))),
                entity("file:b", "b", EntityKind::Function, Some((2, 2))),
            ],
            vec![call("file:a", "b"), call("file:a", "b"), call("global", "b")],
        );
        let mut keys: Vec<_> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.kind.as_str()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total, "no duplicate (source, target, kind)");
    }

    #[test]
    fn test_callee_fans_out_across_files() {
        let mut builder = GraphBuilder::new();
        builder.add_file(FileObservations {
            entities: vec![entity("one.js:helper", "helper", EntityKind::Function, Some((1, 1)))],
            calls: vec![],
            edges: vec![],
        });
        builder.add_file(FileObservations {
            entities: vec![entity("two.js:helper", "helper", EntityKind::Function, Some((1, 1)))],
            calls: vec![],
            edges: vec![],
        });
        builder.add_file(FileObservations {
            entities: vec![entity("main.js:run", "run", EntityKind::Function, Some((1, 3)))],
            calls: vec![call("main.js:run", "helper")],
            edges: vec![],
        });
        let graph = builder.finish();

        let targets: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == "main.js:run")
            .map(|e| e.target.as_str())
            .collect();
        assert_eq!(targets, vec!["one.js:helper", "two.js:helper"]);
    }

    #[test]
    fn test_unmatched_callee_keeps_bare_name() {
        let graph = single_file(
            vec![entity("file:a", "a", EntityKind::Function, Some((1, 1)))],
            vec![call("file:a", "parseInt")],
        );
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].target, "parseInt");
        // The bare name has no entity, so only the caller node survives.
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["file:a"]);
    }

    #[test]
    fn test_import_scenario() {
        // `import { foo } from "libX"` — entities libX and libX/foo, one
        // imports edge. Only the referenced imported-method survives the
        // node filter; the library has no incident edge.
        let mut builder = GraphBuilder::new();
        builder.add_file(FileObservations {
            entities: vec![
                entity("libX", "libX", EntityKind::Library, None),
                entity("libX/foo", "foo", EntityKind::ImportedMethod, Some((1, 1))),
            ],
            calls: vec![],
            edges: vec![Edge {
                source: "file.js".into(),
                target: "libX/foo".into(),
                kind: EdgeKind::Imports,
                detail: None,
            }],
        });
        let graph = builder.finish();

        assert_eq!(graph.edges.len(), 1);
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["libX/foo"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let build = || {
            single_file(
                vec![
                    entity("file:a", "a", EntityKind::Function, Some((1, 1))),
                    entity("file:b", "b", EntityKind::Function, Some((2, 2))),
                    entity("file:b", "b", EntityKind::Function, Some((8, 9))),
                ],
                vec![call("file:a", "b"), call("global", "missing")],
            )
        };
        assert_eq!(build(), build(), "same observations, same graph");
    }

    #[test]
    fn test_referenced_only_invariant() {
        let graph = single_file(
            vec![
                entity("file:a", "a", EntityKind::Function, Some((1, 1))),
                entity("file:b", "b", EntityKind::Function, Some((2, 2))),
                entity("file:unused", "unused", EntityKind::Function, Some((3, 3))),
            ],
            vec![call("file:a", "b")],
        );
        for node in &graph.nodes {
            assert!(
                graph
                    .edges
                    .iter()
                    .any(|e| e.source == node.id || e.target == node.id),
                "{} has no incident edge",
                node.id
            );
        }
        assert!(!graph.nodes.iter().any(|n| n.id == "file:unused"));
    }
}
