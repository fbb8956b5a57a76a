//! Dependency graph over named schemas, SCCs, and the emission order.
//!
//! Edge `A → B` means "the body of A contains a reference to B". Cyclic
//! groups (non-trivial SCCs, self-loops included) are ordered as one unit and
//! every reference among their members is emitted lazily.
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use crate::diagnostics::CompileError;
use crate::ir::SchemaRegistry;

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,      // node index == declaration index
    index: HashMap<String, usize>,
    component_of: Vec<usize>,
    components: Vec<Component>,
    order: Vec<usize>,
}

#[derive(Debug, Clone)]
struct Component {
    members: Vec<usize>,             // declaration order
    cyclic: bool,
}

impl DependencyGraph {
    pub fn build(registry: &SchemaRegistry) -> Result<Self, CompileError> {
        let mut graph = DiGraph::<String, ()>::with_capacity(registry.len(), 0);
        for name in registry.keys() {
            graph.add_node(name.clone());
        }

        for (from, (name, body)) in registry.iter().enumerate() {
            let mut targets = BTreeSet::new();
            let mut missing = None;
            body.for_each_reference(&mut |pointer| {
                match registry.get_index_of(pointer) {
                    Some(to) => { targets.insert(to); }
                    None => { missing.get_or_insert_with(|| pointer.to_string()); }
                }
            });
            if let Some(pointer) = missing {
                return Err(CompileError::UnresolvedReference { schema: name.clone(), pointer });
            }
            for to in targets {
                graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
            }
        }

        let mut components: Vec<Component> = tarjan_scc(&graph)
            .into_iter()
            .map(|scc| {
                let mut members: Vec<usize> = scc.iter().map(|n| n.index()).collect();
                members.sort_unstable();
                let cyclic = members.len() > 1 || {
                    let n = NodeIndex::new(members[0]);
                    graph.contains_edge(n, n)
                };
                Component { members, cyclic }
            })
            .collect();
        // stable component ids, independent of Tarjan's visiting order
        components.sort_by_key(|c| c.members[0]);

        let mut component_of = vec![0; registry.len()];
        for (id, c) in components.iter().enumerate() {
            for &m in &c.members {
                component_of[m] = id;
            }
        }

        let order = emission_order(&graph, &components, &component_of);
        tracing::debug!(
            schemas = registry.len(),
            cyclic_groups = components.iter().filter(|c| c.cyclic).count(),
            "dependency graph built"
        );
        let index = registry.keys().enumerate().map(|(i, k)| (k.clone(), i)).collect();
        Ok(Self { graph, index, component_of, components, order })
    }

    /// Every schema, dependencies before dependents.
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|&i| self.graph[NodeIndex::new(i)].as_str())
    }

    /// Non-trivial SCCs, each in declaration order.
    pub fn circular_groups(&self) -> Vec<Vec<&str>> {
        self.components
            .iter()
            .filter(|c| c.cyclic)
            .map(|c| c.members.iter().map(|&i| self.graph[NodeIndex::new(i)].as_str()).collect())
            .collect()
    }

    pub fn is_cyclic(&self, name: &str) -> bool {
        self.index_of(name).is_some_and(|i| self.components[self.component_of[i]].cyclic)
    }

    /// A reference from `from` to `to` must be deferred.
    pub fn is_self_referential(&self, from: &str, to: &str) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) => {
                let c = self.component_of[a];
                c == self.component_of[b] && self.components[c].cyclic
            }
            _ => false,
        }
    }

    /// Direct dependencies of `name`, in declaration order.
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(i) = self.index_of(name) else { return Vec::new() };
        let mut deps: Vec<usize> = self.graph.neighbors(NodeIndex::new(i)).map(|n| n.index()).collect();
        deps.sort_unstable();
        deps.into_iter().map(|d| self.graph[NodeIndex::new(d)].as_str()).collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Kahn's algorithm over the condensation. A component becomes ready once all
/// components it depends on are emitted; ties go to the smallest declaration
/// index.
fn emission_order(graph: &DiGraph<String, ()>, components: &[Component], component_of: &[usize]) -> Vec<usize> {
    let n = components.len();
    let mut pending = vec![0usize; n];              // unemitted dependency components
    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];

    for edge in graph.raw_edges() {
        let from = component_of[edge.source().index()];
        let to = component_of[edge.target().index()];
        if from != to && dependents[to].insert(from) {
            pending[from] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..n)
        .filter(|&c| pending[c] == 0)
        .map(|c| Reverse((components[c].members[0], c)))
        .collect();

    let mut order = Vec::with_capacity(component_of.len());
    while let Some(Reverse((_, c))) = ready.pop() {
        order.extend_from_slice(&components[c].members);
        for &d in &dependents[c] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.push(Reverse((components[d].members[0], d)));
            }
        }
    }
    order
}
