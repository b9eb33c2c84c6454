use crate::timeline::{NodeId, Timeline, TimelineNode};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Input graph of one calculation pass: an edge `a -> b` means the range of
/// `b` is a function of the range of `a`. That covers both dependency edges
/// (predecessor -> task) and containment (child -> owning group).
pub struct TimelineDag {
    graph: DiGraph<NodeId, ()>,
    id_to_index: HashMap<NodeId, NodeIndex>,
}

impl TimelineDag {
    pub fn build(timeline: &Timeline) -> Self {
        let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut id_to_index: HashMap<NodeId, NodeIndex> = HashMap::new();

        // Add nodes first
        for id in timeline.node_ids() {
            let node_ix = graph.add_node(id);
            id_to_index.insert(id, node_ix);
        }

        // Add edges: input -> consumer
        for id in timeline.node_ids() {
            let Some(node) = timeline.node(id) else {
                continue;
            };
            let consumer = id_to_index[&id];
            match node {
                TimelineNode::Group(group) => {
                    for child in &group.children {
                        if let Some(&input) = id_to_index.get(child) {
                            graph.add_edge(input, consumer, ());
                        }
                    }
                }
                TimelineNode::Task(task) => {
                    for prev in &task.previous {
                        // Self-references are resolved without relaxation and
                        // would only turn the whole graph cyclic here.
                        if *prev == id {
                            continue;
                        }
                        if let Some(&input) = id_to_index.get(prev) {
                            graph.add_edge(input, consumer, ());
                        }
                    }
                }
            }
        }

        Self { graph, id_to_index }
    }

    pub fn is_cyclic(&self) -> bool {
        toposort(&self.graph, None).is_err()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Order for one relaxation sweep: topological when the graph is acyclic,
    /// so every node sees its inputs already resolved and a single sweep
    /// converges. With a cycle present there is no such order; insertion
    /// order is used and the iteration cap does the bounding.
    pub fn sweep_order(&self) -> Vec<NodeId> {
        match toposort(&self.graph, None) {
            Ok(order) => order.into_iter().map(|ix| self.graph[ix]).collect(),
            Err(_) => self.graph.node_indices().map(|ix| self.graph[ix]).collect(),
        }
    }
}
