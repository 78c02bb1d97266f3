use std::fmt;

use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;

pub mod graph_numeric;
pub mod graph_query;

/// A directed, optionally weighted graph built incrementally from edge records.
///
/// Vertices are the dense id range `[0, span)`. Each vertex owns its out-edge
/// list, kept sorted by target id so that lookups are a binary search and
/// iteration order does not depend on insertion order.
///
/// # Type Parameters
/// - `K`: Type for vertex ids (typically u32)
/// - `E`: Type for edge weights (typically f32)
///
/// # Invariants
/// - No `(source, target)` pair appears twice; inserting it again overwrites the weight.
/// - The span never shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct DiGraph<K, E> {
    /// Out-edges of every vertex, indexed by vertex id.
    adjacency: Vec<Vec<(K, E)>>,

    /// Total number of stored edges (self-loops count once).
    edge_count: usize,
}

impl<K, E> Default for DiGraph<K, E> {
    fn default() -> Self {
        Self {
            adjacency: Vec::new(),
            edge_count: 0,
        }
    }
}

impl<K, E> DiGraph<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    /// Creates an empty graph with span zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph holding the vertices `[0, span)` and no edges.
    pub fn with_span(span: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); span],
            edge_count: 0,
        }
    }

    /// Builds a graph from raw per-vertex edge lists.
    ///
    /// Lists are sorted by target. When a target repeats inside one list the
    /// entry that came first is kept.
    pub(crate) fn from_adjacency(mut adjacency: Vec<Vec<(K, E)>>) -> Self {
        let mut edge_count = 0;
        for neighbor_list in adjacency.iter_mut() {
            neighbor_list.sort_by_key(|&(target, _)| target);
            neighbor_list.dedup_by_key(|&mut (target, _)| target);
            edge_count += neighbor_list.len();
        }
        Self {
            adjacency,
            edge_count,
        }
    }

    /// Ensures that `vertex_id` is part of the graph, growing the span if needed.
    pub fn add_vertex(&mut self, vertex_id: K) {
        let index = vertex_id.index();
        if index >= self.adjacency.len() {
            self.adjacency.resize_with(index + 1, Vec::new);
        }
    }

    /// Inserts the edge `source -> target` with the given weight.
    ///
    /// Both endpoints are added as vertices if they lie beyond the span.
    ///
    /// # Returns
    /// `true` if the edge is new, `false` if an existing edge had its weight overwritten.
    pub fn add_edge(&mut self, source: K, target: K, weight: E) -> bool {
        self.add_vertex(source);
        self.add_vertex(target);
        let neighbor_list = &mut self.adjacency[source.index()];
        match neighbor_list.binary_search_by_key(&target, |&(t, _)| t) {
            Ok(position) => {
                neighbor_list[position].1 = weight;
                false
            }
            Err(position) => {
                neighbor_list.insert(position, (target, weight));
                self.edge_count += 1;
                true
            }
        }
    }

    /// Number of out-edges of a vertex (zero for unknown vertices).
    pub fn degree(&self, vertex_id: &K) -> usize {
        self.out_neighbors(vertex_id).len()
    }

    /// Iterates over every edge as `(source, target, weight)` in ascending source order.
    pub fn edges(&self) -> impl Iterator<Item = (K, K, E)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(source, neighbor_list)| {
                // Sources come from the span, which only ever grows from valid ids.
                let source = K::from_index(source);
                neighbor_list
                    .iter()
                    .filter_map(move |&(target, weight)| source.map(|s| (s, target, weight)))
            })
    }
}

impl<K, E> GraphQuery<K, E> for DiGraph<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    fn span(&self) -> usize {
        self.adjacency.len()
    }

    fn size(&self) -> usize {
        self.edge_count
    }

    fn out_neighbors(&self, vertex_id: &K) -> &[(K, E)] {
        match self.adjacency.get(vertex_id.index()) {
            Some(neighbor_list) => neighbor_list.as_slice(),
            None => &[],
        }
    }

    fn has_vertex(&self, vertex_id: &K) -> bool {
        vertex_id.index() < self.adjacency.len()
    }

    fn edge_weight(&self, src_id: &K, dst_id: &K) -> Option<E> {
        let neighbor_list = self.out_neighbors(src_id);
        neighbor_list
            .binary_search_by_key(dst_id, |&(t, _)| t)
            .ok()
            .map(|position| neighbor_list[position].1)
    }

    fn vertex_list(&self) -> Vec<K> {
        (0..self.adjacency.len())
            .filter_map(K::from_index)
            .collect()
    }
}

/// Prints the graph as `{order: <span>, size: <edges>}`.
impl<K, E> fmt::Display for DiGraph<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{order: {}, size: {}}}", self.span(), self.size())
    }
}

#[cfg(test)]
pub mod test_type {
    use super::*;

    /// Tests that adding an edge beyond the span grows it and leaves the new
    /// vertices with empty neighbor lists.
    #[test]
    fn test_add_edge_extends_span() {
        let mut graph = DiGraph::<u32, f32>::new();
        assert_eq!(graph.span(), 0);

        graph.add_edge(2, 5, 1.0);
        assert_eq!(graph.span(), 6);
        assert_eq!(graph.size(), 1);
        for vertex in [0u32, 1, 3, 4, 5] {
            assert!(graph.out_neighbors(&vertex).is_empty());
        }
        assert_eq!(graph.out_neighbors(&2), &[(5, 1.0)]);
    }

    /// Span monotonicity: adding smaller ids never shrinks the span.
    #[test]
    fn test_span_never_shrinks() {
        let mut graph = DiGraph::<u32, f32>::new();
        let mut last_span = 0;
        for (u, v) in [(9u32, 1u32), (0, 0), (3, 4), (12, 2), (1, 1)] {
            graph.add_edge(u, v, 1.0);
            assert!(graph.span() >= last_span);
            last_span = graph.span();
        }
        assert_eq!(graph.span(), 13);

        graph.add_vertex(4);
        assert_eq!(graph.span(), 13);
        graph.add_vertex(20);
        assert_eq!(graph.span(), 21);
    }

    /// Repeated insertion of the same pair updates the weight instead of
    /// creating a parallel edge.
    #[test]
    fn test_repeated_insertion_overwrites_weight() {
        let mut graph = DiGraph::<u32, f32>::new();
        assert!(graph.add_edge(0, 1, 2.0));
        assert!(!graph.add_edge(0, 1, 7.5));
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.edge_weight(&0, &1), Some(7.5));
        assert_eq!(graph.degree(&0), 1);
    }

    #[test]
    fn test_neighbors_sorted_by_target() {
        let mut graph = DiGraph::<u64, f64>::new();
        for target in [7u64, 3, 9, 1, 3] {
            graph.add_edge(0, target, target as f64);
        }
        let targets: Vec<u64> = graph.out_neighbors(&0).iter().map(|&(t, _)| t).collect();
        assert_eq!(targets, vec![1, 3, 7, 9]);
        assert!(graph.has_edge(&0, &9));
        assert!(!graph.has_edge(&9, &0));
        assert!(!graph.has_edge(&42, &0));
    }

    #[test]
    fn test_self_loop_is_single_edge() {
        let mut graph = DiGraph::<u32, f32>::new();
        graph.add_edge(4, 4, 1.0);
        graph.add_edge(4, 4, 1.0);
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.out_neighbors(&4), &[(4, 1.0)]);
    }

    #[test]
    fn test_vertex_list_and_edges() {
        let mut graph = DiGraph::<u32, f32>::with_span(3);
        graph.add_edge(2, 0, 0.5);
        graph.add_edge(0, 1, 1.5);
        assert_eq!(graph.vertex_list(), vec![0, 1, 2]);
        let edges: Vec<(u32, u32, f32)> = graph.edges().collect();
        assert_eq!(edges, vec![(0, 1, 1.5), (2, 0, 0.5)]);
        assert!(graph.has_vertex(&2));
        assert!(!graph.has_vertex(&3));
    }

    #[test]
    fn test_from_adjacency_keeps_first_duplicate() {
        let graph = DiGraph::<u32, f32>::from_adjacency(vec![
            vec![(2, 1.0), (1, 4.0), (2, 9.0)],
            vec![],
            vec![(0, 3.0)],
        ]);
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.out_neighbors(&0), &[(1, 4.0), (2, 1.0)]);
    }

    #[test]
    fn test_display() {
        let mut graph = DiGraph::<u32, f32>::new();
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        assert_eq!(graph.to_string(), "{order: 3, size: 2}");
    }
}
