use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;
use crate::types::DiGraph;
use crate::util::{build_pool, progress_bar};

/// Configuration for the parallel symmetrization.
///
/// # Fields
///
/// * `thread_num` - The number of threads to use, 0 for rayon's default.
/// * `show_progress` - Draw a progress bar over the source vertices.
#[derive(Clone, Default)]
pub struct SymmetrizeConfig {
    pub thread_num: usize,
    pub show_progress: bool,
}

/// Decides whether the scan of `source` writes the pair `{source, target}`.
///
/// Sources are scanned in ascending order, so when both directions exist the
/// edge out of the smaller id is seen first and its weight is written both
/// ways. A one-directional edge is always written by its own source.
#[inline]
fn owns_pair<K, E>(graph: &DiGraph<K, E>, source: &K, target: &K) -> bool
where
    K: VertexId,
    E: EdgeWeight
{
    source < target || !graph.has_edge(target, source)
}

/// Builds the undirected counterpart of a directed graph, sequentially.
///
/// For every edge `(u, v, w)` the result holds `(u, v, w)` and `(v, u, w)`.
/// Self-loops are copied once. When `(u, v, w1)` and `(v, u, w2)` are both
/// present with `u < v`, `w1` is kept in both directions and `w2` is dropped
/// ("first seen wins" in ascending source order). The input is left untouched.
pub fn symmetrize<K, E>(graph: &DiGraph<K, E>) -> DiGraph<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    let mut undirected = DiGraph::<K, E>::with_span(graph.span());
    for source in graph.vertex_list() {
        for &(target, weight) in graph.out_neighbors(&source) {
            if source == target {
                undirected.add_edge(source, target, weight);
            } else if owns_pair(graph, &source, &target) {
                undirected.add_edge(source, target, weight);
                undirected.add_edge(target, source, weight);
            }
        }
    }
    undirected
}

/// Builds the undirected counterpart of a directed graph in parallel.
///
/// Source vertices are processed independently on a dedicated pool of
/// `config.thread_num` threads. Mirrored edges land in a `DashMap` keyed by
/// the receiving vertex, whose shard locks serialize concurrent writers to the
/// same vertex. Produces exactly the graph [`symmetrize`] produces, whatever
/// the thread count.
///
/// # Errors
///
/// Fails only if the worker pool cannot be created.
pub fn symmetrize_par<K, E>(graph: &DiGraph<K, E>, config: &SymmetrizeConfig) -> Result<DiGraph<K, E>>
where
    K: VertexId,
    E: EdgeWeight
{
    let span = graph.span();
    let mirrored = DashMap::<usize, Vec<(K, E)>>::with_capacity(span);
    let pool = build_pool(config.thread_num)?;
    let pb = progress_bar(span as u64, "Symmetrizing.", config.show_progress);

    let vertex_list = graph.vertex_list();
    pool.install(|| {
        vertex_list.par_iter().for_each(|&source| {
            for &(target, weight) in graph.out_neighbors(&source) {
                if source == target {
                    mirrored.entry(source.index()).or_default().push((target, weight));
                } else if owns_pair(graph, &source, &target) {
                    mirrored.entry(source.index()).or_default().push((target, weight));
                    mirrored.entry(target.index()).or_default().push((source, weight));
                }
            }
            pb.inc(1);
        });
    });
    pb.finish_and_clear();

    let adjacency = (0..span)
        .map(|vertex| mirrored.remove(&vertex).map(|(_, neighbor_list)| neighbor_list).unwrap_or_default())
        .collect::<Vec<_>>();
    let undirected = DiGraph::from_adjacency(adjacency);
    debug!(directed = graph.size(), undirected = undirected.size(), "symmetrized");
    Ok(undirected)
}

/// Checks that every edge has a reciprocal with the same weight.
pub fn is_symmetric<K, E, G>(graph: &G) -> bool
where
    K: VertexId,
    E: EdgeWeight,
    G: GraphQuery<K, E>
{
    graph.vertex_list().iter().all(|source| {
        graph
            .out_neighbors(source)
            .iter()
            .all(|(target, weight)| graph.edge_weight(target, source) == Some(*weight))
    })
}

#[cfg(test)]
mod test_symmetrize {
    use super::*;

    fn directed(edges: &[(u32, u32, f32)]) -> DiGraph<u32, f32> {
        let mut graph = DiGraph::new();
        for &(u, v, w) in edges {
            graph.add_edge(u, v, w);
        }
        graph
    }

    fn parallel(graph: &DiGraph<u32, f32>, thread_num: usize) -> DiGraph<u32, f32> {
        let config = SymmetrizeConfig { thread_num, show_progress: false };
        symmetrize_par(graph, &config).unwrap()
    }

    #[test]
    fn test_completeness() {
        let graph = directed(&[(0, 1, 1.0), (1, 2, 2.0), (3, 0, 0.5)]);
        let undirected = symmetrize(&graph);
        assert_eq!(undirected.size(), 6);
        assert!(is_symmetric::<u32, f32, _>(&undirected));
        assert_eq!(undirected.edge_weight(&0, &3), Some(0.5));
        assert_eq!(undirected.edge_weight(&2, &1), Some(2.0));
        assert!(!is_symmetric::<u32, f32, _>(&graph));
    }

    /// Conflicting reciprocal weights: the edge out of the smaller vertex id
    /// is seen first and its weight wins in both directions.
    #[test]
    fn test_weight_conflict_first_seen_wins() {
        let graph = directed(&[(4, 1, 9.0), (1, 4, 3.0), (2, 0, 7.0), (0, 2, 5.0)]);
        for undirected in [symmetrize(&graph), parallel(&graph, 3)] {
            assert_eq!(undirected.size(), 4);
            assert_eq!(undirected.edge_weight(&1, &4), Some(3.0));
            assert_eq!(undirected.edge_weight(&4, &1), Some(3.0));
            assert_eq!(undirected.edge_weight(&0, &2), Some(5.0));
            assert_eq!(undirected.edge_weight(&2, &0), Some(5.0));
        }
    }

    #[test]
    fn test_self_loops_not_doubled() {
        let graph = directed(&[(2, 2, 4.0), (0, 2, 1.0)]);
        for undirected in [symmetrize(&graph), parallel(&graph, 2)] {
            assert_eq!(undirected.out_neighbors(&2), &[(0, 1.0), (2, 4.0)]);
            assert_eq!(undirected.size(), 3);
        }
    }

    /// Symmetrizing an undirected graph gives back the same edge set.
    #[test]
    fn test_idempotence() {
        let graph = directed(&[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 2.0), (3, 0, 1.0), (1, 1, 1.0)]);
        let once = symmetrize(&graph);
        let twice = symmetrize(&once);
        assert_eq!(once, twice);
        assert_eq!(parallel(&once, 4), once);
    }

    #[test]
    fn test_input_untouched_and_span_kept() {
        let mut graph = directed(&[(0, 1, 1.0)]);
        graph.add_vertex(5);
        let before = graph.clone();
        let undirected = parallel(&graph, 2);
        assert_eq!(graph, before);
        assert_eq!(undirected.span(), 6);
        assert!(undirected.out_neighbors(&5).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut graph = DiGraph::<u32, f32>::new();
        for u in 0..200u32 {
            for step in [1u32, 7, 31] {
                let v = (u * step + 3) % 200;
                graph.add_edge(u, v, (u % 5) as f32);
            }
        }
        let expected = symmetrize(&graph);
        for thread_num in [1, 2, 8] {
            assert_eq!(parallel(&graph, thread_num), expected);
        }
        assert!(is_symmetric::<u32, f32, _>(&expected));
    }
}
