use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Result;
use crate::membership::comm_idx::CommunityIndex;
use crate::membership::Membership;
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;
use crate::types::DiGraph;
use crate::util::{build_pool, progress_bar};

/// Configuration for the community connectivity analysis.
///
/// # Fields
///
/// * `thread_num` - The number of threads to use for parallel computation, 0 for rayon's default.
/// * `show_progress` - Draw a progress bar over the communities.
#[derive(Clone, Default)]
pub struct ConnectivityConfig {
    pub thread_num: usize,
    pub show_progress: bool,
}

/// Outcome of the connectivity test of one community.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectivityResult<K> {
    pub community: K,
    /// Number of member vertices.
    pub size: usize,
    /// Members reachable from the first member through internal edges.
    pub reached: usize,
}

impl<K> ConnectivityResult<K> {
    /// A community is connected when the traversal reached every member.
    /// Communities with at most one member are always connected.
    pub fn is_connected(&self) -> bool {
        self.reached == self.size
    }
}

/// Trait for testing whether communities induce connected subgraphs.
///
/// # Type Parameters
///
/// * `K` - The type used for vertex and community identifiers.
pub trait CommunityConnectivity<K> {
    /// Tests every community, returning results in ascending community order.
    fn analyze(&self, config: &ConnectivityConfig) -> Result<Vec<ConnectivityResult<K>>>;

    /// Counts the communities whose induced subgraph is disconnected.
    fn count_disconnected(&self, config: &ConnectivityConfig) -> Result<usize> {
        Ok(self
            .analyze(config)?
            .iter()
            .filter(|result| !result.is_connected())
            .count())
    }
}

/// Counts the members of `community` reachable from its first member.
///
/// Breadth-first search over the (undirected) graph that only steps onto
/// vertices labelled `community`; edges leaving the community are skipped.
/// Work is linear in the members plus the edges incident to them.
pub fn community_reach<K, E, G>(graph: &G, membership: &Membership<K>, community: K, members: &[K]) -> usize
where
    K: VertexId,
    G: GraphQuery<K, E>
{
    let Some(&first) = members.first() else {
        return 0;
    };
    if members.len() == 1 {
        return 1;
    }

    let mut visited = FxHashSet::<K>::with_capacity_and_hasher(members.len(), Default::default());
    let mut queue = VecDeque::<K>::new();
    visited.insert(first);
    queue.push_back(first);

    while let Some(current) = queue.pop_front() {
        for (neighbor, _) in graph.out_neighbors(&current) {
            if visited.contains(neighbor) || membership.community_of(neighbor) != Some(community) {
                continue;
            }
            visited.insert(*neighbor);
            queue.push_back(*neighbor);
        }
    }
    visited.len()
}

/// Controller for community connectivity analysis.
///
/// Holds the undirected graph, the membership and the community index behind
/// `Arc`s; all three are read-only while the analysis runs, so worker threads
/// share them without locking.
pub struct ConnectivityController<K, E> {
    graph: Arc<DiGraph<K, E>>,
    membership: Arc<Membership<K>>,
    community_index: Arc<CommunityIndex<K>>,
}

impl<K, E> ConnectivityController<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    /// Creates a new controller.
    ///
    /// # Parameters
    ///
    /// * `graph` - The symmetrized graph.
    /// * `membership` - Community of every vertex of `graph`.
    /// * `community_index` - Members of every community, derived from `membership`.
    pub fn new(
        graph: Arc<DiGraph<K, E>>,
        membership: Arc<Membership<K>>,
        community_index: Arc<CommunityIndex<K>>,
    ) -> Self {
        Self {
            graph,
            membership,
            community_index,
        }
    }

    fn test_community(&self, community: K, members: &[K]) -> ConnectivityResult<K> {
        let reached = community_reach::<K, E, _>(self.graph.as_ref(), &self.membership, community, members);
        ConnectivityResult {
            community,
            size: members.len(),
            reached,
        }
    }

    /// Tests every community on the calling thread.
    pub fn analyze_sequential(&self) -> Vec<ConnectivityResult<K>> {
        self.community_index
            .iter()
            .map(|(&community, members)| self.test_community(community, members))
            .collect()
    }
}

impl<K, E> CommunityConnectivity<K> for ConnectivityController<K, E>
where
    K: VertexId,
    E: EdgeWeight
{
    /// Tests every community in parallel on a pool of `config.thread_num` threads.
    ///
    /// Each community runs its own traversal with a private visited set, so
    /// communities never coordinate. Results keep ascending community order.
    fn analyze(&self, config: &ConnectivityConfig) -> Result<Vec<ConnectivityResult<K>>> {
        let communities = self.community_index.iter().collect::<Vec<_>>();
        let pool = build_pool(config.thread_num)?;
        let pb = progress_bar(communities.len() as u64, "Checking Communities.", config.show_progress);

        let results = pool.install(|| {
            communities
                .par_iter()
                .map(|&(&community, members)| {
                    let result = self.test_community(community, members);
                    pb.inc(1);
                    result
                })
                .collect::<Vec<_>>()
        });
        pb.finish_and_clear();
        Ok(results)
    }
}
