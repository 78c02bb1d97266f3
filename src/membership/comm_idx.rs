use std::collections::BTreeMap;

use crate::membership::Membership;
use crate::types::graph_numeric::VertexId;

/// Groups vertices by community.
///
/// Communities are kept in ascending id order and each member list is in
/// ascending vertex order, which is the order vertices are visited while the
/// index is built. The set of communities is exactly the set of distinct
/// values in the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityIndex<K> {
    /// Maps community identifiers to their member vertices.
    community_map: BTreeMap<K, Vec<K>>,
}

impl<K> CommunityIndex<K>
where
    K: VertexId
{
    /// Derives the index from a membership.
    pub fn build(membership: &Membership<K>) -> Self {
        let mut community_map = BTreeMap::<K, Vec<K>>::new();
        for (vertex, &community_id) in membership.as_slice().iter().enumerate() {
            // Membership entries are indexed by vertex ids, so positions always convert back.
            if let Some(vertex_id) = K::from_index(vertex) {
                community_map.entry(community_id).or_default().push(vertex_id);
            }
        }
        Self { community_map }
    }

    /// Number of distinct communities.
    pub fn len(&self) -> usize {
        self.community_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.community_map.is_empty()
    }

    /// Retrieves the members of a community.
    ///
    /// # Returns
    ///
    /// * `Some(&[K])` - The member vertices in ascending order
    /// * `None` - If no vertex belongs to `community_id`
    pub fn members(&self, community_id: &K) -> Option<&[K]> {
        self.community_map.get(community_id).map(Vec::as_slice)
    }

    /// Iterates over `(community, members)` in ascending community order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[K])> + '_ {
        self.community_map
            .iter()
            .map(|(community_id, members)| (community_id, members.as_slice()))
    }

    pub fn community_ids(&self) -> Vec<K> {
        self.community_map.keys().copied().collect()
    }
}

#[cfg(test)]
mod test_comm_idx {
    use super::*;

    #[test]
    fn test_group_by_community() {
        let membership = Membership::<u32>::from_vec(vec![2, 0, 2, 7, 0]);
        let index = CommunityIndex::build(&membership);
        assert_eq!(index.len(), 3);
        assert_eq!(index.community_ids(), vec![0, 2, 7]);
        assert_eq!(index.members(&0), Some(&[1u32, 4][..]));
        assert_eq!(index.members(&2), Some(&[0u32, 2][..]));
        assert_eq!(index.members(&7), Some(&[3u32][..]));
        assert_eq!(index.members(&1), None);
    }

    /// Sparse community ids are not padded: only ids that occur are communities.
    #[test]
    fn test_count_equals_distinct_values() {
        let membership = Membership::<u64>::from_vec(vec![100, 5, 100, 5, 42]);
        let index = CommunityIndex::build(&membership);
        assert_eq!(index.len(), 3);
        let total_members: usize = index.iter().map(|(_, members)| members.len()).sum();
        assert_eq!(total_members, membership.len());
    }

    #[test]
    fn test_empty_membership() {
        let index = CommunityIndex::build(&Membership::<u32>::from_vec(vec![]));
        assert!(index.is_empty());
    }
}
