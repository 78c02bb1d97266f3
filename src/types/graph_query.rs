use crate::types::graph_numeric::VertexId;

/// A trait that defines query operations for graph stores.
///
/// The connectivity analysis only needs these reads, so any store that can
/// answer them can be audited.
///
/// # Type Parameters
///
/// * `T` - The vertex identifier type, which must implement the `VertexId` trait.
/// * `E` - The edge weight type.
pub trait GraphQuery<T, E>
where
    T: VertexId
{
    /// Returns one more than the largest vertex id in the store.
    fn span(&self) -> usize;

    /// Returns the number of stored (directed) edges.
    fn size(&self) -> usize;

    /// Retrieves the out-edges of a vertex as `(target, weight)` pairs.
    ///
    /// # Parameters
    ///
    /// * `vertex_id` - A reference to the identifier of the vertex whose neighbors are being queried.
    ///
    /// # Returns
    ///
    /// The out-edges sorted by target id, or an empty slice for unknown vertices.
    fn out_neighbors(&self, vertex_id: &T) -> &[(T, E)];

    /// Checks if a specific vertex exists in the store.
    fn has_vertex(&self, vertex_id: &T) -> bool;

    /// Determines if an edge exists from `src_id` to `dst_id`.
    fn has_edge(&self, src_id: &T, dst_id: &T) -> bool {
        self.edge_weight(src_id, dst_id).is_some()
    }

    /// Returns the weight of the edge from `src_id` to `dst_id`, if present.
    fn edge_weight(&self, src_id: &T, dst_id: &T) -> Option<E>;

    /// Retrieves a list of all vertices in the store.
    fn vertex_list(&self) -> Vec<T>;
}
