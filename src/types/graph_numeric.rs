use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A trait for types that can be used as vertex identifiers in a graph.
///
/// Vertex ids are dense unsigned integers, so every id maps onto a slot of a
/// `Vec` through [`VertexId::index`]. The same trait is used for community ids.
pub trait VertexId: Copy + Ord + Hash + Debug + Display + Send + Sync + 'static {
    /// Returns the position of this id in a dense `[0, span)` layout.
    fn index(self) -> usize;

    /// Converts a dense position back into an id.
    ///
    /// # Returns
    /// `None` if the position does not fit into the id type.
    fn from_index(index: usize) -> Option<Self>;
}

macro_rules! impl_vertex_id {
    ($($t:ty),*) => {
        $(
            impl VertexId for $t {
                #[inline]
                fn index(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_index(index: usize) -> Option<Self> {
                    <$t>::try_from(index).ok()
                }
            }
        )*
    };
}

impl_vertex_id!(u16, u32, u64, usize);

/// A trait for numeric edge weights.
///
/// Weight tokens are always read as `f64` and narrowed into the configured type,
/// which lets integer and floating-point tokens share one code path.
pub trait EdgeWeight: Copy + PartialEq + Debug + Display + Send + Sync + 'static {
    /// The weight given to every edge of an unweighted graph.
    fn one() -> Self;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;
}

/// Single precision weights, the default of the command line tool.
impl EdgeWeight for f32 {
    fn one() -> Self {
        1.0
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl EdgeWeight for f64 {
    fn one() -> Self {
        1.0
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}
