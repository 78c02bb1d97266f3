use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::connectivity::ConnectivityResult;
use crate::error::{AuditError, Result};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;
use crate::types::DiGraph;

/// Order and size of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub order: usize,
    pub size: usize,
}

impl GraphSummary {
    pub fn of<K: VertexId, E: EdgeWeight>(graph: &DiGraph<K, E>) -> Self {
        Self {
            order: graph.span(),
            size: graph.size(),
        }
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{order: {}, size: {}}}", self.order, self.size)
    }
}

/// The two counts handed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityCounts {
    /// Distinct communities in the membership.
    pub communities: usize,
    /// Communities whose induced subgraph is not connected.
    pub disconnected: usize,
}

/// Reduces per-community results to the community and disconnected counts.
pub fn summarize<K>(results: &[ConnectivityResult<K>]) -> CommunityCounts {
    CommunityCounts {
        communities: results.len(),
        disconnected: results.iter().filter(|result| !result.is_connected()).count(),
    }
}

/// Everything one audit run found, serializable as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// The graph as read from the input file.
    pub input_graph: GraphSummary,
    /// The graph after symmetrization, absent when the input was declared symmetric.
    pub symmetrized_graph: Option<GraphSummary>,
    #[serde(flatten)]
    pub counts: CommunityCounts,
    /// Ids of the disconnected communities, ascending.
    pub disconnected_communities: Vec<u64>,
}

impl AuditReport {
    pub fn new<K: VertexId>(
        input_graph: GraphSummary,
        symmetrized_graph: Option<GraphSummary>,
        results: &[ConnectivityResult<K>],
    ) -> Self {
        let disconnected_communities = results
            .iter()
            .filter(|result| !result.is_connected())
            .map(|result| result.community.index() as u64)
            .collect();
        Self {
            input_graph,
            symmetrized_graph,
            counts: summarize(results),
            disconnected_communities,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the report as YAML to `path`.
    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        let text = self.to_yaml()?;
        fs::write(path, text).map_err(|source| AuditError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
    }
}
