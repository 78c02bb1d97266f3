use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::algorithms::connectivity::{CommunityConnectivity, ConnectivityConfig, ConnectivityController};
use crate::algorithms::symmetrize::{is_symmetric, symmetrize_par, SymmetrizeConfig};
use crate::config::AuditConfig;
use crate::error::Result;
use crate::graph_io::{read_graph, ReadOptions};
use crate::measure_phase;
use crate::membership::comm_idx::CommunityIndex;
use crate::membership::{read_membership, MembershipOptions};
use crate::report::{AuditReport, GraphSummary};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;
use crate::types::DiGraph;

/// Runs a complete audit: read, symmetrize, load membership, test every community.
///
/// Status lines are written to `out` as each phase starts or finishes. The
/// community counts are only written after every input has been read
/// successfully, so a failing run never prints results.
///
/// # Type Parameters
/// - `K`: vertex and community id type
/// - `E`: edge weight type
pub fn run_audit<K, E, W>(config: &AuditConfig, out: &mut W) -> Result<AuditReport>
where
    K: VertexId,
    E: EdgeWeight,
    W: Write
{
    let (input, membership_path) = config.validate()?;

    // Step 1. Read the graph.
    writeln!(out, "Reading graph {} ...", input.display())?;
    let read_options = ReadOptions {
        weighted: config.weighted,
        symmetric: config.symmetric,
        show_progress: config.show_progress,
    };
    let graph: DiGraph<K, E> = measure_phase!("read graph", {
        read_graph(input, config.input_format, &read_options)
    })?;
    writeln!(out, "{graph}")?;
    let input_summary = GraphSummary::of(&graph);

    // Step 2. Make it undirected unless the caller says it already is.
    let (graph, symmetrized_summary) = if config.symmetric {
        if !is_symmetric::<K, E, _>(&graph) {
            warn!("{} was declared symmetric but has unmatched edges; traversal follows edge direction", input.display());
        }
        (graph, None)
    } else {
        let symmetrize_config = SymmetrizeConfig {
            thread_num: config.num_threads,
            show_progress: config.show_progress,
        };
        let undirected = measure_phase!("symmetrize", { symmetrize_par(&graph, &symmetrize_config) })?;
        writeln!(out, "{undirected} (symmetrize)")?;
        let summary = GraphSummary::of(&undirected);
        (undirected, Some(summary))
    };

    // Step 3. Load the membership for every vertex of the graph.
    writeln!(out, "Reading community membership {} ...", membership_path.display())?;
    let membership_options = MembershipOptions {
        keyed: config.membership_keyed,
        start: config.membership_start,
        show_progress: config.show_progress,
    };
    let membership = measure_phase!("read membership", {
        read_membership::<K>(membership_path, graph.span(), &membership_options)
    })?;
    let community_index = CommunityIndex::build(&membership);
    info!(communities = community_index.len(), "community index built");

    // Step 4. Test every community.
    let controller = ConnectivityController::new(
        Arc::new(graph),
        Arc::new(membership),
        Arc::new(community_index),
    );
    let connectivity_config = ConnectivityConfig {
        thread_num: config.num_threads,
        show_progress: config.show_progress,
    };
    let results = measure_phase!("connectivity", { controller.analyze(&connectivity_config) })?;

    // Step 5. Report.
    let report = AuditReport::new(input_summary, symmetrized_summary, &results);
    if let Some(path) = config.report.as_deref() {
        report.write_yaml(path)?;
        info!("report written to {}", path.display());
    }
    writeln!(out, "Number of communities: {}", report.counts.communities)?;
    writeln!(out, "Number of disconnected communities: {}", report.counts.disconnected)?;
    writeln!(out)?;
    Ok(report)
}
