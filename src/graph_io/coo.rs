use std::io::BufRead;

use crate::error::Result;
use crate::graph_io::{insert_edge, is_comment, LineContext, ReadOptions};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::DiGraph;
use crate::util::progress_spinner;

/// Reads a coordinate list: one 1-indexed `row col [value]` triple per line.
///
/// There is no size line, so the span is whatever the entries reference.
/// Lines starting with `%` or `#` are comments. With `options.symmetric` every
/// off-diagonal entry is also inserted in the opposite direction.
pub fn read_coo<R, K, E>(reader: R, options: &ReadOptions, input: &str) -> Result<DiGraph<K, E>>
where
    R: BufRead,
    K: VertexId,
    E: EdgeWeight
{
    let mut graph = DiGraph::<K, E>::new();
    let pb = progress_spinner(format!("Reading {input}"), options.show_progress);

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        pb.inc(1);
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        let ctx = LineContext { input, line: line_index + 1 };
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let (row, col, weight) = ctx.edge_record(&fields, options.weighted, true)?;
        insert_edge(&mut graph, row, col, weight, options.symmetric);
    }
    pb.finish_and_clear();
    Ok(graph)
}
