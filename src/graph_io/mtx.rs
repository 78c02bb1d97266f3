use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::{AuditError, Result};
use crate::graph_io::{insert_edge, is_comment, LineContext, ReadOptions};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::DiGraph;
use crate::util::progress_bar;

const BANNER: &str = "%%matrixmarket";

/// Parsed `%%MatrixMarket` banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MtxHeader {
    /// Off-diagonal entries stand for both `(i, j)` and `(j, i)`.
    mirrored: bool,
    /// `pattern` matrices carry no value column.
    has_values: bool,
}

/// Declared `rows cols nnz` line.
#[derive(Debug, Clone, Copy)]
struct MtxSize {
    rows: usize,
    cols: usize,
    entries: usize,
}

fn parse_banner(line: &str, ctx: LineContext<'_>) -> Result<MtxHeader> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_ascii_lowercase).collect();
    if tokens.first().map(String::as_str) != Some(BANNER) {
        return Err(ctx.error("missing %%MatrixMarket banner"));
    }
    if tokens.get(1).map(String::as_str) != Some("matrix") {
        return Err(ctx.error("only `matrix` objects are supported"));
    }
    if tokens.get(2).map(String::as_str) != Some("coordinate") {
        return Err(ctx.error("only `coordinate` (sparse) matrices are supported"));
    }
    let has_values = tokens.get(3).map(String::as_str) != Some("pattern");
    let mirrored = matches!(
        tokens.get(4).map(String::as_str),
        Some("symmetric") | Some("skew-symmetric") | Some("hermitian")
    );
    Ok(MtxHeader { mirrored, has_values })
}

fn parse_size(line: &str, ctx: LineContext<'_>) -> Result<MtxSize> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(ctx.error(format!(
            "size line needs `rows cols nnz`, found {} fields",
            fields.len()
        )));
    }
    Ok(MtxSize {
        rows: ctx.parse_count(fields[0])?,
        cols: ctx.parse_count(fields[1])?,
        entries: ctx.parse_count(fields[2])?,
    })
}

/// Reads a Matrix Market coordinate file.
///
/// # Format
/// - Line 1: `%%MatrixMarket matrix coordinate <field> <symmetry>`
/// - Lines starting with `%`: comments
/// - Size line: `rows cols nnz`; the vertices `[0, max(rows, cols))` are created
/// - Entry lines: `row col [value]`, 1-indexed
///
/// A `symmetric`, `skew-symmetric` or `hermitian` banner mirrors every
/// off-diagonal entry, and so does the caller's `symmetric` option for a
/// `general` banner.
/// Entries beyond the declared dimensions are rejected.
pub fn read_mtx<R, K, E>(reader: R, options: &ReadOptions, input: &str) -> Result<DiGraph<K, E>>
where
    R: BufRead,
    K: VertexId,
    E: EdgeWeight
{
    let mut header: Option<MtxHeader> = None;
    let mut size: Option<MtxSize> = None;
    let mut graph = DiGraph::<K, E>::new();
    let mut entries_read = 0usize;
    let mut pb = progress_bar(0, "Graph Loading.", false);

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let ctx = LineContext { input, line: line_index + 1 };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(mtx_header) = header else {
            header = Some(parse_banner(trimmed, ctx)?);
            continue;
        };
        if is_comment(trimmed) {
            continue;
        }

        let Some(mtx_size) = size else {
            let declared = parse_size(trimmed, ctx)?;
            let order = declared.rows.max(declared.cols);
            if order > 0 {
                let last = K::from_index(order - 1).ok_or_else(|| {
                    ctx.error(format!("dimension {order} does not fit the vertex type"))
                })?;
                graph.add_vertex(last);
            }
            debug!(rows = declared.rows, cols = declared.cols, nnz = declared.entries, "matrix market size");
            pb = progress_bar(declared.entries as u64, "Graph Loading.", options.show_progress);
            size = Some(declared);
            continue;
        };

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let weighted = options.weighted && mtx_header.has_values;
        let (row, col, weight): (K, K, E) = ctx.edge_record(&fields, weighted, true)?;
        if row.index() >= mtx_size.rows || col.index() >= mtx_size.cols {
            return Err(ctx.error(format!(
                "entry ({}, {}) exceeds the declared {}x{} matrix",
                row.index() + 1,
                col.index() + 1,
                mtx_size.rows,
                mtx_size.cols
            )));
        }
        insert_edge(&mut graph, row, col, weight, mtx_header.mirrored || options.symmetric);
        entries_read += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    match (header, size) {
        (None, _) => return Err(AuditError::parse(input, 1, "empty Matrix Market file")),
        (Some(_), None) => return Err(AuditError::parse(input, 1, "missing size line")),
        (Some(mtx_header), Some(mtx_size)) => {
            if options.weighted && !mtx_header.has_values {
                warn!("{input} is a pattern matrix, all weights set to one");
            }
            if entries_read != mtx_size.entries {
                warn!(declared = mtx_size.entries, read = entries_read, "{input}: entry count differs from the size line");
            }
        }
    }
    Ok(graph)
}
