use std::io::BufRead;

use tracing::debug;

use crate::error::Result;
use crate::graph_io::{insert_edge, is_comment, InputFormat, LineContext, ReadOptions};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::DiGraph;
use crate::util::progress_spinner;

/// Splits a data line into trimmed fields according to the format's delimiter.
fn split_fields(line: &str, format: InputFormat) -> Vec<&str> {
    match format {
        InputFormat::Csv => line.split(',').map(str::trim).collect(),
        InputFormat::Tsv => line.split('\t').map(str::trim).collect(),
        _ => line.split_whitespace().collect(),
    }
}

/// Reads `source target [weight]` lines with 0-indexed vertex ids.
///
/// `edgelist` splits on whitespace, `csv` on commas and `tsv` on tabs. For the
/// delimited formats a first data line whose first field does not start with a
/// digit is a column header and is skipped. Any other malformed line, including
/// one written with the wrong delimiter, is a parse error. With `options.symmetric` every off-diagonal
/// edge is also inserted in the opposite direction.
pub fn read_edgelist<R, K, E>(
    reader: R,
    format: InputFormat,
    options: &ReadOptions,
    input: &str,
) -> Result<DiGraph<K, E>>
where
    R: BufRead,
    K: VertexId,
    E: EdgeWeight
{
    let allow_header = matches!(format, InputFormat::Csv | InputFormat::Tsv);
    let mut seen_data = false;
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
        let fields = split_fields(trimmed, format);

        if !seen_data {
            seen_data = true;
            let label = fields
                .first()
                .is_some_and(|f| !f.starts_with(|c: char| c.is_ascii_digit()));
            if allow_header && label {
                debug!("{input}: skipping header line `{trimmed}`");
                continue;
            }
        }

        let (source, target, weight) = ctx.edge_record(&fields, options.weighted, false)?;
        insert_edge(&mut graph, source, target, weight, options.symmetric);
    }
    pb.finish_and_clear();
    Ok(graph)
}

#[cfg(test)]
mod test_edgelist {
    use super::*;
    use crate::error::AuditError;
    use crate::types::graph_query::GraphQuery;

    fn read(text: &str, format: InputFormat, weighted: bool, symmetric: bool) -> Result<DiGraph<u32, f32>> {
        let options = ReadOptions { weighted, symmetric, show_progress: false };
        read_edgelist(text.as_bytes(), format, &options, "inline")
    }

    #[test]
    fn test_whitespace_edgelist() {
        let graph = read("0 1\n1   2\t3\n\n# tail\n2 0\n", InputFormat::Edgelist, false, false).unwrap();
        assert_eq!(graph.span(), 3);
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.edge_weight(&1, &2), Some(1.0));
    }

    #[test]
    fn test_csv_with_header_and_weights() {
        let text = "source,target,weight\n0, 1, 2.5\n3,1,4\n";
        let graph = read(text, InputFormat::Csv, true, false).unwrap();
        assert_eq!(graph.span(), 4);
        assert_eq!(graph.edge_weight(&0, &1), Some(2.5));
        assert_eq!(graph.edge_weight(&3, &1), Some(4.0));
    }

    #[test]
    fn test_tsv_symmetric() {
        let text = "from\tto\n0\t2\n1\t1\n";
        let graph = read(text, InputFormat::Tsv, false, true).unwrap();
        assert!(graph.has_edge(&0, &2));
        assert!(graph.has_edge(&2, &0));
        assert_eq!(graph.out_neighbors(&1), &[(1, 1.0)]);
        assert_eq!(graph.size(), 3);
    }

    #[test]
    fn test_header_only_allowed_for_delimited_formats() {
        let err = read("source target\n0 1\n", InputFormat::Edgelist, false, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 1, .. }));

        let err = read("0,1\nsource,target\n", InputFormat::Csv, false, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 2, .. }));
    }

    /// Data written with the wrong delimiter is rejected instead of being
    /// mistaken for a header.
    #[test]
    fn test_wrong_delimiter_is_not_a_header() {
        let err = read("0 1\n", InputFormat::Tsv, false, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 1, .. }));

        let err = read("0;1\n1;2\n", InputFormat::Csv, false, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 1, .. }));

        let err = read("# export\n\n12 5\n", InputFormat::Tsv, false, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_weighted_mode_requires_third_column() {
        let err = read("0 1 1\n1 2\n", InputFormat::Edgelist, true, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 2, .. }));

        let err = read("0,1,\n", InputFormat::Csv, true, false).unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_repeated_edge_last_weight_wins() {
        let graph = read("0 1 1\n0 1 6\n", InputFormat::Edgelist, true, false).unwrap();
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.edge_weight(&0, &1), Some(6.0));
    }
}
