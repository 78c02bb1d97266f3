use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::READ_BUFFER_SIZE;
use crate::error::{AuditError, Result};
use crate::types::graph_numeric::{EdgeWeight, VertexId};
use crate::types::graph_query::GraphQuery;
use crate::types::DiGraph;

pub mod coo;
pub mod edgelist;
pub mod mtx;

/// Text encodings accepted for the input graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Matrix Market coordinate format, 1-indexed, header driven.
    Mtx,
    /// Bare 1-indexed `row col [value]` triples.
    Coo,
    /// Whitespace separated `source target [weight]`, 0-indexed.
    Edgelist,
    /// Comma separated `source,target[,weight]`, 0-indexed.
    Csv,
    /// Tab separated `source<TAB>target[<TAB>weight]`, 0-indexed.
    Tsv,
}

impl InputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Mtx => "mtx",
            InputFormat::Coo => "coo",
            InputFormat::Edgelist => "edgelist",
            InputFormat::Csv => "csv",
            InputFormat::Tsv => "tsv",
        }
    }
}

impl FromStr for InputFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mtx" => Ok(InputFormat::Mtx),
            "coo" => Ok(InputFormat::Coo),
            "edgelist" => Ok(InputFormat::Edgelist),
            "csv" => Ok(InputFormat::Csv),
            "tsv" => Ok(InputFormat::Tsv),
            other => Err(AuditError::Configuration(format!("Unknown input format: {other}"))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options shared by every graph reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOptions {
    /// Read the third column as the edge weight. Otherwise every weight is one.
    pub weighted: bool,
    /// Insert the reciprocal of every off-diagonal edge while reading.
    /// A symmetric `mtx` banner mirrors regardless of this flag.
    pub symmetric: bool,
    pub show_progress: bool,
}

/// Reads a graph file in the given format.
pub fn read_graph<K, E>(path: &Path, format: InputFormat, options: &ReadOptions) -> Result<DiGraph<K, E>>
where
    K: VertexId,
    E: EdgeWeight
{
    let file = File::open(path).map_err(|source| AuditError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let graph = read_graph_from(reader, format, options, &path.display().to_string())?;
    info!(format = format.name(), order = graph.span(), size = graph.size(), "graph loaded from {}", path.display());
    Ok(graph)
}

/// Reads a graph from any buffered stream. `input` names the stream in errors.
pub fn read_graph_from<R, K, E>(
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
    debug!(format = format.name(), weighted = options.weighted, symmetric = options.symmetric, "reading {input}");
    match format {
        InputFormat::Mtx => mtx::read_mtx(reader, options, input),
        InputFormat::Coo => coo::read_coo(reader, options, input),
        InputFormat::Edgelist | InputFormat::Csv | InputFormat::Tsv => {
            edgelist::read_edgelist(reader, format, options, input)
        }
    }
}

/// Position inside the stream being parsed, used to build error values.
#[derive(Clone, Copy)]
pub(crate) struct LineContext<'a> {
    pub(crate) input: &'a str,
    pub(crate) line: usize,
}

impl<'a> LineContext<'a> {
    pub(crate) fn error(&self, message: impl Into<String>) -> AuditError {
        AuditError::parse(self.input, self.line, message)
    }

    /// Parses a non-negative integer token.
    pub(crate) fn parse_count(&self, token: &str) -> Result<usize> {
        token
            .parse::<usize>()
            .map_err(|_| self.error(format!("expected a non-negative integer, found `{token}`")))
    }

    /// Parses a 0-indexed vertex id.
    pub(crate) fn parse_vertex<K: VertexId>(&self, token: &str) -> Result<K> {
        let index = self.parse_count(token)?;
        K::from_index(index)
            .ok_or_else(|| self.error(format!("vertex id {index} does not fit the vertex type")))
    }

    /// Parses a 1-indexed vertex id and shifts it to 0-indexed.
    pub(crate) fn parse_vertex_one_based<K: VertexId>(&self, token: &str) -> Result<K> {
        let index = self.parse_count(token)?;
        if index == 0 {
            return Err(self.error("index 0 in a 1-indexed format"));
        }
        K::from_index(index - 1)
            .ok_or_else(|| self.error(format!("vertex id {index} does not fit the vertex type")))
    }

    /// Parses an integer or floating-point weight token.
    pub(crate) fn parse_weight<E: EdgeWeight>(&self, token: &str) -> Result<E> {
        token
            .parse::<f64>()
            .map(E::from_f64)
            .map_err(|_| self.error(format!("expected a numeric weight, found `{token}`")))
    }

    /// Turns the fields of a data line into an edge record.
    ///
    /// Two fields are always required, a third one in weighted mode. Further
    /// fields are ignored.
    pub(crate) fn edge_record<K, E>(&self, fields: &[&str], weighted: bool, one_based: bool) -> Result<(K, K, E)>
    where
        K: VertexId,
        E: EdgeWeight
    {
        let required = if weighted { 3 } else { 2 };
        if fields.len() < required {
            return Err(self.error(format!(
                "expected at least {required} columns, found {}",
                fields.len()
            )));
        }
        let (source, target) = if one_based {
            (self.parse_vertex_one_based(fields[0])?, self.parse_vertex_one_based(fields[1])?)
        } else {
            (self.parse_vertex(fields[0])?, self.parse_vertex(fields[1])?)
        };
        let weight = if weighted {
            self.parse_weight(fields[2])?
        } else {
            E::one()
        };
        Ok((source, target, weight))
    }
}

/// Lines starting with `%` or `#` carry no data.
pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with('%') || line.starts_with('#')
}

/// Inserts an edge and, when `mirror` is set, its reciprocal.
pub(crate) fn insert_edge<K, E>(graph: &mut DiGraph<K, E>, source: K, target: K, weight: E, mirror: bool)
where
    K: VertexId,
    E: EdgeWeight
{
    graph.add_edge(source, target, weight);
    if mirror && source != target {
        graph.add_edge(target, source, weight);
    }
}
