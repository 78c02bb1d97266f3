use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::graph_io::InputFormat;

/// Capacity of the buffered readers used for graph and membership files.
pub const READ_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Vertex and community id type used by the command line tool.
pub type DefaultVertexId = u32;

/// Edge weight type used by the command line tool.
pub type DefaultWeight = f32;

/// Settings of one audit run.
///
/// The same structure is filled from a YAML file (`--config`) and from the
/// command line, where explicit flags override the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Graph file.
    pub input: Option<PathBuf>,
    /// Encoding of the graph file.
    pub input_format: InputFormat,
    /// Community membership file.
    pub membership: Option<PathBuf>,
    /// Membership lines are `vertex community` pairs instead of one community per line.
    pub membership_keyed: bool,
    /// Index origin of the membership file, applied to vertex keys and community ids.
    pub membership_start: usize,
    /// Read a weight column from the graph file.
    pub weighted: bool,
    /// The graph file is already undirected; skip symmetrization.
    pub symmetric: bool,
    /// Worker pool size, 0 lets rayon decide.
    pub num_threads: usize,
    /// Where to write the YAML report, if anywhere.
    pub report: Option<PathBuf>,
    /// Draw progress spinners on stderr.
    pub show_progress: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            input: None,
            input_format: InputFormat::Mtx,
            membership: None,
            membership_keyed: false,
            membership_start: 0,
            weighted: false,
            symmetric: false,
            num_threads: 0,
            report: None,
            show_progress: true,
        }
    }
}

impl AuditConfig {
    /// Parses a configuration from YAML text. Missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: AuditConfig = serde_yaml::from_str(text)?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| AuditError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Checks that both required files are named.
    ///
    /// # Returns
    /// The input graph path and the membership path.
    pub fn validate(&self) -> Result<(&Path, &Path)> {
        let input = match self.input.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(AuditError::Configuration("Input file is not specified.".into())),
        };
        let membership = match self.membership.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(AuditError::Configuration(
                    "Community membership file is not specified.".into(),
                ))
            }
        };
        Ok((input, membership))
    }
}

#[cfg(test)]
mod test_config {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let config = AuditConfig::from_yaml_str("input: graph.mtx\nmembership: comm.txt\n").unwrap();
        assert_eq!(config.input.as_deref(), Some(Path::new("graph.mtx")));
        assert_eq!(config.input_format, InputFormat::Mtx);
        assert!(!config.membership_keyed);
        assert_eq!(config.num_threads, 0);
        assert!(config.show_progress);
    }

    #[test]
    fn test_yaml_full() {
        let text = "\
input: web.tsv
input_format: tsv
membership: web.comm
membership_keyed: true
membership_start: 1
weighted: true
symmetric: true
num_threads: 8
report: out.yaml
show_progress: false
";
        let config = AuditConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.input_format, InputFormat::Tsv);
        assert!(config.membership_keyed);
        assert_eq!(config.membership_start, 1);
        assert!(config.weighted && config.symmetric);
        assert_eq!(config.num_threads, 8);
        assert_eq!(config.report.as_deref(), Some(Path::new("out.yaml")));
    }

    #[test]
    fn test_yaml_rejects_unknown_format_and_keys() {
        assert!(matches!(
            AuditConfig::from_yaml_str("input_format: graphml\n"),
            Err(AuditError::Yaml(_))
        ));
        assert!(matches!(
            AuditConfig::from_yaml_str("threads: 4\n"),
            Err(AuditError::Yaml(_))
        ));
    }

    #[test]
    fn test_validate_missing_files() {
        let mut config = AuditConfig::default();
        assert!(matches!(config.validate(), Err(AuditError::Configuration(_))));
        config.input = Some(PathBuf::from("g.mtx"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("membership"));
        config.membership = Some(PathBuf::from("m.txt"));
        let (input, membership) = config.validate().unwrap();
        assert_eq!(input, Path::new("g.mtx"));
        assert_eq!(membership, Path::new("m.txt"));
    }
}
