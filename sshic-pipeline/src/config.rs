use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sshic_contacts::AssociationOptions;
use sshic_core::consts::{
    ARTIFICIAL_CHROMOSOME, DEFAULT_CHROMOSOME_ORDER, DEFAULT_CIS_RANGE, DOUBLE_STRANDED_TYPE,
};
use sshic_core::models::ChromosomeOrder;

/// A reference sample whose global statistics table capture efficiencies are compared against.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ReferenceSample {
    pub name: String,
    pub path: PathBuf,
}

impl ReferenceSample {
    /// Parse `name=path`, or a bare path whose file name up to the first `.` is the name.
    pub fn parse(value: &str) -> Self {
        match value.split_once('=') {
            Some((name, path)) => ReferenceSample {
                name: name.to_string(),
                path: PathBuf::from(path),
            },
            None => {
                let path = PathBuf::from(value);
                let name = path
                    .file_name()
                    .and_then(OsStr::to_str)
                    .and_then(|n| n.split('.').next())
                    .unwrap_or(value)
                    .to_string();
                ReferenceSample { name, path }
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Canonical chromosome order every table is sorted by.
    pub chromosome_order: Vec<String>,
    /// Chromosomes whose fragments are scanned backwards when binding probes.
    pub reverse_search_chromosomes: Vec<String>,
    pub cis_range: u64,
    /// Probe type used as the capture efficiency reference class.
    pub reference_probe_type: String,
    pub bin_sizes: Vec<u64>,
    pub centromere_window: u64,
    pub centromere_bin_size: u64,
    pub telomere_window: u64,
    pub telomere_bin_size: u64,
    pub excluded_chromosomes: Vec<String>,
    pub mask_probe_chromosome: bool,
    pub references: Vec<ReferenceSample>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            chromosome_order: DEFAULT_CHROMOSOME_ORDER
                .iter()
                .map(|c| c.to_string())
                .collect(),
            reverse_search_chromosomes: vec![ARTIFICIAL_CHROMOSOME.to_string()],
            cis_range: DEFAULT_CIS_RANGE,
            reference_probe_type: DOUBLE_STRANDED_TYPE.to_string(),
            bin_sizes: vec![1_000, 5_000, 10_000, 20_000, 50_000, 100_000],
            centromere_window: 150_000,
            centromere_bin_size: 10_000,
            telomere_window: 15_000,
            telomere_bin_size: 1_000,
            excluded_chromosomes: Vec::new(),
            mask_probe_chromosome: true,
            references: Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing or invalid file extension in pipeline config file. It must be `toml`, `yaml` or `yml`")]
    InvalidFileType,
    #[error("Invalid pipeline config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl PipelineConfig {
    pub fn chromosome_order(&self) -> ChromosomeOrder {
        ChromosomeOrder::new(self.chromosome_order.as_slice())
    }

    pub fn association_options(&self) -> AssociationOptions {
        AssociationOptions {
            reverse_search: self.reverse_search_chromosomes.clone(),
        }
    }

    /// Requested bin sizes plus those the aggregator reads, ascending and deduplicated.
    pub fn all_bin_sizes(&self) -> Vec<u64> {
        let mut sizes = self.bin_sizes.clone();
        sizes.push(self.centromere_bin_size);
        sizes.push(self.telomere_bin_size);
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.all_bin_sizes().contains(&0) {
            return Err(ConfigError::Invalid(
                "bin sizes must be strictly positive".to_string(),
            ));
        }
        if self.chromosome_order.is_empty() {
            return Err(ConfigError::Invalid(
                "chromosome_order can't be empty".to_string(),
            ));
        }
        let mut names: Vec<&str> = self.references.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::Invalid(
                "reference names must be unique".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&Path> for PipelineConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> ConfigResult<Self> {
        let raw = read_to_string(path)?;
        let config: PipelineConfig = match path.extension().and_then(OsStr::to_str) {
            Some("toml") => toml::from_str(&raw)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
            _ => return Err(ConfigError::InvalidFileType),
        };
        config.validate()?;
        Ok(config)
    }
}
