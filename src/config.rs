//! Pipeline configuration files.
//!
//! A pipeline is described in YAML (JSON works too, being a subset):
//!
//! ```yaml
//! seed: 42
//! bbox_params:
//!   format: pascal_voc
//!   label_fields: [labels]
//!   min_area: 16
//! transforms:
//!   - type: RandomCrop
//!     height: 256
//!     width: 256
//!     p: 1.0
//!   - type: HorizontalFlip
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::compose::ReplayCompose;
use crate::error::AugmentError;
use crate::targets::BboxParams;
use crate::transforms::TransformSpec;

/// Everything needed to build a pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub transforms: Vec<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox_params: Option<BboxParams>,

    /// Seed for the random source when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Builds the transforms and wraps them in a recording pipeline.
    pub fn build(&self) -> Result<ReplayCompose, AugmentError> {
        let transforms = self
            .transforms
            .iter()
            .map(TransformSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        ReplayCompose::new(transforms, self.bbox_params.clone())
    }
}

/// Reads a pipeline config from a YAML or JSON file.
pub fn read_pipeline_config(path: &Path) -> Result<PipelineConfig, AugmentError> {
    let file = File::open(path).map_err(AugmentError::Io)?;
    let reader = BufReader::new(file);

    serde_yaml::from_reader(reader).map_err(|source| AugmentError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a pipeline config from a string.
///
/// Useful for testing without file I/O.
pub fn from_yaml_str(yaml: &str) -> Result<PipelineConfig, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
