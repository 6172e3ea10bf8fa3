use std::path::PathBuf;
use thiserror::Error;

/// The main error type for boxaug operations.
///
/// Every variant describes a defect in caller input; nothing here is
/// transient, so none of them are retried.
#[derive(Debug, Error)]
pub enum AugmentError {
    #[error("Invalid image dimensions rows={rows}, cols={cols} (must be positive)")]
    InvalidDimension { rows: u32, cols: u32 },

    #[error("Unknown bbox format '{0}' (supported: coco, pascal_voc, yolo, normalized)")]
    UnknownFormat(String),

    #[error("Bounding boxes were supplied but the pipeline has no bbox_params")]
    MissingTargetConfig,

    #[error("Label field '{field}' has {found} value(s) but there are {expected} box(es)")]
    TargetLengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Replay trace has {found} entries but the pipeline has {expected} transform(s)")]
    TraceLengthMismatch { expected: usize, found: usize },

    #[error("Replay trace entry {index} was recorded for '{found}' but the pipeline has '{expected}'")]
    TraceEntryMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Mask is {mask_rows}x{mask_cols} but the image is {rows}x{cols}")]
    MaskShapeMismatch {
        rows: usize,
        cols: usize,
        mask_rows: usize,
        mask_cols: usize,
    },

    #[error("Label field '{0}' conflicts with another target name")]
    LabelFieldConflict(String),

    #[error("Label field '{0}' is not declared in bbox_params.label_fields")]
    UndeclaredLabelField(String),

    #[error("Box at index {index}: {source}")]
    BoxAt {
        index: usize,
        #[source]
        source: Box<AugmentError>,
    },

    #[error("Malformed box: {0}")]
    MalformedBox(String),

    #[error("Invalid {transform}: {message}")]
    InvalidTransform {
        transform: &'static str,
        message: String,
    },

    #[error("{transform} is missing sampled parameter '{key}'")]
    MissingParam { transform: &'static str, key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse pipeline config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl AugmentError {
    /// Wraps an error raised for one element of a box collection.
    pub(crate) fn at_index(index: usize, source: AugmentError) -> Self {
        AugmentError::BoxAt {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn invalid_transform(transform: &'static str, message: impl Into<String>) -> Self {
        AugmentError::InvalidTransform {
            transform,
            message: message.into(),
        }
    }
}
