//! JSON files for annotation documents and replay traces.
//!
//! An annotation document describes one image by its size plus the targets
//! that travel with it:
//!
//! ```json
//! {
//!   "height": 512, "width": 384,
//!   "bboxes": [[78, 42, 142, 80], [32, 12, 42, 72]],
//!   "labels": {"labels": [0, 1]}
//! }
//! ```
//!
//! The command line runs pipelines over these documents against a blank
//! image of the stated size; decoding real pixels is left to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::bbox::{BBox, Raw};
use crate::compose::ReplayTrace;
use crate::error::AugmentError;
use crate::targets::{Image, Keypoint, Targets};

fn default_channels() -> u32 {
    3
}

/// One image's annotations, as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub height: u32,
    pub width: u32,

    #[serde(default = "default_channels")]
    pub channels: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bboxes: Option<Vec<BBox<Raw>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<Vec<Keypoint>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, Vec<Value>>,

    /// Present on pipeline output: the trace that reproduces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay: Option<ReplayTrace>,
}

impl AnnotationDocument {
    /// Builds a bundle around a zero-filled image of the document's size.
    pub fn to_targets(&self) -> Result<Targets, AugmentError> {
        if self.height == 0 || self.width == 0 {
            return Err(AugmentError::InvalidDimension {
                rows: self.height,
                cols: self.width,
            });
        }
        let image = Image::zeros((
            self.height as usize,
            self.width as usize,
            self.channels.max(1) as usize,
        ));
        Ok(Targets {
            image,
            mask: None,
            bboxes: self.bboxes.clone(),
            keypoints: self.keypoints.clone(),
            labels: self.labels.clone(),
        })
    }

    /// Describes a transformed bundle, dropping the pixels.
    pub fn from_targets(targets: Targets, replay: Option<ReplayTrace>) -> Self {
        let (height, width, channels) = targets.image.dim();
        Self {
            height: height as u32,
            width: width as u32,
            channels: channels as u32,
            bboxes: targets.bboxes,
            keypoints: targets.keypoints,
            labels: targets.labels,
            replay,
        }
    }
}

/// Reads an annotation document from a JSON file.
pub fn read_document(path: &Path) -> Result<AnnotationDocument, AugmentError> {
    read_json(path)
}

/// Writes an annotation document to a JSON file.
pub fn write_document(path: &Path, doc: &AnnotationDocument) -> Result<(), AugmentError> {
    let file = File::create(path).map_err(AugmentError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, doc).map_err(|source| AugmentError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a replay trace from a JSON file.
///
/// Accepts either a bare trace array or a whole pipeline output document,
/// in which case its `replay` key is used.
pub fn read_trace(path: &Path) -> Result<ReplayTrace, AugmentError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TraceFile {
        Bare(ReplayTrace),
        Document { replay: ReplayTrace },
    }

    Ok(match read_json::<TraceFile>(path)? {
        TraceFile::Bare(trace) => trace,
        TraceFile::Document { replay } => replay,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AugmentError> {
    let file = File::open(path).map_err(AugmentError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| AugmentError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a list of boxes from JSON bytes.
pub fn bboxes_from_json_slice(bytes: &[u8]) -> Result<Vec<BBox<Raw>>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Parses an annotation document from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<AnnotationDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes an annotation document to a JSON string.
pub fn to_json_string(doc: &AnnotationDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
