//! Bounding-box configuration shared by every invocation of a pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bbox::{BBoxFormat, DEFAULT_YOLO_EPS};
use crate::error::AugmentError;

/// Target names a label field may not reuse.
pub const RESERVED_TARGET_NAMES: &[&str] = &["image", "mask", "bboxes", "keypoints", "replay"];

/// What happens to a box that extends past the image border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipPolicy {
    /// Clip coordinates into the image, then apply the area checks.
    #[default]
    Clamp,
    /// Drop the box outright.
    Reject,
}

/// How boxes are encoded by the caller and which ones survive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BboxParams {
    pub format: BBoxFormat,

    /// Label sequences supplied next to the boxes, in merge order.
    #[serde(default)]
    pub label_fields: Vec<String>,

    /// Boxes whose clipped area in pixels falls below this are dropped.
    #[serde(default)]
    pub min_area: f64,

    /// Boxes keeping less than this fraction of their area after clipping
    /// are dropped.
    #[serde(default)]
    pub min_visibility: f64,

    /// Filter after every fired transform instead of only at the end.
    #[serde(default = "default_true")]
    pub check_each_transform: bool,

    #[serde(default)]
    pub clip: ClipPolicy,

    /// Boundary tolerance used when reading `yolo` boxes.
    #[serde(default = "default_yolo_eps")]
    pub yolo_eps: f64,
}

fn default_true() -> bool {
    true
}

fn default_yolo_eps() -> f64 {
    DEFAULT_YOLO_EPS
}

impl BboxParams {
    pub fn new(format: BBoxFormat) -> Self {
        Self {
            format,
            label_fields: Vec::new(),
            min_area: 0.0,
            min_visibility: 0.0,
            check_each_transform: true,
            clip: ClipPolicy::Clamp,
            yolo_eps: DEFAULT_YOLO_EPS,
        }
    }

    pub fn with_label_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_min_visibility(mut self, min_visibility: f64) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    pub fn with_check_each_transform(mut self, check: bool) -> Self {
        self.check_each_transform = check;
        self
    }

    pub fn with_clip(mut self, clip: ClipPolicy) -> Self {
        self.clip = clip;
        self
    }

    /// Checks label field names are unique and not reserved target names.
    pub fn validate(&self) -> Result<(), AugmentError> {
        let mut seen = HashSet::new();
        for field in &self.label_fields {
            if RESERVED_TARGET_NAMES.contains(&field.as_str()) || !seen.insert(field.as_str()) {
                return Err(AugmentError::LabelFieldConflict(field.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_yaml() {
        let params: BboxParams = serde_yaml::from_str("format: coco\n").unwrap();
        assert_eq!(params, BboxParams::new(BBoxFormat::Coco));
        assert!(params.check_each_transform);
        assert_eq!(params.clip, ClipPolicy::Clamp);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "format: pascal_voc\nlabel_fields: [labels, id]\nmin_area: 16\nmin_visibility: 0.3\nclip: reject\n";
        let params: BboxParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.format, BBoxFormat::PascalVoc);
        assert_eq!(params.label_fields, vec!["labels", "id"]);
        assert_eq!(params.min_area, 16.0);
        assert_eq!(params.clip, ClipPolicy::Reject);
    }

    #[test]
    fn test_unknown_format_in_config() {
        let err = serde_yaml::from_str::<BboxParams>("format: xywh\n").unwrap_err();
        assert!(err.to_string().contains("xywh"));
    }

    #[test]
    fn test_label_field_conflicts() {
        let reserved = BboxParams::new(BBoxFormat::Coco).with_label_fields(["bboxes"]);
        assert!(matches!(
            reserved.validate(),
            Err(AugmentError::LabelFieldConflict(name)) if name == "bboxes"
        ));

        let duplicate = BboxParams::new(BBoxFormat::Coco).with_label_fields(["id", "id"]);
        assert!(duplicate.validate().is_err());

        let ok = BboxParams::new(BBoxFormat::Coco).with_label_fields(["id", "labels"]);
        assert!(ok.validate().is_ok());
    }
}
