//! Names of the annotation formats a caller can declare.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AugmentError;

/// How the four values of a caller-supplied box are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BBoxFormat {
    /// `(x_min, y_min, width, height)` in pixels.
    Coco,
    /// `(x_min, y_min, x_max, y_max)` in pixels.
    PascalVoc,
    /// `(x_center, y_center, width, height)`, each divided by the image size.
    Yolo,
    /// Already in the internal normalized corner-corner form.
    Normalized,
}

impl BBoxFormat {
    /// The case-sensitive name used in configs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BBoxFormat::Coco => "coco",
            BBoxFormat::PascalVoc => "pascal_voc",
            BBoxFormat::Yolo => "yolo",
            BBoxFormat::Normalized => "normalized",
        }
    }
}

impl FromStr for BBoxFormat {
    type Err = AugmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coco" => Ok(BBoxFormat::Coco),
            "pascal_voc" => Ok(BBoxFormat::PascalVoc),
            "yolo" => Ok(BBoxFormat::Yolo),
            "normalized" => Ok(BBoxFormat::Normalized),
            other => Err(AugmentError::UnknownFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for BBoxFormat {
    type Error = AugmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BBoxFormat> for String {
    fn from(value: BBoxFormat) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BBoxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_formats() {
        for format in [
            BBoxFormat::Coco,
            BBoxFormat::PascalVoc,
            BBoxFormat::Yolo,
            BBoxFormat::Normalized,
        ] {
            assert_eq!(format.as_str().parse::<BBoxFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "COCO".parse::<BBoxFormat>().unwrap_err();
        assert!(matches!(err, AugmentError::UnknownFormat(name) if name == "COCO"));
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&BBoxFormat::PascalVoc).unwrap();
        assert_eq!(json, "\"pascal_voc\"");
        assert!(serde_json::from_str::<BBoxFormat>("\"voc\"").is_err());
    }
}
