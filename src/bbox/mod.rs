//! The bounding-box coordinate model.
//!
//! Boxes arrive in one of the caller's annotation formats and are converted
//! once into a single internal representation: corner-corner coordinates
//! divided by the image size. Every transform works on that form only,
//! which keeps geometry code ignorant of `coco`, `pascal_voc` and `yolo`.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: marker types keep pixel, normalized and caller-format
//!    boxes from being mixed up at compile time.
//!
//! 2. **Opaque extras**: any values after the fourth coordinate are carried
//!    through every operation untouched.
//!
//! 3. **Permissive Construction**: boxes may be inverted or out of bounds;
//!    the survival policy decides what happens to them.
//!
//! # Example
//!
//! ```
//! use boxaug::bbox::{convert_to_normalized, BBox, BBoxFormat, Raw};
//!
//! let coco: BBox<Raw> = BBox::new([20.0, 30.0, 40.0, 50.0]);
//! let n = convert_to_normalized(&coco, 100, 100, BBoxFormat::Coco).unwrap();
//! assert!((n.values[2] - 0.6).abs() < 1e-12);
//! ```

mod convert;
mod coord;
mod format;
mod model;
mod space;
mod xyxy;

pub use convert::{
    area, bbox_areas, convert_bboxes_from_normalized, convert_bboxes_to_normalized,
    convert_from_normalized, convert_to_normalized, convert_to_normalized_with_eps, denormalize,
    denormalize_bboxes, normalize, normalize_bboxes, DEFAULT_YOLO_EPS,
};
pub use coord::Coord;
pub use format::BBoxFormat;
pub use model::{BBox, CornerSpace};
pub use space::{Normalized, Pixel, Raw};
pub use xyxy::BBoxXYXY;
