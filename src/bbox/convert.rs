//! Conversions between caller formats and the internal normalized form.
//!
//! Everything downstream of these functions works on
//! [`BBox<Normalized>`](super::BBox): conversion happens once on the way in
//! and once on the way out. For `coco` and `pascal_voc` the two directions
//! are inverse up to floating point. For `yolo` the way in clamps to the
//! unit square, so the round trip only holds for boxes that already fit.

use super::format::BBoxFormat;
use super::model::BBox;
use super::xyxy::BBoxXYXY;
use super::{Normalized, Pixel, Raw};
use crate::error::AugmentError;

/// Distance from 0 or 1 within which a yolo-derived coordinate snaps onto
/// the boundary.
pub const DEFAULT_YOLO_EPS: f64 = 1e-7;

fn check_dims(rows: u32, cols: u32) -> Result<(f64, f64), AugmentError> {
    if rows == 0 || cols == 0 {
        return Err(AugmentError::InvalidDimension { rows, cols });
    }
    Ok((rows as f64, cols as f64))
}

/// Divides x coordinates by `cols` and y coordinates by `rows`.
///
/// No bounds are enforced.
pub fn normalize(
    bbox: &BBox<Pixel>,
    rows: u32,
    cols: u32,
) -> Result<BBox<Normalized>, AugmentError> {
    let (rows, cols) = check_dims(rows, cols)?;
    let rect = bbox.rect().to_normalized(rows, cols);
    Ok(bbox.clone().map_space(rect.to_array()))
}

/// Multiplies x coordinates by `cols` and y coordinates by `rows`.
pub fn denormalize(
    bbox: &BBox<Normalized>,
    rows: u32,
    cols: u32,
) -> Result<BBox<Pixel>, AugmentError> {
    let (rows, cols) = check_dims(rows, cols)?;
    let rect = bbox.rect().to_pixel(rows, cols);
    Ok(bbox.clone().map_space(rect.to_array()))
}

// Minimum coordinates resolve toward 0 and maximum coordinates toward 1, so
// a box edge that lands within `eps` of the border sits exactly on it.
fn clamp_low(v: f64, eps: f64) -> f64 {
    if v < eps {
        0.0
    } else {
        v.min(1.0)
    }
}

fn clamp_high(v: f64, eps: f64) -> f64 {
    if v > 1.0 - eps {
        1.0
    } else {
        v.max(0.0)
    }
}

/// Converts a caller box into the internal normalized form.
pub fn convert_to_normalized(
    bbox: &BBox<Raw>,
    rows: u32,
    cols: u32,
    source_format: BBoxFormat,
) -> Result<BBox<Normalized>, AugmentError> {
    convert_to_normalized_with_eps(bbox, rows, cols, source_format, DEFAULT_YOLO_EPS)
}

/// [`convert_to_normalized`] with an explicit yolo boundary tolerance.
pub fn convert_to_normalized_with_eps(
    bbox: &BBox<Raw>,
    rows: u32,
    cols: u32,
    source_format: BBoxFormat,
    yolo_eps: f64,
) -> Result<BBox<Normalized>, AugmentError> {
    let [a, b, c, d] = bbox.values;
    let pixel = match source_format {
        BBoxFormat::Coco => BBoxXYXY::<Pixel>::from_xywh(a, b, c, d),
        BBoxFormat::PascalVoc => BBoxXYXY::<Pixel>::from_xyxy(a, b, c, d),
        BBoxFormat::Yolo => {
            check_dims(rows, cols)?;
            let rect = BBoxXYXY::<Normalized>::from_cxcywh(a, b, c, d);
            let values = [
                clamp_low(rect.xmin(), yolo_eps),
                clamp_low(rect.ymin(), yolo_eps),
                clamp_high(rect.xmax(), yolo_eps),
                clamp_high(rect.ymax(), yolo_eps),
            ];
            return Ok(bbox.clone().map_space(values));
        }
        BBoxFormat::Normalized => {
            check_dims(rows, cols)?;
            return Ok(bbox.clone().map_space(bbox.values));
        }
    };
    normalize(&bbox.clone().map_space(pixel.to_array()), rows, cols)
}

/// Converts an internal normalized box back into the caller's format.
pub fn convert_from_normalized(
    bbox: &BBox<Normalized>,
    rows: u32,
    cols: u32,
    target_format: BBoxFormat,
) -> Result<BBox<Raw>, AugmentError> {
    let values = match target_format {
        BBoxFormat::Yolo => {
            check_dims(rows, cols)?;
            let (cx, cy, w, h) = bbox.rect().to_cxcywh();
            [cx, cy, w, h]
        }
        BBoxFormat::Normalized => {
            check_dims(rows, cols)?;
            bbox.values
        }
        BBoxFormat::PascalVoc => denormalize(bbox, rows, cols)?.values,
        BBoxFormat::Coco => {
            let (x, y, w, h) = denormalize(bbox, rows, cols)?.rect().to_xywh();
            [x, y, w, h]
        }
    };
    Ok(bbox.clone().map_space(values))
}

/// Area of a normalized box in pixels.
///
/// The caller is responsible for passing an ordered box; an inverted one
/// yields a negative product.
pub fn area(bbox: &BBox<Normalized>, rows: u32, cols: u32) -> Result<f64, AugmentError> {
    let rect = denormalize(bbox, rows, cols)?.rect();
    Ok(rect.width() * rect.height())
}

// Plural forms: same order, same length, and the offending index on failure.

fn map_indexed<T, U, F>(items: &[T], mut f: F) -> Result<Vec<U>, AugmentError>
where
    F: FnMut(&T) -> Result<U, AugmentError>,
{
    items
        .iter()
        .enumerate()
        .map(|(index, item)| f(item).map_err(|e| AugmentError::at_index(index, e)))
        .collect()
}

pub fn normalize_bboxes(
    bboxes: &[BBox<Pixel>],
    rows: u32,
    cols: u32,
) -> Result<Vec<BBox<Normalized>>, AugmentError> {
    map_indexed(bboxes, |b| normalize(b, rows, cols))
}

pub fn denormalize_bboxes(
    bboxes: &[BBox<Normalized>],
    rows: u32,
    cols: u32,
) -> Result<Vec<BBox<Pixel>>, AugmentError> {
    map_indexed(bboxes, |b| denormalize(b, rows, cols))
}

pub fn convert_bboxes_to_normalized(
    bboxes: &[BBox<Raw>],
    rows: u32,
    cols: u32,
    source_format: BBoxFormat,
) -> Result<Vec<BBox<Normalized>>, AugmentError> {
    map_indexed(bboxes, |b| convert_to_normalized(b, rows, cols, source_format))
}

pub fn convert_bboxes_from_normalized(
    bboxes: &[BBox<Normalized>],
    rows: u32,
    cols: u32,
    target_format: BBoxFormat,
) -> Result<Vec<BBox<Raw>>, AugmentError> {
    map_indexed(bboxes, |b| {
        convert_from_normalized(b, rows, cols, target_format)
    })
}

pub fn bbox_areas(
    bboxes: &[BBox<Normalized>],
    rows: u32,
    cols: u32,
) -> Result<Vec<f64>, AugmentError> {
    map_indexed(bboxes, |b| area(b, rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: &[f64; 4], b: &[f64; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-8 + 1e-5 * y.abs())
    }

    #[test]
    fn test_normalize_bbox() {
        let bbox: BBox<Pixel> = BBox::with_extra([15.0, 25.0, 100.0, 200.0], vec![json!(99)]);
        let n = normalize(&bbox, 200, 400).unwrap();
        assert_eq!(n.values, [0.0375, 0.125, 0.25, 1.0]);
        assert_eq!(n.extra, vec![json!(99)]);
    }

    #[test]
    fn test_denormalize_bbox() {
        let bbox: BBox<Normalized> = BBox::new([0.0375, 0.125, 0.25, 1.0]);
        let p = denormalize(&bbox, 200, 400).unwrap();
        assert_eq!(p.values, [15.0, 25.0, 100.0, 200.0]);
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let bbox: BBox<Pixel> = BBox::new([1.0, 1.0, 2.0, 2.0]);
        let err = normalize(&bbox, 0, 10).unwrap_err();
        assert!(matches!(err, AugmentError::InvalidDimension { rows: 0, cols: 10 }));

        let raw: BBox<Raw> = BBox::new([0.5, 0.5, 0.1, 0.1]);
        assert!(convert_to_normalized(&raw, 10, 0, BBoxFormat::Yolo).is_err());
    }

    #[test]
    fn test_area() {
        let full: BBox<Normalized> = BBox::new([0.0, 0.0, 1.0, 1.0]);
        assert_eq!(area(&full, 50, 100).unwrap(), 5000.0);

        let partial: BBox<Normalized> = BBox::with_extra([0.2, 0.2, 1.0, 1.0], vec![json!(99)]);
        assert_eq!(area(&partial, 50, 50).unwrap(), 1600.0);
    }

    #[test]
    fn test_yolo_edge_snaps_to_boundary() {
        let raw: BBox<Raw> = BBox::new([0.99662423, 0.7520255, 0.00675154, 0.01446759]);
        let n = convert_to_normalized(&raw, 100, 100, BBoxFormat::Yolo).unwrap();
        assert_eq!(n.values[2], 1.0);
        assert!(close(&n.values, &[0.99324846, 0.744791705, 1.0, 0.759259295]));
    }

    #[test]
    fn test_yolo_out_of_range_is_clamped() {
        let raw: BBox<Raw> = BBox::new([0.05, 0.95, 0.2, 0.2]);
        let n = convert_to_normalized(&raw, 100, 100, BBoxFormat::Yolo).unwrap();
        assert_eq!(n.values[0], 0.0);
        assert_eq!(n.values[3], 1.0);
    }

    #[test]
    fn test_yolo_eps_is_configurable() {
        let raw: BBox<Raw> = BBox::new([0.5, 0.5, 0.998, 0.5]);
        let strict = convert_to_normalized(&raw, 10, 10, BBoxFormat::Yolo).unwrap();
        assert!(strict.values[0] > 0.0);
        let loose = convert_to_normalized_with_eps(&raw, 10, 10, BBoxFormat::Yolo, 0.01).unwrap();
        assert_eq!(loose.values[0], 0.0);
        assert_eq!(loose.values[2], 1.0);
    }

    #[test]
    fn test_plural_reports_index() {
        let bboxes: Vec<BBox<Pixel>> = vec![BBox::new([0.0, 0.0, 1.0, 1.0])];
        let err = normalize_bboxes(&bboxes, 0, 0).unwrap_err();
        assert!(matches!(err, AugmentError::BoxAt { index: 0, .. }));
    }
}
