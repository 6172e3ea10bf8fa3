#![allow(dead_code)]

use boxaug::bbox::{BBox, BBoxFormat, Raw};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value};

pub const EPS_PIXEL: f64 = 1e-9;
pub const EPS_UNIT: f64 = 1e-6;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image size in pixels, `(rows, cols)`.
pub fn arb_frame() -> impl Strategy<Value = (u32, u32)> {
    (8u32..=640, 8u32..=640)
}

pub fn arb_extra() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(|v| json!(v)),
            "[a-z]{1,8}".prop_map(|s| json!(s)),
        ],
        0..3,
    )
}

/// An ordered pixel box lying inside a `rows x cols` image, written in
/// `pascal_voc` form.
pub fn arb_pixel_box(rows: u32, cols: u32) -> impl Strategy<Value = BBox<Raw>> {
    let (w, h) = (cols as f64, rows as f64);
    (0.0..w, 0.0..w, 0.0..h, 0.0..h, arb_extra()).prop_map(|(x1, x2, y1, y2, extra)| {
        BBox::with_extra([x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)], extra)
    })
}

/// A frame together with boxes and one label per box.
pub fn arb_scene(
    max_boxes: usize,
) -> impl Strategy<Value = ((u32, u32), Vec<BBox<Raw>>, Vec<Value>)> {
    arb_frame().prop_flat_map(move |(rows, cols)| {
        prop::collection::vec(arb_pixel_box(rows, cols), 0..=max_boxes).prop_flat_map(
            move |boxes| {
                let n = boxes.len();
                (
                    Just((rows, cols)),
                    Just(boxes),
                    prop::collection::vec(any::<u16>().prop_map(|v| json!(v)), n),
                )
            },
        )
    })
}

/// Rewrites a `pascal_voc` box in another format.
pub fn encode(bbox: &BBox<Raw>, rows: u32, cols: u32, format: BBoxFormat) -> BBox<Raw> {
    let [xmin, ymin, xmax, ymax] = bbox.values;
    let (w, h) = (cols as f64, rows as f64);
    let values = match format {
        BBoxFormat::PascalVoc => bbox.values,
        BBoxFormat::Coco => [xmin, ymin, xmax - xmin, ymax - ymin],
        BBoxFormat::Yolo => [
            (xmin + xmax) / 2.0 / w,
            (ymin + ymax) / 2.0 / h,
            (xmax - xmin) / w,
            (ymax - ymin) / h,
        ],
        BBoxFormat::Normalized => [xmin / w, ymin / h, xmax / w, ymax / h],
    };
    BBox::with_extra(values, bbox.extra.clone())
}

pub fn arb_format() -> impl Strategy<Value = BBoxFormat> {
    prop_oneof![
        Just(BBoxFormat::Coco),
        Just(BBoxFormat::PascalVoc),
        Just(BBoxFormat::Yolo),
        Just(BBoxFormat::Normalized),
    ]
}

pub fn eps_for(format: BBoxFormat) -> f64 {
    match format {
        BBoxFormat::Coco | BBoxFormat::PascalVoc => EPS_PIXEL,
        BBoxFormat::Yolo | BBoxFormat::Normalized => EPS_UNIT,
    }
}

pub fn values_close(a: &[f64; 4], b: &[f64; 4], eps: f64) -> Result<(), String> {
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if (x - y).abs() > eps * (1.0 + y.abs()) {
            return Err(format!("value {} differs: {} vs {} ({:?} vs {:?})", i, x, y, a, b));
        }
    }
    Ok(())
}
