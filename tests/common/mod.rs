#![allow(dead_code)]

use std::fs;
use std::path::Path;

use boxaug::bbox::{BBox, Raw};
use boxaug::targets::Image;
use serde_json::Value;

/// Tolerance used by `assert_close`, matching numpy's `isclose` defaults.
pub const RTOL: f64 = 1e-5;
pub const ATOL: f64 = 1e-8;

pub fn ones(rows: usize, cols: usize) -> Image {
    Image::ones((rows, cols, 3))
}

/// A single-channel image whose samples count up in row-major order.
pub fn ramp(rows: usize, cols: usize) -> Image {
    Image::from_shape_fn((rows, cols, 1), |(y, x, _)| (y * cols + x) as f32)
}

pub fn raw(values: [f64; 4]) -> BBox<Raw> {
    BBox::new(values)
}

pub fn raw_with(values: [f64; 4], extra: Vec<Value>) -> BBox<Raw> {
    BBox::with_extra(values, extra)
}

pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

pub fn assert_close(actual: [f64; 4], expected: [f64; 4]) {
    assert!(
        actual.iter().zip(expected).all(|(a, b)| is_close(*a, b)),
        "{:?} is not close to {:?}",
        actual,
        expected
    );
}

/// Compares two box lists value by value, extras exactly.
pub fn assert_boxes_close<S>(actual: &[BBox<S>], expected: &[BBox<S>]) {
    assert_eq!(actual.len(), expected.len(), "box count differs");
    for (a, e) in actual.iter().zip(expected) {
        assert_close(a.values, e.values);
        assert_eq!(a.extra, e.extra);
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}
