//! Fuzz target for box list parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the box list parser and
//! pushes whatever parses through the format conversions, checking for
//! panics, crashes, or hangs.

#![no_main]

use boxaug::bbox::{convert_bboxes_from_normalized, convert_bboxes_to_normalized, BBoxFormat};
use boxaug::io_json::bboxes_from_json_slice;
use libfuzzer_sys::fuzz_target;

const FORMATS: [BBoxFormat; 4] = [
    BBoxFormat::Coco,
    BBoxFormat::PascalVoc,
    BBoxFormat::Yolo,
    BBoxFormat::Normalized,
];

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(boxes) = bboxes_from_json_slice(data) else {
        return;
    };
    for format in FORMATS {
        if let Ok(normalized) = convert_bboxes_to_normalized(&boxes, 480, 640, format) {
            let _ = convert_bboxes_from_normalized(&normalized, 480, 640, format);
        }
    }
});
