//! Keeps boxes and their label sequences aligned through a pipeline.
//!
//! On entry, each caller box and the matching element of every declared
//! label sequence are merged into one [`TrackedBox`], and the box is moved
//! into normalized form. Transforms and filtering then act on whole records,
//! so dropping a box drops its labels with it. On exit the records are split
//! back into the caller's format and per-field sequences.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::params::{BboxParams, ClipPolicy};
use super::survival::{DropReason, SurvivalReport};
use super::Frame;
use crate::bbox::{self, BBox, Normalized, Raw};
use crate::error::AugmentError;

/// One box plus its externally supplied labels.
///
/// Embedded auxiliary fields stay in `bbox.extra`; `labels` holds one value
/// per declared label field, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedBox {
    pub bbox: BBox<Normalized>,
    pub labels: Vec<Value>,
}

/// Applies one [`BboxParams`] at the pipeline boundaries.
#[derive(Clone, Debug)]
pub struct BboxProcessor {
    params: BboxParams,
}

impl BboxProcessor {
    /// Fails with [`AugmentError::LabelFieldConflict`] on a bad field list.
    pub fn new(params: BboxParams) -> Result<Self, AugmentError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BboxParams {
        &self.params
    }

    /// Checks every supplied label sequence is declared and every declared
    /// one has exactly one value per box. A missing sequence counts as empty.
    pub fn check_labels(
        &self,
        box_count: usize,
        labels: &BTreeMap<String, Vec<Value>>,
    ) -> Result<(), AugmentError> {
        if let Some(name) = labels
            .keys()
            .find(|name| !self.params.label_fields.contains(name))
        {
            return Err(AugmentError::UndeclaredLabelField(name.clone()));
        }

        for field in &self.params.label_fields {
            let found = labels.get(field).map_or(0, Vec::len);
            if found != box_count {
                return Err(AugmentError::TargetLengthMismatch {
                    field: field.clone(),
                    expected: box_count,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Merges boxes with their labels and converts them to normalized form.
    pub fn preprocess(
        &self,
        bboxes: &[BBox<Raw>],
        labels: &BTreeMap<String, Vec<Value>>,
        frame: Frame,
    ) -> Result<Vec<TrackedBox>, AugmentError> {
        self.check_labels(bboxes.len(), labels)?;

        let mut tracked = Vec::with_capacity(bboxes.len());
        for (index, raw) in bboxes.iter().enumerate() {
            let bbox = bbox::convert_to_normalized_with_eps(
                raw,
                frame.rows,
                frame.cols,
                self.params.format,
                self.params.yolo_eps,
            )
            .map_err(|e| AugmentError::at_index(index, e))?;

            let labels = self
                .params
                .label_fields
                .iter()
                .map(|field| labels[field][index].clone())
                .collect();

            tracked.push(TrackedBox { bbox, labels });
        }

        trace!(count = tracked.len(), format = %self.params.format, "boxes normalized");
        Ok(tracked)
    }

    /// Applies the clip policy and the area/visibility thresholds.
    ///
    /// Survivors keep their relative order. With [`ClipPolicy::Clamp`] the
    /// survivors come back clipped to the unit square.
    pub fn filter(
        &self,
        boxes: Vec<TrackedBox>,
        frame: Frame,
    ) -> Result<(Vec<TrackedBox>, SurvivalReport), AugmentError> {
        let mut report = SurvivalReport::new();
        let mut kept = Vec::with_capacity(boxes.len());

        for (index, mut tracked) in boxes.into_iter().enumerate() {
            let rect = tracked.bbox.rect();
            if !rect.is_finite() {
                report.add(index, DropReason::NotFinite, f64::NAN);
                continue;
            }

            let unclipped_area = bbox::area(&tracked.bbox, frame.rows, frame.cols)
                .map_err(|e| AugmentError::at_index(index, e))?;

            if self.params.clip == ClipPolicy::Reject && !rect.is_within_unit() {
                report.add(index, DropReason::OutOfBounds, unclipped_area);
                continue;
            }

            tracked.bbox.set_rect(rect.clamp_unit());
            let clipped_area = bbox::area(&tracked.bbox, frame.rows, frame.cols)
                .map_err(|e| AugmentError::at_index(index, e))?;

            if clipped_area < self.params.min_area {
                report.add(index, DropReason::BelowMinArea, clipped_area);
                continue;
            }

            let visibility = if unclipped_area > 0.0 {
                clipped_area / unclipped_area
            } else {
                0.0
            };
            if visibility < self.params.min_visibility {
                report.add(index, DropReason::BelowMinVisibility, clipped_area);
                continue;
            }

            kept.push(tracked);
        }

        if !report.is_clean() {
            debug!(
                kept = kept.len(),
                dropped = report.dropped_count(),
                "survival policy: {}",
                report
            );
        }
        Ok((kept, report))
    }

    /// Converts boxes back to the caller's format and splits the labels
    /// into one sequence per declared field.
    ///
    /// Every declared field is present in the output, empty when no boxes
    /// remain.
    pub fn postprocess(
        &self,
        boxes: Vec<TrackedBox>,
        frame: Frame,
    ) -> Result<(Vec<BBox<Raw>>, BTreeMap<String, Vec<Value>>), AugmentError> {
        let mut columns: Vec<Vec<Value>> = self
            .params
            .label_fields
            .iter()
            .map(|_| Vec::with_capacity(boxes.len()))
            .collect();
        let mut bboxes = Vec::with_capacity(boxes.len());

        for (index, tracked) in boxes.into_iter().enumerate() {
            let raw = bbox::convert_from_normalized(
                &tracked.bbox,
                frame.rows,
                frame.cols,
                self.params.format,
            )
            .map_err(|e| AugmentError::at_index(index, e))?;
            bboxes.push(raw);

            for (column, value) in columns.iter_mut().zip(tracked.labels) {
                column.push(value);
            }
        }

        let labels = self
            .params
            .label_fields
            .iter()
            .cloned()
            .zip(columns)
            .collect();
        Ok((bboxes, labels))
    }
}
