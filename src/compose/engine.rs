//! The composition engine.

use rand::Rng;
use std::fmt;
use tracing::{debug, trace};

use super::trace::{ReplayTrace, TraceEntry};
use super::Augment;
use crate::error::AugmentError;
use crate::targets::{BboxParams, BboxProcessor, Frame, Targets, TrackedBox};

/// An ordered pipeline of transforms plus the box configuration.
///
/// The transform list and box configuration are fixed at construction and
/// only read afterwards, so one `Compose` can serve concurrent invocations
/// as long as each brings its own random source.
pub struct Compose {
    transforms: Vec<Box<dyn Augment>>,
    bbox: Option<BboxProcessor>,
}

impl Compose {
    /// Builds a pipeline.
    ///
    /// # Errors
    /// [`AugmentError::LabelFieldConflict`] for a bad label field list and
    /// [`AugmentError::InvalidTransform`] for a probability outside [0, 1].
    pub fn new(
        transforms: Vec<Box<dyn Augment>>,
        bbox_params: Option<BboxParams>,
    ) -> Result<Self, AugmentError> {
        for t in &transforms {
            let p = t.probability();
            if !(0.0..=1.0).contains(&p) {
                return Err(AugmentError::invalid_transform(
                    t.name(),
                    format!("probability must be in [0.0, 1.0] (got {})", p),
                ));
            }
        }
        let bbox = bbox_params.map(BboxProcessor::new).transpose()?;
        Ok(Self { transforms, bbox })
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transforms(&self) -> &[Box<dyn Augment>] {
        &self.transforms
    }

    pub fn bbox_params(&self) -> Option<&BboxParams> {
        self.bbox.as_ref().map(BboxProcessor::params)
    }

    /// Runs one full invocation: sample, then apply.
    pub fn apply<R: Rng>(&self, targets: Targets, rng: &mut R) -> Result<Targets, AugmentError> {
        let trace = self.sample(rng);
        self.execute(targets, &trace)
    }

    /// Sampling phase: decides which transforms fire and draws their
    /// parameters, without touching any target.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ReplayTrace {
        let mut trace = ReplayTrace::new();
        for t in &self.transforms {
            let draw: f64 = rng.random();
            if draw < t.probability() {
                let params = t.sample_params(rng);
                trace!(transform = t.name(), ?params, "fired");
                trace.push(TraceEntry::fired(t.name(), params));
            } else {
                trace.push(TraceEntry::skipped(t.name()));
            }
        }
        debug!(
            fired = trace.applied_count(),
            total = trace.len(),
            "pipeline sampled"
        );
        trace
    }

    /// Applying phase: runs the fired transforms of `trace` in order.
    ///
    /// Consumes the bundle; on error nothing partial is returned.
    pub fn execute(&self, targets: Targets, trace: &ReplayTrace) -> Result<Targets, AugmentError> {
        self.check_trace(trace)?;

        let Targets {
            mut image,
            mut mask,
            bboxes,
            mut keypoints,
            labels,
        } = targets;

        let frame = Frame::of(&image);
        if frame.rows == 0 || frame.cols == 0 {
            return Err(AugmentError::InvalidDimension {
                rows: frame.rows,
                cols: frame.cols,
            });
        }

        if let Some(m) = &mask {
            let (rows, cols, _) = image.dim();
            let (mask_rows, mask_cols, _) = m.dim();
            if (rows, cols) != (mask_rows, mask_cols) {
                return Err(AugmentError::MaskShapeMismatch {
                    rows,
                    cols,
                    mask_rows,
                    mask_cols,
                });
            }
        }

        let has_bboxes = bboxes.is_some();
        let (processor, mut tracked) = match (&self.bbox, bboxes) {
            (None, Some(_)) => return Err(AugmentError::MissingTargetConfig),
            (None, None) => {
                if let Some(name) = labels.keys().next() {
                    return Err(AugmentError::UndeclaredLabelField(name.clone()));
                }
                (None, Vec::new())
            }
            (Some(p), bboxes) => {
                let bboxes = bboxes.unwrap_or_default();
                (Some(p), p.preprocess(&bboxes, &labels, Frame::of(&image))?)
            }
        };

        for (t, entry) in self.transforms.iter().zip(trace.iter()) {
            if !entry.applied {
                continue;
            }
            let frame = Frame::of(&image);
            let caps = t.capabilities();

            if caps.image {
                image = t.apply_image(&image, &entry.params)?;
            }
            if caps.masks {
                if let Some(m) = &mask {
                    mask = Some(t.apply_mask(m, &entry.params)?);
                }
            }
            if caps.keypoints {
                if let Some(kps) = keypoints.as_mut() {
                    for kp in kps.iter_mut() {
                        *kp = t.apply_keypoint(*kp, &entry.params, frame)?;
                    }
                }
            }
            if caps.bboxes && !tracked.is_empty() {
                apply_to_boxes(t.as_ref(), &entry.params, frame, &mut tracked)?;
                if let Some(p) = processor.filter(|p| p.params().check_each_transform) {
                    tracked = p.filter(tracked, Frame::of(&image))?.0;
                }
            }
            trace!(
                transform = t.name(),
                rows = image.dim().0,
                cols = image.dim().1,
                boxes = tracked.len(),
                "applied"
            );
        }

        let mut out = Targets {
            image,
            mask,
            bboxes: None,
            keypoints,
            labels: Default::default(),
        };

        if let Some(p) = processor {
            let frame = out.frame();
            let (survivors, _) = p.filter(tracked, frame)?;
            let (bboxes, labels) = p.postprocess(survivors, frame)?;
            if has_bboxes {
                out.bboxes = Some(bboxes);
            }
            out.labels = labels;
        }

        Ok(out)
    }

    fn check_trace(&self, trace: &ReplayTrace) -> Result<(), AugmentError> {
        if trace.len() != self.transforms.len() {
            return Err(AugmentError::TraceLengthMismatch {
                expected: self.transforms.len(),
                found: trace.len(),
            });
        }
        for (index, (t, entry)) in self.transforms.iter().zip(trace.iter()).enumerate() {
            if entry.transform != t.name() {
                return Err(AugmentError::TraceEntryMismatch {
                    index,
                    expected: t.name().to_string(),
                    found: entry.transform.clone(),
                });
            }
        }
        Ok(())
    }
}

fn apply_to_boxes(
    t: &dyn Augment,
    params: &super::Params,
    frame: Frame,
    boxes: &mut [TrackedBox],
) -> Result<(), AugmentError> {
    for (index, tracked) in boxes.iter_mut().enumerate() {
        let rect = t
            .apply_bbox(tracked.bbox.rect(), params, frame)
            .map_err(|e| AugmentError::at_index(index, e))?;
        tracked.bbox.set_rect(rect);
    }
    Ok(())
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compose")
            .field("transforms", &self.transforms)
            .field("bbox_params", &self.bbox_params())
            .finish()
    }
}
