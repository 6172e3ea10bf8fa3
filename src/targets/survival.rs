//! Outcome of applying the survival policy to a set of boxes.

use std::fmt;

/// Why a box was removed from the bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// A coordinate is NaN or infinite.
    NotFinite,
    /// The box extends past the border and the clip policy is `reject`.
    OutOfBounds,
    /// Clipped area is below `min_area`.
    BelowMinArea,
    /// Clipped area over unclipped area is below `min_visibility`.
    BelowMinVisibility,
}

/// One removed box.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedBox {
    /// Position of the box in the sequence that was filtered.
    pub index: usize,
    pub reason: DropReason,
    /// Clipped area in pixels at the time of the check.
    pub area: f64,
}

/// Every box a filtering pass removed, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurvivalReport {
    pub dropped: Vec<DroppedBox>,
}

impl SurvivalReport {
    pub fn new() -> Self {
        Self {
            dropped: Vec::new(),
        }
    }

    pub fn add(&mut self, index: usize, reason: DropReason, area: f64) {
        self.dropped.push(DroppedBox {
            index,
            reason,
            area,
        });
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Number of boxes removed for the given reason.
    pub fn count(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }

    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

impl fmt::Display for SurvivalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dropped.is_empty() {
            return write!(f, "all boxes kept");
        }
        write!(f, "dropped {} box(es):", self.dropped.len())?;
        for d in &self.dropped {
            write!(f, " #{} {:?} (area {:.2})", d.index, d.reason, d.area)?;
        }
        Ok(())
    }
}
