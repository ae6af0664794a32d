//! Calibrated ruler geometry.
//!
//! Ticks are computed as plain values so the layout can be checked
//! without drawing anything.

use crate::pipeline::{CalibrationParams, MAJOR_STEP_UM};

/// Index of the minor tick drawn at the emphasized length.
pub const EMPHASIZED_MINOR: usize = 5;

/// Labeled tick every major step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorTick {
    /// Pixel position along the axis.
    pub position: i64,
    /// Label in micrometres.
    pub label_um: i64,
}

/// Unlabeled tick between two majors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinorTick {
    /// Pixel position along the axis.
    pub position: i64,
    /// The half-way tick, drawn taller.
    pub emphasized: bool,
}

/// Ticks along one axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulerAxis {
    /// Labeled ticks, left to right or top to bottom.
    pub majors: Vec<MajorTick>,
    /// Ticks between majors.
    pub minors: Vec<MinorTick>,
}

/// Ruler layout for one frame size and calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerGrid {
    /// Calibrated optical zero, in pixels.
    pub origin: (f64, f64),
    /// Pixels per 1000 µm.
    pub major_step_px: usize,
    /// Pixels per minor division; 0 disables minor ticks.
    pub minor_step_px: usize,
    /// Along the bottom edge; labels fall by 1000 µm per step.
    pub horizontal: RulerAxis,
    /// Along the left edge; labels rise by 1000 µm per step.
    pub vertical: RulerAxis,
}

impl RulerGrid {
    /// Lays out the ruler for a `width`×`height` frame.
    pub fn compute(calibration: &CalibrationParams, width: usize, height: usize) -> Self {
        let origin = calibration.optical_center_px(width, height);
        let big = calibration.major_step_px();
        let small = calibration.minor_step_px();
        let step_um = MAJOR_STEP_UM as i64;

        Self {
            origin,
            major_step_px: big,
            minor_step_px: small,
            horizontal: axis(origin.0, width, big, small, -step_um),
            vertical: axis(origin.1, height, big, small, step_um),
        }
    }
}

/// Ticks from the first major at or before pixel 0 up to `len`.
///
/// `label_step` is added to the label for each major; the label at the
/// optical zero is always 0. Positions and labels saturate instead of
/// wrapping, so an out-of-range calibration yields a short ruler rather
/// than a panic.
fn axis(origin: f64, len: usize, big: usize, small: usize, label_step: i64) -> RulerAxis {
    let big_f = big as f64;
    let start = (origin.rem_euclid(big_f) - big_f) as i64;
    let steps_to_zero = ((origin / big_f).floor() as i64).saturating_add(1);
    let mut label = label_step.saturating_mul(steps_to_zero).saturating_neg();

    let mut ruler = RulerAxis::default();
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let big = i64::try_from(big).unwrap_or(i64::MAX);
    let small = i64::try_from(small).unwrap_or(0);
    let mut pos = start;
    while pos < len {
        ruler.majors.push(MajorTick {
            position: pos,
            label_um: label,
        });
        if small > 0 {
            let mut k: i64 = 1;
            while let Some(offset) = k.checked_mul(small).filter(|&o| o < big) {
                ruler.minors.push(MinorTick {
                    position: pos.saturating_add(offset),
                    emphasized: k == EMPHASIZED_MINOR as i64,
                });
                k += 1;
            }
        }
        label = label.saturating_add(label_step);
        match pos.checked_add(big) {
            Some(next) => pos = next,
            None => break,
        }
    }
    ruler
}
