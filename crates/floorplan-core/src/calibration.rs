//! Two-point scale calibration.
//!
//! The user clicks two ends of a feature whose real length is known; the host
//! supplies that length and the tool derives canvas pixels per drawing
//! centimeter. Combined with the plan's architectural ratio this gives the
//! pixels-per-meter scale the measurement tool consumes.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;

/// Reference segments shorter than this (canvas pixels) are rejected.
pub const MIN_REFERENCE_PX: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Both reference points must be picked before calibrating")]
    Incomplete,

    #[error("Reference segment is too short ({0:.3} px); pick two distinct points")]
    DegenerateReference(f64),

    #[error("True distance must be a positive number of centimeters, got {0}")]
    InvalidDistance(f64),

    #[error("Scale ratio must be positive, got {0}")]
    InvalidScaleRatio(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationState {
    #[default]
    AwaitingFirst,
    AwaitingSecond {
        a: Point,
    },
    Measured {
        a: Point,
        b: Point,
        pixel_distance: f64,
    },
}

/// Result of a completed calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub pixel_distance: f64,
    pub true_distance_cm: f64,
    pub pixels_per_cm: f64,
    pub scale_ratio: f64,
}

impl Calibration {
    pub fn pixels_per_meter(&self) -> f64 {
        pixels_per_meter(self.pixels_per_cm, self.scale_ratio)
    }
}

/// `(pixels_per_cm × 100) / scale_ratio`.
pub fn pixels_per_meter(pixels_per_cm: f64, scale_ratio: f64) -> f64 {
    pixels_per_cm * 100.0 / scale_ratio
}

#[derive(Debug, Clone, Default)]
pub struct CalibrationTool {
    state: CalibrationState,
}

impl CalibrationTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Reference points picked so far.
    pub fn points(&self) -> Vec<Point> {
        match self.state {
            CalibrationState::AwaitingFirst => Vec::new(),
            CalibrationState::AwaitingSecond { a } => vec![a],
            CalibrationState::Measured { a, b, .. } => vec![a, b],
        }
    }

    /// Record a click. Returns the pixel distance once the second point lands.
    ///
    /// A third click starts a new reference segment.
    pub fn click(&mut self, p: Point) -> Option<f64> {
        match self.state {
            CalibrationState::AwaitingFirst | CalibrationState::Measured { .. } => {
                self.state = CalibrationState::AwaitingSecond { a: p };
                None
            }
            CalibrationState::AwaitingSecond { a } => {
                let pixel_distance = a.distance_to(&p);
                self.state = CalibrationState::Measured {
                    a,
                    b: p,
                    pixel_distance,
                };
                debug!("calibration reference measured: {:.2} px", pixel_distance);
                Some(pixel_distance)
            }
        }
    }

    /// Derive the calibration from the host-supplied true distance.
    ///
    /// Any rejection resets the tool so the user picks a fresh segment.
    pub fn complete(
        &mut self,
        true_distance_cm: f64,
        scale_ratio: f64,
    ) -> Result<Calibration, CalibrationError> {
        let result = self.evaluate(true_distance_cm, scale_ratio);
        if let Ok(c) = &result {
            debug!(
                "calibrated: {:.4} px/cm, {:.4} px/m at 1:{}",
                c.pixels_per_cm,
                c.pixels_per_meter(),
                scale_ratio
            );
        }
        self.reset();
        result
    }

    fn evaluate(
        &self,
        true_distance_cm: f64,
        scale_ratio: f64,
    ) -> Result<Calibration, CalibrationError> {
        let CalibrationState::Measured { pixel_distance, .. } = self.state else {
            return Err(CalibrationError::Incomplete);
        };
        if !(pixel_distance >= MIN_REFERENCE_PX) {
            return Err(CalibrationError::DegenerateReference(pixel_distance));
        }
        if !(true_distance_cm > 0.0 && true_distance_cm.is_finite()) {
            return Err(CalibrationError::InvalidDistance(true_distance_cm));
        }
        if !(scale_ratio > 0.0 && scale_ratio.is_finite()) {
            return Err(CalibrationError::InvalidScaleRatio(scale_ratio));
        }
        Ok(Calibration {
            pixel_distance,
            true_distance_cm,
            pixels_per_cm: pixel_distance / true_distance_cm,
            scale_ratio,
        })
    }

    pub fn reset(&mut self) {
        self.state = CalibrationState::AwaitingFirst;
    }
}
