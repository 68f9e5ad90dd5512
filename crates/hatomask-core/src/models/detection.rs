use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A point expressed as fractions of the image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionPoint {
    pub x: f64,
    pub y: f64,
}

/// A named landmark reported by the detection service (eye, nose tip, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmark {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl FaceLandmark {
    pub fn point(&self) -> DetectionPoint {
        DetectionPoint {
            x: self.x,
            y: self.y,
        }
    }
}

/// Axis-aligned box in fractional image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    #[serde(rename = "xMin")]
    pub x_min: f64,
    #[serde(rename = "yMin")]
    pub y_min: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionBox {
    pub fn origin(&self) -> DetectionPoint {
        DetectionPoint {
            x: self.x_min,
            y: self.y_min,
        }
    }
}

/// One face found by the detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetectionResult {
    pub landmarks: Vec<FaceLandmark>,
    pub bounding_box: DetectionBox,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Body of a successful `POST /photos/{id}/face-detections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetectionResponse {
    pub result: FaceDetectionResult,
}

fn unit_interval(name: &str, value: f64) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AppError::InvalidDetection(format!(
            "{} must be between 0.0 and 1.0, got {}",
            name, value
        )));
    }
    Ok(())
}

fn positive_fraction(name: &str, value: f64) -> Result<(), AppError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(AppError::InvalidDetection(format!(
            "{} must be in (0.0, 1.0], got {}",
            name, value
        )));
    }
    Ok(())
}

impl FaceDetectionResult {
    /// Check that every coordinate is a fraction of the image.
    ///
    /// The service is a remote collaborator; its output is checked once on
    /// receipt and then only read.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.landmarks.is_empty() {
            return Err(AppError::InvalidDetection(
                "landmarks must not be empty".to_string(),
            ));
        }
        for landmark in &self.landmarks {
            if landmark.name.trim().is_empty() {
                return Err(AppError::InvalidDetection(
                    "landmark name is required".to_string(),
                ));
            }
            unit_interval(&format!("{}.x", landmark.name), landmark.x)?;
            unit_interval(&format!("{}.y", landmark.name), landmark.y)?;
        }

        let b = &self.bounding_box;
        unit_interval("xMin", b.x_min)?;
        unit_interval("yMin", b.y_min)?;
        positive_fraction("width", b.width)?;
        positive_fraction("height", b.height)?;
        // small slack for services that round each field independently
        if b.x_min + b.width > 1.0 + 1e-9 {
            return Err(AppError::InvalidDetection(
                "xMin + width must be <= 1.0".to_string(),
            ));
        }
        if b.y_min + b.height > 1.0 + 1e-9 {
            return Err(AppError::InvalidDetection(
                "yMin + height must be <= 1.0".to_string(),
            ));
        }

        if let Some(confidence) = self.confidence {
            unit_interval("confidence", confidence)?;
        }
        Ok(())
    }
}
