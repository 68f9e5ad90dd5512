//! Overlay coordinate mapping
//!
//! Detection results are normalized to the upright image (0..1 on both axes).
//! The preview shows that image letterboxed inside a container with
//! "contain" semantics; this module computes the displayed rectangle and
//! maps normalized points and boxes into container pixels.

use hatomask_core::{DetectionBox, DetectionPoint, FaceDetectionResult, ImageDimensions};
use serde::Serialize;

/// Size of the element the preview is drawn in, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerBox {
    pub width: f64,
    pub height: f64,
}

impl ContainerBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        is_positive(self.width) && is_positive(self.height)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Where the image is actually drawn inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRect {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderRect {
    /// Fit an image of the given natural size inside `container`, preserving
    /// aspect ratio and centering it on the free axis.
    ///
    /// Returns `None` while either size is unknown (zero, negative or not
    /// finite).
    pub fn contain(container: ContainerBox, natural_width: f64, natural_height: f64) -> Option<Self> {
        if !container.is_usable() || !is_positive(natural_width) || !is_positive(natural_height) {
            return None;
        }

        let scale = (container.width / natural_width).min(container.height / natural_height);
        let width = natural_width * scale;
        let height = natural_height * scale;

        Some(Self {
            offset_x: (container.width - width) / 2.0,
            offset_y: (container.height - height) / 2.0,
            width,
            height,
        })
    }

    pub fn for_image(container: ContainerBox, natural: ImageDimensions) -> Option<Self> {
        Self::contain(container, f64::from(natural.width), f64::from(natural.height))
    }

    pub fn map_point(&self, point: DetectionPoint) -> PixelPoint {
        PixelPoint {
            x: self.offset_x + point.x * self.width,
            y: self.offset_y + point.y * self.height,
        }
    }

    pub fn map_box(&self, bbox: &DetectionBox) -> PixelRect {
        let origin = self.map_point(bbox.origin());
        PixelRect {
            left: origin.x,
            top: origin.y,
            width: bbox.width * self.width,
            height: bbox.height * self.height,
        }
    }

    pub fn center(&self) -> PixelPoint {
        self.map_point(DetectionPoint { x: 0.5, y: 0.5 })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLandmark {
    pub name: String,
    pub position: PixelPoint,
}

/// Detection result placed in container pixels, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    pub render_rect: RenderRect,
    pub bounding_box: PixelRect,
    pub landmarks: Vec<OverlayLandmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl OverlayLayout {
    /// Landmarks keep the order the service returned them in.
    pub fn from_detection(render_rect: RenderRect, result: &FaceDetectionResult) -> Self {
        let landmarks = result
            .landmarks
            .iter()
            .map(|landmark| OverlayLandmark {
                name: landmark.name.clone(),
                position: render_rect.map_point(landmark.point()),
            })
            .collect();

        Self {
            render_rect,
            bounding_box: render_rect.map_box(&result.bounding_box),
            landmarks,
            confidence: result.confidence,
        }
    }
}
