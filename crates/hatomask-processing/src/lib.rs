//! HatoMask Processing Library
//!
//! Client-side intake for photos: EXIF orientation reading, upright
//! re-encoding, overlay coordinate mapping and the preview session that ties
//! them to a single user selection.

pub mod image;
pub mod overlay;
pub mod pipeline;
pub mod session;

pub use self::image::{
    read_exif_orientation, ExifOrientation, NormalizationError, NormalizedImage,
    OrientationNormalizer, OrientationTransform, Rotation,
};
pub use overlay::{
    ContainerBox, OverlayLandmark, OverlayLayout, PixelPoint, PixelRect, RenderRect,
};
pub use pipeline::{IntakePipeline, PreparedUpload};
pub use session::{GenerationCounter, PreviewHandle, PreviewSession, SelectionToken};
