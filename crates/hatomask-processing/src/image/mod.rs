//! Image orientation handling

mod exif;
mod normalizer;
mod orientation;

pub use exif::read_exif_orientation;
pub use normalizer::{NormalizationError, NormalizedImage, OrientationNormalizer};
pub use orientation::{apply_orientation, ExifOrientation, OrientationTransform, Rotation};
