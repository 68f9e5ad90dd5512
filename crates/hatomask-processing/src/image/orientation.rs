use image::DynamicImage;
use serde::Serialize;
use std::fmt;

/// EXIF orientation code (tag 0x0112), describing how the stored pixels must
/// be transformed to appear upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum ExifOrientation {
    #[default]
    Normal = 1,
    MirrorHorizontal = 2,
    Rotate180 = 3,
    MirrorVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    Transverse = 7,
    Rotate270 = 8,
}

impl ExifOrientation {
    pub const ALL: [ExifOrientation; 8] = [
        ExifOrientation::Normal,
        ExifOrientation::MirrorHorizontal,
        ExifOrientation::Rotate180,
        ExifOrientation::MirrorVertical,
        ExifOrientation::Transpose,
        ExifOrientation::Rotate90,
        ExifOrientation::Transverse,
        ExifOrientation::Rotate270,
    ];

    /// Map a raw tag value to an orientation. Values outside 1..=8 yield `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1..=8 => Some(Self::ALL[usize::from(code) - 1]),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn transform(self) -> OrientationTransform {
        ORIENTATION_TRANSFORMS[usize::from(self.code()) - 1]
    }

    /// Whether the upright image has width and height exchanged.
    pub fn swaps_dimensions(self) -> bool {
        self.transform().swaps_dimensions()
    }

    pub fn is_upright(self) -> bool {
        self == ExifOrientation::Normal
    }
}

impl From<ExifOrientation> for u8 {
    fn from(orientation: ExifOrientation) -> Self {
        orientation.code()
    }
}

impl fmt::Display for ExifOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Clockwise rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// Pixel operations that bring a stored image upright.
///
/// The rotation is applied first, then the mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationTransform {
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl OrientationTransform {
    const fn new(rotation: Rotation, flip_horizontal: bool, flip_vertical: bool) -> Self {
        Self {
            rotation,
            flip_horizontal,
            flip_vertical,
        }
    }

    pub fn swaps_dimensions(&self) -> bool {
        matches!(self.rotation, Rotation::Cw90 | Rotation::Cw270)
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::None && !self.flip_horizontal && !self.flip_vertical
    }
}

// Indexed by orientation code - 1.
const ORIENTATION_TRANSFORMS: [OrientationTransform; 8] = [
    OrientationTransform::new(Rotation::None, false, false),
    OrientationTransform::new(Rotation::None, true, false),
    OrientationTransform::new(Rotation::Cw180, false, false),
    OrientationTransform::new(Rotation::None, false, true),
    // rotate 90 then mirror: transpose
    OrientationTransform::new(Rotation::Cw90, true, false),
    OrientationTransform::new(Rotation::Cw90, false, false),
    // rotate 270 then mirror: transverse
    OrientationTransform::new(Rotation::Cw270, true, false),
    OrientationTransform::new(Rotation::Cw270, false, false),
];

/// Apply the transform for `orientation` to a decoded image.
pub fn apply_orientation(mut img: DynamicImage, orientation: ExifOrientation) -> DynamicImage {
    let transform = orientation.transform();

    tracing::debug!(
        orientation = orientation.code(),
        rotation = ?transform.rotation,
        flip_horizontal = transform.flip_horizontal,
        flip_vertical = transform.flip_vertical,
        "Applying EXIF orientation"
    );

    img = match transform.rotation {
        Rotation::None => img,
        Rotation::Cw90 => img.rotate90(),
        Rotation::Cw180 => img.rotate180(),
        Rotation::Cw270 => img.rotate270(),
    };

    if transform.flip_horizontal {
        img = img.fliph();
    }
    if transform.flip_vertical {
        img = img.flipv();
    }

    img
}
