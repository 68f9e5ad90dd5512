use bytes::Bytes;
use hatomask_core::{
    AppError, DetectionBox, FaceDetectionResult, FaceLandmark, ImageDimensions, RawImageFile,
    SniffedType, ValidationError,
};
use hatomask_processing::{
    read_exif_orientation, ContainerBox, ExifOrientation, IntakePipeline, PreviewSession,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// APP1 segment carrying a little-endian TIFF block with only the
/// orientation tag.
fn orientation_app1(code: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&code.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

/// Encode a JPEG of the given stored size and splice an orientation tag in
/// right after SOI.
fn oriented_jpeg(width: u32, height: u32, code: u16) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut encoded = Vec::new();
    img.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .unwrap();

    let mut out = encoded[..2].to_vec();
    out.extend_from_slice(&orientation_app1(code));
    out.extend_from_slice(&encoded[2..]);
    out
}

fn nose_at_center() -> FaceDetectionResult {
    FaceDetectionResult {
        landmarks: vec![FaceLandmark {
            name: "nose".to_string(),
            x: 0.5,
            y: 0.5,
        }],
        bounding_box: DetectionBox {
            x_min: 0.3,
            y_min: 0.2,
            width: 0.4,
            height: 0.6,
        },
        confidence: Some(0.9),
    }
}

#[tokio::test]
async fn test_rotated_photo_is_uploaded_upright_and_overlay_is_centered() {
    let source = oriented_jpeg(600, 800, 6);
    assert_eq!(read_exif_orientation(&source), ExifOrientation::Rotate90);

    let mut session = PreviewSession::new();
    let token = session.begin_selection();
    let pipeline = IntakePipeline::default();

    let raw = RawImageFile::new(source)
        .with_content_type("image/jpeg")
        .with_file_name("IMG_1234.JPG");
    let prepared = pipeline.prepare(raw, &token).await.unwrap();

    assert_eq!(
        prepared.image.dimensions,
        ImageDimensions::new(800, 600).unwrap()
    );
    assert_eq!(prepared.image.sniffed_type, SniffedType::Jpeg);
    assert_eq!(prepared.file_name, "IMG_1234.jpg");

    // The re-encoded bytes must not carry the orientation tag forward.
    assert_eq!(
        read_exif_orientation(&prepared.image.bytes),
        ExifOrientation::Normal
    );
    let decoded = image::load_from_memory(&prepared.image.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 600));

    session
        .commit_preview(&token, prepared.image.clone())
        .unwrap();
    let rect = session.resize(ContainerBox::new(1000.0, 500.0)).unwrap();
    let overlay = session
        .commit_detection(&token, nose_at_center())
        .unwrap()
        .unwrap();

    assert_eq!(overlay.landmarks[0].position, rect.center());
    assert!((rect.width / rect.height - 800.0 / 600.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_upright_jpeg_is_sent_unchanged() {
    let source = oriented_jpeg(120, 80, 1);
    let token = PreviewSession::new().begin_selection();

    let prepared = IntakePipeline::default()
        .prepare(RawImageFile::new(source.clone()), &token)
        .await
        .unwrap();

    assert_eq!(prepared.image.bytes, Bytes::from(source));
    assert_eq!(
        prepared.image.dimensions,
        ImageDimensions::new(120, 80).unwrap()
    );
}

#[tokio::test]
async fn test_oversized_selection_never_reaches_decoder() {
    let mut data = vec![0u8; 11 * 1024 * 1024];
    data[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);

    let mut session = PreviewSession::new();
    let token = session.begin_selection();
    let err = IntakePipeline::default()
        .prepare(RawImageFile::new(data), &token)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::FileTooLarge { .. })
    ));
    assert!(session.preview().is_none());
    assert_eq!(session.live_preview_handles(), 0);
}

#[tokio::test]
async fn test_reselection_discards_slow_result() {
    let mut session = PreviewSession::new();
    let first = session.begin_selection();
    let pending = {
        let pipeline = IntakePipeline::default();
        let source = oriented_jpeg(64, 48, 8);
        let token = first.clone();
        tokio::spawn(async move { pipeline.prepare(RawImageFile::new(source), &token).await })
    };

    let second = session.begin_selection();
    let result = pending.await.unwrap();

    match result {
        Err(AppError::Superseded { stale, current }) => {
            assert_eq!(stale, first.generation());
            assert_eq!(current, second.generation());
        }
        Ok(prepared) => {
            // The task may finish before the reselection is observed; the
            // session must still refuse it.
            assert!(session.commit_preview(&first, prepared.image).is_err());
        }
        Err(other) => panic!("unexpected error: {}", other),
    }
    assert!(session.preview().is_none());
}
