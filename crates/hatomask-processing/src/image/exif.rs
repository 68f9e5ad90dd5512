//! Minimal JPEG/TIFF walker that extracts only the EXIF orientation tag.
//!
//! Every failure to find a usable value degrades to [`ExifOrientation::Normal`].
//! Nothing here panics or returns an error to the caller.

use super::orientation::ExifOrientation;
use thiserror::Error;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: [u8; 2] = [0xFF, 0xD8];
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
const ORIENTATION_TAG: u16 = 0x0112;
const IFD_ENTRY_SIZE: usize = 12;

/// Why the walk stopped without an orientation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
enum ParseAnomaly {
    #[error("missing start-of-image marker")]
    NotJpeg,
    #[error("read past end of buffer at offset {0}")]
    Truncated(usize),
    #[error("expected marker at offset {0}")]
    BadMarker(usize),
    #[error("segment length {0} is smaller than its own length field")]
    BadSegmentLength(u16),
    #[error("reached {0} before any EXIF segment")]
    NoExifSegment(&'static str),
    #[error("unknown TIFF byte order {0:02X?}")]
    UnknownByteOrder([u8; 2]),
    #[error("IFD0 has no orientation entry")]
    NoOrientationTag,
    #[error("orientation value {0} out of range")]
    InvalidValue(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16(self, data: &[u8], offset: usize) -> Result<u16, ParseAnomaly> {
        let bytes = read_array::<2>(data, offset)?;
        Ok(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn u32(self, data: &[u8], offset: usize) -> Result<u32, ParseAnomaly> {
        let bytes = read_array::<4>(data, offset)?;
        Ok(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], ParseAnomaly> {
    offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ParseAnomaly::Truncated(offset))
}

fn read_byte(data: &[u8], offset: usize) -> Result<u8, ParseAnomaly> {
    data.get(offset)
        .copied()
        .ok_or(ParseAnomaly::Truncated(offset))
}

/// Read the EXIF orientation of a JPEG byte stream.
///
/// Returns [`ExifOrientation::Normal`] when the input is not a JPEG, carries
/// no EXIF APP1 segment, or the orientation entry is missing, truncated or
/// out of range.
pub fn read_exif_orientation(data: &[u8]) -> ExifOrientation {
    match find_orientation(data) {
        Ok(orientation) => {
            tracing::debug!(orientation = orientation.code(), "Read EXIF orientation");
            orientation
        }
        Err(anomaly) => {
            tracing::debug!(reason = %anomaly, "No usable EXIF orientation, assuming upright");
            ExifOrientation::Normal
        }
    }
}

fn find_orientation(data: &[u8]) -> Result<ExifOrientation, ParseAnomaly> {
    if !data.starts_with(&SOI) {
        return Err(ParseAnomaly::NotJpeg);
    }

    let mut offset = SOI.len();
    loop {
        if read_byte(data, offset)? != MARKER_PREFIX {
            return Err(ParseAnomaly::BadMarker(offset));
        }

        // Any number of 0xFF fill bytes may precede the marker code.
        let mut marker = read_byte(data, offset + 1)?;
        while marker == MARKER_PREFIX {
            offset += 1;
            marker = read_byte(data, offset + 1)?;
        }

        match marker {
            SOS => return Err(ParseAnomaly::NoExifSegment("start of scan")),
            EOI => return Err(ParseAnomaly::NoExifSegment("end of image")),
            _ => {}
        }

        let length_offset = offset + 2;
        let length = u16::from_be_bytes(read_array::<2>(data, length_offset)?);
        if length < 2 {
            return Err(ParseAnomaly::BadSegmentLength(length));
        }

        let payload = length_offset + 2;
        let header_end = payload + EXIF_HEADER.len();
        if marker == APP1
            && usize::from(length) >= 2 + EXIF_HEADER.len()
            && data.get(payload..header_end) == Some(&EXIF_HEADER[..])
        {
            return parse_tiff(data, header_end);
        }

        // Non-EXIF APP1 (e.g. XMP) and every other segment are skipped.
        offset = length_offset + usize::from(length);
    }
}

fn parse_tiff(data: &[u8], tiff_start: usize) -> Result<ExifOrientation, ParseAnomaly> {
    let order = match read_array::<2>(data, tiff_start)? {
        [b'I', b'I'] => ByteOrder::Little,
        [b'M', b'M'] => ByteOrder::Big,
        other => return Err(ParseAnomaly::UnknownByteOrder(other)),
    };

    let ifd_offset = order.u32(data, tiff_start + 4)?;
    let ifd_start = usize::try_from(ifd_offset)
        .ok()
        .and_then(|relative| tiff_start.checked_add(relative))
        .ok_or(ParseAnomaly::Truncated(tiff_start))?;

    let entry_count = order.u16(data, ifd_start)?;
    for index in 0..usize::from(entry_count) {
        let entry = ifd_start + 2 + index * IFD_ENTRY_SIZE;
        if order.u16(data, entry)? != ORIENTATION_TAG {
            continue;
        }
        // SHORT value sits left-justified in the 4-byte value field.
        let value = order.u16(data, entry + 8)?;
        return ExifOrientation::from_code(value).ok_or(ParseAnomaly::InvalidValue(value));
    }

    Err(ParseAnomaly::NoOrientationTag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    /// TIFF block with a single IFD0 holding `entries` (tag, value) pairs.
    fn tiff(little_endian: bool, entries: &[(u16, u16)]) -> Vec<u8> {
        let u16b = |v: u16| {
            if little_endian {
                v.to_le_bytes()
            } else {
                v.to_be_bytes()
            }
        };
        let u32b = |v: u32| {
            if little_endian {
                v.to_le_bytes()
            } else {
                v.to_be_bytes()
            }
        };

        let mut out = Vec::new();
        out.extend_from_slice(if little_endian { b"II" } else { b"MM" });
        out.extend_from_slice(&u16b(42));
        out.extend_from_slice(&u32b(8));
        out.extend_from_slice(&u16b(entries.len() as u16));
        for &(tag, value) in entries {
            out.extend_from_slice(&u16b(tag));
            out.extend_from_slice(&u16b(3)); // SHORT
            out.extend_from_slice(&u32b(1));
            out.extend_from_slice(&u16b(value));
            out.extend_from_slice(&[0, 0]);
        }
        out.extend_from_slice(&u32b(0));
        out
    }

    fn exif_payload(tiff: &[u8]) -> Vec<u8> {
        let mut payload = EXIF_HEADER.to_vec();
        payload.extend_from_slice(tiff);
        payload
    }

    fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut out = SOI.to_vec();
        for s in segments {
            out.extend_from_slice(s);
        }
        out.extend_from_slice(&segment(SOS, &[0x00, 0x01, 0x02]));
        out.extend_from_slice(&[0x12, 0x34, 0xFF, EOI]);
        out
    }

    fn jpeg_with_orientation(little_endian: bool, code: u16) -> Vec<u8> {
        let app1 = segment(
            APP1,
            &exif_payload(&tiff(little_endian, &[(ORIENTATION_TAG, code)])),
        );
        jpeg(&[app1])
    }

    #[test]
    fn test_reads_all_codes_little_endian() {
        for code in 1..=8u16 {
            let data = jpeg_with_orientation(true, code);
            assert_eq!(
                read_exif_orientation(&data),
                ExifOrientation::from_code(code).unwrap()
            );
        }
    }

    #[test]
    fn test_reads_all_codes_big_endian() {
        for code in 1..=8u16 {
            let data = jpeg_with_orientation(false, code);
            assert_eq!(
                read_exif_orientation(&data),
                ExifOrientation::from_code(code).unwrap()
            );
        }
    }

    #[test]
    fn test_skips_preceding_segments() {
        let app0 = segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        let xmp = segment(APP1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>");
        let exif = segment(
            APP1,
            &exif_payload(&tiff(true, &[(0x010F, 7), (ORIENTATION_TAG, 6)])),
        );
        let data = jpeg(&[app0, xmp, exif]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Rotate90);
    }

    #[test]
    fn test_tolerates_fill_bytes() {
        let mut data = SOI.to_vec();
        data.extend_from_slice(&[0xFF, 0xFF]);
        data.extend_from_slice(&segment(
            APP1,
            &exif_payload(&tiff(false, &[(ORIENTATION_TAG, 8)])),
        )[..]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Rotate270);
    }

    #[test]
    fn test_no_app1_defaults_to_normal() {
        let app0 = segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        let data = jpeg(&[app0]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
    }

    #[test]
    fn test_app1_without_exif_header_defaults_to_normal() {
        let data = jpeg(&[segment(APP1, b"Exif\0")]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
    }

    #[test]
    fn test_missing_orientation_tag_defaults_to_normal() {
        let data = jpeg(&[segment(APP1, &exif_payload(&tiff(true, &[(0x010F, 6)])))]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
    }

    #[test]
    fn test_out_of_range_value_defaults_to_normal() {
        for code in [0u16, 9, 255] {
            let data = jpeg_with_orientation(true, code);
            assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
        }
    }

    #[test]
    fn test_truncated_tiff_defaults_to_normal() {
        let full = jpeg_with_orientation(true, 6);
        // Cut inside the IFD entry, before the value field.
        let header_end = SOI.len() + 4 + EXIF_HEADER.len();
        for cut in header_end..header_end + 18 {
            assert_eq!(
                read_exif_orientation(&full[..cut]),
                ExifOrientation::Normal,
                "cut at {}",
                cut
            );
        }
    }

    #[test]
    fn test_bogus_ifd_offset_defaults_to_normal() {
        let mut block = tiff(true, &[(ORIENTATION_TAG, 6)]);
        block[4..8].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        let data = jpeg(&[segment(APP1, &exif_payload(&block))]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
    }

    #[test]
    fn test_unknown_byte_order_defaults_to_normal() {
        let mut block = tiff(true, &[(ORIENTATION_TAG, 6)]);
        block[0..2].copy_from_slice(b"XX");
        let data = jpeg(&[segment(APP1, &exif_payload(&block))]);
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
    }

    #[test]
    fn test_non_jpeg_defaults_to_normal() {
        assert_eq!(read_exif_orientation(&[]), ExifOrientation::Normal);
        assert_eq!(read_exif_orientation(&[0xFF]), ExifOrientation::Normal);
        assert_eq!(
            read_exif_orientation(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ExifOrientation::Normal
        );
    }

    #[test]
    fn test_empty_app1_does_not_claim_following_bytes() {
        let mut data = SOI.to_vec();
        data.extend_from_slice(&[0xFF, APP1, 0x00, 0x02]);
        data.extend_from_slice(&exif_payload(&tiff(true, &[(ORIENTATION_TAG, 6)])));
        assert_eq!(read_exif_orientation(&data), ExifOrientation::Normal);
        assert_eq!(find_orientation(&data), Err(ParseAnomaly::BadMarker(6)));
    }

    #[test]
    fn test_garbage_where_marker_expected() {
        let data = [0xFF, 0xD8, 0x00, 0xE1, 0x00, 0x10];
        assert_eq!(find_orientation(&data), Err(ParseAnomaly::BadMarker(2)));
    }

    #[test]
    fn test_short_segment_length() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01];
        assert_eq!(
            find_orientation(&data),
            Err(ParseAnomaly::BadSegmentLength(1))
        );
    }

    #[test]
    fn test_exif_after_scan_is_not_found() {
        let mut data = jpeg(&[]);
        data.extend_from_slice(&segment(
            APP1,
            &exif_payload(&tiff(true, &[(ORIENTATION_TAG, 6)])),
        ));
        assert_eq!(
            find_orientation(&data),
            Err(ParseAnomaly::NoExifSegment("start of scan"))
        );
    }
}
