use std::num::NonZeroU8;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Metadata tags as reported by a decoder, before any interpretation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMetadata {
    /// EXIF `Orientation` tag.
    pub orientation: Option<u16>,
    /// Stored width of the image, `ImageWidth` or `PixelXDimension`.
    pub image_width: Option<usize>,
    /// Stored height of the image, `ImageLength` or `PixelYDimension`.
    pub image_height: Option<usize>,
    /// EXIF `DateTimeOriginal` or XMP `CreateDate`, as written in the file.
    pub create_date: Option<String>,
    /// EXIF `DateTime` or XMP `ModifyDate`, as written in the file.
    pub modify_date: Option<String>,
}

/// Metadata describing the image as it should be displayed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageMetadata {
    /// Displayed width in pixels.
    pub width: usize,
    /// Displayed height in pixels.
    pub height: usize,
    /// Width divided by height, 0 when the height is unknown.
    pub aspect_ratio: f64,
    /// EXIF `Orientation` tag (1..8) if present, otherwise `None`.
    pub orientation: Option<NonZeroU8>,
    /// Capture time, if the source recorded a parseable one.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time, if the source recorded a parseable one.
    pub modified_at: Option<DateTime<Utc>>,
}

impl ImageMetadata {
    /// Metadata of an image with the given displayed size.
    pub fn from_size(width: usize, height: usize) -> Self {
        let aspect_ratio = if height == 0 {
            0.0
        } else {
            width as f64 / height as f64
        };
        Self {
            width,
            height,
            aspect_ratio,
            orientation: None,
            created_at: None,
            modified_at: None,
        }
    }
}

// Timestamps without an offset are read as UTC.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y:%m:%d %H:%M:%S%.f%:z"];
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse an EXIF or ISO 8601 timestamp into UTC.
///
/// Accepts `2014-04-01T09:23:43.29-01:00` and the EXIF form `2014:04:01 09:23:43`.
/// Values without an offset are taken as UTC. Returns `None` if nothing matches.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Some(date) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    {
        return Some(date.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|date| date.and_utc())
}

/// Whether the orientation rotates the stored pixels by 90 or 270 degrees.
pub fn swaps_dimensions(orientation: Option<NonZeroU8>) -> bool {
    matches!(orientation.map(NonZeroU8::get), Some(5..=8))
}

/// Interpret raw decoder tags.
///
/// Orientations outside 1..8 are dropped. Orientations 5 to 8 transpose the image,
/// so the stored width and height are swapped. Dates go through [`parse_date`]
/// and unparseable ones are dropped.
///
/// # Example
///
/// ```
/// use luma::{normalize_metadata, RawMetadata};
///
/// let metadata = normalize_metadata(RawMetadata {
///     orientation: Some(6),
///     image_width: Some(3000),
///     image_height: Some(4000),
///     ..Default::default()
/// });
/// assert_eq!((metadata.width, metadata.height), (4000, 3000));
/// ```
pub fn normalize_metadata(raw: RawMetadata) -> ImageMetadata {
    let orientation = raw
        .orientation
        .filter(|v| (1..=8).contains(v))
        .and_then(|v| NonZeroU8::new(v as u8));

    let (width, height) = (raw.image_width.unwrap_or(0), raw.image_height.unwrap_or(0));
    let (width, height) = if swaps_dimensions(orientation) {
        (height, width)
    } else {
        (width, height)
    };

    ImageMetadata {
        orientation,
        created_at: raw.create_date.as_deref().and_then(parse_date),
        modified_at: raw.modify_date.as_deref().and_then(parse_date),
        ..ImageMetadata::from_size(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn raw(orientation: u16) -> RawMetadata {
        RawMetadata {
            orientation: Some(orientation),
            image_width: Some(3000),
            image_height: Some(4000),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_keeps_dimensions() {
        let metadata = normalize_metadata(raw(1));
        assert_eq!((metadata.width, metadata.height), (3000, 4000));
        assert_eq!(metadata.aspect_ratio, 0.75);
        assert_eq!(metadata.orientation.map(NonZeroU8::get), Some(1));
    }

    #[test]
    fn test_normalize_rotated() {
        for orientation in 5..=8 {
            let metadata = normalize_metadata(raw(orientation));
            assert_eq!((metadata.width, metadata.height), (4000, 3000));
        }
        for orientation in 1..=4 {
            let metadata = normalize_metadata(raw(orientation));
            assert_eq!((metadata.width, metadata.height), (3000, 4000));
        }
    }

    #[test]
    fn test_normalize_invalid_orientation() {
        let metadata = normalize_metadata(raw(9));
        assert_eq!(metadata.orientation, None);
        assert_eq!((metadata.width, metadata.height), (3000, 4000));

        let metadata = normalize_metadata(RawMetadata::default());
        assert_eq!(metadata, ImageMetadata::default());
    }

    #[test]
    fn test_normalize_dates() {
        let metadata = normalize_metadata(RawMetadata {
            create_date: Some("2014-04-01T09:23:43.29".to_string()),
            modify_date: Some("2014-04-01T09:23:43.29-01:00".to_string()),
            ..raw(1)
        });

        let created = Utc.with_ymd_and_hms(2014, 4, 1, 9, 23, 43).single();
        let modified = Utc.with_ymd_and_hms(2014, 4, 1, 10, 23, 43).single();
        let millis = TimeDelta::milliseconds(290);
        assert_eq!(metadata.created_at, created.map(|d| d + millis));
        assert_eq!(metadata.modified_at, modified.map(|d| d + millis));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2014, 4, 1, 9, 23, 43).single();
        assert_eq!(parse_date("2014:04:01 09:23:43"), expected);
        assert_eq!(parse_date("2014-04-01T09:23:43Z"), expected);
        assert_eq!(parse_date("2014:04:01 11:23:43+02:00"), expected);
        assert_eq!(parse_date("not a date"), None);

        let metadata = normalize_metadata(RawMetadata {
            create_date: Some("0000:00:00 00:00:00".to_string()),
            ..raw(1)
        });
        assert_eq!(metadata.created_at, None);
    }
}
