use std::fmt;
use std::str::FromStr;

use crate::error::ImageError;

/// Named coordinate system of the samples stored in a [`crate::PixelBuffer`].
///
/// Every colorspace fixes the number of interleaved channels per pixel.
/// All channels are stored as 8-bit values, see the conversion functions in
/// `luma-imgproc` for the exact byte encoding of each model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Colorspace {
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Single luma channel.
    Greyscale,
    /// Hue, saturation, lightness.
    Hsl,
    /// Hue, chroma, luma.
    Hcl,
    /// Luma, blue-difference chroma, red-difference chroma (JPEG full range).
    YCbCr,
    /// CIE 1931 XYZ relative to the D65 white point.
    Xyz,
    /// CIE xyY chromaticity plus luminance.
    Xyy,
}

impl Colorspace {
    /// All supported colorspaces.
    pub const ALL: [Colorspace; 8] = [
        Colorspace::Rgb,
        Colorspace::Rgba,
        Colorspace::Greyscale,
        Colorspace::Hsl,
        Colorspace::Hcl,
        Colorspace::YCbCr,
        Colorspace::Xyz,
        Colorspace::Xyy,
    ];

    /// Number of interleaved channels per pixel.
    pub fn num_channels(&self) -> usize {
        match self {
            Colorspace::Greyscale => 1,
            Colorspace::Rgba => 4,
            _ => 3,
        }
    }

    /// Short tag used when parsing and printing the colorspace.
    pub fn tag(&self) -> &'static str {
        match self {
            Colorspace::Rgb => "rgb",
            Colorspace::Rgba => "rgba",
            Colorspace::Greyscale => "k",
            Colorspace::Hsl => "hsl",
            Colorspace::Hcl => "hcl",
            Colorspace::YCbCr => "ycbcr",
            Colorspace::Xyz => "xyz",
            Colorspace::Xyy => "xyy",
        }
    }
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Colorspace {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colorspace::ALL
            .iter()
            .find(|c| c.tag().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ImageError::UnsupportedConversion(format!("unknown colorspace `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::Colorspace;
    use crate::ImageError;

    #[test]
    fn colorspace_channels() {
        assert_eq!(Colorspace::Greyscale.num_channels(), 1);
        assert_eq!(Colorspace::Rgba.num_channels(), 4);
        assert_eq!(Colorspace::Xyy.num_channels(), 3);
    }

    #[test]
    fn colorspace_parse() -> Result<(), ImageError> {
        for colorspace in Colorspace::ALL {
            assert_eq!(colorspace.tag().parse::<Colorspace>()?, colorspace);
        }
        assert_eq!("YCbCr".parse::<Colorspace>()?, Colorspace::YCbCr);
        assert!(matches!(
            "cmyk".parse::<Colorspace>(),
            Err(ImageError::UnsupportedConversion(_))
        ));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn colorspace_serde() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Colorspace::YCbCr)?, "\"ycbcr\"");
        let size: crate::ImageSize = serde_json::from_str(r#"{"width":3,"height":2}"#)?;
        assert_eq!(size.area(), 6);
        Ok(())
    }
}
