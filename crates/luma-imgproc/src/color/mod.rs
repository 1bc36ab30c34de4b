mod convert;
mod gray;
mod hcl;
mod hsl;
mod xyz;
mod ycbcr;

pub use convert::{convert, convert_values};
pub use gray::{gray_from_rgb, luma_from_rgb};
pub use hcl::{hcl_from_rgb, rgb_from_hcl};
pub use hsl::{hsl_from_rgb, hue_degrees, rgb_from_hsl};
pub use xyz::{rgb_from_xyy, rgb_from_xyz, xyy_from_rgb, xyz_from_rgb};
pub use ycbcr::{rgb_from_ycbcr, ycbcr_from_rgb};
