use nalgebra::Point3;

/// Simple point colors with RGB values between 0 and 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub const WHITE: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Camera markers in exported point clouds.
    pub const YELLOW: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 0.0,
    };

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            red: f32::from(rgb[0]) / 255.0,
            green: f32::from(rgb[1]) / 255.0,
            blue: f32::from(rgb[2]) / 255.0,
        }
    }

    /// Unpacks a 16-bit RGB565 color as stored in the binary fragments.
    pub fn from_rgb565(packed: u16) -> Self {
        Self::from_rgb8(unpack_rgb565(packed))
    }

    /// Converts back to 8-bit channels.
    /// Values created by `from_rgb8` come back unchanged.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.red), channel(self.green), channel(self.blue)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Expands a RGB565 value into 8-bit channels.
pub fn unpack_rgb565(packed: u16) -> [u8; 3] {
    let packed = u32::from(packed);
    let r = ((packed >> 11) * 255) / 31;
    let g = (((packed >> 5) & 63) * 255) / 63;
    let b = ((packed & 31) * 255) / 31;
    [r as u8, g as u8, b as u8]
}

/// Quantizes 8-bit channels into a RGB565 value.
/// Channels are rounded to the nearest level, so `pack_rgb565(unpack_rgb565(c)) == c`.
pub fn pack_rgb565(rgb: [u8; 3]) -> u16 {
    let r = (u32::from(rgb[0]) * 31 + 127) / 255;
    let g = (u32::from(rgb[1]) * 63 + 127) / 255;
    let b = (u32::from(rgb[2]) * 31 + 127) / 255;
    ((r << 11) | (g << 5) | b) as u16
}

/// A single point of the sparse reconstruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Point3<f32>, color: Color) -> Self {
        Self { position, color }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            color: Color::BLACK,
        }
    }
}

/// Associates a vertex with one of the source images.
/// The meaning of `value` is not documented by the service and is passed through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexInfo {
    pub vertex_index: u32,
    pub value: u32,
}

impl VertexInfo {
    pub fn new(vertex_index: u32, value: u32) -> Self {
        Self {
            vertex_index,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_black_are_exact() {
        assert_eq!(unpack_rgb565(0xFFFF), [255, 255, 255]);
        assert_eq!(unpack_rgb565(0x0000), [0, 0, 0]);
        assert_eq!(pack_rgb565([255, 255, 255]), 0xFFFF);
        assert_eq!(pack_rgb565([0, 0, 0]), 0);
        assert_eq!(Color::from_rgb565(0xFFFF), Color::WHITE);
        assert_eq!(Color::from_rgb565(0), Color::BLACK);
    }

    #[test]
    fn primary_channels() {
        assert_eq!(unpack_rgb565(0xF800), [255, 0, 0]);
        assert_eq!(unpack_rgb565(0x07E0), [0, 255, 0]);
        assert_eq!(unpack_rgb565(0x001F), [0, 0, 255]);
    }

    #[test]
    fn quantization_error_is_bounded() {
        for v in 0..=255_u8 {
            let [r, g, b] = unpack_rgb565(pack_rgb565([v, v, v]));
            assert!(v.abs_diff(r) <= 9, "red {v} -> {r}");
            assert!(v.abs_diff(g) <= 5, "green {v} -> {g}");
            assert!(v.abs_diff(b) <= 9, "blue {v} -> {b}");
        }
    }

    #[test]
    fn packing_restores_every_color() {
        for c in 0..=u16::MAX {
            assert_eq!(pack_rgb565(unpack_rgb565(c)), c);
            assert_eq!(pack_rgb565(Color::from_rgb565(c).to_rgb8()), c);
        }
    }

    #[test]
    fn rgb8_survives_float_conversion() {
        for v in 0..=255_u8 {
            let rgb = [v, 255 - v, v / 2];
            assert_eq!(Color::from_rgb8(rgb).to_rgb8(), rgb);
        }
    }
}
