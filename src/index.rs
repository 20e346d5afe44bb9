//! Vertex index payload of the clustering files.
//!
//! The clustering hand-off stores a 32-bit image index in the normal slots of a
//! binary PLY file: `nx` holds the low 16 bits, `ny` the high 16 bits and `nz`
//! a fixed marker value. Both halves are exactly representable as `f32`.

/// Marker value in the `nz` slot of vertices that carry an index.
pub const INDEX_SENTINEL: f32 = 42.0;

/// Splits an index into its low and high 16-bit halves.
pub fn split_index(index: u32) -> (u16, u16) {
    ((index & 0xFFFF) as u16, (index >> 16) as u16)
}

/// Inverse of `split_index`.
pub fn join_index(low: u16, high: u16) -> u32 {
    u32::from(low) | (u32::from(high) << 16)
}

/// Encodes an index into the `nx`, `ny` and `nz` values.
pub fn encode_index(index: u32) -> [f32; 3] {
    let (low, high) = split_index(index);
    [f32::from(low), f32::from(high), INDEX_SENTINEL]
}

/// Decodes an index from the `nx`, `ny` and `nz` values.
/// Returns `None` if the marker is missing or a half is not a 16-bit integer.
pub fn decode_index(normal: [f32; 3]) -> Option<u32> {
    let [nx, ny, nz] = normal;
    if nz != INDEX_SENTINEL {
        return None;
    }
    let low = to_u16(nx)?;
    let high = to_u16(ny)?;
    Some(join_index(low, high))
}

fn to_u16(value: f32) -> Option<u16> {
    if value.fract() == 0.0 && (0.0..=f32::from(u16::MAX)).contains(&value) {
        Some(value as u16)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_above_16_bits() {
        assert_eq!(split_index(70000), (4464, 1));
        assert_eq!(join_index(4464, 1), 70000);
        assert_eq!(encode_index(70000), [4464.0, 1.0, 42.0]);
        assert_eq!(decode_index(encode_index(70000)), Some(70000));
    }

    #[test]
    fn extreme_indices() {
        for index in [0, 1, 0xFFFF, 0x10000, u32::MAX - 1, u32::MAX] {
            assert_eq!(decode_index(encode_index(index)), Some(index));
        }
    }

    #[test]
    fn real_normals_are_not_indices() {
        assert_eq!(decode_index([0.0, 0.0, 1.0]), None);
        assert_eq!(decode_index([0.5, 0.0, 42.0]), None);
        assert_eq!(decode_index([-1.0, 0.0, 42.0]), None);
        assert_eq!(decode_index([70000.0, 0.0, 42.0]), None);
        assert_eq!(decode_index([f32::NAN, 0.0, 42.0]), None);
    }
}
