use crate::error::Converter;
use crate::format::FloatFormat;
use crate::pose::PoseConvention;
use crate::Camera;
use crate::Result;
use std::io::Write;

/// Text written for every row of an image without a camera.
pub const ABSENT_ROW: &str = "0 0 0";

/// Layout options of the camera parameter table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraFileOptions {
    /// Start the file with a line holding the number of slots.
    pub count_header: bool,
    pub format: FloatFormat,
    /// Which rotation and translation the rows carry.
    pub convention: PoseConvention,
}

/// Writes the camera parameter table, five rows per image slot.
///
/// ```text
/// focal distort1 distort2
/// r00 r01 r02
/// r10 r11 r12
/// r20 r21 r22
/// tx ty tz
/// ```
///
/// Slots without a camera are written as five `0 0 0` rows so that
/// consumers can locate cameras by their position in the file.
pub fn write_cameras(
    cameras: &[Option<Camera>],
    mut writer: impl Write,
    options: &CameraFileOptions,
) -> Result<()> {
    let f = options.format;
    let mut rows = Vec::with_capacity(cameras.len() * 5 + 1);
    if options.count_header {
        rows.push(cameras.len().to_string());
    }

    for slot in cameras {
        match slot {
            Some(camera) => {
                let pose = camera.pose(options.convention);
                rows.push(f.join(&[camera.focal, camera.distort1, camera.distort2]));
                for r in pose.rotation.row_iter() {
                    rows.push(f.join(&[r[0], r[1], r[2]]));
                }
                let t = pose.translation;
                rows.push(f.join(&[t.x, t.y, t.z]));
            }
            None => rows.extend(std::iter::repeat(String::from(ABSENT_ROW)).take(5)),
        }
    }

    for row in rows {
        writeln!(writer, "{row}").write_err("Failed to write camera parameters")?;
    }
    writer.flush().write_err("Failed to flush camera parameters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Quaternion;
    use nalgebra::Vector3;

    fn camera(index: usize) -> Camera {
        Camera {
            index,
            orientation: Quaternion::default(),
            position: Vector3::new(1.0, 2.0, 3.0),
            focal: 1.25,
            distort1: 0.5,
            distort2: -0.25,
            ratio: 1.5,
        }
    }

    #[test]
    fn world_to_camera_rows() {
        let mut data = Vec::new();
        write_cameras(&[Some(camera(0))], &mut data, &CameraFileOptions::default()).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert_eq!(text, "1.25 0.5 -0.25\n1 0 0\n0 -1 0\n0 0 -1\n-1 2 3\n");
    }

    #[test]
    fn service_rows_and_count_header() {
        let options = CameraFileOptions {
            count_header: true,
            format: FloatFormat::Fixed(2),
            convention: PoseConvention::Service,
        };
        let mut data = Vec::new();
        write_cameras(&[None, Some(camera(1))], &mut data, &options).unwrap();
        let lines: Vec<&str> = std::str::from_utf8(&data).unwrap().lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "2");
        assert!(lines[1..6].iter().all(|l| *l == ABSENT_ROW));
        assert_eq!(lines[6], "1.25 0.50 -0.25");
        assert_eq!(lines[7], "1.00 0.00 0.00");
        assert_eq!(lines[10], "1.00 2.00 3.00");
    }
}
