use crate::camera::ImageSize;
use crate::error::Converter;
use crate::format::FloatFormat;
use crate::Camera;
use crate::Result;
use nalgebra::Matrix3x4;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Number format of the stereo tool's projection files.
pub const CONTOUR_FORMAT: FloatFormat = FloatFormat::Fixed(6);

/// File name of the projection file with the given sequence number.
pub fn contour_file_name(number: usize) -> String {
    format!("{number:08}.txt")
}

/// Writes a projection matrix in the `CONTOUR` text format.
pub fn write_contour(
    projection: &Matrix3x4<f64>,
    mut writer: impl Write,
    format: FloatFormat,
) -> Result<()> {
    writeln!(writer, "CONTOUR").write_err("Failed to write projection file")?;
    for row in projection.row_iter() {
        let values: Vec<f64> = row.iter().copied().collect();
        writeln!(writer, "{}", format.join(&values))
            .write_err("Failed to write projection file")?;
    }
    writer.flush().write_err("Failed to flush projection file")
}

/// Writes one projection file per camera into `dir`.
///
/// Files are numbered by position in `cameras`, which is expected in
/// metadata order (`CoordSystem::cameras`). The undistorted images are
/// numbered the same way.
/// `size_of` returns the image dimensions of a camera.
pub fn write_contours(
    cameras: &[Camera],
    dir: impl AsRef<Path>,
    size_of: impl Fn(&Camera) -> ImageSize,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::with_capacity(cameras.len());
    for (number, camera) in cameras.iter().enumerate() {
        let path = dir.join(contour_file_name(number));
        let file = File::create(&path)
            .write_err(format!("Unable to create projection file {}", path.display()))?;
        let projection = camera.projection(&size_of(camera));
        write_contour(&projection, BufWriter::new(file), CONTOUR_FORMAT)?;
        paths.push(path);
    }
    log::info!("Wrote {} projection files to {}", paths.len(), dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Quaternion;
    use nalgebra::Vector3;

    #[test]
    fn file_names() {
        assert_eq!(contour_file_name(0), "00000000.txt");
        assert_eq!(contour_file_name(123), "00000123.txt");
    }

    #[test]
    fn identity_camera_contour() {
        let camera = Camera {
            index: 0,
            orientation: Quaternion::default(),
            position: Vector3::zeros(),
            focal: 0.5,
            distort1: 0.0,
            distort2: 0.0,
            ratio: 4.0 / 3.0,
        };
        let projection = camera.projection(&ImageSize::new(640.0, 480.0));
        let mut data = Vec::new();
        write_contour(&projection, &mut data, CONTOUR_FORMAT).unwrap();
        let text = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "CONTOUR");
        assert_eq!(lines[1], "320.000000 0.000000 319.500000 0.000000");
        assert_eq!(lines[3], "0.000000 0.000000 1.000000 0.000000");
    }
}
