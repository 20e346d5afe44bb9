use crate::error::Converter;
use crate::Error;
use crate::Result;
use std::io::{BufRead, Write};

/// Headers of real files are a few dozen lines.
/// Anything longer is not a PLY file or lacks its `end_header` line.
pub const MAX_HEADER_LINES: usize = 1024;

/// Encoding of the PLY element data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    #[default]
    BinaryLittleEndian,
}

impl PlyFormat {
    fn header_line(&self) -> &'static str {
        match self {
            PlyFormat::Ascii => "format ascii 1.0",
            PlyFormat::BinaryLittleEndian => "format binary_little_endian 1.0",
        }
    }
}

/// The parts of a PLY header used by the point cloud tools.
///
/// Vertex records are laid out as `x y z`, optionally followed by `nx ny nz`,
/// optionally followed by `red green blue` and `alpha`.
/// Property lines other than the recognized ones are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub vertex_count: usize,
    pub face_count: usize,
    pub has_normals: bool,
    pub has_colors: bool,
    pub has_alpha: bool,
}

impl PlyHeader {
    /// Reads a header up to and including the `end_header` line.
    pub fn read(reader: &mut impl BufRead) -> Result<Self> {
        let mut line = String::new();
        let mut format = None;
        let mut vertex_count = None;
        let mut face_count = 0;
        let mut has_normals = false;
        let mut has_colors = false;
        let mut has_alpha = false;

        for line_number in 0..MAX_HEADER_LINES {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .read_err("Failed to read PLY header line")?;
            if read == 0 {
                Error::header("Reached end of file before 'end_header'")?
            }
            let text = line.trim_end_matches(['\r', '\n']);

            if line_number == 0 {
                if text != "ply" {
                    Error::header(format!("Expected 'ply' magic line, found '{text}'"))?
                }
                continue;
            }

            match text {
                "end_header" => {
                    let format = match format {
                        Some(format) => format,
                        None => Error::header("PLY header has no format line")?,
                    };
                    let vertex_count = match vertex_count {
                        Some(count) => count,
                        None => Error::header("PLY header declares no vertex element")?,
                    };
                    return Ok(Self {
                        format,
                        vertex_count,
                        face_count,
                        has_normals,
                        has_colors,
                        has_alpha,
                    });
                }
                "format ascii 1.0" => format = Some(PlyFormat::Ascii),
                "format binary_little_endian 1.0" => format = Some(PlyFormat::BinaryLittleEndian),
                "property float nx" => has_normals = true,
                "property uchar red" | "property uchar diffuse_red" => has_colors = true,
                "property uchar alpha" | "property uchar diffuse_alpha" => has_alpha = true,
                _ => {
                    if let Some(count) = text.strip_prefix("element vertex ") {
                        vertex_count = Some(parse_count(count)?);
                    } else if let Some(count) = text.strip_prefix("element face ") {
                        face_count = parse_count(count)?;
                    } else if text.starts_with("format ") {
                        Error::header(format!("Unsupported PLY format '{text}'"))?
                    }
                }
            }
        }

        Error::header(format!(
            "No 'end_header' within the first {MAX_HEADER_LINES} lines"
        ))
    }

    /// Writes a header matching the record layout `PlyReader` expects.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        let mut lines = vec![
            String::from("ply"),
            String::from(self.format.header_line()),
            format!("element vertex {}", self.vertex_count),
            String::from("property float x"),
            String::from("property float y"),
            String::from("property float z"),
        ];
        if self.has_normals {
            lines.push(String::from("property float nx"));
            lines.push(String::from("property float ny"));
            lines.push(String::from("property float nz"));
        }
        if self.has_colors {
            lines.push(String::from("property uchar red"));
            lines.push(String::from("property uchar green"));
            lines.push(String::from("property uchar blue"));
            if self.has_alpha {
                lines.push(String::from("property uchar alpha"));
            }
        }
        lines.push(format!("element face {}", self.face_count));
        lines.push(String::from("property list uchar int vertex_indices"));
        lines.push(String::from("end_header"));

        for line in lines {
            writeln!(writer, "{line}").write_err("Failed to write PLY header")?;
        }
        Ok(())
    }

    /// Size of one binary vertex record in bytes.
    pub fn vertex_record_size(&self) -> usize {
        let floats = if self.has_normals { 6 } else { 3 };
        let colors = match (self.has_colors, self.has_alpha) {
            (false, _) => 0,
            (true, false) => 3,
            (true, true) => 4,
        };
        floats * 4 + colors
    }
}

fn parse_count(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .invalid_err(format!("Invalid PLY element count '{text}'"))
}
