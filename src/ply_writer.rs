use crate::error::Converter;
use crate::format::FloatFormat;
use crate::ply_header::{PlyFormat, PlyHeader};
use crate::Error;
use crate::PlyVertex;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Properties and encoding of a PLY file to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlyWriterOptions {
    pub format: PlyFormat,
    /// Write `nx ny nz`. Required for the index payload of clustering files.
    pub normals: bool,
    pub colors: bool,
    pub alpha: bool,
    /// Number formatting of the text format.
    pub float_format: FloatFormat,
}

impl PlyWriterOptions {
    /// Text file with positions and colors.
    pub fn ascii() -> Self {
        Self {
            format: PlyFormat::Ascii,
            normals: false,
            colors: true,
            alpha: false,
            float_format: FloatFormat::Shortest,
        }
    }

    /// Binary file with an index payload in the normals.
    pub fn indexed() -> Self {
        Self {
            format: PlyFormat::BinaryLittleEndian,
            normals: true,
            ..Self::ascii()
        }
    }
}

impl Default for PlyWriterOptions {
    fn default() -> Self {
        Self::ascii()
    }
}

/// Writes a PLY point cloud vertex by vertex.
///
/// The vertex count is part of the header and must be known up front.
/// `finalize` checks that exactly this many vertices were added.
pub struct PlyWriter<W: Write> {
    writer: W,
    options: PlyWriterOptions,
    vertex_count: usize,
    written: usize,
}

impl<W: Write> PlyWriter<W> {
    pub fn new(mut writer: W, options: PlyWriterOptions, vertex_count: usize) -> Result<Self> {
        let header = PlyHeader {
            format: options.format,
            vertex_count,
            face_count: 0,
            has_normals: options.normals,
            has_colors: options.colors,
            has_alpha: options.colors && options.alpha,
        };
        header.write(&mut writer)?;
        Ok(Self {
            writer,
            options,
            vertex_count,
            written: 0,
        })
    }

    /// Appends a vertex. Missing normals or colors are written as zero.
    pub fn add_vertex(&mut self, vertex: &PlyVertex) -> Result<()> {
        if self.written >= self.vertex_count {
            Error::invalid(format!(
                "Cannot add more than the announced {} vertices",
                self.vertex_count
            ))?
        }

        let p = vertex.position;
        let mut floats = vec![p.x, p.y, p.z];
        if self.options.normals {
            floats.extend_from_slice(&vertex.normal.unwrap_or_default());
        }
        let mut bytes = Vec::with_capacity(4);
        if self.options.colors {
            bytes.extend_from_slice(&vertex.color.unwrap_or_default());
            if self.options.alpha {
                bytes.push(vertex.alpha.unwrap_or(255));
            }
        }

        match self.options.format {
            PlyFormat::Ascii => {
                let mut fields: Vec<String> = floats
                    .iter()
                    .map(|v| self.options.float_format.format_f32(*v))
                    .collect();
                fields.extend(bytes.iter().map(u8::to_string));
                writeln!(self.writer, "{}", fields.join(" "))
                    .write_err("Failed to write PLY vertex")?;
            }
            PlyFormat::BinaryLittleEndian => {
                for v in floats {
                    self.writer
                        .write_all(&v.to_le_bytes())
                        .write_err("Failed to write PLY vertex")?;
                }
                self.writer
                    .write_all(&bytes)
                    .write_err("Failed to write PLY vertex")?;
            }
        }

        self.written += 1;
        Ok(())
    }

    /// Checks the vertex count and flushes the output.
    pub fn finalize(mut self) -> Result<W> {
        if self.written != self.vertex_count {
            Error::invalid(format!(
                "Wrote {} vertices but the header announces {}",
                self.written, self.vertex_count
            ))?
        }
        self.writer
            .flush()
            .write_err("Failed to flush PLY data")?;
        Ok(self.writer)
    }
}

impl PlyWriter<BufWriter<File>> {
    pub fn from_file(
        path: impl AsRef<Path>,
        options: PlyWriterOptions,
        vertex_count: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .write_err(format!("Unable to create PLY file {}", path.display()))?;
        Self::new(BufWriter::new(file), options, vertex_count)
    }
}
