use crate::be_read::BigEndianReader;
use crate::be_write::BigEndianWriter;
use crate::error::Converter;
use crate::point::pack_rgb565;
use crate::Color;
use crate::Error;
use crate::Result;
use crate::Vertex;
use crate::VertexInfo;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

pub const MAJOR_VERSION: u16 = 1;
pub const MINOR_VERSION: u16 = 0;

// Counts come straight from the file, so they only bound the
// initial allocation. Corrupt counts run into the end of the stream instead.
const MAX_PREALLOCATION: usize = 1 << 16;

/// One binary point cloud chunk as delivered by the service.
///
/// Vertex order is significant: the per-image info tables refer to vertices by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    /// Points in file order.
    pub vertices: Vec<Vertex>,
    /// One table per source image with the vertices observed in that image.
    pub infos: Vec<Vec<VertexInfo>>,
}

impl Fragment {
    /// Decodes a fragment from a reader.
    pub fn read(reader: impl Read) -> Result<Self> {
        let mut reader = BigEndianReader::new(reader);

        let major = reader.read_u16()?;
        let minor = reader.read_u16()?;
        if major != MAJOR_VERSION || minor != MINOR_VERSION {
            Err(Error::Version { major, minor })?
        }

        let image_count = reader.read_var_int()? as usize;
        let mut infos = Vec::with_capacity(image_count.min(MAX_PREALLOCATION));
        for _ in 0..image_count {
            let info_count = reader.read_var_int()? as usize;
            let mut image_infos = Vec::with_capacity(info_count.min(MAX_PREALLOCATION));
            for _ in 0..info_count {
                let vertex_index = reader.read_var_int()?;
                let value = reader.read_var_int()?;
                image_infos.push(VertexInfo::new(vertex_index, value));
            }
            infos.push(image_infos);
        }

        let vertex_count = reader.read_var_int()? as usize;
        let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
        for _ in 0..vertex_count {
            let x = reader.read_f32()?;
            let y = reader.read_f32()?;
            let z = reader.read_f32()?;
            let color = Color::from_rgb565(reader.read_u16()?);
            vertices.push(Vertex::new(Point3::new(x, y, z), color));
        }

        log::debug!(
            "Decoded fragment with {} vertices and {} image tables ({} bytes)",
            vertices.len(),
            infos.len(),
            reader.offset()
        );
        Ok(Self { vertices, infos })
    }

    /// Decodes a fragment file.
    /// A file that does not exist is reported as `Error::MissingFile`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MissingFile {
                path: path.to_path_buf(),
            })?,
            Err(e) => Err(e).read_err(format!("Unable to open {}", path.display()))?,
        };
        Self::read(BufReader::new(file))
    }

    /// Encodes the fragment in the service's binary layout.
    /// Colors are quantized to RGB565.
    pub fn write(&self, writer: impl Write) -> Result<()> {
        let mut writer = BigEndianWriter::new(writer);
        writer.write_u16(MAJOR_VERSION)?;
        writer.write_u16(MINOR_VERSION)?;

        writer.write_var_int(count_u32(self.infos.len())?)?;
        for image_infos in &self.infos {
            writer.write_var_int(count_u32(image_infos.len())?)?;
            for info in image_infos {
                writer.write_var_int(info.vertex_index)?;
                writer.write_var_int(info.value)?;
            }
        }

        writer.write_var_int(count_u32(self.vertices.len())?)?;
        for v in &self.vertices {
            writer.write_f32(v.position.x)?;
            writer.write_f32(v.position.y)?;
            writer.write_f32(v.position.z)?;
            writer.write_u16(pack_rgb565(v.color.to_rgb8()))?;
        }

        writer
            .into_inner()
            .flush()
            .write_err("Failed to flush fragment data")
    }

    /// Total number of vertex-image associations in all tables.
    pub fn info_count(&self) -> usize {
        self.infos.iter().map(Vec::len).sum()
    }
}

fn count_u32(count: usize) -> Result<u32> {
    u32::try_from(count).invalid_err(format!("Count {count} does not fit into a var-int"))
}
