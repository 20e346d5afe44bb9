use crate::error::{missing_or_read, Converter};
use crate::index::decode_index;
use crate::ply_header::{PlyFormat, PlyHeader};
use crate::Error;
use crate::Result;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One vertex record of a PLY file.
#[derive(Clone, Debug, PartialEq)]
pub struct PlyVertex {
    pub position: Point3<f32>,
    /// The `nx`, `ny` and `nz` values. Clustering files store an index here.
    pub normal: Option<[f32; 3]>,
    pub color: Option<[u8; 3]>,
    pub alpha: Option<u8>,
}

impl Default for PlyVertex {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            normal: None,
            color: None,
            alpha: None,
        }
    }
}

impl PlyVertex {
    /// Index payload of the vertex, if the normal slots carry one.
    pub fn index(&self) -> Option<u32> {
        self.normal.and_then(decode_index)
    }
}

/// Reads the vertices of a PLY point cloud.
///
/// Iterating yields the vertices in file order.
/// Face records are never returned, `finish` or `read_all` consume and discard them.
pub struct PlyReader<R: BufRead> {
    reader: R,
    header: PlyHeader,
    remaining: usize,
    line: String,
}

impl<R: BufRead> PlyReader<R> {
    /// Parses the header and prepares reading the vertex records.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = PlyHeader::read(&mut reader)?;
        let remaining = header.vertex_count;
        Ok(Self {
            reader,
            header,
            remaining,
            line: String::new(),
        })
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    /// Reads the next vertex or returns `None` after the last one.
    /// After an error all following calls return `None`.
    pub fn read_vertex(&mut self) -> Result<Option<PlyVertex>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let vertex = match self.header.format {
            PlyFormat::Ascii => self.read_ascii_vertex(),
            PlyFormat::BinaryLittleEndian => self.read_binary_vertex(),
        };
        match vertex {
            Ok(vertex) => {
                self.remaining -= 1;
                Ok(Some(vertex))
            }
            Err(e) => {
                // No further vertices after a failed read
                self.remaining = 0;
                Err(e)
            }
        }
    }

    /// Skips remaining vertices and consumes all face records.
    /// Returns the number of discarded faces.
    pub fn finish(mut self) -> Result<usize> {
        while self.read_vertex()?.is_some() {}
        for face in 0..self.header.face_count {
            match self.header.format {
                PlyFormat::Ascii => {
                    if self.next_ascii_line()?.is_none() {
                        Err(Error::Truncated {
                            reason: format!("PLY file ends before face {face}"),
                        })?
                    }
                }
                PlyFormat::BinaryLittleEndian => {
                    let [count] = self.read_bytes::<1>()?;
                    for _ in 0..count {
                        self.read_bytes::<4>()?;
                    }
                }
            }
        }
        Ok(self.header.face_count)
    }

    /// Reads all vertices and discards the faces.
    pub fn read_all(mut self) -> Result<Vec<PlyVertex>> {
        let mut vertices = Vec::with_capacity(self.remaining.min(1 << 20));
        while let Some(vertex) = self.read_vertex()? {
            vertices.push(vertex);
        }
        self.finish()?;
        Ok(vertices)
    }

    /// Reads the index payload of all vertices.
    ///
    /// Returns `None` with a warning if the file cannot carry indices (text
    /// format or no normals) or if any vertex lacks the marker value.
    pub fn read_indices(self) -> Result<Option<Vec<u32>>> {
        if self.header.format == PlyFormat::Ascii {
            log::warn!("PLY file is in text format, its vertex indices are not reliable");
            return Ok(None);
        }
        if !self.header.has_normals {
            log::warn!("PLY file has no normals and therefore no vertex indices");
            return Ok(None);
        }

        let vertices = self.read_all()?;
        let mut indices = Vec::with_capacity(vertices.len());
        for (i, vertex) in vertices.iter().enumerate() {
            match vertex.index() {
                Some(index) => indices.push(index),
                None => {
                    log::warn!("Vertex {i} carries no index marker, ignoring all indices of the file");
                    return Ok(None);
                }
            }
        }
        Ok(Some(indices))
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buffer = [0_u8; N];
        self.reader
            .read_exact(&mut buffer)
            .read_err("Failed to read binary PLY data")?;
        Ok(buffer)
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_bytes::<4>()?))
    }

    fn read_binary_vertex(&mut self) -> Result<PlyVertex> {
        let position = Point3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?);
        let normal = if self.header.has_normals {
            Some([self.read_f32()?, self.read_f32()?, self.read_f32()?])
        } else {
            None
        };
        let (color, alpha) = if self.header.has_colors {
            let color = self.read_bytes::<3>()?;
            let alpha = if self.header.has_alpha {
                let [a] = self.read_bytes::<1>()?;
                Some(a)
            } else {
                None
            };
            (Some(color), alpha)
        } else {
            (None, None)
        };
        Ok(PlyVertex {
            position,
            normal,
            color,
            alpha,
        })
    }

    /// Returns the next non-empty line, `None` at the end of the input.
    fn next_ascii_line(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .read_err("Failed to read PLY text line")?;
            if read == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    fn read_ascii_vertex(&mut self) -> Result<PlyVertex> {
        let vertex_number = self.header.vertex_count - self.remaining;
        let line = match self.next_ascii_line()? {
            Some(line) => line,
            None => Err(Error::Truncated {
                reason: format!("PLY file ends before vertex {vertex_number}"),
            })?,
        };
        let mut fields = line.split_whitespace();
        let mut next_f32 = |name: &str| -> Result<f32> {
            fields
                .next()
                .invalid_err(format!("Vertex {vertex_number} has no value for {name}"))?
                .parse::<f32>()
                .invalid_err(format!("Vertex {vertex_number} has an invalid {name}"))
        };

        let position = Point3::new(next_f32("x")?, next_f32("y")?, next_f32("z")?);
        let normal = if self.header.has_normals {
            Some([next_f32("nx")?, next_f32("ny")?, next_f32("nz")?])
        } else {
            None
        };

        let mut next_u8 = |name: &str| -> Result<u8> {
            fields
                .next()
                .invalid_err(format!("Vertex {vertex_number} has no value for {name}"))?
                .parse::<u8>()
                .invalid_err(format!("Vertex {vertex_number} has an invalid {name}"))
        };
        let (color, alpha) = if self.header.has_colors {
            let color = [next_u8("red")?, next_u8("green")?, next_u8("blue")?];
            let alpha = if self.header.has_alpha {
                Some(next_u8("alpha")?)
            } else {
                None
            };
            (Some(color), alpha)
        } else {
            (None, None)
        };

        Ok(PlyVertex {
            position,
            normal,
            color,
            alpha,
        })
    }
}

impl PlyReader<BufReader<File>> {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| missing_or_read(path, e))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> Iterator for PlyReader<R> {
    /// Each iterator item is a result for a vertex.
    type Item = Result<PlyVertex>;

    /// Returns the next vertex or None if all vertices were read.
    fn next(&mut self) -> Option<Self::Item> {
        self.read_vertex().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ASCII: &str = "ply
format ascii 1.0
element vertex 2
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0.5 -1 2 255 0 10

3 4 5 1 2 3
3 0 1 0
";

    #[test]
    fn ascii_vertices() {
        let reader = PlyReader::new(Cursor::new(ASCII)).unwrap();
        assert_eq!(reader.header().vertex_count, 2);
        let vertices = reader.read_all().unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].position, Point3::new(0.5, -1.0, 2.0));
        assert_eq!(vertices[0].color, Some([255, 0, 10]));
        assert_eq!(vertices[0].normal, None);
        assert_eq!(vertices[1].color, Some([1, 2, 3]));
        assert_eq!(vertices[1].alpha, None);
    }

    #[test]
    fn ascii_file_has_no_indices() {
        let reader = PlyReader::new(Cursor::new(ASCII)).unwrap();
        assert_eq!(reader.read_indices().unwrap(), None);
    }

    #[test]
    fn iterator_stops_after_vertices() {
        let reader = PlyReader::new(Cursor::new(ASCII)).unwrap();
        let vertices: Result<Vec<PlyVertex>> = reader.collect();
        assert_eq!(vertices.unwrap().len(), 2);
    }

    #[test]
    fn ascii_garbage() {
        let text = ASCII.replace("3 4 5 1 2 3", "3 four 5 1 2 3");
        let result = PlyReader::new(Cursor::new(text)).unwrap().read_all();
        assert!(matches!(result, Err(Error::Invalid { .. })));

        let text = ASCII.replace("3 4 5 1 2 3\n3 0 1 0\n", "");
        let result = PlyReader::new(Cursor::new(text)).unwrap().read_all();
        assert!(matches!(result, Err(Error::Truncated { .. })));
    }

    fn binary_file(nz: f32) -> Vec<u8> {
        let mut data = b"ply
format binary_little_endian 1.0
element vertex 2
property float x
property float y
property float z
property float nx
property float ny
property float nz
property uchar red
property uchar green
property uchar blue
property uchar alpha
element face 1
property list uchar int vertex_indices
end_header
"
        .to_vec();
        for (i, index) in [(0_u8, 70000_u32), (1, 5)] {
            for v in [f32::from(i), 0.0, 1.0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
            let [nx, ny, _] = crate::index::encode_index(index);
            let nz = if i == 1 { nz } else { 42.0 };
            for v in [nx, ny, nz] {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(&[i, 2, 3, 255]);
        }
        data.push(3);
        for v in [0_i32, 1, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn binary_vertices_and_faces() {
        let mut reader = PlyReader::new(Cursor::new(binary_file(42.0))).unwrap();
        let first = reader.read_vertex().unwrap().unwrap();
        assert_eq!(first.position, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(first.color, Some([0, 2, 3]));
        assert_eq!(first.alpha, Some(255));
        assert_eq!(first.index(), Some(70000));
        assert_eq!(reader.finish().unwrap(), 1);
    }

    #[test]
    fn binary_indices() {
        let reader = PlyReader::new(Cursor::new(binary_file(42.0))).unwrap();
        assert_eq!(reader.read_indices().unwrap(), Some(vec![70000, 5]));
    }

    #[test]
    fn sentinel_mismatch() {
        let reader = PlyReader::new(Cursor::new(binary_file(1.0))).unwrap();
        assert_eq!(reader.read_indices().unwrap(), None);
    }

    #[test]
    fn truncated_binary_face() {
        let mut data = binary_file(42.0);
        data.truncate(data.len() - 2);
        let reader = PlyReader::new(Cursor::new(data)).unwrap();
        let result = reader.read_all();
        assert!(matches!(result, Err(Error::Truncated { .. })));
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut data = binary_file(42.0);
        data.truncate(data.len() - 13 - 10);
        let reader = PlyReader::new(Cursor::new(data)).unwrap();
        let results: Vec<Result<PlyVertex>> = reader.collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
