use crate::index::encode_index;
use crate::Color;
use crate::Error;
use crate::PlyVertex;
use crate::PlyWriter;
use crate::PlyWriterOptions;
use crate::Result;
use crate::Scene;
use crate::Vertex;
use nalgebra::Point3;
use std::io::Write;

fn ply_vertex(vertex: &Vertex) -> PlyVertex {
    PlyVertex {
        position: vertex.position,
        normal: None,
        color: Some(vertex.color.to_rgb8()),
        alpha: None,
    }
}

fn camera_marker(position: Point3<f32>) -> PlyVertex {
    PlyVertex {
        position,
        normal: None,
        color: Some(Color::YELLOW.to_rgb8()),
        alpha: None,
    }
}

/// Writes the merged point cloud of a scene as a text PLY file.
pub fn write_points(scene: &Scene, writer: impl Write) -> Result<()> {
    let mut ply = PlyWriter::new(writer, PlyWriterOptions::ascii(), scene.vertices.len())?;
    for vertex in &scene.vertices {
        ply.add_vertex(&ply_vertex(vertex))?;
    }
    ply.finalize()?;
    Ok(())
}

/// Writes the merged point cloud followed by one yellow vertex per camera center.
pub fn write_points_with_cameras(scene: &Scene, writer: impl Write) -> Result<()> {
    let count = scene.vertices.len() + scene.camera_count();
    let mut ply = PlyWriter::new(writer, PlyWriterOptions::ascii(), count)?;
    for vertex in &scene.vertices {
        ply.add_vertex(&ply_vertex(vertex))?;
    }
    for camera in scene.present_cameras() {
        ply.add_vertex(&camera_marker(camera.position.cast::<f32>().into()))?;
    }
    ply.finalize()?;
    Ok(())
}

/// Writes the scene vertices into a binary PLY file, each carrying its own vertex index.
pub fn write_indexed_vertices(scene: &Scene, writer: impl Write) -> Result<()> {
    let mut ply = PlyWriter::new(writer, PlyWriterOptions::indexed(), scene.vertices.len())?;
    for (i, vertex) in scene.vertices.iter().enumerate() {
        let mut v = ply_vertex(vertex);
        v.normal = Some(encode_index(index_u32(i)?));
        ply.add_vertex(&v)?;
    }
    ply.finalize()?;
    Ok(())
}

/// Writes one vertex per camera center into a binary PLY file.
/// Every vertex carries the image index of its camera.
///
/// After the cameras were grouped and saved again in binary format with
/// normals, `ClusterFile::from_ply_files` restores the image indices.
pub fn write_indexed_cameras(scene: &Scene, writer: impl Write) -> Result<()> {
    let mut ply = PlyWriter::new(writer, PlyWriterOptions::indexed(), scene.camera_count())?;
    for camera in scene.present_cameras() {
        let mut v = camera_marker(camera.position.cast::<f32>().into());
        v.normal = Some(encode_index(index_u32(camera.index)?));
        ply.add_vertex(&v)?;
    }
    ply.finalize()?;
    Ok(())
}

fn index_u32(index: usize) -> Result<u32> {
    match u32::try_from(index) {
        Ok(index) => Ok(index),
        Err(_) => Error::invalid(format!("Index {index} does not fit into 32 bits")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Quaternion;
    use crate::{Camera, PlyReader};
    use nalgebra::Vector3;
    use std::io::Cursor;

    fn scene() -> Scene {
        let camera = Camera {
            index: 1,
            orientation: Quaternion::default(),
            position: Vector3::new(1.0, 2.0, 3.0),
            focal: 1.0,
            distort1: 0.0,
            distort2: 0.0,
            ratio: 1.0,
        };
        Scene {
            cameras: vec![None, Some(camera)],
            vertices: vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0), Color::WHITE),
                Vertex::new(Point3::new(0.5, 0.5, 0.5), Color::BLACK),
            ],
            observations: Vec::new(),
        }
    }

    #[test]
    fn points_with_cameras() {
        let mut data = Vec::new();
        write_points_with_cameras(&scene(), &mut data).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert!(text.contains("element vertex 3\n"));
        assert!(text.ends_with("0 0 0 255 255 255\n0.5 0.5 0.5 0 0 0\n1 2 3 255 255 0\n"));
    }

    #[test]
    fn indexed_cameras_carry_image_index() {
        let mut data = Vec::new();
        write_indexed_cameras(&scene(), &mut data).unwrap();
        let indices = PlyReader::new(Cursor::new(data))
            .unwrap()
            .read_indices()
            .unwrap();
        assert_eq!(indices, Some(vec![1]));
    }
}
