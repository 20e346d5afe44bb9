use approx::assert_relative_eq;
use nalgebra::Point3;
use std::io::Cursor;
use synthkit::{
    write_cameras, write_indexed_vertices, write_points, write_points_with_cameras,
    CameraFileOptions, Color, ImageSize, Observation, PlyReader, Project, ABSENT_ROW,
};

#[test]
fn scene_of_project() {
    let project = Project::open("testdata/project").unwrap();
    let scene = project.scene(0).unwrap();

    assert_eq!(scene.image_count(), 5);
    assert_eq!(scene.camera_count(), 3);
    assert!(scene.cameras[1].is_none());
    assert!(scene.cameras[3].is_none());
    assert_eq!(scene.cameras[4].as_ref().unwrap().index, 4);

    // Fragment 1 follows the three vertices of fragment 0
    assert_eq!(scene.vertices.len(), 5);
    assert_eq!(scene.vertices[3].position, Point3::new(10.0, 10.0, 10.0));
    assert_eq!(scene.vertices[4].color, Color::from_rgb8([0, 255, 0]));
    assert_eq!(
        scene.observations.last(),
        Some(&Observation {
            image: 0,
            vertex_index: 4,
            value: 7
        })
    );
    assert_eq!(scene.observations.len(), 4);

    let empty = project.scene(1).unwrap();
    assert_eq!(empty.image_count(), 5);
    assert_eq!(empty.camera_count(), 0);
    assert!(empty.vertices.is_empty());
}

#[test]
fn camera_table_of_project() {
    let project = Project::open("testdata/project").unwrap();
    let scene = project.scene(0).unwrap();
    let options = CameraFileOptions {
        count_header: true,
        ..Default::default()
    };
    let mut data = Vec::new();
    write_cameras(&scene.cameras, &mut data, &options).unwrap();
    let text = String::from_utf8(data).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "5");
    let records: Vec<&[&str]> = lines[1..].chunks(5).collect();
    assert_eq!(records.len(), 5);
    for slot in [1, 3] {
        assert!(records[slot].iter().all(|l| *l == ABSENT_ROW));
    }

    // Camera 0 has the identity orientation and sits at the origin
    assert_eq!(records[0][0], "1.2 0.01 -0.02");
    assert_eq!(&records[0][1..], &["1 0 0", "0 -1 0", "0 0 -1", "0 0 0"]);
    for slot in [2, 4] {
        assert!(records[slot].iter().all(|l| *l != ABSENT_ROW));
    }
}

#[test]
fn projection_of_project_camera() {
    let project = Project::open("testdata/project").unwrap();
    let scene = project.scene(0).unwrap();
    let camera = scene.cameras[2].as_ref().unwrap();
    assert!(camera.is_portrait());

    let thumb = &project.thumbs()[2];
    let size = ImageSize::new(f64::from(thumb.width), f64::from(thumb.height));
    assert_relative_eq!(camera.focal_pixels(&size), 0.9 * 683.0);

    // Points in front of the camera project into the image
    let pose = camera.camera_to_world();
    let ahead = pose.transform_point(&nalgebra::Vector3::new(0.0, 0.0, -5.0));
    let p = camera.projection(&size) * ahead.push(1.0);
    let (u, v) = (p.x / p.z, p.y / p.z);
    assert_relative_eq!(u, 0.5 * size.width - 0.5, epsilon = 1e-9);
    assert_relative_eq!(v, 0.5 * size.height - 0.5, epsilon = 1e-9);
}

#[test]
fn interchange_round_trip() {
    let project = Project::open("testdata/project").unwrap();
    let scene = project.scene(0).unwrap();

    let mut data = Vec::new();
    write_points(&scene, &mut data).unwrap();
    let vertices = PlyReader::new(Cursor::new(data)).unwrap().read_all().unwrap();
    assert_eq!(vertices.len(), scene.vertices.len());
    for (read, original) in vertices.iter().zip(&scene.vertices) {
        assert_eq!(read.position, original.position);
        assert_eq!(read.color, Some(original.color.to_rgb8()));
    }

    let mut data = Vec::new();
    write_indexed_vertices(&scene, &mut data).unwrap();
    let reader = PlyReader::new(Cursor::new(data)).unwrap();
    let vertices = reader.read_all().unwrap();
    for (i, (read, original)) in vertices.iter().zip(&scene.vertices).enumerate() {
        assert_eq!(read.position, original.position);
        assert_eq!(read.index(), Some(i as u32));
    }
}

#[test]
fn points_with_camera_markers() {
    let project = Project::open("testdata/project").unwrap();
    let scene = project.scene(0).unwrap();

    let mut data = Vec::new();
    write_points_with_cameras(&scene, &mut data).unwrap();
    let vertices = PlyReader::new(Cursor::new(data)).unwrap().read_all().unwrap();
    assert_eq!(vertices.len(), 8);

    let markers = &vertices[5..];
    for (marker, camera) in markers.iter().zip(scene.present_cameras()) {
        assert_eq!(marker.color, Some([255, 255, 0]));
        assert_relative_eq!(marker.position.x, camera.position.x as f32);
        assert_relative_eq!(marker.position.y, camera.position.y as f32);
        assert_relative_eq!(marker.position.z, camera.position.z as f32);
    }
}
