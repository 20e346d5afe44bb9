/*
 * Small example application that converts a downloaded Photosynth
 * project folder into input files for PMVS and point cloud viewers.
 *
 * For every coordinate system it writes into the bin sub folder:
 * - coord_system_<i>.ply: merged point cloud as ASCII PLY
 * - coord_system_<i>_with_cameras.ply: same with camera centers in yellow
 * - coord_system_<i>_indexed.ply: binary PLY with vertex indices in the normals
 * - coord_system_<i>_cameras.txt: camera table with the raw rotations and positions
 * Existing PLY files are kept, so the tool can be run again after a partial download.
 *
 * For the selected coordinate system (default 0) it also writes into the pmvs sub folder:
 * - cameras.txt: world to camera table, one five line record per image
 * - txt/<number>.txt: one projection matrix per camera, numbered in metadata order
 * - cameras_indexed.ply: camera centers with their image index for clustering
 *
 * Image dimensions are taken from the thumbnails unless a maximum
 * image dimension is passed as third argument.
 */

use anyhow::{ensure, Context, Result};
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::Path;
use synthkit::{
    write_cameras, write_contours, write_indexed_cameras, write_indexed_vertices, write_points,
    write_points_with_cameras, Camera, CameraFileOptions, ImageSize, PoseConvention, Project,
    Scene,
};

fn main() -> Result<()> {
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = std::env::args().collect();
    ensure!(
        args.len() >= 2,
        "Usage: synth-to-pmvs <path/to/project> [coord-system] [max-image-dimension]"
    );
    let target: usize = match args.get(2) {
        Some(arg) => arg.parse().context("Coordinate system must be a number")?,
        None => 0,
    };
    let max_dim: Option<f64> = match args.get(3) {
        Some(arg) => Some(arg.parse().context("Image dimension must be a number")?),
        None => None,
    };

    // Load metadata and all point cloud fragments
    let dir = Path::new(&args[1]);
    let project = Project::open(dir).context("Failed to open project folder")?;
    ensure!(
        target < project.coord_systems().len(),
        "Project has only {} coordinate systems",
        project.coord_systems().len()
    );

    // Export every coordinate system into the bin folder
    let bin = dir.join("bin");
    create_dir_all(&bin).context("Failed to create bin folder")?;
    for i in 0..project.coord_systems().len() {
        let scene = project.scene(i)?;
        export_coord_system(&scene, &bin, i)
            .with_context(|| format!("Failed to export coordinate system {i}"))?;
    }

    let scene = project.scene(target)?;
    ensure!(
        scene.camera_count() > 0,
        "Coordinate system {target} has no cameras"
    );

    // Prepare the PMVS folder structure
    let pmvs = dir.join("pmvs");
    for sub in ["txt", "visualize", "models"] {
        create_dir_all(pmvs.join(sub)).context("Failed to create PMVS folders")?;
    }

    // Write camera table with one record per image
    let options = CameraFileOptions {
        count_header: true,
        ..Default::default()
    };
    let file = File::create(pmvs.join("cameras.txt")).context("Unable to create camera file")?;
    write_cameras(&scene.cameras, BufWriter::new(file), &options)
        .context("Failed to write camera file")?;

    // Write projection matrices in metadata camera order,
    // skipping cameras without an entry in the image table
    let thumbs = project.thumbs();
    let cameras: Vec<Camera> = project
        .coord_system(target)?
        .cameras
        .iter()
        .filter(|camera| camera.index < thumbs.len())
        .cloned()
        .collect();
    let size_of = |camera: &Camera| match max_dim {
        Some(max) => ImageSize::from_ratio(max, camera.ratio),
        None => {
            let thumb = &thumbs[camera.index];
            ImageSize::new(f64::from(thumb.width), f64::from(thumb.height))
        }
    };
    write_contours(&cameras, pmvs.join("txt"), size_of)
        .context("Failed to write projection files")?;

    // Write camera centers with their image index for clustering
    let file = File::create(pmvs.join("cameras_indexed.ply"))
        .context("Unable to create camera index file")?;
    write_indexed_cameras(&scene, BufWriter::new(file))
        .context("Failed to write camera index file")?;

    log::info!(
        "Converted coordinate system {target} with {} cameras and {} vertices",
        scene.camera_count(),
        scene.vertices.len()
    );
    Ok(())
}

fn export_coord_system(scene: &Scene, bin: &Path, i: usize) -> Result<()> {
    let path = bin.join(format!("coord_system_{i}.ply"));
    if !path.exists() {
        write_points(scene, BufWriter::new(File::create(&path)?))?;
    }

    let path = bin.join(format!("coord_system_{i}_with_cameras.ply"));
    if !path.exists() {
        write_points_with_cameras(scene, BufWriter::new(File::create(&path)?))?;
    }

    let path = bin.join(format!("coord_system_{i}_indexed.ply"));
    if !path.exists() {
        write_indexed_vertices(scene, BufWriter::new(File::create(&path)?))?;
    }

    let options = CameraFileOptions {
        convention: PoseConvention::Service,
        ..Default::default()
    };
    let path = bin.join(format!("coord_system_{i}_cameras.txt"));
    write_cameras(&scene.cameras, BufWriter::new(File::create(&path)?), &options)?;
    Ok(())
}
