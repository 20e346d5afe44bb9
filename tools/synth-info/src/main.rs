/*
 * Small example application that prints an overview
 * of a downloaded Photosynth project folder.
 *
 * The project folder must contain the files soap.xml, 0.json and guid.txt
 * and the binary point cloud fragments in the bin sub folder.
 *
 * For every coordinate system it prints the number of cameras,
 * point cloud fragments and vertices.
 * Set RUST_LOG=warn to see skipped cameras and fragments.
 */

use anyhow::{ensure, Context, Result};
use synthkit::{CollectionType, Project};

fn main() -> Result<()> {
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = std::env::args().collect();
    ensure!(args.len() >= 2, "Usage: synth-info <path/to/project>");

    // Open project folder and print collection info
    let project = Project::open(&args[1]).context("Failed to open project folder")?;
    let collection = project.collection();
    let kind = match collection.collection_type {
        CollectionType::Synth => "synth",
        CollectionType::Panorama => "panorama",
    };

    println!("GUID:        {}", project.guid());
    println!("Type:        {kind}");
    println!("Succeeded:   {}", collection.succeeded);
    println!("Privacy:     {}", collection.privacy_level);
    println!("JSON URL:    {}", collection.json_url);
    println!("Version:     {}", project.metadata().version);
    println!("Images:      {}", project.image_count());

    // Print one summary line per coordinate system
    for (i, cs) in project.coord_systems().iter().enumerate() {
        let empty = cs.fragments.iter().filter(|f| f.vertices.is_empty()).count();
        println!(
            "Coordinate system {i}: {} cameras, {} fragments ({empty} empty), {} vertices",
            cs.camera_count(),
            cs.fragment_count(),
            cs.vertex_count()
        );
    }

    Ok(())
}
