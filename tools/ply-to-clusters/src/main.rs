/*
 * Small example application that creates the PMVS cluster file ske.dat
 * from camera clusters that were split by hand in a point cloud editor.
 *
 * Start from the cameras_indexed.ply file written by synth-to-pmvs,
 * save each group of cameras as cluster_<n>.ply in binary format with normals.
 * The image index of every camera is stored in its normal and would be
 * lost in ASCII files.
 *
 * The files cluster_0.ply up to cluster_<count - 1>.ply are read from the folder
 * (default: current working directory) and ske.dat is written next to them.
 */

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use synthkit::{cluster_ply_name, ClusterFile};

fn main() -> Result<()> {
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("Usage: ply-to-clusters <image-count> <cluster-count> [path/to/clusters]");
    }
    let image_count: usize = args[1].parse().context("Image count must be a number")?;
    let cluster_count: usize = args[2].parse().context("Cluster count must be a number")?;
    let dir = args.get(3).map(PathBuf::from).unwrap_or_default();

    // Collect the image indices of all cluster files
    let paths: Vec<PathBuf> = (0..cluster_count)
        .map(|n| dir.join(cluster_ply_name(n)))
        .collect();
    let clusters =
        ClusterFile::from_ply_files(image_count, &paths).context("Failed to read clusters")?;

    // Write cluster list next to the input files
    let out = dir.join("ske.dat");
    let file = File::create(&out).context("Unable to create cluster file")?;
    clusters
        .write(BufWriter::new(file))
        .context("Failed to write cluster file")?;

    for (n, cluster) in clusters.clusters.iter().enumerate() {
        log::info!("Cluster {n}: {} images", cluster.len());
    }
    Ok(())
}
