use crate::error::Converter;
use crate::PlyReader;
use crate::Result;
use std::io::Write;
use std::path::Path;

/// Default name of the PLY file holding the cameras of cluster `n`.
pub fn cluster_ply_name(n: usize) -> String {
    format!("cluster_{n}.ply")
}

/// Image clusters for the stereo tool, saved as `ske.dat`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterFile {
    pub image_count: usize,
    /// Image indices of every cluster.
    pub clusters: Vec<Vec<u32>>,
}

impl ClusterFile {
    /// Collects the image indices carried by binary PLY files, one file per cluster.
    ///
    /// Files without usable indices produce an empty cluster and a warning.
    pub fn from_ply_files<P: AsRef<Path>>(image_count: usize, paths: &[P]) -> Result<Self> {
        let mut clusters = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let indices = PlyReader::from_file(path)?.read_indices()?;
            let indices = match indices {
                Some(indices) => indices,
                None => {
                    log::warn!(
                        "{} carries no image indices, save it in binary format with normals",
                        path.display()
                    );
                    Vec::new()
                }
            };
            let outside = indices
                .iter()
                .filter(|i| **i as usize >= image_count)
                .count();
            if outside > 0 {
                log::warn!(
                    "{} has {outside} indices outside of the {image_count} images",
                    path.display()
                );
            }
            clusters.push(indices);
        }
        Ok(Self {
            image_count,
            clusters,
        })
    }

    /// Writes the cluster list.
    ///
    /// ```text
    /// SKE
    /// <images> <clusters>
    /// <count> 0
    /// <index> <index> ...
    /// ```
    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        let mut lines = vec![
            String::from("SKE"),
            format!("{} {}", self.image_count, self.clusters.len()),
        ];
        for cluster in &self.clusters {
            lines.push(format!("{} 0", cluster.len()));
            let indices: Vec<String> = cluster.iter().map(u32::to_string).collect();
            lines.push(indices.join(" "));
        }
        for line in lines {
            writeln!(writer, "{line}").write_err("Failed to write cluster file")?;
        }
        writer.flush().write_err("Failed to flush cluster file")
    }
}
