use crate::error::Converter;
use crate::metadata::{read_guid, Metadata, Thumb};
use crate::soap::CollectionInfo;
use crate::transform::QuaternionPolicy;
use crate::Camera;
use crate::CoordSystem;
use crate::Fragment;
use crate::Result;
use crate::Scene;
use std::path::{Path, PathBuf};

/// File names inside a downloaded project folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    pub soap: String,
    pub json: String,
    pub guid: String,
    /// Folder with the binary point cloud fragments.
    pub bin_dir: String,
}

impl ProjectLayout {
    /// Path of fragment `fragment` of coordinate system `coord_system`.
    pub fn fragment_path(&self, dir: &Path, coord_system: usize, fragment: usize) -> PathBuf {
        dir.join(&self.bin_dir)
            .join(format!("points_{coord_system}_{fragment}.bin"))
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            soap: String::from("soap.xml"),
            json: String::from("0.json"),
            guid: String::from("guid.txt"),
            bin_dir: String::from("bin"),
        }
    }
}

/// A downloaded project with all metadata and point cloud fragments loaded.
#[derive(Clone, Debug)]
pub struct Project {
    dir: PathBuf,
    guid: String,
    collection: CollectionInfo,
    metadata: Metadata,
    coord_systems: Vec<CoordSystem>,
}

impl Project {
    /// Opens a project folder with the default file layout.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, &ProjectLayout::default(), QuaternionPolicy::default())
    }

    /// Opens a project folder.
    ///
    /// Missing metadata files are errors.
    /// Broken cameras and fragments are logged and skipped, the affected
    /// fragments stay empty so that fragment numbering does not change.
    pub fn open_with(
        dir: impl AsRef<Path>,
        layout: &ProjectLayout,
        policy: QuaternionPolicy,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let guid = read_guid(dir.join(&layout.guid))?;
        let collection = CollectionInfo::from_file(dir.join(&layout.soap))?;
        if !collection.succeeded {
            log::warn!("Collection {guid} was not delivered successfully by the service");
        }
        let metadata = Metadata::from_file(dir.join(&layout.json), &guid)?;

        let mut coord_systems = Vec::with_capacity(metadata.coord_systems.len());
        for (cs_index, info) in metadata.coord_systems.iter().enumerate() {
            let mut cameras = Vec::with_capacity(info.cameras.len());
            for record in &info.cameras {
                match Camera::from_record(record, policy) {
                    Ok(camera) => cameras.push(camera),
                    Err(e) if e.is_recoverable() => {
                        log::warn!(
                            "Skipping camera of image {} in coordinate system {cs_index}: {e}",
                            record.index
                        )
                    }
                    Err(e) => Err(e)?,
                }
            }

            let mut fragments = Vec::with_capacity(info.fragment_count);
            for fragment_index in 0..info.fragment_count {
                let path = layout.fragment_path(&dir, cs_index, fragment_index);
                let fragment = match Fragment::from_file(&path) {
                    Ok(fragment) => fragment,
                    Err(e) if e.is_recoverable() => {
                        log::warn!("Leaving fragment {} empty: {e}", path.display());
                        Fragment::default()
                    }
                    Err(e) => Err(e)?,
                };
                fragments.push(fragment);
            }

            let cs = CoordSystem { cameras, fragments };
            log::info!(
                "Coordinate system {cs_index}: {} cameras, {} fragments, {} vertices",
                cs.camera_count(),
                cs.fragment_count(),
                cs.vertex_count()
            );
            coord_systems.push(cs);
        }

        Ok(Self {
            dir,
            guid,
            collection,
            metadata,
            coord_systems,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn collection(&self) -> &CollectionInfo {
        &self.collection
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn thumbs(&self) -> &[Thumb] {
        &self.metadata.thumbs
    }

    /// Number of source images, including images without a camera.
    pub fn image_count(&self) -> usize {
        self.metadata.image_count()
    }

    pub fn coord_systems(&self) -> &[CoordSystem] {
        &self.coord_systems
    }

    pub fn coord_system(&self, index: usize) -> Result<&CoordSystem> {
        self.coord_systems.get(index).invalid_err(format!(
            "Coordinate system {index} does not exist, the project has {}",
            self.coord_systems.len()
        ))
    }

    pub fn vertex_count(&self, coord_system: usize) -> Result<usize> {
        Ok(self.coord_system(coord_system)?.vertex_count())
    }

    /// Flattens one coordinate system for export.
    pub fn scene(&self, coord_system: usize) -> Result<Scene> {
        let cs = self.coord_system(coord_system)?;
        Ok(Scene::aggregate(self.image_count(), cs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let layout = ProjectLayout::default();
        assert_eq!(
            layout.fragment_path(Path::new("project"), 0, 12),
            Path::new("project").join("bin").join("points_0_12.bin")
        );
    }

    #[test]
    fn missing_project() {
        let dir = std::env::temp_dir().join("synthkit_no_such_project");
        let error = Project::open(&dir).unwrap_err();
        assert!(matches!(error, crate::Error::MissingFile { .. }));
    }
}
