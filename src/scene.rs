use crate::Camera;
use crate::Fragment;
use crate::Vertex;

/// One independent reconstruction of a project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoordSystem {
    /// Cameras in metadata order. Their image indices may have gaps.
    pub cameras: Vec<Camera>,
    /// Point cloud fragments in file order. Fragments that failed to load are empty.
    pub fragments: Vec<Fragment>,
}

impl CoordSystem {
    /// Number of fragments announced by the metadata.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Total number of vertices in all fragments.
    pub fn vertex_count(&self) -> usize {
        self.fragments.iter().map(|f| f.vertices.len()).sum()
    }

    /// Finds the camera that belongs to the source image with the given index.
    pub fn camera_by_index(&self, image_index: usize) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.index == image_index)
    }

    /// Position of the first vertex of every fragment in the concatenated vertex list.
    pub fn fragment_offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.fragments
            .iter()
            .map(|f| {
                let start = offset;
                offset += f.vertices.len();
                start
            })
            .collect()
    }

    /// Iterates all vertices in fragment order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.fragments.iter().flat_map(|f| f.vertices.iter())
    }
}

/// Association of a vertex of the merged point cloud with a source image table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Index of the info table inside its fragment.
    pub image: usize,
    /// Index into `Scene::vertices`.
    pub vertex_index: usize,
    pub value: u32,
}

/// A coordinate system flattened for export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// One slot per source image. Images without a reconstructed camera are `None`.
    pub cameras: Vec<Option<Camera>>,
    /// All fragment vertices concatenated in fragment order.
    pub vertices: Vec<Vertex>,
    pub observations: Vec<Observation>,
}

impl Scene {
    /// Merges a coordinate system into camera slots and one vertex list.
    ///
    /// Vertex order is kept as is since info tables address vertices by position.
    /// Cameras with an image index outside of `image_count` are dropped with a warning.
    pub fn aggregate(image_count: usize, coord_system: &CoordSystem) -> Self {
        let mut cameras: Vec<Option<Camera>> = vec![None; image_count];
        for camera in &coord_system.cameras {
            match cameras.get_mut(camera.index) {
                Some(slot) => {
                    if slot.is_some() {
                        log::warn!(
                            "Image {} has more than one camera, keeping the last one",
                            camera.index
                        );
                    }
                    *slot = Some(camera.clone());
                }
                None => log::warn!(
                    "Ignoring camera of image {} outside of the image table with {image_count} entries",
                    camera.index
                ),
            }
        }

        let mut vertices = Vec::with_capacity(coord_system.vertex_count());
        let mut observations = Vec::new();
        for (fragment, offset) in coord_system
            .fragments
            .iter()
            .zip(coord_system.fragment_offsets())
        {
            for (image, infos) in fragment.infos.iter().enumerate() {
                observations.extend(infos.iter().map(|info| Observation {
                    image,
                    vertex_index: offset + info.vertex_index as usize,
                    value: info.value,
                }));
            }
            vertices.extend(fragment.vertices.iter().cloned());
        }

        let scene = Self {
            cameras,
            vertices,
            observations,
        };
        log::info!(
            "Aggregated scene with {} of {} cameras and {} vertices",
            scene.camera_count(),
            scene.image_count(),
            scene.vertices.len()
        );
        scene
    }

    /// Number of camera slots.
    pub fn image_count(&self) -> usize {
        self.cameras.len()
    }

    /// Number of slots holding a camera.
    pub fn camera_count(&self) -> usize {
        self.cameras.iter().filter(|c| c.is_some()).count()
    }

    /// Iterates the present cameras in slot order.
    pub fn present_cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.iter().flatten()
    }
}
