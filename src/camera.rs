use crate::pose::{basis_flip, portrait_roll, projection_matrix, Pose, PoseConvention};
use crate::transform::{Quaternion, QuaternionPolicy};
use crate::Result;
use nalgebra::{Matrix3, Matrix3x4, Vector3};

/// Raw camera values as stored in the JSON metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraRecord {
    /// Ordinal of the source image in the image table.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Vector part of the orientation quaternion, the scalar part is not stored.
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    /// Width divided by height of the source image.
    pub ratio: f64,
    /// Focal length in units of the larger image dimension.
    pub focal: f64,
    pub distort1: f64,
    pub distort2: f64,
}

/// Pixel dimensions of a source image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Derives the dimensions of an image scaled to `max_dim` pixels on its longer side.
    /// The shorter side is truncated to whole pixels.
    pub fn from_ratio(max_dim: f64, ratio: f64) -> Self {
        if ratio >= 1.0 {
            Self::new(max_dim, (max_dim / ratio).trunc())
        } else {
            Self::new((max_dim * ratio).trunc(), max_dim)
        }
    }

    pub fn max_dim(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// A reconstructed camera of one coordinate system.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub index: usize,
    pub orientation: Quaternion,
    /// Camera center in world coordinates.
    pub position: Vector3<f64>,
    pub focal: f64,
    pub distort1: f64,
    pub distort2: f64,
    pub ratio: f64,
}

impl Camera {
    /// Validates a metadata record and restores the full orientation quaternion.
    pub fn from_record(record: &CameraRecord, policy: QuaternionPolicy) -> Result<Self> {
        let orientation = Quaternion::from_vector_part(record.qx, record.qy, record.qz, policy)?;
        Ok(Self {
            index: record.index,
            orientation,
            position: Vector3::new(record.x, record.y, record.z),
            focal: record.focal,
            distort1: record.distort1,
            distort2: record.distort2,
            ratio: record.ratio,
        })
    }

    /// Rotation matrix of the orientation in the service's camera convention.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.orientation.rotation_matrix()
    }

    pub fn is_portrait(&self) -> bool {
        self.ratio < 1.0
    }

    /// Maps world coordinates into the camera frame of the photogrammetry tools.
    pub fn world_to_camera(&self) -> Pose {
        Pose::world_to_camera(&self.rotation(), &self.position)
    }

    /// Maps camera coordinates into world coordinates.
    pub fn camera_to_world(&self) -> Pose {
        Pose {
            rotation: self.viewer_rotation(),
            translation: self.position,
        }
    }

    /// Returns the pose in the requested export convention.
    pub fn pose(&self, convention: PoseConvention) -> Pose {
        match convention {
            PoseConvention::WorldToCamera => self.world_to_camera(),
            PoseConvention::CameraToWorld => self.camera_to_world(),
            PoseConvention::Service => Pose {
                rotation: self.rotation(),
                translation: self.position,
            },
        }
    }

    /// Orientation of a viewer placed at this camera, looking down its negative Z axis.
    pub fn viewer_rotation(&self) -> Matrix3<f64> {
        self.rotation() * basis_flip()
    }

    /// Like `viewer_rotation`, with portrait images rolled by 90 degrees to stand upright.
    pub fn upright_rotation(&self) -> Matrix3<f64> {
        if self.is_portrait() {
            self.viewer_rotation() * portrait_roll()
        } else {
            self.viewer_rotation()
        }
    }

    /// Focal length in pixels for an image of the given size.
    pub fn focal_pixels(&self, size: &ImageSize) -> f64 {
        self.focal * size.max_dim()
    }

    /// The 3x4 projection matrix written to the contour files.
    pub fn projection(&self, size: &ImageSize) -> Matrix3x4<f64> {
        projection_matrix(
            &self.world_to_camera(),
            self.focal_pixels(size),
            size.width,
            size.height,
        )
    }
}
