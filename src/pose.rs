use nalgebra::{Matrix3, Matrix3x4, Vector3};

/// Rotation of 180 degrees about the X axis.
///
/// The service's cameras look along their positive Z axis with Y down,
/// the photogrammetry tools expect negative Z with Y up.
/// Built from exact entries so that the identity orientation maps onto it exactly.
pub fn basis_flip() -> Matrix3<f64> {
    Matrix3::new(1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0)
}

/// Exact rotation of 90 degrees about the optical (Z) axis, used to stand portrait images upright.
pub fn portrait_roll() -> Matrix3<f64> {
    Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0)
}

/// Which rotation and translation an exported camera record carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoseConvention {
    /// `x_cam = R·x_world + t` with `R = Rx(180)ᵀ·Qᵀ` and `t = -R·position`.
    /// This is the layout used by Bundler and PMVS.
    #[default]
    WorldToCamera,
    /// The inverse of `WorldToCamera`: rotation `Q·Rx(180)` and the camera center.
    CameraToWorld,
    /// The service's own values: the quaternion rotation `Q` and the camera center.
    Service,
}

/// A rigid transformation.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Pose {
    /// Converts a camera orientation and center of the service into a world to camera pose.
    pub fn world_to_camera(orientation: &Matrix3<f64>, position: &Vector3<f64>) -> Self {
        // Basis change, not a composition of poses: (Q·Rx)ᵀ = Rxᵀ·Qᵀ
        let rotation = basis_flip().transpose() * orientation.transpose();
        let translation = -(rotation * position);
        Self {
            rotation,
            translation,
        }
    }

    /// Inverts the rigid transformation.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        let translation = -(rotation * self.translation);
        Self {
            rotation,
            translation,
        }
    }

    /// The 3x4 matrix `[R|t]`.
    pub fn matrix(&self) -> Matrix3x4<f64> {
        let mut m = Matrix3x4::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.set_column(3, &self.translation);
        m
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }
}

/// Projection matrix for the stereo tool.
///
/// The negated focal length in the first row and the final negation belong together:
/// they turn the left handed pixel convention of the tool into a right handed one.
/// Dropping either one mirrors the reconstruction.
pub fn projection_matrix(pose: &Pose, focal: f64, width: f64, height: f64) -> Matrix3x4<f64> {
    let k = Matrix3::new(
        -focal,
        0.0,
        0.5 * width - 0.5,
        0.0,
        focal,
        0.5 * height - 0.5,
        0.0,
        0.0,
        1.0,
    );
    -(k * pose.matrix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_orientation_gives_flip() {
        let pose = Pose::world_to_camera(&Matrix3::identity(), &Vector3::zeros());
        assert_eq!(pose.rotation, basis_flip());
        assert_eq!(pose.translation, Vector3::zeros());
    }

    #[test]
    fn camera_center_maps_to_origin() {
        let orientation = nalgebra::Rotation3::from_euler_angles(0.3, -0.2, 1.4).into_inner();
        let position = Vector3::new(1.0, 2.0, -3.0);
        let pose = Pose::world_to_camera(&orientation, &position);
        assert_relative_eq!(
            pose.transform_point(&position),
            Vector3::zeros(),
            epsilon = 1e-12
        );

        let inverse = pose.inverse();
        assert_relative_eq!(inverse.translation, position, epsilon = 1e-12);
        assert_relative_eq!(
            inverse.rotation,
            orientation * basis_flip(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn flip_and_roll_are_rotations() {
        for m in [basis_flip(), portrait_roll()] {
            assert_eq!(m * m.transpose(), Matrix3::identity());
            assert_eq!(m.determinant(), 1.0);
        }
    }

    #[test]
    fn projection_of_identity_camera() {
        let pose = Pose::world_to_camera(&Matrix3::identity(), &Vector3::zeros());
        let p = projection_matrix(&pose, 100.0, 640.0, 480.0);
        #[rustfmt::skip]
        let expected = Matrix3x4::new(
            100.0, 0.0, 319.5, 0.0,
            0.0, 100.0, 239.5, 0.0,
            0.0, 0.0, 1.0, 0.0,
        );
        assert_eq!(p, expected);

        // A point in front of the camera lands on the principal point
        let x = p * nalgebra::Vector4::new(0.0, 0.0, -5.0, 1.0);
        assert_relative_eq!(x.x / x.z, 319.5);
        assert_relative_eq!(x.y / x.z, 239.5);
    }
}
