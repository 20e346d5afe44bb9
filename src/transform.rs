use crate::Error;
use crate::Result;
use nalgebra::Matrix3;

/// Squared norms up to `1 + QUATERNION_TOLERANCE` are treated as rounding noise.
pub const QUATERNION_TOLERANCE: f64 = 1e-6;

/// Decides what happens to a camera whose quaternion vector part is longer than one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuaternionPolicy {
    /// Fail with `Error::Quaternion`.
    #[default]
    Reject,
    /// Normalize the vector part and use a zero scalar part (a 180 degree rotation).
    Clamp,
}

/// Describes the orientation of a camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    /// The scalar part of the quaternion. Shall be nonnegative.
    pub w: f64,
    /// The i coefficient of the quaternion.
    pub x: f64,
    /// The j coefficient of the quaternion.
    pub y: f64,
    /// The k coefficient of the quaternion.
    pub z: f64,
}

impl Quaternion {
    /// Restores a unit quaternion from its vector part.
    ///
    /// The service only stores x, y and z, the scalar part is
    /// `sqrt(1 - x² - y² - z²)` and therefore always nonnegative.
    pub fn from_vector_part(x: f64, y: f64, z: f64, policy: QuaternionPolicy) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            Err(Error::Quaternion { x, y, z })?
        }

        let norm_sqr = x * x + y * y + z * z;
        if norm_sqr <= 1.0 {
            return Ok(Self {
                w: (1.0 - norm_sqr).sqrt(),
                x,
                y,
                z,
            });
        }

        if norm_sqr <= 1.0 + QUATERNION_TOLERANCE {
            return Ok(Self { w: 0.0, x, y, z });
        }

        match policy {
            QuaternionPolicy::Reject => Err(Error::Quaternion { x, y, z }),
            QuaternionPolicy::Clamp => {
                let norm = norm_sqr.sqrt();
                log::warn!("Clamping quaternion vector part ({x}, {y}, {z}) with norm {norm}");
                Ok(Self {
                    w: 0.0,
                    x: x / norm,
                    y: y / norm,
                    z: z / norm,
                })
            }
        }
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rotation matrix of the unit quaternion.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        let (tx, ty, tz) = (2.0 * x, 2.0 * y, 2.0 * z);
        let (twx, twy, twz) = (tx * w, ty * w, tz * w);
        let (txx, txy, txz) = (tx * x, ty * x, tz * x);
        let (tyy, tyz, tzz) = (ty * y, tz * y, tz * z);

        Matrix3::new(
            1.0 - (tyy + tzz),
            txy - twz,
            txz + twy,
            txy + twz,
            1.0 - (txx + tzz),
            tyz - twx,
            txz - twy,
            tyz + twx,
            1.0 - (txx + tyy),
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Unit, UnitQuaternion, Vector3};

    #[test]
    fn zero_vector_part_is_identity() {
        let q = Quaternion::from_vector_part(0.0, 0.0, 0.0, QuaternionPolicy::Reject).unwrap();
        assert_eq!(q, Quaternion::default());
        assert_eq!(q.rotation_matrix(), Matrix3::identity());
    }

    #[test]
    fn scalar_part_is_recovered() {
        let q = Quaternion::from_vector_part(0.5, 0.5, 0.5, QuaternionPolicy::Reject).unwrap();
        assert_relative_eq!(q.w, 0.5);
        assert_relative_eq!(q.norm(), 1.0);
    }

    #[test]
    fn matches_nalgebra_rotation() {
        let axis = Unit::new_normalize(Vector3::new(1.0, -2.0, 0.5));
        let reference = UnitQuaternion::from_axis_angle(&axis, 1.1);
        let q = Quaternion::from_vector_part(
            reference.i,
            reference.j,
            reference.k,
            QuaternionPolicy::Reject,
        )
        .unwrap();
        assert_relative_eq!(q.w, reference.w, epsilon = 1e-12);
        assert_relative_eq!(
            q.rotation_matrix(),
            reference.to_rotation_matrix().into_inner(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn rounding_noise_is_accepted() {
        let q = Quaternion::from_vector_part(1.0 + 1e-8, 0.0, 0.0, QuaternionPolicy::Reject)
            .unwrap();
        assert_eq!(q.w, 0.0);
    }

    #[test]
    fn malformed_quaternion_is_rejected() {
        let result = Quaternion::from_vector_part(0.9, 0.9, 0.0, QuaternionPolicy::Reject);
        assert!(matches!(result, Err(Error::Quaternion { .. })));

        let result = Quaternion::from_vector_part(f64::NAN, 0.0, 0.0, QuaternionPolicy::Clamp);
        assert!(matches!(result, Err(Error::Quaternion { .. })));
    }

    #[test]
    fn malformed_quaternion_is_clamped() {
        let q = Quaternion::from_vector_part(0.9, 0.9, 0.0, QuaternionPolicy::Clamp).unwrap();
        assert_eq!(q.w, 0.0);
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.x, q.y);
    }
}
