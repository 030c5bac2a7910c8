//! Object transform: position, orientation and scale.
//!
//! The editor reads and writes orientation as Euler angles in degrees;
//! the stored representation is always a quaternion. The conversion pair
//! here round-trips and handles the gimbal poles explicitly.

use glam::{Mat4, Quat, Vec3};

/// Threshold for the singularities found at the north/south poles.
const SINGULARITY_THRESHOLD: f32 = 0.499_999_5;

/// Position, rotation and scale of a scene object.
///
/// Owned exclusively by its [`GameObject`](crate::scene::GameObject);
/// overwritten wholesale by the physics sync while a body is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Unit vector the object is facing (-Z in local space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Rotation as Euler angles in degrees (pitch, yaw, roll).
    pub fn euler_angles(&self) -> Vec3 {
        quat_to_euler(self.rotation).map(f32::to_degrees)
    }

    /// Set the rotation from Euler angles in degrees (pitch, yaw, roll).
    pub fn set_euler_angles(&mut self, degrees: Vec3) {
        self.rotation = quat_from_euler(degrees.map(f32::to_radians));
    }

    /// Scale, then rotate, then translate.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// View matrix looking from this position along `direction`.
    pub fn look_at(&self, direction: Vec3) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + direction, Vec3::Y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Quaternion to Euler angles in radians (x = pitch, y = yaw, z = roll).
///
/// The asin argument saturates near the poles; inside the singularity
/// band yaw is fixed to ±90° and the remaining rotation folds into roll.
fn quat_to_euler(q: Quat) -> Vec3 {
    let sqw = q.w * q.w;
    let sqx = q.x * q.x;
    let sqy = q.y * q.y;
    let sqz = q.z * q.z;
    // one when normalized, otherwise a correction factor
    let unit = sqx + sqy + sqz + sqw;
    let singularity_test = q.x * q.z + q.w * q.y;

    if singularity_test > SINGULARITY_THRESHOLD * unit {
        Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 2.0 * q.x.atan2(q.w))
    } else if singularity_test < -SINGULARITY_THRESHOLD * unit {
        Vec3::new(0.0, -std::f32::consts::FRAC_PI_2, -2.0 * q.x.atan2(q.w))
    } else {
        Vec3::new(
            (2.0 * (q.w * q.x - q.y * q.z)).atan2(sqw - sqx - sqy + sqz),
            (2.0 * singularity_test / unit).asin(),
            (2.0 * (q.w * q.z - q.x * q.y)).atan2(sqw + sqx - sqy - sqz),
        )
    }
}

/// Euler angles in radians (x = pitch, y = yaw, z = roll) to quaternion.
/// Inverse of [`quat_to_euler`] away from the poles.
fn quat_from_euler(radians: Vec3) -> Quat {
    let (s1, c1) = (radians.x * 0.5).sin_cos();
    let (s2, c2) = (radians.y * 0.5).sin_cos();
    let (s3, c3) = (radians.z * 0.5).sin_cos();

    Quat::from_xyzw(
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
        c1 * c2 * s3 + s1 * s2 * c3,
        c1 * c2 * c3 - s1 * s2 * s3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!(
            (a - b).length() < 1e-3,
            "expected {:?} to be near {:?}",
            a,
            b
        );
    }

    #[test]
    fn euler_round_trip_mild_angles() {
        let mut t = Transform::IDENTITY;
        let angles = Vec3::new(30.0, 45.0, -60.0);
        t.set_euler_angles(angles);
        assert_vec3_near(t.euler_angles(), angles);
    }

    #[test]
    fn single_axis_rotations() {
        let mut t = Transform::IDENTITY;

        t.set_euler_angles(Vec3::new(90.0, 0.0, 0.0));
        let expected = Quat::from_rotation_x(90f32.to_radians());
        assert!(t.rotation.dot(expected).abs() > 0.9999);

        t.set_euler_angles(Vec3::new(0.0, 0.0, 45.0));
        let expected = Quat::from_rotation_z(45f32.to_radians());
        assert!(t.rotation.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn pole_singularity_is_handled() {
        let mut t = Transform::IDENTITY;
        t.set_euler_angles(Vec3::new(0.0, 90.0, 0.0));
        let angles = t.euler_angles();
        // straight up: yaw pinned to 90, no NaN leakage
        assert!((angles.y - 90.0).abs() < 0.1);
        assert!(angles.is_finite());

        t.set_euler_angles(Vec3::new(0.0, -90.0, 0.0));
        let angles = t.euler_angles();
        assert!((angles.y + 90.0).abs() < 0.1);
        assert!(angles.is_finite());
    }

    #[test]
    fn forward_follows_yaw() {
        let mut t = Transform::IDENTITY;
        assert_vec3_near(t.forward(), Vec3::NEG_Z);

        // yaw 90° left turns -Z into -X
        t.set_euler_angles(Vec3::new(0.0, 90.0, 0.0));
        assert_vec3_near(t.forward(), Vec3::NEG_X);
    }

    #[test]
    fn model_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = t.model_matrix();
        let origin = m.transform_point3(Vec3::ZERO);
        assert_vec3_near(origin, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn model_matrix_applies_nonuniform_scale() {
        let t = Transform {
            scale: Vec3::new(2.0, 3.0, 4.0),
            ..Transform::IDENTITY
        };
        let m = t.model_matrix();
        let p = m.transform_point3(Vec3::ONE);
        assert_vec3_near(p, Vec3::new(2.0, 3.0, 4.0));
    }
}
