use glam::{ Mat4, Vec3 };
use serde::{ Deserialize, Serialize };

/// Inclusive range, in degrees, a hinge angle may take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationLimit {
    pub min: f32,
    pub max: f32,
}

impl RotationLimit {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn clamp(&self, degrees: f32) -> f32 {
        degrees.clamp(self.min, self.max)
    }
}

impl Default for RotationLimit {
    fn default() -> Self {
        Self::new(-180.0, 180.0)
    }
}

/// Local state of one joint.
///
/// `rotation` is an Euler triple in degrees; only `rotation.z` is used, as the
/// hinge angle about the joint's axis. `position` and `scale` are only read on
/// the root joint, where they place the whole model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub pivot: Vec3,
    pub rotation_limit: RotationLimit,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl JointTransform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            pivot: Vec3::ZERO,
            rotation_limit: RotationLimit::default(),
        }
    }

    pub fn with_pivot(pivot: Vec3, rotation_limit: RotationLimit) -> Self {
        Self {
            pivot,
            rotation_limit,
            ..Self::identity()
        }
    }

    /// Hinge angle in degrees.
    pub fn angle(&self) -> f32 {
        self.rotation.z
    }

    /// Sets the hinge angle, clamped to the limit.
    pub fn set_angle(&mut self, degrees: f32) -> f32 {
        self.rotation.z = self.rotation_limit.clamp(degrees);
        self.rotation.z
    }

    /// Adds `delta` degrees to the hinge angle, clamped to the limit.
    pub fn rotate_by(&mut self, delta: f32) -> f32 {
        self.set_angle(self.rotation.z + delta)
    }

    /// Copy of this transform rotated by `delta` degrees.
    pub fn rotated_by(mut self, delta: f32) -> Self {
        let _ = self.rotate_by(delta);
        self
    }

    /// `T(position) * S(scale)`.
    pub fn placement_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale)
    }
}
