use glam::{ Mat4, Vec3 };

use crate::engine::components::transform::JointTransform;
use crate::engine::systems::pose_system::{ self, PoseError };
use crate::engine::utils::math::Axis;

/// One hinge in the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint; `None` only for the root.
    pub parent: Option<usize>,
    /// Hinge axis; `None` marks a fixed joint that never rotates.
    pub axis: Option<Axis>,
    pub transform: JointTransform,
    /// Index of the model mesh drawn with this joint's world matrix.
    pub mesh: usize,
}

impl Joint {
    pub fn fixed(name: impl Into<String>, mesh: usize) -> Self {
        Self {
            name: name.into(),
            parent: None,
            axis: None,
            transform: JointTransform::identity(),
            mesh,
        }
    }

    pub fn hinge(
        name: impl Into<String>,
        parent: usize,
        axis: Axis,
        transform: JointTransform,
        mesh: usize
    ) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            axis: Some(axis),
            transform,
            mesh,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.axis.is_none()
    }
}

/// Joint chain of an articulated model. Joint 0 is the fixed root and every
/// parent index is smaller than its child's index.
#[derive(Debug, Clone, PartialEq)]
pub struct Armature {
    joints: Vec<Joint>,
}

impl Armature {
    /// Validates the chain and clamps every initial angle into its limit.
    pub fn new(mut joints: Vec<Joint>) -> Result<Self, PoseError> {
        pose_system::validate_chain(&joints)?;
        for joint in &mut joints {
            if joint.is_fixed() {
                joint.transform.rotation.z = 0.0;
            } else {
                let _ = joint.transform.set_angle(joint.transform.angle());
            }
        }
        Ok(Self { joints })
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Result<&Joint, PoseError> {
        self.joints.get(index).ok_or(PoseError::InvalidJointIndex {
            index,
            count: self.joints.len(),
        })
    }

    pub fn compose_world_transform(&self, index: usize) -> Result<Mat4, PoseError> {
        pose_system::compose_world_transform(index, &self.joints)
    }

    /// World matrix of every joint, in index order.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        pose_system::compose_all(&self.joints)
    }

    pub fn update_joint(&mut self, index: usize, delta_degrees: f32) -> Result<f32, PoseError> {
        pose_system::update_joint(&mut self.joints, index, delta_degrees)
    }

    /// World-space pivot of every rotating joint, including placement.
    pub fn pivot_positions(&self) -> Vec<Vec3> {
        let placement = self.placement();
        self.joints
            .iter()
            .zip(self.world_transforms())
            .filter(|(joint, _)| !joint.is_fixed())
            .map(|(joint, world)| (placement * world).transform_point3(joint.transform.pivot))
            .collect()
    }

    /// Places the whole model in the world, from the root's position and scale.
    pub fn placement(&self) -> Mat4 {
        self.joints
            .first()
            .map(|root| root.transform.placement_matrix())
            .unwrap_or(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::transform::RotationLimit;

    fn two_link() -> Armature {
        Armature::new(
            vec![
                Joint::fixed("base", 0),
                Joint::hinge(
                    "a",
                    0,
                    Axis::Z,
                    JointTransform::with_pivot(Vec3::ZERO, RotationLimit::default()),
                    1
                ),
                Joint::hinge(
                    "b",
                    1,
                    Axis::Z,
                    JointTransform::with_pivot(Vec3::new(1.0, 0.0, 0.0), RotationLimit::default()),
                    2
                )
            ]
        ).unwrap()
    }

    #[test]
    fn pivots_follow_their_parents() {
        let mut arm = two_link();
        arm.update_joint(1, 90.0).unwrap();
        let pivots = arm.pivot_positions();
        assert_eq!(pivots.len(), 2);
        assert!(pivots[0].abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(pivots[1].abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn placement_comes_from_the_root() {
        let mut joints = two_link().joints().to_vec();
        joints[0].transform.position = Vec3::new(0.0, -1.0, 0.0);
        joints[0].transform.scale = Vec3::splat(2.0);
        let arm = Armature::new(joints).unwrap();

        assert!(arm.compose_world_transform(0).unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        let pivots = arm.pivot_positions();
        assert!(pivots[1].abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-5));
    }
}
