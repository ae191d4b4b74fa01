//! Hierarchical pose composition.
//!
//! Each rotating joint contributes `T(pivot) * R(axis, angle) * T(-pivot)`.
//! A joint's world matrix is the product of those blocks along its ancestor
//! chain, the outermost ancestor leftmost.

use glam::Mat4;

use crate::engine::components::armature::Joint;
use crate::engine::utils::math::rotate_about_pivot;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoseError {
    #[error("Joint index {index} is out of range for an armature of {count} joints")]
    InvalidJointIndex { index: usize, count: usize },

    #[error("Joint {index} has rotation limit min {min} > max {max}")]
    InvalidLimit { index: usize, min: f32, max: f32 },

    #[error("Joint {index} has parent {parent}; parents must precede their children")]
    InvalidParent { index: usize, parent: usize },

    #[error("Joint {0} has no parent; only joint 0 may be the root")]
    MissingParent(usize),

    #[error("Root joint must be fixed and parentless")]
    RootNotFixed,

    #[error("Armature has no joints")]
    EmptyArmature,
}

pub fn validate_chain(joints: &[Joint]) -> Result<(), PoseError> {
    let root = joints.first().ok_or(PoseError::EmptyArmature)?;
    if root.parent.is_some() || !root.is_fixed() {
        return Err(PoseError::RootNotFixed);
    }

    for (index, joint) in joints.iter().enumerate() {
        let limit = joint.transform.rotation_limit;
        if !limit.is_valid() {
            return Err(PoseError::InvalidLimit {
                index,
                min: limit.min,
                max: limit.max,
            });
        }
        if index == 0 {
            continue;
        }
        match joint.parent {
            None => {
                return Err(PoseError::MissingParent(index));
            }
            Some(parent) if parent >= index => {
                return Err(PoseError::InvalidParent { index, parent });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Pivot-rotate-unpivot block of a single joint; identity for fixed joints.
pub fn local_pose(joint: &Joint) -> Mat4 {
    match joint.axis {
        Some(axis) => rotate_about_pivot(joint.transform.pivot, axis, joint.transform.angle()),
        None => Mat4::IDENTITY,
    }
}

/// World matrix of the joint at `index`.
///
/// Each step toward the root must land on a strictly smaller index, so a
/// chain that skipped [`validate_chain`] still terminates with an error.
pub fn compose_world_transform(index: usize, joints: &[Joint]) -> Result<Mat4, PoseError> {
    let count = joints.len();
    let mut current = index;
    let mut joint = joints.get(index).ok_or(PoseError::InvalidJointIndex { index, count })?;

    // Walk child -> root, pre-multiplying so the root ends up leftmost.
    let mut world = local_pose(joint);
    while let Some(parent) = joint.parent {
        if parent >= current {
            return Err(PoseError::InvalidParent { index: current, parent });
        }
        joint = joints.get(parent).ok_or(PoseError::InvalidJointIndex { index: parent, count })?;
        current = parent;
        world = local_pose(joint) * world;
    }
    Ok(world)
}

/// World matrices for every joint, reusing each parent's result.
pub fn compose_all(joints: &[Joint]) -> Vec<Mat4> {
    let mut worlds: Vec<Mat4> = Vec::with_capacity(joints.len());
    for joint in joints {
        let parent_world = joint.parent
            .and_then(|parent| worlds.get(parent).copied())
            .unwrap_or(Mat4::IDENTITY);
        worlds.push(parent_world * local_pose(joint));
    }
    worlds
}

/// Applies `delta_degrees` to a joint's hinge angle, clamped to its limit.
/// Fixed joints keep their angle. Returns the resulting angle.
pub fn update_joint(joints: &mut [Joint], index: usize, delta_degrees: f32) -> Result<f32, PoseError> {
    let count = joints.len();
    let joint = joints.get_mut(index).ok_or(PoseError::InvalidJointIndex { index, count })?;
    if joint.is_fixed() {
        return Ok(joint.transform.angle());
    }
    let limit = joint.transform.rotation_limit;
    if !limit.is_valid() {
        return Err(PoseError::InvalidLimit { index, min: limit.min, max: limit.max });
    }
    Ok(joint.transform.rotate_by(delta_degrees))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::engine::components::armature::Armature;
    use crate::engine::components::transform::{ JointTransform, RotationLimit };
    use crate::engine::utils::math::Axis;

    const JOINT_2_PIVOT: Vec3 = Vec3::new(0.0, 1.5, 0.0);

    fn robot_arm() -> Armature {
        Armature::new(
            vec![
                Joint::fixed("base", 0),
                Joint::hinge(
                    "turntable",
                    0,
                    Axis::Y,
                    JointTransform::with_pivot(Vec3::new(0.0, 0.5, 0.0), RotationLimit::new(-90.0, 90.0)),
                    1
                ),
                Joint::hinge(
                    "shoulder",
                    1,
                    Axis::X,
                    JointTransform::with_pivot(JOINT_2_PIVOT, RotationLimit::new(-45.0, 80.0)),
                    2
                ),
                Joint::hinge(
                    "elbow",
                    2,
                    Axis::X,
                    JointTransform::with_pivot(Vec3::new(0.0, 2.7, 0.0), RotationLimit::new(-90.0, 90.0)),
                    3
                )
            ]
        ).unwrap()
    }

    #[test]
    fn root_is_always_identity() {
        let mut arm = robot_arm();
        arm.update_joint(1, 40.0).unwrap();
        arm.update_joint(2, -30.0).unwrap();
        arm.update_joint(3, 75.0).unwrap();
        let root = arm.compose_world_transform(0).unwrap();
        assert!(root.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn zero_angles_compose_to_identity() {
        let arm = robot_arm();
        for k in 1..=3 {
            let world = arm.compose_world_transform(k).unwrap();
            assert!(world.abs_diff_eq(Mat4::IDENTITY, 1e-6), "joint {k} is not identity");
        }
    }

    #[test]
    fn turntable_rotation_leaves_shoulder_pivot_fixed() {
        let mut arm = robot_arm();
        assert_eq!(arm.update_joint(1, 30.0).unwrap(), 30.0);
        let world = arm.compose_world_transform(1).unwrap();
        assert!(world.transform_point3(JOINT_2_PIVOT).abs_diff_eq(JOINT_2_PIVOT, 1e-5));
    }

    #[test]
    fn parent_blocks_are_applied_on_the_left() {
        let mut arm = robot_arm();
        arm.update_joint(1, 30.0).unwrap();
        arm.update_joint(2, 20.0).unwrap();
        arm.update_joint(3, -15.0).unwrap();

        let joints = arm.joints();
        let expected = local_pose(&joints[1]) * local_pose(&joints[2]) * local_pose(&joints[3]);
        let world = arm.compose_world_transform(3).unwrap();
        assert!(world.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn shoulder_moves_the_elbow_pivot_but_not_its_own() {
        let mut arm = robot_arm();
        arm.update_joint(2, 45.0).unwrap();
        let world = arm.compose_world_transform(2).unwrap();

        assert!(world.transform_point3(JOINT_2_PIVOT).abs_diff_eq(JOINT_2_PIVOT, 1e-5));

        // Elbow pivot sits 1.2 above the shoulder; tipping 45 degrees about X swings it toward +Z.
        let elbow = world.transform_point3(Vec3::new(0.0, 2.7, 0.0));
        let offset = 1.2 * std::f32::consts::FRAC_1_SQRT_2;
        assert!(elbow.abs_diff_eq(Vec3::new(0.0, 1.5 + offset, offset), 1e-5));
    }

    #[test]
    fn compose_all_matches_per_joint_composition() {
        let mut arm = robot_arm();
        arm.update_joint(1, -60.0).unwrap();
        arm.update_joint(2, 70.0).unwrap();
        arm.update_joint(3, 33.0).unwrap();

        let all = arm.world_transforms();
        assert_eq!(all.len(), 4);
        for (k, world) in all.iter().enumerate() {
            let single = arm.compose_world_transform(k).unwrap();
            assert!(world.abs_diff_eq(single, 1e-6));
        }
    }

    #[test]
    fn joint_updates_are_clamped() {
        let mut arm = robot_arm();
        assert_eq!(arm.update_joint(1, 1000.0).unwrap(), 90.0);
        assert_eq!(arm.update_joint(1, -1000.0).unwrap(), -90.0);
        assert_eq!(arm.update_joint(2, 1000.0).unwrap(), 80.0);
        assert_eq!(arm.update_joint(2, -1000.0).unwrap(), -45.0);
    }

    #[test]
    fn fixed_root_ignores_updates() {
        let mut arm = robot_arm();
        assert_eq!(arm.update_joint(0, 25.0).unwrap(), 0.0);
        assert_eq!(arm.joint(0).unwrap().transform.angle(), 0.0);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut arm = robot_arm();
        let expected = PoseError::InvalidJointIndex { index: 4, count: 4 };
        assert_eq!(arm.compose_world_transform(4).unwrap_err(), expected);
        assert_eq!(arm.update_joint(4, 1.0).unwrap_err(), expected);
        assert!(arm.joint(17).is_err());
    }

    #[test]
    fn chains_longer_than_four_joints_compose() {
        let mut joints = vec![Joint::fixed("base", 0)];
        for i in 1..8 {
            joints.push(
                Joint::hinge(
                    format!("link{i}"),
                    i - 1,
                    Axis::Z,
                    JointTransform::with_pivot(Vec3::new(i as f32, 0.0, 0.0), RotationLimit::default()),
                    i
                )
            );
        }
        let mut arm = Armature::new(joints).unwrap();
        for i in 1..8 {
            arm.update_joint(i, 10.0).unwrap();
        }
        let tip = arm.compose_world_transform(7).unwrap();
        // Seven 10-degree turns about parallel Z axes add up to 70 degrees.
        let direction = tip.transform_vector3(Vec3::X);
        let expected = Vec3::new((70.0f32).to_radians().cos(), (70.0f32).to_radians().sin(), 0.0);
        assert!(direction.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn construction_validates_the_chain() {
        assert_eq!(Armature::new(Vec::new()).unwrap_err(), PoseError::EmptyArmature);

        let rotating_root = vec![Joint {
            axis: Some(Axis::Y),
            ..Joint::fixed("base", 0)
        }];
        assert_eq!(Armature::new(rotating_root).unwrap_err(), PoseError::RootNotFixed);

        let forward_parent = vec![
            Joint::fixed("base", 0),
            Joint::hinge("a", 2, Axis::X, JointTransform::identity(), 1),
            Joint::hinge("b", 1, Axis::X, JointTransform::identity(), 2)
        ];
        assert_eq!(
            Armature::new(forward_parent).unwrap_err(),
            PoseError::InvalidParent { index: 1, parent: 2 }
        );

        let orphan = vec![Joint::fixed("base", 0), Joint::fixed("loose", 1)];
        assert_eq!(Armature::new(orphan).unwrap_err(), PoseError::MissingParent(1));

        let inverted = vec![
            Joint::fixed("base", 0),
            Joint::hinge(
                "a",
                0,
                Axis::X,
                JointTransform::with_pivot(Vec3::ZERO, RotationLimit::new(10.0, -10.0)),
                1
            )
        ];
        assert_eq!(
            Armature::new(inverted).unwrap_err(),
            PoseError::InvalidLimit { index: 1, min: 10.0, max: -10.0 }
        );
    }

    #[test]
    fn unvalidated_inverted_limit_is_an_error() {
        let mut joints = vec![
            Joint::fixed("base", 0),
            Joint::hinge(
                "a",
                0,
                Axis::X,
                JointTransform::with_pivot(Vec3::ZERO, RotationLimit::new(10.0, -10.0)),
                1
            )
        ];
        assert_eq!(
            update_joint(&mut joints, 1, 5.0).unwrap_err(),
            PoseError::InvalidLimit { index: 1, min: 10.0, max: -10.0 }
        );
        assert_eq!(joints[1].transform.angle(), 0.0);
    }

    #[test]
    fn unvalidated_parent_cycles_are_errors() {
        let self_parent = vec![
            Joint::fixed("base", 0),
            Joint::hinge("a", 1, Axis::X, JointTransform::identity(), 1)
        ];
        assert_eq!(
            compose_world_transform(1, &self_parent).unwrap_err(),
            PoseError::InvalidParent { index: 1, parent: 1 }
        );

        let two_cycle = vec![
            Joint::fixed("base", 0),
            Joint::hinge("a", 2, Axis::X, JointTransform::identity(), 1),
            Joint::hinge("b", 1, Axis::X, JointTransform::identity(), 2)
        ];
        assert_eq!(
            compose_world_transform(2, &two_cycle).unwrap_err(),
            PoseError::InvalidParent { index: 1, parent: 2 }
        );
    }

    #[test]
    fn initial_angles_are_clamped_at_construction() {
        let mut transform = JointTransform::with_pivot(Vec3::ZERO, RotationLimit::new(-20.0, 20.0));
        transform.rotation.z = 55.0;
        let arm = Armature::new(
            vec![Joint::fixed("base", 0), Joint::hinge("a", 0, Axis::X, transform, 1)]
        ).unwrap();
        assert_eq!(arm.joint(1).unwrap().transform.angle(), 20.0);
    }
}
