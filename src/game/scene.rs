use winit::keyboard::KeyCode;

use crate::engine::components::armature::Armature;
use crate::engine::components::camera::FreeLookCamera;
use crate::engine::config::SceneConfig;
use crate::engine::error::EngineResult;
use crate::engine::systems::keyboard_input_system::KeyboardInputSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointBinding {
    pub joint: usize,
    pub increase: Option<KeyCode>,
    pub decrease: Option<KeyCode>,
}

/// All mutable per-frame state: the camera and the articulated model.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: FreeLookCamera,
    pub armature: Armature,
    pub bindings: Vec<JointBinding>,
    pub joint_speed: f32,
    pub show_pivots: bool,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> EngineResult<Self> {
        let armature = config.build_armature()?;
        let bindings = config.joints
            .iter()
            .enumerate()
            .filter(|(_, joint)| joint.increase_key.is_some() || joint.decrease_key.is_some())
            .map(|(joint, cfg)| JointBinding {
                joint,
                increase: cfg.increase_key,
                decrease: cfg.decrease_key,
            })
            .collect();

        Ok(Self {
            camera: FreeLookCamera::new(&config.camera),
            armature,
            bindings,
            joint_speed: config.joint_speed,
            show_pivots: config.show_pivots,
        })
    }

    /// Input step: moves the camera and turns every bound joint, clamped to
    /// its limit, by `joint_speed * frame_time` degrees.
    pub fn update(&mut self, input: &KeyboardInputSystem, frame_time: f32) -> EngineResult<()> {
        for direction in input.movement_directions() {
            self.camera.process_movement(direction, frame_time);
        }

        for binding in &self.bindings {
            let direction = input.joint_direction(binding.increase, binding.decrease);
            if direction != 0.0 {
                let angle = self.armature.update_joint(
                    binding.joint,
                    direction * self.joint_speed * frame_time
                )?;
                log::trace!("Joint {} angle {:.1}", binding.joint, angle);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use winit::event::ElementState;

    use super::*;

    #[test]
    fn default_scene_binds_three_joints() {
        let scene = Scene::new(&SceneConfig::default()).unwrap();
        let bound: Vec<usize> = scene.bindings.iter().map(|b| b.joint).collect();
        assert_eq!(bound, vec![1, 2, 3]);
    }

    #[test]
    fn held_joint_key_turns_joint_at_joint_speed() {
        let mut scene = Scene::new(&SceneConfig::default()).unwrap();
        let mut input = KeyboardInputSystem::new();
        input.receive_key(KeyCode::Digit1, ElementState::Pressed, false);

        scene.update(&input, 0.5).unwrap();
        let angle = scene.armature.joint(1).unwrap().transform.angle();
        assert!((angle - 30.0).abs() < 1e-4);
    }

    #[test]
    fn long_frames_never_escape_the_limit() {
        let mut scene = Scene::new(&SceneConfig::default()).unwrap();
        let mut input = KeyboardInputSystem::new();
        input.receive_key(KeyCode::Digit3, ElementState::Pressed, false);
        input.receive_key(KeyCode::Digit6, ElementState::Pressed, false);

        for _ in 0..20 {
            scene.update(&input, 1.0).unwrap();
            let shoulder = scene.armature.joint(2).unwrap().transform.angle();
            let elbow = scene.armature.joint(3).unwrap().transform.angle();
            assert!(shoulder <= 80.0);
            assert!(elbow >= -90.0);
        }
        assert_eq!(scene.armature.joint(2).unwrap().transform.angle(), 80.0);
        assert_eq!(scene.armature.joint(3).unwrap().transform.angle(), -90.0);
    }

    #[test]
    fn movement_keys_move_the_camera() {
        let mut scene = Scene::new(&SceneConfig::default()).unwrap();
        let mut input = KeyboardInputSystem::new();
        let start = scene.camera.position;
        input.receive_key(KeyCode::KeyW, ElementState::Pressed, false);
        scene.update(&input, 0.1).unwrap();
        assert!(scene.camera.position.z < start.z);
    }
}
