pub mod keyboard_input_system;
pub mod pose_system;

pub use keyboard_input_system::{ InputAction, KeyboardInputSystem };
pub use pose_system::{ compose_world_transform, update_joint, PoseError };
