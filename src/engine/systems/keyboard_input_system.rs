use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::engine::components::camera::CameraMovement;
use crate::engine::utils::input_utils::axis_value;

/// Keys the viewer itself handles; joint bindings may not use them.
pub const RESERVED_KEYS: [KeyCode; 7] = [
    KeyCode::Escape,
    KeyCode::Tab,
    KeyCode::KeyP,
    KeyCode::KeyW,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
];

/// What the application loop should do in response to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Exit,
    ToggleCapture,
    TogglePivots,
}

/// Tracks held keys between frames. Keys with an immediate effect (exit,
/// capture, overlay) are reported as [`InputAction`]s and never held.
#[derive(Debug, Default)]
pub struct KeyboardInputSystem {
    pressed_keys: HashSet<KeyCode>,
}

impl KeyboardInputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive_key(&mut self, key_code: KeyCode, state: ElementState, repeat: bool) -> InputAction {
        match state {
            ElementState::Pressed => {
                match key_code {
                    KeyCode::Escape => InputAction::Exit,
                    KeyCode::Tab if !repeat => InputAction::ToggleCapture,
                    KeyCode::KeyP if !repeat => InputAction::TogglePivots,
                    KeyCode::Tab | KeyCode::KeyP => InputAction::None,
                    _ => {
                        if self.pressed_keys.insert(key_code) {
                            log::trace!("Key pressed: {:?}", key_code);
                        }
                        InputAction::None
                    }
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&key_code) {
                    log::trace!("Key released: {:?}", key_code);
                }
                InputAction::None
            }
        }
    }

    pub fn is_pressed(&self, key_code: KeyCode) -> bool {
        self.pressed_keys.contains(&key_code)
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    /// Camera movements for the held WASD keys; opposing keys cancel.
    pub fn movement_directions(&self) -> Vec<CameraMovement> {
        let mut directions = Vec::new();
        match axis_value(self.is_pressed(KeyCode::KeyW), self.is_pressed(KeyCode::KeyS)) {
            v if v > 0.0 => directions.push(CameraMovement::Forward),
            v if v < 0.0 => directions.push(CameraMovement::Backward),
            _ => {}
        }
        match axis_value(self.is_pressed(KeyCode::KeyD), self.is_pressed(KeyCode::KeyA)) {
            v if v > 0.0 => directions.push(CameraMovement::Right),
            v if v < 0.0 => directions.push(CameraMovement::Left),
            _ => {}
        }
        directions
    }

    /// -1, 0 or 1 for a joint's increase/decrease key pair.
    pub fn joint_direction(&self, increase: Option<KeyCode>, decrease: Option<KeyCode>) -> f32 {
        let held = |key: Option<KeyCode>| key.is_some_and(|k| self.is_pressed(k));
        axis_value(held(increase), held(decrease))
    }
}
