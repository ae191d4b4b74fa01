use glam::{ Mat4, Vec3 };

use crate::engine::config::CameraConfig;
use crate::engine::utils::input_utils::pointer_delta_to_angles;
use crate::engine::utils::math::perspective;

pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by yaw/pitch in degrees.
#[derive(Debug, Clone)]
pub struct FreeLookCamera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    speed: f32,
    sensitivity: f32,
    fov_degrees: f32,
    near: f32,
    far: f32,
    last_pointer: Option<(f64, f64)>,
}

impl FreeLookCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            speed: config.speed,
            sensitivity: config.sensitivity,
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            last_pointer: None,
        };
        camera.update_vectors();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Feeds an absolute pointer position. The first sample after
    /// activation only records the baseline.
    pub fn process_pointer(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.last_pointer.replace((x, y)) else {
            return;
        };
        self.process_pointer_delta(x - last_x, y - last_y);
    }

    /// Applies a pointer delta in pixels (screen y grows downward).
    pub fn process_pointer_delta(&mut self, delta_x: f64, delta_y: f64) {
        let (yaw_delta, pitch_delta) = pointer_delta_to_angles(delta_x, delta_y, self.sensitivity);
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Forgets the pointer baseline so the next sample cannot cause a jump.
    pub fn reset_pointer_baseline(&mut self) {
        self.last_pointer = None;
    }

    pub fn process_movement(&mut self, direction: CameraMovement, frame_time: f32) {
        let velocity = self.speed * frame_time;
        match direction {
            CameraMovement::Forward => {
                self.position += self.front * velocity;
            }
            CameraMovement::Backward => {
                self.position -= self.front * velocity;
            }
            CameraMovement::Left => {
                self.position -= self.right * velocity;
            }
            CameraMovement::Right => {
                self.position += self.right * velocity;
            }
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        perspective(self.fov_degrees, width, height, self.near, self.far)
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FreeLookCamera {
        FreeLookCamera::new(&CameraConfig::default())
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = camera();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-5));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn first_pointer_sample_sets_the_baseline_only() {
        let mut camera = camera();
        let (yaw, pitch) = (camera.yaw(), camera.pitch());
        camera.process_pointer(640.0, 20.0);
        assert_eq!(camera.yaw(), yaw);
        assert_eq!(camera.pitch(), pitch);

        camera.process_pointer(650.0, 20.0);
        assert!(camera.yaw() > yaw);
    }

    #[test]
    fn reset_baseline_swallows_the_next_sample() {
        let mut camera = camera();
        camera.process_pointer(0.0, 0.0);
        camera.process_pointer(5.0, 5.0);
        let (yaw, pitch) = (camera.yaw(), camera.pitch());

        camera.reset_pointer_baseline();
        camera.process_pointer(900.0, -700.0);
        assert_eq!(camera.yaw(), yaw);
        assert_eq!(camera.pitch(), pitch);
    }

    #[test]
    fn refocus_resumes_from_the_returning_cursor() {
        let mut camera = camera();
        camera.process_pointer(100.0, 100.0);
        let yaw = camera.yaw();

        // Focus lost, cursor wanders off, focus regained at x = 900.
        camera.reset_pointer_baseline();
        camera.process_pointer(900.0, 100.0);
        assert_eq!(camera.yaw(), yaw);

        camera.process_pointer(910.0, 100.0);
        let step = 10.0 * CameraConfig::default().sensitivity;
        assert!((camera.yaw() - (yaw + step)).abs() < 1e-4);
    }

    #[test]
    fn pitch_saturates_at_both_poles() {
        let mut camera = camera();
        let mut y = 0.0;
        camera.process_pointer(0.0, y);
        for _ in 0..500 {
            y -= 25.0;
            camera.process_pointer(0.0, y);
            assert!(camera.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), 89.0);

        for _ in 0..1000 {
            y += 25.0;
            camera.process_pointer(0.0, y);
            assert!(camera.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn forward_movement_follows_front() {
        let mut camera = camera();
        let start = camera.position;
        let speed = CameraConfig::default().speed;
        camera.process_movement(CameraMovement::Forward, 1.0);
        assert!((camera.position - start).abs_diff_eq(camera.front() * speed, 1e-5));

        camera.process_movement(CameraMovement::Backward, 1.0);
        assert!(camera.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn right_is_horizontal_and_orthogonal_to_front() {
        let mut camera = camera();
        camera.process_pointer(0.0, 0.0);
        camera.process_pointer(137.0, -91.0);
        assert!(camera.right().dot(camera.front()).abs() < 1e-5);
        assert!(camera.right().y.abs() < 1e-5);

        let start = camera.position;
        camera.process_movement(CameraMovement::Right, 0.5);
        camera.process_movement(CameraMovement::Left, 0.5);
        assert!(camera.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn view_matrix_maps_the_eye_to_the_origin() {
        let camera = camera();
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
