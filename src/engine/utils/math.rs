use glam::{ Mat4, Vec3 };
use serde::{ Deserialize, Serialize };

/// Hinge axis of a rotating joint, in model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Rotation about a point: `T(pivot) * R(axis, degrees) * T(-pivot)`.
pub fn rotate_about_pivot(pivot: Vec3, axis: Axis, degrees: f32) -> Mat4 {
    Mat4::from_translation(pivot) *
        Mat4::from_axis_angle(axis.unit(), degrees.to_radians()) *
        Mat4::from_translation(-pivot)
}

/// Right-handed GL perspective. A zero-height viewport uses aspect 1.
pub fn perspective(fov_y_degrees: f32, width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let aspect_ratio = if height == 0 { 1.0 } else { (width as f32) / (height as f32) };
    Mat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect_ratio, near, far)
}

// Uniform scale + translate, used for gizmos
pub fn scale_translate(scale: f32, position: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), glam::Quat::IDENTITY, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rotation_about_pivot_is_identity() {
        let m = rotate_about_pivot(Vec3::new(1.0, 2.0, 3.0), Axis::X, 0.0);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn pivot_is_a_fixed_point() {
        let pivot = Vec3::new(0.5, 1.0, -2.0);
        let m = rotate_about_pivot(pivot, Axis::Z, 73.0);
        assert!(m.transform_point3(pivot).abs_diff_eq(pivot, 1e-5));
    }

    #[test]
    fn quarter_turn_about_y_maps_x_to_minus_z() {
        let m = rotate_about_pivot(Vec3::ZERO, Axis::Y, 90.0);
        let p = m.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn perspective_handles_zero_height() {
        let m = perspective(60.0, 800, 0, 0.1, 100.0);
        assert!(m.is_finite());
    }
}
