/// Collapses a pair of opposing held keys into -1, 0 or 1.
pub fn axis_value(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Converts a pointer delta in pixels into `(yaw_delta, pitch_delta)` degrees.
/// Screen y grows downward, so moving the pointer up looks up.
pub fn pointer_delta_to_angles(delta_x: f64, delta_y: f64, sensitivity: f32) -> (f32, f32) {
    let yaw_delta = (delta_x as f32) * sensitivity;
    let pitch_delta = (-delta_y as f32) * sensitivity;
    (yaw_delta, pitch_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        assert_eq!(axis_value(true, true), 0.0);
        assert_eq!(axis_value(false, false), 0.0);
        assert_eq!(axis_value(true, false), 1.0);
        assert_eq!(axis_value(false, true), -1.0);
    }

    #[test]
    fn upward_pointer_motion_raises_pitch() {
        let (yaw, pitch) = pointer_delta_to_angles(10.0, -20.0, 0.1);
        assert!((yaw - 1.0).abs() < 1e-6);
        assert!((pitch - 2.0).abs() < 1e-6);
    }
}
