//! Circular orbit with a bobbing height, used to move the ghost lights.

use cgmath::Vector3;

/// Frequency factors of the three sinusoids multiplied into the bobbing height
pub const DEFAULT_BOB_FREQUENCIES: [f64; 3] = [1.0, 2.34, 3.45];

/// Time-parameterised path around the vertical axis through the origin
///
/// With phase `p = speed * t + phase_offset` the position is
/// `(cos(p) * radius, bob(p), sin(p) * radius)`, where `bob` is the product of
/// three sines and therefore stays within `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPath {
    pub radius: f32,
    /// Signed angular speed multiplier; negative values reverse direction
    pub speed: f64,
    pub phase_offset: f64,
    pub bob_frequencies: [f64; 3],
}

impl OrbitPath {
    pub fn new(radius: f32, speed: f64) -> Self {
        Self {
            radius,
            speed,
            phase_offset: 0.0,
            bob_frequencies: DEFAULT_BOB_FREQUENCIES,
        }
    }

    pub fn with_phase_offset(mut self, phase_offset: f64) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Angle travelled after `elapsed` seconds
    pub fn phase(&self, elapsed: f64) -> f64 {
        self.speed * elapsed + self.phase_offset
    }

    /// Bobbing height for a given phase
    pub fn bob(&self, phase: f64) -> f64 {
        self.bob_frequencies
            .iter()
            .map(|frequency| (phase * frequency).sin())
            .product()
    }

    /// Position after `elapsed` seconds
    ///
    /// Trigonometry runs in `f64` so long sessions keep a precise phase.
    pub fn position_at(&self, elapsed: f64) -> Vector3<f32> {
        let phase = self.phase(elapsed);
        let radius = self.radius as f64;
        Vector3::new(
            (phase.cos() * radius) as f32,
            self.bob(phase) as f32,
            (phase.sin() * radius) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn sample_times() -> impl Iterator<Item = f64> {
        (0..500).map(|i| i as f64 * 0.173)
    }

    #[test]
    fn test_horizontal_path_is_circular() {
        for (radius, speed) in [(4.0, 1.0), (5.0, -0.38), (6.0, 1.3), (0.5, 17.0)] {
            let path = OrbitPath::new(radius, speed);
            for t in sample_times() {
                let p = path.position_at(t);
                let r2 = p.x * p.x + p.z * p.z;
                assert_abs_diff_eq!(r2, radius * radius, epsilon = 1e-3 * radius * radius);
            }
        }
    }

    #[test]
    fn test_bob_is_bounded_and_zero_at_start() {
        let path = OrbitPath::new(4.0, 1.3);
        assert_eq!(path.position_at(0.0).y, 0.0);
        for t in sample_times() {
            let y = path.position_at(t).y;
            assert!((-1.0..=1.0).contains(&y), "y = {y} at t = {t}");
        }
    }

    #[test]
    fn test_negative_speed_mirrors_direction() {
        let forward = OrbitPath::new(5.0, 0.38);
        let backward = OrbitPath::new(5.0, -0.38);
        for t in sample_times() {
            let a = forward.position_at(t);
            let b = backward.position_at(t);
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
            assert_abs_diff_eq!(a.z, -b.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_half_turn_lands_opposite() {
        let path = OrbitPath::new(4.0, 1.0);
        let p = path.position_at(PI);
        assert_abs_diff_eq!(p.x, -4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bob_uses_reference_multipliers() {
        let path = OrbitPath::new(1.0, 1.0);
        let phase: f64 = 0.7;
        let expected = phase.sin() * (phase * 2.34).sin() * (phase * 3.45).sin();
        assert_abs_diff_eq!(path.bob(phase), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_phase_offset_shifts_start() {
        let path = OrbitPath::new(2.0, 1.0).with_phase_offset(PI / 2.0);
        let p = path.position_at(0.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 2.0, epsilon = 1e-6);
    }
}
