//! Orbit camera controls.
//!
//! The camera circles `target` on a sphere. Input accumulates into pending
//! deltas; `update` moves the camera toward them, either all at once or, with
//! damping on, by `damping_factor` of the remainder each frame so motion
//! eases out instead of stopping dead.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::camera::Camera;

const POLAR_EPSILON: f32 = 1e-6;
const MOVE_EPSILON: f32 = 1e-6;

/// Spherical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update, in (0, 1]
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    min_distance: f32,
    max_distance: f32,
    spherical: Spherical,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    /// Controls orbiting the camera's current target from its current position
    pub fn new(camera: &Camera, enable_damping: bool, damping_factor: f32) -> Self {
        Self {
            target: camera.target,
            enable_damping,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical: Spherical::from_offset(camera.position - camera.target),
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Current orientation of the camera around the target
    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    /// Closest and farthest the camera may get from the target
    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    /// Bound the orbit radius; inverted bounds are swapped and NaN bounds
    /// fall back to 0 and unbounded
    pub fn set_distance_limits(&mut self, min: f32, max: f32) {
        let min = if min.is_nan() { 0.0 } else { min.max(0.0) };
        let max = if max.is_nan() { f32::INFINITY } else { max.max(0.0) };
        (self.min_distance, self.max_distance) = if min <= max { (min, max) } else { (max, min) };
    }

    /// Pending rotation not yet applied to the camera
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.spherical_delta.theta, self.spherical_delta.phi)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    pub fn pan(&mut self, offset: Vec3) {
        self.pan_offset += offset;
    }

    pub fn dolly_in(&mut self, scale: f32) {
        self.scale /= scale;
    }

    pub fn dolly_out(&mut self, scale: f32) {
        self.scale *= scale;
    }

    /// Pointer drag: a drag across the full viewport height turns a full circle
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        self.rotate_left(TAU * dx / height * self.rotate_speed);
        self.rotate_up(TAU * dy / height * self.rotate_speed);
    }

    /// Pointer drag panning in the camera plane, scaled so the target tracks the pointer
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32, camera: &Camera) {
        let height = viewport_height.max(1) as f32;
        let distance = (camera.position - self.target).length() * (camera.fov.to_radians() * 0.5).tan();
        let world_per_pixel = 2.0 * distance / height * self.pan_speed;

        let right = camera.right();
        let up = right.cross(camera.forward()).normalize_or_zero();
        self.pan(right * (-dx * world_per_pixel) + up * (dy * world_per_pixel));
    }

    /// Mouse wheel: positive lines zoom in
    pub fn zoom_by_wheel(&mut self, lines: f32) {
        if lines == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(self.zoom_speed * lines.abs());
        if lines > 0.0 {
            self.dolly_in(1.0 / step);
        } else {
            self.dolly_out(1.0 / step);
        }
    }

    /// Advance one frame and write the result into the camera; returns whether it moved
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let previous_position = camera.position;
        let previous_target = self.target;

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        self.spherical.theta += self.spherical_delta.theta * factor;
        self.spherical.phi += self.spherical_delta.phi * factor;
        self.spherical.phi = self.spherical.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.spherical.radius = (self.spherical.radius * self.scale)
            .max(self.min_distance)
            .min(self.max_distance);
        self.target += self.pan_offset * factor;

        camera.target = self.target;
        camera.position = self.target + self.spherical.to_offset();

        if self.enable_damping {
            let remaining = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= remaining;
            self.spherical_delta.phi *= remaining;
            self.pan_offset *= remaining;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(previous_position) > MOVE_EPSILON
            || self.target.distance_squared(previous_target) > MOVE_EPSILON
    }
}
