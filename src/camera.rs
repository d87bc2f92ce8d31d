use glam::{Mat4, Vec2, Vec3};

use crate::config::ViewerConfig;

/// Pitch limit in degrees; looking straight up or down would flip the basis.
pub const PITCH_LIMIT: f32 = 89.0;

/// Direction of a single keyboard driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Forward,
        Movement::Backward,
        Movement::Left,
        Movement::Right,
        Movement::Up,
        Movement::Down,
    ];
}

/// Free-fly camera driven by yaw/pitch angles in degrees.
///
/// `front` is derived from the angles and kept unit length; `up` is the
/// fixed world up, so the camera never rolls. Yaw is left unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    up: Vec3,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), -90.0, 0.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self {
            position,
            yaw,
            pitch,
            front: front_from_angles(yaw, pitch),
            up: Vec3::Y,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
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

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Turns the camera. `dy` must already be flipped so that positive looks up.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch + dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.front = front_from_angles(self.yaw, self.pitch);
    }

    /// Moves the camera by `speed` world units along `direction`.
    pub fn apply_movement(&mut self, direction: Movement, speed: f32) {
        let right = self.front.cross(self.up).normalize();
        self.position += match direction {
            Movement::Forward => self.front * speed,
            Movement::Backward => -self.front * speed,
            Movement::Left => -right * speed,
            Movement::Right => right * speed,
            Movement::Up => self.up * speed,
            Movement::Down => -self.up * speed,
        };
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, config: &ViewerConfig) -> Mat4 {
        Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            aspect.max(0.01),
            config.near,
            config.far,
        )
    }
}

fn front_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

/// Turns absolute cursor positions into frame-to-frame deltas.
///
/// The first sample only seeds the previous position, so wherever the cursor
/// starts the camera does not jump.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseLook {
    last: Option<Vec2>,
}

impl MouseLook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(dx, dy)` with `dy` positive when the cursor moved up.
    pub fn sample(&mut self, position: Vec2) -> Vec2 {
        let last = self.last.replace(position).unwrap_or(position);
        Vec2::new(position.x - last.x, last.y - position.y)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
