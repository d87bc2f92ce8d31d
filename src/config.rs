use glam::Vec3;

/// Point file opened when no path is given on the command line.
pub const DEFAULT_POINT_FILE: &str = "spiralpunkter2.txt";

/// Tunables for the viewer window, camera and point upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Uniform factor applied to point positions before upload.
    pub position_scale: f32,
    /// Camera speed in world units per second.
    pub movement_speed: f32,
    /// Degrees of rotation per pixel of mouse travel.
    pub mouse_sensitivity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: Vec3,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Point Strip".to_string(),
            width: 800,
            height: 600,
            position_scale: 1.0 / 9.9,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            clear_color: Vec3::new(0.2, 0.3, 0.3),
        }
    }
}

impl ViewerConfig {
    pub fn with_position_scale(mut self, scale: f32) -> Self {
        self.position_scale = scale;
        self
    }
}
