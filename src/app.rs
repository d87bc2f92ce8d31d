use std::time::{Duration, Instant};

use glam::{Mat4, Vec2};
use log::debug;

use crate::camera::{FlyCamera, MouseLook};
use crate::config::ViewerConfig;
use crate::input::{InputState, KeyCode};

/// Measures the time between consecutive frames.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the time since the previous tick; zero on the first tick.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);
        elapsed
    }
}

/// Transforms uploaded to the shader for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Everything that changes between frames, owned in one place.
#[derive(Debug)]
pub struct Session {
    config: ViewerConfig,
    camera: FlyCamera,
    mouse: MouseLook,
    input: InputState,
    clock: FrameClock,
    viewport: (u32, u32),
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        let viewport = (config.width.max(1), config.height.max(1));
        Self {
            config,
            camera: FlyCamera::default(),
            mouse: MouseLook::new(),
            input: InputState::new(),
            clock: FrameClock::new(),
            viewport,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        self.input.set_key(key, pressed);
    }

    /// Feeds an absolute cursor position and turns the camera accordingly.
    pub fn handle_cursor(&mut self, position: Vec2) {
        let delta = self.mouse.sample(position);
        self.camera
            .apply_mouse_delta(delta.x, delta.y, self.config.mouse_sensitivity);
    }

    /// Drops held keys and the mouse seed, e.g. after the window lost focus.
    pub fn release_input(&mut self) {
        self.input.clear();
        self.mouse.reset();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        debug!("Viewport resized to {}x{}", self.viewport.0, self.viewport.1);
    }

    /// Advances one frame using the wall clock. Returns `false` once exit was requested.
    pub fn tick(&mut self) -> bool {
        let elapsed = self.clock.tick();
        self.update(elapsed)
    }

    /// Applies held movement keys for `elapsed` time. Returns `false` once exit was requested.
    pub fn update(&mut self, elapsed: Duration) -> bool {
        let speed = self.config.movement_speed * elapsed.as_secs_f32();
        for movement in self.input.held_movements() {
            self.camera.apply_movement(movement, speed);
        }
        !self.input.exit_requested()
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            model: Mat4::IDENTITY,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(self.aspect(), &self.config),
        }
    }
}
