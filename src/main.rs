use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::{CursorGrabMode, Window, WindowBuilder};

use point_strip::config::DEFAULT_POINT_FILE;
use point_strip::{load_cloud, KeyCode, NamedKey, PointCloud, Renderer, Session, ViewerConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut config = ViewerConfig::default();
    if let Some(scale) = options.scale {
        config = config.with_position_scale(scale);
    }

    let cloud = load_cloud(&options.path);
    let vertices = cloud.to_floats(config.position_scale);

    if options.summary_only {
        print_summary(&options.path, &cloud, &vertices);
        return Ok(());
    }

    run_interactive(config, &vertices)
}

fn print_summary(path: &str, cloud: &PointCloud, vertices: &[f32]) {
    println!(
        "Loaded {} point(s) from {path} ({} line(s) skipped)",
        cloud.len(),
        cloud.rejected.len()
    );
    if let Some((min, max)) = cloud.bounds() {
        println!(
            "Bounds: min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!("Vertex buffer: {} floats", vertices.len());
}

fn run_interactive(config: ViewerConfig, vertices: &[f32]) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );
    capture_cursor(&window);

    let renderer = block_on(Renderer::new(Arc::clone(&window), vertices, &config))
        .context("failed to initialize renderer")?;
    let mut session = Session::new(config);
    let size = renderer.size();
    session.resize(size.width, size.height);

    let mut app = AppState {
        renderer,
        session,
        cursor: Vec2::ZERO,
        focused: true,
        last_error: None,
    };

    event_loop
        .run_on_demand(|event, target| {
            target.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, target) {
                app.last_error = Some(err);
                target.exit();
            }
        })
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("unable to capture cursor: {err}");
    }
    window.set_cursor_visible(false);
}

struct AppState {
    renderer: Renderer,
    session: Session,
    /// Virtual cursor built from raw mouse motion, unbounded by the window edges.
    cursor: Vec2,
    focused: bool,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(
        &mut self,
        event: &Event<()>,
        target: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.session.resize(size.width, size.height);
                    }
                    WindowEvent::Focused(focused) => {
                        self.focused = *focused;
                        if !focused {
                            self.session.release_input();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event),
                    WindowEvent::RedrawRequested => self.redraw(target)?,
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } if self.focused => {
                self.cursor += Vec2::new(delta.0 as f32, delta.1 as f32);
                self.session.handle_cursor(self.cursor);
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self, target: &EventLoopWindowTarget<()>) -> Result<()> {
        if !self.session.tick() {
            target.exit();
            return Ok(());
        }
        self.renderer.update_transforms(&self.session.frame_uniforms());
        match self.renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(err) => {
                info!("Surface unavailable ({err}); retrying next frame");
            }
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        self.session
            .handle_key(key, event.state == ElementState::Pressed);
    }
}

fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::KeyE => KeyCode::Character('E'),
        WinitKey::KeyQ => KeyCode::Character('Q'),
        _ => return None,
    })
}

struct CliOptions {
    path: String,
    scale: Option<f32>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::from_args(env::args().skip(1))
    }

    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        const USAGE: &str = "Usage: point-strip [POINTS_FILE] [--scale <factor>] [--summary-only]";
        let mut path = None;
        let mut scale = None;
        let mut summary_only = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "--scale" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--scale expects a value. {USAGE}"))?;
                    let value = value
                        .parse::<f32>()
                        .with_context(|| format!("invalid --scale value {value}"))?;
                    if !value.is_finite() {
                        return Err(anyhow!("--scale must be finite, got {value}"));
                    }
                    scale = Some(value);
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                other => {
                    if path.replace(other.to_string()).is_some() {
                        return Err(anyhow!("Only one points file may be given. {USAGE}"));
                    }
                }
            }
        }
        Ok(Self {
            path: path.unwrap_or_else(|| DEFAULT_POINT_FILE.to_string()),
            scale,
            summary_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::from_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_bundled_point_file() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.path, DEFAULT_POINT_FILE);
        assert_eq!(options.scale, None);
        assert!(!options.summary_only);
    }

    #[test]
    fn parses_scale_and_summary_flag() {
        let options = parse(&["cloud.txt", "--scale", "-0.5", "--summary-only"]).unwrap();
        assert_eq!(options.path, "cloud.txt");
        assert_eq!(options.scale, Some(-0.5));
        assert!(options.summary_only);
    }

    #[test]
    fn rejects_unknown_flags_and_bad_scale() {
        assert!(parse(&["--fullscreen"]).is_err());
        assert!(parse(&["--scale"]).is_err());
        assert!(parse(&["--scale", "wide"]).is_err());
        assert!(parse(&["a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn maps_bound_keys_only() {
        assert_eq!(map_keycode(WinitKey::KeyQ), Some(KeyCode::Character('Q')));
        assert_eq!(
            map_keycode(WinitKey::Escape),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        assert_eq!(map_keycode(WinitKey::KeyZ), None);
    }
}
