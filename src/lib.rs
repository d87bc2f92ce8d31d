//! Building blocks for a small point-cloud viewer.
//!
//! Points are read from a line oriented text file, flattened into an
//! interleaved position/color buffer and drawn as a single line strip. The
//! camera, input and session state are plain data so they can be driven and
//! tested without a window; only [`render`] touches the GPU.

pub mod app;
pub mod camera;
pub mod config;
pub mod input;
pub mod points;
pub mod render;

pub use app::{FrameClock, FrameUniforms, Session};
pub use camera::{FlyCamera, MouseLook, Movement};
pub use config::ViewerConfig;
pub use input::{InputState, KeyCode, NamedKey};
pub use points::{
    convert_points_to_floats, load_cloud, load_points, parse_points, try_load_points, Point,
    PointCloud, PointFileError, RejectedLine,
};
pub use render::Renderer;
