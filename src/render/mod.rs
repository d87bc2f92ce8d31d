mod common;
mod renderer;
mod shader;

pub use common::TransformUniform;
pub use renderer::Renderer;
