use bytemuck::{Pod, Zeroable};

use crate::app::FrameUniforms;

/// Bytes per interleaved vertex: `position.xyz` followed by `color.rgb`.
pub(crate) const VERTEX_STRIDE: u64 = (6 * std::mem::size_of::<f32>()) as u64;

/// Uniform buffer layout matching `Transforms` in the WGSL shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl From<&FrameUniforms> for TransformUniform {
    fn from(frame: &FrameUniforms) -> Self {
        Self {
            model: frame.model.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn uniform_is_three_column_major_matrices() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 3 * 64);
        let frame = FrameUniforms {
            model: Mat4::IDENTITY,
            view: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)),
            projection: Mat4::IDENTITY,
        };
        let uniform = TransformUniform::from(&frame);
        assert_eq!(uniform.view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 192);
    }
}
