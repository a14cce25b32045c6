//! Instance transformation data for GPU rendering.
//!
//! Per-instance placement (position, rotation, scale) is packed into a vertex
//! buffer stepped per instance, so every cube or marker is one entry in a
//! single buffer rather than its own draw.

use cgmath::{Matrix, One, SquareMatrix};

use crate::data_structures::model;

/// Per-instance transformation: position, rotation (as quaternion), and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
    /// Vertical offset added to the emission map's texture coordinates.
    pub emission_scroll: f32,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
            emission_scroll: 0.0,
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Inverse transpose of the upper 3x3 of the model matrix, so normals stay
    /// perpendicular under non-uniform scale.
    pub fn normal_matrix(&self) -> cgmath::Matrix3<f32> {
        let m = self.to_matrix();
        let upper = cgmath::Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        upper
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(cgmath::Matrix3::identity)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: self.normal_matrix().into(),
            emission_scroll: self.emission_scroll,
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    emission_scroll: f32,
}

/**
 * Stride layout: the model matrix as four vec4 columns (locations 5-8),
 * the normal matrix as three vec3 columns (locations 9-11), then the
 * emission scroll (location 12).
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Shaders only advance to the next entry when a new instance starts
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let instance = Instance {
            scale: Vector3::new(2.0, 1.0, 1.0),
            ..Default::default()
        };
        let n = instance.normal_matrix() * Vector3::new(1.0, 1.0, 0.0);
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn emission_scroll_follows_the_matrices() {
        let raw = Instance {
            emission_scroll: 0.75,
            ..Default::default()
        }
        .to_raw();
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 26 * 4);
        assert_eq!(bytemuck::cast::<InstanceRaw, [f32; 26]>(raw)[25], 0.75);
    }

    #[test]
    fn rotation_only_normal_matrix_is_the_rotation() {
        use cgmath::Rotation3;
        let rotation = cgmath::Quaternion::from_angle_y(cgmath::Deg(90.0));
        let instance = Instance {
            rotation,
            ..Default::default()
        };
        let n = instance.normal_matrix() * Vector3::unit_x();
        let expected = rotation * Vector3::unit_x();
        assert!((n - expected).magnitude() < 1e-5);
    }
}
