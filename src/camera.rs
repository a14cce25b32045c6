//! Free-fly camera, perspective projection and the keyboard/mouse controller.
//!
//! The camera is stored as a position plus yaw/pitch angles; its field of view
//! (`zoom`) is changed with the scroll wheel.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::pipelines::basic::uniform_layout;

/// Converts OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_PITCH: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    /// Vertical field of view in degrees.
    zoom: f32,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
            zoom: MAX_ZOOM,
        }
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front().cross(Vector3::unit_y()).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.front(), Vector3::unit_y())
    }

    /// Turns by the given degrees. Pitch stays within ±89° so the view never flips.
    pub fn rotate(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        self.yaw += Rad(yaw_degrees.to_radians());
        let pitch = self.pitch.0.to_degrees() + pitch_degrees;
        self.pitch = Rad(pitch.clamp(-SAFE_PITCH, SAFE_PITCH).to_radians());
    }

    /// Narrows the field of view by `amount` degrees, within [1°, 45°].
    pub fn zoom_by(&mut self, amount: f32) {
        self.zoom = (self.zoom - amount).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self, fovy_degrees: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * perspective(cgmath::Deg(fovy_degrees), self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates input between frames and applies it in [`update`](Self::update).
#[derive(Debug)]
pub struct CameraController {
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// `speed` in units per second, `sensitivity` in degrees per pixel.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Returns whether the key moved the camera.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed {
            1.0
        } else {
            0.0
        };
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.amount_forward = amount;
                true
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.amount_backward = amount;
                true
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.amount_left = amount;
                true
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.amount_right = amount;
                true
            }
            _ => false,
        }
    }

    /// Raw mouse motion in pixels; positive `dy` is downwards.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
        };
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.process_keyboard(*key, *state),
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_scroll(delta);
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let front = camera.front();
        let right = camera.right();
        camera.position += front * (self.amount_forward - self.amount_backward) * self.speed * dt;
        camera.position += right * (self.amount_right - self.amount_left) * self.speed * dt;

        // Screen y grows downwards, so moving the mouse up pitches up.
        camera.rotate(
            self.rotate_horizontal * self.sensitivity,
            -self.rotate_vertical * self.sensitivity,
        );
        camera.zoom_by(self.scroll);

        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix(camera.zoom()) * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The camera together with its uniform buffer and bind group (group 1 in the
/// lighting shader, group 0 in the marker shader).
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        controller: CameraController,
        projection: &Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = uniform_layout(device, "camera_bind_group_layout");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Applies pending input and uploads the new view-projection.
    pub fn update(&mut self, queue: &wgpu::Queue, projection: &Projection, dt: Duration) {
        self.controller.update(&mut self.camera, dt);
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    fn camera() -> Camera {
        Camera::new((0.0, 0.0, 3.0), Deg(-90.0), Deg(0.0))
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let front = camera().front();
        assert!((front - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
        assert!((camera().right() - Vector3::unit_x()).magnitude() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.rotate(0.0, 500.0);
        assert!((camera.pitch().0.to_degrees() - 89.0).abs() < 1e-4);
        camera.rotate(0.0, -1000.0);
        assert!((camera.pitch().0.to_degrees() + 89.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = camera();
        camera.zoom_by(100.0);
        assert_eq!(camera.zoom(), 1.0);
        camera.zoom_by(-100.0);
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn forward_key_moves_along_front() {
        let mut camera = camera();
        let mut controller = CameraController::new(2.5, 0.1);
        assert!(controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed));
        controller.update(&mut camera, Duration::from_secs(1));
        assert!((camera.position.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn mouse_up_pitches_up() {
        let mut camera = camera();
        let mut controller = CameraController::new(2.5, 0.1);
        controller.handle_mouse(0.0, -100.0);
        controller.update(&mut camera, Duration::from_millis(16));
        assert!((camera.pitch().0.to_degrees() - 10.0).abs() < 1e-4);
    }
}
