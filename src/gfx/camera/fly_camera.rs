use cgmath::*;

use super::camera_utils::OPENGL_TO_WGPU_MATRIX;

pub const MIN_PITCH: f32 = -89.0;
pub const MAX_PITCH: f32 = 89.0;
pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 45.0;

/// Free-fly camera steered by yaw/pitch angles in degrees
///
/// `front` is always the unit vector derived from `yaw` and `pitch`; `up`
/// never changes.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        // A yaw of 0 points along +X, so start at -90 to look down -Z
        Self::new(Vector3::new(0.0, 0.0, 3.0), -90.0, 0.0, 1.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>, yaw: f32, pitch: f32, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            yaw,
            pitch: pitch.clamp(MIN_PITCH, MAX_PITCH),
            fov: MAX_FOV,
            aspect,
            znear: 0.1,
            zfar: 100.0,
        };
        camera.update();
        camera
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw += delta;
        self.update();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
    }

    /// Narrows the field of view by `delta` degrees (zoom in for positive values)
    pub fn zoom(&mut self, delta: f32) {
        self.set_fov(self.fov - delta);
    }

    /// Unit vector pointing to the camera's right
    pub fn right(&self) -> Vector3<f32> {
        self.front.cross(self.up).normalize()
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at_rh(eye, eye + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.fov), self.aspect, self.znear, self.zfar)
    }

    /// Recomputes `front` after `yaw` or `pitch` changed
    fn update(&mut self) {
        self.front = front_from_angles(self.yaw, self.pitch);
    }
}

/// Width over height, falling back to 1.0 for a minimised window
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

fn front_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (yaw, pitch) = (Deg(yaw), Deg(pitch));
    Vector3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert!(camera.front.x.abs() < 1e-6);
        assert!(camera.front.y.abs() < 1e-6);
        assert!((camera.front.z + 1.0).abs() < 1e-6);
        assert_eq!(camera.fov, 45.0);
        assert_eq!(camera.position, Vector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.add_pitch(500.0);
        assert_eq!(camera.pitch, MAX_PITCH);
        camera.add_pitch(-1000.0);
        assert_eq!(camera.pitch, MIN_PITCH);
    }

    #[test]
    fn test_yaw_is_not_wrapped() {
        let mut camera = FlyCamera::default();
        let before = camera.front;
        camera.add_yaw(720.0);
        assert_eq!(camera.yaw, 630.0);
        assert!((camera.front - before).magnitude() < 1e-4);
    }

    #[test]
    fn test_front_stays_unit_length() {
        let mut camera = FlyCamera::default();
        for step in 0..50 {
            camera.add_yaw(13.7);
            camera.add_pitch(if step % 2 == 0 { 31.0 } else { -17.0 });
            assert!((camera.front.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fov_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.zoom(-10.0);
        assert_eq!(camera.fov, MAX_FOV);
        camera.zoom(100.0);
        assert_eq!(camera.fov, MIN_FOV);
    }

    #[test]
    fn test_right_is_perpendicular_to_front() {
        let camera = FlyCamera::default();
        assert!(camera.right().dot(camera.front).abs() < 1e-6);
        assert!((camera.right() - Vector3::unit_x()).magnitude() < 1e-6);
    }

    #[test]
    fn test_point_ahead_projects_to_center_with_depth_in_range() {
        let camera = FlyCamera::default();
        let view_projection = camera.projection_matrix() * camera.view_matrix();
        let clip = view_projection * Vector4::new(0.0, 0.0, -2.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);

        let behind = view_projection * Vector4::new(0.0, 0.0, 4.0, 1.0);
        assert!(behind.w < 0.0);
    }

    #[test]
    fn test_aspect_ratio_handles_zero_height() {
        assert_eq!(aspect_ratio(1000, 750), 1000.0 / 750.0);
        assert_eq!(aspect_ratio(800, 0), 1.0);
    }
}
