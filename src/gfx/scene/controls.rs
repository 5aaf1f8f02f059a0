use cgmath::{Deg, Matrix4, Vector3};

/// Range the panel allows for each light position axis
pub const LIGHT_POSITION_RANGE: (f32, f32) = (-5.0, 5.0);
pub const SPECULAR_STRENGTH_RANGE: (f32, f32) = (0.0, 2.0);
pub const SHININESS_RANGE: (i32, i32) = (1, 256);
pub const ROTATION_RANGE: (f32, f32) = (-180.0, 180.0);

/// Uniform scale of the cube drawn at the light position
pub const LIGHT_MARKER_SCALE: f32 = 0.2;

/// Scene parameters edited through the debug panel and read by the renderer
///
/// Only the panel writes these; the renderer reads them once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneControls {
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
    pub light_enabled: bool,
    pub specular_strength: f32,
    pub shininess: i32,
    /// Model rotation in degrees around X, Y and Z
    pub model_rotation: [f32; 3],
}

impl Default for SceneControls {
    fn default() -> Self {
        Self {
            light_position: [1.2, 1.0, 2.0],
            light_color: [1.0, 1.0, 1.0],
            light_enabled: true,
            specular_strength: 0.5,
            shininess: 32,
            model_rotation: [0.0, 0.0, 0.0],
        }
    }
}

impl SceneControls {
    /// Light color pushed to the mesh shader; black when the light is off
    pub fn effective_light_color(&self) -> Vector3<f32> {
        if self.light_enabled {
            Vector3::from(self.light_color)
        } else {
            Vector3::new(0.0, 0.0, 0.0)
        }
    }

    pub fn light_position(&self) -> Vector3<f32> {
        Vector3::from(self.light_position)
    }

    /// Model matrix for the mesh: rotate X, then Y, then Z (right-multiplied)
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let [x, y, z] = self.model_rotation;
        Matrix4::from_angle_x(Deg(x))
            * Matrix4::from_angle_y(Deg(y))
            * Matrix4::from_angle_z(Deg(z))
    }

    /// Model matrix for the light marker cube
    pub fn light_marker_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.light_position())
            * Matrix4::from_scale(LIGHT_MARKER_SCALE)
    }

    /// Pulls every field back into the range the panel exposes
    pub fn clamp_to_ui_ranges(&mut self) {
        for axis in &mut self.light_position {
            *axis = axis.clamp(LIGHT_POSITION_RANGE.0, LIGHT_POSITION_RANGE.1);
        }
        for channel in &mut self.light_color {
            *channel = channel.clamp(0.0, 1.0);
        }
        self.specular_strength = self
            .specular_strength
            .clamp(SPECULAR_STRENGTH_RANGE.0, SPECULAR_STRENGTH_RANGE.1);
        self.shininess = self.shininess.clamp(SHININESS_RANGE.0, SHININESS_RANGE.1);
        for angle in &mut self.model_rotation {
            *angle = angle.clamp(ROTATION_RANGE.0, ROTATION_RANGE.1);
        }
    }
}
