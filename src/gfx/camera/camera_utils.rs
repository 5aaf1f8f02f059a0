use cgmath::Matrix4;

/// Remaps OpenGL clip-space depth (-1..1) to the 0..1 range wgpu expects
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_depth_is_remapped_to_zero_one() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z / near.w, 0.0);
        assert_eq!(far.z / far.w, 1.0);
    }

    #[test]
    fn test_array_is_column_major() {
        let matrix = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let array = convert_matrix4_to_array(matrix);
        assert_eq!(array[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
