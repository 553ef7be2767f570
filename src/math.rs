/// A point or direction in world space
pub type Vec3 = [f64; 3];

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation about the vertical (y) axis
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, -sin], [0.0, 1.0, 0.0], [sin, 0.0, cos]]
}

/// Rotation about the horizontal (x) axis
pub fn rotation_x(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Euclidean distance between two points
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx(a: &Vec3, b: &Vec3) -> bool {
        distance(a, b) < 1e-9
    }

    #[test]
    fn identity_rotations_leave_vectors_alone() {
        let v = [1.0, 2.0, 3.0];
        let m = multiply_matrices(&rotation_x(0.0), &rotation_y(0.0));
        assert!(approx(&multiply_matrix_vector(&m, &v), &v));
    }

    #[test]
    fn quarter_turn_about_y_maps_x_onto_z() {
        let r = multiply_matrix_vector(&rotation_y(FRAC_PI_2), &[1.0, 0.0, 0.0]);
        assert!(approx(&r, &[0.0, 0.0, 1.0]));
    }

    #[test]
    fn quarter_turn_about_x_maps_y_onto_z() {
        let r = multiply_matrix_vector(&rotation_x(FRAC_PI_2), &[0.0, 1.0, 0.0]);
        assert!(approx(&r, &[0.0, 0.0, 1.0]));
    }
}
