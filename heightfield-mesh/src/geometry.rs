/// Face normals and whole-mesh transforms.
use crate::mesh::Vertex;
use constants::coordinate_system::ROTATE_X_NEG_90;
use rayon::prelude::*;

/// Unit normal of the plane through three vertices, or `None` when they are
/// collinear or coincident.
pub fn face_normal(v0: Vertex, v1: Vertex, v2: Vertex) -> Option<Vertex> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let normal = edge1.cross(edge2);
    let length = normal.length();

    if length == 0.0 || !length.is_finite() {
        return None;
    }
    Some(normal * (1.0 / length))
}

/// Multiply every coordinate by `factor`.
pub fn scale_uniform(vertices: &mut [Vertex], factor: f64) {
    vertices.par_iter_mut().for_each(|vertex| {
        *vertex = *vertex * factor;
    });
}

/// Row-major rotation matrix about the X axis.
pub fn rotation_x(angle_degrees: f64) -> [[f64; 3]; 3] {
    // Avoid sin/cos rounding for the tile's default orientation.
    if angle_degrees == -90.0 {
        return ROTATE_X_NEG_90;
    }

    let (sin_angle, cos_angle) = angle_degrees.to_radians().sin_cos();
    [
        [1.0, 0.0, 0.0],
        [0.0, cos_angle, -sin_angle],
        [0.0, sin_angle, cos_angle],
    ]
}

/// Apply a row-major 3x3 matrix to every vertex.
pub fn transform(vertices: &mut [Vertex], matrix: &[[f64; 3]; 3]) {
    vertices.par_iter_mut().for_each(|vertex| {
        let input = [vertex.x, vertex.y, vertex.z];
        let mut output = [0.0; 3];

        for i in 0..3 {
            for j in 0..3 {
                output[i] += matrix[i][j] * input[j];
            }
        }

        *vertex = Vertex::new(output[0], output[1], output[2]);
    });
}

/// Rotate about X: `y' = y cosθ - z sinθ`, `z' = y sinθ + z cosθ`.
pub fn rotate_x(vertices: &mut [Vertex], angle_degrees: f64) {
    transform(vertices, &rotation_x(angle_degrees));
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::coordinate_system::COORDINATE_EPSILON;

    fn sample_vertices() -> Vec<Vertex> {
        vec![
            Vertex::new(1.0, 2.0, 3.0),
            Vertex::new(-0.5, 0.25, 7.0),
            Vertex::new(0.0, -4.0, -1.5),
        ]
    }

    #[test]
    fn test_face_normal_is_unit_and_right_handed() {
        let normal = face_normal(
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(2.0, 0.0, 0.0),
            Vertex::new(0.0, 3.0, 0.0),
        )
        .unwrap();
        assert!(normal.approx_eq(Vertex::new(0.0, 0.0, 1.0), COORDINATE_EPSILON));
    }

    #[test]
    fn test_face_normal_degenerate() {
        let a = Vertex::new(1.0, 1.0, 1.0);
        assert!(face_normal(a, a, a).is_none());
        assert!(
            face_normal(
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 1.0, 1.0),
                Vertex::new(2.0, 2.0, 2.0)
            )
            .is_none()
        );
    }

    #[test]
    fn test_rotate_neg_90_maps_y_to_neg_z() {
        let mut vertices = vec![Vertex::new(1.0, 2.0, 3.0)];
        rotate_x(&mut vertices, -90.0);
        // y' = y*0 - z*(-1) = z, z' = y*(-1) + z*0 = -y
        assert_eq!(vertices[0], Vertex::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn test_exact_matrix_matches_trigonometric_rotation() {
        let (sin_angle, cos_angle) = (-90.0f64).to_radians().sin_cos();
        let computed = [
            [1.0, 0.0, 0.0],
            [0.0, cos_angle, -sin_angle],
            [0.0, sin_angle, cos_angle],
        ];
        for (row, expected) in computed.iter().zip(ROTATE_X_NEG_90.iter()) {
            for (a, b) in row.iter().zip(expected.iter()) {
                assert!((a - b).abs() < COORDINATE_EPSILON);
            }
        }
    }

    #[test]
    fn test_rotation_round_trip() {
        let original = sample_vertices();
        let mut vertices = original.clone();
        rotate_x(&mut vertices, -90.0);
        rotate_x(&mut vertices, 90.0);
        for (a, b) in vertices.iter().zip(original.iter()) {
            assert!(a.approx_eq(*b, COORDINATE_EPSILON), "{:?} != {:?}", a, b);
        }

        let mut vertices = original.clone();
        rotate_x(&mut vertices, 37.5);
        rotate_x(&mut vertices, -37.5);
        for (a, b) in vertices.iter().zip(original.iter()) {
            assert!(a.approx_eq(*b, COORDINATE_EPSILON));
        }
    }

    #[test]
    fn test_uniform_scale() {
        let original = sample_vertices();
        let mut vertices = original.clone();
        scale_uniform(&mut vertices, 0.5);
        for (scaled, source) in vertices.iter().zip(original.iter()) {
            assert_eq!(*scaled, *source * 0.5);
            assert!((scaled.length() - source.length() * 0.5).abs() < COORDINATE_EPSILON);
        }
    }
}
