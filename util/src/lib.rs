use nalgebra::{Matrix6x4, Point3, Vector3, Vector6};

/// Poor man's approx assertion for symmetric tensors, compared component-wise.
#[macro_export]
macro_rules! assert_approx_tensor_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let x = $x;
        let y = $y;
        let diff = x.components() - y.components();

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", x.components());
            println!("right: {}", y.components());
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Reference evaluation of an affine tensor field with coefficient rows `[a, b_x, b_y, b_z]`,
/// using only the first `dimension` coordinates.
pub fn evaluate_affine(coefficients: &Matrix6x4<f64>, dimension: usize, point: &Point3<f64>) -> Vector6<f64> {
    let mut result = Vector6::zeros();
    for c in 0..6 {
        result[c] = coefficients[(c, 0)];
        for j in 0..dimension {
            result[c] += coefficients[(c, j + 1)] * point[j];
        }
    }
    result
}

/// Points and weights of the tensor-product 3-point Gauss rule on an axis-aligned box.
///
/// Only the first `dimension` directions are subdivided. The remaining coordinates are set
/// to those of `origin`.
pub fn gauss3_box_quadrature(origin: Point3<f64>, extents: Vector3<f64>, dimension: usize) -> (Vec<Point3<f64>>, Vec<f64>) {
    let abscissas = [0.5 - 0.5 * f64::sqrt(0.6), 0.5, 0.5 + 0.5 * f64::sqrt(0.6)];
    let weights = [5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0];

    let mut points = vec![origin];
    let mut point_weights = vec![1.0];
    for d in 0..dimension {
        let mut next_points = Vec::new();
        let mut next_weights = Vec::new();
        for (p, w) in points.iter().zip(&point_weights) {
            for (xi, wi) in abscissas.iter().zip(&weights) {
                let mut q = *p;
                q[d] = origin[d] + xi * extents[d];
                next_points.push(q);
                next_weights.push(w * wi * extents[d]);
            }
        }
        points = next_points;
        point_weights = next_weights;
    }
    (points, point_weights)
}
