use crate::quadrature::ElementQuadrature;
use crate::tensor::SymmetricTensor3;
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::{Matrix6x4, Point3, Vector3, Vector6};

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    // Keep coordinates moderate, so that products of coordinates and coefficients stay well within
    // the range where comparisons with a fixed tolerance make sense
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range.clone()].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

pub fn symmetric_tensor3() -> impl Strategy<Value = SymmetricTensor3<f64>> {
    let range = -1.0..1.0;
    vec(range, 6).prop_map(|components| SymmetricTensor3::from_components(Vector6::from_column_slice(&components)))
}

impl Arbitrary for SymmetricTensor3<f64> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        symmetric_tensor3().boxed()
    }
}

/// Coefficients of an arbitrary affine tensor field, see
/// [`AffineTensorField`](crate::fit::AffineTensorField).
pub fn affine_coefficients() -> impl Strategy<Value = Matrix6x4<f64>> {
    vec(-1.0..1.0, 24).prop_map(|coefficients| Matrix6x4::from_column_slice(&coefficients))
}

/// Quadrature with between 1 and `max_points` points at arbitrary locations, with strictly
/// positive weights.
pub fn element_quadrature(max_points: usize) -> impl Strategy<Value = ElementQuadrature<f64>> {
    vec((point3(), 0.01..1.0, 0.5..2.0), 1..=max_points.max(1)).prop_map(|points| {
        let mut quadrature = ElementQuadrature::default();
        for (p, jxw, coord) in points {
            quadrature.push(p, jxw, coord);
        }
        quadrature
    })
}

/// The 2x2x2 Gauss quadrature of an arbitrary axis-aligned box, restricted to the first
/// `dimension` coordinates (remaining coordinates are zero).
///
/// The points of such a quadrature always support an affine fit in the given dimension.
pub fn box_gauss_quadrature(dimension: usize) -> impl Strategy<Value = ElementQuadrature<f64>> {
    assert!((1..=3).contains(&dimension));
    (point3(), [0.1..5.0, 0.1..5.0, 0.1..5.0]).prop_map(move |(origin, [hx, hy, hz])| {
        let extents = Vector3::new(hx, hy, hz);
        let g = 0.5 / f64::sqrt(3.0);
        let num_points = 1 << dimension;
        let volume: f64 = extents.iter().take(dimension).product();

        let mut quadrature = ElementQuadrature::default();
        for i in 0..num_points {
            let mut p = Point3::origin();
            for d in 0..dimension {
                let sign = if (i >> d) & 1 == 0 { -1.0 } else { 1.0 };
                p[d] = origin[d] + extents[d] * (0.5 + sign * g);
            }
            quadrature.push(p, volume / num_points as f64, 1.0);
        }
        quadrature
    })
}
