//! Quadrature data of a single element in physical space.
use crate::error::ContractViolation;
use crate::Real;
use itertools::izip;
use nalgebra::{Point3, Scalar};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// The coordinate system of the problem, which determines the scale factor applied to
/// integration weights.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// Scale factor 1.
    #[default]
    Cartesian,
    /// Axisymmetric (RZ) coordinates with the radial coordinate as the first coordinate.
    /// The scale factor is $2 \pi r$.
    Axisymmetric,
    /// Spherically symmetric coordinates with the radial coordinate as the first coordinate.
    /// The scale factor is $4 \pi r^2$.
    SphericallySymmetric,
}

impl CoordinateSystem {
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    pub fn scale_factor<T: Real>(&self, point: &Point3<T>) -> T {
        let r = point.x;
        match self {
            Self::Cartesian => 1.0,
            Self::Axisymmetric => 2.0 * T::pi() * r,
            Self::SphericallySymmetric => 4.0 * T::pi() * r * r,
        }
    }
}

/// Quadrature points of an element in physical coordinates.
///
/// Each point carries an integration weight `JxW` (reference weight times Jacobian determinant)
/// and a coordinate-system scale factor `coord`. Their product is the weight used for averaging
/// and for weighted least squares. Points are always stored in 3D. Coordinates beyond the
/// spatial dimension of the problem are ignored by the reduction.
///
/// The quadrature may be used as a reusable buffer, see [`clear`](Self::clear) and
/// [`push`](Self::push).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Scalar + Serialize", deserialize = "T: Scalar + Deserialize<'de>"))]
pub struct ElementQuadrature<T: Scalar> {
    points: Vec<Point3<T>>,
    jxw: Vec<T>,
    coord: Vec<T>,
}

impl<T: Scalar> Default for ElementQuadrature<T> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            jxw: Vec::new(),
            coord: Vec::new(),
        }
    }
}

impl<T: Real> ElementQuadrature<T> {
    /// Constructs quadrature data from points, integration weights and scale factors.
    ///
    /// Fails if the lengths differ, or if any weight or scale factor is negative or not finite.
    pub fn try_from_parts(points: Vec<Point3<T>>, jxw: Vec<T>, coord: Vec<T>) -> Result<Self, ContractViolation> {
        let quadrature = Self { points, jxw, coord };
        quadrature.validate()?;
        Ok(quadrature)
    }

    /// Constructs quadrature data with Cartesian scale factors.
    pub fn try_from_points_and_weights(points: Vec<Point3<T>>, jxw: Vec<T>) -> Result<Self, ContractViolation> {
        let coord = vec![T::one(); jxw.len()];
        Self::try_from_parts(points, jxw, coord)
    }

    pub fn validate(&self) -> Result<(), ContractViolation> {
        let n = self.points.len();
        for len in [self.jxw.len(), self.coord.len()] {
            if len != n {
                return Err(ContractViolation::QuadratureLengthMismatch {
                    expected: n,
                    actual: len,
                });
            }
        }
        let valid = |w: &T| w.is_finite() && *w >= T::zero();
        for (i, (w, c)) in izip!(&self.jxw, &self.coord).enumerate() {
            if !valid(w) || !valid(c) {
                return Err(ContractViolation::InvalidQuadratureWeight { point: i });
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.jxw.clear();
        self.coord.clear();
    }

    pub fn push(&mut self, point: Point3<T>, jxw: T, coord: T) {
        self.points.push(point);
        self.jxw.push(jxw);
        self.coord.push(coord);
    }

    /// Replaces the scale factors by those of the given coordinate system.
    pub fn apply_coordinate_system(&mut self, system: CoordinateSystem) {
        for (c, p) in izip!(&mut self.coord, &self.points) {
            *c = system.scale_factor(p);
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<T>] {
        &self.points
    }

    pub fn jxw(&self) -> &[T] {
        &self.jxw
    }

    pub fn coord(&self) -> &[T] {
        &self.coord
    }

    /// The combined weight `JxW * coord` of the given quadrature point.
    pub fn weight(&self, index: usize) -> T {
        self.jxw[index] * self.coord[index]
    }

    pub fn weights(&self) -> impl '_ + ExactSizeIterator<Item = T> {
        izip!(&self.jxw, &self.coord).map(|(&w, &c)| w * c)
    }

    /// Sum of all combined weights, i.e. the (scaled) volume of the element.
    pub fn total_weight(&self) -> T {
        self.weights().fold(T::zero(), |sum, w| sum + w)
    }
}
