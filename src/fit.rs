//! Reduced-order models of an eigenstrain field over an element.
//!
//! An element's accumulated eigenstrain is replaced either by its volume average
//! ([`volume_average`]) or by an affine function of the spatial coordinates fitted by least
//! squares ([`fit_affine`]). The result is a [`FitModel`], which can be evaluated at arbitrary
//! points of the element.
use crate::error::NumericalFailure;
use crate::quadrature::ElementQuadrature;
use crate::settings::LeastSquaresWeighting;
use crate::tensor::{SymmetricTensor3, TensorComponent};
use crate::Real;
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use itertools::izip;
use log::trace;
use nalgebra::{try_convert, Cholesky, DMatrix, DVector, Matrix6x4, Point3, Scalar, Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// A tensor field on an element that is affine in the spatial coordinates.
///
/// Each of the six independent components $c$ is represented by coefficients
/// $[a_c, b_c^x, b_c^y, b_c^z]$ such that the component at $\vec x$ is
/// $$
/// a_c + b_c^x x + b_c^y y + b_c^z z.
/// $$
/// Coefficients for coordinates beyond the spatial dimension are always zero and are never used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Scalar + Serialize", deserialize = "T: Scalar + Deserialize<'de>"))]
pub struct AffineTensorField<T: Scalar> {
    dimension: usize,
    /// Row `c` holds the coefficients of component `c`, column 0 is the intercept.
    coefficients: Matrix6x4<T>,
}

impl<T: Real> AffineTensorField<T> {
    /// Constructs an affine field from a coefficient matrix.
    ///
    /// Columns beyond `1 + dimension` are set to zero.
    ///
    /// # Panics
    ///
    /// Panics if the dimension is not 1, 2 or 3.
    pub fn from_coefficients(dimension: usize, mut coefficients: Matrix6x4<T>) -> Self {
        assert!((1..=3).contains(&dimension), "Dimension must be 1, 2 or 3");
        for j in (1 + dimension)..4 {
            coefficients.column_mut(j).fill(T::zero());
        }
        Self {
            dimension,
            coefficients,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn coefficients(&self) -> &Matrix6x4<T> {
        &self.coefficients
    }

    /// The coefficients $[a_c, b_c^x, \dots]$ of the given component, of length `1 + dimension`.
    pub fn component_coefficients(&self, component: TensorComponent) -> DVector<T> {
        let ncols = 1 + self.dimension;
        let row = self.coefficients.row(component.index());
        DVector::from_iterator(ncols, row.iter().copied().take(ncols))
    }

    pub fn intercept(&self, component: TensorComponent) -> T {
        self.coefficients[(component.index(), 0)]
    }

    /// The constant gradient of the given component. Entries beyond the dimension are zero.
    pub fn gradient(&self, component: TensorComponent) -> Vector3<T> {
        let c = component.index();
        Vector3::new(
            self.coefficients[(c, 1)],
            self.coefficients[(c, 2)],
            self.coefficients[(c, 3)],
        )
    }

    /// Evaluates the field at the given point. Coordinates beyond the dimension are ignored.
    pub fn evaluate(&self, point: &Point3<T>) -> SymmetricTensor3<T> {
        let mut values: Vector6<T> = self.coefficients.column(0).into_owned();
        for j in 0..self.dimension {
            values.axpy(point[j], &self.coefficients.column(j + 1), T::one());
        }
        SymmetricTensor3::from_components(values)
    }
}

/// A reduced-order representation of an eigenstrain field over an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Scalar + Serialize", deserialize = "T: Scalar + Deserialize<'de>"))]
pub enum FitModel<T: Scalar> {
    /// The same tensor everywhere in the element.
    Constant(SymmetricTensor3<T>),
    /// A tensor that varies affinely with the spatial coordinates.
    Affine(AffineTensorField<T>),
}

impl<T: Real> FitModel<T> {
    pub fn evaluate(&self, point: &Point3<T>) -> SymmetricTensor3<T> {
        match self {
            Self::Constant(tensor) => *tensor,
            Self::Affine(field) => field.evaluate(point),
        }
    }

    /// Evaluates the model at each of the given points.
    ///
    /// # Panics
    ///
    /// Panics if the output does not have the same length as the points.
    pub fn evaluate_at_points_into(&self, output: &mut [SymmetricTensor3<T>], points: &[Point3<T>]) {
        assert_eq!(output.len(), points.len(), "Output and points must have the same length");
        for (value, point) in izip!(output, points) {
            *value = self.evaluate(point);
        }
    }
}

pub(crate) fn to_f64<T: Real>(value: T) -> f64 {
    try_convert(value).unwrap_or(f64::NAN)
}

fn check_finite<T: Real>(values: &Vector6<T>) -> Result<(), NumericalFailure> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(NumericalFailure::NonFiniteResult {
            component: TensorComponent::ALL[i],
        }),
        None => Ok(()),
    }
}

/// Computes the volume average of the given per-point tensors.
///
/// The average is
/// $$
/// \bar{\vec \epsilon} = \frac{\sum_q w_q \vec \epsilon_q}{\sum_q w_q},
/// $$
/// where $w_q$ is the combined weight `JxW * coord` of quadrature point $q$.
///
/// Fails with [`NumericalFailure::DegenerateVolume`] if the total weight does not exceed
/// `min_total_weight`.
///
/// # Panics
///
/// Panics if the number of values does not match the number of quadrature points.
pub fn volume_average<T: Real>(
    values: &[SymmetricTensor3<T>],
    quadrature: &ElementQuadrature<T>,
    min_total_weight: T,
) -> Result<SymmetricTensor3<T>, NumericalFailure> {
    assert_eq!(
        values.len(),
        quadrature.num_points(),
        "Number of values must match number of quadrature points"
    );

    let mut sum = SymmetricTensor3::<T>::zeros();
    let mut volume = T::zero();
    for (value, w) in izip!(values, quadrature.weights()) {
        sum += *value * w;
        volume += w;
    }

    if !(volume > min_total_weight) {
        return Err(NumericalFailure::DegenerateVolume {
            total_weight: to_f64(volume),
        });
    }

    let average = sum / volume;
    check_finite(average.components())?;
    Ok(average)
}

/// Scratch buffers for [`fit_affine_with_workspace`].
#[derive(Debug)]
pub struct AffineFitWorkspace<T: Scalar> {
    row_weights: Vec<T>,
    design: DMatrix<T>,
    rhs: DMatrix<T>,
}

impl<T: Real> Default for AffineFitWorkspace<T> {
    fn default() -> Self {
        Self {
            row_weights: Vec::new(),
            design: DMatrix::zeros(0, 0),
            rhs: DMatrix::zeros(0, 0),
        }
    }
}

define_thread_local_workspace!(FIT_WORKSPACE);

/// Fits an affine function of the spatial coordinates to each component of the given tensors.
///
/// For each independent component $c$, the coefficients $\vec x_c$ solve the normal equations
/// $$
/// \vec A^T \vec W \vec A \vec x_c = \vec A^T \vec W \vec b_c,
/// $$
/// where row $q$ of the design matrix $\vec A$ is $[1, x_q, y_q, z_q]$ truncated to the
/// spatial dimension, $(\vec b_c)_q$ is component $c$ of the tensor at point $q$, and
/// $\vec W$ is either the identity or the diagonal matrix of quadrature weights, depending on
/// `weighting`. The normal equations are solved with a Cholesky factorization.
///
/// To reduce round-off, the system is assembled in coordinates relative to the centroid of the
/// points and the normal matrix is scaled to unit diagonal before factorization. The returned
/// coefficients are nevertheless relative to the origin.
///
/// Fails if the normal matrix is singular, or if the condition estimate of the scaled normal
/// matrix exceeds `max_condition_number`. This is the case for instance if there are fewer
/// points than coefficients, or if the points are collinear in 2D or coplanar in 3D.
///
/// Uses thread-local scratch buffers.
///
/// # Panics
///
/// Panics if the number of values does not match the number of quadrature points, or if the
/// dimension is not 1, 2 or 3.
pub fn fit_affine<T: Real>(
    values: &[SymmetricTensor3<T>],
    quadrature: &ElementQuadrature<T>,
    dimension: usize,
    weighting: LeastSquaresWeighting,
    max_condition_number: T,
) -> Result<AffineTensorField<T>, NumericalFailure> {
    with_thread_local_workspace(&FIT_WORKSPACE, |ws: &mut AffineFitWorkspace<T>| {
        fit_affine_with_workspace(ws, values, quadrature, dimension, weighting, max_condition_number)
    })
}

/// Same as [`fit_affine`], but with explicitly provided scratch buffers.
#[allow(non_snake_case)]
pub fn fit_affine_with_workspace<T: Real>(
    workspace: &mut AffineFitWorkspace<T>,
    values: &[SymmetricTensor3<T>],
    quadrature: &ElementQuadrature<T>,
    dimension: usize,
    weighting: LeastSquaresWeighting,
    max_condition_number: T,
) -> Result<AffineTensorField<T>, NumericalFailure> {
    assert_eq!(
        values.len(),
        quadrature.num_points(),
        "Number of values must match number of quadrature points"
    );
    assert!((1..=3).contains(&dimension), "Dimension must be 1, 2 or 3");

    let n = values.len();
    let ncols = 1 + dimension;
    let AffineFitWorkspace { row_weights, design, rhs } = workspace;

    row_weights.clear();
    match weighting {
        LeastSquaresWeighting::Unweighted => row_weights.resize(n, T::one()),
        LeastSquaresWeighting::QuadratureWeighted => row_weights.extend(quadrature.weights()),
    }

    let total_weight = row_weights.iter().fold(T::zero(), |sum, &w| sum + w);
    if !(total_weight > T::zero()) {
        return Err(NumericalFailure::SingularNormalMatrix);
    }

    let mut centroid = Vector3::<T>::zeros();
    for (&w, p) in izip!(row_weights.iter(), quadrature.points()) {
        centroid += p.coords * w;
    }
    centroid /= total_weight;

    design.resize_mut(n, ncols, T::zero());
    rhs.resize_mut(n, 6, T::zero());
    for (q, (&w, p, value)) in izip!(row_weights.iter(), quadrature.points(), values).enumerate() {
        let s = w.sqrt();
        design[(q, 0)] = s;
        for j in 0..dimension {
            design[(q, j + 1)] = s * (p[j] - centroid[j]);
        }
        for c in 0..6 {
            rhs[(q, c)] = s * value.components()[c];
        }
    }

    let (design, rhs) = (&*design, &*rhs);
    let mut AtA = design.tr_mul(design);
    let mut Atb = design.tr_mul(rhs);

    // Symmetric diagonal scaling, so that the conditioning check is independent of element size
    let mut scaling = DVector::zeros(ncols);
    for j in 0..ncols {
        let d = AtA[(j, j)];
        if !(d > T::zero()) {
            return Err(NumericalFailure::SingularNormalMatrix);
        }
        scaling[j] = T::one() / d.sqrt();
    }
    for i in 0..ncols {
        for j in 0..ncols {
            AtA[(i, j)] *= scaling[i] * scaling[j];
        }
        let s_i = scaling[i];
        Atb.row_mut(i).scale_mut(s_i);
    }

    let cholesky = Cholesky::new(AtA).ok_or(NumericalFailure::SingularNormalMatrix)?;
    let pivots = cholesky.l_dirty().diagonal();
    if pivots.iter().any(|p| !p.is_finite() || *p <= T::zero()) {
        return Err(NumericalFailure::SingularNormalMatrix);
    }
    let max_pivot = pivots.iter().fold(T::zero(), |m, &p| m.max(p));
    let min_pivot = pivots.iter().fold(max_pivot, |m, &p| m.min(p));
    let condition_estimate = (max_pivot / min_pivot).powi(2);
    trace!("Affine eigenstrain fit condition estimate: {:e}", to_f64(condition_estimate));
    if !(condition_estimate <= max_condition_number) {
        return Err(NumericalFailure::IllConditionedNormalMatrix {
            condition_estimate: to_f64(condition_estimate),
        });
    }

    let mut solution = cholesky.solve(&Atb);
    for i in 0..ncols {
        let s_i = scaling[i];
        solution.row_mut(i).scale_mut(s_i);
    }

    // Shift the expansion point from the centroid back to the origin
    let mut coefficients = Matrix6x4::zeros();
    for component in TensorComponent::ALL {
        let c = component.index();
        let mut intercept = solution[(0, c)];
        for j in 0..dimension {
            let slope = solution[(j + 1, c)];
            coefficients[(c, j + 1)] = slope;
            intercept -= slope * centroid[j];
        }
        coefficients[(c, 0)] = intercept;
        if coefficients.row(c).iter().any(|x| !x.is_finite()) {
            return Err(NumericalFailure::NonFiniteResult { component });
        }
    }

    Ok(AffineTensorField {
        dimension,
        coefficients,
    })
}
