//! Error types.
//!
//! Errors fall into two categories:
//!
//! - [`ContractViolation`]: the caller supplied inconsistent configuration or data. These are
//!   reported from setup routines such as
//!   [`EigenstrainReducer::new`](crate::reducer::EigenstrainReducer::new) and
//!   [`ElementSample::validate`](crate::sample::ElementSample::validate), and cause a panic if
//!   they are encountered in the middle of an element pass.
//! - [`NumericalFailure`]: the data of an element does not admit the requested reduction, for
//!   example because the element has zero volume or because the quadrature points cannot
//!   support an affine fit. These are returned wrapped in a [`ReductionError`], which records the
//!   element in question, so that the caller may decide whether to retry with a coarser model or
//!   abort.
use crate::tensor::TensorComponent;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ContractViolation {
    /// No input eigenstrains were given.
    NoInputFields,
    /// The same eigenstrain name was given more than once.
    DuplicateField(String),
    /// A required eigenstrain is not present in the sample, or the sample contains an
    /// eigenstrain that was not configured.
    UnknownField(String),
    /// The previous state of an eigenstrain is required for incremental accumulation,
    /// but was not provided.
    MissingOldState { field: String },
    /// The number of values of an eigenstrain does not match the number of quadrature points.
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// Quadrature points, weights and scale factors do not have the same length.
    QuadratureLengthMismatch { expected: usize, actual: usize },
    /// A quadrature weight or scale factor is negative or not finite.
    InvalidQuadratureWeight { point: usize },
    /// The spatial dimension must be 1, 2 or 3.
    InvalidDimension(usize),
    /// A tolerance in the settings is negative or not finite.
    InvalidTolerance { name: &'static str, value: f64 },
}

impl Display for ContractViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInputFields => write!(f, "At least one input eigenstrain is required"),
            Self::DuplicateField(name) => write!(f, "Input eigenstrain \"{}\" is listed more than once", name),
            Self::UnknownField(name) => write!(f, "Eigenstrain \"{}\" is not known to the reducer", name),
            Self::MissingOldState { field } => write!(
                f,
                "Incremental accumulation requires the old state of eigenstrain \"{}\"",
                field
            ),
            Self::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Eigenstrain \"{}\" has {} values, but {} were expected",
                field, actual, expected
            ),
            Self::QuadratureLengthMismatch { expected, actual } => write!(
                f,
                "Quadrature data has inconsistent lengths (expected {}, got {})",
                expected, actual
            ),
            Self::InvalidQuadratureWeight { point } => write!(
                f,
                "Quadrature weight at point {} is negative or not finite",
                point
            ),
            Self::InvalidDimension(dim) => write!(f, "Spatial dimension must be 1, 2 or 3, got {}", dim),
            Self::InvalidTolerance { name, value } => {
                write!(f, "Tolerance {} must be finite and non-negative, got {}", name, value)
            }
        }
    }
}

impl Error for ContractViolation {}

#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum NumericalFailure {
    /// The total quadrature weight of the element is zero (or below the configured minimum),
    /// so the volume average is undefined.
    DegenerateVolume { total_weight: f64 },
    /// The normal matrix of the affine fit is singular, typically because there are fewer
    /// quadrature points than coefficients or because the points are collinear/coplanar.
    SingularNormalMatrix,
    /// The normal matrix of the affine fit is too ill-conditioned to give reliable coefficients.
    IllConditionedNormalMatrix { condition_estimate: f64 },
    /// The reduction of the given component produced a non-finite value.
    NonFiniteResult { component: TensorComponent },
}

impl Display for NumericalFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateVolume { total_weight } => {
                write!(f, "Degenerate element volume (total weight {:e})", total_weight)
            }
            Self::SingularNormalMatrix => write!(f, "Normal matrix of affine fit is singular"),
            Self::IllConditionedNormalMatrix { condition_estimate } => write!(
                f,
                "Normal matrix of affine fit is ill-conditioned (condition estimate {:e})",
                condition_estimate
            ),
            Self::NonFiniteResult { component } => {
                write!(f, "Reduction produced a non-finite value for component {}", component)
            }
        }
    }
}

impl Error for NumericalFailure {}

/// A numerical failure during the reduction of a specific element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReductionError {
    pub element_index: usize,
    pub failure: NumericalFailure,
}

impl ReductionError {
    pub fn new(element_index: usize, failure: NumericalFailure) -> Self {
        Self { element_index, failure }
    }
}

impl Display for ReductionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to reduce eigenstrain on element {}: {}",
            self.element_index, self.failure
        )
    }
}

impl Error for ReductionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.failure)
    }
}
