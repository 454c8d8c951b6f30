//! Configuration of the eigenstrain reduction.
use crate::error::ContractViolation;
use serde::{Deserialize, Serialize};

/// How the input eigenstrains are combined at each quadrature point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    /// Sum of the current values of all input eigenstrains.
    #[default]
    Total,
    /// Sum of the increments (current minus old) of all input eigenstrains.
    Incremental,
}

/// Row weighting used in the least-squares fit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeastSquaresWeighting {
    /// Every quadrature point contributes an unweighted row to the least-squares system.
    #[default]
    Unweighted,
    /// Each row is weighted by the quadrature weight `JxW * coord` of its point, so that the
    /// fit minimizes the discrete $L^2$ error over the element.
    QuadratureWeighted,
}

/// What to do when the affine fit of an element fails numerically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report the failure to the caller.
    #[default]
    Fail,
    /// Log a warning and use the volume average of the element instead.
    VolumeAverage,
}

/// Settings for [`EigenstrainReducer`](crate::reducer::EigenstrainReducer).
///
/// All fields have defaults, so that configuration files only need to list the input eigenstrains:
///
/// ```
/// # use fenris_eigenstrain::settings::ReducerSettings;
/// let settings = ReducerSettings::new(["thermal_eigenstrain", "phase_eigenstrain"])
///     .with_dimension(2)
///     .with_second_order(true);
/// assert_eq!(settings.num_fit_columns(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerSettings {
    /// Prefix applied to the input eigenstrain names and the output property name.
    pub base_name: String,
    pub input_eigenstrain_names: Vec<String>,
    pub accumulation: AccumulationMode,
    /// Spatial dimension of the mesh. Determines the number of coordinate terms in the affine fit.
    pub dimension: usize,
    /// Whether the mesh has second order elements, in which case the eigenstrain is fitted
    /// to an affine function of the coordinates instead of being volume averaged.
    pub second_order: bool,
    pub weighting: LeastSquaresWeighting,
    pub fallback: FallbackPolicy,
    /// Total quadrature weights at or below this value are considered degenerate.
    ///
    /// The default is the smallest positive normal `f64`, which rejects zero and subnormal totals.
    pub min_total_weight: f64,
    /// Largest acceptable condition estimate of the (scaled) normal matrix of the affine fit.
    pub max_condition_number: f64,
}

impl Default for ReducerSettings {
    fn default() -> Self {
        Self {
            base_name: String::new(),
            input_eigenstrain_names: Vec::new(),
            accumulation: AccumulationMode::Total,
            dimension: 3,
            second_order: false,
            weighting: LeastSquaresWeighting::Unweighted,
            fallback: FallbackPolicy::Fail,
            min_total_weight: f64::MIN_POSITIVE,
            max_condition_number: 1e12,
        }
    }
}

impl ReducerSettings {
    pub fn new<S: Into<String>>(input_eigenstrain_names: impl IntoIterator<Item = S>) -> Self {
        Self {
            input_eigenstrain_names: input_eigenstrain_names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_base_name(self, base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..self
        }
    }

    pub fn with_accumulation(self, accumulation: AccumulationMode) -> Self {
        Self { accumulation, ..self }
    }

    pub fn with_dimension(self, dimension: usize) -> Self {
        Self { dimension, ..self }
    }

    pub fn with_second_order(self, second_order: bool) -> Self {
        Self { second_order, ..self }
    }

    pub fn with_weighting(self, weighting: LeastSquaresWeighting) -> Self {
        Self { weighting, ..self }
    }

    pub fn with_fallback(self, fallback: FallbackPolicy) -> Self {
        Self { fallback, ..self }
    }

    pub fn with_min_total_weight(self, min_total_weight: f64) -> Self {
        Self {
            min_total_weight,
            ..self
        }
    }

    pub fn with_max_condition_number(self, max_condition_number: f64) -> Self {
        Self {
            max_condition_number,
            ..self
        }
    }

    /// Number of columns in the least-squares design matrix, `1 + dimension`.
    pub fn num_fit_columns(&self) -> usize {
        1 + self.dimension
    }

    /// Checks that the settings are consistent.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        if self.input_eigenstrain_names.is_empty() {
            return Err(ContractViolation::NoInputFields);
        }
        for (i, name) in self.input_eigenstrain_names.iter().enumerate() {
            if self.input_eigenstrain_names[..i].contains(name) {
                return Err(ContractViolation::DuplicateField(name.clone()));
            }
        }
        if !(1..=3).contains(&self.dimension) {
            return Err(ContractViolation::InvalidDimension(self.dimension));
        }
        let tolerances = [
            ("min_total_weight", self.min_total_weight),
            ("max_condition_number", self.max_condition_number),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ContractViolation::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}
