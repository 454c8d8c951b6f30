use crate::accumulate::accumulate_eigenstrains_into;
use crate::error::{ContractViolation, ReductionError};
use crate::fit::{fit_affine, volume_average, FitModel};
use crate::quadrature::ElementQuadrature;
use crate::sample::ElementSample;
use crate::settings::{FallbackPolicy, ReducerSettings};
use crate::tensor::SymmetricTensor3;
use crate::Real;
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use log::{debug, trace, warn};
use nalgebra::convert;

/// Suffix of the name of the reduced eigenstrain output property.
pub const REDUCED_EIGENSTRAIN_NAME: &str = "reduced_order_eigenstrain";

define_thread_local_workspace!(REDUCER_WORKSPACE);

/// Computes reduced-order eigenstrains of finite elements.
///
/// For each element, the reducer
///
/// 1. accumulates the configured input eigenstrains at every quadrature point,
/// 2. reduces the accumulated values to a [`FitModel`]: the volume average for first order
///    meshes, or a least-squares affine fit for second order meshes,
/// 3. evaluates the model at the quadrature points of the element.
///
/// The reducer holds only its configuration, so the same reducer may be shared among threads that
/// process different elements.
#[derive(Debug, Clone)]
pub struct EigenstrainReducer {
    settings: ReducerSettings,
    input_property_names: Vec<String>,
    output_property_name: String,
}

impl EigenstrainReducer {
    pub fn new(settings: ReducerSettings) -> Result<Self, ContractViolation> {
        settings.validate()?;
        let input_property_names = settings
            .input_eigenstrain_names
            .iter()
            .map(|name| format!("{}{}", settings.base_name, name))
            .collect();
        let output_property_name = format!("{}{}", settings.base_name, REDUCED_EIGENSTRAIN_NAME);
        debug!(
            "Reducing eigenstrains {:?} into {} ({}, {:?})",
            input_property_names,
            output_property_name,
            if settings.second_order { "affine fit" } else { "volume average" },
            settings.accumulation
        );
        Ok(Self {
            settings,
            input_property_names,
            output_property_name,
        })
    }

    pub fn settings(&self) -> &ReducerSettings {
        &self.settings
    }

    /// Names of the input eigenstrains, prefixed with the base name.
    pub fn input_property_names(&self) -> &[String] {
        &self.input_property_names
    }

    /// Name of the output property, `base_name + "reduced_order_eigenstrain"`.
    pub fn output_property_name(&self) -> &str {
        &self.output_property_name
    }

    pub fn uses_affine_fit(&self) -> bool {
        self.settings.second_order
    }

    /// Accumulates the input eigenstrains of the sample into `output`.
    ///
    /// # Panics
    ///
    /// Panics if the sample does not contain exactly the input eigenstrains of the reducer, or if
    /// it is otherwise invalid for the configured accumulation mode.
    pub fn accumulate_into<T: Real>(&self, output: &mut Vec<SymmetricTensor3<T>>, sample: &ElementSample<T>) {
        if let Err(err) = sample.validate_names(&self.input_property_names) {
            panic!("Eigenstrain sample does not match reducer: {}", err);
        }
        accumulate_eigenstrains_into(output, sample, self.settings.accumulation);
    }

    pub fn accumulate<T: Real>(&self, sample: &ElementSample<T>) -> Vec<SymmetricTensor3<T>> {
        let mut output = Vec::new();
        self.accumulate_into(&mut output, sample);
        output
    }

    /// Reduces the accumulated eigenstrain of an element to a reduced-order model.
    ///
    /// The element index is only used to give context to errors.
    ///
    /// # Panics
    ///
    /// Panics if the quadrature fails [`ElementQuadrature::validate`], or if the number of values
    /// does not match the number of quadrature points.
    pub fn reduce<T: Real>(
        &self,
        element_index: usize,
        combined: &[SymmetricTensor3<T>],
        quadrature: &ElementQuadrature<T>,
    ) -> Result<FitModel<T>, ReductionError> {
        if let Err(violation) = quadrature.validate() {
            panic!("Invalid quadrature for element {}: {}", element_index, violation);
        }
        let min_total_weight: T = convert(self.settings.min_total_weight);
        let average = || {
            volume_average(combined, quadrature, min_total_weight)
                .map(FitModel::Constant)
                .map_err(|failure| ReductionError::new(element_index, failure))
        };

        if !self.settings.second_order {
            return average();
        }

        let fit = fit_affine(
            combined,
            quadrature,
            self.settings.dimension,
            self.settings.weighting,
            convert(self.settings.max_condition_number),
        );
        match (fit, self.settings.fallback) {
            (Ok(field), _) => {
                trace!("Element {}: affine eigenstrain fit succeeded", element_index);
                Ok(FitModel::Affine(field))
            }
            (Err(failure), FallbackPolicy::Fail) => Err(ReductionError::new(element_index, failure)),
            (Err(failure), FallbackPolicy::VolumeAverage) => {
                warn!(
                    "Affine eigenstrain fit failed on element {}: {}. Falling back to volume average.",
                    element_index, failure
                );
                average()
            }
        }
    }

    /// Runs the full pass for one element and writes the reduced eigenstrain at each quadrature
    /// point into `output`.
    ///
    /// Returns the model that was evaluated.
    ///
    /// # Panics
    ///
    /// Panics if the sample is invalid (see [`accumulate_into`](Self::accumulate_into)), if the
    /// quadrature fails [`ElementQuadrature::validate`], or if the sample, the quadrature and the
    /// output do not all have the same number of points.
    pub fn compute_element_into<T: Real>(
        &self,
        element_index: usize,
        sample: &ElementSample<T>,
        quadrature: &ElementQuadrature<T>,
        output: &mut [SymmetricTensor3<T>],
    ) -> Result<FitModel<T>, ReductionError> {
        assert_eq!(
            output.len(),
            quadrature.num_points(),
            "Output length must match number of quadrature points"
        );
        with_thread_local_workspace(&REDUCER_WORKSPACE, |combined: &mut Vec<SymmetricTensor3<T>>| {
            self.accumulate_into(combined, sample);
            assert_eq!(
                combined.len(),
                quadrature.num_points(),
                "Eigenstrain sample of element {} does not match its quadrature",
                element_index
            );
            let model = self.reduce(element_index, combined, quadrature)?;
            model.evaluate_at_points_into(output, quadrature.points());
            Ok(model)
        })
    }

    /// Same as [`compute_element_into`](Self::compute_element_into), but returns the values at the
    /// quadrature points in a new vector.
    pub fn compute_element<T: Real>(
        &self,
        element_index: usize,
        sample: &ElementSample<T>,
        quadrature: &ElementQuadrature<T>,
    ) -> Result<Vec<SymmetricTensor3<T>>, ReductionError> {
        let mut output = vec![SymmetricTensor3::zeros(); quadrature.num_points()];
        self.compute_element_into(element_index, sample, quadrature, &mut output)?;
        Ok(output)
    }

    /// Initial values of the output for an element that has not been evaluated yet.
    pub fn initialize_element_into<T: Real>(&self, output: &mut [SymmetricTensor3<T>]) {
        output.fill(SymmetricTensor3::zeros());
    }

    pub fn initial_element_values<T: Real>(&self, num_points: usize) -> Vec<SymmetricTensor3<T>> {
        vec![SymmetricTensor3::zeros(); num_points]
    }
}
