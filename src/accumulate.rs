//! Accumulation of several eigenstrains into a single tensor per quadrature point.
use crate::sample::ElementSample;
use crate::settings::AccumulationMode;
use crate::tensor::SymmetricTensor3;
use crate::Real;
use itertools::izip;

/// Sums the input eigenstrains of the sample at each quadrature point.
///
/// With [`AccumulationMode::Total`], the result at point $q$ is $\sum_i \vec \epsilon_i(q)$.
/// With [`AccumulationMode::Incremental`], it is the sum of increments
/// $\sum_i \left( \vec \epsilon_i(q) - \vec \epsilon_i^{\text{old}}(q) \right)$.
///
/// The output buffer is resized to the number of quadrature points.
///
/// # Panics
///
/// Panics if the sample does not pass [`ElementSample::validate`] for the given mode.
pub fn accumulate_eigenstrains_into<T: Real>(
    output: &mut Vec<SymmetricTensor3<T>>,
    sample: &ElementSample<T>,
    mode: AccumulationMode,
) {
    let n = match sample.validate(mode) {
        Ok(n) => n,
        Err(err) => panic!("Cannot accumulate invalid eigenstrain sample: {}", err),
    };

    output.clear();
    output.resize(n, SymmetricTensor3::zeros());

    for field in sample.fields() {
        for (sum, value) in izip!(output.iter_mut(), field.current()) {
            *sum += value;
        }
        if mode == AccumulationMode::Incremental {
            // Presence is guaranteed by validation
            let old = field.old().unwrap_or(&[]);
            for (sum, old_value) in izip!(output.iter_mut(), old) {
                *sum -= old_value;
            }
        }
    }
}

/// Same as [`accumulate_eigenstrains_into`], but returns a new vector.
pub fn accumulate_eigenstrains<T: Real>(sample: &ElementSample<T>, mode: AccumulationMode) -> Vec<SymmetricTensor3<T>> {
    let mut output = Vec::new();
    accumulate_eigenstrains_into(&mut output, sample, mode);
    output
}
