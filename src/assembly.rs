//! Reduction of eigenstrains over all elements of a mesh.
//!
//! The host supplies quadrature data and eigenstrains through the [`EigenstrainDataSource`]
//! trait. [`EigenstrainReducer::reduce_all_into`] and
//! [`EigenstrainReducer::par_reduce_all_into`] then run the per-element pass for every element
//! and store the results in a [`ReducedEigenstrainField`].
use crate::error::{ContractViolation, ReductionError};
use crate::quadrature::ElementQuadrature;
use crate::reducer::EigenstrainReducer;
use crate::sample::{EigenstrainState, ElementSample};
use crate::settings::AccumulationMode;
use crate::tensor::SymmetricTensor3;
use crate::Real;
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use eyre::{bail, eyre, Report};
use itertools::izip;
use log::debug;
use nalgebra::Scalar;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Per-element quadrature and eigenstrain data provided by the host.
pub trait EigenstrainDataSource<T: Scalar> {
    fn num_elements(&self) -> usize;

    fn element_quadrature_size(&self, element_index: usize) -> usize;

    /// Replaces the contents of `quadrature` with the quadrature of the given element.
    fn populate_element_quadrature(&self, element_index: usize, quadrature: &mut ElementQuadrature<T>);

    /// Whether the source can provide the given eigenstrain in the given state.
    fn has_eigenstrain(&self, name: &str, state: EigenstrainState) -> bool;

    /// Writes the values of the named eigenstrain at the quadrature points of the element.
    ///
    /// # Panics
    ///
    /// An implementation may panic if the eigenstrain is not available in the requested state,
    /// or if `values` does not have the length given by
    /// [`element_quadrature_size`](Self::element_quadrature_size).
    fn populate_element_eigenstrain(
        &self,
        element_index: usize,
        name: &str,
        state: EigenstrainState,
        values: &mut [SymmetricTensor3<T>],
    );
}

#[derive(Debug, Clone, PartialEq)]
struct TabulatedField<T: Scalar> {
    current: Option<Vec<SymmetricTensor3<T>>>,
    old: Option<Vec<SymmetricTensor3<T>>>,
}

/// An [`EigenstrainDataSource`] that keeps all data in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedEigenstrainData<T: Scalar> {
    quadratures: Vec<ElementQuadrature<T>>,
    offsets: Vec<usize>,
    fields: FxHashMap<String, TabulatedField<T>>,
}

impl<T: Real> TabulatedEigenstrainData<T> {
    /// Fails if any of the quadratures does not pass [`ElementQuadrature::validate`].
    pub fn from_quadratures(quadratures: Vec<ElementQuadrature<T>>) -> eyre::Result<Self> {
        let mut offsets = Vec::with_capacity(quadratures.len() + 1);
        offsets.push(0);
        for (element_index, quadrature) in quadratures.iter().enumerate() {
            if let Err(violation) = quadrature.validate() {
                return Err(Report::new(violation).wrap_err(format!("Invalid quadrature for element {}", element_index)));
            }
            let last = offsets[offsets.len() - 1];
            offsets.push(last + quadrature.num_points());
        }
        Ok(Self {
            quadratures,
            offsets,
            fields: FxHashMap::default(),
        })
    }

    pub fn quadratures(&self) -> &[ElementQuadrature<T>] {
        &self.quadratures
    }

    pub fn total_num_points(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Inserts (or replaces) the values of an eigenstrain in the given state.
    ///
    /// `element_values` must contain exactly one vector per element, each with one tensor per
    /// quadrature point of that element.
    pub fn insert_eigenstrain(
        &mut self,
        name: impl Into<String>,
        state: EigenstrainState,
        element_values: impl IntoIterator<Item = Vec<SymmetricTensor3<T>>>,
    ) -> eyre::Result<()> {
        let name = name.into();
        let mut flat = Vec::with_capacity(self.total_num_points());
        let mut num_elements = 0;
        for (element_index, values) in element_values.into_iter().enumerate() {
            let expected = self
                .quadratures
                .get(element_index)
                .map(ElementQuadrature::num_points)
                .ok_or_else(|| {
                    eyre!(
                        "Eigenstrain \"{}\" has values for more than {} elements",
                        name,
                        self.quadratures.len()
                    )
                })?;
            if values.len() != expected {
                let violation = ContractViolation::LengthMismatch {
                    field: name.clone(),
                    expected,
                    actual: values.len(),
                };
                return Err(Report::new(violation).wrap_err(format!("Invalid data for element {}", element_index)));
            }
            flat.extend(values);
            num_elements += 1;
        }
        if num_elements != self.quadratures.len() {
            bail!(
                "Eigenstrain \"{}\" has values for {} elements, but there are {} elements",
                name,
                num_elements,
                self.quadratures.len()
            );
        }

        let field = self.fields.entry(name).or_insert(TabulatedField {
            current: None,
            old: None,
        });
        match state {
            EigenstrainState::Current => field.current = Some(flat),
            EigenstrainState::Old => field.old = Some(flat),
        }
        Ok(())
    }

    fn tabulated_values(&self, name: &str, state: EigenstrainState) -> Option<&[SymmetricTensor3<T>]> {
        let field = self.fields.get(name)?;
        match state {
            EigenstrainState::Current => field.current.as_deref(),
            EigenstrainState::Old => field.old.as_deref(),
        }
    }
}

impl<T: Real> EigenstrainDataSource<T> for TabulatedEigenstrainData<T> {
    fn num_elements(&self) -> usize {
        self.quadratures.len()
    }

    fn element_quadrature_size(&self, element_index: usize) -> usize {
        self.quadratures[element_index].num_points()
    }

    fn populate_element_quadrature(&self, element_index: usize, quadrature: &mut ElementQuadrature<T>) {
        let source = &self.quadratures[element_index];
        quadrature.clear();
        for (p, &jxw, &coord) in izip!(source.points(), source.jxw(), source.coord()) {
            quadrature.push(*p, jxw, coord);
        }
    }

    fn has_eigenstrain(&self, name: &str, state: EigenstrainState) -> bool {
        self.tabulated_values(name, state).is_some()
    }

    fn populate_element_eigenstrain(
        &self,
        element_index: usize,
        name: &str,
        state: EigenstrainState,
        values: &mut [SymmetricTensor3<T>],
    ) {
        let tabulated = self
            .tabulated_values(name, state)
            .unwrap_or_else(|| panic!("Eigenstrain \"{}\" ({:?}) is not tabulated", name, state));
        let begin = self.offsets[element_index];
        let end = self.offsets[element_index + 1];
        values.copy_from_slice(&tabulated[begin..end]);
    }
}

/// Reduced eigenstrain values at the quadrature points of all elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedEigenstrainField<T: Scalar> {
    offsets: Vec<usize>,
    values: Vec<SymmetricTensor3<T>>,
}

impl<T: Real> ReducedEigenstrainField<T> {
    /// A zero-initialized field with the given number of quadrature points per element.
    pub fn zeros_from_element_sizes(sizes: impl IntoIterator<Item = usize>) -> Self {
        let mut offsets = vec![0];
        for size in sizes {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + size);
        }
        let total = offsets[offsets.len() - 1];
        Self {
            offsets,
            values: vec![SymmetricTensor3::zeros(); total],
        }
    }

    /// A zero-initialized field matching the elements of the data source.
    ///
    /// This is the state of the output before any element has been evaluated.
    pub fn zeros_for<Source>(source: &Source) -> Self
    where
        Source: ?Sized + EigenstrainDataSource<T>,
    {
        Self::zeros_from_element_sizes((0..source.num_elements()).map(|i| source.element_quadrature_size(i)))
    }

    pub fn num_elements(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn element_values(&self, element_index: usize) -> &[SymmetricTensor3<T>] {
        &self.values[self.offsets[element_index]..self.offsets[element_index + 1]]
    }

    pub fn element_values_mut(&mut self, element_index: usize) -> &mut [SymmetricTensor3<T>] {
        &mut self.values[self.offsets[element_index]..self.offsets[element_index + 1]]
    }

    /// All values, ordered by element and then by quadrature point.
    pub fn values(&self) -> &[SymmetricTensor3<T>] {
        &self.values
    }

    fn element_slices_mut(&mut self) -> Vec<&mut [SymmetricTensor3<T>]> {
        let mut slices = Vec::with_capacity(self.num_elements());
        let mut remaining = self.values.as_mut_slice();
        for window in self.offsets.windows(2) {
            let (head, tail) = std::mem::take(&mut remaining).split_at_mut(window[1] - window[0]);
            slices.push(head);
            remaining = tail;
        }
        slices
    }
}

struct SourceWorkspace<T: Scalar> {
    sample: ElementSample<T>,
    quadrature: ElementQuadrature<T>,
}

impl<T: Real> Default for SourceWorkspace<T> {
    fn default() -> Self {
        Self {
            sample: ElementSample::default(),
            quadrature: ElementQuadrature::default(),
        }
    }
}

define_thread_local_workspace!(SOURCE_WORKSPACE);

impl EigenstrainReducer {
    fn check_source<T, Source>(&self, source: &Source, field: &ReducedEigenstrainField<T>) -> eyre::Result<()>
    where
        T: Real,
        Source: ?Sized + EigenstrainDataSource<T>,
    {
        let incremental = self.settings().accumulation == AccumulationMode::Incremental;
        for name in self.input_property_names() {
            if !source.has_eigenstrain(name, EigenstrainState::Current) {
                return Err(ContractViolation::UnknownField(name.clone()).into());
            }
            if incremental && !source.has_eigenstrain(name, EigenstrainState::Old) {
                return Err(ContractViolation::MissingOldState { field: name.clone() }.into());
            }
        }

        if field.num_elements() != source.num_elements() {
            bail!(
                "Output field has {} elements, but the data source has {}",
                field.num_elements(),
                source.num_elements()
            );
        }
        for i in 0..source.num_elements() {
            let expected = source.element_quadrature_size(i);
            let actual = field.element_values(i).len();
            if actual != expected {
                bail!(
                    "Output field has {} quadrature points for element {}, but the data source has {}",
                    actual,
                    i,
                    expected
                );
            }
        }
        Ok(())
    }

    fn compute_element_from_source<T, Source>(
        &self,
        element_index: usize,
        source: &Source,
        output: &mut [SymmetricTensor3<T>],
    ) -> Result<(), ReductionError>
    where
        T: Real,
        Source: ?Sized + EigenstrainDataSource<T>,
    {
        let incremental = self.settings().accumulation == AccumulationMode::Incremental;
        with_thread_local_workspace(&SOURCE_WORKSPACE, |ws: &mut SourceWorkspace<T>| {
            source.populate_element_quadrature(element_index, &mut ws.quadrature);
            let n = ws.quadrature.num_points();

            let names = self.input_property_names();
            ws.sample.reset_with_names(names);
            for (field, name) in izip!(ws.sample.fields_mut(), names) {
                let current = field.prepare_state_mut(EigenstrainState::Current, n);
                source.populate_element_eigenstrain(element_index, name, EigenstrainState::Current, current);
                if incremental {
                    let old = field.prepare_state_mut(EigenstrainState::Old, n);
                    source.populate_element_eigenstrain(element_index, name, EigenstrainState::Old, old);
                }
            }

            self.compute_element_into(element_index, &ws.sample, &ws.quadrature, output)
                .map(|_| ())
        })
    }

    /// Computes the reduced eigenstrain of every element of the data source.
    ///
    /// Fails if the source does not provide the required eigenstrains, if the output field does
    /// not match the layout of the source, or if the reduction of an element fails. In the latter
    /// case the error is a [`ReductionError`] for the first failing element, which can be
    /// recovered with [`eyre::Report::downcast_ref`]. Elements before the failing element have
    /// been written to the output.
    pub fn reduce_all_into<T, Source>(
        &self,
        field: &mut ReducedEigenstrainField<T>,
        source: &Source,
    ) -> eyre::Result<()>
    where
        T: Real,
        Source: ?Sized + EigenstrainDataSource<T>,
    {
        self.check_source(source, field)?;
        for (element_index, output) in field.element_slices_mut().into_iter().enumerate() {
            self.compute_element_from_source(element_index, source, output)?;
        }
        debug!(
            "Computed {} for {} elements",
            self.output_property_name(),
            source.num_elements()
        );
        Ok(())
    }

    /// Parallel version of [`reduce_all_into`](Self::reduce_all_into).
    ///
    /// Elements are processed independently with `rayon`. Every element is attempted, and if any
    /// of them fail, the error of the failing element with the lowest index is returned.
    pub fn par_reduce_all_into<T, Source>(
        &self,
        field: &mut ReducedEigenstrainField<T>,
        source: &Source,
    ) -> eyre::Result<()>
    where
        T: Real,
        Source: ?Sized + Sync + EigenstrainDataSource<T>,
    {
        self.check_source(source, field)?;
        let results: Vec<Result<(), ReductionError>> = field
            .element_slices_mut()
            .into_par_iter()
            .enumerate()
            .map(|(element_index, output)| self.compute_element_from_source(element_index, source, output))
            .collect();
        results.into_iter().collect::<Result<(), _>>()?;
        debug!(
            "Computed {} for {} elements in parallel",
            self.output_property_name(),
            source.num_elements()
        );
        Ok(())
    }
}
