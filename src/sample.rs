//! Input eigenstrain data of a single element.
use crate::error::ContractViolation;
use crate::settings::AccumulationMode;
use crate::tensor::SymmetricTensor3;
use crate::Real;
use nalgebra::Scalar;

/// Which state of an eigenstrain is requested.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EigenstrainState {
    Current,
    /// The value at the end of the previous time step.
    Old,
}

/// The values of one named eigenstrain at the quadrature points of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenstrainField<T: Scalar> {
    name: String,
    current: Vec<SymmetricTensor3<T>>,
    old: Option<Vec<SymmetricTensor3<T>>>,
}

impl<T: Real> EigenstrainField<T> {
    pub fn new(name: impl Into<String>, current: Vec<SymmetricTensor3<T>>) -> Self {
        Self {
            name: name.into(),
            current,
            old: None,
        }
    }

    pub fn with_old(self, old: Vec<SymmetricTensor3<T>>) -> Self {
        Self { old: Some(old), ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> &[SymmetricTensor3<T>] {
        &self.current
    }

    pub fn old(&self) -> Option<&[SymmetricTensor3<T>]> {
        self.old.as_deref()
    }

    pub fn values(&self, state: EigenstrainState) -> Option<&[SymmetricTensor3<T>]> {
        match state {
            EigenstrainState::Current => Some(self.current()),
            EigenstrainState::Old => self.old(),
        }
    }

    /// Resizes the buffer of the given state to `len` zero tensors and returns it for population.
    pub(crate) fn prepare_state_mut(&mut self, state: EigenstrainState, len: usize) -> &mut [SymmetricTensor3<T>] {
        let buffer = match state {
            EigenstrainState::Current => &mut self.current,
            EigenstrainState::Old => self.old.get_or_insert_with(Vec::new),
        };
        buffer.clear();
        buffer.resize(len, SymmetricTensor3::zeros());
        buffer
    }

    pub(crate) fn clear_old(&mut self) {
        self.old = None;
    }
}

/// All input eigenstrains of a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSample<T: Scalar> {
    fields: Vec<EigenstrainField<T>>,
}

impl<T: Scalar> Default for ElementSample<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T: Real> ElementSample<T> {
    pub fn from_fields(fields: Vec<EigenstrainField<T>>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[EigenstrainField<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&EigenstrainField<T>> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn push_field(&mut self, field: EigenstrainField<T>) {
        self.fields.push(field);
    }

    /// Number of quadrature points, as given by the first field.
    pub fn num_points(&self) -> Option<usize> {
        self.fields.first().map(|field| field.current.len())
    }

    /// Checks that the sample can be accumulated in the given mode.
    ///
    /// Returns the common number of quadrature points of all fields.
    pub fn validate(&self, mode: AccumulationMode) -> Result<usize, ContractViolation> {
        let n = self.num_points().ok_or(ContractViolation::NoInputFields)?;
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|other| other.name == field.name) {
                return Err(ContractViolation::DuplicateField(field.name.clone()));
            }
            let length_mismatch = |actual: usize| ContractViolation::LengthMismatch {
                field: field.name.clone(),
                expected: n,
                actual,
            };
            if field.current.len() != n {
                return Err(length_mismatch(field.current.len()));
            }
            if mode == AccumulationMode::Incremental {
                let old = field.old.as_ref().ok_or_else(|| ContractViolation::MissingOldState {
                    field: field.name.clone(),
                })?;
                if old.len() != n {
                    return Err(length_mismatch(old.len()));
                }
            }
        }
        Ok(n)
    }

    /// Checks that the sample contains exactly the given eigenstrains, in any order.
    pub fn validate_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ContractViolation> {
        for name in names {
            if self.field(name.as_ref()).is_none() {
                return Err(ContractViolation::UnknownField(name.as_ref().to_string()));
            }
        }
        for field in &self.fields {
            if !names.iter().any(|name| name.as_ref() == field.name) {
                return Err(ContractViolation::UnknownField(field.name.clone()));
            }
        }
        Ok(())
    }

    /// Makes the sample hold exactly the given (empty) fields, reusing existing allocations.
    pub(crate) fn reset_with_names<S: AsRef<str>>(&mut self, names: &[S]) {
        self.fields.truncate(names.len());
        for (field, name) in self.fields.iter_mut().zip(names) {
            field.name.clear();
            field.name.push_str(name.as_ref());
            field.current.clear();
            field.clear_old();
        }
        for name in &names[self.fields.len()..] {
            self.fields
                .push(EigenstrainField::new(name.as_ref(), Vec::new()));
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [EigenstrainField<T>] {
        &mut self.fields
    }
}
