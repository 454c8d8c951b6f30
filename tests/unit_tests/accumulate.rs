use fenris_eigenstrain::accumulate::{accumulate_eigenstrains, accumulate_eigenstrains_into};
use fenris_eigenstrain::error::ContractViolation;
use fenris_eigenstrain::sample::{EigenstrainField, EigenstrainState, ElementSample};
use fenris_eigenstrain::settings::AccumulationMode;
use fenris_eigenstrain::tensor::SymmetricTensor3;
use proptest::collection::vec;
use proptest::prelude::*;
use util::assert_panics;

fn tensor(value: f64) -> SymmetricTensor3<f64> {
    SymmetricTensor3::new(value, 2.0 * value, 3.0 * value, -value, 0.5 * value, 0.0)
}

fn two_field_sample() -> ElementSample<f64> {
    let thermal = EigenstrainField::new("thermal", vec![tensor(1.0), tensor(2.0)]).with_old(vec![tensor(0.5), tensor(0.5)]);
    let phase = EigenstrainField::new("phase", vec![tensor(4.0), tensor(-1.0)]).with_old(vec![tensor(1.0), tensor(0.0)]);
    ElementSample::from_fields(vec![thermal, phase])
}

#[test]
fn total_accumulation_sums_current_values() {
    let combined = accumulate_eigenstrains(&two_field_sample(), AccumulationMode::Total);
    assert_eq!(combined, vec![tensor(5.0), tensor(1.0)]);
}

#[test]
fn incremental_accumulation_sums_increments() {
    let combined = accumulate_eigenstrains(&two_field_sample(), AccumulationMode::Incremental);
    assert_eq!(combined, vec![tensor(3.5), tensor(0.5)]);
}

#[test]
fn accumulation_resizes_output_buffer() {
    let mut output = vec![tensor(100.0); 5];
    accumulate_eigenstrains_into(&mut output, &two_field_sample(), AccumulationMode::Total);
    assert_eq!(output, vec![tensor(5.0), tensor(1.0)]);
}

#[test]
fn sample_field_access() {
    let sample = two_field_sample();
    assert_eq!(sample.num_points(), Some(2));
    let phase = sample.field("phase").unwrap();
    assert_eq!(phase.name(), "phase");
    assert_eq!(phase.values(EigenstrainState::Current), Some(&[tensor(4.0), tensor(-1.0)][..]));
    assert_eq!(phase.values(EigenstrainState::Old), Some(&[tensor(1.0), tensor(0.0)][..]));
    assert!(sample.field("mechanical").is_none());
}

#[test]
fn validation_of_samples() {
    assert_eq!(
        ElementSample::<f64>::default().validate(AccumulationMode::Total),
        Err(ContractViolation::NoInputFields)
    );

    let mut sample = two_field_sample();
    assert_eq!(sample.validate(AccumulationMode::Incremental), Ok(2));

    sample.push_field(EigenstrainField::new("extra", vec![tensor(1.0)]));
    assert_eq!(
        sample.validate(AccumulationMode::Total),
        Err(ContractViolation::LengthMismatch {
            field: "extra".to_string(),
            expected: 2,
            actual: 1
        })
    );

    let mut sample = two_field_sample();
    sample.push_field(EigenstrainField::new("extra", vec![tensor(1.0), tensor(1.0)]));
    assert_eq!(sample.validate(AccumulationMode::Total), Ok(2));
    assert_eq!(
        sample.validate(AccumulationMode::Incremental),
        Err(ContractViolation::MissingOldState {
            field: "extra".to_string()
        })
    );

    let mut sample = two_field_sample();
    sample.push_field(EigenstrainField::new("thermal", vec![tensor(1.0), tensor(1.0)]));
    assert_eq!(
        sample.validate(AccumulationMode::Total),
        Err(ContractViolation::DuplicateField("thermal".to_string()))
    );
}

#[test]
fn validation_of_names() {
    let sample = two_field_sample();
    assert_eq!(sample.validate_names(&["phase", "thermal"]), Ok(()));
    assert_eq!(
        sample.validate_names(&["thermal"]),
        Err(ContractViolation::UnknownField("phase".to_string()))
    );
    assert_eq!(
        sample.validate_names(&["thermal", "phase", "creep"]),
        Err(ContractViolation::UnknownField("creep".to_string()))
    );
}

#[test]
fn invalid_samples_panic() {
    let mismatched = ElementSample::from_fields(vec![
        EigenstrainField::new("a", vec![tensor(1.0), tensor(2.0)]),
        EigenstrainField::new("b", vec![tensor(1.0)]),
    ]);
    assert_panics!(accumulate_eigenstrains(&mismatched, AccumulationMode::Total));

    let without_old = ElementSample::from_fields(vec![EigenstrainField::new("a", vec![tensor(1.0)])]);
    assert_panics!(accumulate_eigenstrains(&without_old, AccumulationMode::Incremental));

    let mismatched_old =
        ElementSample::from_fields(vec![EigenstrainField::new("a", vec![tensor(1.0)]).with_old(vec![])]);
    assert_panics!(accumulate_eigenstrains(&mismatched_old, AccumulationMode::Incremental));
}

proptest! {
    #[test]
    fn incremental_with_zero_old_state_equals_total(
        fields in vec(vec(any::<SymmetricTensor3<f64>>(), 4), 1..4)
    ) {
        let fields: Vec<_> = fields
            .into_iter()
            .enumerate()
            .map(|(i, values)| {
                let zeros = vec![SymmetricTensor3::zeros(); values.len()];
                EigenstrainField::new(format!("eigenstrain_{}", i), values).with_old(zeros)
            })
            .collect();
        let sample = ElementSample::from_fields(fields);

        let total = accumulate_eigenstrains(&sample, AccumulationMode::Total);
        let incremental = accumulate_eigenstrains(&sample, AccumulationMode::Incremental);
        prop_assert_eq!(total, incremental);
    }
}
