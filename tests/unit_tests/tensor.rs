use fenris_eigenstrain::tensor::{SymmetricTensor3, TensorComponent};
use matrixcompare::assert_matrix_eq;
use nalgebra::{Matrix3, Vector6};
use proptest::prelude::*;

#[test]
fn components_are_stored_in_voigt_order() {
    let tensor = SymmetricTensor3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    assert_eq!(tensor.components(), &Vector6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));

    #[rustfmt::skip]
    let expected_matrix = Matrix3::new(1.0, 6.0, 5.0,
                                       6.0, 2.0, 4.0,
                                       5.0, 4.0, 3.0);
    assert_matrix_eq!(tensor.to_matrix(), expected_matrix);
}

#[test]
fn component_positions_are_consistent_with_matrix() {
    let tensor = SymmetricTensor3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    let matrix = tensor.to_matrix();
    for component in TensorComponent::ALL {
        let (i, j) = component.matrix_position();
        assert_eq!(matrix[(i, j)], tensor.component(component));
        assert_eq!(matrix[(j, i)], tensor.component(component));
        assert_eq!(TensorComponent::from_index(component.index()), Some(component));
    }
    assert_eq!(TensorComponent::from_index(6), None);
}

#[test]
fn from_matrix_takes_symmetric_part() {
    #[rustfmt::skip]
    let matrix = Matrix3::new(1.0, 2.0, 3.0,
                              4.0, 5.0, 6.0,
                              7.0, 8.0, 9.0);
    let tensor = SymmetricTensor3::from_matrix(&matrix);
    assert_eq!(tensor, SymmetricTensor3::new(1.0, 5.0, 9.0, 7.0, 5.0, 3.0));
    assert_matrix_eq!(tensor.to_matrix(), matrix.symmetric_part());
    assert_eq!(tensor.trace(), 15.0);
}

#[test]
fn arithmetic() {
    let a = SymmetricTensor3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    let b = SymmetricTensor3::from_diagonal_element(1.0);

    assert_eq!(a + b, SymmetricTensor3::new(2.0, 3.0, 4.0, 4.0, 5.0, 6.0));
    assert_eq!(a - b, SymmetricTensor3::new(0.0, 1.0, 2.0, 4.0, 5.0, 6.0));
    assert_eq!(a * 2.0, SymmetricTensor3::new(2.0, 4.0, 6.0, 8.0, 10.0, 12.0));
    assert_eq!(a / 2.0, SymmetricTensor3::new(0.5, 1.0, 1.5, 2.0, 2.5, 3.0));
    assert_eq!(-b, SymmetricTensor3::from_diagonal_element(-1.0));

    let mut c = a;
    c += &b;
    c -= a;
    assert_eq!(c, b);
    c *= 3.0;
    c /= 3.0;
    assert_eq!(c, b);
    c.fill_zero();
    assert_eq!(c, SymmetricTensor3::default());
}

#[test]
fn component_display() {
    let names: Vec<_> = TensorComponent::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["xx", "yy", "zz", "yz", "xz", "xy"]);
}

proptest! {
    #[test]
    fn matrix_conversion_preserves_tensor(tensor in any::<SymmetricTensor3<f64>>()) {
        let matrix: Matrix3<f64> = tensor.into();
        prop_assert_eq!(matrix, matrix.transpose());
        prop_assert_eq!(SymmetricTensor3::from(matrix), tensor);
    }
}
