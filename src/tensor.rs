//! Symmetric rank-2 tensors in three dimensions.
use crate::Real;
use nalgebra::{Matrix3, Scalar, Vector6};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// One of the six independent components of a symmetric 3x3 tensor.
///
/// The components are ordered as `xx, yy, zz, yz, xz, xy`, which is also the order of the
/// underlying storage of [`SymmetricTensor3`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TensorComponent {
    XX,
    YY,
    ZZ,
    YZ,
    XZ,
    XY,
}

impl TensorComponent {
    /// All components in storage order.
    pub const ALL: [TensorComponent; 6] = [Self::XX, Self::YY, Self::ZZ, Self::YZ, Self::XZ, Self::XY];

    /// The storage index of the component.
    pub fn index(&self) -> usize {
        match self {
            Self::XX => 0,
            Self::YY => 1,
            Self::ZZ => 2,
            Self::YZ => 3,
            Self::XZ => 4,
            Self::XY => 5,
        }
    }

    /// The component with the given storage index, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The `(row, column)` position of the component in the upper triangle of the full matrix.
    pub fn matrix_position(&self) -> (usize, usize) {
        match self {
            Self::XX => (0, 0),
            Self::YY => (1, 1),
            Self::ZZ => (2, 2),
            Self::YZ => (1, 2),
            Self::XZ => (0, 2),
            Self::XY => (0, 1),
        }
    }
}

impl Display for TensorComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::XX => "xx",
            Self::YY => "yy",
            Self::ZZ => "zz",
            Self::YZ => "yz",
            Self::XZ => "xz",
            Self::XY => "xy",
        };
        write!(f, "{}", name)
    }
}

/// A symmetric 3x3 tensor stored by its six independent components.
///
/// Symmetry is structural: only the components `xx, yy, zz, yz, xz, xy` are stored, so there is
/// no way to construct a non-symmetric value. Full matrices can be obtained with
/// [`to_matrix`](Self::to_matrix).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Scalar + Serialize", deserialize = "T: Scalar + Deserialize<'de>"))]
pub struct SymmetricTensor3<T: Scalar> {
    components: Vector6<T>,
}

impl<T: Real> Default for SymmetricTensor3<T> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Scalar> SymmetricTensor3<T> {
    /// Constructs a tensor from its components in storage order `xx, yy, zz, yz, xz, xy`.
    pub fn from_components(components: Vector6<T>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &Vector6<T> {
        &self.components
    }

    pub fn into_components(self) -> Vector6<T> {
        self.components
    }

    pub fn component(&self, component: TensorComponent) -> T {
        self.components[component.index()].clone()
    }

    pub fn set_component(&mut self, component: TensorComponent, value: T) {
        self.components[component.index()] = value;
    }
}

impl<T: Real> SymmetricTensor3<T> {
    pub fn new(xx: T, yy: T, zz: T, yz: T, xz: T, xy: T) -> Self {
        Self::from_components(Vector6::new(xx, yy, zz, yz, xz, xy))
    }

    pub fn zeros() -> Self {
        Self::from_components(Vector6::zeros())
    }

    /// A tensor with the given value on the diagonal and zero shear components.
    pub fn from_diagonal_element(value: T) -> Self {
        let zero = T::zero();
        Self::new(value, value, value, zero, zero, zero)
    }

    /// Constructs a tensor from the symmetric part $\frac{1}{2}(\vec A + \vec A^T)$ of a full matrix.
    pub fn from_matrix(matrix: &Matrix3<T>) -> Self {
        let sym = matrix.symmetric_part();
        Self::new(
            sym[(0, 0)],
            sym[(1, 1)],
            sym[(2, 2)],
            sym[(1, 2)],
            sym[(0, 2)],
            sym[(0, 1)],
        )
    }

    pub fn to_matrix(&self) -> Matrix3<T> {
        let c = &self.components;
        Matrix3::new(c[0], c[5], c[4], c[5], c[1], c[3], c[4], c[3], c[2])
    }

    pub fn trace(&self) -> T {
        self.components[0] + self.components[1] + self.components[2]
    }

    pub fn fill_zero(&mut self) {
        self.components.fill(T::zero());
    }

    pub fn is_finite(&self) -> bool {
        self.components.iter().all(|c| c.is_finite())
    }
}

impl<T: Real> Add for SymmetricTensor3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_components(self.components + rhs.components)
    }
}

impl<'a, T: Real> Add<&'a SymmetricTensor3<T>> for SymmetricTensor3<T> {
    type Output = Self;

    fn add(self, rhs: &'a SymmetricTensor3<T>) -> Self::Output {
        Self::from_components(self.components + rhs.components)
    }
}

impl<T: Real> AddAssign for SymmetricTensor3<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.components += rhs.components;
    }
}

impl<'a, T: Real> AddAssign<&'a SymmetricTensor3<T>> for SymmetricTensor3<T> {
    fn add_assign(&mut self, rhs: &'a SymmetricTensor3<T>) {
        self.components += &rhs.components;
    }
}

impl<T: Real> Sub for SymmetricTensor3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_components(self.components - rhs.components)
    }
}

impl<'a, T: Real> Sub<&'a SymmetricTensor3<T>> for SymmetricTensor3<T> {
    type Output = Self;

    fn sub(self, rhs: &'a SymmetricTensor3<T>) -> Self::Output {
        Self::from_components(self.components - rhs.components)
    }
}

impl<T: Real> SubAssign for SymmetricTensor3<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.components -= rhs.components;
    }
}

impl<'a, T: Real> SubAssign<&'a SymmetricTensor3<T>> for SymmetricTensor3<T> {
    fn sub_assign(&mut self, rhs: &'a SymmetricTensor3<T>) {
        self.components -= &rhs.components;
    }
}

impl<T: Real> Mul<T> for SymmetricTensor3<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self::Output {
        Self::from_components(self.components * rhs)
    }
}

impl<T: Real> MulAssign<T> for SymmetricTensor3<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.components *= rhs;
    }
}

impl<T: Real> Div<T> for SymmetricTensor3<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self::Output {
        Self::from_components(self.components / rhs)
    }
}

impl<T: Real> DivAssign<T> for SymmetricTensor3<T> {
    fn div_assign(&mut self, rhs: T) {
        self.components /= rhs;
    }
}

impl<T: Real> Neg for SymmetricTensor3<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_components(-self.components)
    }
}

impl<T: Real> From<Matrix3<T>> for SymmetricTensor3<T> {
    fn from(matrix: Matrix3<T>) -> Self {
        Self::from_matrix(&matrix)
    }
}

impl<T: Real> From<SymmetricTensor3<T>> for Matrix3<T> {
    fn from(tensor: SymmetricTensor3<T>) -> Self {
        tensor.to_matrix()
    }
}
