//! Reduced-order eigenstrains for finite element quadrature data.
//!
//! Eigenstrains (thermal expansion, phase transformation strains and the like) are usually
//! available as one symmetric tensor per quadrature point. This crate replaces such a per-point
//! field on each element by a *reduced-order* representation: either the volume average over the
//! element, or an affine function of the spatial coordinates fitted by least squares.
//!
//! The per-element pass consists of three stages:
//!
//! 1. [accumulation](crate::accumulate) of the contributing eigenstrain fields into a single
//!    tensor per quadrature point,
//! 2. [reduction](crate::fit) of the accumulated tensors into a [`FitModel`](crate::fit::FitModel),
//! 3. evaluation of the model at the quadrature points of the element.
//!
//! [`EigenstrainReducer`](crate::reducer::EigenstrainReducer) ties the stages together, and the
//! [`assembly`] module runs the pass over every element of a mesh, optionally in parallel.
use nalgebra::RealField;

pub mod accumulate;
pub mod assembly;
pub mod error;
pub mod fit;
pub mod quadrature;
pub mod reducer;
pub mod sample;
pub mod settings;
pub mod tensor;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

/// Real scalar type used throughout the crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
