//! Abstractions over numerical types.

use std::{
    fmt::Debug,
};

use cgmath::BaseFloat;
use num_traits::{Num, NumAssign};

use crate::io::Primitive;


/// Primitive numerical types, like `f64` and `u32`.
///
/// This trait is automatically implemented for all types that satisfy the
/// super-trait constraints.
pub trait PrimitiveNum: 'static + Copy + Debug + Num + PartialOrd + NumAssign {}

impl<T> PrimitiveNum for T
where
    T: 'static + Copy + Debug + Num + PartialOrd + NumAssign,
{}


/// The floating point types vertex records can be instantiated with: `f32`
/// and `f64`.
///
/// The in-memory type of every position, normal, color and scalar field of a
/// vertex record is `Real`. The property tables of a record are chosen based
/// on `<Real as Primitive>::TY`, so `PointVertex<f32>` reads and writes
/// `float` properties while `PointVertex<f64>` uses `double`.
pub trait Real: Primitive + BaseFloat {}

impl Real for f32 {}
impl Real for f64 {}
