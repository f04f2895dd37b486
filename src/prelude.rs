//! Reexports the traits you usually need to work with this crate.
//!
//! This is mostly useful to get the methods of [`Vertex`] and [`Element`]
//! into scope:
//!
//! ```
//! use plyvert::prelude::*;
//! ```

pub use crate::{
    io::Primitive,
    math::Real,
    prop::Element,
    vertex::Vertex,
};
