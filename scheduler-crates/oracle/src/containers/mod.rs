//! Typed-index containers for the model and the exam registry.
mod keyed_vec;

pub use keyed_vec::*;
