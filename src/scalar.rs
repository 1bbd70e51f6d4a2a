//! Coefficient bound shared by the builder and its backends.

use core::fmt::Debug;
use num_traits::Float;

/// Floating-point coefficient type a matrix can store.
///
/// Blanket-implemented for every `Float` that can cross threads, which in
/// practice means `f32` and `f64`.
pub trait Scalar: Float + Debug + Send + Sync + 'static {}

impl<T> Scalar for T where T: Float + Debug + Send + Sync + 'static {}
