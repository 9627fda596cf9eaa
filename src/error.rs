use crate::{DType, Shape};

/// Everything that can go wrong inside the container.
///
/// Errors are raised synchronously at the point of violation and never
/// logged internally; recovery is the caller's decision.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ArrayError {
    #[error("Expected {rank} indices, got {actual}.")]
    IndexArity { actual: usize, rank: usize },
    #[error("Index {index} is out of bounds for axis {axis} with size {size}.")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },
    #[error("Axis {axis} is out of range for rank {rank}.")]
    AxisOutOfRange { axis: usize, rank: usize },
    #[error("All dimensions must be greater than 0.")]
    ZeroDim,
    #[error("Cannot reshape {numel} elements into {requested:?}.")]
    ReshapeMismatch { requested: Shape, numel: usize },
    #[error("Expected {expected} elements for {shape:?}, got {actual}.")]
    LengthMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },
    #[error("Shape mismatch: {lhs:?} != {rhs:?}.")]
    ShapeMismatch { lhs: Shape, rhs: Shape },
    #[error("Element count or byte size overflows usize.")]
    Overflow,
    #[error("The array has already been initialized.")]
    AlreadyInitialized,
    #[error("The array has been disposed.")]
    Disposed,
    #[error("No data buffer is bound to this array.")]
    NoBuffer,
    #[error("No elementwise kernel binding for {0:?}.")]
    UnsupportedDType(DType),
}
