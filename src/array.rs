use std::alloc::Layout;
use std::cell::RefCell;

use crate::{
    ArrayError, BinaryOp, DType, Element, ElementwiseKernel, LoopKernel, MemoryOrder, RawBuffer,
    Shape, Strides,
};

/// A fixed-shape, strided, multi-dimensional array over contiguous memory.
///
/// The container owns (or adopts) a single contiguous allocation and maps
/// multi-dimensional indices onto it through shape-derived strides.
/// Reshaping never moves data, and switching memory order is a logical
/// reinterpretation of the same buffer.
///
/// Access is single-threaded by contract; the lazily cached strides make the
/// type deliberately `!Sync`.
pub struct NdArray<T: Element> {
    buf: Option<RawBuffer>,
    shape: Shape,
    numel: usize,
    order: MemoryOrder,
    strides: RefCell<Option<Strides>>,
    init_value: Option<T>,
    user_init: bool,
    disposed: bool,
}

impl<T: Element> NdArray<T> {
    /// Allocates a new owned, zero-filled array of the given shape.
    ///
    /// The empty shape yields a valid empty array with no buffer.
    pub fn new(shape: impl Into<Shape>) -> Result<Self, ArrayError> {
        let shape = shape.into();
        let numel = shape.checked_numel()?;
        let buf = if numel == 0 {
            None
        } else {
            let n_bytes = numel
                .checked_mul(std::mem::size_of::<T>())
                .ok_or(ArrayError::Overflow)?;
            Some(RawBuffer::zeroed(n_bytes, std::mem::align_of::<T>())?)
        };
        Ok(Self {
            buf,
            shape,
            numel,
            order: MemoryOrder::RowMajor,
            strides: RefCell::new(None),
            init_value: None,
            user_init: false,
            disposed: false,
        })
    }

    /// Wraps caller-supplied memory of the given shape.
    ///
    /// With `owns_memory == false`, disposal never frees the memory and the
    /// caller remains responsible for it.
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `product(shape)` elements
    /// for the lifetime of the array. When `owns_memory` is true, it must
    /// have been allocated by the global allocator with the layout of
    /// `[T; product(shape)]`.
    pub unsafe fn from_raw(
        owns_memory: bool,
        ptr: *mut T,
        shape: impl Into<Shape>,
    ) -> Result<Self, ArrayError> {
        let shape = shape.into();
        let numel = shape.checked_numel()?;
        let buf = if numel == 0 {
            None
        } else {
            let n_bytes = numel
                .checked_mul(std::mem::size_of::<T>())
                .ok_or(ArrayError::Overflow)?;
            let layout = Layout::from_size_align(n_bytes, std::mem::align_of::<T>())
                .map_err(|_| ArrayError::Overflow)?;
            Some(RawBuffer::from_ptr(ptr as *mut u8, layout, owns_memory))
        };
        Ok(Self {
            buf,
            shape,
            numel,
            order: MemoryOrder::RowMajor,
            strides: RefCell::new(None),
            init_value: None,
            user_init: false,
            disposed: false,
        })
    }

    /// Copy-constructs an owned array from a flat slice in row-major order.
    pub fn from_slice(data: &[T], shape: impl Into<Shape>) -> Result<Self, ArrayError> {
        let shape = shape.into();
        let numel = shape.checked_numel()?;
        if data.len() != numel {
            return Err(ArrayError::LengthMismatch {
                shape,
                expected: numel,
                actual: data.len(),
            });
        }
        let mut array = Self::new(shape)?;
        if numel > 0 {
            array.as_slice_mut()?.copy_from_slice(data);
        }
        Ok(array)
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Total byte size of the logical buffer. Overflow was ruled out at
    /// construction, so this is a plain product.
    pub fn num_bytes(&self) -> usize {
        self.numel * std::mem::size_of::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_none() || self.numel == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn owns_memory(&self) -> bool {
        self.buf.as_ref().map_or(false, RawBuffer::is_owned)
    }

    pub fn dt(&self) -> DType {
        T::dt()
    }

    /// Snapshot of the shape; mutating it never touches the array.
    pub fn shape(&self) -> Shape {
        self.shape.clone()
    }

    pub fn dim(&self, axis: usize) -> Result<usize, ArrayError> {
        self.shape
            .get(axis)
            .copied()
            .ok_or(ArrayError::AxisOutOfRange {
                axis,
                rank: self.rank(),
            })
    }

    /// Reshape without reallocation: the new product must equal the current
    /// element count.
    pub fn set_shape(&mut self, shape: impl Into<Shape>) -> Result<(), ArrayError> {
        let shape = shape.into();
        let numel = shape.checked_numel()?;
        if numel != self.numel {
            return Err(ArrayError::ReshapeMismatch {
                requested: shape,
                numel: self.numel,
            });
        }
        self.strides.replace(None);
        self.shape = shape;
        Ok(())
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// Logical reinterpretation only; the buffer is not rearranged.
    pub fn set_order(&mut self, order: MemoryOrder) {
        self.strides.replace(None);
        self.order = order;
    }

    /// Snapshot of the strides, computed once per shape or order change.
    pub fn strides(&self) -> Strides {
        self.strides
            .borrow_mut()
            .get_or_insert_with(|| Strides::with_order(&self.shape, self.order))
            .clone()
    }

    fn buffer(&self) -> Result<&RawBuffer, ArrayError> {
        if self.disposed {
            return Err(ArrayError::Disposed);
        }
        self.buf.as_ref().ok_or(ArrayError::NoBuffer)
    }

    fn buffer_mut(&mut self) -> Result<&mut RawBuffer, ArrayError> {
        if self.disposed {
            return Err(ArrayError::Disposed);
        }
        self.buf.as_mut().ok_or(ArrayError::NoBuffer)
    }

    pub(crate) fn as_slice(&self) -> Result<&[T], ArrayError> {
        Ok(bytemuck::cast_slice(self.buffer()?.as_bytes()))
    }

    pub(crate) fn as_slice_mut(&mut self) -> Result<&mut [T], ArrayError> {
        Ok(bytemuck::cast_slice_mut(self.buffer_mut()?.as_bytes_mut()))
    }

    fn flatten(&self, indices: &[usize]) -> Result<usize, ArrayError> {
        let rank = self.rank();
        if indices.len() != rank {
            return Err(ArrayError::IndexArity {
                actual: indices.len(),
                rank,
            });
        }
        let strides = self.strides();
        let mut offset = 0isize;
        for (axis, (&index, &size)) in indices.iter().zip(self.shape.iter()).enumerate() {
            if index >= size {
                return Err(ArrayError::IndexOutOfBounds { axis, index, size });
            }
            offset += index as isize * strides[axis];
        }
        Ok(offset as usize)
    }

    pub fn get(&self, indices: &[usize]) -> Result<T, ArrayError> {
        self.buffer()?;
        let offset = self.flatten(indices)?;
        Ok(self.as_slice()?[offset])
    }

    pub fn set(&mut self, indices: &[usize], value: T) -> Result<(), ArrayError> {
        self.buffer()?;
        let offset = self.flatten(indices)?;
        self.as_slice_mut()?[offset] = value;
        Ok(())
    }

    pub fn init_value(&self) -> Option<T> {
        self.init_value
    }

    pub fn is_user_init(&self) -> bool {
        self.user_init
    }

    /// One-shot fill: writes `value` to every element in flat order. A
    /// second call fails once the array has been user-initialized.
    pub fn set_init_value(&mut self, value: T) -> Result<(), ArrayError> {
        self.buffer()?;
        if self.user_init {
            return Err(ArrayError::AlreadyInitialized);
        }
        for slot in self.as_slice_mut()?.iter_mut() {
            *slot = value;
        }
        self.init_value = Some(value);
        self.user_init = true;
        Ok(())
    }

    /// Flat-order copy of the live buffer.
    pub fn to_vec(&self) -> Result<Vec<T>, ArrayError> {
        Ok(self.as_slice()?.to_vec())
    }

    /// Lazy traversal in ascending flat-offset order. Restart by calling
    /// `iter` again.
    pub fn iter(&self) -> Result<Iter<'_, T>, ArrayError> {
        self.buffer()?;
        Ok(Iter {
            array: self,
            pos: 0,
        })
    }

    /// Idempotent teardown: frees the buffer iff this instance owns it,
    /// clears shape and stride state, and marks the array disposed. Adopted
    /// non-owning memory stays with the caller. Dropping an undisposed array
    /// runs the same gated release through [`RawBuffer`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.buf = None;
        self.shape = Shape::default();
        self.strides.replace(None);
        self.numel = 0;
        self.disposed = true;
    }

    fn check_same_shape(&self, rhs: &Self) -> Result<(), ArrayError> {
        if self.shape != rhs.shape {
            return Err(ArrayError::ShapeMismatch {
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        Ok(())
    }

    /// Elementwise combine through an explicit kernel binding. Shapes must
    /// match exactly in rank and every per-axis extent, and both operands
    /// must hold live buffers.
    pub fn combine_with<K>(&self, rhs: &Self, op: BinaryOp, kernel: &K) -> Result<Self, ArrayError>
    where
        K: ElementwiseKernel<T> + ?Sized,
    {
        self.check_same_shape(rhs)?;
        self.buffer()?;
        rhs.buffer()?;
        let mut out = Self::new(self.shape())?;
        kernel.apply(op, self.as_slice()?, rhs.as_slice()?, out.as_slice_mut()?);
        Ok(out)
    }

    /// Elementwise combine through the default kernel binding.
    ///
    /// Only `f64` has a default binding today; every other element type
    /// fails with [`ArrayError::UnsupportedDType`] until further kernels are
    /// wired up.
    pub fn combine(&self, rhs: &Self, op: BinaryOp) -> Result<Self, ArrayError> {
        self.check_same_shape(rhs)?;
        match T::dt() {
            DType::F64 => {
                let lhs: &[f64] = bytemuck::cast_slice(self.buffer()?.as_bytes());
                let rhs: &[f64] = bytemuck::cast_slice(rhs.buffer()?.as_bytes());
                let mut out = Self::new(self.shape())?;
                let dst: &mut [f64] = bytemuck::cast_slice_mut(out.buffer_mut()?.as_bytes_mut());
                LoopKernel.apply(op, lhs, rhs, dst);
                Ok(out)
            }
            dt => Err(ArrayError::UnsupportedDType(dt)),
        }
    }

    pub fn add(&self, rhs: &Self) -> Result<Self, ArrayError> {
        self.combine(rhs, BinaryOp::Add)
    }

    pub fn sub(&self, rhs: &Self) -> Result<Self, ArrayError> {
        self.combine(rhs, BinaryOp::Sub)
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self, ArrayError> {
        self.combine(rhs, BinaryOp::Mul)
    }

    pub fn div(&self, rhs: &Self) -> Result<Self, ArrayError> {
        self.combine(rhs, BinaryOp::Div)
    }
}

impl<T: Element> std::fmt::Debug for NdArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdArray")
            .field("shape", &self.shape)
            .field("order", &self.order)
            .field("dt", &T::dt())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Flat-order element iterator. Every step re-validates that the array still
/// holds a live buffer.
pub struct Iter<'a, T: Element> {
    array: &'a NdArray<T>,
    pos: usize,
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.array.numel {
            return None;
        }
        let data = self.array.as_slice().ok()?;
        let value = data[self.pos];
        self.pos += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.numel.saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<T: Element> ExactSizeIterator for Iter<'_, T> {}
