use num_traits::NumOps;

use crate::Element;

/// Elementwise binary operations the kernel boundary understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Pure elementwise collaborator: reads two buffers of `n` elements and
/// writes `n` results into a third. No shared state and no error channel;
/// the caller guarantees all three slices have the same length.
pub trait ElementwiseKernel<T: Element> {
    fn apply(&self, op: BinaryOp, lhs: &[T], rhs: &[T], dst: &mut [T]);
}

#[inline]
pub(crate) fn binary_map<T: Element>(lhs: &[T], rhs: &[T], dst: &mut [T], f: fn(T, T) -> T) {
    assert_eq!(lhs.len(), dst.len());
    assert_eq!(rhs.len(), dst.len());
    for ((l, r), d) in lhs
        .iter()
        .copied()
        .zip(rhs.iter().copied())
        .zip(dst.iter_mut())
    {
        *d = f(l, r);
    }
}

/// Default in-process binding. An accelerated implementation can be swapped
/// in through [`crate::NdArray::combine_with`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopKernel;

impl<T: Element + NumOps> ElementwiseKernel<T> for LoopKernel {
    fn apply(&self, op: BinaryOp, lhs: &[T], rhs: &[T], dst: &mut [T]) {
        match op {
            BinaryOp::Add => binary_map(lhs, rhs, dst, |l, r| l + r),
            BinaryOp::Sub => binary_map(lhs, rhs, dst, |l, r| l - r),
            BinaryOp::Mul => binary_map(lhs, rhs, dst, |l, r| l * r),
            BinaryOp::Div => binary_map(lhs, rhs, dst, |l, r| l / r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_kernel_ops() {
        let lhs = [6.0f64, 8.0];
        let rhs = [2.0f64, 4.0];
        let mut dst = [0.0f64; 2];
        LoopKernel.apply(BinaryOp::Add, &lhs, &rhs, &mut dst);
        assert_eq!(dst, [8.0, 12.0]);
        LoopKernel.apply(BinaryOp::Sub, &lhs, &rhs, &mut dst);
        assert_eq!(dst, [4.0, 4.0]);
        LoopKernel.apply(BinaryOp::Mul, &lhs, &rhs, &mut dst);
        assert_eq!(dst, [12.0, 32.0]);
        LoopKernel.apply(BinaryOp::Div, &lhs, &rhs, &mut dst);
        assert_eq!(dst, [3.0, 2.0]);
    }

    #[test]
    fn loop_kernel_on_integers() {
        let lhs = [1i32, 2, 3];
        let rhs = [10i32, 20, 30];
        let mut dst = [0i32; 3];
        LoopKernel.apply(BinaryOp::Add, &lhs, &rhs, &mut dst);
        assert_eq!(dst, [11, 22, 33]);
    }
}
