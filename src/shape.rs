use crate::{ArrayError, RVec};

/// Ordered per-axis extents. The empty shape denotes the empty array.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(RVec<usize>);

impl Shape {
    pub fn new(shape: RVec<usize>) -> Self {
        Self(shape)
    }

    pub fn inner(&self) -> &RVec<usize> {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&usize> {
        self.0.get(index)
    }

    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// Element count with overflow checking; zero extents are rejected.
    ///
    /// The empty shape is valid and holds zero elements.
    pub fn checked_numel(&self) -> Result<usize, ArrayError> {
        if self.0.is_empty() {
            return Ok(0);
        }
        let mut numel = 1usize;
        for &dim in self.0.iter() {
            if dim == 0 {
                return Err(ArrayError::ZeroDim);
            }
            numel = numel.checked_mul(dim).ok_or(ArrayError::Overflow)?;
        }
        Ok(numel)
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rank(&self) -> usize {
        self.len()
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut shape = format!("[{}", self.0.first().unwrap_or(&0));
        for dim in self.0.iter().skip(1) {
            shape.push_str(&format!("x{}", dim));
        }
        write!(f, "{}]", shape)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Shape {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl From<Vec<usize>> for Shape {
    fn from(shape: Vec<usize>) -> Self {
        Self(shape.into())
    }
}

impl From<&[usize]> for Shape {
    fn from(slice: &[usize]) -> Self {
        Shape(slice.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;
    use proptest::prelude::*;

    #[test]
    fn checked_numel_rejects_zero_dim() {
        assert_eq!(shape![3, 0, 2].checked_numel(), Err(ArrayError::ZeroDim));
    }

    #[test]
    fn checked_numel_rejects_overflow() {
        let shape = shape![usize::MAX, 2];
        assert_eq!(shape.checked_numel(), Err(ArrayError::Overflow));
    }

    #[test]
    fn empty_shape_is_valid() {
        let shape = shape![];
        assert_eq!(shape.checked_numel(), Ok(0));
        assert_eq!(shape.rank(), 0);
    }

    proptest! {
        #[test]
        fn checked_numel_matches_product(dims in proptest::collection::vec(1usize..16, 0..5)) {
            let shape = Shape::from(dims.clone());
            let expected: usize = dims.iter().product::<usize>() * (!dims.is_empty() as usize);
            prop_assert_eq!(shape.checked_numel().unwrap(), expected);
        }
    }
}
