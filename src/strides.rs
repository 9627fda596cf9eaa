use crate::{rvec, RVec, Shape};

/// Which axis varies fastest in linear memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum MemoryOrder {
    #[default]
    RowMajor,
    ColumnMajor,
}

/// Element skip counts per axis, derived from a shape under a memory order.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn with_order(shape: &Shape, order: MemoryOrder) -> Self {
        let mut strides = rvec![];
        let mut stride = 1isize;
        match order {
            MemoryOrder::RowMajor => {
                for &size in shape.inner().iter().rev() {
                    strides.push(stride);
                    stride *= size as isize;
                }
                strides.reverse();
            }
            MemoryOrder::ColumnMajor => {
                for &size in shape.inner().iter() {
                    strides.push(stride);
                    stride *= size as isize;
                }
            }
        }
        Self(strides)
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &isize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut strides = format!("[{}", self.0.first().unwrap_or(&0));
        for stride in self.0.iter().skip(1) {
            strides.push_str(&format!("x{}", stride));
        }
        write!(f, "{}]", strides)
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        Self::with_order(shape, MemoryOrder::RowMajor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn row_major_strides() {
        let shape = shape![2, 3, 4];
        let strides = Strides::from(&shape);
        assert_eq!(strides.to_vec(), vec![12, 4, 1]);
        assert_eq!(
            Strides::with_order(&shape![3, 3], MemoryOrder::RowMajor).to_vec(),
            vec![3, 1]
        );
    }

    #[test]
    fn column_major_strides() {
        let shape = shape![2, 3, 4];
        let strides = Strides::with_order(&shape, MemoryOrder::ColumnMajor);
        assert_eq!(strides.to_vec(), vec![1, 2, 6]);
        assert_eq!(
            Strides::with_order(&shape![3, 3], MemoryOrder::ColumnMajor).to_vec(),
            vec![1, 3]
        );
    }

    #[test]
    fn empty_shape_has_no_strides() {
        assert!(Strides::from(&shape![]).is_empty());
    }
}
