use half::{bf16, f16};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum DType {
    F16,
    BF16,
    #[default]
    F32,
    F64,
    I32,
    U32,
}

impl DType {
    /// Returns the size of the type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::F32 => 4,
            DType::F64 => 8,
            DType::I32 => 4,
            DType::U32 => 4,
        }
    }
}

/// Fixed-size, bit-copyable element types the container can hold.
pub trait Element:
    Copy + std::fmt::Debug + PartialEq + 'static + num_traits::Zero + Send + Sync + bytemuck::Pod
{
    fn dt() -> DType;
}

macro_rules! map_type {
    ($t:ty, $v:ident) => {
        impl Element for $t {
            fn dt() -> DType {
                DType::$v
            }
        }
    };
}

map_type!(f32, F32);
map_type!(f64, F64);
map_type!(i32, I32);
map_type!(u32, U32);
map_type!(f16, F16);
map_type!(bf16, BF16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtype_sizes_match_rust_types() {
        assert_eq!(DType::F64.size_of(), std::mem::size_of::<f64>());
        assert_eq!(DType::F32.size_of(), std::mem::size_of::<f32>());
        assert_eq!(DType::F16.size_of(), std::mem::size_of::<f16>());
        assert_eq!(<f64 as Element>::dt(), DType::F64);
    }
}
