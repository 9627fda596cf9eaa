use std::alloc::Layout;

use crate::ArrayError;

/// Raw contiguous allocation with explicit ownership.
///
/// `owned` decides whether release returns the memory to the global
/// allocator; adopted buffers with `owned == false` are left to the caller.
#[derive(derive_new::new, Debug, PartialEq, Eq)]
pub struct RawBuffer {
    ptr: *mut u8,
    layout: Layout,
    owned: bool,
}

impl RawBuffer {
    /// Allocates `size` zero-filled bytes owned by this buffer.
    pub fn zeroed(size: usize, alignment: usize) -> Result<Self, ArrayError> {
        let layout = Layout::from_size_align(size, alignment).map_err(|_| ArrayError::Overflow)?;
        let ptr = if size == 0 {
            std::ptr::null_mut()
        } else {
            let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
            if ptr.is_null() {
                std::alloc::handle_alloc_error(layout);
            }
            ptr
        };
        log::trace!("alloc {} bytes at {:p}", size, ptr);
        Ok(Self::new(ptr, layout, true))
    }

    /// Binds to caller-supplied memory.
    ///
    /// # Safety
    /// `ptr` must stay valid for reads and writes of `layout.size()` bytes
    /// for this buffer's lifetime. When `owned` is true it must have come
    /// from the global allocator with exactly `layout`, and the buffer
    /// becomes responsible for freeing it.
    pub unsafe fn from_ptr(ptr: *mut u8, layout: Layout, owned: bool) -> Self {
        Self::new(ptr, layout, owned)
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn n_bytes(&self) -> usize {
        self.layout.size()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.ptr.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr, self.layout.size()) }
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.ptr.is_null() {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.ptr, self.layout.size()) }
        }
    }

    /// Idempotent: frees iff this buffer owns a live allocation, then drops
    /// the pointer either way.
    pub fn release(&mut self) {
        if self.owned && !self.ptr.is_null() && self.layout.size() > 0 {
            log::trace!("free {} bytes at {:p}", self.layout.size(), self.ptr);
            unsafe { std::alloc::dealloc(self.ptr, self.layout) };
        }
        self.ptr = std::ptr::null_mut();
        self.owned = false;
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn zeroed_allocation_is_zero_filled() {
        init_logs();
        let buf = RawBuffer::zeroed(64, 8).unwrap();
        assert_eq!(buf.n_bytes(), 64);
        assert!(buf.is_owned());
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn release_is_idempotent() {
        init_logs();
        let mut buf = RawBuffer::zeroed(16, 8).unwrap();
        buf.release();
        assert!(buf.as_ptr().is_null());
        assert!(!buf.is_owned());
        buf.release();
        assert!(buf.as_ptr().is_null());
    }

    #[test]
    fn adopted_buffer_is_not_freed() {
        let mut backing = [0u8; 16];
        let layout = Layout::from_size_align(16, 1).unwrap();
        let mut buf = unsafe { RawBuffer::from_ptr(backing.as_mut_ptr(), layout, false) };
        buf.as_bytes_mut()[0] = 7;
        buf.release();
        assert_eq!(backing[0], 7);
    }

    #[test]
    fn zero_size_buffer_has_no_pointer() {
        let buf = RawBuffer::zeroed(0, 8).unwrap();
        assert!(buf.as_ptr().is_null());
        assert!(buf.as_bytes().is_empty());
    }
}
