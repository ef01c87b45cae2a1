//! Raw contiguous element storage with a tagged ownership state.

use crate::error::{MatError, MResult};
use core::ptr::{self, NonNull};
use rawpointer::PointerExt;
use std::alloc::{alloc, Layout};
use std::mem::ManuallyDrop;

/// Whether the buffer frees its memory when released.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Ownership {
    Owned,
    Borrowed,
}

pub(crate) struct SetLenOnDrop<'a> {
    len: &'a mut usize,
    local_len: usize,
}

impl<'a> SetLenOnDrop<'a> {
    #[inline]
    pub(crate) fn new(len: &'a mut usize) -> Self {
        SetLenOnDrop {
            local_len: *len,
            len,
        }
    }

    #[inline]
    pub(crate) fn increment_len(&mut self, increment: usize) {
        self.local_len += increment;
    }
}

impl Drop for SetLenOnDrop<'_> {
    #[inline]
    fn drop(&mut self) {
        *self.len = self.local_len;
    }
}

/// Contiguous storage of `cap` elements addressed through a raw pointer.
///
/// `len` counts the initialized prefix. A `Borrowed` buffer always has
/// `len == cap` and is never deallocated here; the region it points at must
/// outlive the buffer (caller contract, not tracked at runtime).
pub(crate) struct RawBuf<P> {
    ptr: NonNull<P>,
    len: usize,
    cap: usize,
    state: Ownership,
}

impl<P> RawBuf<P> {
    pub(crate) fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            state: Ownership::Owned,
        }
    }

    /// Allocate room for `cap` elements, none of them initialized yet.
    /// Nothing is allocated on failure.
    pub(crate) fn alloc(cap: usize) -> MResult<Self> {
        if cap == 0 {
            return Ok(Self::empty());
        }
        let layout = Layout::array::<P>(cap).map_err(|_| MatError::AllocFailed(cap))?;
        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len: 0,
                cap,
                state: Ownership::Owned,
            });
        }
        let raw = unsafe { alloc(layout) } as *mut P;
        let ptr = NonNull::new(raw).ok_or(MatError::AllocFailed(cap))?;
        Ok(Self {
            ptr,
            len: 0,
            cap,
            state: Ownership::Owned,
        })
    }

    /// Take ownership of a boxed slice; `len == cap` by construction.
    pub(crate) fn from_boxed(b: Box<[P]>) -> Self {
        let mut b = ManuallyDrop::new(b);
        let len = b.len();
        let ptr = match NonNull::new(b.as_mut_ptr()) {
            Some(p) => p,
            None => NonNull::dangling(),
        };
        Self {
            ptr,
            len,
            cap: len,
            state: Ownership::Owned,
        }
    }

    /// Adopt `len` elements of foreign memory without taking ownership.
    ///
    /// # Safety
    /// `ptr` must reference at least `len` initialized elements that stay
    /// valid for the buffer's lifetime, with no other exclusive user.
    pub(crate) unsafe fn borrowed(ptr: NonNull<P>, len: usize) -> Self {
        Self {
            ptr,
            len,
            cap: len,
            state: Ownership::Borrowed,
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> NonNull<P> {
        self.ptr
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_owned(&self) -> bool {
        self.state == Ownership::Owned
    }

    pub(crate) fn as_slice(&self) -> &[P] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr() as *const P, self.len) }
    }

    pub(crate) fn as_slice_mut(&mut self) -> &mut [P] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Append `n` clones of `elem` to the initialized prefix.
    pub(crate) fn fill(&mut self, elem: P, n: usize)
    where
        P: Clone,
    {
        debug_assert!(self.len + n <= self.cap);
        unsafe {
            let mut ptr = self.ptr.as_ptr().add(self.len);
            let mut local_len = SetLenOnDrop::new(&mut self.len);

            // Write all elements except the last one
            for _ in 1..n {
                ptr::write(ptr.post_inc(), elem.clone());
                // Increment the length in every step in case clone() panics
                local_len.increment_len(1);
            }

            if n > 0 {
                // The last element can take `elem` itself
                ptr::write(ptr, elem);
                local_len.increment_len(1);
            }

            // len set by scope guard
        }
    }

    /// Relabel the extent of a borrowed buffer. The foreign region is
    /// assumed, not checked, to cover the new length.
    pub(crate) fn relabel(&mut self, len: usize) {
        debug_assert!(self.state == Ownership::Borrowed);
        self.len = len;
        self.cap = len;
    }

    /// Forget the buffer without deallocating, whatever the state. On an
    /// owned buffer this is a deliberate leak: the allocation now belongs
    /// to whoever else holds the pointer.
    pub(crate) fn detach(&mut self) {
        self.ptr = NonNull::dangling();
        self.len = 0;
        self.cap = 0;
        self.state = Ownership::Owned;
    }

    /// Drop contents and free the allocation if owned, then reset to empty.
    /// Borrowed memory is left untouched.
    pub(crate) fn release(&mut self) {
        if self.state == Ownership::Owned && self.cap != 0 {
            unsafe {
                let _ = Vec::from_raw_parts(self.ptr.as_ptr(), self.len, self.cap);
            }
        }
        self.detach();
    }
}

impl<P> Drop for RawBuf<P> {
    fn drop(&mut self) {
        self.release();
    }
}
