//! The dense matrix core: one contiguous backing buffer plus the shape and
//! layout tag it is addressed through.
//!
//! Both layout variants are thin aliases over [`DenseMat`]; the tag fixes
//! which dimension is major and how `(i, j)` maps to a linear offset. Major
//! entries are always exactly one leading dimension apart, the buffer holds
//! exactly `rows * cols` elements, and an empty shape holds no allocation.

use crate::element::Element;
use crate::error::{MatError, MResult};
use crate::layout::{ColMajor, MajorOrder, RowMajor};
use crate::storage::RawBuf;
use core::ptr::NonNull;
use rand::Rng;
use rawpointer::PointerExt;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

pub struct DenseMat<A, O: MajorOrder> {
    buf: RawBuf<A>,
    nrows: usize,
    ncols: usize,
    order: PhantomData<O>,
}

pub type RowMat<A> = DenseMat<A, RowMajor>;

pub type ColMat<A> = DenseMat<A, ColMajor>;

// The buffer is held exclusively unless set_data established a borrow, and
// then exclusive use during mutation is the caller's contract.
unsafe impl<A: Send, O: MajorOrder> Send for DenseMat<A, O> {}
unsafe impl<A: Sync, O: MajorOrder> Sync for DenseMat<A, O> {}

impl<A, O: MajorOrder> DenseMat<A, O> {
    /// An empty 0x0 matrix. Allocates nothing.
    pub fn new() -> Self {
        Self {
            buf: RawBuf::empty(),
            nrows: 0,
            ncols: 0,
            order: PhantomData,
        }
    }

    /// Wrap a `Vec` whose elements are already in this variant's buffer
    /// order (row by row for row-major, column by column for column-major).
    pub fn from_vec(rows: usize, cols: usize, v: Vec<A>) -> MResult<Self> {
        let n = rows
            .checked_mul(cols)
            .ok_or(MatError::SizeOverflow { rows, cols })?;
        if v.len() != n {
            return Err(MatError::ShapeMismatch {
                rows,
                cols,
                got: v.len(),
            });
        }
        Ok(Self {
            buf: RawBuf::from_boxed(v.into_boxed_slice()),
            nrows: rows,
            ncols: cols,
            order: PhantomData,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Total element count, `rows * cols`.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    /// Stride, in elements, between consecutive major entries. This is the
    /// classical leading-dimension parameter external routines expect.
    #[inline]
    pub fn leading_dim(&self) -> usize {
        O::minor(self.nrows, self.ncols)
    }

    /// Number of major entries (rows for row-major, columns for col-major).
    #[inline]
    pub fn major_dim(&self) -> usize {
        O::major(self.nrows, self.ncols)
    }

    /// False once `set_data` put the matrix over foreign memory.
    #[inline]
    pub fn owns_data(&self) -> bool {
        self.buf.is_owned()
    }

    /// Element at row `i`, column `j`. No bounds check in release builds;
    /// an out-of-range index is undefined behavior there.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> &A {
        debug_assert!(i < self.nrows && j < self.ncols);
        unsafe { self.buf.ptr().add(O::offset(i, j, self.leading_dim())).as_ref() }
    }

    /// Mutable element at row `i`, column `j`. Same contract as [`at`].
    ///
    /// [`at`]: DenseMat::at
    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut A {
        debug_assert!(i < self.nrows && j < self.ncols);
        unsafe { self.buf.ptr().add(O::offset(i, j, self.leading_dim())).as_mut() }
    }

    /// Checked twin of [`at`].
    ///
    /// [`at`]: DenseMat::at
    pub fn get(&self, i: usize, j: usize) -> Option<&A> {
        if i < self.nrows && j < self.ncols {
            Some(self.at(i, j))
        } else {
            None
        }
    }

    /// Checked twin of [`at_mut`].
    ///
    /// [`at_mut`]: DenseMat::at_mut
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut A> {
        if i < self.nrows && j < self.ncols {
            Some(self.at_mut(i, j))
        } else {
            None
        }
    }

    /// Element at flat position `k` in buffer order. Unchecked in release
    /// builds, like [`at`].
    ///
    /// [`at`]: DenseMat::at
    #[inline]
    pub fn at_lin(&self, k: usize) -> &A {
        debug_assert!(k < self.buf.len());
        unsafe { self.buf.ptr().add(k).as_ref() }
    }

    #[inline]
    pub fn at_lin_mut(&mut self, k: usize) -> &mut A {
        debug_assert!(k < self.buf.len());
        unsafe { self.buf.ptr().add(k).as_mut() }
    }

    /// The whole buffer in its natural (major-grouped) order.
    pub fn as_slice(&self) -> &[A] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [A] {
        self.buf.as_slice_mut()
    }

    /// Put the matrix over `data` without taking ownership. Any owned
    /// storage is released first; the adopted memory will never be freed
    /// by this matrix.
    ///
    /// # Safety
    /// `data` must reference at least `rows * cols` initialized elements
    /// that outlive this matrix (or its next `nullify`/`realloc` to owned
    /// storage), and nothing else may use them exclusively meanwhile.
    pub unsafe fn set_data(&mut self, rows: usize, cols: usize, data: *mut A) {
        debug_assert!(rows.checked_mul(cols).is_some());
        let n = rows * cols;
        debug_assert!(!data.is_null() || n == 0);
        let ptr = match NonNull::new(data) {
            Some(p) => p,
            None => NonNull::dangling(),
        };
        self.buf = RawBuf::borrowed(ptr, n);
        self.nrows = rows;
        self.ncols = cols;
    }

    /// Drop to 0x0 without deallocating. For a borrowed matrix this severs
    /// the tie to the foreign buffer; for an owning one it is a deliberate
    /// leak that hands the allocation to the caller.
    pub fn nullify(&mut self) {
        self.buf.detach();
        self.nrows = 0;
        self.ncols = 0;
    }
}

impl<A: Element, O: MajorOrder> DenseMat<A, O> {
    /// Allocate a zero-initialized `rows x cols` matrix. On failure nothing
    /// is allocated and the error is returned.
    pub fn with_dims(rows: usize, cols: usize) -> MResult<Self> {
        let n = rows
            .checked_mul(cols)
            .ok_or(MatError::SizeOverflow { rows, cols })?;
        let mut buf = RawBuf::alloc(n)?;
        buf.fill(A::zero(), n);
        Ok(Self {
            buf,
            nrows: rows,
            ncols: cols,
            order: PhantomData,
        })
    }

    /// Resize to `rows x cols`, discarding contents. No-op when the shape
    /// is unchanged. An owning matrix releases and reallocates; a borrowed
    /// one only relabels its shape over the same foreign memory, which is
    /// never reallocated or freed here; the region is assumed to cover
    /// the new extent. Probe `owns_data` to tell the two apart.
    pub fn realloc(&mut self, rows: usize, cols: usize) -> MResult<()> {
        if rows == self.nrows && cols == self.ncols {
            return Ok(());
        }
        let n = rows
            .checked_mul(cols)
            .ok_or(MatError::SizeOverflow { rows, cols })?;
        if !self.buf.is_owned() {
            self.buf.relabel(n);
            self.nrows = rows;
            self.ncols = cols;
            return Ok(());
        }
        self.buf.release();
        self.nrows = 0;
        self.ncols = 0;
        *self = Self::with_dims(rows, cols)?;
        Ok(())
    }

    /// Deep-copy shape and contents from `other`. The result always owns
    /// its storage, whatever state either side was in.
    pub fn copy_from(&mut self, other: &Self) -> MResult<()> {
        let mut fresh = Self::with_dims(other.nrows, other.ncols)?;
        fresh.as_mut_slice().copy_from_slice(other.as_slice());
        *self = fresh;
        Ok(())
    }

    /// Owning deep copy of `self`.
    pub fn try_clone(&self) -> MResult<Self> {
        let mut m = Self::new();
        m.copy_from(self)?;
        Ok(m)
    }

    /// Set every element to `x`. Returns the matrix for chaining.
    pub fn fill(&mut self, x: A) -> &mut Self {
        for e in self.as_mut_slice() {
            *e = x;
        }
        self
    }

    /// Equivalent to `fill(0)`.
    pub fn zero(&mut self) {
        self.fill(A::zero());
    }

    /// Ones on the diagonal up to `min(rows, cols)`, zeros elsewhere.
    /// Non-square shapes are tolerated.
    pub fn set_identity(&mut self) {
        self.zero();
        let n = self.nrows.min(self.ncols);
        for k in 0..n {
            *self.at_mut(k, k) = A::one();
        }
    }

    /// The default fill: element `(i, j)` receives the ascending sequence
    /// value `i * cols + j`, row-major reading order in either layout.
    pub fn fill_seq(&mut self) {
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                *self.at_mut(i, j) = A::seq(i * self.ncols + j);
            }
        }
    }

    pub fn fill_random(&mut self) -> &mut Self {
        self.fill_random_with(&mut rand::thread_rng())
    }

    pub fn fill_random_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        for e in self.as_mut_slice() {
            *e = A::sample(rng);
        }
        self
    }
}

impl<A, O: MajorOrder> Default for DenseMat<A, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, O: MajorOrder> Index<(usize, usize)> for DenseMat<A, O> {
    type Output = A;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &A {
        self.at(i, j)
    }
}

impl<A, O: MajorOrder> IndexMut<(usize, usize)> for DenseMat<A, O> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut A {
        self.at_mut(i, j)
    }
}

// Compared by (i, j), so the two layout variants are interchangeable.
impl<A: PartialEq, O1: MajorOrder, O2: MajorOrder> PartialEq<DenseMat<A, O2>>
    for DenseMat<A, O1>
{
    fn eq(&self, other: &DenseMat<A, O2>) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                if self.at(i, j) != other.at(i, j) {
                    return false;
                }
            }
        }
        true
    }
}

impl<A: fmt::Debug, O: MajorOrder> fmt::Debug for DenseMat<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for i in 0..self.nrows {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("[")?;
            for j in 0..self.ncols {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}", self.at(i, j))?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

impl<A, const N: usize> From<Vec<[A; N]>> for RowMat<A> {
    fn from(rows: Vec<[A; N]>) -> Self {
        let r = rows.len();
        let flat: Vec<A> = rows.into_iter().flatten().collect();
        Self {
            buf: RawBuf::from_boxed(flat.into_boxed_slice()),
            nrows: r,
            ncols: N,
            order: PhantomData,
        }
    }
}
