use alloc::boxed::Box;
use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;
use core::slice;

use crate::Handle;
use crate::error::MaterializeError;

/// A non-owning, row-major view over contiguous elements.
///
/// Reads and writes go straight to the viewed memory: nothing is copied, and
/// changes through the view are visible through every other alias and
/// vice versa.
///
/// Indexing inside the view follows slice conventions (0-based, checked).
///
/// # Examples
///
/// ```
/// use fp_ptr::Handle;
///
/// let mut buf = [1, 2, 3, 4, 5, 6];
/// let p = Handle::from_source(&mut buf);
///
/// let mut grid = unsafe { p.array(&[2, 3]) }.unwrap();
/// assert_eq!(grid.shape(), [2, 3]);
/// assert_eq!(grid.get(&[1, 0]), Some(&4));
///
/// grid[5] = 60;
/// assert_eq!(buf[5], 60);
/// ```
pub struct ArrayView<'a, T> {
    ptr: *mut T,
    len: usize,
    dims: Box<[usize]>,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> ArrayView<'a, T> {
    /// Creates a view of shape `dims` starting at `ptr`.
    ///
    /// # Errors
    ///
    /// [`MaterializeError::ShapeOverflow`] if the element count or its byte
    /// size does not fit in `isize`.
    ///
    /// # Safety
    ///
    /// - `ptr` must be valid for reads and writes of `product(dims)`
    ///   initialized, aligned elements, unless that product is zero.
    /// - The memory must stay valid and must not be accessed through a
    ///   reference that conflicts with the view for `'a`.
    pub unsafe fn from_raw_parts(ptr: *mut T, dims: &[usize]) -> Result<Self, MaterializeError> {
        let len = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&len| {
                len.checked_mul(size_of::<T>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(|| MaterializeError::ShapeOverflow {
                ty: type_name::<T>(),
                dims: dims.to_vec(),
            })?;

        log::trace!("viewing {len} `{}` at {ptr:p}", type_name::<T>());
        Ok(Self {
            ptr,
            len,
            dims: dims.into(),
            _marker: PhantomData,
        })
    }

    /// A view with no elements.
    #[inline]
    pub fn empty() -> Self {
        Self {
            ptr: NonNull::dangling().as_ptr(),
            len: 0,
            dims: Box::new([0]),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the shape the view was built with.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.dims
    }

    /// Returns a handle over the first element.
    #[inline]
    pub fn handle(&self) -> Handle<T> {
        Handle::new(self.ptr)
    }

    // Slices need a non-null, aligned pointer even when empty.
    #[inline]
    fn data(&self) -> *mut T {
        if self.len == 0 {
            NonNull::dangling().as_ptr()
        } else {
            self.ptr
        }
    }

    /// Returns the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: guaranteed by the contract of `from_raw_parts`.
        unsafe { slice::from_raw_parts(self.data(), self.len) }
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: guaranteed by the contract of `from_raw_parts`.
        unsafe { slice::from_raw_parts_mut(self.data(), self.len) }
    }

    /// Converts the view into a slice with the full lifetime `'a`.
    #[inline]
    pub fn into_slice(self) -> &'a mut [T] {
        // SAFETY: guaranteed by the contract of `from_raw_parts`.
        unsafe { slice::from_raw_parts_mut(self.data(), self.len) }
    }

    // Row-major: the last dimension is contiguous.
    fn linear_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        index
            .iter()
            .zip(self.dims.iter())
            .try_fold(0usize, |acc, (&i, &d)| (i < d).then(|| acc * d + i))
    }

    /// Returns the element at a multi-dimensional `index`, or `None` if the
    /// index has the wrong rank or is out of bounds.
    #[inline]
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        let i = self.linear_index(index)?;
        self.as_slice().get(i)
    }

    /// Mutable variant of [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let i = self.linear_index(index)?;
        self.as_mut_slice().get_mut(i)
    }
}

impl<T> Deref for ArrayView<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for ArrayView<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("shape", &self.dims)
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ArrayView;
    use crate::Handle;
    use crate::error::MaterializeError;

    #[test]
    fn view_aliases_memory() {
        let mut buf = [1u32, 2, 3, 4];
        let p = Handle::from_source(&mut buf);

        let mut view = unsafe { p.array(&[4]) }.unwrap();
        view[0] = 10;
        unsafe { p.store_at(4, 40) };
        assert_eq!(view.as_slice(), [10, 2, 3, 40]);
        drop(view);

        assert_eq!(buf, [10, 2, 3, 40]);
    }

    #[test]
    fn row_major_indexing() {
        let mut buf: [u8; 6] = [0, 1, 2, 3, 4, 5];
        let p = Handle::from_source(&mut buf);
        let mut grid = unsafe { p.array(&[2, 3]) }.unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(grid.get(&[0, 2]), Some(&2));
        assert_eq!(grid.get(&[1, 2]), Some(&5));
        assert_eq!(grid.get(&[2, 0]), None);
        assert_eq!(grid.get(&[1]), None);

        *grid.get_mut(&[1, 1]).unwrap() = 44;
        assert_eq!(buf[4], 44);
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let p = Handle::<u64>::from_addr(64);
        let err = unsafe { p.array(&[usize::MAX, 2]) }.unwrap_err();

        assert!(matches!(err, MaterializeError::ShapeOverflow { ref dims, .. } if dims[..] == [usize::MAX, 2]));
        assert!(unsafe { p.array(&[usize::MAX / 8 + 1]) }.is_err());
    }

    #[test]
    fn zero_sized_shapes() {
        let p = Handle::<i32>::null();
        let view = unsafe { p.array(&[3, 0]) }.unwrap();

        assert!(view.is_empty());
        assert!(view.as_slice().is_empty());
        assert!(ArrayView::<i32>::empty().is_empty());
    }
}
