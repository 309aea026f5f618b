//! Non-owning views over the memory behind a [`Handle`].
//!
//! - [`ArrayView`]: a contiguous, row-major region of a given shape.
//! - [`IndexView`]: arbitrary positions, in caller order, inside one window.
//!
//! Views never copy. A write through a view is a write to the original
//! memory.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Range, RangeInclusive};

use crate::Handle;
use crate::error::MaterializeError;

mod array;
mod index;

pub use array::ArrayView;
pub use index::IndexView;

// -----------------------------------------------------------------------------
// ViewIndex

/// Selects which positions of a handle a view covers.
///
/// Positions are 1-based, as for [`Handle::load_at`].
///
/// | index                        | view                                  |
/// |------------------------------|---------------------------------------|
/// | `isize`                      | one element                           |
/// | `Range` / `RangeInclusive`   | the contiguous run, empty if reversed |
/// | `&[isize]`, `Vec`, `[isize; N]` | the listed positions, in order     |
pub trait ViewIndex<T> {
    /// The view this index produces.
    type View<'a>
    where
        T: 'a;

    /// Builds the view over `base`.
    ///
    /// # Safety
    ///
    /// See [`Handle::view`].
    unsafe fn view<'a>(self, base: Handle<T>) -> Result<Self::View<'a>, MaterializeError>;
}

impl<T> ViewIndex<T> for isize {
    type View<'a>
        = ArrayView<'a, T>
    where
        T: 'a;

    #[inline]
    unsafe fn view<'a>(self, base: Handle<T>) -> Result<ArrayView<'a, T>, MaterializeError> {
        // SAFETY: forwarded to the caller.
        unsafe { ArrayView::from_raw_parts(base.position(self).0, &[1]) }
    }
}

impl<T> ViewIndex<T> for RangeInclusive<isize> {
    type View<'a>
        = ArrayView<'a, T>
    where
        T: 'a;

    unsafe fn view<'a>(self, base: Handle<T>) -> Result<ArrayView<'a, T>, MaterializeError> {
        let (first, last) = self.into_inner();
        if last < first {
            return Ok(ArrayView::empty());
        }
        let span = last.abs_diff(first);
        let len = span
            .checked_add(1)
            .ok_or_else(|| MaterializeError::ShapeOverflow {
                ty: core::any::type_name::<T>(),
                dims: vec![span],
            })?;
        // SAFETY: forwarded to the caller.
        unsafe { ArrayView::from_raw_parts(base.position(first).0, &[len]) }
    }
}

impl<T> ViewIndex<T> for Range<isize> {
    type View<'a>
        = ArrayView<'a, T>
    where
        T: 'a;

    unsafe fn view<'a>(self, base: Handle<T>) -> Result<ArrayView<'a, T>, MaterializeError> {
        if self.end <= self.start {
            return Ok(ArrayView::empty());
        }
        let len = self.end.abs_diff(self.start);
        // SAFETY: forwarded to the caller.
        unsafe { ArrayView::from_raw_parts(base.position(self.start).0, &[len]) }
    }
}

macro_rules! impl_index_set {
    ($(<$($n:ident)?> $ty:ty;)+) => {
        $(
            impl<T $(, const $n: usize)?> ViewIndex<T> for $ty {
                type View<'a>
                    = IndexView<'a, T>
                where
                    T: 'a;

                #[inline]
                unsafe fn view<'a>(
                    self,
                    base: Handle<T>,
                ) -> Result<IndexView<'a, T>, MaterializeError> {
                    // SAFETY: forwarded to the caller.
                    unsafe { index_set(base, AsRef::<[isize]>::as_ref(&self)) }
                }
            }
        )+
    };
}

impl_index_set! {
    <> &[isize];
    <> Vec<isize>;
    <N> [isize; N];
}

unsafe fn index_set<'a, T>(
    base: Handle<T>,
    positions: &[isize],
) -> Result<IndexView<'a, T>, MaterializeError> {
    let (Some(&lo), Some(&hi)) = (positions.iter().min(), positions.iter().max()) else {
        return Ok(IndexView::new(ArrayView::empty(), Vec::new()));
    };

    // SAFETY: forwarded to the caller.
    let window = unsafe { (lo..=hi).view(base)? };
    let picks = positions.iter().map(|&i| i.abs_diff(lo)).collect();
    Ok(IndexView::new(window, picks))
}

// -----------------------------------------------------------------------------
// Handle

impl<T> Handle<T> {
    /// Views `product(dims)` contiguous elements as a row-major array.
    ///
    /// # Errors
    ///
    /// [`MaterializeError::ShapeOverflow`] if the shape does not describe an
    /// addressable region.
    ///
    /// # Safety
    ///
    /// - The region must hold `product(dims)` valid, aligned, initialized
    ///   elements, unless that product is zero.
    /// - Nothing may access the region through a conflicting reference while
    ///   the view is alive.
    #[inline]
    pub unsafe fn array<'a>(self, dims: &[usize]) -> Result<ArrayView<'a, T>, MaterializeError> {
        // SAFETY: forwarded to the caller.
        unsafe { ArrayView::from_raw_parts(self.0, dims) }
    }

    /// Views the positions selected by `index`. See [`ViewIndex`].
    ///
    /// An index set is served from the smallest window spanning its lowest
    /// and highest position. The view still lists the positions in the
    /// given order, repeats included.
    ///
    /// # Errors
    ///
    /// [`MaterializeError::ShapeOverflow`] if the covered window is not
    /// addressable.
    ///
    /// # Safety
    ///
    /// Same as [`array`](Self::array), for every position of the covered
    /// window.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [1, 2, 3, 4, 5];
    /// let p = Handle::from_source(&mut buf);
    ///
    /// let one = unsafe { p.view(2isize) }.unwrap();
    /// assert_eq!(*one, [2]);
    ///
    /// let mut run = unsafe { p.view(2..=4) }.unwrap();
    /// run[0] = 20;
    /// assert_eq!(buf, [1, 20, 3, 4, 5]);
    /// ```
    #[inline]
    pub unsafe fn view<'a, I>(self, index: I) -> Result<I::View<'a>, MaterializeError>
    where
        I: ViewIndex<T>,
        T: 'a,
    {
        // SAFETY: forwarded to the caller.
        unsafe { index.view(self) }
    }
}

#[cfg(test)]
mod tests {
    use crate::Handle;
    use alloc::vec;

    #[test]
    fn scalar_view_is_one_element() {
        let mut buf = [7u8, 8, 9];
        let p = Handle::from_source(&mut buf);

        let v = unsafe { p.view(3isize) }.unwrap();
        assert_eq!(v.shape(), [1]);
        assert_eq!(v.handle(), p + 2);
        assert_eq!(*v, [9]);
    }

    #[test]
    fn range_views() {
        let mut buf = [1i64, 2, 3, 4, 5, 6];
        let p = Handle::from_source(&mut buf);

        unsafe {
            assert_eq!(*p.view(2..=4).unwrap(), [2, 3, 4]);
            assert_eq!(*p.view(2..4).unwrap(), [2, 3]);
            assert!(p.view(4..=2).unwrap().is_empty());
            assert!(p.view(3..3).unwrap().is_empty());
        }
    }

    #[test]
    fn index_set_window() {
        let mut buf = [0u32; 8];
        let p = Handle::from_source(&mut buf);

        let view = unsafe { p.view(vec![7, 3, 5]) }.unwrap();
        assert_eq!(view.window().handle(), p + 2);
        assert_eq!(view.window().len(), 5);
        assert_eq!(view.offsets(), [4, 0, 2]);
    }
}
