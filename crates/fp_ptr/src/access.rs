use alloc::vec::Vec;
use core::borrow::Borrow;
use core::ptr;

use crate::Handle;
use crate::auto_wrap::AutoWrap;
use crate::convert::{ExactFrom, convert};
use crate::error::ConversionError;

// Positions are 1-based: position `i` is the element at `address + (i - 1)`.
// Every function below is unchecked. The caller guarantees that each touched
// position is inside live memory holding a valid, aligned `T`.

impl<T> Handle<T> {
    #[inline(always)]
    pub(crate) const fn position(self, index: isize) -> Self {
        self.offset(index.wrapping_sub(1))
    }

    /// Loads the first element, auto-wrapping pointer-like values.
    ///
    /// # Safety
    ///
    /// The handle must point to a valid, aligned, initialized `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut x = 3u8;
    /// let mut slot: *mut u8 = &raw mut x;
    ///
    /// // `*mut u8` is pointer-like, so the load yields a handle.
    /// let p = Handle::from_mut(&mut slot);
    /// let inner: Handle<u8> = unsafe { p.load() };
    ///
    /// assert_eq!(unsafe { inner.load() }, 3);
    /// assert_eq!(inner, unsafe { p.load_raw() });
    /// ```
    #[inline]
    pub unsafe fn load(self) -> T::Output
    where
        T: AutoWrap + Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.load_raw() }.auto_wrap()
    }

    /// Loads position `index` (1-based), auto-wrapping pointer-like values.
    ///
    /// Same as `(self + (index - 1)).load()`.
    ///
    /// # Safety
    ///
    /// Position `index` must hold a valid, aligned, initialized `T`.
    #[inline]
    pub unsafe fn load_at(self, index: isize) -> T::Output
    where
        T: AutoWrap + Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.position(index).load() }
    }

    /// Loads the first element as is, never auto-wrapping.
    ///
    /// # Safety
    ///
    /// The handle must point to a valid, aligned, initialized `T`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn load_raw(self) -> T
    where
        T: Copy,
    {
        self.debug_assert_aligned();
        // SAFETY: forwarded to the caller.
        unsafe { ptr::read(self.0) }
    }

    /// Loads position `index` (1-based) as is, never auto-wrapping.
    ///
    /// # Safety
    ///
    /// Position `index` must hold a valid, aligned, initialized `T`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn load_raw_at(self, index: isize) -> T
    where
        T: Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.position(index).load_raw() }
    }

    /// Loads the first element from a possibly unaligned address.
    ///
    /// # Safety
    ///
    /// The handle must point to a valid, initialized `T`.
    #[inline]
    pub unsafe fn load_unaligned(self) -> T
    where
        T: Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { ptr::read_unaligned(self.0) }
    }

    /// Stores `value` into the first element.
    ///
    /// The previous content is overwritten without being dropped.
    ///
    /// # Safety
    ///
    /// The handle must be valid for writes and aligned for `T`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn store(self, value: T)
    where
        T: Copy,
    {
        self.debug_assert_aligned();
        // SAFETY: forwarded to the caller.
        unsafe { ptr::write(self.0, value) }
    }

    /// Stores `value` into position `index` (1-based).
    ///
    /// # Safety
    ///
    /// Position `index` must be valid for writes and aligned for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [1, 2, 3, 4, 5, 6, 7, 8];
    /// let p = Handle::from_source(&mut buf);
    /// let q = p + 2;
    ///
    /// assert_eq!(unsafe { q.load() }, 3);
    /// unsafe { q.store_at(1, 77) };
    /// assert_eq!(buf, [1, 2, 77, 4, 5, 6, 7, 8]);
    /// ```
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn store_at(self, index: isize, value: T)
    where
        T: Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.position(index).store(value) }
    }

    /// Stores `value` into a possibly unaligned address.
    ///
    /// # Safety
    ///
    /// The handle must be valid for writes of `size_of::<T>()` bytes.
    #[inline]
    pub unsafe fn store_unaligned(self, value: T)
    where
        T: Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { ptr::write_unaligned(self.0, value) }
    }

    /// Converts `value` to `T` and stores it into the first element.
    ///
    /// See [`ExactFrom`] for the conversion policy.
    ///
    /// # Errors
    ///
    /// [`ConversionError`] if `value` is not exactly representable as `T`.
    /// Nothing is written in that case.
    ///
    /// # Safety
    ///
    /// The handle must be valid for writes and aligned for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut x = 0i32;
    /// let p = Handle::from_mut(&mut x);
    ///
    /// unsafe {
    ///     p.try_store(4.0f64).unwrap();
    ///     assert!(p.try_store(1.2f64).is_err());
    /// }
    /// assert_eq!(x, 4);
    /// ```
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn try_store<V>(self, value: V) -> Result<(), ConversionError>
    where
        T: ExactFrom<V> + Copy,
    {
        let value = convert::<T, V>(value)?;
        // SAFETY: forwarded to the caller.
        unsafe { self.store(value) };
        Ok(())
    }

    /// Converts `value` to `T` and stores it into position `index` (1-based).
    ///
    /// # Errors
    ///
    /// [`ConversionError`] if `value` is not exactly representable as `T`.
    /// Nothing is written in that case.
    ///
    /// # Safety
    ///
    /// Position `index` must be valid for writes and aligned for `T`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub unsafe fn try_store_at<V>(self, index: isize, value: V) -> Result<(), ConversionError>
    where
        T: ExactFrom<V> + Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.position(index).try_store(value) }
    }

    /// Copies `count` elements from `self` to `dst`. The regions may overlap.
    ///
    /// # Safety
    ///
    /// Both regions must be valid for `count` elements, and aligned.
    #[inline]
    pub unsafe fn copy_to(self, dst: Handle<T>, count: usize)
    where
        T: Copy,
    {
        // SAFETY: forwarded to the caller.
        unsafe { ptr::copy(self.0.cast_const(), dst.0, count) }
    }

    // -------------------------------------------------------------------------
    // Gather

    /// Loads every position of `indices` into a new vector, in the given
    /// order and with repeats, auto-wrapping pointer-like values.
    ///
    /// `indices` may yield positions by value or by reference, so arrays,
    /// `Vec`s and borrowed slices all work.
    ///
    /// # Safety
    ///
    /// Every listed position must hold a valid, aligned, initialized `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [10, 20, 30, 40];
    /// let p = Handle::from_source(&mut buf);
    ///
    /// assert_eq!(unsafe { p.gather([4isize, 1, 4]) }, [40, 10, 40]);
    ///
    /// let picks: &[isize] = &[2, 3];
    /// assert_eq!(unsafe { p.gather(picks) }, [20, 30]);
    /// ```
    pub unsafe fn gather<I>(self, indices: I) -> Vec<T::Output>
    where
        T: AutoWrap + Copy,
        I: IntoIterator,
        I::Item: Borrow<isize>,
    {
        indices
            .into_iter()
            // SAFETY: forwarded to the caller.
            .map(|i| unsafe { self.load_at(*Borrow::<isize>::borrow(&i)) })
            .collect()
    }

    /// Like [`gather`](Self::gather), never auto-wrapping.
    ///
    /// # Safety
    ///
    /// Every listed position must hold a valid, aligned, initialized `T`.
    pub unsafe fn gather_raw<I>(self, indices: I) -> Vec<T>
    where
        T: Copy,
        I: IntoIterator,
        I::Item: Borrow<isize>,
    {
        indices
            .into_iter()
            // SAFETY: forwarded to the caller.
            .map(|i| unsafe { self.load_raw_at(*Borrow::<isize>::borrow(&i)) })
            .collect()
    }

    /// Loads every position whose mask entry is `true`, in ascending order,
    /// auto-wrapping pointer-like values.
    ///
    /// Mask entry `k` (0-based) selects position `k + 1`.
    ///
    /// # Safety
    ///
    /// Every selected position must hold a valid, aligned, initialized `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [10, 20, 30, 40];
    /// let p = Handle::from_source(&mut buf);
    ///
    /// let picked = unsafe { p.gather_mask([true, false, false, true]) };
    /// assert_eq!(picked, [10, 40]);
    /// ```
    pub unsafe fn gather_mask<M>(self, mask: M) -> Vec<T::Output>
    where
        T: AutoWrap + Copy,
        M: IntoIterator,
        M::Item: Borrow<bool>,
    {
        mask_positions(mask)
            // SAFETY: forwarded to the caller.
            .map(|i| unsafe { self.load_at(i) })
            .collect()
    }

    /// Like [`gather_mask`](Self::gather_mask), never auto-wrapping.
    ///
    /// # Safety
    ///
    /// Every selected position must hold a valid, aligned, initialized `T`.
    pub unsafe fn gather_mask_raw<M>(self, mask: M) -> Vec<T>
    where
        T: Copy,
        M: IntoIterator,
        M::Item: Borrow<bool>,
    {
        mask_positions(mask)
            // SAFETY: forwarded to the caller.
            .map(|i| unsafe { self.load_raw_at(i) })
            .collect()
    }
}

/// The 1-based positions of the `true` entries of `mask`.
fn mask_positions<M>(mask: M) -> impl Iterator<Item = isize>
where
    M: IntoIterator,
    M::Item: Borrow<bool>,
{
    mask.into_iter()
        .zip(1isize..)
        .filter_map(|(keep, i)| Borrow::<bool>::borrow(&keep).then_some(i))
}

#[cfg(test)]
mod tests {
    use crate::Handle;
    use crate::error::ConversionError;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn scenario_move_then_store() {
        let mut buf = [1, 2, 3, 4, 5, 6, 7, 8];
        let p = Handle::from_source(&mut buf);
        let q = p + 2;

        unsafe {
            assert_eq!(q.load(), 3);
            q.store(77);
        }
        assert_eq!(buf, [1, 2, 77, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn indexed_load_is_offset_load() {
        let mut buf = [5u32, 6, 7, 8];
        let p = Handle::from_source(&mut buf);

        for i in 1..=4isize {
            unsafe { assert_eq!(p.load_at(i), (p + (i - 1)).load()) };
        }
        assert_eq!(unsafe { (p + 2).load_at(0) }, 6);
    }

    #[test]
    fn store_then_load() {
        let mut buf = [0.0f64; 3];
        let p = Handle::from_source(&mut buf);

        unsafe {
            p.try_store_at(2, 7i32).unwrap();
            p.try_store_at(3, 0.25f32).unwrap();
            assert_eq!(p.load_at(2), 7.0);
            assert_eq!(p.load_at(3), 0.25);
        }
    }

    #[test]
    fn inexact_store_writes_nothing() {
        let mut buf = [9i64, 9];
        let p = Handle::from_source(&mut buf);

        let err = unsafe { p.try_store_at(2, 1.2f64) }.unwrap_err();
        assert_eq!(
            err,
            ConversionError {
                from: "f64",
                to: "i64"
            }
        );
        assert_eq!(buf, [9, 9]);

        let p = p.cast::<u8>();
        assert!(unsafe { p.try_store(-1i32) }.is_err());
        assert!(unsafe { p.try_store(256u32) }.is_err());
    }

    #[test]
    fn auto_wrap_and_escape_hatch() {
        let mut target = [1i32, 2];
        let mut slots: [*mut i32; 2] = [target.as_mut_ptr(), target.as_mut_ptr().wrapping_add(1)];
        let p = Handle::from_source(&mut slots);

        let wrapped: Handle<i32> = unsafe { p.load_at(2) };
        let raw: *mut i32 = unsafe { p.load_raw_at(2) };

        assert_eq!(wrapped.as_ptr(), raw);
        assert_eq!(unsafe { wrapped.load() }, 2);

        let all = unsafe { p.gather([2isize, 1]) };
        assert_eq!(unsafe { all[0].load() }, 2);
        assert_eq!(unsafe { p.gather_raw([2isize, 1]) }, vec![slots[1], slots[0]]);
    }

    #[test]
    fn gather_keeps_order_and_repeats() {
        let mut buf = [10u8, 20, 30, 40, 50];
        let p = Handle::from_source(&mut buf);
        let idxs = [5isize, 1, 5, 3];

        let gathered = unsafe { p.gather(idxs) };
        let expected: Vec<u8> = idxs.iter().map(|&i| unsafe { p.load_at(i) }).collect();
        assert_eq!(gathered, expected);
        assert_eq!(gathered, [50, 10, 50, 30]);
    }

    #[test]
    fn gather_from_borrowed_sets() {
        let mut buf = [7u32, 8, 9];
        let p = Handle::from_source(&mut buf);
        let idxs: Vec<isize> = vec![3, 1];
        let mask = vec![true, false, true];

        unsafe {
            assert_eq!(p.gather(&idxs), [9, 7]);
            assert_eq!(p.gather_raw(idxs.iter()), [9, 7]);
            assert_eq!(p.gather_mask(&mask[..]), [7, 9]);
            assert_eq!(p.gather_mask_raw(mask.iter()), [7, 9]);
        }
        assert_eq!(idxs, [3, 1]);
    }

    #[test]
    fn mask_gather_is_ascending_index_gather() {
        let mut buf = [1i16, 2, 3, 4, 5];
        let p = Handle::from_source(&mut buf);
        let mask = [false, true, true, false, true];

        unsafe {
            assert_eq!(p.gather_mask(mask), p.gather([2isize, 3, 5]));
            assert_eq!(p.gather_mask_raw(mask), [2, 3, 5]);
            assert!(p.gather_mask([false; 5]).is_empty());
        }
    }

    #[test]
    fn copy_between_handles() {
        let mut src = [1u64, 2, 3];
        let mut dst = [0u64; 3];
        let p = Handle::from_source(&mut src);
        let q = Handle::from_source(&mut dst);

        unsafe { p.copy_to(q + 1, 2) };
        assert_eq!(dst, [0, 1, 2]);
    }

    #[test]
    fn unaligned_access() {
        let mut bytes = [0u8; 9];
        let p = Handle::from_source(&mut bytes).byte_add(1).cast::<u64>();

        unsafe {
            p.store_unaligned(0x0102_0304_0506_0708);
            assert_eq!(p.load_unaligned(), 0x0102_0304_0506_0708);
        }
        assert_eq!(bytes[0], 0);
    }
}
