use core::any::{TypeId, type_name};
use core::ops::{Add, Sub};

use crate::Handle;
use crate::error::DistanceError;

// Address computation never dereferences, so every offset wraps instead of
// requiring the result to stay inside an allocation.

impl<T> Handle<T> {
    /// Moves the handle by `count` elements of `T`.
    #[inline(always)]
    pub const fn offset(self, count: isize) -> Self {
        Self(self.0.wrapping_offset(count))
    }

    /// Moves the handle forward by `count` elements of `T`.
    #[inline(always)]
    pub const fn add(self, count: usize) -> Self {
        Self(self.0.wrapping_add(count))
    }

    /// Moves the handle backward by `count` elements of `T`.
    #[inline(always)]
    pub const fn sub(self, count: usize) -> Self {
        Self(self.0.wrapping_sub(count))
    }

    /// Moves the handle by `count` bytes, keeping the element type.
    #[inline(always)]
    pub const fn byte_offset(self, count: isize) -> Self {
        Self(self.0.wrapping_byte_offset(count))
    }

    /// Moves the handle forward by `count` bytes, keeping the element type.
    #[inline(always)]
    pub const fn byte_add(self, count: usize) -> Self {
        Self(self.0.wrapping_byte_add(count))
    }

    /// Returns the distance from `origin` to `self` in elements of `T`.
    ///
    /// # Errors
    ///
    /// - [`DistanceError::ZeroSized`] if `T` has no size.
    /// - [`DistanceError::Misaligned`] if the byte distance is not a multiple
    ///   of `size_of::<T>()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [0u32; 8];
    /// let p = Handle::from_source(&mut buf);
    /// let q = p + 5;
    ///
    /// assert_eq!(q.offset_from(p), Ok(5));
    /// assert_eq!(p.offset_from(q), Ok(-5));
    /// assert!(q.byte_add(2).offset_from(p).is_err());
    /// ```
    pub fn offset_from(self, origin: Self) -> Result<isize, DistanceError> {
        let size = size_of::<T>();
        if size == 0 {
            return Err(DistanceError::ZeroSized {
                ty: type_name::<T>(),
            });
        }

        let bytes = self.addr().wrapping_sub(origin.addr()) as isize;
        // `size` fits in `isize` for every sized type.
        let size_i = size as isize;
        if bytes % size_i != 0 {
            return Err(DistanceError::Misaligned {
                ty: type_name::<T>(),
                bytes,
                size,
            });
        }
        Ok(bytes / size_i)
    }

    /// Like [`offset_from`](Self::offset_from), for handles whose element
    /// types are only known to match at runtime.
    ///
    /// # Errors
    ///
    /// [`DistanceError::ElementMismatch`] if `U` is not `T`, plus the errors
    /// of [`offset_from`](Self::offset_from).
    pub fn offset_from_any<U: 'static>(self, origin: Handle<U>) -> Result<isize, DistanceError>
    where
        T: 'static,
    {
        if TypeId::of::<T>() != TypeId::of::<U>() {
            return Err(DistanceError::ElementMismatch {
                lhs: type_name::<T>(),
                rhs: type_name::<U>(),
            });
        }
        self.offset_from(origin.cast())
    }
}

impl<T> Add<isize> for Handle<T> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: isize) -> Self {
        self.offset(rhs)
    }
}

impl<T> Sub<isize> for Handle<T> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: isize) -> Self {
        self.offset(rhs.wrapping_neg())
    }
}

impl<T> Sub for Handle<T> {
    type Output = Result<isize, DistanceError>;

    /// Same as [`Handle::offset_from`].
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.offset_from(rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::Handle;
    use crate::error::DistanceError;

    #[test]
    fn add_then_subtract() {
        let mut buf = [0i64; 16];
        let p = Handle::from_source(&mut buf);

        for i in [-3isize, 0, 1, 7, 15] {
            let q = p + i;
            assert_eq!(q - p, Ok(i));
            assert_eq!(q - i, p);
        }
    }

    #[test]
    fn add_matches_raw_offsets() {
        let mut buf = [0u16; 4];
        let p = Handle::from_source(&mut buf);

        assert_eq!((p + 3).addr(), p.addr() + 6);
        assert_eq!(p.add(2), p + 2);
        assert_eq!(p.add(2).sub(2), p);
        assert_eq!(p.byte_add(4), p + 2);
        assert_eq!(p.byte_offset(-2), p - 1);
    }

    #[test]
    fn misaligned_distance_is_rejected() {
        let mut buf = [0u32; 4];
        let p = Handle::from_source(&mut buf);
        let q = p.byte_add(6);

        assert_eq!(
            q - p,
            Err(DistanceError::Misaligned {
                ty: "u32",
                bytes: 6,
                size: 4,
            })
        );
    }

    #[test]
    fn zero_sized_distance_is_rejected() {
        let p = Handle::<()>::from_addr(8);
        assert!(matches!(p - p, Err(DistanceError::ZeroSized { .. })));
    }

    #[test]
    fn mismatched_elements_are_rejected() {
        let mut buf = [0u32; 2];
        let p = Handle::from_source(&mut buf);

        assert_eq!((p + 1).offset_from_any(p), Ok(1));
        assert!(matches!(
            p.offset_from_any(p.cast::<f32>()),
            Err(DistanceError::ElementMismatch {
                lhs: "u32",
                rhs: "f32"
            })
        ));
    }
}
