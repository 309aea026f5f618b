//! The auto-wrap policy applied by [`Handle::load`].
//!
//! Pointer-valued slots are almost always re-dereferenced right away, so a
//! load of a pointer-like element returns a new [`Handle`] over the loaded
//! address instead of the bare value. Every element type states whether it
//! is pointer-like by implementing [`AutoWrap`]; types that are plain data
//! opt in with [`impl_plain_element!`](crate::impl_plain_element).
//!
//! The escape hatch [`Handle::load_raw`] always returns the raw value.

use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::Handle;

/// A type-level policy deciding what a load of `Self` returns.
///
/// # Examples
///
/// A user-defined pointer wrapper can opt in:
///
/// ```
/// use fp_ptr::{AutoWrap, Handle};
///
/// #[derive(Clone, Copy)]
/// #[repr(transparent)]
/// struct NodeRef(*mut u32);
///
/// impl AutoWrap for NodeRef {
///     const IS_POINTER_LIKE: bool = true;
///     type Output = Handle<u32>;
///
///     fn auto_wrap(self) -> Handle<u32> {
///         Handle::new(self.0)
///     }
/// }
///
/// let mut value = 9u32;
/// let mut slot = NodeRef(&raw mut value);
/// let p = Handle::from_mut(&mut slot);
///
/// assert_eq!(unsafe { p.load().load() }, 9);
/// ```
pub trait AutoWrap: Sized {
    /// Whether a load returns a new handle rather than the bare value.
    const IS_POINTER_LIKE: bool;

    /// The result type of a default (auto-wrapping) load.
    type Output;

    /// Converts a loaded value to the load result.
    fn auto_wrap(self) -> Self::Output;
}

/// Registers types as plain (not pointer-like) elements.
///
/// Implements [`AutoWrap`](crate::AutoWrap) with `Output = Self` and the
/// identity [`ExactFrom`](crate::ExactFrom) conversion, so the types can be
/// loaded and stored through a [`Handle`](crate::Handle).
///
/// `#[derive(Layout)]` does this automatically for records.
///
/// # Examples
///
/// ```
/// use fp_ptr::{Handle, impl_plain_element};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// struct Rgb(u8, u8, u8);
///
/// impl_plain_element!(Rgb);
///
/// let mut px = Rgb(1, 2, 3);
/// let p = Handle::from_mut(&mut px);
/// unsafe { p.try_store(Rgb(4, 5, 6)).unwrap() };
///
/// assert_eq!(unsafe { p.load() }, Rgb(4, 5, 6));
/// ```
#[macro_export]
macro_rules! impl_plain_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::AutoWrap for $ty {
                const IS_POINTER_LIKE: bool = false;
                type Output = Self;

                #[inline(always)]
                fn auto_wrap(self) -> Self {
                    self
                }
            }

            impl $crate::ExactFrom<$ty> for $ty {
                #[inline(always)]
                fn exact_from(value: $ty) -> ::core::option::Option<Self> {
                    ::core::option::Option::Some(value)
                }
            }
        )*
    };
}

// Numeric identity conversions live with the numeric policy.
macro_rules! impl_plain_wrap {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AutoWrap for $ty {
                const IS_POINTER_LIKE: bool = false;
                type Output = Self;

                #[inline(always)]
                fn auto_wrap(self) -> Self {
                    self
                }
            }
        )*
    };
}

impl_plain_wrap!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl_plain_element!(bool, char, ());

// -----------------------------------------------------------------------------
// Pointer-like

impl<T> AutoWrap for *mut T {
    const IS_POINTER_LIKE: bool = true;
    type Output = Handle<T>;

    #[inline(always)]
    fn auto_wrap(self) -> Handle<T> {
        Handle::new(self)
    }
}

impl<T> AutoWrap for *const T {
    const IS_POINTER_LIKE: bool = true;
    type Output = Handle<T>;

    #[inline(always)]
    fn auto_wrap(self) -> Handle<T> {
        Handle::from_const(self)
    }
}

impl<T> AutoWrap for NonNull<T> {
    const IS_POINTER_LIKE: bool = true;
    type Output = Handle<T>;

    #[inline(always)]
    fn auto_wrap(self) -> Handle<T> {
        Handle::from(self)
    }
}

impl<T> AutoWrap for Handle<T> {
    const IS_POINTER_LIKE: bool = true;
    type Output = Handle<T>;

    #[inline(always)]
    fn auto_wrap(self) -> Handle<T> {
        self
    }
}

// -----------------------------------------------------------------------------
// Aggregates

impl<T, const N: usize> AutoWrap for [T; N] {
    const IS_POINTER_LIKE: bool = false;
    type Output = Self;

    #[inline(always)]
    fn auto_wrap(self) -> Self {
        self
    }
}

impl<T> AutoWrap for MaybeUninit<T> {
    const IS_POINTER_LIKE: bool = false;
    type Output = Self;

    #[inline(always)]
    fn auto_wrap(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::AutoWrap;
    use crate::Handle;
    use core::ptr::NonNull;

    #[test]
    fn pointer_like_flags() {
        assert!(<*mut u8 as AutoWrap>::IS_POINTER_LIKE);
        assert!(<*const u8 as AutoWrap>::IS_POINTER_LIKE);
        assert!(<NonNull<u8> as AutoWrap>::IS_POINTER_LIKE);
        assert!(<Handle<u8> as AutoWrap>::IS_POINTER_LIKE);

        assert!(!<u8 as AutoWrap>::IS_POINTER_LIKE);
        assert!(!<f64 as AutoWrap>::IS_POINTER_LIKE);
        assert!(!<[*mut u8; 2] as AutoWrap>::IS_POINTER_LIKE);
        assert!(!<(*mut u8, u8) as AutoWrap>::IS_POINTER_LIKE);
    }

    #[test]
    fn wrap_keeps_address() {
        let mut x = 1i32;
        let raw: *mut i32 = &raw mut x;

        assert_eq!(raw.auto_wrap(), raw);
        assert_eq!(raw.cast_const().auto_wrap(), raw);
        assert_eq!(5i32.auto_wrap(), 5);
    }
}
