//! The narrowing policy applied by [`Handle::try_store`].
//!
//! A value is stored only when it is exactly representable in the element
//! type. Nothing is rounded, truncated, wrapped or saturated:
//!
//! - integer to integer: the value must be in range.
//! - float to integer: the value must be finite, integral and in range.
//! - integer to float: the value must survive the round trip.
//! - `f64` to `f32`: the value must survive the round trip (NaN stays NaN).
//! - every element type converts to itself.
//! - `Handle<U>` converts to `*mut U`/`*const U` and back.

use core::any::type_name;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::Handle;
use crate::error::ConversionError;

/// Exact, never-lossy conversion used for typed stores.
///
/// # Examples
///
/// ```
/// use fp_ptr::ExactFrom;
///
/// assert_eq!(i32::exact_from(2.0f64), Some(2));
/// assert_eq!(i32::exact_from(1.2f64), None);
/// assert_eq!(u8::exact_from(300i32), None);
/// assert_eq!(f32::exact_from(16_777_217i64), None);
/// ```
pub trait ExactFrom<V>: Sized {
    /// Returns `None` when `value` has no exact representation in `Self`.
    fn exact_from(value: V) -> Option<Self>;
}

/// Converts `value` or reports which types were involved.
pub(crate) fn convert<T: ExactFrom<V>, V>(value: V) -> Result<T, ConversionError> {
    T::exact_from(value).ok_or_else(|| {
        let err = ConversionError {
            from: type_name::<V>(),
            to: type_name::<T>(),
        };
        log::debug!("rejected store: {err}");
        err
    })
}

// -----------------------------------------------------------------------------
// Integers

macro_rules! int_from_ints {
    ($($dst:ty),*) => {
        $(
            int_from_ints!(@one $dst; i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        )*
    };
    (@one $dst:ty; $($src:ty),*) => {
        $(
            impl ExactFrom<$src> for $dst {
                #[inline]
                fn exact_from(value: $src) -> Option<Self> {
                    <$dst>::try_from(value).ok()
                }
            }
        )*
    };
}

int_from_ints!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! int_from_floats {
    ($($dst:ty),*) => {
        $(
            int_from_floats!(@one $dst; f32, f64);
        )*
    };
    (@one $dst:ty; $($src:ty),*) => {
        $(
            impl ExactFrom<$src> for $dst {
                #[inline]
                fn exact_from(value: $src) -> Option<Self> {
                    let value = value as f64;
                    // Both bounds are powers of two, so they are exact in f64.
                    let lo = <$dst>::MIN as f64;
                    let hi = if <$dst>::MIN == 0 {
                        <$dst>::MAX as f64 + 1.0
                    } else {
                        -lo
                    };
                    // NaN fails both comparisons.
                    if !(value >= lo && value < hi) {
                        return None;
                    }
                    let truncated = value as $dst;
                    (truncated as f64 == value).then_some(truncated)
                }
            }
        )*
    };
}

int_from_floats!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

// -----------------------------------------------------------------------------
// Floats

macro_rules! float_from_ints {
    ($($dst:ty),*) => {
        $(
            float_from_ints!(@one $dst; i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        )*
    };
    (@one $dst:ty; $($src:ty),*) => {
        $(
            impl ExactFrom<$src> for $dst {
                #[inline]
                fn exact_from(value: $src) -> Option<Self> {
                    let converted = value as $dst;
                    (<$src>::exact_from(converted) == Some(value)).then_some(converted)
                }
            }
        )*
    };
}

float_from_ints!(f32, f64);

impl ExactFrom<f32> for f32 {
    #[inline(always)]
    fn exact_from(value: f32) -> Option<Self> {
        Some(value)
    }
}

impl ExactFrom<f64> for f64 {
    #[inline(always)]
    fn exact_from(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl ExactFrom<f32> for f64 {
    #[inline(always)]
    fn exact_from(value: f32) -> Option<Self> {
        Some(value as f64)
    }
}

impl ExactFrom<f64> for f32 {
    #[inline]
    fn exact_from(value: f64) -> Option<Self> {
        let narrowed = value as f32;
        (narrowed as f64 == value || value.is_nan()).then_some(narrowed)
    }
}

// -----------------------------------------------------------------------------
// Pointers

impl<T> ExactFrom<*mut T> for *mut T {
    #[inline(always)]
    fn exact_from(value: *mut T) -> Option<Self> {
        Some(value)
    }
}

impl<T> ExactFrom<*const T> for *const T {
    #[inline(always)]
    fn exact_from(value: *const T) -> Option<Self> {
        Some(value)
    }
}

impl<T> ExactFrom<NonNull<T>> for NonNull<T> {
    #[inline(always)]
    fn exact_from(value: NonNull<T>) -> Option<Self> {
        Some(value)
    }
}

impl<T> ExactFrom<Handle<T>> for Handle<T> {
    #[inline(always)]
    fn exact_from(value: Handle<T>) -> Option<Self> {
        Some(value)
    }
}

impl<T> ExactFrom<Handle<T>> for *mut T {
    #[inline(always)]
    fn exact_from(value: Handle<T>) -> Option<Self> {
        Some(value.as_ptr())
    }
}

impl<T> ExactFrom<Handle<T>> for *const T {
    #[inline(always)]
    fn exact_from(value: Handle<T>) -> Option<Self> {
        Some(value.as_const_ptr())
    }
}

impl<T> ExactFrom<Handle<T>> for NonNull<T> {
    #[inline]
    fn exact_from(value: Handle<T>) -> Option<Self> {
        value.as_non_null()
    }
}

impl<T> ExactFrom<*mut T> for Handle<T> {
    #[inline(always)]
    fn exact_from(value: *mut T) -> Option<Self> {
        Some(Handle::new(value))
    }
}

impl<T> ExactFrom<*const T> for Handle<T> {
    #[inline(always)]
    fn exact_from(value: *const T) -> Option<Self> {
        Some(Handle::from_const(value))
    }
}

// -----------------------------------------------------------------------------
// Aggregates

impl<T, const N: usize> ExactFrom<[T; N]> for [T; N] {
    #[inline(always)]
    fn exact_from(value: [T; N]) -> Option<Self> {
        Some(value)
    }
}

impl<T> ExactFrom<MaybeUninit<T>> for MaybeUninit<T> {
    #[inline(always)]
    fn exact_from(value: MaybeUninit<T>) -> Option<Self> {
        Some(value)
    }
}
