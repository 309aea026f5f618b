use alloc::string::{FromUtf8Error, String};
use alloc::vec::Vec;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// A misuse of the layout/projection layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    #[error("type `{ty}` has no field named `{name}`")]
    Unknown { ty: &'static str, name: String },

    #[error("type `{ty}` has no field at position {index} (it has {count} fields)")]
    OutOfRange {
        ty: &'static str,
        index: usize,
        count: usize,
    },

    #[error("field `{field}` of `{ty}` has type `{actual}`, not `{requested}`")]
    TypeMismatch {
        ty: &'static str,
        field: &'static str,
        actual: &'static str,
        requested: &'static str,
    },

    #[error(
        "cannot assign field `{field}` of `{ty}` directly, store through the field handle instead"
    )]
    Assignment { ty: &'static str, field: String },
}

/// A misuse of handle subtraction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DistanceError {
    #[error("cannot measure the distance between `Handle<{lhs}>` and `Handle<{rhs}>`")]
    ElementMismatch {
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("byte distance {bytes} is not a multiple of {size}, the size of `{ty}`")]
    Misaligned {
        ty: &'static str,
        bytes: isize,
        size: usize,
    },

    #[error("`{ty}` is zero-sized, element distance is undefined")]
    ZeroSized { ty: &'static str },
}

/// A value that is not exactly representable in the target element type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("value of type `{from}` is not exactly representable as `{to}`")]
pub struct ConversionError {
    pub from: &'static str,
    pub to: &'static str,
}

/// A misuse of the materialization layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MaterializeError {
    #[error("array of shape {dims:?} over `{ty}` exceeds the addressable size")]
    ShapeOverflow { ty: &'static str, dims: Vec<usize> },

    #[error("bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Any usage error reported by this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PtrError {
    #[error("field access failed: {0}")]
    Field(FieldError),

    #[error("handle distance failed: {0}")]
    Distance(DistanceError),

    #[error("store failed: {0}")]
    Conversion(ConversionError),

    #[error("materialization failed: {0}")]
    Materialize(MaterializeError),
}

impl PtrError {
    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        panic!("{self}");
    }
}

macro_rules! impl_from {
    ($name:ident, $variant:ident) => {
        impl From<$name> for PtrError {
            #[inline]
            fn from(value: $name) -> Self {
                PtrError::$variant(value)
            }
        }

        impl $name {
            #[cold]
            #[inline(never)]
            pub fn handle_error(&self) -> ! {
                panic!("{self}");
            }

            #[inline]
            pub fn promote(self) -> PtrError {
                PtrError::$variant(self)
            }
        }
    };
}

impl_from!(FieldError, Field);
impl_from!(DistanceError, Distance);
impl_from!(ConversionError, Conversion);
impl_from!(MaterializeError, Materialize);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offender() {
        let err = FieldError::Unknown {
            ty: "Point",
            name: "z".to_string(),
        };
        assert_eq!(err.to_string(), "type `Point` has no field named `z`");

        let err = DistanceError::Misaligned {
            ty: "u32",
            bytes: 6,
            size: 4,
        };
        assert!(err.to_string().contains("`u32`"));
    }

    #[test]
    fn promote_keeps_kind() {
        let err = ConversionError {
            from: "f64",
            to: "i32",
        };
        assert!(matches!(err.promote(), PtrError::Conversion(e) if e == err));

        let err: PtrError = DistanceError::ZeroSized { ty: "()" }.into();
        assert!(matches!(
            err,
            PtrError::Distance(DistanceError::ZeroSized { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "cannot assign field `a`")]
    fn handle_error_panics() {
        FieldError::Assignment {
            ty: "Foo",
            field: "a".to_string(),
        }
        .handle_error();
    }
}
