//! Compile-time record layouts and field projection.
//!
//! A record type describes its fields by implementing [`Layout`] and one
//! [`Field<N>`] per field, usually through `#[derive(Layout)]`. All offsets
//! are constants computed with [`core::mem::offset_of!`], so a projection is
//! a single address addition and an unknown field is a compile error.
//!
//! Tuples up to arity 12 are records with positional fields `_1`, `_2`, ...
//!
//! # Examples
//!
//! ```
//! use fp_ptr::{Handle, Layout};
//!
//! #[derive(Layout, Clone, Copy)]
//! #[repr(C)]
//! struct Sample {
//!     a: i64,
//!     b: (f64, i64),
//! }
//!
//! let mut s = Sample { a: 1, b: (2.5, 3) };
//! let p = Handle::from_mut(&mut s);
//!
//! // Named projection goes through the generated `SampleFields` trait.
//! assert_eq!(unsafe { p.a().load() }, 1);
//! assert_eq!(unsafe { p.b().field::<2>().load() }, 3);
//! assert_eq!(unsafe { p.b().load() }, (2.5, 3));
//!
//! // Store through the field handle, never into the field itself.
//! unsafe { p.b().field::<1>().store(4.5) };
//! assert!(p.set_field("a", 7).is_err());
//! assert_eq!(s.b.0, 4.5);
//! ```

use alloc::string::ToString;
use core::any::{TypeId, type_name};

use crate::Handle;
use crate::convert::ExactFrom;
use crate::error::{FieldError, PtrError};

// -----------------------------------------------------------------------------
// Modules

mod tuple;

// -----------------------------------------------------------------------------
// FieldInfo

/// Static description of one record field.
#[derive(Clone, Copy, Debug)]
pub struct FieldInfo {
    name: &'static str,
    index: usize,
    offset: usize,
    size: usize,
    // `TypeId::of` is not callable in const contexts; a function pointer delays it.
    ty_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
}

impl FieldInfo {
    /// Creates the description of field `index` (1-based) of type `F`.
    #[inline]
    pub const fn new<F: 'static>(name: &'static str, index: usize, offset: usize) -> Self {
        Self {
            name,
            index,
            offset,
            size: size_of::<F>(),
            ty_id: TypeId::of::<F>,
            type_name: type_name::<F>,
        }
    }

    /// Returns the field name, `_N` for positional fields.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the 1-based declaration position.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the byte offset from the start of the record.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the size of the field type.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the `TypeId` of the field type.
    #[inline]
    pub fn ty_id(&self) -> TypeId {
        (self.ty_id)()
    }

    /// Returns the name of the field type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn type_is<U: 'static>(&self) -> bool {
        self.ty_id() == TypeId::of::<U>()
    }
}

// -----------------------------------------------------------------------------
// Layout

/// A record type with a compile-time field table.
///
/// # Safety
///
/// - `FIELDS` lists every field in declaration order with positions
///   `1..=FIELDS.len()`.
/// - Each entry's offset, size and type describe the real field of `Self`.
pub unsafe trait Layout: Sized {
    const FIELDS: &'static [FieldInfo];
}

/// Field `N` (1-based) of a record type.
///
/// # Safety
///
/// `Self` must contain a valid `Type` at byte offset `OFFSET`.
pub unsafe trait Field<const N: usize>: Layout {
    type Type;

    const NAME: &'static str;
    const OFFSET: usize;
}

// -----------------------------------------------------------------------------
// Projection

impl<T: Layout> Handle<T> {
    /// Projects onto field `N` (1-based), the `_N` field.
    ///
    /// The result points at `address + offset` and has the field's type.
    /// Nothing is read.
    #[inline(always)]
    pub const fn field<const N: usize>(self) -> Handle<<T as Field<N>>::Type>
    where
        T: Field<N>,
    {
        Handle(self.0.wrapping_byte_add(<T as Field<N>>::OFFSET).cast())
    }

    /// Returns the field table of `T`.
    #[inline]
    pub const fn fields() -> &'static [FieldInfo] {
        T::FIELDS
    }

    /// Returns the field names of `T` in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let names: Vec<_> = Handle::<(u8, f32)>::field_names().collect();
    /// assert_eq!(names, ["_1", "_2"]);
    /// ```
    pub fn field_names() -> impl ExactSizeIterator<Item = &'static str> {
        T::FIELDS.iter().map(FieldInfo::name)
    }

    /// Looks up a field by name.
    ///
    /// Besides declared names, `_N` and a bare decimal `N` select the field
    /// at position `N` (1-based).
    ///
    /// # Errors
    ///
    /// - [`FieldError::Unknown`] if no field matches.
    /// - [`FieldError::OutOfRange`] if a positional name is past the end.
    pub fn find_field(name: &str) -> Result<&'static FieldInfo, FieldError> {
        if let Some(info) = T::FIELDS.iter().find(|info| info.name == name) {
            return Ok(info);
        }

        match positional_index(name) {
            Some(index) => Self::find_field_at(index),
            None => {
                log::debug!("`{}` has no field `{name}`", type_name::<T>());
                Err(FieldError::Unknown {
                    ty: type_name::<T>(),
                    name: name.to_string(),
                })
            }
        }
    }

    /// Looks up the field at position `index` (1-based).
    ///
    /// # Errors
    ///
    /// [`FieldError::OutOfRange`] if there is no such position.
    pub fn find_field_at(index: usize) -> Result<&'static FieldInfo, FieldError> {
        match index.checked_sub(1).and_then(|i| T::FIELDS.get(i)) {
            Some(info) => Ok(info),
            None => {
                log::debug!("`{}` has no field at {index}", type_name::<T>());
                Err(FieldError::OutOfRange {
                    ty: type_name::<T>(),
                    index,
                    count: T::FIELDS.len(),
                })
            }
        }
    }

    /// Projects onto a field selected at runtime, checking its name and type
    /// before anything is touched.
    ///
    /// Prefer the generated accessors or [`field`](Self::field), which
    /// resolve at compile time.
    ///
    /// # Errors
    ///
    /// The errors of [`find_field`](Self::find_field), and
    /// [`FieldError::TypeMismatch`] if the field is not of type `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut pair = (1u8, 2.0f32);
    /// let p = Handle::from_mut(&mut pair);
    ///
    /// let second = p.field_named::<f32>("_2").unwrap();
    /// assert_eq!(second, p.field::<2>());
    /// assert!(p.field_named::<u8>("_2").is_err());
    /// assert!(p.field_named::<u8>("_3").is_err());
    /// ```
    pub fn field_named<U: 'static>(self, name: &str) -> Result<Handle<U>, FieldError> {
        let info = Self::find_field(name)?;
        self.project_checked(info)
    }

    /// Projects onto the field at position `index` (1-based), checking its
    /// type before anything is touched.
    ///
    /// # Errors
    ///
    /// [`FieldError::OutOfRange`] or [`FieldError::TypeMismatch`].
    pub fn field_at<U: 'static>(self, index: usize) -> Result<Handle<U>, FieldError> {
        let info = Self::find_field_at(index)?;
        self.project_checked(info)
    }

    fn project_checked<U: 'static>(self, info: &'static FieldInfo) -> Result<Handle<U>, FieldError> {
        if !info.type_is::<U>() {
            return Err(FieldError::TypeMismatch {
                ty: type_name::<T>(),
                field: info.name,
                actual: info.type_name(),
                requested: type_name::<U>(),
            });
        }
        log::trace!("projecting {self} onto `{}`", info.name);
        Ok(Handle(self.0.wrapping_byte_add(info.offset).cast()))
    }

    /// Stores `value` into the field `name` of type `U`, converting it
    /// exactly.
    ///
    /// Both the field and the conversion are checked before anything is
    /// written.
    ///
    /// # Errors
    ///
    /// - [`PtrError::Field`] as for [`field_named`](Self::field_named).
    /// - [`PtrError::Conversion`] if `value` is not exactly a `U`.
    ///
    /// # Safety
    ///
    /// The handle must address a valid, aligned `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    /// use fp_ptr::error::PtrError;
    ///
    /// let mut pair = (0i64, 0.0f64);
    /// let p = Handle::from_mut(&mut pair);
    ///
    /// unsafe { p.store_field_named::<f64, _>("_2", 3i32) }.unwrap();
    /// assert_eq!(pair, (0, 3.0));
    ///
    /// let err = unsafe { p.store_field_named::<i64, _>("_1", 0.5f64) };
    /// assert!(matches!(err, Err(PtrError::Conversion(_))));
    /// ```
    pub unsafe fn store_field_named<U, V>(self, name: &str, value: V) -> Result<(), PtrError>
    where
        U: ExactFrom<V> + Copy + 'static,
    {
        let field = self.field_named::<U>(name)?;
        // SAFETY: the projection stays inside the `T` the caller vouches for.
        unsafe { field.try_store(value) }?;
        Ok(())
    }

    /// Always fails: a field cannot be assigned through the parent handle.
    ///
    /// Assigning "the field" is ambiguous between replacing the sub-object
    /// and storing through it. Store through the field handle instead, e.g.
    /// `p.field::<1>().store(x)` or `p.name().store(x)`.
    ///
    /// # Errors
    ///
    /// Always [`FieldError::Assignment`], naming the field.
    pub fn set_field<V>(self, name: &str, _value: V) -> Result<(), FieldError> {
        log::debug!("rejected direct assignment to `{name}` through {self}");
        Err(FieldError::Assignment {
            ty: type_name::<T>(),
            field: name.to_string(),
        })
    }
}

/// Parses `_N` or `N` with `N` a canonical decimal: no sign, no leading zero.
fn positional_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('_').unwrap_or(name);
    let canonical = match digits.as_bytes() {
        [] | [b'0', _, ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    };
    if canonical { digits.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldInfo, Layout};
    use crate::Handle;
    use crate::error::{FieldError, PtrError};
    use alloc::vec::Vec;
    use core::mem::offset_of;

    #[derive(Clone, Copy, Debug, PartialEq)]
    #[repr(C)]
    struct Manual {
        tag: u8,
        value: u32,
    }

    unsafe impl Layout for Manual {
        const FIELDS: &'static [FieldInfo] = &[
            FieldInfo::new::<u8>("tag", 1, offset_of!(Manual, tag)),
            FieldInfo::new::<u32>("value", 2, offset_of!(Manual, value)),
        ];
    }

    unsafe impl Field<1> for Manual {
        type Type = u8;
        const NAME: &'static str = "tag";
        const OFFSET: usize = offset_of!(Manual, tag);
    }

    unsafe impl Field<2> for Manual {
        type Type = u32;
        const NAME: &'static str = "value";
        const OFFSET: usize = offset_of!(Manual, value);
    }

    #[test]
    fn positional_projection() {
        let mut m = Manual { tag: 1, value: 2 };
        let p = Handle::from_mut(&mut m);

        assert_eq!(p.field::<1>(), p);
        assert_eq!(p.field::<2>().addr(), p.addr() + 4);
        unsafe { p.field::<2>().store(9) };
        assert_eq!(m.value, 9);
    }

    #[test]
    fn enumeration_and_lookup() {
        let names: Vec<_> = Handle::<Manual>::field_names().collect();
        assert_eq!(names, ["tag", "value"]);

        let info = Handle::<Manual>::find_field("value").unwrap();
        assert_eq!(info.index(), 2);
        assert_eq!(info.offset(), 4);
        assert_eq!(info.size(), 4);
        assert!(info.type_is::<u32>());
        assert_eq!(info.type_name(), "u32");

        assert_eq!(Handle::<Manual>::find_field("_1").unwrap().name(), "tag");
        assert_eq!(Handle::<Manual>::find_field("2").unwrap().name(), "value");
    }

    #[test]
    fn runtime_lookup_errors() {
        let mut m = Manual { tag: 0, value: 0 };
        let p = Handle::from_mut(&mut m);

        assert!(matches!(
            p.field_named::<u8>("missing"),
            Err(FieldError::Unknown { ty: _, ref name }) if name == "missing"
        ));
        assert!(matches!(
            p.field_named::<u8>("_3"),
            Err(FieldError::OutOfRange { index: 3, count: 2, .. })
        ));
        assert!(matches!(
            p.field_at::<u8>(0),
            Err(FieldError::OutOfRange { index: 0, .. })
        ));
        assert!(matches!(
            p.field_named::<u8>("value"),
            Err(FieldError::TypeMismatch {
                field: "value",
                actual: "u32",
                requested: "u8",
                ..
            })
        ));
        assert_eq!(p.field_at::<u32>(2), Ok(p.field::<2>()));
    }

    #[test]
    fn positional_names_must_be_canonical() {
        for name in ["+1", "_+2", "01", "_002", "_", "", "-1", "1 "] {
            assert!(
                matches!(
                    Handle::<Manual>::find_field(name),
                    Err(FieldError::Unknown { .. })
                ),
                "{name:?} should not name a field"
            );
        }
        assert_eq!(Handle::<Manual>::find_field("_2").unwrap().name(), "value");
        assert!(matches!(
            Handle::<Manual>::find_field("0"),
            Err(FieldError::OutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn checked_store_by_name() {
        let mut m = Manual { tag: 0, value: 0 };
        let p = Handle::from_mut(&mut m);

        unsafe {
            p.store_field_named::<u32, _>("value", 40u8).unwrap();
            assert!(matches!(
                p.store_field_named::<u8, _>("tag", 300u32),
                Err(PtrError::Conversion(_))
            ));
            assert!(matches!(
                p.store_field_named::<u8, _>("_9", 1u8),
                Err(PtrError::Field(FieldError::OutOfRange { index: 9, .. }))
            ));
            assert!(matches!(
                p.store_field_named::<u8, _>("value", 1u8),
                Err(PtrError::Field(FieldError::TypeMismatch { .. }))
            ));
        }
        assert_eq!(m, Manual { tag: 0, value: 40 });
    }

    #[test]
    fn direct_assignment_always_fails() {
        let mut m = Manual { tag: 3, value: 4 };
        let p = Handle::from_mut(&mut m);

        for name in ["tag", "value", "nope"] {
            assert!(matches!(
                p.set_field(name, 1u8),
                Err(FieldError::Assignment { ref field, .. }) if field == name
            ));
        }
        assert_eq!(m, Manual { tag: 3, value: 4 });
    }
}
