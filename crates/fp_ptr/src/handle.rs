use core::any::type_name;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ptr::{self, NonNull};

// -----------------------------------------------------------------------------
// Handle

/// A typed handle over a raw address, similar to `*mut T`.
///
/// # not owning
///
/// The handle never owns, allocates or frees the memory it points to, and
/// holds nothing that keeps the pointee alive. The caller must keep the
/// backing storage alive and in place for as long as the handle is used.
///
/// # identity
///
/// Two handles are equal when their addresses are equal, independent of the
/// element type. A handle can also be compared with a bare raw pointer.
///
/// # immutable value
///
/// A handle is `Copy` and never changes after construction. Arithmetic,
/// reinterpretation and field projection all return new handles.
///
/// # Examples
///
/// ```
/// use fp_ptr::Handle;
///
/// let mut buf = [1, 2, 3];
/// let p = Handle::from_source(&mut buf);
///
/// assert_eq!(p.as_ptr(), buf.as_mut_ptr());
/// assert_eq!(unsafe { p.load_at(2) }, 2);
/// ```
#[repr(transparent)]
pub struct Handle<T>(pub(crate) *mut T);

// SAFETY: a handle is an address and nothing else. Every operation that
// touches the pointee is `unsafe`, and synchronizing such accesses across
// threads is part of its contract.
unsafe impl<T> Send for Handle<T> {}
unsafe impl<T> Sync for Handle<T> {}

impl<T> Handle<T> {
    /// Creates a handle from a raw pointer. No validation is performed.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut x = 5u16;
    /// let p = Handle::new(&raw mut x);
    /// assert_eq!(unsafe { p.load() }, 5);
    /// ```
    #[inline(always)]
    pub const fn new(ptr: *mut T) -> Self {
        Self(ptr)
    }

    /// Creates a handle from a `*const` pointer.
    ///
    /// Storing through the result is only allowed if the pointee was not
    /// derived from a shared reference.
    #[inline(always)]
    pub const fn from_const(ptr: *const T) -> Self {
        Self(ptr.cast_mut())
    }

    /// Creates a handle from a numeric address, picking up any previously
    /// exposed provenance.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut x = 7i64;
    /// let addr = (&raw mut x).expose_provenance();
    ///
    /// let p = Handle::<i64>::from_addr(addr);
    /// assert_eq!(unsafe { p.load() }, 7);
    /// ```
    #[inline]
    pub fn from_addr(addr: usize) -> Self {
        Self(ptr::with_exposed_provenance_mut(addr))
    }

    /// Creates a null handle.
    #[inline(always)]
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Creates a handle from a shared reference.
    ///
    /// The handle is read-only in practice: storing through it is undefined
    /// behavior unless the pointee sits behind an `UnsafeCell`.
    #[inline(always)]
    pub const fn from_ref(r: &T) -> Self {
        Self(ptr::from_ref(r).cast_mut())
    }

    /// Creates a handle from a mutable reference.
    ///
    /// The borrow ends here, the handle does not carry its lifetime.
    #[inline(always)]
    pub const fn from_mut(r: &mut T) -> Self {
        Self(ptr::from_mut(r))
    }

    /// Reinterprets the handle with a new element type.
    ///
    /// The address is kept as is; nothing is checked.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut x = 0x0102_0304u32;
    /// let p = Handle::from_mut(&mut x);
    /// let q = p.cast::<u8>();
    ///
    /// assert_eq!(p, q);
    /// assert_eq!(q.as_ptr().cast::<u32>(), p.as_ptr());
    /// ```
    #[inline(always)]
    pub const fn cast<U>(self) -> Handle<U> {
        Handle(self.0.cast())
    }

    /// Returns the underlying raw pointer.
    #[inline(always)]
    pub const fn as_ptr(self) -> *mut T {
        self.0
    }

    /// Returns the underlying raw pointer as `*const T`.
    #[inline(always)]
    pub const fn as_const_ptr(self) -> *const T {
        self.0.cast_const()
    }

    /// Returns the numeric address, without exposing provenance.
    #[inline]
    pub fn addr(self) -> usize {
        self.0.addr()
    }

    /// Returns the numeric address and exposes its provenance, so it can be
    /// turned back into a handle with [`from_addr`](Self::from_addr).
    #[inline]
    pub fn expose_provenance(self) -> usize {
        self.0.expose_provenance()
    }

    /// Returns `true` if the address is null.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Converts to `NonNull<T>`, or `None` if the address is null.
    #[inline]
    pub const fn as_non_null(self) -> Option<NonNull<T>> {
        NonNull::new(self.0)
    }

    /// Check if the address is aligned for `T`.
    #[inline]
    pub fn is_aligned(self) -> bool {
        self.0.is_aligned()
    }

    /// A function that only checks alignment in debug mode.
    ///
    /// Ensure that no expenses in release mode.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub fn debug_assert_aligned(self) {
        #[cfg(feature = "debug")]
        debug_assert!(
            self.is_aligned(),
            "handle is not aligned. Address {:p} does not have alignment {} for type {}",
            self.0,
            align_of::<T>(),
            type_name::<T>(),
        );
    }
}

// -----------------------------------------------------------------------------
// Value semantics

impl<T> Clone for Handle<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Default for Handle<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T, U> PartialEq<Handle<U>> for Handle<T> {
    #[inline]
    fn eq(&self, other: &Handle<U>) -> bool {
        ptr::addr_eq(self.0, other.0)
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialEq<*mut T> for Handle<T> {
    #[inline]
    fn eq(&self, other: &*mut T) -> bool {
        ptr::addr_eq(self.0, *other)
    }
}

impl<T> PartialEq<*const T> for Handle<T> {
    #[inline]
    fn eq(&self, other: &*const T) -> bool {
        ptr::addr_eq(self.0, *other)
    }
}

impl<T> PartialEq<Handle<T>> for *mut T {
    #[inline]
    fn eq(&self, other: &Handle<T>) -> bool {
        ptr::addr_eq(*self, other.0)
    }
}

impl<T> PartialEq<Handle<T>> for *const T {
    #[inline]
    fn eq(&self, other: &Handle<T>) -> bool {
        ptr::addr_eq(*self, other.0)
    }
}

impl<T> PartialOrd for Handle<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T> Hash for Handle<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl<T> From<*mut T> for Handle<T> {
    #[inline(always)]
    fn from(ptr: *mut T) -> Self {
        Self(ptr)
    }
}

impl<T> From<*const T> for Handle<T> {
    #[inline(always)]
    fn from(ptr: *const T) -> Self {
        Self::from_const(ptr)
    }
}

impl<T> From<NonNull<T>> for Handle<T> {
    #[inline(always)]
    fn from(ptr: NonNull<T>) -> Self {
        Self(ptr.as_ptr())
    }
}

impl<T> From<Handle<T>> for *mut T {
    #[inline(always)]
    fn from(handle: Handle<T>) -> Self {
        handle.0
    }
}

impl<T> From<Handle<T>> for *const T {
    #[inline(always)]
    fn from(handle: Handle<T>) -> Self {
        handle.0.cast_const()
    }
}

// -----------------------------------------------------------------------------
// Formatting

impl<T> fmt::Pointer for Handle<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({:p})", type_name::<T>(), self.0)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}> @ {:#x}", type_name::<T>(), self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;
    use alloc::format;
    use core::ptr;

    #[test]
    fn raw_address_round_trip() {
        let mut x = 3i32;
        let raw = &raw mut x;

        let p = Handle::new(raw);
        assert_eq!(p.as_ptr(), raw);
        assert_eq!(<*mut i32>::from(p), raw);
        assert_eq!(Handle::<i32>::null().as_ptr(), ptr::null_mut());
    }

    #[test]
    fn cast_keeps_address() {
        let mut x = [0u64; 2];
        let p = Handle::new(x.as_mut_ptr());

        assert_eq!(p.cast::<u8>().addr(), p.addr());
        assert_eq!(p.cast::<(u8, u16)>().cast::<u64>(), p);
    }

    #[test]
    fn equality_ignores_element_type() {
        let mut x = 1u32;
        let p = Handle::from_mut(&mut x);
        let q = p.cast::<f32>();
        let raw: *mut u32 = &raw mut x;

        assert!(p == q);
        assert!(p == raw);
        assert!(raw == p);
        assert!(p == raw.cast_const());
        assert!(raw.cast_const() == p);
        assert_ne!(p, Handle::<u32>::null());
    }

    #[test]
    fn exposed_address_round_trip() {
        let mut x = 11u8;
        let addr = Handle::from_mut(&mut x).expose_provenance();
        let p = Handle::<u8>::from_addr(addr);

        assert_eq!(p.addr(), addr);
        assert_eq!(unsafe { p.load() }, 11);
    }

    #[test]
    fn display_shows_type_and_address() {
        let p = Handle::<u16>::from_addr(0x10);

        assert_eq!(format!("{p}"), "Handle<u16> @ 0x10");
        assert!(format!("{p:?}").starts_with("Handle<u16>("));
    }

    #[cfg(feature = "std")]
    #[test]
    fn aliasing_handles_across_threads() {
        let mut buf = [0u32; 4];
        let p = Handle::from_source(&mut buf);

        std::thread::scope(|s| {
            for i in 1..=4 {
                // Disjoint positions, no synchronization needed.
                s.spawn(move || unsafe { p.store_at(i, i as u32 * 10) });
            }
        });
        assert_eq!(buf, [10, 20, 30, 40]);
    }

    #[test]
    fn null_handle() {
        let p = Handle::<u8>::default();
        assert!(p.is_null());
        assert!(p.as_non_null().is_none());
    }
}
