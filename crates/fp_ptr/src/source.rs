use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, UnsafeCell};
use core::mem::MaybeUninit;

use crate::Handle;

/// A value that can hand out a stable address of its elements.
///
/// This is the capability [`Handle::from_source`] builds on. Single-value
/// cells report the address of their content, contiguous buffers the address
/// of their first element.
///
/// # Safety
///
/// - The returned pointer must be valid for reads and writes of `Element`
///   for every element the source holds, and properly aligned.
/// - The address must stay the same as long as the source is neither moved
///   nor resized.
pub unsafe trait HasAddress {
    /// The natural element type of the source.
    type Element;

    /// Returns the address of the first element.
    fn address(&mut self) -> *mut Self::Element;
}

unsafe impl<T, const N: usize> HasAddress for [T; N] {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.as_mut_ptr()
    }
}

unsafe impl<T> HasAddress for [T] {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.as_mut_ptr()
    }
}

unsafe impl<T> HasAddress for Vec<T> {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.as_mut_ptr()
    }
}

unsafe impl<S: HasAddress + ?Sized> HasAddress for Box<S> {
    type Element = S::Element;

    #[inline(always)]
    fn address(&mut self) -> *mut S::Element {
        (**self).address()
    }
}

/// Writing bytes that are not valid UTF-8 through the handle breaks the
/// `str` invariant.
unsafe impl HasAddress for str {
    type Element = u8;

    #[inline(always)]
    fn address(&mut self) -> *mut u8 {
        self.as_mut_ptr()
    }
}

/// Same caveat as `str`.
unsafe impl HasAddress for String {
    type Element = u8;

    #[inline(always)]
    fn address(&mut self) -> *mut u8 {
        self.as_mut_str().as_mut_ptr()
    }
}

unsafe impl<T> HasAddress for Cell<T> {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.as_ptr()
    }
}

unsafe impl<T> HasAddress for UnsafeCell<T> {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.get()
    }
}

/// Loading through the handle requires the content to be initialized.
unsafe impl<T> HasAddress for MaybeUninit<T> {
    type Element = T;

    #[inline(always)]
    fn address(&mut self) -> *mut T {
        self.as_mut_ptr()
    }
}

impl<T> Handle<T> {
    /// Creates a handle over the first element of `source`.
    ///
    /// The element type is inferred from the source.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::cell::Cell;
    /// use fp_ptr::Handle;
    ///
    /// let mut cell = Cell::new(4u8);
    /// let p = Handle::from_source(&mut cell);
    /// unsafe { p.store(5) };
    /// assert_eq!(cell.get(), 5);
    ///
    /// let mut text = String::from("abc");
    /// let p: Handle<u8> = Handle::from_source(&mut text);
    /// assert_eq!(unsafe { p.load_at(2) }, b'b');
    /// ```
    #[inline]
    pub fn from_source<S: HasAddress<Element = T> + ?Sized>(source: &mut S) -> Self {
        Self::new(source.address())
    }
}
