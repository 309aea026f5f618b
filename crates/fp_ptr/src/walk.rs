use core::fmt;
use core::iter::FusedIterator;

use crate::Handle;
use crate::auto_wrap::AutoWrap;

// -----------------------------------------------------------------------------
// Walk

/// An unbounded iterator loading successive elements, auto-wrapping
/// pointer-like values.
///
/// Created by [`Handle::walk`]. The walk never ends on its own; bound it with
/// [`take`](Iterator::take), [`take_while`](Iterator::take_while) or similar.
pub struct Walk<T> {
    cursor: Handle<T>,
}

/// An unbounded iterator loading successive elements as is.
///
/// Created by [`Handle::walk_raw`].
pub struct WalkRaw<T> {
    cursor: Handle<T>,
}

impl<T> Walk<T> {
    /// Returns a handle to the element the next call to `next` will load.
    #[inline]
    pub fn cursor(&self) -> Handle<T> {
        self.cursor
    }
}

impl<T> WalkRaw<T> {
    /// Returns a handle to the element the next call to `next` will load.
    #[inline]
    pub fn cursor(&self) -> Handle<T> {
        self.cursor
    }
}

impl<T: AutoWrap + Copy> Iterator for Walk<T> {
    type Item = T::Output;

    #[inline]
    fn next(&mut self) -> Option<T::Output> {
        // SAFETY: upheld by the caller of `Handle::walk`.
        let item = unsafe { self.cursor.load() };
        self.cursor = self.cursor.add(1);
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }

    // Skipped elements are never loaded.
    #[inline]
    fn nth(&mut self, n: usize) -> Option<T::Output> {
        self.cursor = self.cursor.add(n);
        self.next()
    }
}

impl<T: Copy> Iterator for WalkRaw<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        // SAFETY: upheld by the caller of `Handle::walk_raw`.
        let item = unsafe { self.cursor.load_raw() };
        self.cursor = self.cursor.add(1);
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<T> {
        self.cursor = self.cursor.add(n);
        self.next()
    }
}

impl<T: AutoWrap + Copy> FusedIterator for Walk<T> {}
impl<T: Copy> FusedIterator for WalkRaw<T> {}

impl<T> Clone for Walk<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
        }
    }
}

impl<T> Clone for WalkRaw<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
        }
    }
}

impl<T> fmt::Debug for Walk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Walk").field(&self.cursor).finish()
    }
}

impl<T> fmt::Debug for WalkRaw<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WalkRaw").field(&self.cursor).finish()
    }
}

// -----------------------------------------------------------------------------
// Handle

impl<T> Handle<T> {
    /// Iterates the elements from position 1 onwards, without end.
    ///
    /// # Safety
    ///
    /// Every element the iterator is asked to load must be valid, aligned
    /// and initialized at the time it is loaded.
    ///
    /// # Examples
    ///
    /// ```
    /// use fp_ptr::Handle;
    ///
    /// let mut buf = [3, 1, 4, 1, 5];
    /// let p = Handle::from_source(&mut buf);
    ///
    /// let head: Vec<i32> = unsafe { p.walk() }.take(3).collect();
    /// assert_eq!(head, [3, 1, 4]);
    ///
    /// // A zero-terminated walk.
    /// let mut text = *b"abc\0";
    /// let s = Handle::from_source(&mut text);
    /// let len = unsafe { s.walk() }.take_while(|&b| b != 0).count();
    /// assert_eq!(len, 3);
    /// ```
    #[inline]
    pub unsafe fn walk(self) -> Walk<T>
    where
        T: AutoWrap + Copy,
    {
        Walk { cursor: self }
    }

    /// Like [`walk`](Self::walk), never auto-wrapping.
    ///
    /// # Safety
    ///
    /// Same as [`walk`](Self::walk).
    #[inline]
    pub unsafe fn walk_raw(self) -> WalkRaw<T>
    where
        T: Copy,
    {
        WalkRaw { cursor: self }
    }
}
