use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use super::ArrayView;

/// A filtered view selecting arbitrary positions of one contiguous window.
///
/// The window spans the smallest and largest requested position; the view
/// itself lists the requested positions in the caller's order, including
/// repeats. Like [`ArrayView`], nothing is copied and indexing is 0-based.
///
/// # Examples
///
/// ```
/// use fp_ptr::Handle;
///
/// let mut buf = [10, 20, 30, 40, 50];
/// let p = Handle::from_source(&mut buf);
///
/// let view = unsafe { p.view(vec![4, 2, 4]) }.unwrap();
/// assert_eq!(view.window().len(), 3);
/// assert_eq!(view.to_vec(), [40, 20, 40]);
/// ```
pub struct IndexView<'a, T> {
    window: ArrayView<'a, T>,
    // Offsets into `window`, one per requested position.
    picks: Vec<usize>,
}

impl<'a, T> IndexView<'a, T> {
    pub(crate) fn new(window: ArrayView<'a, T>, picks: Vec<usize>) -> Self {
        debug_assert!(picks.iter().all(|&i| i < window.len()));
        Self { window, picks }
    }

    /// Returns the number of selected positions, repeats included.
    #[inline]
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Returns `true` if nothing is selected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Returns the contiguous window the selection lives in.
    #[inline]
    pub fn window(&self) -> &ArrayView<'a, T> {
        &self.window
    }

    /// Returns the selected offsets relative to the window start.
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.picks
    }

    /// Returns the `k`-th selected element.
    #[inline]
    pub fn get(&self, k: usize) -> Option<&T> {
        let i = *self.picks.get(k)?;
        self.window.as_slice().get(i)
    }

    /// Returns the `k`-th selected element mutably.
    #[inline]
    pub fn get_mut(&mut self, k: usize) -> Option<&mut T> {
        let i = *self.picks.get(k)?;
        self.window.as_mut_slice().get_mut(i)
    }

    /// Iterates the selected elements in selection order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        let data = self.window.as_slice();
        self.picks.iter().map(move |&i| &data[i])
    }

    /// Copies the selected elements out.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> Index<usize> for IndexView<'_, T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, k: usize) -> &T {
        &self.window[self.picks[k]]
    }
}

impl<T> IndexMut<usize> for IndexView<'_, T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, k: usize) -> &mut T {
        let i = self.picks[k];
        &mut self.window[i]
    }
}

impl<T: fmt::Debug> fmt::Debug for IndexView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Handle;
    use alloc::vec;

    #[test]
    fn order_and_repeats_are_kept() {
        let mut buf = [1u16, 2, 3, 4, 5, 6, 7];
        let p = Handle::from_source(&mut buf);

        let view = unsafe { p.view([6isize, 2, 6, 3]) }.unwrap();
        assert_eq!(view.len(), 4);
        assert_eq!(view.window().len(), 5);
        assert_eq!(view.window().handle(), p + 1);
        assert_eq!(view.offsets(), [4, 0, 4, 1]);
        assert_eq!(view.to_vec(), [6, 2, 6, 3]);
        assert_eq!(view[2], 6);
    }

    #[test]
    fn writes_alias_the_source() {
        let mut buf = [0i32; 5];
        let p = Handle::from_source(&mut buf);

        let mut view = unsafe { p.view(vec![5, 1]) }.unwrap();
        view[0] = 50;
        *view.get_mut(1).unwrap() = 10;
        assert_eq!(view.get(2), None);
        drop(view);

        assert_eq!(buf, [10, 0, 0, 0, 50]);
    }

    #[test]
    fn empty_selection() {
        let p = Handle::<f64>::null();
        let none: &[isize] = &[];
        let view = unsafe { p.view(none) }.unwrap();

        assert!(view.is_empty());
        assert!(view.window().is_empty());
        assert_eq!(view.iter().count(), 0);
    }
}
