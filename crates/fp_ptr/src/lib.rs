//! A typed handle over a raw address with C-pointer-like ergonomics.
//!
//! [`Handle<T>`] is a plain address plus an element type. It is `Copy`, has
//! no lifetime, and owns nothing. On top of it this crate provides:
//!
//! **Access**
//!
//! 1-based indexed [`load_at`](Handle::load_at) / [`store_at`](Handle::store_at),
//! converting stores via [`try_store`](Handle::try_store) and gathers by index
//! set or by mask. Loading a pointer-like element (`*mut U`, `*const U`,
//! `NonNull<U>`, `Handle<U>`) yields a `Handle<U>`, see [`AutoWrap`]. The
//! `*_raw` variants never wrap.
//!
//! **Projection**
//!
//! Record types implementing [`Layout`] (tuples, or any struct with
//! `#[derive(Layout)]`) project a handle onto a field with
//! [`field::<N>`](Handle::field) or a generated named accessor. Offsets are
//! constants, unknown fields do not compile.
//!
//! **Arithmetic**
//!
//! `p + n` and `p - n` move by whole elements. `q - p` is the element
//! distance between two handles of the same type.
//!
//! **Materialization**
//!
//! [`array`](Handle::array) and [`view`](Handle::view) build non-owning
//! views, [`string`](Handle::string) copies a byte string out, and
//! [`walk`](Handle::walk) iterates without end.
//!
//! # Safety
//!
//! Nothing about the pointee is tracked. Whether the address is live, in
//! bounds, aligned and initialized is the caller's responsibility, exactly as
//! with raw pointers, and every operation that touches memory is `unsafe`.
//! Usage errors that can be found without touching memory (unknown fields,
//! inexact conversions, mismatched handle types) are reported as errors
//! before anything is read or written.
//!
//! Handles are `Send` and `Sync`: any number of them may alias the same
//! memory from any number of threads. No locking, atomicity or ordering is
//! provided, synchronizing those accesses is up to the caller.
//!
//! # Examples
//!
//! ```
//! use fp_ptr::Handle;
//!
//! let mut buf = [1, 2, 3, 4, 5, 6, 7, 8];
//! let p = Handle::from_source(&mut buf);
//! let q = p + 2;
//!
//! unsafe {
//!     assert_eq!(q.load(), 3);
//!     q.store(77);
//! }
//! assert_eq!(q - p, Ok(2));
//! assert_eq!(buf, [1, 2, 77, 4, 5, 6, 7, 8]);
//! ```
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro names `fp_ptr`, which must also resolve inside this crate.
extern crate self as fp_ptr;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod access;
mod arith;
mod auto_wrap;
mod convert;
mod handle;
mod source;
mod string;
mod walk;

pub mod error;
pub mod layout;
pub mod view;

// -----------------------------------------------------------------------------
// Top-level exports

pub use auto_wrap::AutoWrap;
pub use convert::ExactFrom;
pub use handle::Handle;
pub use layout::{Field, FieldInfo, Layout};
pub use source::HasAddress;
pub use view::{ArrayView, IndexView, ViewIndex};
pub use walk::{Walk, WalkRaw};

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use fp_ptr_derive::Layout;

#[cfg(all(test, feature = "derive"))]
mod tests {
    use crate::{AutoWrap, ExactFrom, Handle, Layout};
    use core::mem::offset_of;

    #[derive(Layout, Clone, Copy, Debug, PartialEq)]
    #[repr(C)]
    struct Record {
        a: i64,
        b: (f64, i64),
    }

    #[derive(Layout, Clone, Copy)]
    struct Pair(u8, u32);

    #[derive(Layout, Clone, Copy)]
    struct Node {
        value: i32,
        next: *mut Node,
    }

    /// A pointer wrapper that loads as the handle it points through.
    #[derive(Layout, Clone, Copy)]
    #[layout(auto_wrap = false)]
    #[repr(transparent)]
    struct Link {
        target: *mut u16,
    }

    impl AutoWrap for Link {
        const IS_POINTER_LIKE: bool = true;
        type Output = Handle<u16>;

        fn auto_wrap(self) -> Handle<u16> {
            Handle::new(self.target)
        }
    }

    impl ExactFrom<*mut u16> for Link {
        fn exact_from(target: *mut u16) -> Option<Self> {
            Some(Link { target })
        }
    }

    // Field names that would be shadowed by `Handle` methods.
    #[derive(Layout, Clone, Copy)]
    #[layout(accessors = false)]
    #[repr(C)]
    struct Slot {
        load: u32,
        cast: u8,
    }

    // Compiles only because the derive generated no trait of this name.
    #[allow(dead_code)]
    trait SlotFields {}

    #[test]
    fn derived_record() {
        let mut r = Record { a: 1, b: (2.5, 3) };
        let p = Handle::from_mut(&mut r);

        assert_eq!(p.a(), p.field::<1>());
        assert_eq!(p.b().addr(), p.addr() + offset_of!(Record, b));
        assert_eq!(
            Handle::<Record>::field_names().collect::<alloc::vec::Vec<_>>(),
            ["a", "b"]
        );

        unsafe {
            assert_eq!(p.b().field::<2>().load(), 3);
            p.b().field::<1>().store(9.0);
            assert_eq!(p.load(), Record { a: 1, b: (9.0, 3) });
        }
        assert!(p.set_field("b", (0.0, 0)).is_err());
    }

    #[test]
    fn derived_tuple_struct() {
        let mut pair = Pair(1, 2);
        let p = Handle::from_mut(&mut pair);

        assert_eq!(p._1(), p.field::<1>());
        assert_eq!(Handle::<Pair>::find_field("_2").unwrap().offset(), offset_of!(Pair, 1));
        unsafe { p._2().store(20) };
        assert_eq!(pair.1, 20);
    }

    #[test]
    fn hand_written_auto_wrap() {
        let mut a = 1u16;
        let mut b = 2u16;
        let mut links = [Link { target: &raw mut a }, Link { target: &raw mut b }];
        let p = Handle::from_source(&mut links);

        let second: Handle<u16> = unsafe { p.load_at(2) };
        assert_eq!(unsafe { second.load() }, 2);
        assert_eq!(unsafe { p.load_raw().target }, &raw mut a);
        assert_eq!(unsafe { p.target().load() }, Handle::new(&raw mut a));

        unsafe { p.try_store(&raw mut b) }.unwrap();
        assert_eq!(unsafe { p.load().load() }, 2);
        assert!(<Link as AutoWrap>::IS_POINTER_LIKE);
    }

    #[test]
    fn positional_projection_without_accessors() {
        let mut slot = Slot { load: 7, cast: 1 };
        let p = Handle::from_mut(&mut slot);

        assert_eq!(p.field::<1>().addr(), p.addr() + offset_of!(Slot, load));
        assert_eq!(Handle::<Slot>::find_field("cast").unwrap().index(), 2);
        unsafe {
            assert_eq!(p.field::<1>().load(), 7);
            p.field::<2>().store(5);
        }
        assert_eq!(slot.cast, 5);
    }

    #[test]
    fn linked_nodes_auto_wrap() {
        let mut tail = Node {
            value: 2,
            next: core::ptr::null_mut(),
        };
        let mut head = Node {
            value: 1,
            next: &raw mut tail,
        };
        let p = Handle::from_mut(&mut head);

        let next: Handle<Node> = unsafe { p.next().load() };
        assert_eq!(unsafe { next.value().load() }, 2);
        assert!(unsafe { next.next().load() }.is_null());
    }
}
