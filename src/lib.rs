//! Typed handles over raw memory.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`ptr`]: [`Handle<T>`](ptr::Handle), record layouts and
//!   `#[derive(Layout)]`, views, strings and walks.
//!
//! # Examples
//!
//! ```
//! use ferroptr::ptr::{Handle, Layout};
//!
//! #[derive(Layout, Clone, Copy)]
//! #[repr(C)]
//! struct Node {
//!     value: u32,
//!     next: *mut Node,
//! }
//!
//! let mut tail = Node { value: 2, next: core::ptr::null_mut() };
//! let mut head = Node { value: 1, next: &raw mut tail };
//! let p = Handle::from_mut(&mut head);
//!
//! // Loading a pointer field yields a handle, ready for the next projection.
//! let values: Vec<u32> = unsafe {
//!     let next = p.next().load();
//!     vec![p.value().load(), next.value().load()]
//! };
//! assert_eq!(values, [1, 2]);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use fp_ptr as ptr;
