//! See the [`Layout`](macro@Layout) derive macro.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static LAYOUT_ATTRIBUTE_NAME: &str = "layout";

// -----------------------------------------------------------------------------
// Modules

mod impls;
mod path;
mod record;

// -----------------------------------------------------------------------------
// Macros

/// # Layout Derivation
///
/// `#[derive(Layout)]` describes a struct's fields to `fp_ptr`, so a
/// `Handle<T>` can be projected onto them. It implements:
///
/// - `Field<N>` for every field, `N` being its 1-based position.
/// - `Layout`, the ordered field table.
/// - `AutoWrap` (as a plain value) and `ExactFrom<Self>`, so the struct can be
///   loaded and stored whole.
/// - A `{Type}Fields` trait with one method per field, implemented for
///   `Handle<Type>`. Tuple structs get `_1`, `_2`, ...
///
/// Offsets come from `core::mem::offset_of!`, so any representation works.
/// Use `#[repr(C)]` when the layout must match foreign memory.
///
/// Every field type must be `'static`. Enums and unions are rejected.
///
/// ```rust, ignore
/// #[derive(Layout, Clone, Copy)]
/// #[repr(C)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// // `PointFields` is in scope wherever `Point` is declared.
/// let y: Handle<f64> = p.y();
/// let same: Handle<f64> = p.field::<2>();
/// ```
///
/// An accessor named like an inherent method of `Handle` (`load`, `add`,
/// `cast`, ...) is shadowed by it; use `field::<N>()` for those fields.
///
/// ## Implementation Control
///
/// These attributes can only be applied at the type level.
///
/// ```rust, ignore
/// #[derive(Layout)]
/// #[layout(auto_wrap = false, accessors = false)]
/// struct Foo { /* ... */ }
/// ```
///
/// - `auto_wrap = false` skips `AutoWrap` and `ExactFrom<Self>`, for types
///   that implement them by hand (e.g. a struct wrapping a pointer that
///   should load as a handle).
/// - `accessors = false` skips the `{Type}Fields` trait.
#[proc_macro_derive(Layout, attributes(layout))]
pub fn derive_layout(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let record = match record::Record::from_ast(&ast) {
        Ok(v) => v,
        Err(err) => return err.into_compile_error().into(),
    };

    let fp_ptr_path = path::fp_ptr();

    let fields_tokens = impls::impl_fields(&record, &fp_ptr_path);
    let layout_tokens = impls::impl_layout(&record, &fp_ptr_path);
    let auto_wrap_tokens = if record.attrs.auto_wrap {
        impls::impl_auto_wrap(&record, &fp_ptr_path)
    } else {
        proc_macro2::TokenStream::new()
    };
    let accessor_tokens = if record.attrs.accessors {
        impls::impl_accessors(&record, &fp_ptr_path)
    } else {
        proc_macro2::TokenStream::new()
    };

    TokenStream::from(quote! {
        #fields_tokens
        #layout_tokens
        #auto_wrap_tokens
        #accessor_tokens
    })
}
