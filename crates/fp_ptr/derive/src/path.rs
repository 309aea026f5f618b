//! Paths into `fp_ptr` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `fp_ptr` crate as seen from the invoking crate.
///
/// 1. For crates that depend on `fp_ptr`, `::fp_ptr` is returned.
/// 2. For crates that depend on `ferroptr`, `::ferroptr::ptr` is returned.
/// 3. For other situations, `::fp_ptr` is returned, which may be incorrect.
///
/// This reads the invoking crate's `Cargo.toml`, so it is called once per
/// derive and the result is passed around.
pub(crate) fn fp_ptr() -> syn::Path {
    fp_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("fp_ptr"))
}

#[inline(always)]
pub(crate) fn handle_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::Handle
    }
}

#[inline(always)]
pub(crate) fn layout_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::layout::Layout
    }
}

#[inline(always)]
pub(crate) fn field_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::layout::Field
    }
}

#[inline(always)]
pub(crate) fn field_info_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::layout::FieldInfo
    }
}

#[inline(always)]
pub(crate) fn auto_wrap_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::AutoWrap
    }
}

#[inline(always)]
pub(crate) fn exact_from_(fp_ptr_path: &syn::Path) -> TokenStream {
    quote! {
        #fp_ptr_path::ExactFrom
    }
}
