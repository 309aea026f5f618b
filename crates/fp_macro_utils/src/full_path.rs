//! Absolute paths to `core` items for generated code.
//!
//! Generated code cannot rely on the caller's imports or prelude, so every
//! `core` item it names is spelled out in full. Each type here expands to one
//! such path through [`ToTokens`].
//!
//! ```
//! use fp_macro_utils::full_path::OptionFP;
//! use quote::quote;
//!
//! let tokens = quote! { #OptionFP<u8> };
//! let expected = quote! { ::core::option::Option<u8> };
//! assert_eq!(tokens.to_string(), expected.to_string());
//! ```

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

macro_rules! define_full_path {
    ($($(#[$meta:meta])* $name:ident => $($segment:ident)::+;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl ToTokens for $name {
                #[inline]
                fn to_tokens(&self, tokens: &mut TokenStream) {
                    tokens.extend(quote! { :: $($segment)::+ });
                }
            }
        )+
    };
}

define_full_path! {
    /// `::core::option::Option`
    OptionFP => core::option::Option;
    /// `::core::option::Option::Some`
    SomeFP => core::option::Option::Some;
    /// `::core::mem::offset_of`
    OffsetOfFP => core::mem::offset_of;
}
