use fp_macro_utils::full_path::{OffsetOfFP, OptionFP, SomeFP};
use proc_macro2::TokenStream;
use quote::quote;

use crate::path;
use crate::record::Record;

/// Generate the `Field<N>` implementations, one per field.
pub(crate) fn impl_fields(record: &Record, fp_ptr_path: &syn::Path) -> TokenStream {
    let field_ = path::field_(fp_ptr_path);

    let ident = record.ident;
    let (impl_generics, ty_generics, _) = record.generics.split_for_impl();
    let where_clause = record.static_where_clause();

    let impls = record.fields.iter().map(|field| {
        let position = &field.position;
        let member = &field.member;
        let name = &field.name;
        let ty = &field.ty;
        quote! {
            #[automatically_derived]
            #[allow(unsafe_code)]
            unsafe impl #impl_generics #field_<#position> for #ident #ty_generics #where_clause {
                type Type = #ty;

                const NAME: &'static str = #name;
                const OFFSET: usize = #OffsetOfFP!(Self, #member);
            }
        }
    });

    quote! { #(#impls)* }
}

/// Generate the `Layout` implementation.
///
/// The field table is built from the `Field<N>` constants, so both always
/// agree.
pub(crate) fn impl_layout(record: &Record, fp_ptr_path: &syn::Path) -> TokenStream {
    let layout_ = path::layout_(fp_ptr_path);
    let field_ = path::field_(fp_ptr_path);
    let field_info_ = path::field_info_(fp_ptr_path);

    let ident = record.ident;
    let (impl_generics, ty_generics, _) = record.generics.split_for_impl();
    let where_clause = record.static_where_clause();

    let infos = record.fields.iter().map(|field| {
        let position = &field.position;
        quote! {
            #field_info_::new::<<Self as #field_<#position>>::Type>(
                <Self as #field_<#position>>::NAME,
                #position,
                <Self as #field_<#position>>::OFFSET,
            )
        }
    });

    quote! {
        #[automatically_derived]
        #[allow(unsafe_code)]
        unsafe impl #impl_generics #layout_ for #ident #ty_generics #where_clause {
            const FIELDS: &'static [#field_info_] = &[#(#infos),*];
        }
    }
}

/// Generate `AutoWrap` (a plain, never pointer-like element) and the
/// identity `ExactFrom<Self>`, so the type can be loaded and stored.
pub(crate) fn impl_auto_wrap(record: &Record, fp_ptr_path: &syn::Path) -> TokenStream {
    let auto_wrap_ = path::auto_wrap_(fp_ptr_path);
    let exact_from_ = path::exact_from_(fp_ptr_path);

    let ident = record.ident;
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics #auto_wrap_ for #ident #ty_generics #where_clause {
            const IS_POINTER_LIKE: bool = false;
            type Output = Self;

            #[inline(always)]
            fn auto_wrap(self) -> Self {
                self
            }
        }

        #[automatically_derived]
        impl #impl_generics #exact_from_<#ident #ty_generics> for #ident #ty_generics #where_clause {
            #[inline(always)]
            fn exact_from(value: Self) -> #OptionFP<Self> {
                #SomeFP(value)
            }
        }
    }
}

/// Generate the `{Type}Fields` extension trait, giving `Handle<Type>` one
/// method per field.
pub(crate) fn impl_accessors(record: &Record, fp_ptr_path: &syn::Path) -> TokenStream {
    if record.fields.is_empty() {
        return TokenStream::new();
    }

    let handle_ = path::handle_(fp_ptr_path);

    let ident = record.ident;
    let vis = record.vis;
    let trait_ident = record.accessor_trait();
    let (impl_generics, ty_generics, _) = record.generics.split_for_impl();
    let where_clause = record.static_where_clause();

    let trait_doc = format!("Named field projections for `Handle<{ident}>`.");

    let decls = record.fields.iter().map(|field| {
        let accessor = &field.accessor;
        let ty = &field.ty;
        let doc = format!("Projects onto field `{}`. Nothing is read.", field.name);
        quote! {
            #[doc = #doc]
            fn #accessor(self) -> #handle_<#ty>;
        }
    });

    let defs = record.fields.iter().map(|field| {
        let accessor = &field.accessor;
        let position = &field.position;
        let ty = &field.ty;
        quote! {
            #[inline(always)]
            fn #accessor(self) -> #handle_<#ty> {
                self.field::<#position>()
            }
        }
    });

    quote! {
        #[doc = #trait_doc]
        #vis trait #trait_ident #impl_generics #where_clause {
            #(#decls)*
        }

        #[automatically_derived]
        impl #impl_generics #trait_ident #ty_generics for #handle_<#ident #ty_generics> #where_clause {
            #(#defs)*
        }
    }
}
