use proc_macro2::{Literal, Span};
use quote::format_ident;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Fields, Generics, Ident, LitBool, Member, Type, Visibility,
    WhereClause, parse_quote,
};

use crate::LAYOUT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Attributes

/// Type-level switches, set with `#[layout(...)]`.
#[derive(Debug)]
pub(crate) struct LayoutAttributes {
    /// Default is `true`, use `#[layout(auto_wrap = false)]` to disable it.
    /// The user then implements `AutoWrap` and `ExactFrom<Self>` by hand.
    pub(crate) auto_wrap: bool,
    /// Default is `true`, use `#[layout(accessors = false)]` to disable it.
    /// Fields are then only reachable through `Handle::field::<N>()`.
    pub(crate) accessors: bool,
}

impl Default for LayoutAttributes {
    #[inline]
    fn default() -> Self {
        Self {
            auto_wrap: true,
            accessors: true,
        }
    }
}

impl LayoutAttributes {
    pub(crate) fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(LAYOUT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("auto_wrap") {
                    this.auto_wrap = meta.value()?.parse::<LitBool>()?.value;
                    Ok(())
                } else if meta.path.is_ident("accessors") {
                    this.accessors = meta.value()?.parse::<LitBool>()?.value;
                    Ok(())
                } else {
                    Err(meta.error("unknown `layout` option, expected `auto_wrap` or `accessors`"))
                }
            })?;
        }

        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// Record

/// One field of the deriving struct.
pub(crate) struct RecordField {
    /// 1-based declaration position.
    pub(crate) position: Literal,
    /// `a` or `0`, as used by `offset_of!`.
    pub(crate) member: Member,
    /// `"a"` or `"_1"`.
    pub(crate) name: String,
    /// The generated accessor method, `a` or `_1`.
    pub(crate) accessor: Ident,
    pub(crate) ty: Type,
}

/// The parsed deriving struct.
pub(crate) struct Record<'a> {
    pub(crate) ident: &'a Ident,
    pub(crate) vis: &'a Visibility,
    pub(crate) generics: &'a Generics,
    pub(crate) attrs: LayoutAttributes,
    pub(crate) fields: Vec<RecordField>,
}

impl<'a> Record<'a> {
    pub(crate) fn from_ast(ast: &'a DeriveInput) -> syn::Result<Self> {
        let fields = match &ast.data {
            Data::Struct(data) => &data.fields,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "`Layout` cannot be derived for enums, their layout is not a fixed set of fields",
                ));
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "`Layout` cannot be derived for unions",
                ));
            }
        };

        let fields = match fields {
            Fields::Named(named) => named
                .named
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    let ident = field
                        .ident
                        .clone()
                        .ok_or_else(|| syn::Error::new(field.span(), "named field without a name"))?;
                    Ok(RecordField {
                        position: Literal::usize_unsuffixed(index + 1),
                        member: Member::Named(ident.clone()),
                        name: ident.unraw().to_string(),
                        accessor: ident,
                        ty: field.ty.clone(),
                    })
                })
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unnamed(unnamed) => unnamed
                .unnamed
                .iter()
                .enumerate()
                .map(|(index, field)| RecordField {
                    position: Literal::usize_unsuffixed(index + 1),
                    member: Member::Unnamed(index.into()),
                    name: format!("_{}", index + 1),
                    accessor: format_ident!("_{}", index + 1, span = field.span()),
                    ty: field.ty.clone(),
                })
                .collect(),
            Fields::Unit => Vec::new(),
        };

        Ok(Self {
            ident: &ast.ident,
            vis: &ast.vis,
            generics: &ast.generics,
            attrs: LayoutAttributes::parse_attrs(&ast.attrs)?,
            fields,
        })
    }

    /// The user's where clause plus `FieldType: 'static` for every field.
    ///
    /// Field descriptions carry a `TypeId`, which needs `'static`.
    pub(crate) fn static_where_clause(&self) -> WhereClause {
        let mut where_clause = self
            .generics
            .where_clause
            .clone()
            .unwrap_or_else(|| WhereClause {
                where_token: Default::default(),
                predicates: Default::default(),
            });
        for field in &self.fields {
            let ty = &field.ty;
            where_clause.predicates.push(parse_quote!(#ty: 'static));
        }
        where_clause
    }

    /// Name of the generated accessor trait, `{Type}Fields`.
    pub(crate) fn accessor_trait(&self) -> Ident {
        format_ident!("{}Fields", self.ident.unraw(), span = Span::call_site())
    }
}
