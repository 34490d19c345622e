//! The parsed shape of a `#[derive(Configurable)]` input.

use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Ident, Type};

use crate::attributes::{Family, FieldKind, TypeAttributes, parse_field_kind};

/// Keys every record uses for its own tags.
const RESERVED_NAMES: [&str; 2] = ["class", "_id"];

pub(crate) struct ConfigField<'a> {
    pub ident: &'a Ident,
    /// The parameter name, the field name without `r#`.
    pub name: String,
    pub ty: &'a Type,
    pub kind: FieldKind,
}

pub(crate) struct ConfigStruct<'a> {
    pub ident: &'a Ident,
    pub attrs: TypeAttributes,
    pub fields: Vec<ConfigField<'a>>,
    pub cg_graph_path: syn::Path,
}

impl<'a> ConfigStruct<'a> {
    pub(crate) fn from_ast(ast: &'a DeriveInput) -> syn::Result<Self> {
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new(
                ast.generics.span(),
                "`Configurable` cannot be derived for generic types",
            ));
        }

        let Data::Struct(data) = &ast.data else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Configurable` can only be derived for structs",
            ));
        };
        let named = match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new(
                    fields.span(),
                    "`Configurable` requires named fields",
                ));
            }
        };

        let attrs = TypeAttributes::parse(&ast.attrs)?;

        let mut fields = Vec::with_capacity(named.len());
        let mut has_defaults = false;
        for field in named {
            let kind = parse_field_kind(&field.attrs)?;
            let Some(ident) = &field.ident else {
                continue;
            };
            if kind == FieldKind::Defaults {
                if has_defaults {
                    return Err(syn::Error::new(ident.span(), "only one `defaults` field is allowed"));
                }
                if !matches!(attrs.family, Family::Optimizer(_)) {
                    return Err(syn::Error::new(
                        ident.span(),
                        "`defaults` requires `#[config(optimizer)]` on the type",
                    ));
                }
                has_defaults = true;
            }
            let name = ident.unraw().to_string();
            if kind.is_parameter() && RESERVED_NAMES.contains(&name.as_str()) {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("`{name}` is a record tag and cannot name a parameter; mark the field `#[config(skip)]` or rename it"),
                ));
            }
            fields.push(ConfigField {
                ident,
                name,
                ty: &field.ty,
                kind,
            });
        }

        Ok(Self {
            ident: &ast.ident,
            attrs,
            fields,
            cg_graph_path: crate::path::cg_graph(),
        })
    }

    pub(crate) fn parameters(&self) -> impl Iterator<Item = &ConfigField<'a>> {
        self.fields.iter().filter(|field| field.kind.is_parameter())
    }

    pub(crate) fn defaults_field(&self) -> Option<&ConfigField<'a>> {
        self.fields.iter().find(|field| field.kind == FieldKind::Defaults)
    }
}
