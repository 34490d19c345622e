//! Parsing of `#[config(...)]` attributes.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr};

use crate::CONFIG_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// The family a type declares, with the span of its flag.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) enum Family {
    #[default]
    Domain,
    Optimizer(Span),
    Scheduler(Span),
}

/// Attributes on the struct itself.
#[derive(Debug, Default)]
pub(crate) struct TypeAttributes {
    /// `#[config(type_path = "...")]`
    pub type_path: Option<LitStr>,
    /// `#[config(optimizer)]` or `#[config(scheduler)]`
    pub family: Family,
    /// `#[config(auto_register)]`
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CONFIG_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_path") {
                    if this.type_path.is_some() {
                        return Err(meta.error("duplicate `type_path`"));
                    }
                    this.type_path = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("optimizer") {
                    this.set_family(Family::Optimizer(meta.path.span()), &meta)?;
                } else if meta.path.is_ident("scheduler") {
                    this.set_family(Family::Scheduler(meta.path.span()), &meta)?;
                } else if meta.path.is_ident("auto_register") {
                    this.auto_register = Some(meta.path.span());
                } else {
                    return Err(meta.error(
                        "expected `type_path`, `optimizer`, `scheduler` or `auto_register`",
                    ));
                }
                Ok(())
            })?;
        }

        if let Some(path) = &this.type_path
            && !path.value().contains("::")
        {
            return Err(syn::Error::new(
                path.span(),
                "`type_path` must contain a container, e.g. `my_crate::Type`",
            ));
        }
        Ok(this)
    }

    fn set_family(&mut self, family: Family, meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
        if !matches!(self.family, Family::Domain) {
            return Err(meta.error("a type belongs to at most one family"));
        }
        self.family = family;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// How a field takes part in encoding and construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    /// A required parameter.
    #[default]
    Param,
    /// `#[config(default)]`
    Default,
    /// `#[config(environment)]`
    Environment,
    /// `#[config(skip)]`
    Skip,
    /// `#[config(defaults)]`
    Defaults,
}

impl FieldKind {
    /// Whether the field appears in the parameter list.
    pub(crate) fn is_parameter(self) -> bool {
        matches!(self, Self::Param | Self::Default | Self::Environment)
    }
}

pub(crate) fn parse_field_kind(attrs: &[Attribute]) -> syn::Result<FieldKind> {
    let mut kind = None;
    for attr in attrs {
        if !attr.path().is_ident(CONFIG_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let parsed = if meta.path.is_ident("default") {
                FieldKind::Default
            } else if meta.path.is_ident("environment") {
                FieldKind::Environment
            } else if meta.path.is_ident("skip") {
                FieldKind::Skip
            } else if meta.path.is_ident("defaults") {
                FieldKind::Defaults
            } else {
                return Err(meta.error("expected `default`, `environment`, `skip` or `defaults`"));
            };
            if kind.replace(parsed).is_some() {
                return Err(meta.error("conflicting field attributes"));
            }
            Ok(())
        })?;
    }
    Ok(kind.unwrap_or_default())
}
