//! Code generation for `#[derive(Configurable)]`.

use proc_macro2::TokenStream;
use quote::quote;

use crate::attributes::{Family, FieldKind};
use crate::derive_data::ConfigStruct;

pub(crate) fn impl_configurable(data: &ConfigStruct) -> TokenStream {
    let type_path_impl = impl_type_path(data);
    let configurable_impl = impl_configurable_trait(data);
    let construct_impl = impl_construct(data);
    let auto_register_impl = impl_auto_register(data);

    quote! {
        const _: () = {
            #type_path_impl
            #configurable_impl
            #construct_impl
            #auto_register_impl
        };
    }
}

fn impl_type_path(data: &ConfigStruct) -> TokenStream {
    let ident = data.ident;
    let type_path_ = crate::path::type_path_(&data.cg_graph_path);
    let name = syn::ext::IdentExt::unraw(ident).to_string();

    let (type_path, module_path) = match &data.attrs.type_path {
        Some(lit) => {
            // Validated to contain `::` while parsing.
            let value = lit.value();
            let module = value.rsplit_once("::").map_or("", |(module, _)| module).to_owned();
            (quote! { #lit }, quote! { #module })
        }
        None => (
            quote! { ::core::concat!(::core::module_path!(), "::", #name) },
            quote! { ::core::module_path!() },
        ),
    };

    quote! {
        impl #type_path_ for #ident {
            #[inline]
            fn type_path() -> &'static str {
                #type_path
            }

            #[inline]
            fn type_name() -> &'static str {
                #name
            }

            #[inline]
            fn module_path() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#module_path)
            }
        }
    }
}

fn impl_configurable_trait(data: &ConfigStruct) -> TokenStream {
    let ident = data.ident;
    let object_ = crate::path::object_(&data.cg_graph_path);
    let value_ = crate::path::value_(&data.cg_graph_path);

    let names = data.parameters().map(|field| &field.name);
    let arms = data.parameters().map(|field| {
        let name = &field.name;
        let member = field.ident;
        quote! {
            #name => ::core::option::Option::Some(#object_::ToAttr::to_attr(&self.#member)),
        }
    });

    let family = match data.attrs.family {
        Family::Domain => TokenStream::new(),
        Family::Optimizer(_) => quote! {
            #[inline]
            fn family(&self) -> #object_::ObjectFamily {
                #object_::ObjectFamily::Optimizer
            }
        },
        Family::Scheduler(_) => quote! {
            #[inline]
            fn family(&self) -> #object_::ObjectFamily {
                #object_::ObjectFamily::LrScheduler
            }
        },
    };

    let optimizer_defaults = match data.defaults_field() {
        Some(field) => {
            let member = field.ident;
            quote! {
                fn optimizer_defaults(&self) -> ::core::option::Option<#value_::Mapping> {
                    ::core::option::Option::Some(::core::clone::Clone::clone(&self.#member))
                }
            }
        }
        None => TokenStream::new(),
    };

    quote! {
        impl #object_::Configurable for #ident {
            #[inline]
            fn parameters(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn attribute(&self, name: &str) -> ::core::option::Option<#object_::Attr> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #family
            #optimizer_defaults
        }
    }
}

fn impl_construct(data: &ConfigStruct) -> TokenStream {
    let ident = data.ident;
    let object_ = crate::path::object_(&data.cg_graph_path);

    let takes = data
        .fields
        .iter()
        .filter(|field| field.kind != FieldKind::Defaults)
        .map(|field| {
            let member = field.ident;
            let name = &field.name;
            let ty = field.ty;
            match field.kind {
                FieldKind::Param => quote! {
                    let #member = __args.take::<#ty>(#name)?;
                },
                FieldKind::Default => quote! {
                    let #member = __args.take_or_default::<#ty>(#name)?;
                },
                FieldKind::Environment => quote! {
                    let #member = __args.take_environment(#name)?;
                },
                FieldKind::Skip | FieldKind::Defaults => quote! {
                    let #member: #ty = ::core::default::Default::default();
                },
            }
        });

    // Takes whatever the other fields left over.
    let defaults = data.defaults_field().map(|field| {
        let member = field.ident;
        quote! {
            let #member = __args.take_remaining()?;
        }
    });

    let members = data.fields.iter().map(|field| field.ident);

    quote! {
        impl #object_::Construct for #ident {
            fn construct(
                __args: &mut #object_::Arguments<'_>,
            ) -> ::core::result::Result<Self, #object_::ConstructError> {
                #(#takes)*
                #defaults
                ::core::result::Result::Ok(Self { #(#members),* })
            }
        }
    }
}

#[cfg(feature = "auto_register")]
fn impl_auto_register(data: &ConfigStruct) -> TokenStream {
    let Some(span) = data.attrs.auto_register else {
        return TokenStream::new();
    };
    let ident = data.ident;
    let auto_register_ = crate::path::auto_register_(&data.cg_graph_path);

    quote::quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::__AutoRegisterFunc(
                #auto_register_::__register::<#ident>
            )
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn impl_auto_register(_: &ConfigStruct) -> TokenStream {
    TokenStream::new()
}
