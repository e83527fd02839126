use crate::args::{method_name, InjectArgs, Kind, MiddlewareArgs};
use crate::target::{generate_target_impl, target_opts};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{punctuated::Punctuated, Attribute, ItemStruct, Path, Token};

/// One class-level registration, in the order it will be applied.
enum Site {
    Inject { args: InjectArgs, frozen: bool },
    Middleware(MiddlewareArgs),
}

impl Site {
    fn parse(kind: Kind, tokens: TokenStream2) -> syn::Result<Self> {
        Ok(match kind {
            Kind::Inject => Site::Inject {
                args: syn::parse2(tokens)?,
                frozen: false,
            },
            Kind::FrozenInject => Site::Inject {
                args: syn::parse2(tokens)?,
                frozen: true,
            },
            Kind::Middleware => Site::Middleware(syn::parse2(tokens)?),
        })
    }

    fn statement(&self) -> TokenStream2 {
        match self {
            Site::Inject { args, frozen } => {
                let name = &args.name;
                let ty = &args.ty;
                let constructor = args.constructor();
                let method = if *frozen {
                    quote!(frozen_inject)
                } else {
                    quote!(inject)
                };
                quote! {
                    registry.#method::<Self, #ty, _>(#name, || #constructor)?;
                }
            }
            Site::Middleware(args) => {
                let name = &args.name;
                let callback = &args.callback;
                match &args.method {
                    Some(method) => {
                        let method = method_name(method);
                        quote! {
                            registry.method_middleware::<Self, _, _>(#method, #name, #callback);
                        }
                    }
                    None => quote! {
                        registry.middleware::<Self, _, _>(#name, #callback);
                    },
                }
            }
        }
    }
}

/// Expand the outermost dijon attribute on a struct.
///
/// The remaining dijon attributes on the same struct are collected here and
/// removed, so every binding for the type ends up in one `Bindings` impl.
pub fn expand(kind: Kind, attr: TokenStream2, mut input: ItemStruct) -> syn::Result<TokenStream2> {
    let mut sites = vec![Site::parse(kind, attr)?];
    let derives_target = input.attrs.iter().any(is_target_derive);

    let mut target_attrs = Vec::new();
    let mut kept = Vec::new();
    for attr in std::mem::take(&mut input.attrs) {
        if let Some(kind) = Kind::of(attr.path()) {
            let tokens = attr.meta.require_list()?.tokens.clone();
            sites.push(Site::parse(kind, tokens)?);
        } else if attr.path().is_ident("target") && !derives_target {
            target_attrs.push(attr);
        } else {
            kept.push(attr);
        }
    }
    input.attrs = kept;

    // Decorators apply from the one nearest the item outwards.
    sites.reverse();

    let target_impl = if derives_target {
        quote! {}
    } else {
        target_opts(&target_attrs)
            .and_then(|opts| generate_target_impl(&input.ident, &input.generics, &opts))
            .unwrap_or_else(|e| e.write_errors())
    };

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let statements = sites.iter().map(Site::statement);

    Ok(quote! {
        #input

        #target_impl

        impl #impl_generics ::dijon::Bindings for #struct_name #ty_generics #where_clause {
            fn bind(registry: &::dijon::Registry) -> ::dijon::Result<()> {
                #(#statements)*
                Ok(())
            }
        }
    })
}

fn is_target_derive(attr: &Attribute) -> bool {
    if !attr.path().is_ident("derive") {
        return false;
    }
    attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
        .map(|paths| {
            paths
                .iter()
                .any(|p| p.segments.last().is_some_and(|s| s.ident == "Target"))
        })
        .unwrap_or(false)
}
