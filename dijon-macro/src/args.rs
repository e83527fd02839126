use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    Expr, Ident, LitStr, Token, Type,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Inject,
    FrozenInject,
    Middleware,
}

impl Kind {
    /// Recognise one of our attributes: a bare ident or a `dijon::` path.
    pub fn of(path: &syn::Path) -> Option<Self> {
        let ident = match path.segments.len() {
            1 if path.leading_colon.is_none() => &path.segments[0].ident,
            2 if path.segments[0].ident == "dijon" => &path.segments[1].ident,
            _ => return None,
        };
        if ident == "inject" {
            Some(Kind::Inject)
        } else if ident == "frozen_inject" {
            Some(Kind::FrozenInject)
        } else if ident == "middleware" {
            Some(Kind::Middleware)
        } else {
            None
        }
    }
}

/// `name, Type, args..`
pub struct InjectArgs {
    pub name: LitStr,
    pub ty: Type,
    pub args: Vec<Expr>,
}

impl InjectArgs {
    /// `<Type>::new(args..)`
    pub fn constructor(&self) -> TokenStream2 {
        let ty = &self.ty;
        let args = &self.args;
        quote! { <#ty>::new(#(#args),*) }
    }
}

impl Parse for InjectArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name = parse_name(input)?;
        input.parse::<Token![,]>()?;
        let ty: Type = input.parse()?;

        let mut args = Vec::new();
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            args.push(input.parse()?);
        }

        Ok(InjectArgs { name, ty, args })
    }
}

/// `name, callback` or `name, callback, method = ident`
pub struct MiddlewareArgs {
    pub name: LitStr,
    pub callback: Expr,
    pub method: Option<Ident>,
}

impl Parse for MiddlewareArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name = parse_name(input)?;
        input.parse::<Token![,]>()?;
        let callback: Expr = input.parse()?;

        let mut method = None;
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if key == "method" {
                method = Some(input.parse()?);
            } else {
                return Err(syn::Error::new_spanned(key, "expected `method = <ident>`"));
            }
        }

        Ok(MiddlewareArgs {
            name,
            callback,
            method,
        })
    }
}

/// Dependency names may be written bare (`logger`) or quoted (`"logger"`).
fn parse_name(input: ParseStream) -> syn::Result<LitStr> {
    if input.peek(LitStr) {
        input.parse()
    } else {
        let ident: Ident = input.parse()?;
        Ok(LitStr::new(&ident.to_string(), ident.span()))
    }
}

pub fn method_name(ident: &Ident) -> LitStr {
    LitStr::new(&ident.to_string(), Span::call_site())
}
