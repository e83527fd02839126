use crate::args::{InjectArgs, Kind};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{FnArg, ItemFn};

pub fn expand(kind: Kind, attr: TokenStream2, mut input: ItemFn) -> syn::Result<TokenStream2> {
    let frozen = match kind {
        Kind::Inject => false,
        Kind::FrozenInject => true,
        Kind::Middleware => {
            return Err(syn::Error::new_spanned(
                input.sig.fn_token,
                "method-level middleware is declared on the struct: \
                 #[middleware(name, callback, method = this_method)]",
            ));
        }
    };
    let args: InjectArgs = syn::parse2(attr)?;

    // The guard borrows the receiver for the whole call, so only `&self` works.
    match input.sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &input.sig,
                "method-level injection requires a `&self` receiver",
            ));
        }
    }

    let name = &args.name;
    let ty = &args.ty;
    let constructor = args.constructor();
    let site = if frozen {
        quote!(frozen)
    } else {
        quote!(new)
    };
    let block = &input.block;

    let new_block = quote! {
        {
            static __DIJON_SITE: ::std::sync::OnceLock<::dijon::MethodInjector<#ty>> =
                ::std::sync::OnceLock::new();
            let __dijon_guard = __DIJON_SITE
                .get_or_init(|| ::dijon::MethodInjector::#site(#name, || #constructor))
                .enter(self);
            #block
        }
    };
    input.block = Box::new(syn::parse2(new_block)?);

    Ok(quote! {
        #input
    })
}
