use darling::util::PathList;
use darling::{FromAttributes, FromDeriveInput};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Generics, Ident};

/// `#[target(name = "..", members(a, b))]`
#[derive(Default, FromAttributes)]
#[darling(attributes(target))]
pub struct TargetOpts {
    pub name: Option<String>,
    #[darling(default)]
    pub members: PathList,
}

#[derive(FromDeriveInput)]
#[darling(attributes(target), supports(struct_any, enum_any))]
struct TargetInput {
    ident: Ident,
    generics: Generics,
    name: Option<String>,
    #[darling(default)]
    members: PathList,
}

pub fn derive_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = TargetInput::from_derive_input(&input).and_then(|target| {
        let opts = TargetOpts {
            name: target.name,
            members: target.members,
        };
        generate_target_impl(&target.ident, &target.generics, &opts)
    });
    match expanded {
        Ok(tokens) => tokens.into(),
        Err(e) => e.write_errors().into(),
    }
}

pub fn target_opts(attrs: &[Attribute]) -> darling::Result<TargetOpts> {
    TargetOpts::from_attributes(attrs)
}

pub fn generate_target_impl(
    ident: &Ident,
    generics: &Generics,
    opts: &TargetOpts,
) -> darling::Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let class_name = opts.name.clone().unwrap_or_else(|| ident.to_string());

    let mut members = Vec::new();
    for path in opts.members.iter() {
        let member = path
            .get_ident()
            .ok_or_else(|| darling::Error::custom("members must be plain identifiers").with_span(path))?;
        members.push(member.to_string());
    }

    Ok(quote! {
        impl #impl_generics ::dijon::Target for #ident #ty_generics #where_clause {
            fn class_name() -> &'static str {
                #class_name
            }

            fn members() -> &'static [&'static str] {
                &[#(#members),*]
            }
        }
    })
}
