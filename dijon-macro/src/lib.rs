use proc_macro::TokenStream;
use syn::{parse_macro_input, Item};

mod args;
mod class;
mod method;
mod target;

use args::Kind;

/// Bind a dependency, constructed as `<Type>::new(args..)`.
///
/// On a struct, the dependency becomes a class-level property read through
/// `Registry::property` once `Registry::bind::<Struct>()` has run. On a
/// `&self` method, the dependency is exposed on the receiver's `Context` for
/// the duration of each call.
///
/// # Example
/// ```ignore
/// #[inject(logger, ConsoleLogger, "svc")]
/// pub struct Service { ctx: Context }
///
/// impl Service {
///     #[inject(clock, SystemClock)]
///     pub fn now(&self) -> u64 {
///         self.context().get::<SystemClock>("clock").unwrap().read().now()
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn inject(attr: TokenStream, item: TokenStream) -> TokenStream {
    dijon_attribute(Kind::Inject, attr, item)
}

/// Same as `#[inject]`, but the instance rejects writes.
#[proc_macro_attribute]
pub fn frozen_inject(attr: TokenStream, item: TokenStream) -> TokenStream {
    dijon_attribute(Kind::FrozenInject, attr, item)
}

/// Register a callback fired when a class-level dependency is read.
///
/// The callback takes `&Instance<D>`; closures need the parameter type spelled out.
///
/// # Example
/// ```ignore
/// #[inject(logger, ConsoleLogger)]
/// #[middleware(logger, audit_logger_read)]
/// #[middleware(logger, |l: &Instance<ConsoleLogger>| trace(l), method = run)]
/// pub struct Service;
/// ```
#[proc_macro_attribute]
pub fn middleware(attr: TokenStream, item: TokenStream) -> TokenStream {
    dijon_attribute(Kind::Middleware, attr, item)
}

/// Derive macro implementing `Target` for a type with no struct-level bindings.
///
/// # Example
/// ```ignore
/// #[derive(Target)]
/// #[target(name = "Page", members(render, title))]
/// pub struct Page;
/// ```
#[proc_macro_derive(Target, attributes(target))]
pub fn derive_target(input: TokenStream) -> TokenStream {
    target::derive_target(input)
}

fn dijon_attribute(kind: Kind, attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as Item);
    let expanded = match item {
        Item::Struct(input) => class::expand(kind, attr.into(), input),
        Item::Fn(input) => method::expand(kind, attr.into(), input),
        other => Err(syn::Error::new_spanned(
            other,
            "dijon attributes can only be applied to structs and methods",
        )),
    };
    expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}
