mod context;
mod instance;
mod middleware;
mod registry;
mod target;

pub use context::{Context, ContextGuard, HasContext, MethodInjector};
pub use instance::{BindOptions, Instance};
pub use registry::Registry;
pub use target::{Bindings, HasRegistry, Target};
