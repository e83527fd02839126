//! # Dijon
//!
//! Declarative dependency binding for Rust.
//!
//! Dijon attaches named dependency instances to a type ("class-level") or to
//! a single method call ("method-level"), and runs middleware callbacks when
//! a class-level dependency is read.
//!
//! ## Features
//!
//! - **Class-level injection**: one shared instance per type, read through the [`Registry`]
//! - **Frozen instances**: `frozen_inject` bindings reject every write
//! - **Method-level injection**: the dependency lives on the receiver's [`Context`] only
//!   for the duration of the call, and is removed on every exit path
//! - **Read middleware**: callbacks fired, in registration order, on each read
//!
//! ## Quick Start
//!
//! ```rust
//! use dijon::{Context, HasContext, HasRegistry, Instance, Registry, inject, middleware};
//! use std::sync::Arc;
//!
//! pub struct ConsoleLogger {
//!     prefix: String,
//! }
//!
//! impl ConsoleLogger {
//!     pub fn new(prefix: &str) -> Self {
//!         Self { prefix: prefix.to_string() }
//!     }
//! }
//!
//! pub struct Greeting(String);
//!
//! impl Greeting {
//!     pub fn new(text: &str) -> Self {
//!         Self(text.to_string())
//!     }
//! }
//!
//! fn on_logger_read(logger: &Instance<ConsoleLogger>) {
//!     let _ = &logger.read().prefix;
//! }
//!
//! // 1. Declare the class-level bindings
//! #[inject(logger, ConsoleLogger, "svc")]
//! #[middleware(logger, on_logger_read)]
//! pub struct Service {
//!     registry: Arc<Registry>,
//!     ctx: Context,
//! }
//!
//! impl HasRegistry for Service {
//!     fn registry(&self) -> &Registry {
//!         &self.registry
//!     }
//! }
//!
//! impl HasContext for Service {
//!     fn context(&self) -> &Context {
//!         &self.ctx
//!     }
//! }
//!
//! impl Service {
//!     // 2. Method-level bindings exist only while the method runs
//!     #[inject(greeting, Greeting, "hello")]
//!     pub fn greet(&self, who: &str) -> String {
//!         let greeting = self.context().get::<Greeting>("greeting").unwrap();
//!         format!("{} {}", greeting.read().0, who)
//!     }
//! }
//!
//! // 3. Apply the bindings
//! let registry = Arc::new(Registry::new());
//! registry.bind::<Service>().unwrap();
//!
//! let service = Service { registry: registry.clone(), ctx: Context::new() };
//! let logger = service.dependency::<ConsoleLogger>("logger").unwrap();
//! assert_eq!(logger.read().prefix, "svc");
//! assert_eq!(service.greet("world"), "hello world");
//! ```

pub mod di;
pub mod error;

pub use di::{
    BindOptions, Bindings, Context, ContextGuard, HasContext, HasRegistry, Instance,
    MethodInjector, Registry, Target,
};
pub use error::{DijonError, Result};

// Re-export macros
pub use dijon_macro::{Target, frozen_inject, inject, middleware};

/// Prelude module for convenient imports
///
/// ```
/// use dijon::prelude::*;
/// ```
pub mod prelude {
    pub use crate::di::{
        BindOptions, Bindings, Context, ContextGuard, HasContext, HasRegistry, Instance,
        MethodInjector, Registry,
    };
    pub use crate::error::{DijonError, Result};
    pub use crate::{Target, frozen_inject, inject, middleware};
    pub use std::sync::Arc;
}
