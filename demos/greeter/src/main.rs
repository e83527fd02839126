use dijon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn log(&self, message: &str) {
        tracing::info!("[{}] {}", self.prefix, message);
    }
}

pub struct Salutation(String);

impl Salutation {
    pub fn new(text: &str) -> Self {
        Self(text.to_string())
    }
}

static LOGGER_READS: AtomicUsize = AtomicUsize::new(0);

fn count_reads(_: &Instance<ConsoleLogger>) {
    LOGGER_READS.fetch_add(1, Ordering::Relaxed);
}

#[inject(logger, ConsoleLogger, "greeter")]
#[middleware(logger, count_reads)]
pub struct Greeter {
    registry: Arc<Registry>,
    ctx: Context,
}

impl HasRegistry for Greeter {
    fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl HasContext for Greeter {
    fn context(&self) -> &Context {
        &self.ctx
    }
}

impl Greeter {
    #[frozen_inject(salutation, Salutation, "Hello")]
    pub fn greet(&self, name: &str) -> anyhow::Result<String> {
        let salutation = self
            .context()
            .get::<Salutation>("salutation")
            .ok_or_else(|| anyhow::anyhow!("salutation not bound"))?;
        let line = format!("{}, {}!", salutation.read().0, name);
        self.dependency::<ConsoleLogger>("logger")?.read().log(&line);
        Ok(line)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let options: BindOptions = serde_json::from_str(r#"{ "freeze": true }"#)?;

    let registry = Arc::new(Registry::new());
    registry.injector(|di| -> Result<()> {
        di.bind::<Greeter>()?;
        di.inject_with::<Greeter, _, _>("audience", || vec!["Ada", "Grace"], options)?;
        Ok(())
    })?;

    let greeter = Greeter {
        registry: registry.clone(),
        ctx: Context::new(),
    };
    let audience = greeter.dependency::<Vec<&'static str>>("audience")?;
    for name in audience.read().iter() {
        greeter.greet(name)?;
    }

    if let Err(e) = registry.inject::<Greeter, _, _>("logger", || ConsoleLogger::new("again")) {
        tracing::warn!("Rejected rebinding: {}", e);
    }

    tracing::info!("Logger read {} times", LOGGER_READS.load(Ordering::Relaxed));
    Ok(())
}
