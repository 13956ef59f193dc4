use anyhow::Result as AnyResult;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

/// Logging options shared by every binary in the workspace. Each service's
/// `main.rs` flattens this into its own `Options` the same way it flattens
/// its peer-connection options.
#[derive(Clone, Debug, PartialEq, StructOpt)]
pub struct LogOptions {
    /// Log filter, using `tracing_subscriber`'s `EnvFilter` syntax, e.g.
    /// `info,checkout_types=debug`.
    #[structopt(long, env = "RUST_LOG", default_value = "info")]
    pub rust_log: String,

    /// Emit logs as newline-delimited JSON instead of the default
    /// human-readable format.
    #[structopt(long, env = "LOG_JSON")]
    pub json: bool,
}

impl LogOptions {
    /// Installs the global `tracing` subscriber. Call once, at the very
    /// start of `main`.
    pub fn init(&self) -> AnyResult<()> {
        let filter = EnvFilter::try_new(&self.rust_log)?;
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
        if self.json {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|err| anyhow::anyhow!("error installing tracing subscriber: {err}"))
    }
}
