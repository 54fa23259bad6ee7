use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::engine::EngineConfig;
use lib::game::{Manager, Memory};
use lib::render::Renderer;
use lib::server::{router, App};
use lib::slack::{Dispatcher, Formatter};
use lib::util::Build;
use std::net::{Ipv4Addr, SocketAddr};
use std::{cmp::min, io::stderr, time::Duration};
use tokio::{net::TcpListener, runtime, signal};
use tracing::{info, instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};
use url::Url;

fn parse_base_url(s: &str) -> Result<Url, String> {
    let url = Url::parse(s).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("unsupported scheme `{}`", scheme)),
    }
}

/// Command line interface.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// The secret token Slack sends along with every slash command.
    #[clap(long, env = "SLACKCHESS_TOKEN", hide_env_values = true)]
    token: String,

    /// The public URL of this server, used to link board images.
    #[clap(long, env = "SLACKCHESS_URL", value_parser = parse_base_url)]
    url: Url,

    /// The port to listen on.
    #[clap(long, env = "PORT")]
    port: u16,

    /// The engine that plays against users.
    #[clap(long, env = "SLACKCHESS_ENGINE", default_value_t)]
    engine: EngineConfig,

    /// How long to wait for each engine reply.
    #[clap(long, env = "SLACKCHESS_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Verbosity level.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::INFO))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::DEBUG))]
    verbosity: Level,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let filter = Targets::new()
            .with_target("slackchess", self.verbosity)
            .with_target("lib", self.verbosity)
            .with_default(min(Level::WARN, self.verbosity));

        let writer = layer()
            .pretty()
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(stderr);

        registry().with(filter).with(writer).init();

        runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(self.serve())
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn serve(self) -> Result<(), Anyhow> {
        let engine = self
            .engine
            .build()
            .context("failed to start the engine")?;

        let manager = Manager::new(Memory::default(), engine, self.timeout);
        let dispatcher = Dispatcher::new(manager, Formatter::new(self.url));
        let app = App::new(self.token, dispatcher, Renderer::default());

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, self.port))
            .await
            .with_context(|| format!("failed to listen on port {}", self.port))?;

        info!(address = %listener.local_addr()?, "listening");

        let service = router(app).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service)
            .with_graceful_shutdown(async {
                signal::ctrl_c().await.ok();
                info!("shutting down");
            })
            .await?;

        Ok(())
    }
}
