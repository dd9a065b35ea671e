use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use tracing::{error, info};

use mgmt_core::{config::Config, platform::ChatPlatform, service::DefaultService};
use mgmt_discord::DiscordClient;
use mgmt_http::handler::Handler;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(about = "Channel cleanup endpoint for the bot platform", disable_version_flag = true)]
struct Args {
    /// HTTP port for the handler (overrides HTTP_PORT).
    #[arg(long = "http-port")]
    http_port: Option<u16>,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.version {
        println!("{VERSION}");
        return Ok(());
    }

    mgmt_core::logging::init("mgmt")?;

    let mut cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "could not load configuration");
            return Err(e.into());
        }
    };
    if let Some(port) = args.http_port {
        cfg.http_port = port;
    }

    let platform: Arc<dyn ChatPlatform> = Arc::new(DiscordClient::new(&cfg.discord_token));
    let service = Arc::new(DefaultService::new(platform, cfg.cleanup.clone()));
    let handler = Arc::new(Handler::new(service, cfg.ack_emoji.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    info!(
        component = "management",
        version = VERSION,
        instance = std::process::id(),
        "starting"
    );

    let result = mgmt_http::serve(addr, handler, mgmt_http::shutdown_signal()).await;
    match &result {
        Ok(()) => info!(component = "management", "stopped"),
        Err(e) => error!(component = "management", error = %e, "stopped"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_v_prints_version() {
        let args = Args::try_parse_from(["mgmt", "-v"]).unwrap();
        assert!(args.version);
    }

    #[test]
    fn http_port_flag_overrides() {
        let args = Args::try_parse_from(["mgmt", "--http-port", "8081"]).unwrap();
        assert_eq!(args.http_port, Some(8081));
        assert!(!args.version);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
