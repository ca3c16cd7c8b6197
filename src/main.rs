use std::{sync::Arc, time::Duration};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};

use sporemote::{
    config, error,
    exposure::{ExposureResolver, ExposureState, overlay::DEFAULT_HOSTNAME_HINT},
    info,
    management::RedirectStateStore,
    server, success,
    types::ExposureStrategy,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the web remote server (default)
    Serve,

    /// Resolve the public URL and print setup instructions
    Expose,

    /// Join the overlay network (one-time setup)
    Join(JoinOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct JoinOptions {
    /// Hostname hint for this node; the default gets a random suffix
    #[clap(long, default_value = DEFAULT_HOSTNAME_HINT)]
    pub hostname: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Expose => expose().await,
        Command::Join(opt) => join(opt.hostname).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

async fn serve() {
    check_credentials();

    let resolver = ExposureResolver::from_env();
    let strategy = resolver.strategy();
    let state = Arc::new(ExposureState::new(resolver));

    match strategy {
        ExposureStrategy::ReverseTunnel => {
            // Tunnel bring-up stays an explicit operator action; the server
            // comes up on plain HTTP and resolution is triggered from the
            // setup page or the expose command.
            info!("Tunnel is configured but not started automatically");
            info!(
                "Visit http://localhost:{} to start it, or run: sporemote expose",
                config::port()
            );
        }
        _ => {
            if let Err(e) = state.resolve().await {
                error!("Exposure resolution failed: {}", e);
            }
            if let Some(endpoint) = state.current().await {
                info!(
                    "Reachable at {} ({} exposure)",
                    endpoint.base_url, endpoint.strategy
                );
            }
        }
    }

    server::start_server(state).await;
}

async fn expose() {
    check_credentials();

    let state = ExposureState::new(ExposureResolver::from_env());

    let pb = ProgressBar::new_spinner();
    pb.set_message("Resolving public URL...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    match state.resolve().await {
        Ok(endpoint) => {
            pb.finish_and_clear();
            success!("Resolved {} exposure", endpoint.strategy);
            info!("Public URL: {}", endpoint.base_url);
            info!("Callback URL for Spotify: {}", endpoint.callback_url());
            println!();
            println!("1. Go to https://developer.spotify.com/dashboard");
            println!("2. Select your app > Edit Settings");
            println!("3. Add the callback URL above to Redirect URIs and Save.");
            println!("4. Visit the app in your browser to continue authentication.");

            RedirectStateStore::new(config::cache_dir())
                .mark_first_run_done()
                .await;
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Could not resolve a public URL: {}", e);
        }
    }
}

async fn join(hostname: String) {
    let Some(auth_key) = config::tailscale_authkey() else {
        error!("TAILSCALE_AUTHKEY must be set to join the overlay network");
    };

    let resolver = ExposureResolver::from_env();
    match resolver
        .overlay()
        .join(&auth_key, &hostname, config::port())
        .await
    {
        Ok(name) => {
            info!("Node is reachable at https://{}:{}", name, config::port());
            info!("Run sporemote expose to print the callback URL to register.");
        }
        Err(e) => error!("Join failed: {}", e),
    }
}

fn check_credentials() {
    for var in ["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"] {
        if std::env::var(var).is_err() {
            error!(
                "Missing required environment variable: {}\nGet credentials from https://developer.spotify.com/dashboard",
                var
            );
        }
    }
}
