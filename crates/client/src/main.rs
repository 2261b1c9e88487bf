//! `tecnoquality`: headless runner for the session core.
//!
//! Boots the client against the configured backends, optionally signs in,
//! opens a path, and optionally signs out, logging each outcome.

use anyhow::{Context, Result};
use clap::Parser;

use tecnoquality_client::{App, ClientConfig, Guarded, LOADING_PLACEHOLDER, Page};

#[derive(Debug, Parser)]
#[command(
    name = "tecnoquality",
    version,
    about = "Run the TecnoQuality session flow against the configured backends",
    after_help = "Backends are configured through TECNOQUALITY_* environment variables \
                  (TECNOQUALITY_IDENTITY_URL, TECNOQUALITY_STORAGE, ...)."
)]
struct Cli {
    /// Sign in with this email.
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Password for `--email`.
    #[arg(long, env = "TECNOQUALITY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to open once the session is settled.
    #[arg(long)]
    path: Option<String>,

    /// Sign out before exiting.
    #[arg(long, default_value = "false")]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    tecnoquality_observability::init_with_level(&config.log_level);

    let app = App::new(config).context("failed to set up client")?;

    let state = app.boot().await;
    tracing::info!(authenticated = state.is_authenticated(), "session state after boot");

    if let (Some(email), Some(password)) = (cli.email.as_deref(), cli.password.as_deref()) {
        match app.controller().try_login(email, password).await {
            Ok(session) => tracing::info!(
                user = %session.display_name,
                role = %session.role,
                landing = session.landing_path(),
                "signed in"
            ),
            Err(err) => tracing::warn!(reason = %err, "{}", err.user_message()),
        }
    }

    if let Some(path) = cli.path.as_deref() {
        report(path, app.open(path));
    }

    if cli.logout {
        app.controller().logout().await;
    }

    tracing::info!(location = %app.navigator().path(), "done");
    app.shutdown().await;
    Ok(())
}

fn report(path: &str, page: Page) {
    match page {
        Page::Login => tracing::info!(path, "showing login"),
        Page::Forwarded(landing) => tracing::info!(path, landing, "forwarded to landing path"),
        Page::View(Guarded::Loading) => tracing::info!(path, "{LOADING_PLACEHOLDER}"),
        Page::View(Guarded::Redirect(to)) => {
            tracing::info!(path, to, "not signed in; redirected")
        }
        Page::View(Guarded::Render { shell, view }) => tracing::info!(
            path,
            area = %view.area,
            user = %shell.display_name(),
            "rendered guarded view"
        ),
        Page::NotFound => tracing::warn!(path, "no such view"),
    }
}
