//! Football Organizer Entry Point
//!
//! Terminal host for the authentication flow. Renders the screen after every
//! change and reads one command per line from stdin.
//! Uses `anyhow` for startup errors; the auth crate reports its own errors.

mod render;
mod shell;

use std::env;
use std::sync::Arc;

use auth::models::UserAttributes;
use auth::{
    AuthConfig, AuthRuntime, CognitoIdentityClient, Controller, IdentityClient,
    InMemoryIdentityClient, Screen,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::shell::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr; stdout is the screen)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "organizer=info,auth=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let identity = env::var("ORGANIZER_IDENTITY").unwrap_or_else(|_| "cognito".to_string());

    match identity.as_str() {
        "memory" => {
            tracing::info!("Using the in-memory identity service");
            run(demo_pool(), &start).await
        }
        "cognito" => {
            let config = match AuthConfig::from_env() {
                Ok(config) => config,
                Err(e) if cfg!(debug_assertions) => {
                    tracing::warn!(error = %e, "Falling back to the local development pool");
                    AuthConfig::development()
                }
                Err(e) => return Err(e.into()),
            };
            tracing::debug!(config = ?config, "Identity configuration");
            run(CognitoIdentityClient::new(config)?, &start).await
        }
        other => anyhow::bail!("ORGANIZER_IDENTITY must be `cognito` or `memory`, got `{other}`"),
    }
}

/// Offline pool for trying the flow without a user pool
fn demo_pool() -> InMemoryIdentityClient {
    InMemoryIdentityClient::new()
        .with_user("david", "secret123", UserAttributes::new("David", "Johnston"))
        .with_unconfirmed_user("eindhorn", "secret123", UserAttributes::new("Ein", "Horn"))
}

async fn run<C>(client: C, start: &str) -> anyhow::Result<()>
where
    C: IdentityClient + Send + Sync + 'static,
{
    let mut runtime = AuthRuntime::new(Arc::new(client), Controller::new(start));
    runtime.mount();
    println!("{}", render::render(&Screen::build(runtime.controller())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match shell::parse(&line) {
                    Ok(Command::Dispatch(action)) => runtime.dispatch(action),
                    Ok(Command::Show { json: true }) => {
                        let screen = Screen::build(runtime.controller());
                        println!("{}", serde_json::to_string_pretty(&screen)?);
                        continue;
                    }
                    Ok(Command::Show { json: false }) => {}
                    Ok(Command::Help) => {
                        println!("{}", shell::HELP);
                        continue;
                    }
                    Ok(Command::Quit) => break,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                }
            }
            progressed = runtime.step(), if runtime.is_mounted() => {
                if !progressed {
                    continue;
                }
            }
        }
        println!("{}", render::render(&Screen::build(runtime.controller())));
    }

    runtime.unmount();
    tracing::info!("Bye");
    Ok(())
}
