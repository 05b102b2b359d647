//! Interactive helper that walks the OAuth2 authorization-code flow once
//! and prints the resulting token as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hootsuite_client::auth::wait_for_redirect;
use hootsuite_client::{Credentials, HootsuiteClient};

/// Retrieve Hootsuite OAuth2 tokens.
#[derive(Parser)]
#[command(name = "get-tokens")]
struct Args {
    /// Hootsuite application client id
    #[arg(long, env = "HOOTSUITE_CLIENT_ID")]
    client_id: String,

    /// Hootsuite application client secret
    #[arg(long, env = "HOOTSUITE_CLIENT_SECRET")]
    client_secret: String,

    /// Callback URI registered with Hootsuite
    #[arg(
        long,
        env = "HOOTSUITE_REDIRECT_URI",
        default_value = "http://localhost:8000/"
    )]
    redirect_uri: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let credentials = Credentials::new(args.client_id, args.client_secret)
        .with_redirect_uri(args.redirect_uri.clone());
    let client = HootsuiteClient::new(credentials);

    let (url, state) = client.authorization_url(None)?;
    tracing::info!("opening browser for authorization");
    if open::that(&url).is_err() {
        println!("Visit this URL to authorize: {url}");
    }

    let redirect = wait_for_redirect(&args.redirect_uri).await?;
    if redirect.state.as_deref() != Some(state.as_str()) {
        tracing::warn!("redirect state does not match the one sent");
    }
    let code = redirect.into_code()?;

    let token = client
        .exchange_code(&code)
        .await
        .context("authorization code exchange failed")?;

    let me = client
        .get_me()
        .await
        .context("token obtained but fetching the member failed")?;
    println!("You can now access the Hootsuite API as {}.", me.full_name);
    println!("{}", serde_json::to_string_pretty(&token)?);

    Ok(())
}
