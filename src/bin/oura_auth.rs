// ABOUTME: Interactive OAuth2 authorization-code flow for the Oura API
// ABOUTME: Listens for the browser redirect locally and prints the issued token to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use oura_client::AuthClient;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "oura-auth",
    about = "Perform the Oura OAuth2 authorization-code flow and print the issued token"
)]
struct Cli {
    /// OAuth2 client ID
    client_id: String,

    /// OAuth2 client secret
    client_secret: String,

    /// Local redirect listener port
    #[arg(long, default_value_t = 3030)]
    port: u16,

    /// Scope to request; repeatable. Defaults to all scopes.
    #[arg(long = "scope")]
    scopes: Vec<String>,

    /// Seconds to wait for the browser redirect
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let auth = AuthClient::new(cli.client_id.clone(), Some(cli.client_secret.clone()));
    let redirect_uri = format!("http://localhost:{}/callback", cli.port);
    let state = uuid::Uuid::new_v4().to_string();

    let scope_refs: Vec<&str> = cli.scopes.iter().map(String::as_str).collect();
    let scopes = if scope_refs.is_empty() {
        None
    } else {
        Some(scope_refs.as_slice())
    };
    let authorize_url = auth.authorize_url(scopes, &redirect_uri, Some(&state));

    println!("\nPlease visit this URL to authorize the application:");
    println!("{authorize_url}\n");

    let listener = TcpListener::bind(format!("127.0.0.1:{}", cli.port))
        .await
        .with_context(|| format!("failed to bind redirect listener on port {}", cli.port))?;
    info!("Listening for the OAuth redirect on port {}", cli.port);

    let code = tokio::time::timeout(
        Duration::from_secs(cli.timeout),
        wait_for_code(listener, &state),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "no authorization code received within {} seconds",
            cli.timeout
        )
    })??;

    info!("Received authorization code, exchanging for tokens");
    let token = auth.exchange_code(&code, Some(&redirect_uri)).await?;

    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}

/// Accept connections until one carries the authorization code.
async fn wait_for_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    loop {
        let (socket, _) = listener.accept().await?;
        if let Some(code) = handle_redirect(socket, expected_state).await? {
            return Ok(code);
        }
    }
}

/// Parse one redirect request; returns the code when present. Stray
/// requests (favicon and the like) are answered and skipped.
async fn handle_redirect(socket: TcpStream, expected_state: &str) -> Result<Option<String>> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let Some(path) = line.split_whitespace().nth(1) else {
        return Ok(None);
    };
    let Ok(url) = Url::parse(&format!("http://localhost{path}")) else {
        return Ok(None);
    };

    let params: std::collections::HashMap<_, _> = url.query_pairs().collect();

    if let Some(error) = params.get("error") {
        respond(&mut writer, "Authorization failed. You can close this window.").await;
        bail!("authorization denied by the provider: {error}");
    }

    let Some(code) = params.get("code") else {
        respond(&mut writer, "Waiting for the authorization redirect.").await;
        return Ok(None);
    };

    if let Some(state) = params.get("state") {
        if state != expected_state {
            respond(&mut writer, "State mismatch. You can close this window.").await;
            bail!("state parameter mismatch in the redirect");
        }
    }

    respond(
        &mut writer,
        "Authorization successful! You can close this window and return to the terminal.",
    )
    .await;
    Ok(Some(code.to_string()))
}

async fn respond(writer: &mut tokio::net::tcp::OwnedWriteHalf, message: &str) {
    let body = format!("<html><body><p>{message}</p></body></html>");
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    writer.write_all(response.as_bytes()).await.ok();
}
