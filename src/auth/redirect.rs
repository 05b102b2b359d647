//! One-shot listener for the OAuth2 authorization redirect.
//!
//! Binds the registered redirect URI, accepts a single connection from the
//! member's browser, and hands back the query parameters Hootsuite appended.
//! Used by the `get-tokens` helper, not by the client itself.

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const SUCCESS_HTML: &str = "<h1>You can now access the Hootsuite API.</h1>\
<h3>Please close this window.</h3>";

const FAILURE_HTML: &str = "<h1>Authorization unsuccessful.</h1>\
<p>Check the terminal for details.</p>";

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRedirect {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl AuthorizationRedirect {
    /// The authorization code, or the provider's error when it sent one
    /// instead.
    pub fn into_code(self) -> Result<String> {
        if let Some(code) = self.code {
            return Ok(code);
        }
        let error = self
            .error
            .unwrap_or_else(|| "no authorization code in redirect".to_string());
        match self.error_description {
            Some(description) => bail!("{error} - {description}"),
            None => bail!("{error}"),
        }
    }
}

/// Waits for a single redirect to `redirect_uri` and returns its parameters.
///
/// Serves a small HTML page to the browser and drops the listener after the
/// first request.
pub async fn wait_for_redirect(redirect_uri: &str) -> Result<AuthorizationRedirect> {
    let url = Url::parse(redirect_uri).context("invalid redirect uri")?;
    let host = url.host_str().unwrap_or("127.0.0.1").to_string();
    let port = url.port_or_known_default().unwrap_or(80);

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("could not bind {host}:{port}"))?;
    tracing::info!("waiting for authorization redirect on {host}:{port}");

    let (mut stream, _) = listener
        .accept()
        .await
        .context("failed to accept redirect connection")?;

    let mut buffer = vec![0u8; 4096];
    let read = stream
        .read(&mut buffer)
        .await
        .context("failed to read redirect request")?;
    let request = String::from_utf8_lossy(&buffer[..read]);

    let redirect = parse_request_line(&request);

    let page = if redirect.code.is_some() {
        SUCCESS_HTML
    } else {
        FAILURE_HTML
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        page.len(),
        page
    );
    stream
        .write_all(response.as_bytes())
        .await
        .context("failed to answer redirect request")?;
    let _ = stream.shutdown().await;

    Ok(redirect)
}

/// Pulls the redirect parameters out of the request line of a raw HTTP
/// request.
fn parse_request_line(request: &str) -> AuthorizationRedirect {
    let mut redirect = AuthorizationRedirect::default();

    let Some(line) = request.lines().next() else {
        return redirect;
    };
    let Some(path) = line.split_whitespace().nth(1) else {
        return redirect;
    };
    let Some((_, query)) = path.split_once('?') else {
        return redirect;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => redirect.code = Some(value.into_owned()),
            "state" => redirect.state = Some(value.into_owned()),
            "error" => redirect.error = Some(value.into_owned()),
            "error_description" => redirect.error_description = Some(value.into_owned()),
            _ => {}
        }
    }
    redirect
}
