//! A typed client for the Hootsuite REST v1 API.
//!
//! Wraps the OAuth2 authorization-code flow, token refresh, and the
//! member/profile/message/media endpoints behind [`HootsuiteClient`]. Tokens
//! are refreshed inline: proactively when stale, and once more after a 401,
//! with the failed call retried exactly once.
//!
//! ```no_run
//! use hootsuite_client::{Credentials, HootsuiteClient, Token};
//!
//! # async fn run() -> hootsuite_client::Result<()> {
//! let credentials = Credentials::new("client_id", "client_secret");
//! let client = HootsuiteClient::new(credentials);
//! client.set_token(Token::default()).await;
//!
//! let me = client.get_me().await?;
//! println!("authenticated as {}", me.full_name);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod locale;
pub mod types;

mod client;

pub use auth::{noop_refresh_callback, Credentials, RefreshCallback, Token};
pub use client::HootsuiteClient;
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use types::{
    MediaStatus, MediaUpload, Member, Message, MessageFilters, MessageState, MimeType,
    NewMemberOptions, Organization, ReviewEvent, Reviewer, SocialProfile,
};
