//! # promptledger-graph
//!
//! Microsoft Graph mail access for a single personal mailbox.
//!
//! ## Features
//!
//! - **Mail**: list unread messages newest first, mark a message as read
//! - **Tokens**: refresh token grant with rotation, device code first login
//! - **Providers**: pluggable [`TokenProvider`] so the client never owns a token
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptledger_graph::{Authority, GraphClient, OAuthClient, RefreshTokenProvider, Token};
//!
//! let oauth = OAuthClient::new("client-id", Authority::consumers()?)?
//!     .with_scopes(vec!["offline_access".into(), "Mail.ReadWrite".into()]);
//! let tokens = RefreshTokenProvider::new(oauth, Token::refresh_only(refresh_token));
//!
//! let client = GraphClient::new(Arc::new(tokens))?;
//! let session = client.session().await?;
//! for message in session.list_unread(10).await? {
//!     println!("{}: {:?}", message.id, message.subject);
//!     session.mark_read(&message.id).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod auth;
mod authority;
mod client;
mod error;
pub mod flow;
mod http;
pub mod message;
pub mod token;

pub use auth::{RefreshTokenProvider, StaticTokenProvider, TokenProvider, TokenStore};
pub use authority::{Authority, CONSUMERS};
pub use client::{DEFAULT_BASE_URL, GraphClient, GraphSession};
pub use error::{Error, Result};
pub use flow::{DeviceAuthorization, DeviceCodeFlow, OAuthClient};
pub use http::{CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use message::{BodyContentType, GraphMessage, ItemBody};
pub use token::Token;
