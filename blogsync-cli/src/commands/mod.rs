//! CLI command implementations.

pub mod collections;
pub mod convert;
pub mod publish;
pub mod watch;

pub use collections::list_collections;
pub use convert::{convert, ConvertArgs};
pub use publish::{publish, PublishArgs};
pub use watch::watch;

use crate::client::{WriteAsClient, DEFAULT_API_URL};
use crate::credentials;
use anyhow::{Context, Result};
use clap::Args;

/// Where the API lives and how to authenticate with it
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Base URL of the write.as API
    #[arg(long, env = "WA_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Access token, used when ~/.writeas/user.json has none
    #[arg(long, env = "WA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl RemoteArgs {
    pub fn client(&self) -> Result<WriteAsClient> {
        let token = credentials::load_token(&credentials::user_file(), self.token.as_deref())?;
        WriteAsClient::new(&self.api_url, token).context("Failed to create API client")
    }
}
