//! Subcommand implementations.

pub mod import;
pub mod issues;
pub mod teams;

use trellis_client::LinearClient;

use crate::config::Settings;

/// Build the API client for the resolved settings.
pub(crate) fn client_for(settings: Settings) -> LinearClient {
    match settings.api_url {
        Some(url) => LinearClient::with_url(settings.api_key, url),
        None => LinearClient::new(settings.api_key),
    }
}
