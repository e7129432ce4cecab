//! Card database feeds: cards, extras and sets.

use serde_json::Value;
use tcgsync_config::Settings;
use tcgsync_recon::model::{RawCard, RawExtras};
use tcgsync_recon::{source, ReconError};

use super::common::FetchClient;
use crate::exit_codes;
use crate::CliError;

pub(crate) struct PocketDb {
    client: FetchClient,
    cards_url: String,
    extras_url: String,
    sets_url: String,
}

impl PocketDb {
    pub(crate) fn new(settings: &Settings) -> Result<Self, CliError> {
        Ok(Self {
            client: FetchClient::new("pocketdb", &settings.http)?,
            cards_url: settings.sources.cards_url.clone(),
            extras_url: settings.sources.extras_url.clone(),
            sets_url: settings.sources.sets_url.clone(),
        })
    }

    pub(crate) fn cards(&self) -> Result<Vec<RawCard>, CliError> {
        let payload = self.client.get_json(&self.cards_url)?;
        source::parse_cards_payload(payload).map_err(shape_error)
    }

    pub(crate) fn extras(&self) -> Result<Vec<RawExtras>, CliError> {
        let payload = self.client.get_json(&self.extras_url)?;
        source::parse_extras_payload(payload).map_err(shape_error)
    }

    pub(crate) fn sets(&self) -> Result<Vec<Value>, CliError> {
        let payload = self.client.get_json(&self.sets_url)?;
        source::parse_sets_payload(payload).map_err(shape_error)
    }
}

fn shape_error(err: ReconError) -> CliError {
    CliError {
        code: exit_codes::EXIT_FETCH_UPSTREAM,
        message: err.to_string(),
        hint: Some("the feed layout may have changed upstream".into()),
    }
}
