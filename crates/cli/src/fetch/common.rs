//! Shared HTTP client for the upstream feeds and card-detail pages.
//!
//! - `FetchClient` - blocking client with retry / backoff / error
//!   classification
//! - 401/403, 400 and other 4xx fail immediately; 429, 5xx and network
//!   errors are retried with exponential backoff (`Retry-After` honoured)
//! - JSON bodies are read as text first so a UTF-8 BOM does not break
//!   decoding

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::Value;
use tcgsync_config::HttpSettings;

use crate::exit_codes;
use crate::CliError;

const ACCEPT_JSON: &str = "application/json,text/plain,*/*";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Outcome of a request that did not fail outright.
pub(crate) enum Reply {
    Body(Response),
    /// Non-retryable client error (4xx other than 429).
    Rejected(u16),
}

pub(crate) struct FetchClient {
    http: Client,
    source_name: String,
    max_retries: u32,
    backoff: Duration,
}

impl FetchClient {
    pub(crate) fn new(source_name: &str, settings: &HttpSettings) -> Result<Self, CliError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {}", e),
                hint: None,
            })?;

        Ok(Self {
            http,
            source_name: source_name.to_string(),
            max_retries: settings.max_retries,
            backoff: Duration::from_millis(settings.backoff_ms),
        })
    }

    /// GET with retry + exponential backoff.
    pub(crate) fn send(&self, url: &str, accept: &str) -> Result<Reply, CliError> {
        let mut backoff = self.backoff;

        for attempt in 0..=self.max_retries {
            let result = self.http.get(url).header("Accept", accept).send();

            let wait = match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status == 401 || status == 403 {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_AUTH,
                            message: format!("{} auth failed ({}): {}", self.source_name, status, url),
                            hint: None,
                        });
                    }

                    if (400..500).contains(&status) && status != 429 {
                        return Ok(Reply::Rejected(status));
                    }

                    if status != 429 && status < 500 {
                        return Ok(Reply::Body(resp));
                    }

                    if attempt == self.max_retries {
                        let (code, what) = if status == 429 {
                            (exit_codes::EXIT_FETCH_RATE_LIMIT, "rate limited")
                        } else {
                            (exit_codes::EXIT_FETCH_UPSTREAM, "upstream error")
                        };
                        return Err(CliError {
                            code,
                            message: format!(
                                "{} {} after {} attempts ({})",
                                self.source_name,
                                what,
                                attempt + 1,
                                status,
                            ),
                            hint: None,
                        });
                    }

                    let retry_after = (status == 429)
                        .then(|| resp.headers().get("retry-after"))
                        .flatten()
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs);

                    log::warn!(
                        "{}: retry {}/{} (HTTP {})",
                        self.source_name,
                        attempt + 1,
                        self.max_retries,
                        status,
                    );
                    retry_after.unwrap_or(backoff)
                }
                Err(e) => {
                    if attempt == self.max_retries {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} unreachable after {} attempts: {}",
                                self.source_name,
                                attempt + 1,
                                e,
                            ),
                            hint: Some("check network access or the [sources] URLs in the config".into()),
                        });
                    }

                    log::warn!(
                        "{}: retry {}/{} ({})",
                        self.source_name,
                        attempt + 1,
                        self.max_retries,
                        e,
                    );
                    backoff
                }
            };

            thread::sleep(wait);
            backoff *= 2;
        }

        Err(CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("{} request never attempted", self.source_name),
            hint: None,
        })
    }

    /// GET and decode JSON. Any rejection is an error.
    pub(crate) fn get_json(&self, url: &str) -> Result<Value, CliError> {
        let resp = match self.send(url, ACCEPT_JSON)? {
            Reply::Body(resp) => resp,
            Reply::Rejected(status) => {
                return Err(CliError {
                    code: exit_codes::EXIT_FETCH_REJECTED,
                    message: format!("{} request rejected ({}): {}", self.source_name, status, url),
                    hint: None,
                })
            }
        };

        let text = self.read_body(resp)?;
        let trimmed = text.trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!(
                "failed to parse {} JSON response: {} (body: {})",
                self.source_name,
                e,
                trimmed.chars().take(200).collect::<String>(),
            ),
            hint: None,
        })
    }

    /// GET an HTML page. `Ok(None)` when the server rejects the request.
    pub(crate) fn get_page(&self, url: &str) -> Result<Option<String>, CliError> {
        match self.send(url, ACCEPT_HTML)? {
            Reply::Body(resp) => self.read_body(resp).map(Some),
            Reply::Rejected(status) => {
                log::debug!("{}: {} for {}", self.source_name, status, url);
                Ok(None)
            }
        }
    }

    fn read_body(&self, resp: Response) -> Result<String, CliError> {
        resp.text().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("failed to read {} response body: {}", self.source_name, e),
            hint: None,
        })
    }
}
