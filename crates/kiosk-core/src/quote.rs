//! Quote-of-the-day client. Never fails outward: a missing quote must not break the board.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

pub const DEFAULT_QUOTE_URL: &str = "https://zenquotes.io/api/today";

const FALLBACK_TEXT: &str = "The journey of a thousand miles begins with one step.";
const FALLBACK_AUTHOR: &str = "Lao Tzu";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }

    /// Shown whenever the quote API cannot be reached or understood.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_TEXT, FALLBACK_AUTHOR)
    }
}

/// One element of the API's response array.
#[derive(Debug, Deserialize)]
struct QuoteEntry {
    q: String,
    a: String,
}

#[derive(Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl QuoteClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Today's quote, or [`Quote::fallback`] on any transport or parse failure.
    pub async fn fetch_daily_quote(&self) -> Quote {
        match self.try_fetch().await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("quote unavailable, using fallback: {}", e);
                Quote::fallback()
            }
        }
    }

    async fn try_fetch(&self) -> Result<Quote, UpstreamError> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = res.status();
        let text = res.text().await.map_err(UpstreamError::from_transport)?;

        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16(), text));
        }

        parse_quote(&text)
    }
}

fn parse_quote(text: &str) -> Result<Quote, UpstreamError> {
    let entries: Vec<QuoteEntry> =
        serde_json::from_str(text).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Malformed("empty quote list".to_string()))?;

    if first.q.trim().is_empty() {
        return Err(UpstreamError::Malformed("blank quote text".to_string()));
    }

    Ok(Quote::new(first.q.trim(), first.a.trim()))
}
