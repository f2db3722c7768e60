//! The JSON resolution engine.
//!
//! A message is searched tier by tier in the fixed order of [`TIER_ORDER`]:
//!
//! 1. **Attachment**: the first attachment named `*.json` or typed
//!    `application/json` / `text/json`. If it does not parse, resolution
//!    fails outright; no later tier is tried.
//! 2. **Body literal**: the first non-greedy `{ ... }` span of the text
//!    body. A parse failure falls through.
//! 3. **Direct link**: each HTML body link ending in `.json`,
//!    fetched and accepted when the response is 2xx, typed as JSON, and
//!    parses.
//! 4. **Page link**: each HTML body link, fetched as a page whose own
//!    `.json` links are tried like direct links. Depth is fixed at two hops.
//!
//! Each tier returns `Ok(None)` when it finds nothing usable; the first
//! `Some` wins. Candidate-local failures (one fetch, one parse) are logged
//! and skipped. Only the attachment parse failure, the overall deadline,
//! and final exhaustion are errors.
//!
//! Fetches are issued one at a time so an earlier candidate always beats a
//! later one.

pub mod links;
pub mod literal;

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{MailJsonError, Result};
use crate::fetch::Fetcher;
use crate::model::candidate::{Candidate, Resolution, Tier};
use crate::model::mail::Message;

/// Order in which tiers are consulted.
pub const TIER_ORDER: [Tier; 4] = [
    Tier::Attachment,
    Tier::BodyLiteral,
    Tier::DirectLink,
    Tier::PageLink,
];

/// Stateless resolver: holds only its fetcher and an optional deadline.
#[derive(Debug, Clone)]
pub struct Engine<F> {
    fetcher: F,
    deadline: Option<Duration>,
}

impl<F: Fetcher> Engine<F> {
    /// Create an engine with no overall deadline.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            deadline: None,
        }
    }

    /// Bound the wall-clock time of each resolution (`None` = unbounded).
    ///
    /// The deadline is checked before every network request.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The fetcher used for body links (and remote sources).
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve the JSON document carried by `message`.
    pub fn resolve(&self, message: &Message) -> Result<Value> {
        self.resolve_detailed(message).map(Resolution::into_value)
    }

    /// Like [`resolve`](Self::resolve), keeping the tier and candidate that matched.
    pub fn resolve_detailed(&self, message: &Message) -> Result<Resolution> {
        let clock = Clock::start(self.deadline);

        for tier in TIER_ORDER {
            debug!(%tier, "Searching tier");
            if let Some(found) = self.run_tier(tier, message, &clock)? {
                info!(tier = %found.tier, candidate = %found.candidate, "Resolved JSON");
                return Ok(found);
            }
        }

        debug!("All tiers exhausted");
        Err(MailJsonError::NoJsonFound)
    }

    fn run_tier(&self, tier: Tier, message: &Message, clock: &Clock) -> Result<Option<Resolution>> {
        match tier {
            Tier::Attachment => self.from_attachment(message),
            Tier::BodyLiteral => Ok(from_body_literal(message)),
            Tier::DirectLink => self.from_direct_links(message, clock),
            Tier::PageLink => self.from_page_links(message, clock),
        }
    }

    /// Only the first qualifying attachment is considered, and its parse
    /// failure is terminal.
    fn from_attachment(&self, message: &Message) -> Result<Option<Resolution>> {
        let Some((index, attachment)) = message.json_attachment() else {
            return Ok(None);
        };
        let candidate = Candidate::Attachment {
            index,
            filename: attachment.filename.clone(),
        };
        debug!(%candidate, "Parsing attachment");

        let value = literal::parse_json(&attachment.text(), &candidate)?;
        Ok(Some(Resolution {
            tier: Tier::Attachment,
            candidate,
            value,
        }))
    }

    fn from_direct_links(&self, message: &Message, clock: &Clock) -> Result<Option<Resolution>> {
        for url in links::json_links(links::extract_links(message.html())) {
            if let Some(value) = self.fetch_json(&url, clock)? {
                return Ok(Some(Resolution {
                    tier: Tier::DirectLink,
                    candidate: Candidate::Link { url },
                    value,
                }));
            }
        }
        Ok(None)
    }

    fn from_page_links(&self, message: &Message, clock: &Clock) -> Result<Option<Resolution>> {
        for page in links::extract_links(message.html()) {
            let Some(html) = self.fetch_page(&page, clock)? else {
                continue;
            };
            for url in links::json_links(links::extract_links(&html)) {
                if let Some(value) = self.fetch_json(&url, clock)? {
                    return Ok(Some(Resolution {
                        tier: Tier::PageLink,
                        candidate: Candidate::PageLink { page, url },
                        value,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Fetch `url` and parse it as JSON. `Ok(None)` means this candidate
    /// failed and the caller should move on.
    fn fetch_json(&self, url: &str, clock: &Clock) -> Result<Option<Value>> {
        clock.check()?;
        let response = match self.fetcher.fetch(url) {
            Ok(response) => response,
            Err(err) => {
                debug!(url, error = %err, "Skipping link: fetch failed");
                return Ok(None);
            }
        };
        if !response.is_success() {
            debug!(url, status = response.status, "Skipping link: unsuccessful status");
            return Ok(None);
        }
        if !response.is_json() {
            debug!(
                url,
                content_type = response.content_type.as_deref().unwrap_or("<none>"),
                "Skipping link: not a JSON content type"
            );
            return Ok(None);
        }
        match literal::parse_json(&response.text(), url) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                debug!(url, error = %err, "Skipping link: body is not JSON");
                Ok(None)
            }
        }
    }

    /// Fetch a first-hop page. Any content type is accepted.
    fn fetch_page(&self, url: &str, clock: &Clock) -> Result<Option<String>> {
        clock.check()?;
        match self.fetcher.fetch(url) {
            Ok(response) if response.is_success() => Ok(Some(response.text().into_owned())),
            Ok(response) => {
                debug!(url, status = response.status, "Skipping page: unsuccessful status");
                Ok(None)
            }
            Err(err) => {
                debug!(url, error = %err, "Skipping page: fetch failed");
                Ok(None)
            }
        }
    }
}

/// Parse the first brace span of the text body. Never fails: a bad span
/// just means the next tier runs.
fn from_body_literal(message: &Message) -> Option<Resolution> {
    let text = message.text();
    let span = literal::find_brace_span(text)?;
    let candidate = Candidate::Literal {
        start: span.start,
        end: span.end,
    };
    match literal::parse_json(&text[span], &candidate) {
        Ok(value) => Some(Resolution {
            tier: Tier::BodyLiteral,
            candidate,
            value,
        }),
        Err(err) => {
            debug!(error = %err, "Body literal is not JSON");
            None
        }
    }
}

/// Start time and optional limit of one resolution.
struct Clock {
    started: Instant,
    limit: Option<Duration>,
}

impl Clock {
    fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn check(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.started.elapsed() >= limit => {
                Err(MailJsonError::DeadlineExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}
