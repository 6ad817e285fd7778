//! Live search - debounced fragment refresh
//!
//! Each `[data-live-search]` input names a target element by selector. Once
//! the user stops typing for the quiet period, the current page is requested
//! again with `q` set to the input value and the response body replaces the
//! target's contents.
//!
//! Time is supplied by the caller: [`LiveSearch::handle_event`] records the
//! keystroke instant and [`LiveSearch::poll`] fires the request once the
//! quiet period has elapsed.

use std::time::{Duration, Instant};

use dropsync_core::events::{event_types, Event};
use dropsync_dom::{Document, NodeId};
use url::form_urlencoded;

use crate::config::LiveSearchOptions;
use crate::error::Result;

/// Selector of bound inputs; the attribute value selects the target
pub const SELECTOR: &str = "[data-live-search]";

/// Query parameter carrying the search text
pub const QUERY_PARAM: &str = "q";

/// Fires once after a quiet period
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period at `now`
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// =============================================================================
// URL building
// =============================================================================

/// Path and query of the current page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Query string without the leading `?`
    pub query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            path: path.into(),
            query: query.strip_prefix('?').map(str::to_string).unwrap_or(query),
        }
    }

    /// Split a `path?query#fragment` reference; the fragment is dropped
    pub fn parse(url: &str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        match url.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(url, ""),
        }
    }
}

/// Target URL for a search of `value` from `location`
///
/// `q` replaces the first existing `q` pair (dropping the others) or is
/// appended; an empty value removes every `q` pair. The `?` is always
/// present, even when no parameters remain.
pub fn build_url(location: &Location, value: &str) -> String {
    let mut params = parse_query(&location.query);
    if value.is_empty() {
        params.retain(|(name, _)| name != QUERY_PARAM);
    } else if let Some(first) = params.iter().position(|(name, _)| name == QUERY_PARAM) {
        params[first].1 = value.to_string();
        let mut index = 0;
        params.retain(|(name, _)| {
            let keep = name != QUERY_PARAM || index == first;
            index += 1;
            keep
        });
    } else {
        params.push((QUERY_PARAM.to_string(), value.to_string()));
    }
    format!("{}?{}", location.path, serialize_query(&params))
}

/// Parse `application/x-www-form-urlencoded` pairs
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Serialize pairs as `application/x-www-form-urlencoded`
pub fn serialize_query(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

// =============================================================================
// Fetching
// =============================================================================

/// A GET request for a page fragment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// GET marked as an in-page request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: vec![("X-Requested-With".to_string(), "XMLHttpRequest".to_string())],
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport for live-search requests
pub trait Fetcher {
    /// Perform the request; `Err` is a transport failure, not an HTTP status
    fn fetch(&mut self, request: &FetchRequest) -> Result<FetchResponse>;
}

/// What a poll did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveSearchOutcome {
    /// Nothing was due
    Idle,
    /// The target's contents were replaced
    Replaced { url: String },
    /// Non-2xx response; the target was left as is
    Kept { url: String, status: u16 },
    /// Transport failure; the target was left as is
    Failed { url: String },
}

/// One bound input and its target
#[derive(Clone, Debug)]
pub struct LiveSearch {
    input: NodeId,
    target: NodeId,
    debouncer: Debouncer,
}

impl LiveSearch {
    pub fn new(input: NodeId, target: NodeId, options: &LiveSearchOptions) -> Self {
        Self {
            input,
            target,
            debouncer: Debouncer::new(options.debounce()),
        }
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Record a keystroke in the input
    pub fn handle_event(&mut self, doc: &mut Document, event: &Event, now: Instant) -> bool {
        if event.event_type != event_types::TEXT_INPUT || NodeId::from_raw(event.target) != self.input {
            return false;
        }
        if let Some(text) = event.text() {
            if let Err(e) = doc.set_value(self.input, text) {
                tracing::warn!("live search: {}", e);
            }
        }
        self.debouncer.trigger(now);
        true
    }

    /// Fire the request if the quiet period has elapsed
    pub fn poll(
        &mut self,
        doc: &mut Document,
        location: &Location,
        fetcher: &mut dyn Fetcher,
        now: Instant,
    ) -> LiveSearchOutcome {
        if !self.debouncer.poll(now) {
            return LiveSearchOutcome::Idle;
        }
        self.search_now(doc, location, fetcher)
    }

    /// Request the fragment for the input's current value
    pub fn search_now(
        &mut self,
        doc: &mut Document,
        location: &Location,
        fetcher: &mut dyn Fetcher,
    ) -> LiveSearchOutcome {
        self.debouncer.cancel();
        let value = doc.value(self.input).unwrap_or_default();
        let url = build_url(location, &value);
        let request = FetchRequest::get(url.clone());

        match fetcher.fetch(&request) {
            Ok(response) if response.is_success() => {
                if let Err(e) = doc.set_inner_markup(self.target, &response.body) {
                    tracing::error!("Live search failed: {}", e);
                    return LiveSearchOutcome::Failed { url };
                }
                tracing::debug!("live search: {} -> {} replaced", url, self.target);
                LiveSearchOutcome::Replaced { url }
            }
            Ok(response) => {
                tracing::debug!("live search: {} returned {}", url, response.status);
                LiveSearchOutcome::Kept {
                    url,
                    status: response.status,
                }
            }
            Err(e) => {
                tracing::error!("Live search failed: {}", e);
                LiveSearchOutcome::Failed { url }
            }
        }
    }
}

/// Bind every `[data-live-search]` input whose target exists
pub fn bind(doc: &Document, options: &LiveSearchOptions) -> Vec<LiveSearch> {
    let inputs = match doc.query_selector_all(SELECTOR) {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::warn!("live search: {}", e);
            return Vec::new();
        }
    };

    let mut bound = Vec::new();
    for input in inputs {
        let Some(selector) = doc.data_attribute(input, "live-search") else {
            continue;
        };
        match doc.query_selector(&selector) {
            Ok(Some(target)) => bound.push(LiveSearch::new(input, target, options)),
            Ok(None) => tracing::debug!("live search: no target for {:?}", selector),
            Err(e) => tracing::warn!("live search: {}", e),
        }
    }
    tracing::debug!("live search: {} inputs bound", bound.len());
    bound
}
