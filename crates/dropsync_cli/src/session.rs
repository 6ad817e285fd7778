//! An enhanced page and the scripted interaction against it
//!
//! Time is virtual: `wait` steps advance a clock that starts when the
//! session does, so a replay is deterministic.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use dropsync_core::events::{Event, KeyCode};
use dropsync_core::store::Storage;
use dropsync_dom::Document;
use dropsync_widgets::live_search::{self, LiveSearchOutcome};
use dropsync_widgets::{
    choices, dropdown_search, DropdownSearch, FetchRequest, FetchResponse, Fetcher, LiveSearch,
    Location, MarkupBackend, ThemeToggle, WidgetContext, WidgetError,
};

use crate::config::{Fixture, ResponseSpec, Step};
use crate::page::Page;

/// Serves fixture responses by exact URL; anything else is a 404
pub struct FixtureFetcher {
    responses: Vec<ResponseSpec>,
    requests: Vec<FetchRequest>,
}

impl FixtureFetcher {
    pub fn new(responses: Vec<ResponseSpec>) -> Self {
        Self {
            responses,
            requests: Vec::new(),
        }
    }

    /// Requests made so far
    pub fn requests(&self) -> &[FetchRequest] {
        &self.requests
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&mut self, request: &FetchRequest) -> dropsync_widgets::Result<FetchResponse> {
        self.requests.push(request.clone());
        match self.responses.iter().find(|r| r.url == request.url) {
            Some(ResponseSpec {
                error: Some(error), ..
            }) => Err(WidgetError::Fetch(error.clone())),
            Some(response) => Ok(FetchResponse {
                status: response.status,
                body: response.body.clone(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

pub struct Session<S: Storage> {
    page: Page,
    ctx: WidgetContext,
    dropdowns: Vec<DropdownSearch>,
    theme: Option<ThemeToggle<S>>,
    live_searches: Vec<LiveSearch>,
    fetcher: FixtureFetcher,
    location: Location,
    started: Instant,
    elapsed: Duration,
}

impl<S: Storage> Session<S> {
    /// Build the page and run every enhancement on it
    pub fn start(fixture: &Fixture, storage: S) -> Result<Self> {
        let mut page = Page::build(fixture)?;
        let mut ctx = WidgetContext::new();
        let locale = fixture.locale();

        let attached = choices::initialize(&mut page.doc, &mut MarkupBackend::new(), locale);
        let dropdowns =
            dropdown_search::initialize(&mut page.doc, &mut ctx, &fixture.dropdown_options());

        let theme = match ThemeToggle::initialize(&mut page.doc, storage) {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("theme toggle disabled: {}", e);
                None
            }
        };

        let live_searches = live_search::bind(&page.doc, &fixture.live_search);

        tracing::info!(
            "Enhanced page {}: {} dropdowns, {} search-selects, {} live searches",
            fixture.page.path,
            dropdowns.len(),
            attached.len(),
            live_searches.len()
        );

        Ok(Self {
            page,
            ctx,
            dropdowns,
            theme,
            live_searches,
            fetcher: FixtureFetcher::new(fixture.responses.clone()),
            location: Location::new(fixture.page.path.clone(), fixture.page.query.clone()),
            started: Instant::now(),
            elapsed: Duration::ZERO,
        })
    }

    pub fn doc(&self) -> &Document {
        &self.page.doc
    }

    pub fn dropdowns(&self) -> &[DropdownSearch] {
        &self.dropdowns
    }

    pub fn fetcher(&self) -> &FixtureFetcher {
        &self.fetcher
    }

    /// Full document markup
    pub fn markup(&self) -> String {
        self.page.doc.to_markup(self.page.doc.root())
    }

    /// Submission the page's form would make
    pub fn form_data(&self) -> Vec<(String, String)> {
        self.page.doc.form_data(self.page.form)
    }

    fn now(&self) -> Instant {
        self.started + self.elapsed
    }

    /// Run every step in order
    pub fn replay(&mut self, steps: &[Step]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.run_step(step)
                .with_context(|| format!("Step {} ({:?}) failed", i + 1, step))?;
        }
        Ok(())
    }

    pub fn run_step(&mut self, step: &Step) -> Result<()> {
        tracing::debug!("step: {:?}", step);
        match step {
            Step::Open { control } => {
                let trigger = self.dropdown(control)?.surface().trigger;
                self.dispatch(Event::click(trigger.to_raw()))?;
            }
            Step::Filter { control, query } => {
                let search = self.dropdown(control)?.surface().search;
                self.dispatch(Event::text_input(search.to_raw(), query.as_str()))?;
            }
            Step::Select { control, option } => {
                let dropdown = self.dropdown(control)?;
                let Some(index) = dropdown
                    .options()
                    .iter()
                    .position(|o| o.label == *option || o.value == *option)
                else {
                    bail!("Control '{}' has no option '{}'", control, option);
                };
                let entry = dropdown.surface().entries[index];
                self.dispatch(Event::click(entry.label.to_raw()))?;
                self.dispatch(Event::change(entry.input.to_raw()))?;
            }
            Step::Dismiss { control } => {
                let index = self.dropdown_index(control)?;
                self.dropdowns[index].dismiss(&mut self.page.doc, &mut self.ctx);
            }
            Step::Escape { control } => {
                let search = self.dropdown(control)?.surface().search;
                self.dispatch(Event::key_down(search.to_raw(), KeyCode::Escape))?;
            }
            Step::Type { input, text } => {
                let Some(node) = self.page.input(input) else {
                    bail!("Unknown input '{}'", input);
                };
                self.dispatch(Event::text_input(node.to_raw(), text.as_str()))?;
            }
            Step::Wait { ms } => {
                self.elapsed += Duration::from_millis(*ms);
                self.poll_live_searches();
            }
            Step::ToggleTheme => {
                let Some(theme) = &self.theme else {
                    bail!("The page has no theme toggle");
                };
                let button = theme.button();
                self.dispatch(Event::click(button.to_raw()))?;
            }
            Step::ClickOutside => {
                let body = self.page.doc.body();
                self.dispatch(Event::click(body.to_raw()))?;
            }
        }
        self.report_changes();
        Ok(())
    }

    /// Route an event to everything on the page
    fn dispatch(&mut self, event: Event) -> Result<()> {
        let event = event.at(self.elapsed.as_millis() as u64);
        let now = self.now();
        let doc = &mut self.page.doc;

        if let Some(theme) = &self.theme {
            if theme.handle_event(doc, &event)? {
                tracing::info!("Theme is now {:?}", theme.current_theme(doc));
            }
        }
        for dropdown in &mut self.dropdowns {
            dropdown.handle_event(doc, &mut self.ctx, &event);
        }
        for search in &mut self.live_searches {
            search.handle_event(doc, &event, now);
        }
        Ok(())
    }

    fn poll_live_searches(&mut self) {
        let now = self.now();
        for search in &mut self.live_searches {
            match search.poll(&mut self.page.doc, &self.location, &mut self.fetcher, now) {
                LiveSearchOutcome::Idle => {}
                LiveSearchOutcome::Replaced { url } => {
                    tracing::info!("Live search {} updated {}", url, search.target())
                }
                LiveSearchOutcome::Kept { url, status } => {
                    tracing::info!("Live search {} returned {}; kept {}", url, status, search.target())
                }
                LiveSearchOutcome::Failed { url } => {
                    tracing::info!("Live search {} failed; kept {}", url, search.target())
                }
            }
        }
    }

    fn report_changes(&mut self) {
        for id in self.ctx.take_dirty() {
            if let Some(dropdown) = self.dropdowns.iter().find(|d| d.id() == id) {
                tracing::info!(
                    "{}: \"{}\" ({})",
                    self.page
                        .controls
                        .iter()
                        .find(|(_, node)| *node == dropdown.control())
                        .map_or("?", |(name, _)| name.as_str()),
                    dropdown.trigger_text(&self.page.doc),
                    if dropdown.is_open(&self.ctx) { "open" } else { "closed" }
                );
            }
        }
    }

    fn dropdown_index(&self, control: &str) -> Result<usize> {
        let Some(node) = self.page.control(control) else {
            bail!("Unknown control '{}'", control);
        };
        self.dropdowns
            .iter()
            .position(|d| d.control() == node)
            .with_context(|| format!("Control '{}' is not enhanced", control))
    }

    fn dropdown(&self, control: &str) -> Result<&DropdownSearch> {
        let index = self.dropdown_index(control)?;
        Ok(&self.dropdowns[index])
    }

    #[cfg(test)]
    fn control(&self, name: &str) -> dropsync_dom::NodeId {
        self.page.control(name).unwrap()
    }
}
