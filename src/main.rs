mod analytics;
mod api_client;
mod config;
mod log_util;
mod stats;
mod submission;
mod ui_renderer;
mod view_managers;

use analytics::{AnalyticsView, Source};
use api_client::ApiClient;
use color_eyre::Result;
use config::AppConfig;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dotenvy::dotenv;
use log_util::log_debug;
use ratatui::{DefaultTerminal, Frame};
use std::{
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};
use submission::{SubmitForm, SubmitMessage};
use ui_renderer::UiRenderer;
use view_managers::{AnalyticsManager, SubmitManager};

pub(crate) const LOADING_FRAMES: [&str; 4] = ["-", "\\", "|", "/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppView {
    Submit,
    Youtube,
    Reddit,
    Team,
}

fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new().and_then(|app| app.run(terminal));
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub(crate) running: bool,
    /// Current view being displayed.
    pub(crate) view: AppView,
    /// Effective configuration after file and environment overrides.
    pub(crate) config: AppConfig,
    /// Shared HTTP client for the sentiment backend.
    pub(crate) api_client: ApiClient,
    /// Product submission form state.
    pub(crate) submit_form: SubmitForm,
    /// Receives the background submission outcome.
    pub(crate) submit_receiver: Option<Receiver<SubmitMessage>>,
    /// YouTube analytics view state.
    pub(crate) youtube_view: AnalyticsView,
    /// Reddit analytics view state.
    pub(crate) reddit_view: AnalyticsView,
    /// The most recently accepted product name.
    pub(crate) last_product: Option<String>,
    /// Any error encountered while loading configuration or running background work.
    pub(crate) error: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new() -> Result<Self> {
        let mut startup_error: Option<String> = None;

        let config = match AppConfig::load() {
            Ok(config) => config,
            Err(err) => {
                Self::push_error(
                    &mut startup_error,
                    format!("Configuration load failed: {}", err),
                );
                AppConfig::default()
            }
        };
        let api_client = ApiClient::new(&config)?;

        Ok(Self {
            running: false,
            view: AppView::Submit,
            config,
            api_client,
            submit_form: SubmitForm::new(),
            submit_receiver: None,
            youtube_view: AnalyticsView::new(Source::Youtube),
            reddit_view: AnalyticsView::new(Source::Reddit),
            last_product: None,
            error: startup_error,
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        let tick_rate = Duration::from_millis(120);
        while self.running {
            self.poll_background_messages();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(tick_rate)?;
        }
        Ok(())
    }

    /// Dispatch rendering based on the active view.
    fn render(&mut self, frame: &mut Frame) {
        UiRenderer::new(self).render(frame);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, tick_rate: Duration) -> Result<()> {
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
            self.poll_background_messages();
        } else {
            self.on_tick();
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        self.submit_form.tick_spinner();
        self.youtube_view.tick();
        self.reddit_view.tick();
        self.poll_background_messages();
    }

    fn poll_background_messages(&mut self) {
        self.poll_submit_message();
        self.youtube_view.poll();
        self.reddit_view.poll();
    }

    fn poll_submit_message(&mut self) {
        let mut clear_receiver = false;
        if let Some(receiver) = self.submit_receiver.as_ref() {
            match receiver.try_recv() {
                Ok(message) => {
                    clear_receiver = true;
                    match message {
                        SubmitMessage::Success(payload) => self.handle_submit_success(payload),
                        SubmitMessage::Error(message) => self.handle_submit_error(message),
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    clear_receiver = true;
                    self.handle_submit_error("Background submit worker disconnected".to_string());
                }
            }
        }

        if clear_receiver {
            self.submit_receiver = None;
        }
    }

    fn handle_submit_success(&mut self, payload: serde_json::Value) {
        let product = self.submit_form.product_name.trim().to_string();
        log_debug(&format!(
            "App: submission for '{}' accepted: {}",
            product, payload
        ));
        self.last_product = Some(product);
        self.submit_form.complete_success();
    }

    fn handle_submit_error(&mut self, message: String) {
        let trimmed = message.trim().to_string();
        if trimmed.starts_with("Failed to build Tokio runtime")
            || trimmed.starts_with("Background submit worker")
        {
            Self::push_error(&mut self.error, trimmed.clone());
        }
        log_debug(&format!("App: submission failed: {}", trimmed));
        self.submit_form.complete_failure();
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (KeyModifiers::CONTROL, KeyCode::Char('t') | KeyCode::Char('T')) => self.show_team(),
            _ => match self.view {
                AppView::Submit => self.on_submit_key(key),
                AppView::Youtube => self.on_analytics_key(key, Source::Youtube),
                AppView::Reddit => self.on_analytics_key(key, Source::Reddit),
                AppView::Team => self.on_team_key(key),
            },
        }
    }

    fn on_submit_key(&mut self, key: KeyEvent) {
        if let (KeyModifiers::NONE, KeyCode::Esc) = (key.modifiers, key.code) {
            self.quit();
            return;
        }
        SubmitManager::new(self).handle_key(key);
    }

    fn on_analytics_key(&mut self, key: KeyEvent, source: Source) {
        if let (KeyModifiers::NONE, KeyCode::Char('q')) = (key.modifiers, key.code) {
            if !self.analytics_view(source).modal.is_open() {
                self.quit();
                return;
            }
        }
        AnalyticsManager::new(self, source).handle_key(key);
    }

    fn on_team_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => self.quit(),
            (KeyModifiers::NONE, KeyCode::Char('m') | KeyCode::Esc) => self.return_to_submit(),
            _ => {}
        }
    }

    pub(crate) fn analytics_view(&self, source: Source) -> &AnalyticsView {
        match source {
            Source::Youtube => &self.youtube_view,
            Source::Reddit => &self.reddit_view,
        }
    }

    pub(crate) fn analytics_view_mut(&mut self, source: Source) -> &mut AnalyticsView {
        match source {
            Source::Youtube => &mut self.youtube_view,
            Source::Reddit => &mut self.reddit_view,
        }
    }

    /// Leave the current view for the product form, dropping any in-flight fetch.
    pub(crate) fn return_to_submit(&mut self) {
        self.deactivate_current_view();
        self.view = AppView::Submit;
        log_debug("App: returned to the product form");
    }

    pub(crate) fn show_team(&mut self) {
        if matches!(self.view, AppView::Team) {
            return;
        }
        self.deactivate_current_view();
        self.view = AppView::Team;
        log_debug("App: opened team view");
    }

    fn deactivate_current_view(&mut self) {
        match self.view {
            AppView::Youtube => self.youtube_view.deactivate(),
            AppView::Reddit => self.reddit_view.deactivate(),
            AppView::Submit | AppView::Team => {}
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    /// Append a message to an optional error slot.
    pub(crate) fn push_error(slot: &mut Option<String>, message: String) {
        if let Some(existing) = slot {
            existing.push_str(" | ");
            existing.push_str(&message);
        } else {
            *slot = Some(message);
        }
    }
}
