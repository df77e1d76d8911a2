use crate::{
    App, AppView,
    analytics::{FetchMessage, Source, ViewState, fetch_bundle},
    log_util::log_debug,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::{sync::mpsc, thread};
use tokio::runtime::Runtime;

pub(crate) struct AnalyticsManager<'a> {
    app: &'a mut App,
    source: Source,
}

impl<'a> AnalyticsManager<'a> {
    pub(crate) fn new(app: &'a mut App, source: Source) -> Self {
        Self { app, source }
    }

    /// Switch to this source's analytics view and start a fetch round.
    pub(crate) fn show(app: &'a mut App, source: Source) {
        app.view = match source {
            Source::Youtube => AppView::Youtube,
            Source::Reddit => AppView::Reddit,
        };
        log_debug(&format!("App: opened {} analytics view", source.label()));
        Self::new(app, source).start_fetch();
    }

    /// Begin a fresh fetch round. The table and both chart images are
    /// requested concurrently by a background worker; any earlier round still
    /// in flight is superseded.
    pub(crate) fn start_fetch(&mut self) {
        let source = self.source;
        let round = self.app.analytics_view_mut(source).begin_round();
        let (sender, receiver) = mpsc::channel();
        self.app.analytics_view_mut(source).receiver = Some(receiver);
        let client = self.app.api_client.clone();
        log_debug(&format!(
            "App: fetching {} analytics (round {})",
            source.label(),
            round
        ));

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    // Dropping the sender surfaces as a disconnect in poll().
                    log_debug(&format!(
                        "App: failed to build Tokio runtime for {} fetch: {}",
                        source.label(),
                        err
                    ));
                    return;
                }
            };

            let outcome = runtime.block_on(fetch_bundle(&client, source));
            drop(runtime);
            let _ = sender.send(FetchMessage { round, outcome });
        });
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if self.app.analytics_view(self.source).modal.is_open() {
            if let (KeyModifiers::NONE, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('x')) =
                (key.modifiers, key.code)
            {
                self.app.analytics_view_mut(self.source).modal.close();
            }
            return;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                self.app.analytics_view_mut(self.source).select_next();
            }
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
                self.app.analytics_view_mut(self.source).select_previous();
            }
            (KeyModifiers::NONE, KeyCode::Char('r') | KeyCode::Char('R')) => self.start_fetch(),
            (KeyModifiers::NONE, KeyCode::Char('o') | KeyCode::Enter) => self.open_selected_link(),
            (KeyModifiers::NONE, KeyCode::Char('w')) => self.open_word_cloud(),
            (KeyModifiers::NONE, KeyCode::Char('b')) => self.open_bar_chart(),
            (KeyModifiers::NONE, KeyCode::Char('m') | KeyCode::Esc) => self.app.return_to_submit(),
            (KeyModifiers::NONE, KeyCode::Char('t')) => self.app.show_team(),
            _ => {}
        }
    }

    /// Open the selected record's URL in the system browser.
    fn open_selected_link(&mut self) {
        let Some(record) = self.app.analytics_view(self.source).selected_record() else {
            return;
        };
        let url = record.url.clone();
        let title = record.title.clone();
        match open::that(&url) {
            Ok(()) => log_debug(&format!("App: opened '{}' in browser: {}", title, url)),
            Err(err) => {
                App::push_error(
                    &mut self.app.error,
                    format!("Failed to open {}: {}", url, err),
                );
                log_debug(&format!("App: failed to open {}: {}", url, err));
            }
        }
    }

    fn open_word_cloud(&mut self) {
        let view = self.app.analytics_view_mut(self.source);
        if let ViewState::Loaded { images, .. } = &view.state {
            let image = images.word_cloud.clone();
            view.modal.open(image);
        }
    }

    fn open_bar_chart(&mut self) {
        let view = self.app.analytics_view_mut(self.source);
        if let ViewState::Loaded { images, .. } = &view.state {
            let image = images.bar_chart.clone();
            view.modal.open(image);
        }
    }
}
