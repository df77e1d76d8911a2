use crate::{
    App,
    analytics::Source,
    log_util::log_debug,
    submission::{self, SubmitField, SubmitMessage, validate_product_name},
    view_managers::AnalyticsManager,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::{sync::mpsc, thread};
use tokio::runtime::Runtime;

pub(crate) struct SubmitManager<'a> {
    app: &'a mut App,
}

impl<'a> SubmitManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if self.app.submit_form.is_submitting() {
            return;
        }
        match (key.modifiers, key.code) {
            (_, KeyCode::Tab) => self.app.submit_form.select_next(),
            (_, KeyCode::BackTab) => self.app.submit_form.select_previous(),
            (KeyModifiers::NONE, KeyCode::Down) => self.app.submit_form.select_next(),
            (KeyModifiers::NONE, KeyCode::Up) => self.app.submit_form.select_previous(),
            (KeyModifiers::NONE, KeyCode::Enter) => self.activate_focused(),
            (KeyModifiers::NONE, KeyCode::Backspace) => self.app.submit_form.backspace(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(ch)) => {
                self.app.submit_form.push_char(ch);
            }
            _ => {}
        }
    }

    fn activate_focused(&mut self) {
        match self.app.submit_form.field {
            SubmitField::ProductName | SubmitField::SubmitButton => self.submit(),
            SubmitField::YoutubeButton => AnalyticsManager::show(self.app, Source::Youtube),
            SubmitField::RedditButton => AnalyticsManager::show(self.app, Source::Reddit),
        }
    }

    /// Validate the entered name and, if it passes, hand the POST to a
    /// background worker. A rejected name never reaches the network.
    fn submit(&mut self) {
        let submission = match validate_product_name(&self.app.submit_form.product_name) {
            Ok(submission) => submission,
            Err(err) => {
                self.app.submit_form.reject(&err);
                log_debug(&format!("App: submission rejected: {}", err));
                return;
            }
        };

        let client = self.app.api_client.clone();
        let (sender, receiver) = mpsc::channel();
        self.app.submit_receiver = Some(receiver);
        self.app.submit_form.begin_submit();
        log_debug(&format!(
            "App: submitting '{}' for analysis",
            submission.product_name
        ));

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = sender.send(SubmitMessage::Error(format!(
                        "Failed to build Tokio runtime: {}",
                        err
                    )));
                    return;
                }
            };

            let result = runtime.block_on(client.post_json(submission::SUBMIT_PATH, &submission));
            drop(runtime);

            match result {
                Ok(payload) => {
                    let _ = sender.send(SubmitMessage::Success(payload));
                }
                Err(err) => {
                    let _ = sender.send(SubmitMessage::Error(err.to_string()));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AppView,
        analytics::{AnalyticsView, ViewState},
        api_client::ApiClient,
        config::AppConfig,
        submission::{SubmissionState, SubmitForm},
    };

    fn test_app() -> App {
        let config = AppConfig::default();
        let api_client = ApiClient::new(&config).expect("client should build");
        App {
            running: false,
            view: AppView::Submit,
            config,
            api_client,
            submit_form: SubmitForm::new(),
            submit_receiver: None,
            youtube_view: AnalyticsView::new(Source::Youtube),
            reddit_view: AnalyticsView::new(Source::Reddit),
            last_product: None,
            error: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn empty_submission_shows_field_error_without_a_request() {
        let mut app = test_app();
        {
            let mut manager = SubmitManager::new(&mut app);
            manager.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(
            app.submit_form.field_error.as_deref(),
            Some("Product name is required")
        );
        assert_eq!(app.submit_form.state, SubmissionState::Idle);
        assert!(
            app.submit_receiver.is_none(),
            "no background request should start for a rejected name"
        );
    }

    #[test]
    fn typed_name_submits_in_the_background() {
        let mut app = test_app();
        {
            let mut manager = SubmitManager::new(&mut app);
            for ch in "AcmeWidget".chars() {
                manager.handle_key(key(KeyCode::Char(ch)));
            }
            manager.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(app.submit_form.product_name, "AcmeWidget");
        assert_eq!(app.submit_form.state, SubmissionState::Submitting);
        assert!(app.submit_receiver.is_some());
    }

    #[test]
    fn shifted_characters_reach_the_input() {
        let mut app = test_app();
        {
            let mut manager = SubmitManager::new(&mut app);
            manager.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
            manager.handle_key(key(KeyCode::Char('c')));
        }
        assert_eq!(app.submit_form.product_name, "Ac");
    }

    #[test]
    fn keys_are_ignored_while_submitting() {
        let mut app = test_app();
        app.submit_form.product_name = "AcmeWidget".to_string();
        app.submit_form.begin_submit();
        {
            let mut manager = SubmitManager::new(&mut app);
            manager.handle_key(key(KeyCode::Tab));
            manager.handle_key(key(KeyCode::Char('x')));
            manager.handle_key(key(KeyCode::Backspace));
        }
        assert_eq!(app.submit_form.field, SubmitField::ProductName);
        assert_eq!(app.submit_form.product_name, "AcmeWidget");
    }

    #[test]
    fn revealed_shortcut_opens_the_analytics_view() {
        let mut app = test_app();
        app.submit_form.product_name = "AcmeWidget".to_string();
        app.submit_form.begin_submit();
        app.submit_form.complete_success();
        app.submit_form.field = SubmitField::YoutubeButton;
        {
            let mut manager = SubmitManager::new(&mut app);
            manager.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(app.view, AppView::Youtube);
        assert_eq!(app.youtube_view.state, ViewState::Loading);
        assert!(app.youtube_view.receiver.is_some());
    }
}
