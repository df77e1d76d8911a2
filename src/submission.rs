use serde::Serialize;
use thiserror::Error;

pub(crate) const SUBMIT_PATH: &str = "/submitForm";
pub(crate) const SUBMIT_SUCCESS_MESSAGE: &str = "Data submitted successfully!";
pub(crate) const SUBMIT_FAILURE_MESSAGE: &str = "Error submitting data. Please try again.";

/// Request body for the analysis submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSubmission {
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Product name is required")]
    EmptyProductName,
}

/// Check a raw product name and shape it into a submission body. Whitespace
/// padding is stripped; names that are empty after stripping are rejected.
pub fn validate_product_name(name: &str) -> Result<ProductSubmission, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyProductName);
    }
    Ok(ProductSubmission {
        product_name: trimmed.to_string(),
    })
}

/// Outcome of the background submission request.
#[derive(Debug)]
pub(crate) enum SubmitMessage {
    Success(serde_json::Value),
    Error(String),
}

/// Lifecycle of the submission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Elements of the submission form, in focus order. The analytics shortcuts
/// only exist after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitField {
    ProductName,
    SubmitButton,
    YoutubeButton,
    RedditButton,
}

/// State behind the submission view: the name being typed, which element has
/// focus, and where the workflow currently stands.
#[derive(Debug)]
pub(crate) struct SubmitForm {
    pub(crate) product_name: String,
    pub(crate) field: SubmitField,
    pub(crate) state: SubmissionState,
    pub(crate) field_error: Option<String>,
    pub(crate) actions_revealed: bool,
    pub(crate) spinner_frame: usize,
}

impl SubmitForm {
    pub(crate) fn new() -> Self {
        Self {
            product_name: String::new(),
            field: SubmitField::ProductName,
            state: SubmissionState::Idle,
            field_error: None,
            actions_revealed: false,
            spinner_frame: 0,
        }
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    /// Focusable elements in display order for the current form state.
    pub(crate) fn visible_fields(&self) -> Vec<SubmitField> {
        let mut fields = vec![SubmitField::ProductName, SubmitField::SubmitButton];
        if self.actions_revealed {
            fields.push(SubmitField::YoutubeButton);
            fields.push(SubmitField::RedditButton);
        }
        fields
    }

    pub(crate) fn select_next(&mut self) {
        let fields = self.visible_fields();
        let position = fields
            .iter()
            .position(|field| *field == self.field)
            .unwrap_or(0);
        self.field = fields[(position + 1) % fields.len()];
    }

    pub(crate) fn select_previous(&mut self) {
        let fields = self.visible_fields();
        let position = fields
            .iter()
            .position(|field| *field == self.field)
            .unwrap_or(0);
        self.field = fields[(position + fields.len() - 1) % fields.len()];
    }

    /// Append a character to the name. Ignored while a submission is in
    /// flight or when focus is not on the input.
    pub(crate) fn push_char(&mut self, ch: char) {
        if self.is_submitting() || self.field != SubmitField::ProductName || ch.is_control() {
            return;
        }
        self.product_name.push(ch);
        self.field_error = None;
    }

    pub(crate) fn backspace(&mut self) {
        if self.is_submitting() || self.field != SubmitField::ProductName {
            return;
        }
        self.product_name.pop();
        self.field_error = None;
    }

    /// Enter the submitting state. Any previously revealed analytics shortcuts
    /// are hidden again until this submission succeeds.
    pub(crate) fn begin_submit(&mut self) {
        self.state = SubmissionState::Submitting;
        self.field_error = None;
        self.actions_revealed = false;
        self.spinner_frame = 0;
        if !matches!(
            self.field,
            SubmitField::ProductName | SubmitField::SubmitButton
        ) {
            self.field = SubmitField::ProductName;
        }
    }

    pub(crate) fn complete_success(&mut self) {
        self.state = SubmissionState::Succeeded;
        self.actions_revealed = true;
    }

    /// Record a failed submission. The typed name stays in place so the user
    /// can retry without retyping.
    pub(crate) fn complete_failure(&mut self) {
        self.state = SubmissionState::Failed;
        self.actions_revealed = false;
    }

    pub(crate) fn reject(&mut self, error: &ValidationError) {
        self.field_error = Some(error.to_string());
    }

    pub(crate) fn tick_spinner(&mut self) {
        if self.is_submitting() {
            self.spinner_frame = (self.spinner_frame + 1) % crate::LOADING_FRAMES.len();
        }
    }

    /// Label for the submit control, mirroring the in-flight state.
    pub(crate) fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            "Analyzing..."
        } else {
            "Submit"
        }
    }

    /// Outcome line under the form, once a submission has finished.
    pub(crate) fn status_message(&self) -> Option<&'static str> {
        match self.state {
            SubmissionState::Idle | SubmissionState::Submitting => None,
            SubmissionState::Succeeded => Some(SUBMIT_SUCCESS_MESSAGE),
            SubmissionState::Failed => Some(SUBMIT_FAILURE_MESSAGE),
        }
    }
}
