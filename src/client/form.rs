use tracing::{error, warn};

use crate::client::api::{ApiFailure, ProfileApi};
use crate::client::detail::ErrorDetail;
use crate::client::Notifier;
use crate::profiles::dto::Profile;
use crate::validation::{validate, Draft, Field, FieldErrors, BIO_MAX};

pub const SUBMIT_FAILED: &str = "Error submitting form. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Editing,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Backend accepted the draft; the form is closed.
    Saved(Profile),
    /// Local validation failed; nothing was sent.
    Invalid,
    /// Backend refused the draft; its errors are shown.
    Rejected,
    /// The request did not complete.
    Failed,
    /// The form was not accepting a submit.
    Ignored,
}

/// Create/edit form for one profile.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    mode: FormMode,
    state: FormState,
    draft: Draft,
    errors: FieldErrors,
}

impl ProfileForm {
    pub fn open(profile: Option<&Profile>) -> Self {
        let (mode, draft) = match profile {
            Some(p) => (FormMode::Edit { id: p.id }, Draft::from_profile(p)),
            None => (FormMode::Create, Draft::default()),
        };
        Self {
            mode,
            state: FormState::Editing,
            draft,
            errors: FieldErrors::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field.as_str())
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Profile",
            FormMode::Edit { .. } => "Edit Profile",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.state, self.mode) {
            (FormState::Submitting, _) => "Saving...",
            (_, FormMode::Edit { .. }) => "Update",
            (_, FormMode::Create) => "Create",
        }
    }

    pub fn bio_counter(&self) -> String {
        format!("{}/{}", self.draft.bio.chars().count(), BIO_MAX)
    }

    /// Updates one field and drops its pending error without re-validating.
    pub fn change(&mut self, field: Field, value: impl Into<String>) {
        if self.state == FormState::Closed {
            return;
        }
        self.draft.set(field, value);
        self.errors.clear(field.as_str());
    }

    pub fn submit(&mut self, api: &dyn ProfileApi, ui: &mut dyn Notifier) -> SubmitOutcome {
        if self.state != FormState::Editing {
            return SubmitOutcome::Ignored;
        }

        self.errors = validate(&self.draft);
        if !self.errors.is_empty() {
            return SubmitOutcome::Invalid;
        }

        self.state = FormState::Submitting;
        let result = match self.mode {
            FormMode::Create => api.create(&self.draft),
            FormMode::Edit { id } => api.update(id, &self.draft),
        };
        self.state = FormState::Editing;

        match result {
            Ok(profile) => {
                self.cancel();
                SubmitOutcome::Saved(profile)
            }
            Err(ApiFailure::Rejected { status, detail }) => {
                match detail {
                    Some(ErrorDetail::Fields(fields)) => self.errors.merge(fields),
                    Some(detail) => {
                        if let Some(text) = detail.alert_text() {
                            ui.alert(&text);
                        }
                    }
                    None => {
                        warn!(status, "rejected without a readable detail");
                        ui.alert(&format!("Request failed with status {status}"));
                    }
                }
                SubmitOutcome::Rejected
            }
            Err(e) => {
                error!(error = %e, "error submitting form");
                ui.alert(SUBMIT_FAILED);
                SubmitOutcome::Failed
            }
        }
    }

    /// Discards the draft and errors.
    pub fn cancel(&mut self) {
        self.state = FormState::Closed;
        self.draft = Draft::default();
        self.errors = FieldErrors::new();
    }
}
