use std::fmt::Write as _;

use time::macros::format_description;
use tracing::{error, info};

use crate::client::api::{ApiFailure, ProfileApi};
use crate::client::form::{ProfileForm, SubmitOutcome};
use crate::client::Notifier;
use crate::profiles::dto::Profile;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this profile?";
pub const DELETE_FAILED: &str = "Error deleting profile";
pub const EMPTY_LIST: &str = "No profiles found. Create your first profile!";

/// Holds the fetched profile list and at most one open form. The list is
/// only ever replaced by a fresh fetch after a mutation.
pub struct ProfileShell<A: ProfileApi> {
    api: A,
    profiles: Vec<Profile>,
    form: Option<ProfileForm>,
}

impl<A: ProfileApi> ProfileShell<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            profiles: Vec::new(),
            form: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Re-fetches the list. On failure the previous list stays.
    pub fn refresh(&mut self) -> bool {
        match self.api.list() {
            Ok(profiles) => {
                self.profiles = profiles;
                true
            }
            Err(e) => {
                error!(error = %e, "error fetching profiles");
                false
            }
        }
    }

    pub fn open_create(&mut self) {
        self.form = Some(ProfileForm::open(None));
    }

    /// Returns false when `id` is not in the current list.
    pub fn open_edit(&mut self, id: i64) -> bool {
        match self.profiles.iter().find(|p| p.id == id) {
            Some(profile) => {
                self.form = Some(ProfileForm::open(Some(profile)));
                true
            }
            None => false,
        }
    }

    /// Fetches the profile from the backend rather than the cached list,
    /// then opens the form on it.
    pub fn open_edit_fetched(&mut self, id: i64) -> Result<(), ApiFailure> {
        let profile = self.api.get(id)?;
        self.form = Some(ProfileForm::open(Some(&profile)));
        Ok(())
    }

    pub fn form(&self) -> Option<&ProfileForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProfileForm> {
        self.form.as_mut()
    }

    pub fn submit_form(&mut self, ui: &mut dyn Notifier) -> SubmitOutcome {
        let Some(form) = self.form.as_mut() else {
            return SubmitOutcome::Ignored;
        };
        let outcome = form.submit(&self.api, ui);
        if let SubmitOutcome::Saved(profile) = &outcome {
            info!(profile_id = profile.id, "profile saved");
            self.refresh();
            self.form = None;
        }
        outcome
    }

    pub fn cancel_form(&mut self) {
        if let Some(mut form) = self.form.take() {
            form.cancel();
        }
    }

    /// Asks for confirmation, deletes, and re-fetches. Returns true only when
    /// the backend confirmed the delete.
    pub fn delete(&mut self, id: i64, ui: &mut dyn Notifier) -> bool {
        if !ui.confirm(DELETE_PROMPT) {
            return false;
        }
        match self.api.delete(id) {
            Ok(()) => {
                info!(profile_id = id, "profile deleted");
                self.refresh();
                true
            }
            Err(e) => {
                error!(error = %e, profile_id = id, "error deleting profile");
                ui.alert(DELETE_FAILED);
                false
            }
        }
    }

    pub fn render_list(&self) -> String {
        if self.profiles.is_empty() {
            return EMPTY_LIST.to_string();
        }
        let mut out = String::new();
        for p in &self.profiles {
            render_card(&mut out, p);
        }
        out
    }
}

fn render_card(out: &mut String, p: &Profile) {
    let created = p
        .created_at
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default();

    let _ = writeln!(out, "[{}] {} <{}>", p.id, p.name, p.email);
    if let Some(location) = &p.location {
        let _ = writeln!(out, "    Location: {location}");
    }
    if let Some(bio) = &p.bio {
        let _ = writeln!(out, "    {bio}");
    }
    if let Some(phone) = &p.phone {
        let _ = writeln!(out, "    Phone: {phone}");
    }
    if let Some(website) = &p.website {
        let _ = writeln!(out, "    Website: {website}");
    }
    if let Some(avatar) = &p.avatar_url {
        let _ = writeln!(out, "    Avatar: {avatar}");
    }
    let _ = writeln!(out, "    Created: {created}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::form::tests::{stored, Call, FakeApi, RecordingUi};
    use crate::validation::Field;

    fn shell_with(profiles: Vec<Profile>) -> ProfileShell<FakeApi> {
        let api = FakeApi::default();
        *api.profiles.borrow_mut() = profiles;
        let mut shell = ProfileShell::new(api);
        assert!(shell.refresh());
        shell
    }

    #[test]
    fn empty_list_message() {
        let shell = shell_with(vec![]);
        assert_eq!(shell.render_list(), EMPTY_LIST);
    }

    #[test]
    fn cards_show_optional_lines_only_when_present() {
        let mut p = stored(1, "Jane Doe", "jane@example.com");
        p.location = Some("Oslo".into());
        let shell = shell_with(vec![p]);
        let text = shell.render_list();
        assert!(text.starts_with("[1] Jane Doe <jane@example.com>"));
        assert!(text.contains("Location: Oslo"));
        assert!(!text.contains("Phone:"));
        assert!(text.contains("Created: 1970-01-01"));
    }

    #[test]
    fn successful_submit_refreshes_and_closes() {
        let mut shell = shell_with(vec![]);
        let mut ui = RecordingUi::default();
        shell.open_create();
        let form = shell.form_mut().unwrap();
        form.change(Field::Name, "Jane Doe");
        form.change(Field::Email, "jane@example.com");

        assert!(matches!(shell.submit_form(&mut ui), SubmitOutcome::Saved(_)));
        assert!(shell.form().is_none());
        assert_eq!(shell.profiles().len(), 1);
        assert_eq!(shell.api().calls.borrow().last(), Some(&Call::List));
    }

    #[test]
    fn failed_submit_keeps_form_open() {
        let mut shell = shell_with(vec![]);
        let mut ui = RecordingUi::default();
        shell.open_create();
        assert_eq!(shell.submit_form(&mut ui), SubmitOutcome::Invalid);
        assert!(shell.form().is_some());
    }

    #[test]
    fn edit_requires_known_id() {
        let mut shell = shell_with(vec![stored(4, "Jane Doe", "jane@example.com")]);
        assert!(!shell.open_edit(5));
        assert!(shell.open_edit(4));
        assert_eq!(shell.form().unwrap().draft().email, "jane@example.com");
        shell.cancel_form();
        assert!(shell.form().is_none());
    }

    #[test]
    fn fetched_edit_ignores_cached_list() {
        let api = FakeApi::default();
        *api.profiles.borrow_mut() = vec![stored(250, "Jane Doe", "jane@example.com")];
        let mut shell = ProfileShell::new(api);
        assert!(shell.profiles().is_empty());

        shell.open_edit_fetched(250).unwrap();
        assert_eq!(shell.form().unwrap().draft().email, "jane@example.com");
        assert_eq!(shell.api().calls.borrow().as_slice(), &[Call::Get(250)]);

        shell.cancel_form();
        let err = shell.open_edit_fetched(251).unwrap_err();
        assert!(matches!(err, ApiFailure::Rejected { status: 404, .. }));
        assert!(shell.form().is_none());
    }

    #[test]
    fn fetched_edit_reports_transport_failure() {
        let mut shell =
            ProfileShell::new(FakeApi::failing(|| ApiFailure::Transport("refused".into())));
        let err = shell.open_edit_fetched(1).unwrap_err();
        assert!(matches!(err, ApiFailure::Transport(_)));
        assert!(shell.form().is_none());
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut shell = shell_with(vec![stored(4, "Jane Doe", "jane@example.com")]);
        let mut ui = RecordingUi { confirm_reply: false, ..Default::default() };
        assert!(!shell.delete(4, &mut ui));
        assert_eq!(ui.prompts, vec![DELETE_PROMPT]);
        assert!(!shell.api().calls.borrow().contains(&Call::Delete(4)));
    }

    #[test]
    fn confirmed_delete_refreshes_list() {
        let mut shell = shell_with(vec![stored(4, "Jane Doe", "jane@example.com")]);
        let mut ui = RecordingUi { confirm_reply: true, ..Default::default() };
        assert!(shell.delete(4, &mut ui));
        assert!(shell.profiles().is_empty());
        let calls = shell.api().calls.borrow();
        assert_eq!(&calls[calls.len() - 2..], &[Call::Delete(4), Call::List]);
    }

    #[test]
    fn failed_delete_alerts_and_keeps_list() {
        let mut shell = shell_with(vec![stored(4, "Jane Doe", "jane@example.com")]);
        *shell.api().fail_with.borrow_mut() = Some(|| ApiFailure::Transport("down".into()));
        let mut ui = RecordingUi { confirm_reply: true, ..Default::default() };
        assert!(!shell.delete(4, &mut ui));
        assert_eq!(ui.alerts, vec![DELETE_FAILED]);
        assert_eq!(shell.profiles().len(), 1);
        assert!(!shell.refresh());
        assert_eq!(shell.profiles().len(), 1);
    }
}
