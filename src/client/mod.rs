//! Terminal client for the profile service: transport, the profile form,
//! and the shell that ties list and form together.

pub mod api;
pub mod detail;
pub mod form;
pub mod shell;

pub use api::{ApiFailure, HttpProfileApi, ProfileApi};
pub use form::{ProfileForm, SubmitOutcome};
pub use shell::ProfileShell;

/// Blocking user interaction: the caller waits until the user has seen the
/// alert or answered the prompt.
pub trait Notifier {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, question: &str) -> bool;
}
