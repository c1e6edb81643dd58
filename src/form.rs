use std::time::Duration;
use tracing::{error, warn};

/// Delay between a successful upload and the page refresh that makes
/// the new object visible in the gallery
pub const RELOAD_DELAY: Duration = Duration::from_millis(1500);

/// Upload form states. A failed transfer is not a distinct visible
/// state: the form returns to `Idle` with the error logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Uploading,
    Complete,
}

/// Result of a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Begin exactly one PUT transfer against the signed URL
    Begin,
    /// Guard tripped; no transfer is attempted
    Rejected(Reject),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// No file selected
    NoFile,
    /// No pre-signed URL available
    NoUrl,
    /// A transfer is already in flight (or the form already completed)
    Busy,
}

/// What the host should do once a transfer finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Success: schedule exactly one full refresh after the given delay
    Reload { after: Duration },
    /// Failure: form is editable again, retry is manual
    None,
}

/// Explicit model of the client-side upload control, independent of any
/// rendering layer. Hosts (the browser script mirrors this, the TUI
/// drives it directly) perform the actual transfer between `submit`
/// returning `Begin` and the call to `transfer_finished`.
#[derive(Debug)]
pub struct UploadForm {
    state: FormState,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// At most one transfer is in flight per form instance
    pub fn is_busy(&self) -> bool {
        self.state != FormState::Idle
    }

    /// Submit attempt. Only a present file and a present URL on an idle
    /// form begin a transfer; every other combination leaves the state
    /// untouched.
    pub fn submit(&mut self, has_file: bool, has_url: bool) -> Submit {
        if self.state != FormState::Idle {
            return Submit::Rejected(Reject::Busy);
        }
        if !has_file {
            return Submit::Rejected(Reject::NoFile);
        }
        if !has_url {
            warn!("No pre-signed URL provided");
            return Submit::Rejected(Reject::NoUrl);
        }

        self.state = FormState::Uploading;
        Submit::Begin
    }

    /// Record the transfer outcome. `status` is the HTTP status code,
    /// or `None` for a network error before any response arrived.
    pub fn transfer_finished(&mut self, status: Option<u16>) -> Followup {
        if self.state != FormState::Uploading {
            return Followup::None;
        }

        match status {
            Some(code) if (200..300).contains(&code) => {
                self.state = FormState::Complete;
                Followup::Reload {
                    after: RELOAD_DELAY,
                }
            }
            Some(code) => {
                error!("Upload failed with status: {}", code);
                self.state = FormState::Idle;
                Followup::None
            }
            None => {
                error!("Upload failed: network error");
                self.state = FormState::Idle;
                Followup::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_without_file_stays_idle() {
        let mut form = UploadForm::new();

        let outcome = form.submit(false, true);

        assert_eq!(outcome, Submit::Rejected(Reject::NoFile));
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_submit_without_url_stays_idle() {
        let mut form = UploadForm::new();

        let outcome = form.submit(true, false);

        assert_eq!(outcome, Submit::Rejected(Reject::NoUrl));
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_submit_begins_single_transfer() {
        let mut form = UploadForm::new();

        assert_eq!(form.submit(true, true), Submit::Begin);
        assert_eq!(form.state(), FormState::Uploading);

        // Second submit while in flight is rejected
        assert_eq!(form.submit(true, true), Submit::Rejected(Reject::Busy));
        assert_eq!(form.state(), FormState::Uploading);
    }

    #[test]
    fn test_success_schedules_one_reload() {
        let mut form = UploadForm::new();
        form.submit(true, true);

        let followup = form.transfer_finished(Some(200));

        assert_eq!(
            followup,
            Followup::Reload {
                after: Duration::from_millis(1500)
            }
        );
        assert_eq!(form.state(), FormState::Complete);

        // The completed form never schedules a second reload
        assert_eq!(form.transfer_finished(Some(200)), Followup::None);
        assert_eq!(form.submit(true, true), Submit::Rejected(Reject::Busy));
    }

    #[test]
    fn test_server_error_returns_to_idle() {
        let mut form = UploadForm::new();
        form.submit(true, true);

        let followup = form.transfer_finished(Some(500));

        assert_eq!(followup, Followup::None);
        assert_eq!(form.state(), FormState::Idle);

        // Manual retry is possible
        assert_eq!(form.submit(true, true), Submit::Begin);
    }

    #[test]
    fn test_network_error_returns_to_idle() {
        let mut form = UploadForm::new();
        form.submit(true, true);

        assert_eq!(form.transfer_finished(None), Followup::None);
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_finish_without_transfer_is_ignored() {
        let mut form = UploadForm::new();

        assert_eq!(form.transfer_finished(Some(200)), Followup::None);
        assert_eq!(form.state(), FormState::Idle);
    }
}
