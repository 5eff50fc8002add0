//! Seams to whatever renders the site: notices, confirmations, login prompt.

pub mod notice;

use crate::{
    error::{AuthorizationError, SiteError},
    session::Session,
    ui::notice::Notice,
};

pub trait Frontend {
    fn notify(&mut self, notice: Notice);

    /// Asks the user a yes/no question before a destructive action.
    fn confirm(&mut self, question: &str) -> bool;

    /// Brings up the admin login flow.
    fn request_login(&mut self);
}

/// Checks the gate for a privileged action. On refusal the user is told and
/// sent to the login flow; nothing else happens.
pub fn authorize(
    session: &Session,
    ui: &mut dyn Frontend,
    action: &'static str,
) -> Result<(), AuthorizationError> {
    session.require(action).inspect_err(|err| {
        log::warn!("{err}");
        ui.notify(Notice::error(err.to_string()));
        ui.request_login();
    })
}

/// Logs a failed operation and shows it to the user.
pub fn report(ui: &mut dyn Frontend, err: &SiteError) {
    log::error!("{err}");
    ui.notify(Notice::from(err));
}


#[cfg(test)]
mod tests {
    use super::{testing::RecordingFrontend, *};
    use crate::session::testing::{admin, anonymous};

    #[test]
    fn authorize_refusal_notifies_and_prompts_login() {
        let mut ui = RecordingFrontend::default();
        let err = authorize(&anonymous(), &mut ui, "upload images").unwrap_err();

        assert_eq!(err.action, "upload images");
        assert_eq!(ui.login_requests, 1);
        assert_eq!(ui.last_message(), Some("You must be logged in to upload images."));
    }

    #[test]
    fn authorize_passes_admins_silently() {
        let mut ui = RecordingFrontend::default();
        assert!(authorize(&admin(), &mut ui, "upload images").is_ok());
        assert!(ui.notices.is_empty());
        assert_eq!(ui.login_requests, 0);
    }
}
