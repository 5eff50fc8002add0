//! Bio, newsletter signups and the contact form.

use crate::{
    clock::Clock,
    domain::contact::{ContactMessage, Subscription},
    error::{SiteError, ValidationError},
    session::Session,
    storage::operations::Storage,
    ui::{self, Frontend, notice::Notice},
};

pub const MIN_MESSAGE_LEN: usize = 10;

/// `local@domain.tld`: no whitespace, a single `@`, and a dot inside the
/// domain with something on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn save_bio(storage: &mut Storage, ui: &mut dyn Frontend, content: &str) -> Result<(), SiteError> {
    storage.save_bio(content)?;
    ui.notify(Notice::success("Bio saved successfully!"));
    Ok(())
}

pub fn bio(storage: &Storage) -> Result<Option<String>, SiteError> {
    Ok(storage.bio()?)
}

pub fn subscribe(
    storage: &mut Storage,
    ui: &mut dyn Frontend,
    clock: &dyn Clock,
    email: &str,
) -> Result<Subscription, SiteError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail.into());
    }

    let subscription = Subscription {
        email: email.to_string(),
        date: clock.now(),
    };
    storage.add_newsletter_subscription(subscription.clone())?;
    log::info!("newsletter signup: {email}");
    ui.notify(Notice::success("Thank you for subscribing!"));
    Ok(subscription)
}

/// Contact form as typed in.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("your name"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_LEN {
            return Err(ValidationError::MessageTooShort { min: MIN_MESSAGE_LEN });
        }
        Ok(())
    }
}

/// Messages are only kept locally; nothing is sent anywhere.
pub fn send_contact(
    storage: &mut Storage,
    ui: &mut dyn Frontend,
    clock: &dyn Clock,
    form: ContactForm,
) -> Result<ContactMessage, SiteError> {
    form.validate()?;

    let message = ContactMessage {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        message: form.message.trim().to_string(),
        date: clock.now(),
    };
    storage.add_contact_message(message.clone())?;
    ui.notify(Notice::warning(
        "Email service not configured. Message saved locally.",
    ));
    Ok(message)
}

/// Saved contact messages and newsletter signups. Admin only.
pub fn inbox(
    storage: &Storage,
    session: &Session,
    ui: &mut dyn Frontend,
) -> Result<(Vec<ContactMessage>, Vec<Subscription>), SiteError> {
    ui::authorize(session, ui, "read messages")?;
    Ok((storage.contact_messages()?, storage.newsletter_subscriptions()?))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        clock::testing::FixedClock,
        session::testing::{admin, anonymous},
        ui::{notice::Level, testing::RecordingFrontend},
    };

    fn clock() -> FixedClock {
        FixedClock::at(Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap())
    }

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.co", "first.last@mail.example.org", "x+y@d.io"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in ["", "plain", "@b.co", "a@b", "a@.co", "a@b.", "a b@c.io", "a@b@c.io"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn bio_save_and_show() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let mut ui = RecordingFrontend::default();

        assert_eq!(bio(&storage)?, None);
        save_bio(&mut storage, &mut ui, "<p>We play loud.</p>")?;

        assert_eq!(bio(&storage)?.as_deref(), Some("<p>We play loud.</p>"));
        assert_eq!(ui.last_message(), Some("Bio saved successfully!"));
        Ok(())
    }

    #[test]
    fn subscribe_stores_trimmed_email() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let mut ui = RecordingFrontend::default();

        subscribe(&mut storage, &mut ui, &clock(), "  fan@band.io ")?;

        let subs = storage.newsletter_subscriptions()?;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].email, "fan@band.io");
        assert_eq!(subs[0].date, clock().now());
        assert_eq!(ui.last_message(), Some("Thank you for subscribing!"));
        Ok(())
    }

    #[test]
    fn bad_email_is_not_stored() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let mut ui = RecordingFrontend::default();

        let err = subscribe(&mut storage, &mut ui, &clock(), "nope").unwrap_err();

        assert!(matches!(err, SiteError::Validation(ValidationError::InvalidEmail)));
        assert!(storage.newsletter_subscriptions()?.is_empty());
        assert!(ui.notices.is_empty());
        Ok(())
    }

    #[test]
    fn contact_form_rules() {
        assert_eq!(
            form(" ", "a@b.co", "long enough text").validate(),
            Err(ValidationError::MissingField("your name"))
        );
        assert_eq!(
            form("Ann", "a@b", "long enough text").validate(),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            form("Ann", "a@b.co", "   short    ").validate(),
            Err(ValidationError::MessageTooShort { min: 10 })
        );
        assert!(form("Ann", "a@b.co", "0123456789").validate().is_ok());
    }

    #[test]
    fn contact_message_is_kept_locally() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let mut ui = RecordingFrontend::default();

        send_contact(
            &mut storage,
            &mut ui,
            &clock(),
            form("Ann", "ann@x.io", "Please come to Oslo!"),
        )?;

        let saved = storage.contact_messages()?;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Ann");
        assert_eq!(ui.notices[0].level, Level::Warning);
        Ok(())
    }

    #[test]
    fn inbox_is_admin_only() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let mut ui = RecordingFrontend::default();
        subscribe(&mut storage, &mut ui, &clock(), "a@b.co")?;

        assert!(matches!(
            inbox(&storage, &anonymous(), &mut ui),
            Err(SiteError::Authorization(_))
        ));
        let (messages, subs) = inbox(&storage, &admin(), &mut ui)?;
        assert!(messages.is_empty());
        assert_eq!(subs.len(), 1);
        Ok(())
    }
}
