//! Tour dates: the admin creates and deletes events, everyone browses them
//! filtered by upcoming or past.

use chrono::NaiveDate;

use crate::{
    clock::Clock,
    domain::event::{EventFilter, EventRecord, NewEvent, format_event_date},
    error::{SiteError, ValidationError},
    session::Session,
    storage::{error::StorageError, operations::Storage},
    ui::{self, Frontend, notice::Notice},
};

/// One event as the list renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub event: EventRecord,
    pub date_label: String,
    pub past: bool,
    pub can_delete: bool,
}

#[derive(Debug, Default)]
pub struct EventBoard {
    events: Vec<EventRecord>,
    filter: EventFilter,
}

impl EventBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, storage: &Storage) -> Result<(), StorageError> {
        self.events = storage.events()?;
        Ok(())
    }

    pub fn filter(&self) -> EventFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    pub fn create(
        &mut self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        clock: &dyn Clock,
        new: NewEvent,
    ) -> Result<EventRecord, SiteError> {
        ui::authorize(session, ui, "add events")?;

        let venue = new.venue.trim();
        let location = new.location.trim();
        if venue.is_empty() {
            return Err(ValidationError::MissingField("a venue").into());
        }
        if location.is_empty() {
            return Err(ValidationError::MissingField("a location").into());
        }

        let event = EventRecord {
            id: self.next_id(clock.now().timestamp_millis()),
            date: new.date,
            venue: venue.to_string(),
            location: location.to_string(),
            ticket_url: new
                .ticket_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        };

        let mut events = self.events.clone();
        events.push(event.clone());
        storage.save_events(&events)?;
        self.events = events;

        log::info!("added event {} at {}", event.id, event.venue);
        ui.notify(Notice::success("Event added successfully!"));
        Ok(event)
    }

    /// Returns `Ok(false)` when the user cancels or the id is unknown.
    pub fn delete(
        &mut self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        id: i64,
    ) -> Result<bool, SiteError> {
        ui::authorize(session, ui, "delete events")?;
        if !ui.confirm("Are you sure you want to delete this event?") {
            return Ok(false);
        }

        let events: Vec<EventRecord> = self.events.iter().filter(|e| e.id != id).cloned().collect();
        if events.len() == self.events.len() {
            log::warn!("no event with id {id}");
            return Ok(false);
        }

        storage.save_events(&events)?;
        self.events = events;
        ui.notify(Notice::success("Event deleted"));
        Ok(true)
    }

    /// Events passing `filter`, soonest first.
    pub fn list(&self, filter: EventFilter, today: NaiveDate) -> Vec<&EventRecord> {
        let mut shown: Vec<&EventRecord> = self
            .events
            .iter()
            .filter(|e| filter.accepts(e, today))
            .collect();
        shown.sort_by_key(|e| (e.date, e.id));
        shown
    }

    /// Cards for the current filter. Delete controls only show for the admin.
    pub fn cards(&self, session: &Session, today: NaiveDate) -> Vec<EventCard> {
        let can_delete = session.is_privileged();
        self.list(self.filter, today)
            .into_iter()
            .map(|event| EventCard {
                date_label: format_event_date(event.date),
                past: event.is_past(today),
                can_delete,
                event: event.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn next_id(&self, candidate: i64) -> i64 {
        match self.events.iter().map(|e| e.id).max() {
            Some(max) if max >= candidate => max + 1,
            _ => candidate,
        }
    }
}
