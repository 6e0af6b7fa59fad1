use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{CalendarEvent, Id, NewCalendarEvent};
use crate::domain::ports::{CalendarStore, SchoolStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::validated::{run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCalendarEventInput {
    pub school_id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_on: NaiveDate,
    // Single-day events may omit the end date.
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
}

impl CreateCalendarEventInput {
    fn ends_on(&self) -> NaiveDate {
        self.ends_on.unwrap_or(self.starts_on)
    }
}

impl Validate for CreateCalendarEventInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("school_id", self.school_id)
            .text("title", &self.title, 4, 200)
            .optional_text("description", self.description.as_deref(), 1, 2_000)
            .check(
                self.ends_on() >= self.starts_on,
                "ends_on",
                "end date must not be before the start date",
            )
            .finish()
    }
}

pub struct CreateCalendarEventUseCase<S> {
    pub store: S,
}

impl<S> CreateCalendarEventUseCase<S>
where
    S: SchoolStore + CalendarStore,
{
    pub async fn execute(&self, input: CreateCalendarEventInput) -> ResultCommand<CalendarEvent> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateCalendarEventInput) -> Result<CalendarEvent, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;
        let ends_on = input.ends_on();

        let event = self
            .store
            .insert_event(NewCalendarEvent {
                school_id: school.id,
                title: input.title,
                description: input.description,
                starts_on: input.starts_on,
                ends_on,
            })
            .await
            .map_err(|err| storage_rejection("insert_event", "title", "calendar event", err))?;

        info!(event_id = event.id, school_id = school.id, "calendar event created");
        Ok(event)
    }
}
