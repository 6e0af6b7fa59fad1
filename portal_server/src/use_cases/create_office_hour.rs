use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, NewOfficeHour, OfficeHour, TimeGroup};
use crate::domain::ports::{OfficeHourStore, SchoolStore};
use crate::domain::result::{MessageError, Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::validated::{run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOfficeHourInput {
    pub school_id: Id,
    pub title: String,
    pub time_groups: Vec<TimeGroup>,
}

impl Validate for CreateOfficeHourInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        checks
            .id("school_id", self.school_id)
            .text("title", &self.title, 4, 100)
            .check(
                !self.time_groups.is_empty(),
                "time_groups",
                "at least one time group is required",
            );

        let mut seen = BTreeSet::new();
        for (index, group) in self.time_groups.iter().enumerate() {
            if group.closes_at <= group.opens_at {
                checks.push(
                    MessageError::new("closes_at", "closing time must be after opening time")
                        .with_detail("index", index.to_string()),
                );
            }
            if !seen.insert(group.day) {
                checks.push(
                    MessageError::new("day", format!("{} is listed more than once", group.day.as_str()))
                        .with_detail("index", index.to_string()),
                );
            }
        }
        checks.finish()
    }
}

pub struct CreateOfficeHourUseCase<S> {
    pub store: S,
}

impl<S> CreateOfficeHourUseCase<S>
where
    S: SchoolStore + OfficeHourStore,
{
    pub async fn execute(&self, input: CreateOfficeHourInput) -> ResultCommand<OfficeHour> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateOfficeHourInput) -> Result<OfficeHour, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;

        // Time groups are stored together with their office hour or not at all.
        let office_hour = self
            .store
            .insert_office_hour(NewOfficeHour {
                school_id: school.id,
                title: input.title,
                time_groups: input.time_groups,
            })
            .await
            .map_err(|err| storage_rejection("insert_office_hour", "title", "office hour", err))?;

        info!(
            office_hour_id = office_hour.id,
            school_id = school.id,
            groups = office_hour.time_groups.len(),
            "office hour created"
        );
        Ok(office_hour)
    }
}
