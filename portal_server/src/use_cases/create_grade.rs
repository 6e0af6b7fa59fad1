use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Grade, Id};
use crate::domain::ports::{GradeStore, SchoolStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGradeInput {
    pub school_id: Id,
    pub name: String,
}

impl Validate for CreateGradeInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("school_id", self.school_id)
            .text("name", &self.name, 1, 50)
            .finish()
    }
}

// Grade names are unique within a school.
pub struct CreateGradeUseCase<S> {
    pub store: S,
}

impl<S> CreateGradeUseCase<S>
where
    S: SchoolStore + GradeStore,
{
    pub async fn execute(&self, input: CreateGradeInput) -> ResultCommand<Grade> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateGradeInput) -> Result<Grade, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;
        let existing = self
            .store
            .grade_by_name(school.id, &input.name)
            .await
            .map_err(|err| read_rejection("grade_by_name", err))?;
        if existing.is_some() {
            return Err(Rejection::conflict("name", "grade"));
        }

        let grade = self
            .store
            .insert_grade(school.id, input.name)
            .await
            .map_err(|err| storage_rejection("insert_grade", "name", "grade", err))?;

        info!(grade_id = grade.id, school_id = school.id, "grade created");
        Ok(grade)
    }
}
