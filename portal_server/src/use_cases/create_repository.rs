use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, NewRepository, Repository};
use crate::domain::ports::{GradeStore, RepositoryStore, SchoolStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRepositoryInput {
    pub school_id: Id,
    #[serde(default)]
    pub grade_id: Option<Id>,
    pub title: String,
    pub url: String,
}

impl Validate for CreateRepositoryInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        checks
            .id("school_id", self.school_id)
            .text("title", &self.title, 4, 200)
            .url("url", &self.url);
        if let Some(grade_id) = self.grade_id {
            checks.id("grade_id", grade_id);
        }
        checks.finish()
    }
}

pub struct CreateRepositoryUseCase<S> {
    pub store: S,
}

impl<S> CreateRepositoryUseCase<S>
where
    S: SchoolStore + GradeStore + RepositoryStore,
{
    pub async fn execute(&self, input: CreateRepositoryInput) -> ResultCommand<Repository> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateRepositoryInput) -> Result<Repository, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;

        if let Some(grade_id) = input.grade_id {
            let grade = self
                .store
                .grade_by_id(grade_id)
                .await
                .map_err(|err| read_rejection("grade_by_id", err))?;
            // A grade from another school is reported exactly like a missing one.
            if !grade.is_some_and(|grade| grade.school_id == school.id) {
                return Err(Rejection::not_found("grade_id", "grade"));
            }
        }

        let repository = self
            .store
            .insert_repository(NewRepository {
                school_id: school.id,
                grade_id: input.grade_id,
                title: input.title,
                url: input.url,
            })
            .await
            .map_err(|err| storage_rejection("insert_repository", "url", "repository", err))?;

        info!(repository_id = repository.id, school_id = school.id, "repository created");
        Ok(repository)
    }
}
