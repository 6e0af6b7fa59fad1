use serde::Deserialize;

use crate::domain::entities::{Id, School};
use crate::domain::ports::SchoolStore;
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::validated::{read_rejection, run_validated};

// Existence check shared by every school-scoped command.
pub(crate) async fn require_school<S>(store: &S, school_id: Id) -> Result<School, Rejection>
where
    S: SchoolStore,
{
    store
        .school_by_id(school_id)
        .await
        .map_err(|err| read_rejection("school_by_id", err))?
        .ok_or_else(|| Rejection::not_found("school_id", "school"))
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindSchoolInput {
    pub school_id: Id,
}

impl Validate for FindSchoolInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new().id("school_id", self.school_id).finish()
    }
}

// Read-only lookup; never writes.
pub struct FindSchoolUseCase<S> {
    pub store: S,
}

impl<S> FindSchoolUseCase<S>
where
    S: SchoolStore,
{
    pub async fn execute(&self, input: FindSchoolInput) -> ResultCommand<School> {
        run_validated(input, |input| require_school(&self.store, input.school_id)).await
    }
}
