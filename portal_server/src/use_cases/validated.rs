use std::future::Future;

use tracing::{debug, error};

use crate::domain::errors::StoreError;
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::Validate;

/// Validates `input` and only then runs `command` on it.
///
/// Invalid input short-circuits into a 400 envelope carrying exactly the
/// validation errors; `command` is never called in that case, so no write
/// can happen. Otherwise the command's outcome becomes the envelope.
pub async fn run_validated<I, T, F, Fut>(input: I, command: F) -> ResultCommand<T>
where
    I: Validate,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<T, Rejection>>,
{
    if let Err(errors) = input.validate() {
        debug!(error_count = errors.as_slice().len(), "command input rejected");
        return ResultCommand::invalid(errors);
    }

    ResultCommand::from_outcome(command(input).await)
}

// Maps an adapter failure into the envelope contract. Conflicts come from
// constraints enforced by the store after the command's own checks passed.
pub(crate) fn storage_rejection(
    operation: &'static str,
    field: &str,
    entity: &str,
    err: StoreError,
) -> Rejection {
    match err {
        StoreError::Conflict(detail) => {
            debug!(operation, %detail, "store reported a conflicting write");
            Rejection::conflict(field, entity)
        }
        StoreError::Backend(detail) => {
            error!(operation, %detail, "storage failure");
            Rejection::internal()
        }
    }
}

// Read-path variant: conflicts cannot happen, every failure is a 500.
pub(crate) fn read_rejection(operation: &'static str, err: StoreError) -> Rejection {
    error!(operation, error = %err, "storage failure");
    Rejection::internal()
}
