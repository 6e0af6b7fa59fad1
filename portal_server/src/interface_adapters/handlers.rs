use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::auth::Viewer;
use crate::domain::entities::{
    Administrator, CalendarEvent, Grade, News, OfficeHour, Repository, School, Staff, User,
};
use crate::domain::ports::PortalStore;
use crate::domain::result::{NON_FIELD_ERRORS, Rejection, ResultCommand};
use crate::interface_adapters::protocol::{
    HealthResponse, Operation, OperationRequest, decode_input,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::add_administrator::{AddAdministratorInput, AddAdministratorUseCase};
use crate::use_cases::authorize::{
    require_school_manager, require_self_or_superuser, require_superuser,
};
use crate::use_cases::create_calendar_event::{
    CreateCalendarEventInput, CreateCalendarEventUseCase,
};
use crate::use_cases::create_grade::{CreateGradeInput, CreateGradeUseCase};
use crate::use_cases::create_office_hour::{CreateOfficeHourInput, CreateOfficeHourUseCase};
use crate::use_cases::create_repository::{CreateRepositoryInput, CreateRepositoryUseCase};
use crate::use_cases::create_school::{CreateSchoolInput, CreateSchoolUseCase};
use crate::use_cases::create_staff::{CreateStaffInput, CreateStaffUseCase};
use crate::use_cases::find_school::{FindSchoolInput, FindSchoolUseCase};
use crate::use_cases::publish_news::{PublishNewsInput, PublishNewsUseCase};
use crate::use_cases::register_user::{RegisterUserInput, RegisterUserUseCase};
use crate::use_cases::update_school::{UpdateSchoolInput, UpdateSchoolUseCase};
use crate::use_cases::update_user::{
    SetUserActiveInput, SetUserActiveUseCase, UpdateUserInput, UpdateUserUseCase,
};

type Outcome<T> = Result<ResultCommand<T>, Rejection>;

// Handler for `POST /graphql`: one named operation per request.
pub async fn execute_operation<S>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Response
where
    S: PortalStore,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable operation request");
            return envelope_response(ResultCommand::<Value>::failure(Rejection::bad_request(
                NON_FIELD_ERRORS,
                rejection.body_text(),
            )));
        }
    };

    let Some(operation) = Operation::parse(&request.operation) else {
        return envelope_response(ResultCommand::<Value>::failure(Rejection::bad_request(
            "operation",
            format!("unknown operation {}", request.operation),
        )));
    };
    debug!(
        operation = operation.name(),
        authenticated = viewer.is_authenticated(),
        "dispatching operation"
    );

    let state = &state;
    let viewer = &viewer;
    let input = request.input;
    match operation {
        Operation::CreateSchool => respond(create_school(state, viewer, input).await),
        Operation::UpdateSchool => respond(update_school(state, viewer, input).await),
        Operation::FindSchool => respond(find_school(state, input).await),
        Operation::AddAdministrator => respond(add_administrator(state, viewer, input).await),
        Operation::PublishNews => respond(publish_news(state, viewer, input).await),
        Operation::CreateCalendarEvent => {
            respond(create_calendar_event(state, viewer, input).await)
        }
        Operation::CreateStaff => respond(create_staff(state, viewer, input).await),
        Operation::CreateGrade => respond(create_grade(state, viewer, input).await),
        Operation::CreateRepository => respond(create_repository(state, viewer, input).await),
        Operation::CreateOfficeHour => respond(create_office_hour(state, viewer, input).await),
        Operation::RegisterUser => respond(register_user(state, input).await),
        Operation::UpdateUser => respond(update_user(state, viewer, input).await),
        Operation::SetUserActive => respond(set_user_active(state, viewer, input).await),
    }
}

// Handler for liveness checks.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn respond<T: Serialize>(outcome: Outcome<T>) -> Response {
    envelope_response(outcome.unwrap_or_else(ResultCommand::failure))
}

// Successful envelopes are 200; failures use their own error code as status.
fn envelope_response<T: Serialize>(envelope: ResultCommand<T>) -> Response {
    let status = match envelope.error_code() {
        None => StatusCode::OK,
        Some(code) => StatusCode::from_u16(code.as_u16()).unwrap_or_else(|_| {
            warn!(code = code.as_u16(), "error code is not an HTTP status");
            StatusCode::INTERNAL_SERVER_ERROR
        }),
    };
    (status, Json(envelope)).into_response()
}

async fn create_school<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<School> {
    require_superuser(viewer)?;
    let input: CreateSchoolInput = decode_input(input)?;
    let use_case = CreateSchoolUseCase {
        clock: SystemClock,
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn update_school<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<School> {
    let input: UpdateSchoolInput = decode_input(input)?;
    // Activation is reserved for superusers; the rest is open to school managers.
    if input.is_active.is_some() {
        require_superuser(viewer)?;
    } else {
        require_school_manager(&state.store, viewer, input.school_id).await?;
    }
    let use_case = UpdateSchoolUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn find_school<S: PortalStore>(state: &AppState<S>, input: Value) -> Outcome<School> {
    let input: FindSchoolInput = decode_input(input)?;
    let use_case = FindSchoolUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn add_administrator<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<Administrator> {
    require_superuser(viewer)?;
    let input: AddAdministratorInput = decode_input(input)?;
    let use_case = AddAdministratorUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn publish_news<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<News> {
    let mut input: PublishNewsInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    // The author is always the caller.
    input.author_id = viewer.user().map(|user| user.id).unwrap_or_default();
    let use_case = PublishNewsUseCase {
        clock: SystemClock,
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn create_calendar_event<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<CalendarEvent> {
    let input: CreateCalendarEventInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    let use_case = CreateCalendarEventUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn create_staff<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<Staff> {
    let input: CreateStaffInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    let use_case = CreateStaffUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn create_grade<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<Grade> {
    let input: CreateGradeInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    let use_case = CreateGradeUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn create_repository<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<Repository> {
    let input: CreateRepositoryInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    let use_case = CreateRepositoryUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn create_office_hour<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<OfficeHour> {
    let input: CreateOfficeHourInput = decode_input(input)?;
    require_school_manager(&state.store, viewer, input.school_id).await?;
    let use_case = CreateOfficeHourUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn register_user<S: PortalStore>(state: &AppState<S>, input: Value) -> Outcome<User> {
    let input: RegisterUserInput = decode_input(input)?;
    let use_case = RegisterUserUseCase {
        clock: SystemClock,
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn update_user<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<User> {
    let input: UpdateUserInput = decode_input(input)?;
    require_self_or_superuser(viewer, input.user_id)?;
    let use_case = UpdateUserUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}

async fn set_user_active<S: PortalStore>(
    state: &AppState<S>,
    viewer: &Viewer,
    input: Value,
) -> Outcome<User> {
    require_superuser(viewer)?;
    let input: SetUserActiveInput = decode_input(input)?;
    let use_case = SetUserActiveUseCase {
        store: state.store.clone(),
    };
    Ok(use_case.execute(input).await)
}
