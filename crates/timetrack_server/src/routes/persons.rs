use super::with_conn;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use timetrack_core::{
    Passport, Person, PersonFilter, PersonId, PersonPage, PersonPatch, PersonProfile,
    PersonService, SqlitePersonRepository,
};

#[derive(Debug, Deserialize)]
pub(super) struct RegisterRequest {
    #[serde(rename = "passportNumber")]
    passport_number: String,
}

#[derive(Debug, Serialize)]
pub(super) struct Registered {
    person_id: PersonId,
}

#[derive(Debug, Deserialize)]
pub(super) struct PageParams {
    page: Option<u32>,
    limit: Option<u32>,
}

fn person_service(
    conn: &rusqlite::Connection,
) -> Result<PersonService<SqlitePersonRepository<'_>>, ApiError> {
    Ok(PersonService::new(SqlitePersonRepository::try_new(conn)?))
}

/// POST /persons
pub(super) async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Registered>, ApiError> {
    let passport = Passport::parse(&request.passport_number)?;
    let profile = match &state.people_api {
        Some(client) => client.lookup(&passport).await?,
        None => PersonProfile::default(),
    };

    let person_id = with_conn(&state, move |conn| {
        Ok(person_service(conn)?.register(&passport, &profile)?)
    })
    .await?;
    Ok(Json(Registered { person_id }))
}

/// GET /persons/{id}
pub(super) async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError> {
    let person = with_conn(&state, move |conn| Ok(person_service(conn)?.get(id)?)).await?;
    Ok(Json(person))
}

/// PUT /persons/{id}
///
/// A body with no non-empty field is rejected with 422.
pub(super) async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
    Json(patch): Json<PersonPatch>,
) -> Result<StatusCode, ApiError> {
    with_conn(&state, move |conn| Ok(person_service(conn)?.update(id, &patch)?)).await?;
    Ok(StatusCode::OK)
}

/// DELETE /persons/{id}
pub(super) async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError> {
    with_conn(&state, move |conn| Ok(person_service(conn)?.delete(id)?)).await?;
    Ok(StatusCode::OK)
}

/// POST /persons/search?page=&limit=
///
/// The body is a [`PersonFilter`]; its `id` may be a number or a numeric string.
pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Json(filter): Json<PersonFilter>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let page = PersonPage::new(params.page, params.limit);
    let persons =
        with_conn(&state, move |conn| Ok(person_service(conn)?.list(&filter, page)?)).await?;
    Ok(Json(persons))
}
