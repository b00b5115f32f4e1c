//! Person registry use-case service.
//!
//! # Responsibility
//! - Validate passport input before it reaches storage.
//! - Provide register, read, partial update, delete and filtered listing.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::error::ErrorKind;
use crate::model::person::{
    Passport, PassportError, Person, PersonFilter, PersonId, PersonPage, PersonPatch,
    PersonProfile,
};
use crate::repo::person_repo::PersonRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from person registry operations.
#[derive(Debug)]
pub enum PersonServiceError {
    InvalidPassport(PassportError),
    /// Update carries no non-empty field.
    EmptyUpdate,
    PersonNotFound(PersonId),
    DuplicatePassport,
    Repo(RepoError),
}

impl PersonServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPassport(_) | Self::EmptyUpdate => ErrorKind::Validation,
            Self::PersonNotFound(_) => ErrorKind::NotFound,
            Self::DuplicatePassport => ErrorKind::Conflict,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPassport(err) => write!(f, "{err}"),
            Self::EmptyUpdate => write!(f, "update must change at least one field"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::DuplicatePassport => {
                write!(f, "a person with this passport series and number already exists")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPassport(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::EmptyUpdate | Self::PersonNotFound(_) | Self::DuplicatePassport => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            RepoError::DuplicatePassport => Self::DuplicatePassport,
            other => Self::Repo(other),
        }
    }
}

impl From<PassportError> for PersonServiceError {
    fn from(value: PassportError) -> Self {
        Self::InvalidPassport(value)
    }
}

pub type PersonServiceResult<T> = Result<T, PersonServiceError>;

/// Use-case service wrapper for person records.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a person under an already validated passport.
    ///
    /// # Errors
    /// - `DuplicatePassport` when the series/number pair is taken.
    pub fn register(
        &self,
        passport: &Passport,
        profile: &PersonProfile,
    ) -> PersonServiceResult<PersonId> {
        let id = self.repo.create_person(passport, profile)?;
        info!("event=person_register module=service status=ok person_id={id}");
        Ok(id)
    }

    pub fn get(&self, id: PersonId) -> PersonServiceResult<Person> {
        self.repo
            .get_person(id)?
            .ok_or(PersonServiceError::PersonNotFound(id))
    }

    /// Applies a partial update; empty fields keep their stored value.
    ///
    /// # Errors
    /// - `EmptyUpdate` when every field is missing or empty.
    /// - `InvalidPassport` when a supplied series/number is malformed.
    /// - `PersonNotFound` when `id` does not exist.
    /// - `DuplicatePassport` when the new pair collides with another person.
    pub fn update(&self, id: PersonId, patch: &PersonPatch) -> PersonServiceResult<()> {
        if patch.is_empty() {
            return Err(PersonServiceError::EmptyUpdate);
        }
        patch.validate()?;
        self.repo.update_person(id, patch)?;
        info!("event=person_update module=service status=ok person_id={id}");
        Ok(())
    }

    /// Deletes a person together with their tasks.
    pub fn delete(&self, id: PersonId) -> PersonServiceResult<()> {
        self.repo.delete_person(id)?;
        info!("event=person_delete module=service status=ok person_id={id}");
        Ok(())
    }

    pub fn list(&self, filter: &PersonFilter, page: PersonPage) -> PersonServiceResult<Vec<Person>> {
        Ok(self.repo.list_persons(filter, page)?)
    }
}
