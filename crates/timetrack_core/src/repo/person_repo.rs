//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered pagination over `persons` storage.
//! - Translate passport uniqueness violations into `DuplicatePassport`.
//!
//! # Invariants
//! - Partial updates are a single `UPDATE` that keeps columns whose patch
//!   value is missing or empty.

use crate::model::person::{
    non_empty, Passport, Person, PersonFilter, PersonId, PersonPage, PersonPatch, PersonProfile,
};
use crate::repo::{ensure_schema, is_constraint, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, OptionalExtension, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    passport_series,
    passport_number,
    surname,
    name,
    patronymic,
    address
FROM persons";

/// Repository interface for person records.
pub trait PersonRepository {
    fn create_person(&self, passport: &Passport, profile: &PersonProfile) -> RepoResult<PersonId>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn exists(&self, id: PersonId) -> RepoResult<bool>;
    fn update_person(&self, id: PersonId, patch: &PersonPatch) -> RepoResult<()>;
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
    fn list_persons(&self, filter: &PersonFilter, page: PersonPage) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Wraps a connection that already has the current schema applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, "persons")?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, passport: &Passport, profile: &PersonProfile) -> RepoResult<PersonId> {
        self.conn
            .execute(
                "INSERT INTO persons (
                    passport_series,
                    passport_number,
                    surname,
                    name,
                    patronymic,
                    address
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    passport.series(),
                    passport.number(),
                    profile.surname.as_str(),
                    profile.name.as_str(),
                    profile.patronymic.as_str(),
                    profile.address.as_str(),
                ],
            )
            .map_err(map_unique_violation)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("{PERSON_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_person_row,
            )
            .optional()?;
        Ok(person)
    }

    fn exists(&self, id: PersonId) -> RepoResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM persons WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn update_person(&self, id: PersonId, patch: &PersonPatch) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE persons
                 SET
                    passport_series = COALESCE(?2, passport_series),
                    passport_number = COALESCE(?3, passport_number),
                    surname = COALESCE(?4, surname),
                    name = COALESCE(?5, name),
                    patronymic = COALESCE(?6, patronymic),
                    address = COALESCE(?7, address)
                 WHERE id = ?1;",
                params![
                    id,
                    non_empty(&patch.passport_series),
                    non_empty(&patch.passport_number),
                    non_empty(&patch.surname),
                    non_empty(&patch.name),
                    non_empty(&patch.patronymic),
                    non_empty(&patch.address),
                ],
            )
            .map_err(map_unique_violation)?;

        if changed == 0 {
            return Err(RepoError::PersonNotFound(id));
        }
        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::PersonNotFound(id));
        }
        Ok(())
    }

    fn list_persons(&self, filter: &PersonFilter, page: PersonPage) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(id) = filter.id {
            sql.push_str(" AND id = ?");
            bind_values.push(Value::Integer(id));
        }

        let text_filters = [
            ("passport_series", &filter.passport_series),
            ("passport_number", &filter.passport_number),
            ("surname", &filter.surname),
            ("name", &filter.name),
            ("patronymic", &filter.patronymic),
            ("address", &filter.address),
        ];
        for (column, value) in text_filters {
            if let Some(value) = non_empty(value) {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(Value::Text(value.to_string()));
            }
        }

        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(page.limit())));
        bind_values.push(Value::Integer(
            i64::try_from(page.offset()).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }

        Ok(persons)
    }
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        passport_series: row.get("passport_series")?,
        passport_number: row.get("passport_number")?,
        surname: row.get("surname")?,
        name: row.get("name")?,
        patronymic: row.get("patronymic")?,
        address: row.get("address")?,
    })
}

fn map_unique_violation(err: rusqlite::Error) -> RepoError {
    if is_constraint(&err, ffi::SQLITE_CONSTRAINT_UNIQUE) {
        RepoError::DuplicatePassport
    } else {
        err.into()
    }
}
