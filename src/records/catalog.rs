// ABOUTME: Record structs for film_work, genre, person and the two link tables
// ABOUTME: Field order matches the SQLite column order exactly

use super::{Record, TableDescriptor};
use crate::postgres::copy::CopyRowWriter;
use rusqlite::Row;

/// A row of `film_work`
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub file_path: Option<String>,
    pub rating: Option<f64>,
    pub kind: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Record for Movie {
    const DESCRIPTOR: TableDescriptor = TableDescriptor {
        name: "film_work",
        columns: &[
            "id",
            "title",
            "description",
            "creation_date",
            "file_path",
            "rating",
            "type",
            "created_at",
            "updated_at",
        ],
        depends_on: &[],
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            creation_date: row.get(3)?,
            file_path: row.get(4)?,
            rating: row.get(5)?,
            kind: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn write_fields(&self, row: &mut CopyRowWriter<'_>) {
        row.text(&self.id);
        row.text(&self.title);
        row.opt_text(self.description.as_deref());
        row.opt_text(self.creation_date.as_deref());
        row.opt_text(self.file_path.as_deref());
        row.opt_float(self.rating);
        row.text(&self.kind);
        row.opt_text(self.created_at.as_deref());
        row.opt_text(self.updated_at.as_deref());
    }
}

/// A row of `genre`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Record for Genre {
    const DESCRIPTOR: TableDescriptor = TableDescriptor {
        name: "genre",
        columns: &["id", "name", "description", "created_at", "updated_at"],
        depends_on: &[],
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn write_fields(&self, row: &mut CopyRowWriter<'_>) {
        row.text(&self.id);
        row.text(&self.name);
        row.opt_text(self.description.as_deref());
        row.opt_text(self.created_at.as_deref());
        row.opt_text(self.updated_at.as_deref());
    }
}

/// A row of `person`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub full_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Record for Person {
    const DESCRIPTOR: TableDescriptor = TableDescriptor {
        name: "person",
        columns: &["id", "full_name", "created_at", "updated_at"],
        depends_on: &[],
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            full_name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    fn write_fields(&self, row: &mut CopyRowWriter<'_>) {
        row.text(&self.id);
        row.text(&self.full_name);
        row.opt_text(self.created_at.as_deref());
        row.opt_text(self.updated_at.as_deref());
    }
}

/// Link between a film and one of its genres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreFilmWork {
    pub id: String,
    pub film_work_id: String,
    pub genre_id: String,
    pub created_at: Option<String>,
}

impl Record for GenreFilmWork {
    const DESCRIPTOR: TableDescriptor = TableDescriptor {
        name: "genre_film_work",
        columns: &["id", "film_work_id", "genre_id", "created_at"],
        depends_on: &["film_work", "genre"],
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            film_work_id: row.get(1)?,
            genre_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn write_fields(&self, row: &mut CopyRowWriter<'_>) {
        row.text(&self.id);
        row.text(&self.film_work_id);
        row.text(&self.genre_id);
        row.opt_text(self.created_at.as_deref());
    }
}

/// Link between a film and a person, with the person's role in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFilmWork {
    pub id: String,
    pub film_work_id: String,
    pub person_id: String,
    pub role: String,
    pub created_at: Option<String>,
}

impl Record for PersonFilmWork {
    const DESCRIPTOR: TableDescriptor = TableDescriptor {
        name: "person_film_work",
        columns: &["id", "film_work_id", "person_id", "role", "created_at"],
        depends_on: &["film_work", "person"],
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            film_work_id: row.get(1)?,
            person_id: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn write_fields(&self, row: &mut CopyRowWriter<'_>) {
        row.text(&self.id);
        row.text(&self.film_work_id);
        row.text(&self.person_id);
        row.text(&self.role);
        row.opt_text(self.created_at.as_deref());
    }
}
