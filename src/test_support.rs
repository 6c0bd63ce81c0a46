// ABOUTME: Shared fixtures for unit tests
// ABOUTME: In-memory SQLite catalogue and a BulkCopy target that records calls

use crate::postgres::copy::BulkCopy;
use anyhow::{bail, Result};
use bytes::Bytes;
use rusqlite::{params, Connection};

pub const CREATED_AT: &str = "2021-06-16 20:14:09.221838+00";
pub const UPDATED_AT: &str = "2021-06-16 20:14:09.221855+00";

const CATALOG_DDL: &str = "
    CREATE TABLE film_work (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        creation_date DATE,
        file_path TEXT,
        rating FLOAT,
        type TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE,
        updated_at TIMESTAMP WITH TIME ZONE
    );
    CREATE TABLE genre (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMP WITH TIME ZONE,
        updated_at TIMESTAMP WITH TIME ZONE
    );
    CREATE TABLE person (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE,
        updated_at TIMESTAMP WITH TIME ZONE
    );
    CREATE TABLE genre_film_work (
        id TEXT PRIMARY KEY,
        film_work_id TEXT NOT NULL,
        genre_id TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE
    );
    CREATE TABLE person_film_work (
        id TEXT PRIMARY KEY,
        film_work_id TEXT NOT NULL,
        person_id TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE
    );
";

/// In-memory database with the five catalogue tables, all empty
pub fn catalog_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(CATALOG_DDL).unwrap();
    conn
}

pub fn insert_movie(conn: &Connection, id: &str, title: &str, rating: Option<f64>) {
    conn.execute(
        "INSERT INTO film_work VALUES (?1, ?2, NULL, '2021-01-01', NULL, ?3, 'movie', ?4, ?5)",
        params![id, title, rating, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn insert_genre(conn: &Connection, id: &str, name: &str, description: Option<&str>) {
    conn.execute(
        "INSERT INTO genre VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, description, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn insert_person(conn: &Connection, id: &str, full_name: &str) {
    conn.execute(
        "INSERT INTO person VALUES (?1, ?2, ?3, ?4)",
        params![id, full_name, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

/// Insert `count` genres named `genre-0000`, `genre-0001`, ... in id order
pub fn insert_genres(conn: &Connection, count: usize) {
    for i in 0..count {
        insert_genre(conn, &format!("g{:04}", i), &format!("genre-{:04}", i), None);
    }
}

/// One recorded bulk-copy call
#[derive(Debug, Clone)]
pub struct CopyCall {
    pub statement: String,
    pub frames: Vec<Bytes>,
}

impl CopyCall {
    pub fn payload(&self) -> String {
        self.frames
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.payload().lines().count()
    }
}

/// Records every COPY instead of talking to a server
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub calls: Vec<CopyCall>,
    /// Fail the first COPY whose statement mentions this table
    pub fail_on: Option<&'static str>,
}

impl RecordingTarget {
    pub fn failing_on(table: &'static str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(table),
        }
    }

    /// Tables in the order they were first copied into
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();
        for call in &self.calls {
            let table = call
                .statement
                .split('"')
                .nth(1)
                .unwrap_or_default()
                .to_string();
            if tables.last() != Some(&table) {
                tables.push(table);
            }
        }
        tables
    }
}

impl BulkCopy for RecordingTarget {
    async fn copy_block(&mut self, statement: &str, frames: Vec<Bytes>) -> Result<u64> {
        if let Some(table) = self.fail_on {
            if statement.contains(&format!("\"{}\"", table)) {
                bail!("duplicate key value violates unique constraint \"{}_pkey\"", table);
            }
        }
        let rows = frames
            .iter()
            .map(|f| f.iter().filter(|b| **b == b'\n').count() as u64)
            .sum();
        self.calls.push(CopyCall {
            statement: statement.to_string(),
            frames,
        });
        Ok(rows)
    }
}
