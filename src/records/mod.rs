// ABOUTME: Typed records for the five catalogue tables and their table descriptors
// ABOUTME: Each record maps one SQLite row positionally and writes itself as a COPY text line

pub mod catalog;

pub use catalog::{Genre, GenreFilmWork, Movie, Person, PersonFilmWork};

use crate::postgres::copy::CopyRowWriter;

/// Static pairing of a table name with its record's column layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name, identical in source and target
    pub name: &'static str,
    /// Column names in source order
    pub columns: &'static [&'static str],
    /// Tables that must be loaded before this one
    pub depends_on: &'static [&'static str],
}

impl TableDescriptor {
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// One typed, immutable row projection from a source table
pub trait Record: Sized {
    const DESCRIPTOR: TableDescriptor;

    /// Build the record from a row whose column count was already checked
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Write the fields in column order
    fn write_fields(&self, row: &mut CopyRowWriter<'_>);
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn position(order: &[TableDescriptor], name: &str) -> Option<usize> {
    let mut i = 0;
    while i < order.len() {
        if str_eq(order[i].name, name) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// True when every table appears after all the tables it depends on, and
/// every dependency is itself part of the order.
///
/// Usable in `const` context so a bad plan fails to compile.
pub const fn is_dependency_ordered(order: &[TableDescriptor]) -> bool {
    let mut i = 0;
    while i < order.len() {
        let deps = order[i].depends_on;
        let mut d = 0;
        while d < deps.len() {
            match position(order, deps[d]) {
                Some(p) if p < i => {}
                _ => return false,
            }
            d += 1;
        }
        i += 1;
    }
    true
}
