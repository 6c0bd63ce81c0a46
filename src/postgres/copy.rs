// ABOUTME: COPY FROM STDIN text encoding and the bulk-copy seam
// ABOUTME: Encodes record blocks as tab-delimited lines with the "None" null sentinel

use crate::records::{Record, TableDescriptor};
use crate::utils::quote_ident;
use anyhow::{Context, Result};
use bytes::{BufMut, Bytes, BytesMut};
use futures::SinkExt;
use tokio_postgres::Client;

/// Text written in place of a null field
pub const NULL_SENTINEL: &str = "None";

/// Rough per-row size used to pre-size buffers
const ROW_CAPACITY_HINT: usize = 256;

/// Anything that can run one `COPY ... FROM STDIN` and report rows written
#[allow(async_fn_in_trait)]
pub trait BulkCopy {
    async fn copy_block(&mut self, statement: &str, frames: Vec<Bytes>) -> Result<u64>;
}

impl BulkCopy for Client {
    async fn copy_block(&mut self, statement: &str, frames: Vec<Bytes>) -> Result<u64> {
        let sink = self
            .copy_in::<_, Bytes>(statement)
            .await
            .context("Failed to start COPY")?;

        tokio::pin!(sink);
        for frame in frames {
            sink.send(frame).await.context("Failed to send COPY data")?;
        }
        let rows = sink.finish().await.context("Failed to finish COPY")?;

        Ok(rows)
    }
}

/// Build the COPY statement for a table
///
/// ```
/// # use sqlite_pg_loader::postgres::copy::copy_statement;
/// # use sqlite_pg_loader::records::{Genre, Record};
/// assert_eq!(
///     copy_statement(&Genre::DESCRIPTOR),
///     "COPY \"genre\" (\"id\", \"name\", \"description\", \"created_at\", \"updated_at\") \
///      FROM STDIN WITH (FORMAT text, NULL 'None')"
/// );
/// ```
pub fn copy_statement(table: &TableDescriptor) -> String {
    let columns: Vec<String> = table.columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT text, NULL '{}')",
        quote_ident(table.name),
        columns.join(", "),
        NULL_SENTINEL
    )
}

/// Writes one COPY text line, field by field
pub struct CopyRowWriter<'a> {
    buf: &'a mut BytesMut,
    first: bool,
}

impl<'a> CopyRowWriter<'a> {
    fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf, first: true }
    }

    fn separator(&mut self) {
        if !self.first {
            self.buf.put_u8(b'\t');
        }
        self.first = false;
    }

    pub fn text(&mut self, value: &str) {
        self.separator();
        escape_into(self.buf, value);
    }

    pub fn opt_text(&mut self, value: Option<&str>) {
        match value {
            Some(v) => self.text(v),
            None => self.null(),
        }
    }

    pub fn opt_float(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.separator();
                self.buf.put_slice(v.to_string().as_bytes());
            }
            None => self.null(),
        }
    }

    pub fn null(&mut self) {
        self.separator();
        self.buf.put_slice(NULL_SENTINEL.as_bytes());
    }

    fn finish(self) {
        self.buf.put_u8(b'\n');
    }
}

fn escape_into(buf: &mut BytesMut, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'\\' => buf.put_slice(b"\\\\"),
            b'\t' => buf.put_slice(b"\\t"),
            b'\n' => buf.put_slice(b"\\n"),
            b'\r' => buf.put_slice(b"\\r"),
            other => buf.put_u8(other),
        }
    }
}

/// Encode one record as a COPY text line
pub fn encode_record<R: Record>(record: &R, buf: &mut BytesMut) {
    let mut row = CopyRowWriter::new(buf);
    record.write_fields(&mut row);
    row.finish();
}

/// Encode a block into COPY data frames of at most `page_size` rows each
pub fn encode_block<R: Record>(block: &[R], page_size: usize) -> Vec<Bytes> {
    block
        .chunks(page_size.max(1))
        .map(|page| {
            let mut buf = BytesMut::with_capacity(page.len() * ROW_CAPACITY_HINT);
            for record in page {
                encode_record(record, &mut buf);
            }
            buf.freeze()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Genre, Movie};

    fn genre(id: &str, name: &str, description: Option<&str>) -> Genre {
        Genre {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    fn encode_one<R: Record>(record: &R) -> String {
        let mut buf = BytesMut::new();
        encode_record(record, &mut buf);
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn test_null_fields_use_sentinel() {
        let line = encode_one(&genre("g1", "Drama", None));
        assert_eq!(line, "g1\tDrama\tNone\tNone\tNone\n");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let line = encode_one(&genre("g1", "Sci\tFi", Some("line one\nline two\\end\r")));
        assert_eq!(
            line,
            "g1\tSci\\tFi\tline one\\nline two\\\\end\\r\tNone\tNone\n"
        );
    }

    #[test]
    fn test_movie_line_has_nine_fields() {
        let movie = Movie {
            id: "m1".to_string(),
            title: "Heat".to_string(),
            description: None,
            creation_date: Some("1995-12-15".to_string()),
            file_path: None,
            rating: Some(8.3),
            kind: "movie".to_string(),
            created_at: None,
            updated_at: None,
        };
        let line = encode_one(&movie);
        let fields: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[5], "8.3");
        assert_eq!(fields[6], "movie");
        assert_eq!(fields[2], NULL_SENTINEL);
    }

    #[test]
    fn test_block_split_into_pages() {
        let block: Vec<Genre> = (0..5)
            .map(|i| genre(&format!("g{}", i), "x", None))
            .collect();

        let frames = encode_block(&block, 2);
        assert_eq!(frames.len(), 3);

        let joined: String = frames
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        let ids: Vec<&str> = joined
            .lines()
            .map(|line| line.split('\t').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["g0", "g1", "g2", "g3", "g4"]);
    }

    #[test]
    fn test_copy_statement_quotes_type_column() {
        let statement = copy_statement(&Movie::DESCRIPTOR);
        assert!(statement.starts_with("COPY \"film_work\" ("));
        assert!(statement.contains("\"type\""));
        assert!(statement.ends_with("NULL 'None')"));
    }
}
