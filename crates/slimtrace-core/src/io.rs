use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use slimtrace_types::Record;

use crate::error::Result;

/// Streaming reader over a newline-delimited JSON transcript. Yields records
/// in file order; blank lines are skipped; a malformed line becomes a
/// placeholder `Record` of kind `Unknown` that retains the original text
/// (spec §4.1) rather than aborting the read.
pub struct RecordReader<R> {
    lines: std::io::Lines<BufReader<R>>,
    line_no: usize,
}

impl<R: std::io::Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        RecordReader {
            lines: BufReader::new(inner).lines(),
            line_no: 0,
        }
    }
}

impl<R: std::io::Read> Iterator for RecordReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(_) => return None,
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(Record::parse_line(self.line_no, &line));
        }
    }
}

/// Read an entire transcript file into memory as a `Vec<Record>`.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path)?;
    Ok(RecordReader::new(file).collect())
}

/// Serialize one record to a single output line. Passthrough records (an
/// untouched `original_line`) are echoed verbatim; everything else is
/// re-serialized from `raw`, which `serde_json::Map`'s default `BTreeMap`
/// backing renders with stable (alphabetical) key ordering (spec §4.1).
fn render_line(record: &Record) -> String {
    match &record.original_line {
        Some(line) if !record.is_dirty() => line.clone(),
        _ => serde_json::to_string(&record.raw).unwrap_or_default(),
    }
}

/// Write a full record sequence to `path`, one JSON object per line.
pub fn write_records<W: Write>(mut out: W, records: &[Record]) -> Result<()> {
    for record in records {
        out.write_all(render_line(record).as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Serialize a record sequence to an in-memory byte buffer, used for
/// bytes-before/bytes-after accounting (spec §4.4) without touching disk.
pub fn render_records(records: &[Record]) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = write_records(&mut buf, records);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_blank_lines() {
        let input = "{\"uuid\":\"a\"}\n\n{\"uuid\":\"b\"}\n";
        let records: Vec<_> = RecordReader::new(Cursor::new(input)).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].uuid, "a");
        assert_eq!(records[1].uuid, "b");
    }

    #[test]
    fn malformed_line_preserved() {
        let input = "{\"uuid\":\"a\"}\nnot json\n{\"uuid\":\"b\"}\n";
        let records: Vec<_> = RecordReader::new(Cursor::new(input)).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].original_line.as_deref(), Some("not json"));
    }

    #[test]
    fn round_trip_with_no_changes_is_byte_identical() {
        let input = "{\"uuid\":\"a\",\"role\":\"user\"}\n{\"uuid\":\"b\",\"role\":\"assistant\"}\n";
        let records: Vec<_> = RecordReader::new(Cursor::new(input)).collect();
        let out = render_records(&records);
        assert_eq!(String::from_utf8(out).unwrap(), input);
    }
}
