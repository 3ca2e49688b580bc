//! COPY wire format.
//!
//! One tab-separated line per row, trailing newline, column order equal to
//! the table image's field insertion order. Two delivery modes: materialize
//! the whole payload, or stream it through a producer thread and bounded
//! channel so the consumer starts before formatting finishes. Both modes
//! produce identical bytes.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use fsrc_model::{ColumnData, TableImage};

/// Rows of a bulk load captured from one table image.
#[derive(Debug)]
pub struct CopyRows {
    names: Vec<String>,
    columns: Vec<ColumnData>,
    row_count: usize,
}

fn render_cell(out: &mut String, column: &ColumnData, row: usize) {
    use std::fmt::Write;
    match column {
        ColumnData::I8(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::I16(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::I32(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::I64(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::F32(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::F64(v) => write!(out, "{}", v[row]).expect("write to string"),
        ColumnData::Bool(v) => out.push_str(if v[row] { "t" } else { "f" }),
        ColumnData::Str(v) => out.push_str(&v[row]),
        ColumnData::Point64(v) => {
            write!(out, "({},{})", v[row][0], v[row][1]).expect("write to string");
        }
    }
}

impl CopyRows {
    /// Captures the ordered field names and data of an image.
    pub fn from_image(image: &TableImage) -> Self {
        let mut names = Vec::new();
        let mut columns = Vec::new();
        for field in image.fields().values() {
            names.push(field.name.clone());
            columns.push(field.data.clone());
        }
        let row_count = columns.first().map_or(0, ColumnData::len);
        Self {
            names,
            columns,
            row_count,
        }
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    fn render_row(&self, row: usize) -> String {
        let mut line = String::new();
        for (position, column) in self.columns.iter().enumerate() {
            if position > 0 {
                line.push('\t');
            }
            render_cell(&mut line, column, row);
        }
        line.push('\n');
        line
    }

    /// The whole payload in memory, for the synchronous delivery mode.
    pub fn materialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for row in 0..self.row_count {
            out.extend_from_slice(self.render_row(row).as_bytes());
        }
        out
    }

    /// Streams the payload through a producer thread. Bytes read are
    /// identical to [`CopyRows::materialize`]; the channel bound keeps the
    /// producer a fixed number of rows ahead of the consumer.
    pub fn into_reader(self) -> CopyReader {
        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(64);
        let producer = thread::spawn(move || {
            for row in 0..self.row_count {
                let line = self.render_row(row).into_bytes();
                // Receiver dropped early means the load failed; stop feeding.
                if sender.send(line).is_err() {
                    return;
                }
            }
        });
        CopyReader {
            receiver,
            buffer: Vec::new(),
            offset: 0,
            producer: Some(producer),
        }
    }
}

/// Reader side of the streamed delivery mode.
pub struct CopyReader {
    receiver: mpsc::Receiver<Vec<u8>>,
    buffer: Vec<u8>,
    offset: usize,
    producer: Option<thread::JoinHandle<()>>,
}

impl Read for CopyReader {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        if self.offset >= self.buffer.len() {
            match self.receiver.recv() {
                Ok(line) => {
                    self.buffer = line;
                    self.offset = 0;
                }
                // Sender gone: all rows delivered.
                Err(mpsc::RecvError) => return Ok(0),
            }
        }
        let available = &self.buffer[self.offset..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

impl Drop for CopyReader {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            drop(std::mem::replace(
                &mut self.receiver,
                mpsc::sync_channel(1).1,
            ));
            let _ = producer.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsrc_model::Field;
    use indexmap::IndexMap;

    fn image() -> TableImage {
        let mut fields = IndexMap::new();
        fields.insert(
            "id".to_string(),
            Field::new("id", ColumnData::I64(vec![10, 20]), ""),
        );
        fields.insert(
            "flux".to_string(),
            Field::new("flux", ColumnData::F64(vec![1.5, -0.25]), ""),
        );
        fields.insert(
            "flag".to_string(),
            Field::new("flag", ColumnData::Bool(vec![true, false]), ""),
        );
        fields.insert(
            "pos".to_string(),
            Field::new("pos", ColumnData::Point64(vec![[1.0, 2.0], [3.5, 4.5]]), ""),
        );
        TableImage::new("forcedsource", "run1", fields)
    }

    #[test]
    fn materialized_payload_shape() {
        let rows = CopyRows::from_image(&image());
        assert_eq!(rows.field_names(), ["id", "flux", "flag", "pos"]);
        let payload = String::from_utf8(rows.materialize()).unwrap();
        assert_eq!(payload, "10\t1.5\tt\t(1,2)\n20\t-0.25\tf\t(3.5,4.5)\n");
    }

    #[test]
    fn streamed_mode_matches_materialized_bytes() {
        let rows = CopyRows::from_image(&image());
        let expected = rows.materialize();
        let mut reader = CopyRows::from_image(&image()).into_reader();
        let mut streamed = Vec::new();
        reader.read_to_end(&mut streamed).unwrap();
        assert_eq!(streamed, expected);
    }

    #[test]
    fn empty_image_yields_empty_payload() {
        let image = TableImage::new("t", "s", IndexMap::new());
        let rows = CopyRows::from_image(&image);
        assert_eq!(rows.row_count(), 0);
        assert!(rows.materialize().is_empty());
        let mut reader = rows.into_reader();
        let mut streamed = Vec::new();
        reader.read_to_end(&mut streamed).unwrap();
        assert!(streamed.is_empty());
    }
}
