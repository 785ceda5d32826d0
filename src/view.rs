//! Nested, serializable view of a sealed file.
//!
//! Mirrors the file's ownership tree: the file header, each batch with its
//! transactions (an entry detail and its addendas) and batch control, then
//! the file control. Each record serializes as a field name to value map.

use crate::batch::{Batch, Entry};
use crate::record::Record;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FileView<'a> {
    pub file_header: &'a Record,
    pub batches: Vec<BatchView<'a>>,
    pub file_control: &'a Record,
}

#[derive(Debug, Serialize)]
pub struct BatchView<'a> {
    pub batch_header: &'a Record,
    pub transactions: Vec<TransactionView<'a>>,
    pub batch_control: &'a Record,
}

#[derive(Debug, Serialize)]
pub struct TransactionView<'a> {
    pub entry_detail: &'a Record,
    pub addendas: Vec<&'a Record>,
}

impl<'a> FileView<'a> {
    pub fn new(header: &'a Record, batches: &'a [Batch], control: &'a Record) -> Self {
        FileView {
            file_header: header,
            batches: batches.iter().map(BatchView::from).collect(),
            file_control: control,
        }
    }
}

impl<'a> From<&'a Batch> for BatchView<'a> {
    fn from(batch: &'a Batch) -> Self {
        BatchView {
            batch_header: batch.header(),
            transactions: batch.entries().iter().map(TransactionView::from).collect(),
            batch_control: batch.control(),
        }
    }
}

impl<'a> From<&'a Entry> for TransactionView<'a> {
    fn from(entry: &'a Entry) -> Self {
        TransactionView {
            entry_detail: entry.record(),
            addendas: entry.addendas().iter().map(|addenda| addenda.record()).collect(),
        }
    }
}
