//! Roster input.
//!
//! The roster is a CSV file with a header row and the columns
//! `name, class, section, studentId, contact`, in that order. Header names are
//! not checked; columns are positional. Missing trailing columns are empty.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("Failed to read roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to build record: {0}")]
    Build(#[from] RecordBuilderError),
}

/// One person on the roster; one card is printed per record.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct Record {
    pub name: String,
    pub class: String,
    pub section: String,
    pub id: String,
    pub contact: String,
}

impl Record {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }

    pub fn last_name(&self) -> String {
        self.name
            .split_whitespace()
            .skip(1)
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Caption printed above the card on the sheet.
    pub fn label(&self) -> String {
        match (self.id.trim(), self.name.trim()) {
            ("", name) => name.to_string(),
            (id, "") => id.to_string(),
            (id, name) => format!("{id} - {name}"),
        }
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Record>, RecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        records.push(
            RecordBuilder::default()
                .name(field(0))
                .class(field(1))
                .section(field(2))
                .id(field(3))
                .contact(field(4))
                .build()?,
        );
    }
    Ok(records)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, RecordError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    parse_csv(std::io::BufReader::new(file))
}
