//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use listwise::prelude::*;

/// A minimal sample record shaped like the rows of a samples table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub concentration: f64,
    pub created: NaiveDate,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub name: String,
    pub value: String,
}

impl Record for Sample {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn sample(name: &str, status: &str, concentration: f64) -> Sample {
    Sample {
        id: Uuid::new_v4(),
        name: name.to_string(),
        status: status.to_string(),
        concentration,
        created: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        metadata: Vec::new(),
    }
}

/// Backend seeded with `count` samples named S001, S002, ... with
/// alternating status, rising concentration and one created date per day
pub fn seeded_backend(count: usize) -> InMemoryBackend<Sample> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let records = (1..=count)
        .map(|i| {
            let status = if i % 2 == 0 { "active" } else { "archived" };
            Sample {
                id: Uuid::new_v4(),
                name: format!("S{i:03}"),
                status: status.to_string(),
                concentration: i as f64,
                created: base + chrono::Duration::days((i - 1) as i64),
                metadata: Vec::new(),
            }
        })
        .collect();
    InMemoryBackend::with_records(records)
}

pub fn input_description(label: &str) -> FilterDescription {
    FilterDescription::new(FilterKind::Input, label)
}
