//! End-to-end tests: catalog config → registry → bound columns → filter
//! store → serializer → backend, the way a table view wires everything up.

mod common;

use chrono::NaiveDate;
use common::{Meta, seeded_backend};
use listwise::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::advance;

fn sample_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("name", "Name"),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("concentration", "Concentration"),
        ColumnDef::new("created", "Created"),
        ColumnDef::new("position", "Position"), // no filter registered
    ]
}

#[tokio::test]
async fn test_catalog_drives_column_binding_and_filtering() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();
    let controller = PageController::new(Arc::new(seeded_backend(30)), RecordCache::new());

    let bound = bind_columns(&sample_columns(), &registry, &controller.snapshot().filters);
    assert!(bound[0].filter.is_some());
    assert!(bound[4].filter.is_none());

    // drive a filter through the contract the bound column carries
    let status = bound[1].filter.as_ref().unwrap();
    controller
        .set_filter(
            &status.key,
            Some(FilterValue::text("active")),
            status.description.clone(),
        )
        .await
        .unwrap();

    let state = controller.snapshot();
    assert_eq!(state.total_count, 15);

    // rebinding surfaces the committed value on the column
    let rebound = bind_columns(&sample_columns(), &registry, &state.filters);
    assert_eq!(
        rebound[1].filter.as_ref().unwrap().value,
        Some(FilterValue::text("active"))
    );
}

#[tokio::test]
async fn test_date_range_filter_includes_whole_upper_day() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();
    let controller = PageController::new(Arc::new(seeded_backend(30)), RecordCache::new());

    // seeded samples are created one per day from 2024-01-01
    let created = registry.description_for("created").unwrap().clone();
    controller
        .set_filter(
            registry.key_for("created").unwrap(),
            Some(FilterValue::dates(
                NaiveDate::from_ymd_opt(2024, 1, 5),
                NaiveDate::from_ymd_opt(2024, 1, 10),
            )),
            created,
        )
        .await
        .unwrap();

    // days 5 through 10 inclusive
    assert_eq!(controller.snapshot().total_count, 6);
}

#[tokio::test]
async fn test_range_filter_bounds_concentration() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();
    let controller = PageController::new(Arc::new(seeded_backend(30)), RecordCache::new());

    controller
        .set_filter(
            registry.key_for("concentration").unwrap(),
            Some(FilterValue::range(Some("5"), Some("10"))),
            registry.description_for("concentration").unwrap().clone(),
        )
        .await
        .unwrap();

    assert_eq!(controller.snapshot().total_count, 6);
}

#[tokio::test]
async fn test_batch_name_paste_matches_exact_tokens() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();
    let controller = PageController::new(Arc::new(seeded_backend(30)), RecordCache::new());

    controller
        .set_filter(
            registry.key_for("name").unwrap(),
            Some(FilterValue::text("S003 S007 S019")),
            registry.description_for("name").unwrap().clone(),
        )
        .await
        .unwrap();

    assert_eq!(controller.snapshot().total_count, 3);
}

#[tokio::test]
async fn test_metadata_pairs_filter_records() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();

    let mut tagged = common::sample("tagged", "active", 1.0);
    tagged.metadata = vec![
        Meta {
            name: "strain".to_string(),
            value: "K12".to_string(),
        },
        Meta {
            name: "passage".to_string(),
            value: "3".to_string(),
        },
    ];
    let plain = common::sample("plain", "active", 2.0);
    let backend = InMemoryBackend::with_records(vec![tagged.clone(), plain]);
    let controller = PageController::new(Arc::new(backend), RecordCache::new());

    controller
        .set_filter(
            registry.key_for("metadata").unwrap(),
            Some(FilterValue::metadata([MetadataPair::new("strain", "K12")])),
            registry.description_for("metadata").unwrap().clone(),
        )
        .await
        .unwrap();

    let state = controller.snapshot();
    assert_eq!(state.total_count, 1);
    assert_eq!(state.items, vec![tagged.id]);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_keystrokes_commit_one_filter_change() {
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples").unwrap();
    let controller = Arc::new(PageController::new(
        Arc::new(seeded_backend(30)),
        RecordCache::new(),
    ));

    // the adapter commits into a channel; a small task applies commits to
    // the controller, which is how a view wires the two together
    let (commit_tx, mut commit_rx) = mpsc::unbounded_channel::<String>();
    let mut input = DebouncedInput::with_delay(Duration::from_millis(500), move |value| {
        let _ = commit_tx.send(value);
    });

    let applier = {
        let controller = Arc::clone(&controller);
        let description = registry.description_for("name").unwrap().clone();
        tokio::spawn(async move {
            let mut commits = 0usize;
            while let Some(value) = commit_rx.recv().await {
                controller
                    .set_filter("name", Some(FilterValue::text(value)), description.clone())
                    .await
                    .unwrap();
                commits += 1;
            }
            commits
        })
    };

    input.input("S");
    tokio::task::yield_now().await;
    advance(Duration::from_millis(100)).await;
    input.input("S0");
    tokio::task::yield_now().await;
    advance(Duration::from_millis(100)).await;
    input.input("S003");
    tokio::task::yield_now().await;
    advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    drop(input);
    let commits = applier.await.unwrap();
    assert_eq!(commits, 1);

    let state = controller.snapshot();
    assert_eq!(state.total_count, 1);
    assert_eq!(state.page.page_number, 1);
}
