//! Walkthrough of a filtered, sorted, paginated list view over an
//! in-memory collection

use chrono::NaiveDate;
use listwise::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
struct Sample {
    id: Uuid,
    name: String,
    status: String,
    concentration: f64,
    created: NaiveDate,
}

impl Record for Sample {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn seed() -> Vec<Sample> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    (1..=120)
        .map(|i| Sample {
            id: Uuid::new_v4(),
            name: format!("S{i:03}"),
            status: if i % 3 == 0 { "archived" } else { "active" }.to_string(),
            concentration: (i % 17) as f64,
            created: base + chrono::Duration::days(i % 30),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("📋 Listwise list-view walkthrough\n");

    // Catalog and registry for the samples table
    let config = FiltersConfig::default_config();
    let registry = config.registry_for("samples")?;

    // Backend, shared cache, controller, resolver, staleness watcher
    let backend = Arc::new(InMemoryBackend::with_records(seed()));
    let cache = RecordCache::new();
    let controller = Arc::new(PageController::new(
        backend.clone() as Arc<dyn ListClient<Sample>>,
        cache.clone(),
    ));
    let resolver = RecordResolver::new(backend.clone() as Arc<dyn RecordFetcher<Sample>>, cache);
    let _watcher = spawn_staleness_watcher(controller.clone());

    // First page, default sort
    controller.list_page(1).await?;
    let state = controller.snapshot();
    println!(
        "page {}/{} — {} records total",
        state.page.page_number,
        state.total_count.div_ceil(state.page.limit),
        state.total_count
    );

    // Column definitions merged with their filter contracts
    let columns = vec![
        ColumnDef::new("name", "Name"),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("concentration", "Concentration"),
    ];
    let bound = bind_columns(&columns, &registry, &state.filters);
    for column in &bound {
        println!(
            "column {:12} filterable: {:5} sortable: {}",
            column.title,
            column.filter.is_some(),
            column.sortable
        );
    }

    // A debounced name input committing into the controller
    let (commit_tx, mut commit_rx) = mpsc::unbounded_channel::<String>();
    let mut name_input = DebouncedInput::with_delay(Duration::from_millis(200), move |value| {
        let _ = commit_tx.send(value);
    });
    let name_description = registry
        .description_for("name")
        .expect("name is in the catalog")
        .clone();

    name_input.input("S0");
    name_input.input("S01");
    if let Some(committed) = commit_rx.recv().await {
        println!("\ncommitted name filter: {committed:?}");
        controller
            .set_filter("name", Some(FilterValue::text(committed)), name_description)
            .await?;
    }

    // Narrow further, sort, and page
    controller
        .set_filter(
            "status",
            Some(FilterValue::text("active")),
            registry.description_for("status").expect("in catalog").clone(),
        )
        .await?;
    controller
        .set_sort_by(vec![SortBy::descend("concentration")])
        .await?;

    let state = controller.snapshot();
    println!(
        "filtered down to {} records on page {}",
        state.total_count, state.page.page_number
    );

    // Resolve the page's ids into displayable records
    let records = resolver.resolve(&state.items).await?;
    for id in &state.items {
        if let Some(sample) = records.get(id) {
            println!(
                "  {:6} {:9} concentration {:>4}",
                sample.name, sample.status, sample.concentration
            );
        }
    }

    // Something elsewhere mutated the collection
    backend.insert(Sample {
        id: Uuid::new_v4(),
        name: "S010b".to_string(),
        status: "active".to_string(),
        concentration: 16.0,
        created: NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"),
    })?;
    controller.set_stale(true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = controller.snapshot();
    println!(
        "\nafter staleness refresh: {} records, phase {:?}",
        state.total_count,
        state.phase()
    );

    Ok(())
}
