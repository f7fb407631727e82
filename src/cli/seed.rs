use anyhow::Result;
use std::path::Path;

use crate::core::store::{RecordStore, Table};
use crate::core::terminal;

pub async fn run_seed(db_path: &Path) -> Result<()> {
    let store = RecordStore::open(db_path).await?;
    let inserted = store.seed_sample_data().await?;
    if inserted == 0 {
        terminal::print_warn("Sample data already present, nothing inserted.");
    } else {
        terminal::print_success(&format!(
            "Seeded {} sample rows into {}",
            inserted,
            db_path.display()
        ));
    }
    Ok(())
}

pub async fn run_tables(db_path: &Path) -> Result<()> {
    let store = RecordStore::open(db_path).await?;
    terminal::print_info(&format!("Tables in {}", db_path.display()));
    for table in Table::ALL {
        let count = store.count_records(table).await?;
        terminal::print_status(table.name(), &format!("{} rows (key: {})", count, table.id_column()));
    }
    Ok(())
}
