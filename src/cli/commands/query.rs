//! Query command handlers: run catalog queries and list their names.

use sea_orm::JsonValue;

use crate::config::Config;
use crate::db::{QueryTable, Store};

pub async fn cmd_run_query(config: &Config, name: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let table = store.run_query(name).await?;

    if table.rows.is_empty() {
        println!("(no rows)");
        return Ok(());
    }

    print_table(&table);
    println!();
    println!("{} row(s)", table.rows.len());

    Ok(())
}

pub async fn cmd_list_queries() -> anyhow::Result<()> {
    println!("Available queries:");
    for name in Store::query_names() {
        println!("  - {name}");
    }
    Ok(())
}

fn print_table(table: &QueryTable) {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            table
                .rows
                .iter()
                .map(|row| cell_text(&row[i]).len())
                .chain(std::iter::once(col.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| format!("{col:<w$}"))
        .collect();
    println!("{}", header.join("  "));
    println!("{:-<1$}", "", header.join("  ").len());

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, &w)| format!("{:<w$}", cell_text(value)))
            .collect();
        println!("{}", cells.join("  "));
    }
}

fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
