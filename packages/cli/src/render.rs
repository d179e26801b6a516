use admin::error::AdminError;
use admin::listing::Column;
use console::style;
use serde::Serialize;

/// Print the field columns of `rows` as an aligned table.
pub fn table<R>(rows: &[&R], columns: &[Column<R>]) {
    let fields: Vec<&Column<R>> = columns
        .iter()
        .filter(|c| matches!(c, Column::Field { .. }))
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| fields.iter().filter_map(|c| c.cell(row)).collect())
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain([c.title().len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = fields
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.title(), w = *w))
        .collect();
    println!("{}", style(header.join("  ")).bold());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}", w = *w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }

    if rows.is_empty() {
        println!("{}", style("No records.").dim());
    }
}

pub fn record<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn success(message: impl AsRef<str>) {
    eprintln!("{} {}", style("✔").green().bold(), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", style("!").yellow().bold(), message.as_ref());
}

/// Failure notice; admin errors use their operator-facing wording.
pub fn failure(err: &anyhow::Error) {
    let message = match err.downcast_ref::<AdminError>() {
        Some(admin) => admin.notice(),
        None => format!("{err:#}"),
    };
    eprintln!("{} {}", style("✘").red().bold(), message);
}
