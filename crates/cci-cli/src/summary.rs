use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    if let Some(outputs) = &result.outputs {
        println!("MOLES tags: {}", outputs.moles_csv.display());
        println!("ESGF DRS: {}", outputs.drs_json.display());
    } else {
        println!("Output suppressed");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Run"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Datasets processed"),
        Cell::new(result.summary.datasets_processed),
    ]);
    table.add_row(vec![
        Cell::new("DRS entries"),
        Cell::new(result.summary.drs.len()),
    ]);
    table.add_row(vec![
        Cell::new("Unresolved terms"),
        count_cell(result.summary.not_found.len(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Failed datasets"),
        count_cell(result.summary.failures, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.2}s", result.elapsed.as_secs_f64())),
    ]);
    println!("{table}");

    if !result.summary.not_found.is_empty() {
        println!("Unresolved terms:");
        for message in &result.summary.not_found {
            println!("- {message}");
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
