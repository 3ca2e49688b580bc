//! Terminal summary tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

use fsrc_ingest::VisitStats;

use crate::commands::VisitListing;

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_ingest_summary(stats: &[VisitStats]) {
    if stats.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec![
        header_cell("Visit"),
        header_cell("Files"),
        header_cell("Loaded"),
        header_cell("Skipped"),
    ]);
    for index in 0..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total = VisitStats::default();
    for entry in stats {
        total.files += entry.files;
        total.loaded += entry.loaded;
        total.skipped += entry.skipped;
        table.add_row(vec![
            Cell::new(entry.visit),
            Cell::new(entry.files),
            Cell::new(entry.loaded),
            Cell::new(entry.skipped),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(total.files).add_attribute(Attribute::Bold),
        Cell::new(total.loaded).add_attribute(Attribute::Bold),
        Cell::new(total.skipped).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_visit_listing(listing: &[VisitListing]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec![header_cell("Visit"), header_cell("Files")]);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in listing {
        table.add_row(vec![Cell::new(entry.visit), Cell::new(entry.files)]);
    }
    println!("{table}");
}
