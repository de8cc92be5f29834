use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use etl_cli::types::RunReport;

pub fn print_summary(report: &RunReport) {
    println!("Stage: {}", report.stage);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Path"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for output in &report.outputs {
        table.add_row(vec![
            Cell::new(output.label).fg(Color::Cyan),
            Cell::new(output.rows),
            Cell::new(output.columns),
            Cell::new(output.path.display()),
        ]);
    }
    println!("{table}");

    print_missingness(report);

    if report.unmapped_status_count > 0 {
        println!(
            "Unmapped status values: {} (kept as normalized text)",
            report.unmapped_status_count
        );
    }
    if let Some(meta) = &report.metadata {
        println!("Rows out: {}", meta.rows_out);
        println!("Country match rate: {:.1}%", meta.country_match_rate * 100.0);
        println!("Missing created_at: {}", meta.missing_created_at);
        println!("Fingerprint: {}", meta.analytics_fingerprint);
    }
}

fn print_missingness(report: &RunReport) {
    let missing: Vec<_> = report
        .missingness
        .iter()
        .filter(|stat| stat.n_missing > 0)
        .collect();
    if missing.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Missing"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for stat in missing {
        table.add_row(vec![
            Cell::new(&stat.column),
            Cell::new(stat.n_missing).fg(Color::Yellow),
            Cell::new(format!("{:.1}%", stat.p_missing * 100.0)),
        ]);
    }
    println!();
    println!("Missingness (orders):");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
