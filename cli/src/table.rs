use fleetdash_core::{Report, Section};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn render_section(section: &Section) -> String {
    let mut builder = Builder::default();
    builder.push_record(section.columns.iter().map(|c| c.to_string()));
    for row in &section.rows {
        builder.push_record(row.values().map(|v| v.to_string()));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub fn print_report(report: &Report) {
    for section in &report.sections {
        if !section.title.is_empty() {
            println!("\n\x1b[1;36m{}\x1b[0m", section.title);
        }
        if section.rows.is_empty() {
            println!("  (aucune donnée)");
            continue;
        }
        println!("{}", render_section(section));
    }
}
