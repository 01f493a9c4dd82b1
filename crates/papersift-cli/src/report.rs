//! Tabular report output: console table or delimited file

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{
    Cell, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use papersift_pubmed::{COLUMNS, OutputRecord};

/// Console table of the report rows.
pub fn render_table(records: &[OutputRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(COLUMNS.iter().map(|c| Cell::new(c).fg(Color::Cyan)));
    for record in records {
        table.add_row(record.to_row());
    }
    table
}

/// Write header + rows as delimited text.
pub fn write_delimited<W: Write>(writer: W, records: &[OutputRecord], delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    out.write_record(COLUMNS)?;
    for record in records {
        out.write_record(record.to_row())?;
    }
    out.flush()?;
    Ok(())
}

/// Write the report to `path`, replacing any existing file.
pub fn write_file(path: &Path, records: &[OutputRecord], delimiter: char) -> Result<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter {delimiter:?} is not a single ASCII character"))?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_delimited(file, records, delimiter)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
