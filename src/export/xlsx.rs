use crate::core::error::ExportError;
use crate::models::entry::Entry;
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

const HEADERS: [&str; 10] = [
    "id",
    "user_id",
    "name",
    "serial_numbers",
    "id_number",
    "phone_number",
    "van_shop",
    "allocation_date",
    "location",
    "created_at",
];

fn entry_to_row(entry: &Entry) -> [String; 10] {
    [
        entry.id.clone(),
        entry.data.user_id.clone(),
        entry.data.name.clone(),
        entry.data.serial_numbers.clone(),
        entry.data.id_number.clone(),
        entry.data.phone_number.clone(),
        entry.data.van_shop.clone(),
        entry.data.allocation_date.clone(),
        entry.data.location.clone(),
        entry.created_at.to_rfc3339(),
    ]
}

/// Write `entries` to an "Entries" sheet at `path`: a header row then one row
/// per entry. Returns the number of data rows written.
pub fn export_entries(entries: &[Entry], path: &Path) -> Result<usize, ExportError> {
    info!(path = %path.display(), rows = entries.len(), "Exporting entries to XLSX");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Entries")?;

    if entries.is_empty() {
        worksheet.write(0, 0, "No data available")?;
        workbook.save(path)?;
        return Ok(0);
    }

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    let cell_format = Format::new().set_border(FormatBorder::Thin).set_text_wrap();

    for (index, entry) in entries.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, value) in entry_to_row(entry).iter().enumerate() {
            worksheet.write_with_format(row, col as u16, value.as_str(), &cell_format)?;
            let longest = value.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            widths[col] = widths[col].max(longest);
        }
    }

    set_column_widths(worksheet, &widths)?;
    workbook.save(path)?;

    Ok(entries.len())
}

fn set_column_widths(worksheet: &mut Worksheet, widths: &[usize]) -> Result<(), ExportError> {
    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (*width).min(60) as f64 + 2.0)?;
    }
    Ok(())
}
