use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::ExportError;
use crate::model::NormalizedItem;

pub const SHEET_NAME: &str = "Cart";

pub const HEADERS: [&str; 10] = [
    "Name",
    "Edition",
    "Language",
    "Condition",
    "Extras",
    "Quantity",
    "Unit Price",
    "Total",
    "English Name",
    "Link",
];

const COLUMN_WIDTHS: [f64; 10] = [40.0, 28.0, 12.0, 18.0, 20.0, 10.0, 12.0, 12.0, 40.0, 60.0];

const QUANTITY_COLUMN: u16 = 5;
const UNIT_PRICE_COLUMN: u16 = 6;
const TOTAL_COLUMN: u16 = 7;

pub fn build_workbook(items: &[NormalizedItem]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .context("failed to name worksheet")?;

    write_header(worksheet)?;

    let quantity_format = Format::new().set_num_format("0");
    let price_format = Format::new().set_num_format("0.00");

    for (index, item) in items.iter().enumerate() {
        let row = u32::try_from(index + 1).context("too many cart rows for one worksheet")?;

        let extras = item.extras_label();
        let text_cells = [
            item.name.as_str(),
            item.edition.as_str(),
            item.language.as_str(),
            item.condition.as_str(),
            extras.as_str(),
        ];
        for (column, value) in text_cells.into_iter().enumerate() {
            worksheet.write_string(row, column as u16, value)?;
        }

        worksheet.write_number_with_format(
            row,
            QUANTITY_COLUMN,
            f64::from(item.quantity),
            &quantity_format,
        )?;
        worksheet.write_number_with_format(
            row,
            UNIT_PRICE_COLUMN,
            decimal_cell(item.unit_price)?,
            &price_format,
        )?;
        let total = item
            .total()
            .with_context(|| format!("line total for {} is out of range", item.name))?;
        worksheet.write_number_with_format(
            row,
            TOTAL_COLUMN,
            decimal_cell(total)?,
            &price_format,
        )?;

        worksheet.write_string(row, 8, item.english_name.as_str())?;
        worksheet.write_string(row, 9, item.link.as_str())?;
    }

    let last_row = u32::try_from(items.len()).context("too many cart rows for one worksheet")?;
    worksheet
        .autofilter(0, 0, last_row, (HEADERS.len() - 1) as u16)
        .context("failed to add autofilter")?;
    worksheet
        .set_freeze_panes(1, 0)
        .context("failed to freeze header row")?;

    Ok(workbook)
}

fn write_header(worksheet: &mut Worksheet) -> Result<()> {
    let header_format = Format::new().set_bold();

    for (column, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let column = column as u16;
        worksheet
            .write_string_with_format(0, column, *header, &header_format)
            .with_context(|| format!("failed to write header {header}"))?;
        worksheet
            .set_column_width(column, width)
            .with_context(|| format!("failed to size column {header}"))?;
    }

    Ok(())
}

fn decimal_cell(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .with_context(|| format!("price {value} does not fit a spreadsheet number"))
}

/// Writes the sheet to `path`, replacing any previous file.
pub fn write_sheet(path: &Path, items: &[NormalizedItem]) -> Result<()> {
    let mut workbook = build_workbook(items)?;
    workbook.save(path).map_err(|source| ExportError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
