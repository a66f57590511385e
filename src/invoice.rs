use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use log::info;

use crate::config::Config;
use crate::profile::{DataItem, ProfileStore, ResolvedProfile};
use crate::sheet::{CellRef, CellValue, SheetEngine, ValueType};
use crate::template::{format_date, PlaceholderResolver};
use crate::utils::PathExt;

/// Size of the bounded append window below `iteration.start_row`.
pub const ROW_RANGE: u32 = 5;

/// Invoice dates are always the creation date in this form.
const INVOICE_DATE_PATTERN: &str = "dd/mm/yyyy";

const PREVIEW_FIRST_COLUMN: &str = "A";
const PREVIEW_LAST_COLUMN: &str = "F";

/// Caller-supplied values taking precedence over the profile's stored
/// defaults. A `None` falls back to the default; a field with neither is a
/// "value not found" error.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hour: Option<f64>,
    pub rate: Option<f64>,
    pub description: Option<String>,
    pub gst_code: Option<String>,
    pub invoice_number: Option<String>,
    pub template: Option<PathBuf>,
}

/// A rectangular window of cell texts anchored just above the iteration
/// block, for terminal display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    first_row: u32,
    rows: Vec<Vec<String>>,
}

impl Preview {
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Everything a `write` resolved, for the preview and the session cache.
#[derive(Debug, Clone)]
pub struct CreatedInvoice {
    pub date: String,
    pub hour: f64,
    pub rate: f64,
    pub description: String,
    pub gst_code: String,
    pub invoice_number: String,
    pub template_path: PathBuf,
    pub row: u32,
    pub preview: Preview,
}

fn engine_for(config: &Config, template: &Path) -> SheetEngine {
    SheetEngine::new(template, 0, config.paths().instance())
}

fn validate_template(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!("template file not found: `{}`", path.display());
    }
    if !path.has_extension("xlsx") {
        anyhow::bail!("template file `{}` must be an .xlsx file", path.display());
    }
    Ok(())
}

fn read_preview(engine: &SheetEngine, start_row: u32) -> anyhow::Result<Preview> {
    let first_row = start_row.saturating_sub(1);
    let rows = engine.read_range(
        &CellRef::new(PREVIEW_FIRST_COLUMN, first_row)?,
        &CellRef::new(PREVIEW_LAST_COLUMN, start_row + ROW_RANGE - 1)?,
    )?;

    Ok(Preview { first_row, rows })
}

fn absolute_location(item: &DataItem) -> anyhow::Result<CellRef> {
    let location = item
        .location()
        .ok_or_else(|| anyhow::anyhow!("\"{}\" has no cell location configured", item.label()))?;

    location
        .parse()
        .with_context(|| format!("bad cell location for \"{}\"", item.label()))
}

/// Creates (or appends a line to) the working invoice. All steps of the
/// operation share one resolved profile; any failure aborts the command, as
/// a partially written instance would corrupt the invoice.
pub fn create_invoice(
    config: &Config,
    profile_name: &str,
    date: &str,
    overrides: &Overrides,
    append: bool,
    now: NaiveDate,
) -> anyhow::Result<CreatedInvoice> {
    let store = ProfileStore::new(config.paths().data_dir());
    let resolved = store.resolve_profile(profile_name)?;
    let iteration = resolved.params().iteration();

    // overrides win, stored defaults fill in, neither is an error
    let hour = overrides
        .hour
        .or_else(|| iteration.unit().default_number())
        .context("hour value not found: no override and no stored default")?;
    let rate = overrides
        .rate
        .or_else(|| iteration.rate().default_number())
        .context("rate value not found: no override and no stored default")?;
    let description = overrides
        .description
        .clone()
        .or_else(|| iteration.description().default_text())
        .context("description value not found: no override and no stored default")?;
    let gst_code = overrides
        .gst_code
        .clone()
        .or_else(|| iteration.gst_code().default_text())
        .context("gst code value not found: no override and no stored default")?;

    let template_path = overrides
        .template
        .clone()
        .unwrap_or_else(|| config.paths().template().to_path_buf());
    validate_template(&template_path)?;

    // the stored invoice number default is itself a small template; an
    // override is used verbatim
    let resolver = PlaceholderResolver::new(&resolved, now);
    let invoice_number = match &overrides.invoice_number {
        Some(number) => number.clone(),
        None => resolver
            .render(resolved.params().invoice_number().value())
            .context("failed to expand the default invoice number template")?,
    };

    let invoice_date = format_date(now, INVOICE_DATE_PATTERN);

    let engine = engine_for(config, &template_path);
    let row = if append {
        if !engine.is_instantiated() {
            info!("no working copy to append to, instantiating a fresh one");
            engine.instantiate()?;
        }

        engine
            .find_last_occupied_row(iteration.date().column(), iteration.start_row(), ROW_RANGE)?
            .map_or(iteration.start_row(), |last| last + 1)
    } else {
        engine.instantiate()?;
        iteration.start_row()
    };

    let amount = hour * rate;

    // iteration fields, all on the target row
    for (field, value, value_type) in [
        (iteration.date(), CellValue::from(date), ValueType::String),
        (iteration.unit(), CellValue::Number(hour), ValueType::Float),
        (iteration.rate(), CellValue::Number(rate), ValueType::Currency),
        (
            iteration.description(),
            CellValue::from(description.as_str()),
            ValueType::String,
        ),
        (
            iteration.amount(),
            CellValue::Number(amount),
            ValueType::Currency,
        ),
        (
            iteration.gst_code(),
            CellValue::from(gst_code.as_str()),
            ValueType::String,
        ),
    ] {
        engine.write_cell(&CellRef::new(field.column(), row)?, &value, value_type)?;
    }

    // invoice metadata goes to fixed cells, independent of the row
    engine.write_cell(
        &absolute_location(resolved.params().invoice_number())?,
        &CellValue::from(invoice_number.as_str()),
        ValueType::String,
    )?;
    engine.write_cell(
        &absolute_location(resolved.params().invoice_date())?,
        &CellValue::from(invoice_date.as_str()),
        ValueType::String,
    )?;

    // provider and client static fields, each at its own absolute cell
    for item in resolved
        .provider()
        .items()
        .iter()
        .chain(resolved.client().items())
    {
        if !item.is_writable() {
            continue;
        }

        engine.write_cell(
            &absolute_location(item)?,
            &CellValue::from(item.value()),
            item.value_type(),
        )?;
    }

    info!(
        "wrote invoice {} for profile \"{}\" on row {}",
        invoice_number, profile_name, row
    );

    let preview = read_preview(&engine, iteration.start_row())?;

    Ok(CreatedInvoice {
        date: date.to_string(),
        hour,
        rate,
        description,
        gst_code,
        invoice_number,
        template_path,
        row,
        preview,
    })
}

/// Clears one row of the iteration window. Negative indices count back from
/// the last occupied row, so `-1` removes the most recent line.
pub fn remove_invoice_row(
    config: &Config,
    profile_name: &str,
    row_index: i64,
) -> anyhow::Result<Preview> {
    let store = ProfileStore::new(config.paths().data_dir());
    let resolved = store.resolve_profile(profile_name)?;
    let iteration = resolved.params().iteration();

    let engine = engine_for(config, config.paths().template());
    engine.remove_row(
        row_index,
        iteration.date().column(),
        iteration.start_row(),
        ROW_RANGE,
    )?;

    read_preview(&engine, iteration.start_row())
}

/// Resolved subject, body and address for sending one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Expands the recipient's subject and body templates against the profile.
pub fn resolve_message(resolved: &ResolvedProfile, now: NaiveDate) -> anyhow::Result<Message> {
    let resolver = PlaceholderResolver::new(resolved, now);
    let recipient = resolved.recipient();

    Ok(Message {
        email: recipient.email().to_string(),
        subject: resolver
            .render(recipient.subject())
            .context("failed to resolve the mail subject template")?,
        body: resolver
            .render(recipient.body())
            .context("failed to resolve the mail body template")?,
    })
}

/// Deletes the working instance; missing instance is a no-op.
pub fn clean_up(config: &Config) -> anyhow::Result<()> {
    engine_for(config, config.paths().template()).clean_up()?;
    Ok(())
}
