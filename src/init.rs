use std::fs;
use std::path::Path;

use anyhow::Context;
use log::info;

use crate::config::Config;
use crate::profile::Collection;
use crate::utils::{self, Resources};

const STARTER_COLLECTIONS: [Collection; 5] = [
    Collection::Profiles,
    Collection::Providers,
    Collection::Clients,
    Collection::Recipients,
    Collection::DefaultParams,
];

/// Writes the embedded starter collections into the data directory and, if
/// none exists yet, a blank invoice template. The starter records are meant
/// to be edited, not used as-is.
pub fn init_data(config: &Config, force: bool) -> anyhow::Result<()> {
    let data_dir = config.paths().data_dir();
    if data_dir.exists() && !force {
        anyhow::bail!(
            "data directory `{}` already exists, pass --force to overwrite it",
            data_dir.display()
        );
    }

    fs::create_dir_all(data_dir)?;
    for collection in STARTER_COLLECTIONS {
        let file = Resources::get(collection.file_name())
            .expect("starter data should be embedded in the binary");
        utils::write(config.paths().collection(collection), file.data)?;
    }
    info!("wrote starter collections to {}", data_dir.display());

    if !config.paths().template().is_file() {
        write_starter_template(config.paths().template())?;
        info!(
            "wrote starter template to {}",
            config.paths().template().display()
        );
    }

    Ok(())
}

/// A minimal template laid out to match the starter collections: provider
/// block at B3, client block at B10, invoice metadata on row 15 and the
/// iteration window starting at row 18.
fn write_starter_template(path: &Path) -> anyhow::Result<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .context("a new workbook should have one sheet")?;

    for (cell, label) in [
        ("A1", "TAX INVOICE"),
        ("A3", "Name:"),
        ("A4", "Address:"),
        ("A5", "ABN:"),
        ("A6", "Email:"),
        ("A7", "Phone:"),
        ("A9", "Bill to:"),
        ("A10", "Name:"),
        ("A11", "Address:"),
        ("A12", "Phone:"),
        ("D15", "Invoice no:"),
        ("A17", "Date"),
        ("B17", "Hours"),
        ("C17", "Rate"),
        ("D17", "Description"),
        ("E17", "Amount"),
        ("F17", "GST"),
        ("A30", "Payment"),
    ] {
        sheet.get_cell_mut(cell).set_value(label);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    umya_spreadsheet::writer::xlsx::write(&book, path)?;
    Ok(())
}
