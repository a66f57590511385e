use std::fs;
use std::path::Path;

use invoice_sheet::config::Config;
use invoice_sheet::sheet::SheetEngine;
use tempfile::TempDir;

const PROVIDERS: &str = r#"[
    {
        "id": 0,
        "name": "Acme",
        "datas": [
            { "label": "name", "value": "Acme", "location": "b3", "type": "string" },
            { "label": "abn", "value": "51824753556", "location": "b5", "type": "string" },
            { "label": "note", "value": "not written anywhere", "location": "", "type": "string" }
        ]
    }
]"#;

const CLIENTS: &str = r#"[
    {
        "id": 0,
        "name": "Globex",
        "datas": [
            { "label": "name", "value": "Globex", "location": "b10", "type": "string" }
        ]
    }
]"#;

const RECIPIENTS: &str = r#"[
    {
        "id": 0,
        "name": "pm",
        "description": "project manager",
        "email": "pm@globex.example",
        "subject": "Invoice from {{provider.0.name}} - {{yymmdd}}",
        "body": "Hi,\n\nplease find the invoice from {{provider.name}} attached.\n"
    }
]"#;

const DEFAULT_PARAMS: &str = r#"[
    {
        "id": 0,
        "name": "default",
        "description": "default parameters for invoice",
        "invoice_date": {
            "label": "invoice_date",
            "value": "dd/mm/yyyy",
            "location": "f15",
            "type": "string"
        },
        "invoice_number": {
            "label": "invoice_number",
            "value": "INV-{{yymmdd}}",
            "location": "e15",
            "type": "string"
        },
        "iteration": {
            "start_row": 18,
            "date": { "column": "a", "value": null },
            "unit": { "column": "b", "value": 6 },
            "rate": { "column": "c", "value": 40 },
            "description": { "column": "d", "value": "Service" },
            "amount": { "column": "e", "value": null },
            "gst_code": { "column": "f", "value": "Free" }
        }
    }
]"#;

const PROFILES: &str = r#"[
    {
        "id": 0,
        "name": "default",
        "params": "default",
        "provider": "Acme",
        "client": "Globex",
        "recipient": "pm"
    }
]"#;

const CONFIG: &str = concat!(
    "[paths]\n",
    "data_dir = \"data\"\n",
    "template = \"template.xlsx\"\n",
    "instance = \"instance.xlsx\"\n",
    "output_dir = \"out\"\n",
    "session = \"session.json\"\n",
);

/// Lays out a complete working directory (collections, template, config) in
/// a fresh temp dir. The dir must stay alive for as long as the config is
/// used.
pub fn setup() -> (TempDir, Config) {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let base = dir.path();

    let data_dir = base.join("data");
    fs::create_dir_all(&data_dir).expect("data dir should be creatable");
    for (file_name, contents) in [
        ("providers.json", PROVIDERS),
        ("clients.json", CLIENTS),
        ("recipients.json", RECIPIENTS),
        ("default_params.json", DEFAULT_PARAMS),
        ("profiles.json", PROFILES),
    ] {
        fs::write(data_dir.join(file_name), contents).expect("collection should be writable");
    }

    write_template(&base.join("template.xlsx"));
    fs::write(base.join("invoice.toml"), CONFIG).expect("config should be writable");

    let config =
        Config::from_toml_file(base.join("invoice.toml")).expect("fixture config should load");

    (dir, config)
}

fn write_template(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new workbook has one sheet");

    for (cell, label) in [
        ("A17", "Date"),
        ("B17", "Hours"),
        ("C17", "Rate"),
        ("D17", "Description"),
        ("E17", "Amount"),
        ("F17", "GST"),
    ] {
        sheet.get_cell_mut(cell).set_value(label);
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).expect("template should be writable");
}

#[allow(dead_code)]
pub fn engine(config: &Config) -> SheetEngine {
    SheetEngine::new(config.paths().template(), 0, config.paths().instance())
}

#[allow(dead_code)]
pub fn read_cell(config: &Config, cell: &str) -> String {
    engine(config)
        .read_cell(&cell.parse().expect("cell reference should be valid"))
        .expect("cell should be readable")
}
