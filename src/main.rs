use std::env;
use std::ffi::OsStr;
use std::io::{self, Write as _};
use std::path::PathBuf;

use chrono::Local;
use comfy_table::Table;
use log::error;
use seahorse::{App, Command, Context, Flag, FlagType};

use invoice_sheet::config::Config;
use invoice_sheet::invoice::{self, Overrides, Preview};
use invoice_sheet::profile::ProfileStore;
use invoice_sheet::session::Session;
use invoice_sheet::{export, init};

fn set_env_if_absent<K: AsRef<OsStr>, V: AsRef<OsStr>>(var: K, default: impl FnOnce() -> V) {
    if env::var(var.as_ref()).is_err() {
        env::set_var(var, default());
    }
}

fn main() {
    set_env_if_absent("RUST_APP_LOG", || "info");
    color_backtrace::install();
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    run();
}

mod seahorse_exts {
    use std::path::PathBuf;

    use anyhow::Context as _;
    use seahorse::Context;

    pub trait ContextExt {
        fn context(&self) -> &Context;

        fn required_string_flag(&self, name: &str) -> Result<String, anyhow::Error> {
            self.context()
                .string_flag(name)
                .with_context(|| anyhow::anyhow!("missing required flag \"{}\"", name))
        }

        fn required_path_flag(&self, name: &str) -> Result<PathBuf, anyhow::Error> {
            self.required_string_flag(name).map(PathBuf::from)
        }
    }

    impl ContextExt for Context {
        fn context(&self) -> &Context {
            self
        }
    }
}

use seahorse_exts::ContextExt;

/// seahorse actions are plain fn pointers, so each command wraps its
/// fallible action in a non-capturing closure routed through here.
fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

const DEFAULT_CONFIG: &str = "invoice.toml";

fn config_flag() -> Flag {
    Flag::new("config", FlagType::String)
        .description("[optional] Path to the config file. Default: `invoice.toml`")
}

fn config_path(context: &Context) -> PathBuf {
    context
        .required_path_flag("config")
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG))
}

fn load_config(context: &Context) -> anyhow::Result<Config> {
    Config::from_toml_file(config_path(context))
}

fn print_preview(preview: &Preview) {
    let mut table = Table::new();
    for (offset, row) in preview.rows().iter().enumerate() {
        let mut cells = vec![(preview.first_row() + offset as u32).to_string()];
        cells.extend(row.iter().cloned());
        table.add_row(cells);
    }
    println!("{table}");
}

#[cfg(feature = "lettre")]
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    use std::io::BufRead;

    print!("{} (y/n) ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn write_action(context: &Context) -> anyhow::Result<()> {
    let config = load_config(context)?;

    let [profile_name, date] = context.args.as_slice() else {
        anyhow::bail!("expected exactly two arguments: <profile> <date>");
    };

    let overrides = Overrides {
        hour: context.float_flag("hour").ok(),
        rate: context.float_flag("rate").ok(),
        description: context.string_flag("description").ok(),
        gst_code: context.string_flag("gst-code").ok(),
        invoice_number: context.string_flag("invoice-number").ok(),
        template: context.string_flag("template").ok().map(PathBuf::from),
    };
    let append = context.bool_flag("append");
    let silent = context.bool_flag("silent");

    let created = invoice::create_invoice(
        &config,
        profile_name,
        date,
        &overrides,
        append,
        Local::now().date_naive(),
    )?;

    if !silent {
        print_preview(&created.preview);
    }

    Session::new(
        profile_name,
        date,
        created.hour,
        created.rate,
        &created.description,
        &created.gst_code,
        &created.invoice_number,
        &created.template_path,
        append,
        silent,
    )
    .store(config.paths().session())?;

    Ok(())
}

fn remove_action(context: &Context) -> anyhow::Result<()> {
    let config = load_config(context)?;

    let [row_index] = context.args.as_slice() else {
        anyhow::bail!("expected exactly one argument: <row index>");
    };
    let row_index: i64 = row_index
        .parse()
        .map_err(|_| anyhow::anyhow!("row index must be an integer, got \"{}\"", row_index))?;

    let session = Session::load(config.paths().session())?;
    let preview = invoice::remove_invoice_row(&config, session.profile_name(), row_index)?;
    print_preview(&preview);

    Ok(())
}

fn export_action(context: &Context) -> anyhow::Result<()> {
    let config = load_config(context)?;
    let mut session = Session::load(config.paths().session())?;

    let store = ProfileStore::new(config.paths().data_dir());
    let resolved = store.resolve_profile(session.profile_name())?;

    let pdf_path = export::pdf_output_path(&config, &resolved, session.invoice_number())?;
    export::export_pdf(&config, &pdf_path)?;
    println!("exported {}", pdf_path.display());

    session.set_pdf_path(pdf_path);
    session.store(config.paths().session())?;

    Ok(())
}

#[cfg(feature = "lettre")]
fn send_action(context: &Context) -> anyhow::Result<()> {
    let config = load_config(context)?;
    let session = Session::load(config.paths().session())?;

    let mail = config
        .mail()
        .ok_or_else(|| anyhow::anyhow!("missing [mail] section in the config file"))?;

    let store = ProfileStore::new(config.paths().data_dir());
    let resolved = store.resolve_profile(session.profile_name())?;
    let message = invoice::resolve_message(&resolved, Local::now().date_naive())?;

    let attachment = session.pdf_path().ok_or_else(|| {
        anyhow::anyhow!("no exported invoice in this session, run `export` first")
    })?;

    println!("To:      {}", message.email);
    println!("Subject: {}", message.subject);
    println!("{}", message.body);
    println!("Attachment: {}", attachment.display());

    if !context.bool_flag("silent") && !confirm("Send email?")? {
        println!("Aborted.");
        return Ok(());
    }

    if !context.bool_flag("skip") {
        mail.validate()?;
    }

    mail.send_invoice(&message.email, &message.subject, &message.body, attachment)?;
    println!("Email sent successfully!");

    invoice::clean_up(&config)?;
    log::info!("cleaned up the working instance");

    Ok(())
}

fn init_action(context: &Context) -> anyhow::Result<()> {
    let config_file = config_path(context);
    if !config_file.is_file() {
        let template = invoice_sheet::config_template();
        std::fs::write(&config_file, template)?;
        println!("wrote starter config to {}", config_file.display());
    }

    let config = Config::from_toml_file(&config_file)?;
    init::init_data(&config, context.bool_flag("force"))?;
    println!(
        "starter data ready in {}, edit it before writing real invoices",
        config.paths().data_dir().display()
    );

    Ok(())
}

fn run() {
    let args: Vec<String> = env::args().collect();

    let write_command = Command::new("write")
        .usage(format!("{} write [flags] <profile> <date>", args[0]))
        .description("Creates an invoice from a profile, or appends a row with --append.")
        .flag(config_flag())
        .flag(Flag::new("hour", FlagType::Float).description("Overwrite hours worked."))
        .flag(Flag::new("rate", FlagType::Float).description("Overwrite the hourly rate."))
        .flag(Flag::new("description", FlagType::String).description("Overwrite the description."))
        .flag(Flag::new("gst-code", FlagType::String).description("Overwrite the GST code."))
        .flag(
            Flag::new("invoice-number", FlagType::String)
                .description("Overwrite the invoice number (used verbatim)."),
        )
        .flag(Flag::new("template", FlagType::String).description("Overwrite the template path."))
        .flag(
            Flag::new("append", FlagType::Bool)
                .alias("a")
                .description("Append a row to the existing invoice instead of starting fresh."),
        )
        .flag(Flag::new("silent", FlagType::Bool).description("Skip the preview."))
        .action(|context| exit_on_error(write_action(context)));

    let remove_command = Command::new("remove")
        .usage(format!("{} remove [flags] <row index>", args[0]))
        .description("Clears a row of the current invoice. 0 is the first row, -1 the last.")
        .flag(config_flag())
        .action(|context| exit_on_error(remove_action(context)));

    let export_command = Command::new("export")
        .usage(format!("{} export [flags]", args[0]))
        .description("Exports the current invoice to a pdf.")
        .flag(config_flag())
        .action(|context| exit_on_error(export_action(context)));

    let init_command = Command::new("init")
        .usage(format!("{} init [flags]", args[0]))
        .description("Writes starter config and profile data to get going.")
        .flag(config_flag())
        .flag(Flag::new("force", FlagType::Bool).description("Overwrite existing profile data."))
        .action(|context| exit_on_error(init_action(context)));

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [command] [args]", args[0]))
        .command(write_command)
        .command(remove_command)
        .command(export_command)
        .command(init_command);

    #[cfg(feature = "lettre")]
    let app = app.command(
        Command::new("send")
            .usage(format!("{} send [flags]", args[0]))
            .description("Emails the exported invoice to the profile's recipient.")
            .flag(config_flag())
            .flag(
                Flag::new("skip", FlagType::Bool)
                    .alias("s")
                    .description("Skip the smtp login check."),
            )
            .flag(Flag::new("silent", FlagType::Bool).description("Send without confirmation."))
            .action(|context| exit_on_error(send_action(context))),
    );

    app.run(args);

    if let Err(e) = io::stdout().flush() {
        error!("{:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // command wrappers must stay non-capturing, or they stop coercing to
    // seahorse's plain fn-pointer `Action` type
    #[test]
    fn test_command_wrappers_are_plain_actions() {
        #[cfg_attr(not(feature = "lettre"), allow(unused_mut))]
        let mut actions: Vec<seahorse::Action> = vec![
            |context| exit_on_error(write_action(context)),
            |context| exit_on_error(remove_action(context)),
            |context| exit_on_error(export_action(context)),
            |context| exit_on_error(init_action(context)),
        ];

        #[cfg(feature = "lettre")]
        actions.push(|context| exit_on_error(send_action(context)));

        assert!(!actions.is_empty());
    }
}
