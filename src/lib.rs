mod utils;

pub mod config;
pub mod export;
pub mod init;
pub mod invoice;
pub mod mail;
pub mod profile;
pub mod session;
pub mod sheet;
pub mod template;

pub use invoice::{
    clean_up, create_invoice, remove_invoice_row, resolve_message, CreatedInvoice, Message,
    Overrides, Preview,
};

/// The embedded starter config, written by `init` when no config file exists
/// yet.
pub fn config_template() -> std::borrow::Cow<'static, [u8]> {
    utils::Resources::get("invoice.toml")
        .expect("the starter config should be embedded in the binary")
        .data
}
