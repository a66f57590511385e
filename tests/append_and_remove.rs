//! The bounded append window: appending below existing rows, the row-range
//! limit, and clearing rows by absolute or negative index.

use chrono::NaiveDate;
use invoice_sheet::config::Config;
use invoice_sheet::{create_invoice, remove_invoice_row, CreatedInvoice, Overrides};

use pretty_assertions::assert_eq;

mod common;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).expect("date should be valid")
}

fn write(config: &Config, date: &str, append: bool) -> anyhow::Result<CreatedInvoice> {
    create_invoice(config, "default", date, &Overrides::default(), append, today())
}

#[test]
fn test_append_lands_on_the_next_row() {
    let (_dir, config) = common::setup();

    assert_eq!(write(&config, "05/03/2024", false).unwrap().row, 18);
    assert_eq!(write(&config, "06/03/2024", true).unwrap().row, 19);
    assert_eq!(write(&config, "07/03/2024", true).unwrap().row, 20);

    assert_eq!(common::read_cell(&config, "A18"), "05/03/2024");
    assert_eq!(common::read_cell(&config, "A19"), "06/03/2024");
    assert_eq!(common::read_cell(&config, "A20"), "07/03/2024");
}

#[test]
fn test_append_without_an_instance_starts_fresh() {
    let (_dir, config) = common::setup();

    let created = write(&config, "05/03/2024", true).expect("append should instantiate");
    assert_eq!(created.row, 18);
}

#[test]
fn test_full_window_refuses_another_append() {
    let (_dir, config) = common::setup();

    write(&config, "01/03/2024", false).unwrap();
    for date in ["02/03/2024", "03/03/2024", "04/03/2024", "05/03/2024"] {
        write(&config, date, true).unwrap();
    }

    let err = write(&config, "06/03/2024", true)
        .expect_err("the window holds five rows, a sixth append should fail");
    assert!(err.to_string().contains("maximum row range exceeded"));
}

#[test]
fn test_remove_by_absolute_index() {
    let (_dir, config) = common::setup();

    write(&config, "05/03/2024", false).unwrap();
    write(&config, "06/03/2024", true).unwrap();

    remove_invoice_row(&config, "default", 0).expect("remove should succeed");

    // the row is cleared in place, the one below keeps its position
    assert_eq!(common::read_cell(&config, "A18"), "");
    assert_eq!(common::read_cell(&config, "B18"), "");
    assert_eq!(common::read_cell(&config, "A19"), "06/03/2024");
}

#[test]
fn test_remove_negative_counts_back_from_the_last_row() {
    let (_dir, config) = common::setup();

    write(&config, "05/03/2024", false).unwrap();
    write(&config, "06/03/2024", true).unwrap();

    remove_invoice_row(&config, "default", -1).expect("remove should succeed");

    assert_eq!(common::read_cell(&config, "A18"), "05/03/2024");
    assert_eq!(common::read_cell(&config, "A19"), "");
}

#[test]
fn test_remove_outside_the_window_is_refused() {
    let (_dir, config) = common::setup();

    write(&config, "05/03/2024", false).unwrap();

    let err = remove_invoice_row(&config, "default", 6)
        .expect_err("row 24 is below the window and should be refused");
    assert!(err.to_string().contains("outside the window"));
}

#[test]
fn test_extreme_indices_are_reported_as_out_of_range() {
    let (_dir, config) = common::setup();

    write(&config, "05/03/2024", false).unwrap();

    for index in [i64::MAX - 7, i64::MIN] {
        let err = remove_invoice_row(&config, "default", index)
            .expect_err("extreme indices should fail the bounds check, not overflow");
        assert!(err.to_string().contains("outside the window"));
    }
}

#[test]
fn test_remove_from_an_empty_window() {
    let (_dir, config) = common::setup();

    common::engine(&config)
        .instantiate()
        .expect("instantiation should succeed");

    let err = remove_invoice_row(&config, "default", -1)
        .expect_err("there is no row to count back from");
    assert!(err.to_string().contains("nothing to remove"));
}
