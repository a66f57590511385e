//! Display formats never change the stored value, only how the sheet shows
//! it; writing under each numeric type must read back the raw number.

use invoice_sheet::sheet::{CellValue, ValueType};

use pretty_assertions::assert_eq;

mod common;

#[test]
fn test_numeric_types_keep_the_raw_value() {
    let (_dir, config) = common::setup();

    let engine = common::engine(&config);
    engine.instantiate().expect("instantiation should succeed");

    for (cell, value, value_type, expected) in [
        ("B2", 42.0, ValueType::Int, "42"),
        ("B3", 12345.678, ValueType::Scientific, "12345.678"),
        ("B4", 6.5, ValueType::Float, "6.5"),
        ("B5", 292.5, ValueType::Currency, "292.5"),
    ] {
        engine
            .write_cell(
                &cell.parse().expect("cell reference should be valid"),
                &CellValue::Number(value),
                value_type,
            )
            .expect("write should succeed");

        assert_eq!(common::read_cell(&config, cell), expected);
    }
}

#[test]
fn test_format_codes_per_type() {
    assert_eq!(ValueType::String.format_code(), None);
    assert_eq!(ValueType::Float.format_code(), Some("#,##0.00"));
    assert_eq!(ValueType::Int.format_code(), Some("#,##0"));
    assert_eq!(ValueType::Scientific.format_code(), Some("0.00E+00"));
    assert_eq!(ValueType::Currency.format_code(), Some("$#,##0.00"));
}
