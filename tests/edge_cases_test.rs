//! Edge case tests for manifest ingest and field handling.

use ach_builder::{ingest_csv, BuildOptions, FileBuilder, FileConfig, FixedClock, IngestReport};
use std::io::Cursor;

const HEADER: &str = "company_name,company_identification,company_entry_description,\
standard_entry_class_code,effective_entry_date,service_class_code,transaction_code,rdfi_routing,\
rdfi_account_number,amount,individual_name,individual_identification_number,\
payment_related_information\n";

fn run_csv(rows: &str) -> (IngestReport, String) {
    let config = FileConfig::new("123456780", "123456780", "YOUR BANK", "YOUR COMPANY");
    let clock = FixedClock::at(2014, 9, 2, 1, 23).unwrap();
    let mut file = FileBuilder::with_clock(&config, BuildOptions::default(), clock).unwrap();

    let csv = format!("{}{}", HEADER, rows);
    let report = ingest_csv(&mut file, Cursor::new(csv)).unwrap();
    (report, file.render().unwrap())
}

fn entry_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|line| line.starts_with('6')).collect()
}

// ==================== AMOUNT EDGE CASES ====================

#[test]
fn test_zero_amount_prenote() {
    let (report, output) = run_csv("ACME,1234567890,PRENOTE,PPD,,,23,123456780,1,0,ALICE,,\n");

    assert!(report.skipped.is_empty());
    assert_eq!(&entry_lines(&output)[0][29..39], "0000000000");
}

#[test]
fn test_amount_with_one_decimal_place() {
    let (_, output) = run_csv("ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,73.5,ALICE,,\n");
    assert_eq!(&entry_lines(&output)[0][29..39], "0000007350");
}

#[test]
fn test_amount_with_three_decimal_places_is_skipped() {
    let (report, output) = run_csv("ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,1.005,ALICE,,\n");

    assert_eq!(report.skipped.len(), 1);
    assert!(entry_lines(&output).is_empty());
}

#[test]
fn test_negative_amount_is_skipped() {
    let (report, _) = run_csv("ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,-1.00,ALICE,,\n");
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("negative"));
}

#[test]
fn test_amount_too_wide_for_field_is_skipped() {
    let (report, _) = run_csv(
        "ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,100000000.00,ALICE,,\n",
    );
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("amount"));
}

// ==================== WHITESPACE AND ROUTING ====================

#[test]
fn test_whitespace_is_trimmed() {
    let (report, output) = run_csv(
        "  ACME ,1234567890, PAYROLL ,PPD,,,  22 , 123456780 , 1 , 1.00 ,  ALICE  ,,\n",
    );

    assert!(report.skipped.is_empty());
    let entry = entry_lines(&output)[0];
    assert_eq!(&entry[1..12], "22123456780");
    assert_eq!(&entry[54..76], "ALICE                 ");
}

#[test]
fn test_short_routing_number_is_zero_padded() {
    let (report, output) = run_csv("ACME,1234567890,PAYROLL,PPD,,,22,23456780,1,1.00,ALICE,,\n");

    assert!(report.skipped.is_empty());
    assert_eq!(&entry_lines(&output)[0][3..12], "023456780");
}

#[test]
fn test_disallowed_characters_are_stripped_from_names() {
    let (report, output) = run_csv(
        "ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,1.00,ZOË,,\n\
ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,1.00,\"SMITH, J. #2\",,\n",
    );

    assert!(report.skipped.is_empty());
    let entries = entry_lines(&output);
    assert_eq!(&entries[0][54..76], "ZO                    ");
    assert_eq!(&entries[1][54..76], "SMITH J. 2            ");
}

// ==================== BATCHING ====================

#[test]
fn test_changing_batch_columns_starts_a_new_batch() {
    let (report, output) = run_csv(
        "ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,1.00,ALICE,,\n\
ACME,1234567890,BONUS,PPD,,,22,123456780,1,1.00,BOB,,\n\
ACME,1234567890,PAYROLL,PPD,,,22,123456780,1,1.00,CAROL,,\n",
    );

    assert_eq!(report.batches, 3);
    let batch_numbers: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with('5'))
        .map(|line| &line[87..94])
        .collect();
    assert_eq!(batch_numbers, ["0000001", "0000002", "0000003"]);
}

#[test]
fn test_lowercase_entry_class_code() {
    let (report, _) = run_csv("ACME,1234567890,PAYROLL,web,,,22,123456780,1,1.00,ALICE,,\n");
    assert!(report.skipped.is_empty());
    assert_eq!(report.batches, 1);
}

#[test]
fn test_unknown_entry_class_code_skips_batch_rows() {
    let (report, output) = run_csv(
        "ACME,1234567890,PAYROLL,XYZ,,,22,123456780,1,1.00,ALICE,,\n\
ACME,1234567890,PAYROLL,XYZ,,,22,123456780,1,2.00,BOB,,\n",
    );

    assert_eq!(report.batches, 0);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(output.lines().count(), 10);
    assert!(output.lines().nth(1).unwrap().starts_with('9'));
}

#[test]
fn test_missing_columns_are_skipped() {
    let (report, _) = run_csv("ACME,1234567890,PAYROLL\n");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row, 2);
}

#[test]
fn test_empty_manifest_renders_header_and_control_only() {
    let (report, output) = run_csv("");

    assert_eq!(report.batches, 0);
    assert_eq!(report.entries, 0);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(
        &lines[1][..55],
        "9000000000001000000000000000000000000000000000000000000"
    );
}
