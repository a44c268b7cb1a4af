use std::path::PathBuf;

use ledgerprep_core::{CanonicalRecord, CsvSink, RecordSink};
use ledgerprep_ingest::{IngestError, ParseOutcome, ParserRegistry, StatementParser};
use ledgerprep_ingest::{FnbParser, StandardBankParser};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn parse(hint: Option<&str>, name: &str) -> Vec<CanonicalRecord> {
    ParserRegistry::default().parse(hint, &fixture(name)).unwrap()
}

fn amounts(rec: &CanonicalRecord) -> (&str, &str) {
    (rec.receipt.as_str(), rec.disbursement.as_str())
}

#[test]
fn generic_end_to_end() {
    let records = parse(None, "generic.csv");
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].transaction_date, "2023-05-01");
    assert_eq!(records[1].transaction_date, "2023-05-01");
    assert_eq!(amounts(&records[0]), ("45.00", "0.00"));
    assert_eq!(amounts(&records[1]), ("0.00", "1200.00"));
    assert_eq!(records[0].external_reference, "REF001");
    assert_eq!(records[1].description, "Rent");
}

#[test]
fn absa_rows() {
    let records = parse(None, "absa.csv");
    assert_eq!(records.len(), 3, "opening balance row is skipped");

    assert_eq!(records[0].external_transaction_id, "1");
    assert_eq!(records[0].transaction_date, "2024-01-05");
    assert_eq!(records[0].description, "ACB DEBIT ORDER MULTICHOICE 12345678");
    assert_eq!(records[0].external_reference, "12345678");
    assert_eq!(amounts(&records[0]), ("0.00", "150.00"));

    assert_eq!(amounts(&records[1]), ("2500.00", "0.00"));
    assert_eq!(records[1].external_reference, "");

    assert_eq!(records[2].transaction_date, "2024-01-08");
    assert_eq!(records[2].external_reference, "778899");
    assert_eq!(amounts(&records[2]), ("0.00", "45.50"));
}

#[test]
fn fnb_header_layout() {
    let records = parse(None, "fnb_header.csv");
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].description, "POS PURCHASE CHECKERS");
    assert_eq!(amounts(&records[0]), ("0.00", "150.00"));

    assert_eq!(records[1].external_reference, "554433");
    assert_eq!(amounts(&records[1]), ("25000.00", "0.00"));

    assert_eq!(records[2].external_transaction_id, "3");
    assert_eq!(records[2].external_reference, "99887");
    assert_eq!(records[2].transaction_date, "2024-01-08");
}

#[test]
fn fnb_metadata_above_header_is_skipped() {
    let records = parse(None, "fnb_metadata.csv");
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].external_transaction_id, "1");
    assert_eq!(records[0].transaction_date, "2024-01-05");
    assert_eq!(records[0].description, "POS PURCHASE CHECKERS");
    assert_eq!(records[1].external_transaction_id, "2");
    assert_eq!(records[1].external_reference, "554433");
    assert!(records.iter().all(|r| r.transaction_date != "2024-01-31"));
}

#[test]
fn fnb_debit_credit_columns() {
    let records = parse(None, "fnb_debit_credit.csv");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].transaction_date, "2024-01-05");
    assert_eq!(amounts(&records[0]), ("0.00", "150.00"));
    assert_eq!(amounts(&records[1]), ("25000.00", "0.00"));
}

#[test]
fn fnb_headerless_rows() {
    let records = parse(None, "fnb_headerless.txt");
    assert_eq!(records.len(), 5);
    assert_eq!(records[2].description, "FNB APP PAYMENT TRN 99887");
    assert_eq!(records[2].external_reference, "99887");
    assert_eq!(amounts(&records[2]), ("0.00", "350.00"));
    assert_eq!(amounts(&records[3]), ("4.12", "0.00"));
}

#[test]
fn fnb_without_rows_is_no_data() {
    let path = fixture("fnb_no_rows.csv");
    let outcome = FnbParser::default().parse(&path).unwrap();
    assert!(matches!(outcome, ParseOutcome::NoData { .. }));

    match ParserRegistry::default().parse(Some("FNB"), &path) {
        Err(IngestError::NoData { parser, .. }) => assert_eq!(parser, "First National Bank"),
        other => panic!("expected NoData, got {other:?}"),
    }
}

#[test]
fn standard_bank_new_layout() {
    let records = parse(Some("Standard Bank"), "standard_new.csv");
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].transaction_date, "2024-01-05");
    assert_eq!(records[0].description, "CARD PURCHASE CHECKERS");
    assert_eq!(amounts(&records[0]), ("0.00", "150.00"));

    assert_eq!(records[1].description, "SALARY ACME LTD");
    assert_eq!(records[1].external_reference, "202401");
    assert_eq!(amounts(&records[1]), ("25000.00", "0.00"));

    // unsigned amount, Type says debit
    assert_eq!(records[2].external_reference, "998877");
    assert_eq!(amounts(&records[2]), ("0.00", "350.00"));
}

#[test]
fn standard_bank_legacy_layout() {
    let records = StandardBankParser::default()
        .parse(&fixture("standard_legacy.csv"))
        .unwrap()
        .into_records("Standard Bank", &fixture("standard_legacy.csv"))
        .unwrap();
    assert_eq!(records.len(), 3);

    let ids: Vec<&str> = records
        .iter()
        .map(|r| r.external_transaction_id.as_str())
        .collect();
    assert_eq!(ids, ["000123", "000124", "000125"]);
    assert_eq!(records[1].external_reference, "4455668");
    assert_eq!(amounts(&records[1]), ("25000.00", "0.00"));
    assert_eq!(records[2].description, "POS PURCHASE WOOLWORTHS");
}

#[test]
fn parsed_records_write_as_canonical_csv() {
    let records = parse(None, "generic.csv");
    let mut sink = CsvSink::new(Vec::new());
    sink.write_records(&records).unwrap();
    let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("Ext. Tran. ID,Ext. Ref. Nbr.,Tran. Date,Tran. Desc.,Receipt,Disbursement")
    );
    assert_eq!(lines.next(), Some("1,REF001,2023-05-01,Coffee,45.00,0.00"));
    assert_eq!(lines.next(), Some("2,REF002,2023-05-01,Rent,0.00,1200.00"));
}
