//! CSV interchange for transaction sets.
//!
//! Export writes the fixed header and quotes every field, doubling internal
//! quotes (RFC 4180 minimal escaping). Import is best-effort per row: short
//! rows default their missing trailing fields, no single row aborts the
//! file, and quoted fields may contain embedded commas.

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use crate::errors::ExpenseError;
use crate::ledger::{new_id, parse_amount, MonthKey, Repeat, Transaction};

pub const CSV_HEADER: [&str; 8] = [
    "id",
    "date",
    "description",
    "amount",
    "category",
    "payment",
    "tag",
    "repeat",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Export filename for a month's transactions.
pub fn export_file_name(month: MonthKey) -> String {
    format!("expenses-{month}.csv")
}

/// Serializes transactions to CSV with every field quoted.
pub fn to_csv<'a, I>(transactions: I) -> Result<String, ExpenseError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    // The header row stays bare; only data rows get the always-quote style.
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    for tx in transactions {
        writer.write_record([
            tx.id.clone(),
            tx.date.format(DATE_FORMAT).to_string(),
            tx.description.clone(),
            format!("{:.2}", tx.amount),
            tx.category.clone(),
            tx.payment.clone(),
            tx.tag.clone(),
            tx.repeat.to_string(),
        ])?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExpenseError::Io(err.into_error()))?;
    let body = String::from_utf8_lossy(&bytes);
    Ok(format!("{}\n{}", CSV_HEADER.join(","), body))
}

/// Parses CSV text into transactions, one per data line.
///
/// Field defaults per row: blank id gets a generated one, a blank or
/// unparsable date becomes `today`, the amount is numeric-coerced (zero on
/// garbage), a blank category becomes "Other", payment and tag default to
/// empty, and an unknown repeat becomes `none`.
pub fn from_csv(text: &str, today: NaiveDate) -> Result<Vec<Transaction>, ExpenseError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut transactions = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable CSV row");
                continue;
            }
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        transactions.push(row_to_transaction(&record, today));
    }
    Ok(transactions)
}

fn row_to_transaction(record: &StringRecord, today: NaiveDate) -> Transaction {
    let field = |index: usize| record.get(index).unwrap_or("").trim().to_string();

    let raw_id = field(0);
    let id = if raw_id.is_empty() { new_id() } else { raw_id };
    let date = NaiveDate::parse_from_str(&field(1), DATE_FORMAT).unwrap_or(today);
    let raw_category = field(4);
    let category = if raw_category.is_empty() {
        "Other".to_string()
    } else {
        raw_category
    };

    Transaction {
        id,
        date,
        description: field(2),
        amount: parse_amount(&field(3)),
        category,
        payment: field(5),
        tag: field(6),
        repeat: Repeat::parse(&field(7)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(id: &str, description: &str, amount: f64) -> Transaction {
        TransactionDraft {
            id: Some(id.into()),
            date: Some(date(2024, 3, 5)),
            description: description.into(),
            amount,
            category: "Food".into(),
            payment: "Cash".into(),
            tag: "work".into(),
            repeat: Repeat::Weekly,
            ..TransactionDraft::default()
        }
        .materialize(date(2024, 3, 5))
    }

    #[test]
    fn export_quotes_every_field() {
        let tx = sample("t1", "Coffee", 45.0);
        let csv = to_csv([&tx]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,description,amount,category,payment,tag,repeat"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"t1\",\"2024-03-05\",\"Coffee\",\"45.00\",\"Food\",\"Cash\",\"work\",\"weekly\""
        );
    }

    #[test]
    fn export_doubles_internal_quotes() {
        let tx = sample("t1", "the \"good\" coffee", 45.0);
        let csv = to_csv([&tx]).unwrap();
        assert!(csv.contains("\"the \"\"good\"\" coffee\""));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let original = vec![
            sample("t1", "Coffee", 45.0),
            sample("t2", "Grocery", 350.25),
        ];
        let csv = to_csv(&original).unwrap();
        let parsed = from_csv(&csv, date(2024, 4, 1)).unwrap();
        assert_eq!(parsed.len(), 2);
        for (got, want) in parsed.iter().zip(&original) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.date, want.date);
            assert_eq!(got.description, want.description);
            assert_eq!(got.amount, want.amount);
            assert_eq!(got.category, want.category);
            assert_eq!(got.payment, want.payment);
            assert_eq!(got.tag, want.tag);
            assert_eq!(got.repeat, want.repeat);
        }
    }

    #[test]
    fn embedded_comma_stays_in_one_field() {
        let csv = "id,date,description,amount,category,payment,tag,repeat\n\
                   \"t1\",\"2024-03-05\",\"Lunch, with client\",\"120.00\",\"Food\",\"Card\",\"\",\"none\"\n";
        let parsed = from_csv(csv, date(2024, 4, 1)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].description, "Lunch, with client");
        assert_eq!(parsed[0].amount, 120.0);
    }

    #[test]
    fn blank_fields_take_documented_defaults() {
        let csv = "id,date,description,amount,category,payment,tag,repeat\n\
                   \"\",\"\",\"Mystery\",\"\",\"\",\"\",\"\",\"\"\n";
        let today = date(2024, 4, 1);
        let parsed = from_csv(csv, today).unwrap();
        assert_eq!(parsed.len(), 1);
        let tx = &parsed[0];
        assert!(!tx.id.is_empty());
        assert_eq!(tx.date, today);
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.category, "Other");
        assert_eq!(tx.payment, "");
        assert_eq!(tx.tag, "");
        assert_eq!(tx.repeat, Repeat::None);
    }

    #[test]
    fn short_rows_default_missing_trailing_fields() {
        let csv = "id,date,description,amount,category,payment,tag,repeat\n\
                   \"t1\",\"2024-03-05\",\"Coffee\",\"45.00\"\n";
        let parsed = from_csv(csv, date(2024, 4, 1)).unwrap();
        assert_eq!(parsed.len(), 1);
        let tx = &parsed[0];
        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.amount, 45.0);
        assert_eq!(tx.category, "Other");
        assert_eq!(tx.repeat, Repeat::None);
    }

    #[test]
    fn crlf_and_invalid_values_are_tolerated() {
        let csv = "id,date,description,amount,category,payment,tag,repeat\r\n\
                   \"t1\",\"not-a-date\",\"Thing\",\"abc\",\"Bills\",\"\",\"\",\"fortnightly\"\r\n";
        let today = date(2024, 4, 1);
        let parsed = from_csv(csv, today).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].date, today);
        assert_eq!(parsed[0].amount, 0.0);
        assert_eq!(parsed[0].repeat, Repeat::None);
    }

    #[test]
    fn export_file_name_embeds_month_key() {
        let month = MonthKey::new(2024, 3).unwrap();
        assert_eq!(export_file_name(month), "expenses-2024-03.csv");
    }
}
