//! Transaction record types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// One parsed payment notification, the JSON shape the default system
/// prompt instructs backends to emit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub title: String,
    pub amount: f64,
    #[serde(with = "datetime_format")]
    pub transaction_time: NaiveDateTime,
    pub publisher: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub remark: String,
}

/// Parse a `YYYYMMDD` day bound, e.g. `20250301`
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

/// Bank notifications carry `2025-01-28 13:23:08` style timestamps,
/// not RFC 3339
mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_decodes_from_prompt_shaped_json() {
        let json = r#"{
            "title": "Online payment",
            "amount": 199.0,
            "transaction_time": "2025-01-28 13:23:08",
            "publisher": "Bank of Communications",
            "type": "expense",
            "remark": "online payment"
        }"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, TransactionKind::Expense);
        assert_eq!(record.amount, 199.0);
        assert_eq!(
            record.transaction_time.format("%Y%m%d").to_string(),
            "20250128"
        );

        let round = serde_json::to_value(&record).unwrap();
        assert_eq!(round["transaction_time"], "2025-01-28 13:23:08");
        assert_eq!(round["type"], "expense");
    }

    #[test]
    fn day_bounds_parse() {
        assert_eq!(
            parse_day("20250301"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(parse_day("2025-03-01"), None);
        assert_eq!(parse_day("not a date"), None);
    }
}
