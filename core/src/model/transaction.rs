//! Transactions and their type-specific details.
//!
//! On the wire a transaction is a flat record with a `transaction_type` tag
//! and a free-form `metadata` object. In memory the metadata is a tagged
//! union keyed by type; absent numeric fields default to zero here, at the
//! conversion boundary, so rule code never has to.

use crate::{
    error::ComplianceError,
    model::{violation::ViolationCode, District},
    types::{Amount, FarmerId, TransactionId, YearPartition},
};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    SubsidyClaim,
    InsuranceClaim,
    FertilizerPurchase,
    CropSale,
    #[serde(other)]
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubsidyClaim => "subsidy_claim",
            Self::InsuranceClaim => "insurance_claim",
            Self::FertilizerPurchase => "fertilizer_purchase",
            Self::CropSale => "crop_sale",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Welfare scheme a transaction is filed under. Unlisted names are kept
/// verbatim so external feeds survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    PmKisan,
    Pmfby,
    Other(String),
}

impl Scheme {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PmKisan => "PM-KISAN",
            Self::Pmfby => "PMFBY",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Scheme {
    fn from(name: &str) -> Self {
        match name {
            "PM-KISAN" => Self::PmKisan,
            "PMFBY" => Self::Pmfby,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Metadata field readers that never reject a transaction: null, missing or
/// non-numeric values read as zero / absent.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    /// Whole count. Fractions round up, so a count past an integer cap stays
    /// past it; negatives read as zero.
    fn count(value: &Value, max: f64) -> f64 {
        number(value).map_or(0.0, |n| n.ceil().clamp(0.0, max))
    }

    pub fn count_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(count(&value, f64::from(u32::MAX)) as u32)
    }

    pub fn count_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(count(&value, f64::from(u8::MAX)) as u8)
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value).unwrap_or(0.0))
    }

    pub fn opt_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsidyDetails {
    /// 1..=3 for well-formed claims; 0 when missing.
    #[serde(deserialize_with = "lenient::count_u8")]
    pub installment: u8,
    #[serde(deserialize_with = "lenient::opt_amount")]
    pub farm_size_snapshot: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub event_date: Option<String>,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub report_delay_days: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub cause: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilizerDetails {
    #[serde(deserialize_with = "lenient::count_u32")]
    pub urea_bags: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub dap_bags: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub potash_bags: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSaleDetails {
    /// Free text: external feeds sell crops the generator never grows.
    #[serde(deserialize_with = "lenient::text")]
    pub crop: Option<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub quantity_quintal: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub sale_price_per_quintal: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub msp_per_quintal: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub mandi: Option<String>,
}

/// Type-specific metadata, one variant per transaction type.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionDetails {
    SubsidyClaim(SubsidyDetails),
    InsuranceClaim(InsuranceDetails),
    FertilizerPurchase(FertilizerDetails),
    CropSale(CropSaleDetails),
    Unknown,
}

impl TransactionDetails {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::SubsidyClaim(_) => TransactionType::SubsidyClaim,
            Self::InsuranceClaim(_) => TransactionType::InsuranceClaim,
            Self::FertilizerPurchase(_) => TransactionType::FertilizerPurchase,
            Self::CropSale(_) => TransactionType::CropSale,
            Self::Unknown => TransactionType::Unknown,
        }
    }

    /// Empty details for a type, every numeric field zero.
    pub fn empty(transaction_type: TransactionType) -> Self {
        match transaction_type {
            TransactionType::SubsidyClaim => Self::SubsidyClaim(SubsidyDetails::default()),
            TransactionType::InsuranceClaim => Self::InsuranceClaim(InsuranceDetails::default()),
            TransactionType::FertilizerPurchase => {
                Self::FertilizerPurchase(FertilizerDetails::default())
            }
            TransactionType::CropSale => Self::CropSale(CropSaleDetails::default()),
            TransactionType::Unknown => Self::Unknown,
        }
    }

    fn from_metadata(
        transaction_type: TransactionType,
        metadata: &Value,
    ) -> Result<Self, serde_json::Error> {
        let details = match transaction_type {
            TransactionType::SubsidyClaim => Self::SubsidyClaim(parse_metadata(metadata)?),
            TransactionType::InsuranceClaim => Self::InsuranceClaim(parse_metadata(metadata)?),
            TransactionType::FertilizerPurchase => {
                Self::FertilizerPurchase(parse_metadata(metadata)?)
            }
            TransactionType::CropSale => Self::CropSale(parse_metadata(metadata)?),
            TransactionType::Unknown => Self::Unknown,
        };
        Ok(details)
    }

    fn to_metadata(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            Self::SubsidyClaim(d) => {
                map.insert("installment".into(), d.installment.into());
                insert_some(&mut map, "farm_size_snapshot", d.farm_size_snapshot);
            }
            Self::InsuranceClaim(d) => {
                insert_some(&mut map, "event_date", d.event_date.clone());
                map.insert("report_delay_days".into(), d.report_delay_days.into());
                insert_some(&mut map, "cause", d.cause.clone());
            }
            Self::FertilizerPurchase(d) => {
                map.insert("urea_bags".into(), d.urea_bags.into());
                map.insert("dap_bags".into(), d.dap_bags.into());
                map.insert("potash_bags".into(), d.potash_bags.into());
                insert_some(&mut map, "vendor", d.vendor.clone());
            }
            Self::CropSale(d) => {
                insert_some(&mut map, "crop", d.crop.clone());
                map.insert("quantity_quintal".into(), d.quantity_quintal.into());
                map.insert(
                    "sale_price_per_quintal".into(),
                    d.sale_price_per_quintal.into(),
                );
                map.insert("msp_per_quintal".into(), d.msp_per_quintal.into());
                insert_some(&mut map, "mandi", d.mandi.clone());
            }
            Self::Unknown => {}
        }
        map
    }
}

fn parse_metadata<T>(metadata: &Value) -> Result<T, serde_json::Error>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match metadata {
        Value::Null => Ok(T::default()),
        other => T::deserialize(other),
    }
}

fn insert_some<V: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<V>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

/// An economic event tied to one farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub scheme: Option<Scheme>,
    pub farmer_id: FarmerId,
    pub district: Option<District>,
    pub date: Option<String>,
    pub amount: Amount,
    pub details: TransactionDetails,
    /// Explicit link to an earlier claim this one duplicates. Valid on any type.
    pub duplicate_of: Option<TransactionId>,
    /// Generation-time tag. The evaluator never reads it.
    pub is_violation: bool,
    pub violation_code: Option<ViolationCode>,
    pub violation_note: Option<String>,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.details.transaction_type()
    }

    pub fn year(&self) -> YearPartition {
        year_partition(self.date.as_deref())
    }

    pub fn is_scheme(&self, scheme: &Scheme) -> bool {
        self.scheme.as_ref() == Some(scheme)
    }

    pub fn installment(&self) -> Option<u8> {
        match &self.details {
            TransactionDetails::SubsidyClaim(d) => Some(d.installment),
            _ => None,
        }
    }

    /// Rejects transactions without an identity.
    pub fn validate(&self) -> Result<(), ComplianceError> {
        if self.transaction_id.trim().is_empty() {
            return Err(ComplianceError::invalid_transaction(
                "transaction_id is missing or empty",
            ));
        }
        Ok(())
    }

    /// Parse an untyped payload, failing fast on anything that is not an object.
    pub fn from_json(value: &Value) -> Result<Self, ComplianceError> {
        if !value.is_object() {
            return Err(ComplianceError::invalid_transaction(
                "transaction payload is not an object",
            ));
        }
        Self::deserialize(value)
            .map_err(|e| ComplianceError::invalid_transaction(e.to_string()))
    }
}

/// Year bucket for a date string. Accepts `YYYY-MM-DD` and RFC 3339.
pub fn year_partition(date: Option<&str>) -> YearPartition {
    let Some(raw) = date.map(str::trim).filter(|d| !d.is_empty()) else {
        return YearPartition::Unknown;
    };
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return YearPartition::Year(day.year());
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return YearPartition::Year(instant.year());
    }
    YearPartition::Unknown
}

/// Flat wire shape of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransactionRecord {
    #[serde(default)]
    transaction_id: TransactionId,
    #[serde(default = "unknown_type")]
    transaction_type: TransactionType,
    #[serde(default)]
    scheme: Option<Scheme>,
    #[serde(default)]
    farmer_id: FarmerId,
    #[serde(default)]
    district: Option<District>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    amount: Amount,
    #[serde(default)]
    metadata: Value,
    #[serde(default)]
    is_violation: bool,
    #[serde(default)]
    violation_code: Option<ViolationCode>,
    #[serde(default)]
    violation_note: Option<String>,
}

fn unknown_type() -> TransactionType {
    TransactionType::Unknown
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ComplianceError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        if !(record.metadata.is_object() || record.metadata.is_null()) {
            return Err(ComplianceError::invalid_transaction(format!(
                "metadata of '{}' is not an object",
                record.transaction_id
            )));
        }
        let details = TransactionDetails::from_metadata(record.transaction_type, &record.metadata)?;
        let duplicate_of = record
            .metadata
            .get("duplicate_of")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let transaction = Self {
            transaction_id: record.transaction_id,
            scheme: record.scheme,
            farmer_id: record.farmer_id,
            district: record.district,
            date: record.date,
            amount: record.amount,
            details,
            duplicate_of,
            is_violation: record.is_violation,
            violation_code: record.violation_code,
            violation_note: record.violation_note,
        };
        transaction.validate()?;
        Ok(transaction)
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        let mut metadata = tx.details.to_metadata();
        insert_some(&mut metadata, "duplicate_of", tx.duplicate_of);
        Self {
            transaction_type: tx.details.transaction_type(),
            transaction_id: tx.transaction_id,
            scheme: tx.scheme,
            farmer_id: tx.farmer_id,
            district: tx.district,
            date: tx.date,
            amount: tx.amount,
            metadata: Value::Object(metadata),
            is_violation: tx.is_violation,
            violation_code: tx.violation_code,
            violation_note: tx.violation_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_metadata_defaults_to_zero() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T1",
            "transaction_type": "crop_sale",
            "farmer_id": "F1001",
        }))
        .unwrap();
        match tx.details {
            TransactionDetails::CropSale(d) => {
                assert_eq!(d.msp_per_quintal, 0.0);
                assert_eq!(d.sale_price_per_quintal, 0.0);
            }
            other => panic!("Expected crop sale details, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_marker_is_lifted_out_of_metadata() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T9",
            "transaction_type": "insurance_claim",
            "scheme": "PMFBY",
            "metadata": { "report_delay_days": 2, "duplicate_of": "T3" },
        }))
        .unwrap();
        assert_eq!(tx.duplicate_of.as_deref(), Some("T3"));

        let wire = serde_json::to_value(&tx).unwrap();
        assert_eq!(wire["metadata"]["duplicate_of"], "T3");
        assert_eq!(wire["transaction_type"], "insurance_claim");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = Transaction::from_json(&json!("T1")).unwrap_err();
        assert!(matches!(err, ComplianceError::InvalidTransaction { .. }));
    }

    #[test]
    fn missing_identity_is_rejected() {
        let err = Transaction::from_json(&json!({ "transaction_type": "crop_sale" })).unwrap_err();
        assert!(matches!(err, ComplianceError::InvalidTransaction { .. }));
        assert!(err.to_string().contains("transaction_id"), "unexpected error: {err}");
    }

    #[test]
    fn unknown_types_and_schemes_are_tolerated() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T2",
            "transaction_type": "loan_disbursal",
            "scheme": "KCC",
        }))
        .unwrap();
        assert_eq!(tx.transaction_type(), TransactionType::Unknown);
        assert_eq!(tx.scheme, Some(Scheme::Other("KCC".to_string())));
    }

    #[test]
    fn unlisted_scheme_survives_round_trip() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T3",
            "transaction_type": "subsidy_claim",
            "scheme": "KCC",
            "metadata": { "installment": 1 },
        }))
        .unwrap();
        assert!(!tx.is_scheme(&Scheme::PmKisan));
        let wire = serde_json::to_value(&tx).unwrap();
        assert_eq!(wire["scheme"], "KCC");
        assert_eq!(Transaction::from_json(&wire).unwrap(), tx);
    }

    #[test]
    fn null_metadata_fields_read_as_zero() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T4",
            "transaction_type": "fertilizer_purchase",
            "metadata": { "urea_bags": 51, "dap_bags": null, "potash_bags": "oops", "vendor": null },
        }))
        .unwrap();
        assert_eq!(
            tx.details,
            TransactionDetails::FertilizerPurchase(FertilizerDetails {
                urea_bags: 51,
                dap_bags: 0,
                potash_bags: 0,
                vendor: None,
            })
        );
    }

    #[test]
    fn float_counts_are_accepted() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T5",
            "transaction_type": "insurance_claim",
            "metadata": { "report_delay_days": 5.0 },
        }))
        .unwrap();
        match tx.details {
            TransactionDetails::InsuranceClaim(d) => assert_eq!(d.report_delay_days, 5),
            other => panic!("Expected insurance details, got {other:?}"),
        }

        let fractional = Transaction::from_json(&json!({
            "transaction_id": "T6",
            "transaction_type": "insurance_claim",
            "metadata": { "report_delay_days": 3.2 },
        }))
        .unwrap();
        match fractional.details {
            TransactionDetails::InsuranceClaim(d) => {
                assert_eq!(d.report_delay_days, 4, "3.2 days is past a 3-day window")
            }
            other => panic!("Expected insurance details, got {other:?}"),
        }
    }

    #[test]
    fn unlisted_crop_is_kept_as_text() {
        let tx = Transaction::from_json(&json!({
            "transaction_id": "T7",
            "transaction_type": "crop_sale",
            "metadata": { "crop": "Soybean", "msp_per_quintal": 4600, "sale_price_per_quintal": "3000" },
        }))
        .unwrap();
        match &tx.details {
            TransactionDetails::CropSale(d) => {
                assert_eq!(d.crop.as_deref(), Some("Soybean"));
                assert_eq!(d.msp_per_quintal, 4600.0);
                assert_eq!(d.sale_price_per_quintal, 3000.0);
            }
            other => panic!("Expected crop sale details, got {other:?}"),
        }
        let wire = serde_json::to_value(&tx).unwrap();
        assert_eq!(wire["metadata"]["crop"], "Soybean");
    }

    #[test]
    fn year_partition_handles_bad_dates() {
        assert_eq!(year_partition(Some("2025-04-01")), YearPartition::Year(2025));
        assert_eq!(
            year_partition(Some("2024-12-31T23:00:00+05:30")),
            YearPartition::Year(2024)
        );
        assert_eq!(year_partition(Some("not-a-date")), YearPartition::Unknown);
        assert_eq!(year_partition(None), YearPartition::Unknown);
        assert_eq!(YearPartition::Unknown.to_string(), "unknown");
    }
}
