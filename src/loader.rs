use crate::error::DashboardResult;
use crate::types::{Indicator, RawRecord, Record};
use crate::util::{parse_amount, parse_int, value_to_text};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Which envelope the record list was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A bare array of records.
    Array,
    /// `[{ "data": [...] }]`
    NestedData,
    /// An object holding the records in one of its properties.
    ObjectProperty,
    /// A single record object.
    SingleObject,
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub shape: PayloadShape,
}

/// Turn one raw record into its canonical form.
///
/// Returns `None` only when `row_number` cannot be read as an integer. A bad
/// amount becomes `0.0` and a bad year becomes `None`; neither drops the record.
/// `month` is trimmed and lower-cased so every consumer sees one spelling.
pub fn normalize_record(raw: RawRecord) -> Option<Record> {
    let row_number = parse_int(&raw.row_number)?;
    let year = parse_int(&raw.year).and_then(|y| i32::try_from(y).ok());
    Some(Record {
        row_number,
        category: value_to_text(&raw.category),
        broad_subcategory: value_to_text(&raw.broad_subcategory),
        specific_subcategory: value_to_text(&raw.specific_subcategory),
        responsible: value_to_text(&raw.responsible),
        reference_period: value_to_text(&raw.reference_period),
        amount: parse_amount(&raw.amount),
        indicator: Indicator::from_marker(&value_to_text(&raw.indicator)),
        city: value_to_text(&raw.city),
        year,
        month: value_to_text(&raw.month).trim().to_lowercase(),
        date: value_to_text(&raw.date),
        status: value_to_text(&raw.status),
    })
}

/// Normalize every item, preserving order. Items that are not objects or
/// lack a usable `row_number` are dropped; the count of drops is returned.
pub fn normalize_all(items: Vec<Value>) -> (Vec<Record>, usize) {
    let mut dropped = 0usize;
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let normalized = match item {
            Value::Object(_) => serde_json::from_value::<RawRecord>(item)
                .ok()
                .and_then(normalize_record),
            _ => None,
        };
        match normalized {
            Some(r) => records.push(r),
            None => dropped += 1,
        }
    }
    (records, dropped)
}

/// Locate the record list inside a decoded payload.
pub fn extract_records(value: Value) -> (Vec<Value>, PayloadShape) {
    match unwrap_body(value) {
        Value::Array(mut items) => {
            let nested = matches!(
                items.first().and_then(|first| first.get("data")),
                Some(Value::Array(_))
            );
            if nested {
                if let Some(Value::Array(data)) = items
                    .first_mut()
                    .and_then(|first| first.get_mut("data"))
                    .map(Value::take)
                {
                    return (data, PayloadShape::NestedData);
                }
            }
            (items, PayloadShape::Array)
        }
        Value::Object(mut map) => {
            let array_key = map
                .iter()
                .find(|(_, v)| v.is_array())
                .map(|(k, _)| k.clone());
            if let Some(key) = array_key {
                if let Some(Value::Array(items)) = map.remove(&key) {
                    return (items, PayloadShape::ObjectProperty);
                }
            }
            if map.contains_key("row_number") {
                warn!("Payload is a single record object, wrapping it in a list");
                return (vec![Value::Object(map)], PayloadShape::SingleObject);
            }
            warn!("Payload object has no array property; treating it as an empty dataset");
            (Vec::new(), PayloadShape::Unrecognized)
        }
        other => {
            warn!(kind = %json_kind(&other), "Payload is neither an array nor an object");
            (Vec::new(), PayloadShape::Unrecognized)
        }
    }
}

// Some gateways wrap the real payload as a JSON string under `body`.
fn unwrap_body(value: Value) -> Value {
    let body = match value.get("body") {
        Some(Value::String(body)) => body.clone(),
        _ => return value,
    };
    warn!("Payload looks enveloped, parsing its 'body' property");
    match serde_json::from_str(&body) {
        Ok(inner) => inner,
        Err(e) => {
            warn!(error = %e, "Failed to parse the 'body' property, keeping the outer payload");
            value
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a payload text into canonical records.
pub fn parse_payload(text: &str) -> DashboardResult<(Vec<Record>, LoadReport)> {
    let value: Value = serde_json::from_str(text)?;
    let (items, shape) = extract_records(value);
    debug!(?shape, count = items.len(), "Extracted record list from payload");

    let total_rows = items.len();
    let (records, dropped_rows) = normalize_all(items);
    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        dropped_rows,
        shape,
    };
    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        dropped = report.dropped_rows,
        "Records normalized"
    );
    Ok((records, report))
}

pub fn load_records<P: AsRef<Path>>(path: P) -> DashboardResult<(Vec<Record>, LoadReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading dashboard data");
    let text = std::fs::read_to_string(path)?;
    parse_payload(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).expect("raw record")
    }

    #[test]
    fn test_normalize_full_record() {
        let record = normalize_record(raw(json!({
            "row_number": "7",
            "categoria": "Despesas",
            "subcategoria ampla": "Saúde",
            "subcategoria especifica": "Farmácia",
            "responsavel": "Ana",
            "competencia / referencia": "Jan/24",
            "valor": "10,5",
            "indicador": "+",
            "cidade": "Recife",
            "ano": 2024,
            "mes": "janeiro",
            "data": "05/01/2024",
            "status": "liberado para lançamento"
        })))
        .expect("record kept");

        assert_eq!(record.row_number, 7);
        assert_eq!(record.broad_subcategory, "Saúde");
        assert_eq!(record.reference_period, "Jan/24");
        assert_eq!(record.amount, 10.5);
        assert_eq!(record.indicator, Indicator::Up);
        assert_eq!(record.year, Some(2024));
        assert_eq!(record.month, "janeiro");
    }

    #[test]
    fn test_month_is_trimmed_and_lowercased() {
        let record = normalize_record(raw(json!({
            "row_number": 1,
            "valor": 10,
            "mes": " Janeiro ",
            "ano": 2024
        })))
        .expect("record kept");
        assert_eq!(record.month, "janeiro");
    }

    #[test]
    fn test_invalid_row_number_drops_record() {
        assert!(normalize_record(raw(json!({ "row_number": "abc", "valor": 10 }))).is_none());
        assert!(normalize_record(raw(json!({ "valor": 10 }))).is_none());
    }

    #[test]
    fn test_invalid_amount_and_year_keep_record() {
        let record = normalize_record(raw(json!({
            "row_number": 1,
            "valor": "n/a",
            "ano": "unknown"
        })))
        .expect("record kept");
        assert_eq!(record.amount, 0.0);
        assert_eq!(record.year, None);
        assert_eq!(record.category, "");
        assert_eq!(record.indicator, Indicator::Unmarked);
    }

    #[test]
    fn test_normalize_all_preserves_order_and_counts_drops() {
        let (records, dropped) = normalize_all(vec![
            json!({ "row_number": 3 }),
            json!(null),
            json!({ "row_number": "x" }),
            json!(42),
            json!({ "row_number": 1 }),
        ]);
        let rows: Vec<i64> = records.iter().map(|r| r.row_number).collect();
        assert_eq!(rows, vec![3, 1]);
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_extract_shapes() {
        let (items, shape) = extract_records(json!([{ "row_number": 1 }, { "row_number": 2 }]));
        assert_eq!((items.len(), shape), (2, PayloadShape::Array));

        let (items, shape) = extract_records(json!([{ "data": [{ "row_number": 1 }] }]));
        assert_eq!((items.len(), shape), (1, PayloadShape::NestedData));

        let (items, shape) =
            extract_records(json!({ "count": 2, "rows": [{ "row_number": 1 }, {}] }));
        assert_eq!((items.len(), shape), (2, PayloadShape::ObjectProperty));

        let (items, shape) = extract_records(json!({ "row_number": 9 }));
        assert_eq!((items.len(), shape), (1, PayloadShape::SingleObject));

        let (items, shape) = extract_records(json!({ "message": "no rows" }));
        assert_eq!((items.len(), shape), (0, PayloadShape::Unrecognized));

        let (items, shape) = extract_records(json!("oops"));
        assert_eq!((items.len(), shape), (0, PayloadShape::Unrecognized));
    }

    #[test]
    fn test_extract_string_body_envelope() {
        let inner = json!([{ "row_number": 1 }, { "row_number": 2 }]).to_string();
        let (items, shape) = extract_records(json!({ "statusCode": 200, "body": inner }));
        assert_eq!((items.len(), shape), (2, PayloadShape::Array));
    }

    #[test]
    fn test_extract_broken_body_keeps_outer_payload() {
        let (items, shape) = extract_records(json!({ "body": "{not json", "rows": [{}] }));
        assert_eq!((items.len(), shape), (1, PayloadShape::ObjectProperty));
    }

    #[test]
    fn test_parse_payload_report() {
        let text = r#"[{"row_number": 1, "valor": "5,5"}, {"row_number": "bad"}]"#;
        let (records, report) = parse_payload(text).expect("payload parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 5.5);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.kept_rows, 1);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.shape, PayloadShape::Array);
    }

    #[test]
    fn test_parse_payload_rejects_invalid_json() {
        assert!(parse_payload("[{").is_err());
    }
}
