//! Built-in converters for date/time, geographic point, float and
//! reference properties

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use jsonrest_orm::{EntityKey, GeoPt, PropertyType, Value};
use serde_json::{json, Value as JsonValue};

use super::{ConversionError, ConverterRegistry, ModelResolver};

pub(super) fn install(registry: &mut ConverterRegistry) {
    registry
        .register(PropertyType::DATE, serialize_date, deserialize_date)
        .register(PropertyType::DATETIME, serialize_datetime, deserialize_datetime)
        .register(PropertyType::TIME, serialize_time, deserialize_time)
        .register(PropertyType::GEO_PT, serialize_geo_pt, deserialize_geo_pt)
        .register(PropertyType::FLOAT, serialize_float, deserialize_float)
        .register(PropertyType::REFERENCE, serialize_reference, deserialize_reference);
}

/// `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, with `.ffffff` only when there are sub-second digits
pub fn format_time(time: &NaiveTime) -> String {
    let micros = time.nanosecond() / 1_000;
    if micros == 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", time.format("%H:%M:%S"), micros)
    }
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]`
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    format!("{}T{}", format_date(&datetime.date()), format_time(&datetime.time()))
}

/// Parse an ISO-8601 datetime. Offsets are normalised to UTC; a space may
/// replace the `T`; a bare date means midnight.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, ConversionError> {
    let input = input.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        return Ok(with_offset.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(datetime);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| ConversionError::new(format!("'{}' is not an ISO-8601 datetime", input)))
}

/// Parse an ISO-8601 date, or the date part of a datetime
pub fn parse_date(input: &str) -> Result<NaiveDate, ConversionError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .or_else(|_| parse_datetime(input).map(|datetime| datetime.date()))
        .map_err(|_| ConversionError::new(format!("'{}' is not an ISO-8601 date", input)))
}

/// Parse `HH:MM:SS[.ffffff]`, `HH:MM`, or the time part of a datetime
pub fn parse_time(input: &str) -> Result<NaiveTime, ConversionError> {
    let trimmed = input.trim();
    for format in ["%H:%M:%S%.f", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
    }

    parse_datetime(trimmed)
        .map(|datetime| datetime.time())
        .map_err(|_| ConversionError::new(format!("'{}' is not an ISO-8601 time", input)))
}

fn expect_str<'a>(json: &'a JsonValue, what: &str) -> Result<&'a str, ConversionError> {
    json.as_str()
        .ok_or_else(|| ConversionError::expected(&format!("{} string", what), json))
}

fn serialize_date(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::Date(date) => Ok(json!(format_date(date))),
        Value::DateTime(datetime) => Ok(json!(format_date(&datetime.date()))),
        other => Err(ConversionError::expected("a date", &other.type_name())),
    }
}

fn deserialize_date(json: &JsonValue, _: &dyn ModelResolver) -> Result<Value, ConversionError> {
    parse_date(expect_str(json, "an ISO-8601 date")?).map(Value::Date)
}

fn serialize_datetime(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::DateTime(datetime) => Ok(json!(format_datetime(datetime))),
        Value::Date(date) => Ok(json!(format_datetime(&date.and_time(NaiveTime::MIN)))),
        other => Err(ConversionError::expected("a datetime", &other.type_name())),
    }
}

fn deserialize_datetime(json: &JsonValue, _: &dyn ModelResolver) -> Result<Value, ConversionError> {
    parse_datetime(expect_str(json, "an ISO-8601 datetime")?).map(Value::DateTime)
}

fn serialize_time(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::Time(time) => Ok(json!(format_time(time))),
        Value::DateTime(datetime) => Ok(json!(format_time(&datetime.time()))),
        other => Err(ConversionError::expected("a time", &other.type_name())),
    }
}

fn deserialize_time(json: &JsonValue, _: &dyn ModelResolver) -> Result<Value, ConversionError> {
    parse_time(expect_str(json, "an ISO-8601 time")?).map(Value::Time)
}

fn serialize_geo_pt(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::GeoPt(point) => Ok(json!({ "lat": point.lat, "lon": point.lon })),
        other => Err(ConversionError::expected("a GeoPt", &other.type_name())),
    }
}

fn deserialize_geo_pt(json: &JsonValue, _: &dyn ModelResolver) -> Result<Value, ConversionError> {
    let coordinate = |value: Option<&JsonValue>| value.and_then(JsonValue::as_f64);

    let (lat, lon) = match json {
        JsonValue::Object(fields) => (coordinate(fields.get("lat")), coordinate(fields.get("lon"))),
        JsonValue::Array(pair) if pair.len() == 2 => (coordinate(pair.first()), coordinate(pair.get(1))),
        _ => (None, None),
    };

    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(ConversionError::expected("{\"lat\": number, \"lon\": number} or [lat, lon]", json));
    };

    let point = GeoPt::new(lat, lon);
    if !point.is_valid() {
        return Err(ConversionError::new(format!(
            "coordinates ({}, {}) are out of range",
            lat, lon
        )));
    }
    Ok(Value::GeoPt(point))
}

fn serialize_float(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::Float(_) => Ok(value.to_json()),
        Value::Integer(i) => Ok(json!(*i as f64)),
        other => Err(ConversionError::expected("a float", &other.type_name())),
    }
}

fn deserialize_float(json: &JsonValue, _: &dyn ModelResolver) -> Result<Value, ConversionError> {
    let number = match json {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(Value::Float)
        .ok_or_else(|| ConversionError::expected("a number", json))
}

fn serialize_reference(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::Key(key) => Ok(json!({
            "type_name": key.kind(),
            "type_namespace": key.namespace(),
            "id": key.id(),
            "key": key.encode(),
        })),
        other => Err(ConversionError::expected("a Key", &other.type_name())),
    }
}

fn decode_key(encoded: &str) -> Result<Value, ConversionError> {
    EntityKey::decode(encoded)
        .map(Value::Key)
        .map_err(|e| ConversionError::new(e.to_string()))
}

fn deserialize_reference(json: &JsonValue, resolver: &dyn ModelResolver) -> Result<Value, ConversionError> {
    let fields = match json {
        JsonValue::String(encoded) => return decode_key(encoded),
        JsonValue::Object(fields) => fields,
        _ => return Err(ConversionError::expected("a key string or reference object", json)),
    };

    if let Some(encoded) = fields.get("key").and_then(JsonValue::as_str) {
        return decode_key(encoded);
    }

    let namespace = fields.get("type_namespace").and_then(JsonValue::as_str).unwrap_or_default();
    let name = fields
        .get("type_name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ConversionError::new("reference object needs a key or type_name"))?;
    let id = match fields.get("id") {
        Some(JsonValue::Number(n)) => n.as_i64(),
        Some(JsonValue::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ConversionError::new("reference object needs an integer id"))?;

    let model = resolver
        .resolve_model(namespace, name)
        .ok_or_else(|| ConversionError::new(format!("unknown model type {}", jsonrest_orm::qualified_path(namespace, name))))?;
    Ok(Value::Key(model.key_for(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_formats() {
        let datetime = NaiveDate::from_ymd_opt(2012, 5, 6)
            .unwrap()
            .and_hms_micro_opt(7, 8, 9, 120)
            .unwrap();
        assert_eq!(format_datetime(&datetime), "2012-05-06T07:08:09.000120");
        assert_eq!(parse_datetime("2012-05-06T07:08:09.000120").unwrap(), datetime);

        let whole = NaiveDate::from_ymd_opt(2012, 5, 6).unwrap().and_hms_opt(7, 8, 9).unwrap();
        assert_eq!(format_datetime(&whole), "2012-05-06T07:08:09");
        assert_eq!(parse_datetime("2012-05-06 07:08:09").unwrap(), whole);
        assert_eq!(parse_datetime("2012-05-06T09:08:09+02:00").unwrap(), whole);
        assert_eq!(
            parse_datetime("2012-05-06").unwrap(),
            NaiveDate::from_ymd_opt(2012, 5, 6).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_date_and_time_parsing() {
        assert_eq!(parse_date("2012-05-06").unwrap(), NaiveDate::from_ymd_opt(2012, 5, 6).unwrap());
        assert_eq!(
            parse_date("2012-05-06T23:59:00").unwrap(),
            NaiveDate::from_ymd_opt(2012, 5, 6).unwrap()
        );
        assert!(parse_date("06/05/2012").is_err());

        assert_eq!(parse_time("13:45").unwrap(), NaiveTime::from_hms_opt(13, 45, 0).unwrap());
        assert_eq!(parse_time("13:45:10").unwrap(), NaiveTime::from_hms_opt(13, 45, 10).unwrap());
        assert_eq!(
            parse_time("2012-05-06T13:45:10").unwrap(),
            NaiveTime::from_hms_opt(13, 45, 10).unwrap()
        );
        assert_eq!(format_time(&NaiveTime::from_hms_opt(8, 0, 0).unwrap()), "08:00:00");
    }

    #[test]
    fn test_mismatched_native_values_fail() {
        assert!(serialize_date(&Value::from("2012-01-01")).is_err());
        assert!(serialize_geo_pt(&Value::Integer(1)).is_err());
        assert!(serialize_reference(&Value::Integer(1)).is_err());
    }
}
