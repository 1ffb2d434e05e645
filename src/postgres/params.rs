use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes::BytesMut;

use crate::error::SqlProxyError;

type BoxedParam = Box<dyn ToSql + Sync + Send>;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const TIMESTAMPTZ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Bind parameters typed after the placeholders of a prepared statement.
///
/// The proxy carries every value as text; PostgreSQL will not coerce a text parameter into an
/// integer or boolean column, so each value is parsed into the type the server inferred.
/// Types with no native mapping here are sent in text format and parsed by the server.
#[derive(Debug)]
pub struct Params(Vec<BoxedParam>);

impl Params {
    /// Convert `values` for placeholders of the given `types`.
    ///
    /// # Errors
    /// Returns `SqlProxyError::ParameterError` if the counts differ or a value does not parse
    /// as its placeholder's type.
    pub fn convert(types: &[Type], values: &[String]) -> Result<Self, SqlProxyError> {
        if types.len() != values.len() {
            return Err(SqlProxyError::ParameterError(format!(
                "statement expects {} parameters, got {}",
                types.len(),
                values.len()
            )));
        }
        types
            .iter()
            .zip(values)
            .map(|(ty, value)| convert_value(ty, value))
            .collect::<Result<Vec<_>, _>>()
            .map(Params)
    }

    #[must_use]
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.0
            .iter()
            .map(|param| param.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

/// A value handed to the server as text, for it to parse with the column type's input
/// function (`numeric`, `uuid`, `json`, arrays, enums, ...).
#[derive(Debug)]
struct TextParam(String);

impl ToSql for TextParam {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

fn convert_value(ty: &Type, value: &str) -> Result<BoxedParam, SqlProxyError> {
    let param: BoxedParam = match *ty {
        Type::INT2 => Box::new(parse::<i16>(ty, value)?),
        Type::INT4 => Box::new(parse::<i32>(ty, value)?),
        Type::INT8 => Box::new(parse::<i64>(ty, value)?),
        Type::FLOAT4 => Box::new(parse::<f32>(ty, value)?),
        Type::FLOAT8 => Box::new(parse::<f64>(ty, value)?),
        Type::BOOL => Box::new(parse_bool(value)?),
        Type::DATE => Box::new(
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| invalid(ty, value))?,
        ),
        Type::TIMESTAMP => Box::new(parse_timestamp(value).ok_or_else(|| invalid(ty, value))?),
        Type::TIMESTAMPTZ => Box::new(parse_timestamptz(value).ok_or_else(|| invalid(ty, value))?),
        _ if <String as ToSql>::accepts(ty) => Box::new(value.to_owned()),
        _ => Box::new(TextParam(value.to_owned())),
    };
    Ok(param)
}

fn parse<T: std::str::FromStr>(ty: &Type, value: &str) -> Result<T, SqlProxyError> {
    value.trim().parse::<T>().map_err(|_| invalid(ty, value))
}

fn parse_bool(value: &str) -> Result<bool, SqlProxyError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
        _ => Err(invalid(&Type::BOOL, value)),
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

// An offset-less value is taken as UTC.
fn parse_timestamptz(value: &str) -> Option<DateTime<chrono::FixedOffset>> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .or_else(|| {
            TIMESTAMPTZ_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
        })
        .or_else(|| parse_timestamp(trimmed).map(|naive| naive.and_utc().fixed_offset()))
}

fn invalid(ty: &Type, value: &str) -> SqlProxyError {
    SqlProxyError::ParameterError(format!("'{value}' is not a valid {}", ty.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encodes_as(ty: &Type, value: &str) -> BoxedParam {
        let params = Params::convert(std::slice::from_ref(ty), &[value.to_string()]).unwrap();
        let param = params.0.into_iter().next().unwrap();
        let mut buf = BytesMut::new();
        param
            .to_sql_checked(ty, &mut buf)
            .unwrap_or_else(|e| panic!("{value} did not encode as {ty}: {e}"));
        param
    }

    #[test]
    fn parses_by_placeholder_type() {
        let params = Params::convert(
            &[Type::INT4, Type::BOOL, Type::TEXT],
            &["7".into(), "true".into(), "x".into()],
        )
        .unwrap();
        assert_eq!(params.as_refs().len(), 3);
    }

    #[test]
    fn date_binds_natively() {
        let param = encodes_as(&Type::DATE, "2024-01-01");
        assert!(matches!(param.encode_format(&Type::DATE), Format::Binary));
    }

    #[test]
    fn timestamp_accepts_space_or_t_separator() {
        encodes_as(&Type::TIMESTAMP, "2024-01-01 12:30:00");
        encodes_as(&Type::TIMESTAMP, "2024-01-01T12:30:00.250");
    }

    #[test]
    fn timestamptz_accepts_offsets_and_naive_utc() {
        encodes_as(&Type::TIMESTAMPTZ, "2024-01-01T12:30:00Z");
        encodes_as(&Type::TIMESTAMPTZ, "2024-01-01 12:30:00+02:00");
        encodes_as(&Type::TIMESTAMPTZ, "2024-01-01 12:30:00");
    }

    #[test]
    fn text_like_columns_bind_as_string() {
        for ty in [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME] {
            let param = encodes_as(&ty, "abc");
            assert!(matches!(param.encode_format(&ty), Format::Binary));
        }
    }

    #[test]
    fn other_types_are_sent_as_text_for_the_server_to_parse() {
        for (ty, value) in [
            (Type::NUMERIC, "12.50"),
            (Type::UUID, "67e55044-10b1-426f-9247-bb680e5fe0c8"),
            (Type::JSON, r#"{"a":1}"#),
            (Type::JSONB, r#"{"a":1}"#),
            (Type::INTERVAL, "1 day"),
        ] {
            let param = encodes_as(&ty, value);
            assert!(matches!(param.encode_format(&ty), Format::Text));
        }

        let params = Params::convert(&[Type::NUMERIC], &["12.50".into()]).unwrap();
        let mut buf = BytesMut::new();
        params.0[0].to_sql_checked(&Type::NUMERIC, &mut buf).unwrap();
        assert_eq!(&buf[..], b"12.50");
    }

    #[test]
    fn rejects_malformed_dates() {
        for ty in [Type::DATE, Type::TIMESTAMP, Type::TIMESTAMPTZ] {
            let err =
                Params::convert(std::slice::from_ref(&ty), &["not a date".into()]).unwrap_err();
            assert!(matches!(err, SqlProxyError::ParameterError(_)));
        }
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = Params::convert(&[Type::INT8], &["seven".into()]).unwrap_err();
        assert!(matches!(err, SqlProxyError::ParameterError(_)));
    }

    #[test]
    fn rejects_count_mismatch() {
        let err = Params::convert(&[Type::TEXT], &[]).unwrap_err();
        assert!(matches!(err, SqlProxyError::ParameterError(_)));
    }
}
