use rusqlite::types::Value;

/// Bound values in the form rusqlite expects.
///
/// Values are bound as TEXT; column affinity converts them on storage the same way a quoted
/// literal would be.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(values: &[String]) -> Self {
        Params(values.iter().cloned().map(Value::Text).collect())
    }
}
