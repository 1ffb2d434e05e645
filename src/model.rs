use serde::{Deserialize, Serialize};

/// One column/value pair.
///
/// `value` is the literal textual representation to persist; the backend converts it when
/// binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: String,
}

impl FieldValue {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A read: which columns to fetch from which table, optionally filtered by one equality
/// condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub table: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub condition: Option<FieldValue>,
}

impl QueryRequest {
    #[must_use]
    pub fn new<I, S>(table: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            condition: None,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition = Some(FieldValue::new(name, value));
        self
    }
}

/// An insert (`is_insert == true`, condition ignored) or an update.
///
/// An update without a condition touches every row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub table: String,
    pub fields: Vec<FieldValue>,
    #[serde(default)]
    pub condition: Option<FieldValue>,
    #[serde(default)]
    pub is_insert: bool,
}

impl MutationRequest {
    #[must_use]
    pub fn insert(table: impl Into<String>, fields: Vec<FieldValue>) -> Self {
        Self {
            table: table.into(),
            fields,
            condition: None,
            is_insert: true,
        }
    }

    #[must_use]
    pub fn update(table: impl Into<String>, fields: Vec<FieldValue>) -> Self {
        Self {
            table: table.into(),
            fields,
            condition: None,
            is_insert: false,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition = Some(FieldValue::new(name, value));
        self
    }
}
