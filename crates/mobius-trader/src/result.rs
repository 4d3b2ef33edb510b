//! Rows returned by an executed search.

use serde_json::{Map, Value};

/// Immutable snapshot of what one `Search` call returned.
///
/// The server normally answers with an array of row objects; anything else
/// is kept as-is and only reachable through [`ResultSet::first`] and
/// [`ResultSet::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    raw: Value,
}

impl ResultSet {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The value exactly as the server returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// All rows in server order. Empty if the result is not a list.
    pub fn rows(&self) -> &[Value] {
        match &self.raw {
            Value::Array(rows) => rows,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// The full row list. Use [`ResultSet::column`] for the values of a
    /// single column.
    pub fn as_array(&self) -> Vec<Value> {
        self.rows().to_vec()
    }

    /// One column across all rows, in row order. Rows lacking the column
    /// contribute `null`.
    pub fn column(&self, name: &str) -> Vec<Value> {
        self.rows()
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Index rows by the value of `key`; with `value` set, map to that
    /// single column instead of the whole row.
    ///
    /// Later rows overwrite earlier ones sharing a key.
    pub fn as_map(&self, key: &str, value: Option<&str>) -> Map<String, Value> {
        let mut map = Map::new();
        for row in self.rows() {
            let k = map_key(row.get(key).unwrap_or(&Value::Null));
            let v = match value {
                Some(column) => row.get(column).cloned().unwrap_or(Value::Null),
                None => row.clone(),
            };
            map.insert(k, v);
        }
        map
    }

    /// The first row.
    ///
    /// When the result has no first row (an empty list, or not a list at
    /// all) the raw result itself is returned; callers that received a
    /// single object from the server rely on this.
    pub fn first(&self) -> &Value {
        match &self.raw {
            Value::Array(rows) if !rows.is_empty() => &rows[0],
            other => other,
        }
    }

    /// A field of the first row. An absent field yields `default`, or
    /// `null` when no default is given.
    pub fn get(&self, column: &str, default: Option<Value>) -> Value {
        self.first()
            .get(column)
            .cloned()
            .or(default)
            .unwrap_or(Value::Null)
    }
}

impl From<Value> for ResultSet {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows().iter()
    }
}

fn map_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
