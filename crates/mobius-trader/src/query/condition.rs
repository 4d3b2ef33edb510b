//! Single-condition canonicalization.

use serde_json::Value;

/// Common comparison operators understood by the search endpoint.
///
/// Conditions also accept free-form operator strings; this enum only names
/// the ones the server is known to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Like,
    NotLike,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Neq => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
        }
    }
}

impl AsRef<str> for Op {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `column operator value` filter as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: String,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: impl AsRef<str>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: op.as_ref().to_string(),
            value: value.into(),
        }
    }

    /// Canonical form of this condition: upper-cased operator, and a list
    /// value whenever the operator is a membership test.
    ///
    /// Column and operator are not validated.
    pub fn normalize(&self) -> Condition {
        let op = self.op.to_uppercase();
        let value = normalize_value(&op, self.value.clone());
        Condition {
            column: self.column.clone(),
            op,
            value,
        }
    }

    /// The `[column, operator, value]` triple in wire order.
    pub fn into_triple(self) -> [Value; 3] {
        [Value::String(self.column), Value::String(self.op), self.value]
    }
}

/// Whether `op` denotes a membership test (`IN`, `NOT IN`, ...).
pub fn is_membership(op: &str) -> bool {
    op.to_uppercase().contains("IN")
}

fn normalize_value(op: &str, value: Value) -> Value {
    if !is_membership(op) {
        return value;
    }

    match value {
        Value::Array(_) => value,
        scalar => Value::Array(vec![scalar]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_in_becomes_list() {
        let c = Condition::new("X", "IN", 5).normalize();
        assert_eq!(c.value, json!([5]));
    }

    #[test]
    fn test_list_in_is_untouched() {
        let c = Condition::new("TradeCmd", Op::In, json!([0, 1])).normalize();
        assert_eq!(c.value, json!([0, 1]));
    }

    #[test]
    fn test_not_in_lowercase_is_membership() {
        let c = Condition::new("SymbolId", "not in", 3).normalize();
        assert_eq!(c.op, "NOT IN");
        assert_eq!(c.value, json!([3]));
    }

    #[test]
    fn test_comparison_keeps_scalar() {
        let c = Condition::new("CloseTime", Op::Gt, 0).normalize();
        assert_eq!(c.op, ">");
        assert_eq!(c.value, json!(0));
    }

    #[test]
    fn test_malformed_operator_passes_through() {
        let c = Condition::new("", "~~", "abc").normalize();
        assert_eq!(c.column, "");
        assert_eq!(c.op, "~~");
        assert_eq!(c.value, json!("abc"));
    }

    #[test]
    fn test_like_is_not_membership() {
        assert!(!is_membership("LIKE"));
        assert!(is_membership("in"));
    }
}
