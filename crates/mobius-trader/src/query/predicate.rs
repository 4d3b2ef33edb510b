//! Predicate compilation: turns an ordered stream of conditions and group
//! markers into the nested list the `Search` method expects in `Where`.
//!
//! Wire grammar:
//! ```text
//! predicate := item (connective item)*
//! item      := column operator value        (spliced inline)
//!            | '[' predicate ']'            (group)
//! connective := "AND" | "OR"
//! ```

use serde_json::{json, Value};

use crate::types::{QueryError, QueryResult};

use super::condition::Condition;

/// Word joining two predicate items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl std::fmt::Display for Connective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded step of a `WHERE` construction.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateEntry {
    Condition {
        connective: Connective,
        condition: Condition,
    },
    Open(Connective),
    Close(Connective),
}

impl PredicateEntry {
    pub fn connective(&self) -> Connective {
        match self {
            PredicateEntry::Condition { connective, .. } => *connective,
            PredicateEntry::Open(c) | PredicateEntry::Close(c) => *c,
        }
    }
}

/// The predicate sent when no condition was given: every row with a
/// positive ticket.
pub fn default_predicate() -> Value {
    json!(["Ticket", ">", 0])
}

/// Ordered list of predicate entries with a compiler to the wire form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    entries: Vec<PredicateEntry>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PredicateEntry) {
        self.entries.push(entry);
    }

    pub fn condition(&mut self, connective: Connective, condition: Condition) {
        self.push(PredicateEntry::Condition {
            connective,
            condition,
        });
    }

    pub fn open(&mut self, connective: Connective) {
        self.push(PredicateEntry::Open(connective));
    }

    pub fn close(&mut self, connective: Connective) {
        self.push(PredicateEntry::Close(connective));
    }

    pub fn entries(&self) -> &[PredicateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile the entries into the nested wire list.
    pub fn compile(&self) -> QueryResult<Value> {
        compile_predicate(&self.entries)
    }
}

/// An open group waiting for its `Close`.
struct Frame {
    connective: Connective,
    opened_at: usize,
    items: Vec<Value>,
}

fn append(items: &mut Vec<Value>, connective: Connective, values: impl IntoIterator<Item = Value>) {
    if !items.is_empty() {
        items.push(Value::String(connective.as_str().to_string()));
    }
    items.extend(values);
}

/// Compile an entry stream into a `Where` value.
///
/// Each group gets its own accumulator on a stack, so groups nest to any
/// depth. A `Close` with nothing open, or an `Open` still pending at the
/// end, is rejected. Groups that end up empty are dropped together with
/// their connective.
pub fn compile_predicate(entries: &[PredicateEntry]) -> QueryResult<Value> {
    let mut root: Vec<Value> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        match entry {
            PredicateEntry::Open(connective) => stack.push(Frame {
                connective: *connective,
                opened_at: position,
                items: Vec::new(),
            }),
            PredicateEntry::Close(_) => {
                let group = stack.pop().ok_or_else(|| QueryError::MalformedGrouping {
                    position,
                    reason: "close without a matching open".to_string(),
                })?;
                if group.items.is_empty() {
                    continue;
                }
                let parent = match stack.last_mut() {
                    Some(frame) => &mut frame.items,
                    None => &mut root,
                };
                append(parent, group.connective, [Value::Array(group.items)]);
            }
            PredicateEntry::Condition {
                connective,
                condition,
            } => {
                let current = match stack.last_mut() {
                    Some(frame) => &mut frame.items,
                    None => &mut root,
                };
                append(current, *connective, condition.normalize().into_triple());
            }
        }
    }

    if let Some(frame) = stack.first() {
        return Err(QueryError::MalformedGrouping {
            position: frame.opened_at,
            reason: "group is never closed".to_string(),
        });
    }

    if root.is_empty() {
        return Ok(default_predicate());
    }

    // A predicate made of one group is the group itself.
    if root.len() == 1 && root[0].is_array() {
        return Ok(root.remove(0));
    }

    Ok(Value::Array(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(c: Connective, column: &str, op: &str, value: impl Into<Value>) -> PredicateEntry {
        PredicateEntry::Condition {
            connective: c,
            condition: Condition::new(column, op, value),
        }
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(compile_predicate(&[]).unwrap(), json!(["Ticket", ">", 0]));
    }

    #[test]
    fn test_single_condition_has_no_connective() {
        let p = compile_predicate(&[cond(Connective::And, "A", "=", 1)]).unwrap();
        assert_eq!(p, json!(["A", "=", 1]));
    }

    #[test]
    fn test_first_or_is_dropped() {
        let p = compile_predicate(&[cond(Connective::Or, "A", "=", 1)]).unwrap();
        assert_eq!(p, json!(["A", "=", 1]));
    }

    #[test]
    fn test_two_conditions_spliced_inline() {
        let p = compile_predicate(&[
            cond(Connective::And, "A", "=", 1),
            cond(Connective::And, "B", ">", 2),
        ])
        .unwrap();
        assert_eq!(p, json!(["A", "=", 1, "AND", "B", ">", 2]));
    }

    #[test]
    fn test_membership_value_normalized() {
        let p = compile_predicate(&[cond(Connective::And, "X", "in", 5)]).unwrap();
        assert_eq!(p, json!(["X", "IN", [5]]));
    }

    #[test]
    fn test_group_after_condition() {
        let p = compile_predicate(&[
            cond(Connective::And, "AccountNumberId", "=", 7),
            PredicateEntry::Open(Connective::And),
            cond(Connective::And, "TradeCmd", "=", 0),
            cond(Connective::Or, "TradeCmd", "=", 1),
            PredicateEntry::Close(Connective::And),
        ])
        .unwrap();
        assert_eq!(
            p,
            json!([
                "AccountNumberId", "=", 7,
                "AND",
                ["TradeCmd", "=", 0, "OR", "TradeCmd", "=", 1]
            ])
        );
    }

    #[test]
    fn test_leading_group_then_condition() {
        let p = compile_predicate(&[
            PredicateEntry::Open(Connective::Or),
            cond(Connective::And, "A", "=", 1),
            cond(Connective::Or, "B", "=", 2),
            PredicateEntry::Close(Connective::And),
            cond(Connective::And, "C", "<", 3),
        ])
        .unwrap();
        assert_eq!(
            p,
            json!([["A", "=", 1, "OR", "B", "=", 2], "AND", "C", "<", 3])
        );
    }

    #[test]
    fn test_sole_group_is_unwrapped() {
        let p = compile_predicate(&[
            PredicateEntry::Open(Connective::And),
            cond(Connective::And, "A", "=", 1),
            cond(Connective::Or, "B", "=", 2),
            PredicateEntry::Close(Connective::And),
        ])
        .unwrap();
        assert_eq!(p, json!(["A", "=", 1, "OR", "B", "=", 2]));
    }

    #[test]
    fn test_nested_groups() {
        let p = compile_predicate(&[
            cond(Connective::And, "A", "=", 1),
            PredicateEntry::Open(Connective::Or),
            cond(Connective::And, "B", "=", 2),
            PredicateEntry::Open(Connective::And),
            cond(Connective::And, "C", "=", 3),
            cond(Connective::Or, "D", "=", 4),
            PredicateEntry::Close(Connective::And),
            PredicateEntry::Close(Connective::And),
        ])
        .unwrap();
        assert_eq!(
            p,
            json!([
                "A", "=", 1,
                "OR",
                ["B", "=", 2, "AND", ["C", "=", 3, "OR", "D", "=", 4]]
            ])
        );
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let p = compile_predicate(&[
            cond(Connective::And, "A", "=", 1),
            PredicateEntry::Open(Connective::Or),
            PredicateEntry::Close(Connective::And),
        ])
        .unwrap();
        assert_eq!(p, json!(["A", "=", 1]));
    }

    #[test]
    fn test_unmatched_close_rejected() {
        let err = compile_predicate(&[
            cond(Connective::And, "A", "=", 1),
            PredicateEntry::Close(Connective::And),
        ])
        .unwrap_err();
        assert!(matches!(err, QueryError::MalformedGrouping { position: 1, .. }));
    }

    #[test]
    fn test_unclosed_open_rejected() {
        let err = compile_predicate(&[
            PredicateEntry::Open(Connective::And),
            cond(Connective::And, "A", "=", 1),
        ])
        .unwrap_err();
        assert!(matches!(err, QueryError::MalformedGrouping { position: 0, .. }));
    }

    #[test]
    fn test_predicate_accumulator() {
        let mut p = Predicate::new();
        assert!(p.is_empty());
        p.condition(Connective::And, Condition::new("A", "=", 1));
        p.condition(Connective::Or, Condition::new("B", "!=", "x"));
        assert_eq!(p.entries().len(), 2);
        assert_eq!(p.entries()[1].connective(), Connective::Or);
        assert_eq!(p.compile().unwrap(), json!(["A", "=", 1, "OR", "B", "!=", "x"]));
    }
}
