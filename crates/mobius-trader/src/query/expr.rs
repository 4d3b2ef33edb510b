//! Infix expression parser for computed columns.
//!
//! The output is a token stream, not an AST: operands and the operators
//! `+ - * /` are kept in source order and parenthesised parts become nested
//! lists. Precedence is left to the server that evaluates the `Expr`.

use serde::{Deserialize, Serialize};

use crate::types::{QueryError, QueryResult};

/// One element of an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprNode {
    Token(String),
    Group(Vec<ExprNode>),
}

impl From<&str> for ExprNode {
    fn from(token: &str) -> Self {
        ExprNode::Token(token.to_string())
    }
}

impl From<Vec<ExprNode>> for ExprNode {
    fn from(group: Vec<ExprNode>) -> Self {
        ExprNode::Group(group)
    }
}

/// A parsed expression, as sent in the `Expr` field of a projection.
pub type ExprTree = Vec<ExprNode>;

fn is_operator(ch: char) -> bool {
    matches!(ch, '+' | '-' | '*' | '/')
}

/// Parse an infix expression such as `Profit+Commission+Swap`.
pub fn parse_expr(input: &str) -> QueryResult<ExprTree> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut pos = 0;
    parse_group(&chars, &mut pos, None)
}

/// Parse until end of input, or until the `)` matching the `(` at
/// `opened_at`. On return `pos` points just past the consumed `)`.
fn parse_group(
    chars: &[(usize, char)],
    pos: &mut usize,
    opened_at: Option<usize>,
) -> QueryResult<ExprTree> {
    let mut result = Vec::new();
    let mut operand = String::new();

    while *pos < chars.len() {
        let (offset, ch) = chars[*pos];
        *pos += 1;

        match ch {
            '(' => {
                flush(&mut operand, &mut result);
                let group = parse_group(chars, pos, Some(offset))?;
                result.push(ExprNode::Group(group));
            }
            ')' => {
                if opened_at.is_none() {
                    return Err(QueryError::UnbalancedParenthesis { position: offset });
                }
                flush(&mut operand, &mut result);
                return Ok(result);
            }
            c if is_operator(c) => {
                flush(&mut operand, &mut result);
                result.push(ExprNode::Token(c.to_string()));
            }
            ' ' => {}
            c => operand.push(c),
        }
    }

    if let Some(position) = opened_at {
        return Err(QueryError::UnbalancedParenthesis { position });
    }

    flush(&mut operand, &mut result);
    Ok(result)
}

fn flush(operand: &mut String, result: &mut Vec<ExprNode>) {
    if !operand.is_empty() {
        result.push(ExprNode::Token(std::mem::take(operand)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(tree: &ExprTree) -> serde_json::Value {
        serde_json::to_value(tree).unwrap()
    }

    #[test]
    fn test_flat_sum() {
        let tree = parse_expr("Profit+Commission+Swap").unwrap();
        assert_eq!(to_json(&tree), json!(["Profit", "+", "Commission", "+", "Swap"]));
    }

    #[test]
    fn test_parenthesised_group() {
        let tree = parse_expr("A+(B-C)").unwrap();
        assert_eq!(to_json(&tree), json!(["A", "+", ["B", "-", "C"]]));
    }

    #[test]
    fn test_spaces_are_skipped() {
        let tree = parse_expr("  Close Price * Volume ").unwrap();
        assert_eq!(to_json(&tree), json!(["ClosePrice", "*", "Volume"]));
    }

    #[test]
    fn test_group_then_operand() {
        let tree = parse_expr("(A/B)*C").unwrap();
        assert_eq!(
            tree,
            vec![
                ExprNode::Group(vec!["A".into(), "/".into(), "B".into()]),
                "*".into(),
                "C".into(),
            ]
        );
    }

    #[test]
    fn test_nested_groups() {
        let tree = parse_expr("A*(B+(C-D))").unwrap();
        assert_eq!(to_json(&tree), json!(["A", "*", ["B", "+", ["C", "-", "D"]]]));
    }

    #[test]
    fn test_operand_before_paren_is_flushed() {
        let tree = parse_expr("abs(Profit)").unwrap();
        assert_eq!(to_json(&tree), json!(["abs", ["Profit"]]));
    }

    #[test]
    fn test_dotted_column_stays_one_operand() {
        let tree = parse_expr("AccountNumbers.Balance-Profit").unwrap();
        assert_eq!(to_json(&tree), json!(["AccountNumbers.Balance", "-", "Profit"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_expr("").unwrap().is_empty());
        assert!(parse_expr("   ").unwrap().is_empty());
    }

    #[test]
    fn test_stray_close_rejected() {
        let err = parse_expr("A+B)").unwrap_err();
        assert_eq!(err, QueryError::UnbalancedParenthesis { position: 3 });
    }

    #[test]
    fn test_unclosed_open_rejected() {
        let err = parse_expr("A+(B-C").unwrap_err();
        assert_eq!(err, QueryError::UnbalancedParenthesis { position: 2 });
    }
}
