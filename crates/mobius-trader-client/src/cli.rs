//! Command-line search arguments and their translation into a query.

use clap::Args;
use serde_json::Value;

use mobius_trader::{Connective, QueryBuilder, SortDir};

/// Operators recognised in `--where` clauses, longest first.
const OPERATORS: [&str; 10] = [
    "NOT LIKE", "NOT IN", "LIKE", "IN", ">=", "<=", "!=", "=", ">", "<",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("empty filter")]
    Empty,

    #[error("no column in filter \"{0}\"")]
    MissingColumn(String),

    #[error("no operator in filter \"{0}\"")]
    MissingOperator(String),

    #[error("no value in filter \"{0}\"")]
    MissingValue(String),

    #[error("computed column \"{0}\" must be ALIAS=EXPR")]
    BadComputed(String),
}

/// One `--where` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Condition {
        connective: Connective,
        column: String,
        op: String,
        value: Value,
    },
    Open(Connective),
    Close(Connective),
}

/// Parse a clause such as `Ticket > 0`, `or Login IN [1,2]`, `(`, `or (`
/// or `)`. Values are read as JSON and fall back to a plain string.
pub fn parse_filter(input: &str) -> Result<FilterClause, FilterParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(FilterParseError::Empty);
    }

    let (connective, rest) = split_connective(text);
    match rest {
        "(" => return Ok(FilterClause::Open(connective)),
        ")" => return Ok(FilterClause::Close(connective)),
        _ => {}
    }

    let column_end = rest
        .find(|c: char| c.is_whitespace() || "=!<>".contains(c))
        .unwrap_or(rest.len());
    let column = &rest[..column_end];
    if column.is_empty() {
        return Err(FilterParseError::MissingColumn(input.to_string()));
    }

    let after_column = rest[column_end..].trim_start();
    let (op, after_op) = split_operator(after_column)
        .ok_or_else(|| FilterParseError::MissingOperator(input.to_string()))?;

    let raw = after_op.trim();
    if raw.is_empty() {
        return Err(FilterParseError::MissingValue(input.to_string()));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Ok(FilterClause::Condition {
        connective,
        column: column.to_string(),
        op: op.to_string(),
        value,
    })
}

fn split_connective(text: &str) -> (Connective, &str) {
    for (word, connective) in [("and", Connective::And), ("or", Connective::Or)] {
        if let Some(head) = text.get(..word.len()) {
            let tail = &text[word.len()..];
            let separated = tail.starts_with(char::is_whitespace) || tail.trim_start() == "(";
            if head.eq_ignore_ascii_case(word) && separated {
                return (connective, tail.trim_start());
            }
        }
    }
    (Connective::And, text)
}

fn split_operator(text: &str) -> Option<(&'static str, &str)> {
    OPERATORS.iter().find_map(|op| {
        let head = text.get(..op.len())?;
        if !head.eq_ignore_ascii_case(op) {
            return None;
        }
        let tail = &text[op.len()..];
        let is_word = op.starts_with(|c: char| c.is_ascii_alphabetic());
        if is_word && !(tail.is_empty() || tail.starts_with(char::is_whitespace)) {
            return None;
        }
        Some((*op, tail))
    })
}

/// Split `ALIAS=EXPR`.
pub fn parse_computed(input: &str) -> Result<(String, String), FilterParseError> {
    match input.split_once('=') {
        Some((alias, expr)) if !alias.trim().is_empty() && !expr.trim().is_empty() => {
            Ok((alias.trim().to_string(), expr.trim().to_string()))
        }
        _ => Err(FilterParseError::BadComputed(input.to_string())),
    }
}

/// Flags shared by `compile` and `search`.
#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Search context (Accounts, AccountNumbers, BinaryOptions, Orders).
    #[arg(long = "from")]
    pub context: String,

    /// Column to select. Repeatable. Defaults to the standard order columns.
    #[arg(long = "select", value_name = "COLUMN")]
    pub columns: Vec<String>,

    /// Computed column as ALIAS=EXPR. Repeatable.
    #[arg(long, value_name = "ALIAS=EXPR")]
    pub computed: Vec<String>,

    /// Filter clause, e.g. "Ticket > 0", "or (", ")". Repeatable.
    #[arg(long = "where", value_name = "CLAUSE", allow_hyphen_values = true)]
    pub filters: Vec<String>,

    #[arg(long)]
    pub group_by: Option<String>,

    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    #[arg(long)]
    pub limit: Option<u64>,

    #[arg(long)]
    pub offset: Option<u64>,

    /// Request floating-point values.
    #[arg(long)]
    pub float_mode: bool,
}

impl SearchArgs {
    pub fn to_builder(&self) -> Result<QueryBuilder, FilterParseError> {
        let mut builder = QueryBuilder::with_columns(self.columns.iter().map(String::as_str))
            .from(self.context.as_str());

        for item in &self.computed {
            let (alias, expr) = parse_computed(item)?;
            builder = builder.computed(expr, alias);
        }

        for filter in &self.filters {
            builder = match parse_filter(filter)? {
                FilterClause::Condition {
                    connective: Connective::And,
                    column,
                    op,
                    value,
                } => builder.and_where(column, op, value),
                FilterClause::Condition {
                    connective: Connective::Or,
                    column,
                    op,
                    value,
                } => builder.or_where(column, op, value),
                FilterClause::Open(Connective::And) => builder.and_where_open(),
                FilterClause::Open(Connective::Or) => builder.or_where_open(),
                FilterClause::Close(Connective::And) => builder.and_where_close(),
                FilterClause::Close(Connective::Or) => builder.or_where_close(),
            };
        }

        if let Some(column) = &self.group_by {
            builder = builder.group_by(column.as_str());
        }
        if let Some(column) = &self.order_by {
            let dir = self.desc.then_some(SortDir::Desc);
            builder = builder.order_by(column.as_str(), dir);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(offset) = self.offset {
            builder = builder.offset(offset);
        }

        Ok(builder.float_mode(self.float_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(connective: Connective, column: &str, op: &str, value: Value) -> FilterClause {
        FilterClause::Condition {
            connective,
            column: column.to_string(),
            op: op.to_string(),
            value,
        }
    }

    #[test]
    fn test_parse_simple_filter() {
        assert_eq!(
            parse_filter("Ticket > 0").unwrap(),
            condition(Connective::And, "Ticket", ">", json!(0))
        );
        assert_eq!(
            parse_filter("Ticket>=10").unwrap(),
            condition(Connective::And, "Ticket", ">=", json!(10))
        );
    }

    #[test]
    fn test_parse_connective_and_word_operator() {
        assert_eq!(
            parse_filter("or TradeCmd in [0, 1]").unwrap(),
            condition(Connective::Or, "TradeCmd", "IN", json!([0, 1]))
        );
        assert_eq!(
            parse_filter("Email NOT LIKE %@test.com").unwrap(),
            condition(Connective::And, "Email", "NOT LIKE", json!("%@test.com"))
        );
    }

    #[test]
    fn test_column_named_like_connective() {
        assert_eq!(
            parse_filter("Order = 5").unwrap(),
            condition(Connective::And, "Order", "=", json!(5))
        );
    }

    #[test]
    fn test_parse_group_markers() {
        assert_eq!(parse_filter("(").unwrap(), FilterClause::Open(Connective::And));
        assert_eq!(parse_filter("or (").unwrap(), FilterClause::Open(Connective::Or));
        assert_eq!(parse_filter(" ) ").unwrap(), FilterClause::Close(Connective::And));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_filter("  "), Err(FilterParseError::Empty));
        assert!(matches!(
            parse_filter("Ticket"),
            Err(FilterParseError::MissingOperator(_))
        ));
        assert!(matches!(
            parse_filter("Ticket ="),
            Err(FilterParseError::MissingValue(_))
        ));
        assert!(matches!(
            parse_filter("= 5"),
            Err(FilterParseError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_parse_computed() {
        assert_eq!(
            parse_computed("Net=Profit-Swap").unwrap(),
            ("Net".to_string(), "Profit-Swap".to_string())
        );
        assert!(parse_computed("Profit").is_err());
    }

    #[test]
    fn test_args_compile_to_document() {
        let args = SearchArgs {
            context: "Orders".to_string(),
            columns: vec!["Ticket".to_string()],
            filters: vec![
                "AccountNumberId = 487252".to_string(),
                "(".to_string(),
                "TradeCmd = 0".to_string(),
                "or TradeCmd = 1".to_string(),
                ")".to_string(),
            ],
            order_by: Some("Ticket".to_string()),
            desc: true,
            limit: Some(5),
            ..Default::default()
        };

        let doc = args.to_builder().unwrap().compile().unwrap().to_value();
        assert_eq!(doc["Context"], "Orders");
        assert_eq!(doc["Select"], json!(["Ticket"]));
        assert_eq!(
            doc["Where"],
            json!([
                "AccountNumberId", "=", 487252, "AND",
                ["TradeCmd", "=", 0, "OR", "TradeCmd", "=", 1]
            ])
        );
        assert_eq!(doc["SortDir"], "DESC");
        assert_eq!(doc["Limit"], 5);
    }
}
