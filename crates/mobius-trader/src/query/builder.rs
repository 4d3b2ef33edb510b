//! Fluent search builder.

use serde_json::Value;

use crate::remote::RemoteCall;
use crate::result::ResultSet;
use crate::types::{QueryError, QueryResult};

use super::condition::Condition;
use super::document::{Projection, Query, QueryDocument, SortDir, DEFAULT_SELECT};
use super::expr::parse_expr;
use super::predicate::{Connective, Predicate};

/// A projection as given to the builder. Computed columns are parsed when
/// the query is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    Column(String),
    Computed { expr: String, alias: String },
}

impl SelectItem {
    fn compile(&self) -> QueryResult<Projection> {
        match self {
            SelectItem::Column(name) => Ok(Projection::Column(name.clone())),
            SelectItem::Computed { expr, alias } => Ok(Projection::Computed {
                expr: parse_expr(expr)?,
                alias: alias.clone(),
            }),
        }
    }
}

impl From<&str> for SelectItem {
    fn from(name: &str) -> Self {
        SelectItem::Column(name.to_string())
    }
}

impl From<String> for SelectItem {
    fn from(name: String) -> Self {
        SelectItem::Column(name)
    }
}

impl From<(&str, &str)> for SelectItem {
    fn from((expr, alias): (&str, &str)) -> Self {
        SelectItem::Computed {
            expr: expr.to_string(),
            alias: alias.to_string(),
        }
    }
}

impl From<[&str; 2]> for SelectItem {
    fn from([expr, alias]: [&str; 2]) -> Self {
        SelectItem::from((expr, alias))
    }
}

/// Mutable builder producing an immutable [`Query`].
///
/// ```
/// use mobius_trader::{Op, QueryBuilder, SearchContext, SortDir};
///
/// let query = QueryBuilder::new()
///     .from(SearchContext::Orders)
///     .filter("AccountNumberId", Op::Eq, 487252)
///     .and_where("TradeCmd", Op::In, vec![0, 1])
///     .order_by("Ticket", Some(SortDir::Desc))
///     .limit(10)
///     .compile()
///     .unwrap();
/// assert_eq!(query.document().context, "Orders");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    context: Option<String>,
    select: Vec<SelectItem>,
    predicate: Predicate,
    group_by: Option<String>,
    sort_by: Option<String>,
    sort_dir: Option<SortDir>,
    limit: Option<u64>,
    offset: Option<u64>,
    float_mode: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder starting from the given projection.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        Self::new().select(columns)
    }

    // ─── Target and projection ───────────────────────────

    /// Set the logical table to search.
    #[must_use]
    pub fn from(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replace the projection list.
    #[must_use]
    pub fn select<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        self.select = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.select.push(SelectItem::Column(name.into()));
        self
    }

    /// Add a server-evaluated column such as `("Profit+Swap", "Total")`.
    #[must_use]
    pub fn computed(mut self, expr: impl Into<String>, alias: impl Into<String>) -> Self {
        self.select.push(SelectItem::Computed {
            expr: expr.into(),
            alias: alias.into(),
        });
        self
    }

    // ─── Conditions ──────────────────────────────────────

    /// Alias of [`QueryBuilder::and_where`].
    #[must_use]
    pub fn filter(
        self,
        column: impl Into<String>,
        op: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Self {
        self.and_where(column, op, value)
    }

    #[must_use]
    pub fn and_where(
        mut self,
        column: impl Into<String>,
        op: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Self {
        self.predicate
            .condition(Connective::And, Condition::new(column, op, value));
        self
    }

    #[must_use]
    pub fn or_where(
        mut self,
        column: impl Into<String>,
        op: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Self {
        self.predicate
            .condition(Connective::Or, Condition::new(column, op, value));
        self
    }

    /// Alias of [`QueryBuilder::and_where_open`].
    #[must_use]
    pub fn where_open(self) -> Self {
        self.and_where_open()
    }

    /// Open an `AND (...)` group.
    #[must_use]
    pub fn and_where_open(mut self) -> Self {
        self.predicate.open(Connective::And);
        self
    }

    /// Open an `OR (...)` group.
    #[must_use]
    pub fn or_where_open(mut self) -> Self {
        self.predicate.open(Connective::Or);
        self
    }

    /// Alias of [`QueryBuilder::and_where_close`].
    #[must_use]
    pub fn where_close(self) -> Self {
        self.and_where_close()
    }

    #[must_use]
    pub fn and_where_close(mut self) -> Self {
        self.predicate.close(Connective::And);
        self
    }

    #[must_use]
    pub fn or_where_close(mut self) -> Self {
        self.predicate.close(Connective::Or);
        self
    }

    // ─── Grouping, sorting, paging ───────────────────────

    #[must_use]
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    /// Sort by `column`; the direction defaults to ascending.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Option<SortDir>) -> Self {
        self.sort_by = Some(column.into());
        self.sort_dir = direction;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Ask the server for floating-point monetary and price fields instead
    /// of integer-scaled ones.
    #[must_use]
    pub fn float_mode(mut self, enabled: bool) -> Self {
        self.float_mode = enabled;
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    // ─── Compilation and execution ───────────────────────

    /// Compile into an immutable [`Query`]. Pure: repeated calls on an
    /// unchanged builder produce equal queries.
    pub fn compile(&self) -> QueryResult<Query> {
        let context = self.context.clone().ok_or(QueryError::MissingContext)?;

        let select = if self.select.is_empty() {
            DEFAULT_SELECT
                .iter()
                .map(|c| Projection::Column(c.to_string()))
                .collect()
        } else {
            self.select
                .iter()
                .map(SelectItem::compile)
                .collect::<QueryResult<Vec<_>>>()?
        };

        let where_clause = self.predicate.compile()?;

        let (sort_by, sort_dir) = match &self.sort_by {
            Some(column) => (Some(column.clone()), Some(self.sort_dir.unwrap_or_default())),
            None => (None, None),
        };

        let document = QueryDocument {
            context,
            select,
            where_clause,
            group_by: self.group_by.clone(),
            sort_by,
            sort_dir,
            limit: self.limit,
            offset: self.offset,
            float_mode: self.float_mode,
        };

        tracing::debug!(
            "Compiled search on {} with {} projection(s)",
            document.context,
            document.select.len()
        );

        Ok(Query::new(document))
    }

    /// Compile, then run the query through `caller`.
    pub async fn execute<C>(&self, caller: &C) -> Result<ResultSet, C::Error>
    where
        C: RemoteCall + ?Sized,
        C::Error: From<QueryError>,
    {
        let query = self.compile()?;
        query.execute(caller).await
    }
}
