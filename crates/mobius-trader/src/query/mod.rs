//! Search query construction and compilation.

pub mod builder;
pub mod condition;
pub mod document;
pub mod expr;
pub mod predicate;

pub use builder::{QueryBuilder, SelectItem};
pub use condition::{Condition, Op};
pub use document::{Projection, Query, QueryDocument, SortDir, DEFAULT_SELECT};
pub use expr::{parse_expr, ExprNode, ExprTree};
pub use predicate::{compile_predicate, default_predicate, Connective, Predicate, PredicateEntry};
