pub mod ast;
pub mod builder;
pub mod compiler;
pub mod constraint;
pub mod request;

pub use ast::{Condition, RangeOp};
pub use builder::QueryBuilder;
pub use compiler::{range_bounds, QueryCompiler};
pub use constraint::{Constraint, TermConstraint, WireConstraint};
pub use request::{Direction, QueryOptions, QueryRequest};
