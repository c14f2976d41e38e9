// Filter Layer - Typed field predicates lowered to QueryFragments
//
// One builder type (FieldFilter<T>) carries the fragment; capabilities are
// split per semantic: comparable, ordered, pattern-matchable, set-testable.

pub mod field;
pub mod todo;

// Re-exports
pub use field::{BoolFilter, FieldFilter, FilterValue, IntFilter, StringFilter};
pub use todo::TodoFilter;

use crate::query::QueryFragment;

/// Anything that can contribute a WHERE condition to a parent query.
///
/// Repositories accept `Option<&dyn Filter>`; a filter that contributes no
/// SQL must leave the parent fragment without pieces.
pub trait Filter: Send + Sync {
    fn generate(&self, query: &mut QueryFragment);
}

/// Equality predicates (string, integer, boolean fields)
pub trait Comparable<T> {
    /// `field = ?`
    fn equal(&mut self, value: impl Into<T>) -> &mut Self;

    /// `field <> ?`
    fn not_equal(&mut self, value: impl Into<T>) -> &mut Self;
}

/// Range predicates (integer fields)
pub trait Ordered<T> {
    fn less(&mut self, value: T) -> &mut Self;
    fn less_or_equal(&mut self, value: T) -> &mut Self;
    fn greater(&mut self, value: T) -> &mut Self;
    fn greater_or_equal(&mut self, value: T) -> &mut Self;

    /// `field > ? AND field < ?` (both bounds exclusive)
    fn between(&mut self, low: T, high: T) -> &mut Self;
}

/// LIKE predicates (string fields). Callers supply the wildcard syntax.
pub trait PatternMatch {
    fn like(&mut self, pattern: impl Into<String>) -> &mut Self;
    fn not_like(&mut self, pattern: impl Into<String>) -> &mut Self;
}

/// Set membership (string and integer fields)
pub trait SetMembership<T> {
    /// `field IN (?, ?, ...)`, one placeholder per value.
    ///
    /// An empty set matches no rows and emits `1 = 0`.
    fn is_in<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<T>;
}
