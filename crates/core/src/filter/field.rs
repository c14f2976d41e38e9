// Field Filter - one predicate on one named column

use super::{Comparable, Filter, Ordered, PatternMatch, SetMembership};
use crate::query::{QueryFragment, SqlValue};
use std::marker::PhantomData;

/// SQL emitted by `is_in` with an empty value set
const EMPTY_SET_PREDICATE: &str = "1 = 0";

/// Value types a field filter can bind
pub trait FilterValue: Into<SqlValue> + Clone + Send + Sync + 'static {}

impl FilterValue for String {}
impl FilterValue for i64 {}
impl FilterValue for bool {}

/// Predicate builder for a single column.
///
/// Applying a predicate replaces any predicate applied earlier on the same
/// filter: the last call wins. A filter with no predicate emits no SQL.
#[derive(Debug, Clone)]
pub struct FieldFilter<T> {
    field: String,
    fragment: QueryFragment,
    _value: PhantomData<fn() -> T>,
}

pub type StringFilter = FieldFilter<String>;
pub type IntFilter = FieldFilter<i64>;
pub type BoolFilter = FieldFilter<bool>;

impl<T: FilterValue> FieldFilter<T> {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            fragment: QueryFragment::new(),
            _value: PhantomData,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// The predicate lowered so far
    pub fn fragment(&self) -> &QueryFragment {
        &self.fragment
    }

    pub fn is_active(&self) -> bool {
        !self.fragment.is_empty()
    }

    /// Remove the applied predicate
    pub fn reset(&mut self) -> &mut Self {
        self.fragment.clear();
        self
    }

    fn apply<I>(&mut self, text: String, params: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        self.fragment.clear();
        self.fragment.add_text_with_params(text, params);
        self
    }

    fn binary(&mut self, op: &str, value: T) -> &mut Self {
        let text = format!("{} {} ?", self.field, op);
        self.apply(text, [value])
    }

    fn membership(&mut self, values: Vec<T>) -> &mut Self {
        if values.is_empty() {
            return self.apply(EMPTY_SET_PREDICATE.to_string(), Vec::<SqlValue>::new());
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        let text = format!("{} IN ({})", self.field, placeholders);
        self.apply(text, values)
    }
}

impl<T: FilterValue> Filter for FieldFilter<T> {
    fn generate(&self, query: &mut QueryFragment) {
        query.add_fragment(&self.fragment);
    }
}

impl<T: FilterValue> Comparable<T> for FieldFilter<T> {
    fn equal(&mut self, value: impl Into<T>) -> &mut Self {
        self.binary("=", value.into())
    }

    fn not_equal(&mut self, value: impl Into<T>) -> &mut Self {
        self.binary("<>", value.into())
    }
}

impl PatternMatch for FieldFilter<String> {
    fn like(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.binary("LIKE", pattern.into())
    }

    fn not_like(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.binary("NOT LIKE", pattern.into())
    }
}

impl Ordered<i64> for FieldFilter<i64> {
    fn less(&mut self, value: i64) -> &mut Self {
        self.binary("<", value)
    }

    fn less_or_equal(&mut self, value: i64) -> &mut Self {
        self.binary("<=", value)
    }

    fn greater(&mut self, value: i64) -> &mut Self {
        self.binary(">", value)
    }

    fn greater_or_equal(&mut self, value: i64) -> &mut Self {
        self.binary(">=", value)
    }

    fn between(&mut self, low: i64, high: i64) -> &mut Self {
        let text = format!("{f} > ? AND {f} < ?", f = self.field);
        self.apply(text, [low, high])
    }
}

impl SetMembership<String> for FieldFilter<String> {
    fn is_in<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.membership(values)
    }
}

impl SetMembership<i64> for FieldFilter<i64> {
    fn is_in<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let values: Vec<i64> = values.into_iter().map(Into::into).collect();
        self.membership(values)
    }
}
