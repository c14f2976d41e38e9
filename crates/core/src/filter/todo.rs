// Todo Filter - FilterSet for the todo entity

use super::{BoolFilter, Filter, IntFilter, StringFilter};
use crate::query::QueryFragment;

/// Filterable fields of a todo, created fresh for each Find request.
///
/// Generation order is the declaration order below, so identical inputs
/// always produce identical SQL and parameter sequences.
#[derive(Debug, Clone)]
pub struct TodoFilter {
    title: StringFilter,
    description: StringFilter,
    category: StringFilter,
    category_id: IntFilter,
    done: BoolFilter,
}

impl TodoFilter {
    pub fn new() -> Self {
        Self {
            title: StringFilter::new("t.title"),
            description: StringFilter::new("t.description"),
            category: StringFilter::new("c.name"),
            category_id: IntFilter::new("c.id"),
            done: BoolFilter::new("t.done"),
        }
    }

    pub fn title(&mut self) -> &mut StringFilter {
        &mut self.title
    }

    pub fn description(&mut self) -> &mut StringFilter {
        &mut self.description
    }

    /// Category name
    pub fn category(&mut self) -> &mut StringFilter {
        &mut self.category
    }

    pub fn category_id(&mut self) -> &mut IntFilter {
        &mut self.category_id
    }

    pub fn done(&mut self) -> &mut BoolFilter {
        &mut self.done
    }

    /// True when at least one predicate has been applied
    pub fn is_active(&self) -> bool {
        self.title.is_active()
            || self.description.is_active()
            || self.category.is_active()
            || self.category_id.is_active()
            || self.done.is_active()
    }
}

impl Default for TodoFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for TodoFilter {
    fn generate(&self, query: &mut QueryFragment) {
        self.title.generate(query);
        self.description.generate(query);
        self.category.generate(query);
        self.category_id.generate(query);
        self.done.generate(query);
    }
}
