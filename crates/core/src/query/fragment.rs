// Query Fragment - SQL text pieces + positional parameters

use super::{count_placeholders, SqlValue};

/// Accumulator of literal SQL text pieces and their positional parameters.
///
/// Invariant: the number of `?` markers in [`QueryFragment::sql`] equals
/// `params().len()`, and parameters appear in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    prefix: String,
    separator: String,
    pieces: Vec<String>,
    params: Vec<SqlValue>,
}

impl QueryFragment {
    /// Empty fragment with no prefix; pieces are concatenated as-is
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty fragment whose emitted SQL is `prefix + pieces.join(separator)`
    pub fn joined(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            ..Self::default()
        }
    }

    /// Fragment for a WHERE clause: ` WHERE a AND b ...`
    pub fn where_clause() -> Self {
        Self::joined(" WHERE ", " AND ")
    }

    /// Append literal SQL with no parameters
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.pieces.push(text.into());
    }

    /// Append literal SQL and the parameters its placeholders refer to
    pub fn add_text_with_params<I>(&mut self, text: impl Into<String>, params: I)
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let text = text.into();
        let before = self.params.len();
        self.params.extend(params.into_iter().map(Into::into));
        debug_assert_eq!(
            count_placeholders(&text),
            self.params.len() - before,
            "placeholder/parameter mismatch in {:?}",
            text
        );
        self.pieces.push(text);
    }

    /// Append a bare parameter without text
    pub fn add_param(&mut self, param: impl Into<SqlValue>) {
        self.params.push(param.into());
    }

    /// Append bare parameters without text
    pub fn add_params<I>(&mut self, params: I)
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        self.params.extend(params.into_iter().map(Into::into));
    }

    /// Inline a child fragment: its SQL (when non-empty) becomes one piece,
    /// its parameters are appended in order.
    pub fn add_fragment(&mut self, child: &QueryFragment) {
        let sql = child.sql();
        if !sql.is_empty() {
            self.pieces.push(sql);
        }
        self.params.extend(child.params.iter().cloned());
    }

    /// Emitted SQL; empty when nothing was added (no constraint contributed)
    pub fn sql(&self) -> String {
        if self.pieces.is_empty() {
            return String::new();
        }
        format!("{}{}", self.prefix, self.pieces.join(&self.separator))
    }

    /// Parameters in placeholder order
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// True when no text piece has been added
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Drop all pieces and parameters, keeping prefix and separator
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.params.clear();
    }

    /// Consume into `(sql, params)`
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        let sql = self.sql();
        (sql, self.params)
    }
}
