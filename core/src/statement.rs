//! The statement tree and its SQL rendering.

use std::borrow::Cow;
use std::fmt::{self, Display};

/// A selected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub expr: Cow<'static, str>,
    /// Prefix the expression with the owning statement's table name. This
    /// keeps columns of joined tables with equal names apart.
    pub qualified: bool,
}

impl Column {
    pub fn qualified(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            expr: name.into(),
            qualified: true,
        }
    }

    pub fn raw(expr: impl Into<Cow<'static, str>>) -> Self {
        Self {
            expr: expr.into(),
            qualified: false,
        }
    }
}

/// How a statement is joined to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    None,
    Inner,
    Left,
}

impl JoinKind {
    const fn keyword(self) -> Option<&'static str> {
        match self {
            JoinKind::None => None,
            JoinKind::Inner => Some(" INNER JOIN "),
            JoinKind::Left => Some(" LEFT JOIN "),
        }
    }
}

/// The properties of one table scope of a SELECT, with joined scopes nested in
/// [`Statement::joins`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pub table: Cow<'static, str>,
    pub columns: Vec<Column>,
    pub conditions: Vec<Cow<'static, str>>,
    pub group: Vec<Cow<'static, str>>,
    pub order: Vec<Cow<'static, str>>,
    pub limit: Option<Cow<'static, str>>,
    pub offset: Option<Cow<'static, str>>,
    pub join: JoinKind,
    pub on: Option<Cow<'static, str>>,
    pub joins: Vec<Statement>,
}

impl Statement {
    /// Renders the statement tree as a SELECT query.
    ///
    /// Columns, joins, conditions, groups and orders are gathered depth-first
    /// in declaration order, so the select list lines up with the binding
    /// slots. LIMIT and OFFSET are taken from the root only.
    pub fn sql(&self) -> String {
        let mut query = String::with_capacity(128);
        query.push_str("SELECT ");
        let mut first = true;
        self.write_columns(&mut query, &mut first);
        query.push_str(" FROM ");
        query.push_str(&self.table);

        for join in &self.joins {
            join.write_join(&mut query);
        }

        let mut conditions = Vec::new();
        let mut group = Vec::new();
        let mut order = Vec::new();
        self.gather(&mut conditions, &mut group, &mut order);

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            for (i, condition) in conditions.iter().enumerate() {
                if i > 0 {
                    query.push_str(" AND ");
                }
                query.push('(');
                query.push_str(condition);
                query.push(')');
            }
        }
        write_list(&mut query, " GROUP BY ", &group);
        write_list(&mut query, " ORDER BY ", &order);
        if let Some(limit) = &self.limit {
            query.push_str(" LIMIT ");
            query.push_str(limit);
        }
        if let Some(offset) = &self.offset {
            query.push_str(" OFFSET ");
            query.push_str(offset);
        }

        query
    }

    /// Number of columns selected by this statement and all of its joins.
    pub fn column_count(&self) -> usize {
        self.columns.len() + self.joins.iter().map(Statement::column_count).sum::<usize>()
    }

    fn write_columns(&self, w: &mut String, first: &mut bool) {
        for col in &self.columns {
            if !*first {
                w.push_str(", ");
            }
            *first = false;
            if col.qualified {
                w.push_str(&self.table);
                w.push('.');
            }
            w.push_str(&col.expr);
        }
        for join in &self.joins {
            join.write_columns(w, first);
        }
    }

    fn write_join(&self, w: &mut String) {
        let Some(keyword) = self.join.keyword() else {
            return;
        };
        w.push_str(keyword);
        w.push_str(&self.table);
        w.push_str(" ON ");
        w.push_str(self.on.as_deref().unwrap_or_default());

        for join in &self.joins {
            join.write_join(w);
        }
    }

    fn gather<'s>(
        &'s self,
        conditions: &mut Vec<&'s str>,
        group: &mut Vec<&'s str>,
        order: &mut Vec<&'s str>,
    ) {
        conditions.extend(self.conditions.iter().map(AsRef::as_ref));
        group.extend(self.group.iter().map(AsRef::as_ref));
        order.extend(self.order.iter().map(AsRef::as_ref));
        for join in &self.joins {
            join.gather(conditions, group, order);
        }
    }
}

fn write_list(w: &mut String, keyword: &str, items: &[&str]) {
    if items.is_empty() {
        return;
    }
    w.push_str(keyword);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.push_str(", ");
        }
        w.push_str(item);
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}
