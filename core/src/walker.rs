//! Compiles a [`Schema`] into a [`Plan`]: the statement tree, the number of
//! binding slots, and the completion steps that copy slots into a value.
//!
//! The walk runs in two passes. The first pass visits fields in declaration
//! order and records steps relative to the scope they belong to (a column
//! index, or a join index). The second pass lays the binding slots out in the
//! same depth-first order the renderer emits columns in, and resolves each
//! step to an absolute slot.

use std::borrow::Cow;

use crate::error::DeclarationError;
use crate::naming::{ElementInfo, Namer};
use crate::schema::{FieldKind, Marker, Schema, Shape};
use crate::statement::{Column, JoinKind, Statement};

/// A resolved completion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Copy `slot` into the scalar field.
    Column { field: usize, slot: usize },
    /// Descend into a nested single or embedded value.
    Nested { field: usize, steps: Vec<Completion> },
    /// Find or append the element identified by `ident` in a collection,
    /// deduplicated through the map numbered `node`.
    Many {
        field: usize,
        ident: usize,
        node: usize,
        steps: Vec<Completion>,
    },
}

/// How rows map onto the root result collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RootCompletion {
    /// Identity slot and dedup map of the root; `None` appends one result per row.
    pub(crate) ident: Option<(usize, usize)>,
    pub(crate) steps: Vec<Completion>,
}

/// A compiled row shape.
#[derive(Debug, Clone)]
pub struct Plan {
    statement: Statement,
    slots: usize,
    nodes: usize,
    pub(crate) root: RootCompletion,
}

impl Plan {
    /// Compiles the schema of `S`.
    pub fn of<S: Shape>(namer: &dyn Namer) -> Result<Self, DeclarationError> {
        Self::build(S::schema(), namer)
    }

    /// Compiles a schema. Fails on declaration mistakes, before any SQL exists.
    pub fn build(schema: &Schema, namer: &dyn Namer) -> Result<Self, DeclarationError> {
        let dedup = schema.has_many();
        let ident = dedup.then(|| namer.ident(ElementInfo::new(schema.name.unwrap_or_default())));
        let scope = Walker { namer }.walk(schema, 0, ident)?;

        let mut slots = 0;
        let layout = Layout::of(&scope.statement, &mut slots);
        let mut nodes = 0;
        let root_ident = dedup.then(|| {
            nodes += 1;
            (layout.base, 0)
        });
        let steps = resolve(scope.steps, &layout, &mut nodes);

        Ok(Self {
            statement: scope.statement,
            slots,
            nodes,
            root: RootCompletion {
                ident: root_ident,
                steps,
            },
        })
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// The rendered SQL text.
    pub fn sql(&self) -> String {
        self.statement.sql()
    }

    /// Number of binding slots, equal to the number of rendered columns.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Number of dedup maps a hydrator needs.
    pub(crate) fn nodes(&self) -> usize {
        self.nodes
    }

    /// True when rows fan out into has-many collections, so the root result is
    /// deduplicated by its identity column.
    pub fn has_many(&self) -> bool {
        self.root.ident.is_some()
    }
}

/// A completion step relative to its scope.
#[derive(Debug)]
enum Step {
    Column { field: usize, column: usize },
    Embedded { field: usize, steps: Vec<Step> },
    Join {
        field: usize,
        join: usize,
        many: bool,
        steps: Vec<Step>,
    },
}

struct Scope {
    statement: Statement,
    steps: Vec<Step>,
}

/// Markers collected from embedded shapes. They are placed before the
/// embedding shape's own markers of the same kind.
#[derive(Default)]
struct Inherited {
    table: Option<Cow<'static, str>>,
    conditions: Vec<Cow<'static, str>>,
    group: Vec<Cow<'static, str>>,
    order: Vec<Cow<'static, str>>,
    limit: Option<Cow<'static, str>>,
    offset: Option<Cow<'static, str>>,
    join: JoinKind,
}

struct Walker<'n> {
    namer: &'n dyn Namer,
}

impl Walker<'_> {
    fn walk(
        &self,
        schema: &Schema,
        depth: usize,
        ident: Option<String>,
    ) -> Result<Scope, DeclarationError> {
        let mut stmt = Statement {
            columns: Vec::with_capacity(schema.fields.len() + 1),
            ..Default::default()
        };
        if let Some(ident) = ident {
            stmt.columns.push(Column::qualified(ident));
        }
        let mut steps = Vec::with_capacity(schema.fields.len());
        let mut inherited = Inherited::default();

        for (index, field) in schema.fields.iter().enumerate() {
            match field.kind {
                FieldKind::Marker(marker) => apply_marker(&mut stmt, marker),
                FieldKind::Column { expr } => {
                    let column = match (expr, field.name) {
                        (Some(expr), _) => Column::raw(expr),
                        (None, Some(name)) => {
                            Column::qualified(self.namer.column(ElementInfo::new(name)))
                        }
                        (None, None) => {
                            return Err(DeclarationError::UnnamedColumn {
                                shape: schema.display_name().to_owned(),
                                index,
                            });
                        }
                    };
                    steps.push(Step::Column {
                        field: index,
                        column: stmt.columns.len(),
                    });
                    stmt.columns.push(column);
                }
                FieldKind::Embedded { schema: child } => {
                    let child = self.walk(child(), depth + 1, None)?;
                    let columns = stmt.columns.len();
                    let joins = stmt.joins.len();
                    let child_stmt = child.statement;

                    stmt.columns.extend(child_stmt.columns);
                    stmt.joins.extend(child_stmt.joins);
                    inherited.conditions.extend(child_stmt.conditions);
                    inherited.group.extend(child_stmt.group);
                    inherited.order.extend(child_stmt.order);
                    if !child_stmt.table.is_empty() {
                        inherited.table.get_or_insert(child_stmt.table);
                    }
                    if let Some(limit) = child_stmt.limit {
                        inherited.limit.get_or_insert(limit);
                    }
                    if let Some(offset) = child_stmt.offset {
                        inherited.offset.get_or_insert(offset);
                    }
                    if inherited.join == JoinKind::None {
                        inherited.join = child_stmt.join;
                    }

                    steps.push(Step::Embedded {
                        field: index,
                        steps: shift(child.steps, columns, joins),
                    });
                }
                FieldKind::One { on, schema: child } | FieldKind::Many { on, schema: child } => {
                    let many = matches!(field.kind, FieldKind::Many { .. });
                    let Some(on) = on else {
                        return Err(DeclarationError::MissingJoinPredicate {
                            shape: schema.display_name().to_owned(),
                            field: field
                                .name
                                .map_or_else(|| format!("#{index}"), str::to_owned),
                        });
                    };
                    let child_schema = child();
                    let ident = many.then(|| {
                        let name = child_schema.name.or(field.name).unwrap_or_default();
                        self.namer.ident(ElementInfo::new(name))
                    });

                    let mut child = self.walk(child_schema, depth + 1, ident)?;
                    if child.statement.table.is_empty() {
                        let Some(name) = field.name else {
                            return Err(DeclarationError::UnnamedJoin {
                                shape: schema.display_name().to_owned(),
                                index,
                            });
                        };
                        child.statement.table = self.namer.table(ElementInfo::new(name)).into();
                    }
                    if child.statement.join == JoinKind::None {
                        child.statement.join = JoinKind::Inner;
                    }
                    child.statement.on = Some(Cow::Borrowed(on));

                    steps.push(Step::Join {
                        field: index,
                        join: stmt.joins.len(),
                        many,
                        steps: child.steps,
                    });
                    stmt.joins.push(child.statement);
                }
            }
        }

        inherited.conditions.append(&mut stmt.conditions);
        stmt.conditions = inherited.conditions;
        inherited.group.append(&mut stmt.group);
        stmt.group = inherited.group;
        inherited.order.append(&mut stmt.order);
        stmt.order = inherited.order;
        if stmt.table.is_empty() {
            if let Some(table) = inherited.table {
                stmt.table = table;
            }
        }
        if stmt.limit.is_none() {
            stmt.limit = inherited.limit;
        }
        if stmt.offset.is_none() {
            stmt.offset = inherited.offset;
        }
        if stmt.join == JoinKind::None {
            stmt.join = inherited.join;
        }

        if depth == 0 && stmt.table.is_empty() {
            let name = schema.name.ok_or(DeclarationError::UnnamedTable)?;
            stmt.table = self.namer.table(ElementInfo::new(name)).into();
        }

        Ok(Scope {
            statement: stmt,
            steps,
        })
    }
}

fn apply_marker(stmt: &mut Statement, marker: Marker) {
    match marker {
        Marker::Table(table) => stmt.table = Cow::Borrowed(table),
        Marker::Conditions(condition) => stmt.conditions.push(Cow::Borrowed(condition)),
        Marker::GroupBy(group) => stmt.group.push(Cow::Borrowed(group)),
        Marker::OrderBy(order) => stmt.order.push(Cow::Borrowed(order)),
        Marker::Limit(limit) => stmt.limit = Some(Cow::Borrowed(limit)),
        Marker::Offset(offset) => stmt.offset = Some(Cow::Borrowed(offset)),
        Marker::LeftJoin => stmt.join = JoinKind::Left,
    }
}

/// Re-bases the steps of an embedded scope after its columns and joins were
/// appended to the embedding scope.
fn shift(steps: Vec<Step>, columns: usize, joins: usize) -> Vec<Step> {
    steps
        .into_iter()
        .map(|step| match step {
            Step::Column { field, column } => Step::Column {
                field,
                column: column + columns,
            },
            Step::Embedded { field, steps } => Step::Embedded {
                field,
                steps: shift(steps, columns, joins),
            },
            Step::Join {
                field,
                join,
                many,
                steps,
            } => Step::Join {
                field,
                join: join + joins,
                many,
                steps,
            },
        })
        .collect()
}

/// First binding slot of every scope, in render order.
struct Layout {
    base: usize,
    joins: Vec<Layout>,
}

impl Layout {
    fn of(stmt: &Statement, next: &mut usize) -> Self {
        let base = *next;
        *next += stmt.columns.len();
        let joins = stmt.joins.iter().map(|join| Layout::of(join, next)).collect();
        Self { base, joins }
    }
}

fn resolve(steps: Vec<Step>, layout: &Layout, nodes: &mut usize) -> Vec<Completion> {
    steps
        .into_iter()
        .map(|step| match step {
            Step::Column { field, column } => Completion::Column {
                field,
                slot: layout.base + column,
            },
            Step::Embedded { field, steps } => Completion::Nested {
                field,
                steps: resolve(steps, layout, nodes),
            },
            Step::Join {
                field,
                join,
                many,
                steps,
            } => {
                let child = &layout.joins[join];
                if many {
                    let node = *nodes;
                    *nodes += 1;
                    Completion::Many {
                        field,
                        ident: child.base,
                        node,
                        steps: resolve(steps, child, nodes),
                    }
                } else {
                    Completion::Nested {
                        field,
                        steps: resolve(steps, child, nodes),
                    }
                }
            }
        })
        .collect()
}
