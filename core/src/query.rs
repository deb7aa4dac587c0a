//! Query execution: compile a shape, run it through a [`Transaction`], and
//! hydrate the rows.

use crate::error::{QuarryError, Result};
use crate::hydrate::{Bindings, RowHydrator};
use crate::naming::{Namer, default_namer};
use crate::schema::Shape;
use crate::transaction::{Options, RowCursor, Transaction};
use crate::value::Value;
use crate::walker::Plan;

/// Loads every row of `S` and passes each hydrated result through `transform`.
///
/// Shapes with has-many relationships are deduplicated by their identity
/// column, so the result holds one entry per distinct root row. An empty
/// result set yields an empty vector.
///
/// ```ignore
/// let users: Vec<User> = quarry::all(&(), &conn, quarry::identity, &quarry::args![])?;
/// ```
pub fn all<S, D, T, F>(ctx: &T::Context, tx: &T, transform: F, args: &[Value]) -> Result<Vec<D>>
where
    S: Shape,
    T: Transaction,
    F: FnMut(S) -> D,
{
    let plan = Plan::of::<S>(namer(tx))?;
    let results = fetch_all::<S, T>(ctx, tx, &plan, args)?;
    Ok(results.into_iter().map(transform).collect())
}

/// Loads a single row of `S`.
///
/// Fails with [`QuarryError::NotFound`] when the query returns no rows. A
/// shape with has-many relationships loads all rows, so its collections are
/// complete, and keeps the first result.
pub fn one<S, D, T, F>(ctx: &T::Context, tx: &T, transform: F, args: &[Value]) -> Result<D>
where
    S: Shape,
    T: Transaction,
    F: FnOnce(S) -> D,
{
    let plan = Plan::of::<S>(namer(tx))?;
    if plan.has_many() {
        let results = fetch_all::<S, T>(ctx, tx, &plan, args)?;
        return results
            .into_iter()
            .next()
            .map(transform)
            .ok_or(QuarryError::NotFound);
    }

    let sql = plan.sql();
    log(tx, &sql, args);
    let mut bindings = Bindings::for_plan(&plan);
    if !tx.query_row(ctx, &sql, args, bindings.as_mut_slice())? {
        return Err(QuarryError::NotFound);
    }

    let mut value = S::default();
    RowHydrator::new(&plan)
        .complete_one(&bindings, &mut value)
        .map_err(QuarryError::scan)?;
    Ok(transform(value))
}

/// Returns its argument. Use as the transform when the shape is the result.
pub fn identity<S>(value: S) -> S {
    value
}

/// Converts the shape into the result type with its [`From`] impl.
pub fn auto<S, D: From<S>>(value: S) -> D {
    D::from(value)
}

fn namer<T: Transaction>(tx: &T) -> &dyn Namer {
    match tx.options().and_then(Options::namer) {
        Some(namer) => namer,
        None => default_namer(),
    }
}

fn log<T: Transaction>(tx: &T, sql: &str, args: &[Value]) {
    crate::quarry_trace_query!(sql, args.len());
    if let Some(options) = tx.options() {
        options.log(sql, args);
    }
}

fn fetch_all<S: Shape, T: Transaction>(
    ctx: &T::Context,
    tx: &T,
    plan: &Plan,
    args: &[Value],
) -> Result<Vec<S>> {
    let sql = plan.sql();
    log(tx, &sql, args);

    let mut results: Vec<S> = Vec::new();
    tx.query(ctx, &sql, args, |cursor| {
        let read = read_rows(cursor, plan, &mut results);
        let closed = cursor.close().map_err(QuarryError::Close);
        read.and(closed)
    })?;
    Ok(results)
}

fn read_rows<S: Shape>(cursor: &mut dyn RowCursor, plan: &Plan, results: &mut Vec<S>) -> Result<()> {
    let mut bindings = Bindings::for_plan(plan);
    let mut hydrator = RowHydrator::new(plan);
    while cursor.advance().map_err(QuarryError::Close)? {
        cursor
            .scan(bindings.as_mut_slice())
            .map_err(QuarryError::Scan)?;
        hydrator
            .complete(&bindings, &mut *results)
            .map_err(QuarryError::scan)?;
    }
    Ok(())
}
