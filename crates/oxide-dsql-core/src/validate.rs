//! Structural rules shared by the assembler and the clause compiler.
//!
//! The assembler runs the chain checks over a whole statement before any
//! text is emitted, and the clause compiler runs the item checks again while
//! emitting each item. Both sites call these functions.

use crate::error::{BuildError, Result};
use crate::model::{Cast, CastType, CombineItem, FromItem, StatementSpec};

/// Checks one combine item against its position in a chain of `len`.
///
/// # Errors
///
/// Returns [`BuildError::MalformedSequence`] if a non-last item lacks a
/// set operation, or the last item carries one or carries `all`.
pub fn check_combine_item(index: usize, len: usize, item: &CombineItem) -> Result<()> {
    let last = index + 1 == len;
    if last {
        if item.kind.is_some() {
            return Err(BuildError::sequence(
                "COMBINE",
                index,
                "last item cannot have 'type'",
            ));
        }
        if item.all.is_some() {
            return Err(BuildError::sequence(
                "COMBINE",
                index,
                "last item cannot have 'all'",
            ));
        }
    } else if item.kind.is_none() {
        return Err(BuildError::sequence(
            "COMBINE",
            index,
            "item before the last requires 'type'",
        ));
    }
    Ok(())
}

/// Checks a whole combine chain.
///
/// # Errors
///
/// Returns [`BuildError::MalformedClause`] for an empty chain, otherwise the
/// first item failure.
pub fn check_combine_chain(items: &[CombineItem]) -> Result<()> {
    if items.is_empty() {
        return Err(BuildError::malformed("COMBINE", "requires at least one item"));
    }
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| check_combine_item(index, items.len(), item))
}

/// Checks one FROM item against its position.
///
/// # Errors
///
/// Returns [`BuildError::MalformedSequence`] if the base relation carries a
/// join kind or predicates, a later item lacks a join kind, a CROSS join
/// has predicates, or any other join lacks them.
pub fn check_from_item(index: usize, item: &FromItem) -> Result<()> {
    if index == 0 {
        if item.kind.is_some() {
            return Err(BuildError::sequence(
                "FROM",
                index,
                "first item cannot have 'type'",
            ));
        }
        if item.on.is_some() {
            return Err(BuildError::sequence(
                "FROM",
                index,
                "first item cannot have 'on'",
            ));
        }
        return Ok(());
    }
    let Some(kind) = item.kind else {
        return Err(BuildError::sequence(
            "FROM",
            index,
            "join item requires 'type'",
        ));
    };
    match (&item.on, kind.requires_on()) {
        (Some(_), false) => Err(BuildError::sequence(
            "FROM",
            index,
            format!("{kind} JOIN cannot have 'on'"),
        )),
        (None, true) => Err(BuildError::sequence(
            "FROM",
            index,
            format!("{kind} JOIN requires 'on'"),
        )),
        (Some(on), true) if on.is_empty() => Err(BuildError::sequence(
            "FROM",
            index,
            format!("{kind} JOIN requires at least one 'on' predicate"),
        )),
        _ => Ok(()),
    }
}

/// Checks a whole FROM chain.
///
/// # Errors
///
/// Returns [`BuildError::MalformedClause`] for an empty chain, otherwise the
/// first item failure.
pub fn check_from_chain(items: &[FromItem]) -> Result<()> {
    if items.is_empty() {
        return Err(BuildError::malformed("FROM", "requires at least one item"));
    }
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| check_from_item(index, item))
}

/// Checks which verbs a statement combines.
///
/// A statement needs a verb: `delete`, `insert`, `select`, `update`,
/// `values`, or `combine`. A combine chain stands alone apart from the
/// trailing ORDER BY, LIMIT and OFFSET. `insert` takes its rows from
/// exactly one of `select` or `values`; no other verbs mix.
///
/// # Errors
///
/// Returns [`BuildError::MalformedClause`] naming the conflict.
pub fn check_verbs(spec: &StatementSpec) -> Result<()> {
    if spec.combine.is_some() {
        if spec.with.is_some() || spec.has_verb() {
            return Err(BuildError::malformed(
                "statement",
                "'combine' cannot be mixed with 'with', a verb or 'values'",
            ));
        }
        if spec.from.is_some()
            || spec.where_.is_some()
            || spec.group_by.is_some()
            || spec.having.is_some()
            || spec.returning.is_some()
        {
            return Err(BuildError::malformed(
                "statement",
                "'combine' only accepts 'order_by', 'limit' and 'offset' alongside",
            ));
        }
        return Ok(());
    }
    if !spec.has_verb() {
        return Err(BuildError::malformed(
            "statement",
            "requires one of 'delete', 'insert', 'select', 'update', 'values' or 'combine'",
        ));
    }
    let writes = [spec.delete, spec.insert.is_some(), spec.update.is_some()]
        .into_iter()
        .filter(|present| *present)
        .count();
    if writes > 1 {
        return Err(BuildError::malformed(
            "statement",
            "only one of 'delete', 'insert' and 'update' may be present",
        ));
    }
    if spec.select.is_some() && (spec.delete || spec.update.is_some()) {
        return Err(BuildError::malformed(
            "statement",
            "'select' cannot be mixed with 'delete' or 'update'",
        ));
    }
    if spec.values.is_some() && (spec.delete || spec.update.is_some() || spec.select.is_some()) {
        return Err(BuildError::malformed(
            "VALUES",
            "cannot be mixed with 'delete', 'update' or 'select'",
        ));
    }
    if spec.insert.is_some() && spec.select.is_some() == spec.values.is_some() {
        return Err(BuildError::malformed(
            "INSERT",
            "requires exactly one of 'select' or 'values'",
        ));
    }
    if spec.delete && spec.from.is_none() {
        return Err(BuildError::malformed("DELETE", "requires 'from'"));
    }
    Ok(())
}

/// Checks that CAST modifiers fit together and fit the target type.
///
/// # Errors
///
/// Returns [`BuildError::MalformedClause`] naming the conflicting modifier.
pub fn check_cast(cast: &Cast) -> Result<()> {
    if cast.length.is_some() && cast.precision.is_some() {
        return Err(BuildError::malformed(
            "CAST",
            "'length' and 'precision' are mutually exclusive",
        ));
    }
    if cast.scale.is_some() && cast.precision.is_none() {
        return Err(BuildError::malformed("CAST", "'scale' requires 'precision'"));
    }
    if cast.interval.is_some() && cast.target != CastType::Interval {
        return Err(BuildError::malformed(
            "CAST",
            format!("'interval' is not valid for {}", cast.target),
        ));
    }
    if cast.varying && !cast.target.accepts_varying() {
        return Err(BuildError::malformed(
            "CAST",
            format!("'varying' is not valid for {}", cast.target),
        ));
    }
    if cast.with_time_zone.is_some() && !cast.target.accepts_time_zone() {
        return Err(BuildError::malformed(
            "CAST",
            format!("'with_time_zone' is not valid for {}", cast.target),
        ));
    }
    Ok(())
}
