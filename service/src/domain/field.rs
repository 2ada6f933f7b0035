//! [`Field`] definitions.

use std::fmt;

use crate::read::Lookup;

/// Single column of an entity table.
///
/// Allows updating or probing a column of any entity without spelling out a
/// dedicated operation for each of them, while keeping the table and column
/// names, the ID type and the value type known at compile time.
pub trait Field {
    /// Name of the table the column belongs to.
    const TABLE: &'static str;

    /// Name of the column.
    const COLUMN: &'static str;

    /// Type of the primary key of the table.
    type Id: Copy + fmt::Debug;

    /// Type of the column value.
    type Value: fmt::Debug;
}

/// New value of a single [`Field`] of the row looked up by its ID.
#[derive(Debug)]
pub struct SingleField<F: Field> {
    /// [`Lookup`] of the row to update.
    pub lookup: Lookup<F::Id>,

    /// New value of the [`Field`].
    pub value: F::Value,
}

/// Probe for a row having the provided [`Field`] value.
#[derive(Debug)]
pub struct Probe<F: Field> {
    /// Value to look for.
    pub value: F::Value,
}
