//! Column diffing.
//!
//! `compute_changes` compares an existing column against a proposed one and returns the
//! alterations in the order they must be applied.

use super::descriptor::{ColumnDescriptor, Nullability, TypeSpec};

/// One atomic column alteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOp {
    /// Data type, type name, precision or scale differ; carries the full proposed type
    TypeChange(TypeSpec),
    /// Carries the target nullability
    NullabilityChange(Nullability),
    /// Never supported on an existing column
    AutoIncrementChange(bool),
    /// `None` drops the default
    DefaultChange(Option<String>),
    /// Carries the new column name
    RenameChange(String),
}

impl ChangeOp {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeOp::TypeChange(_) => "type",
            ChangeOp::NullabilityChange(_) => "nullability",
            ChangeOp::AutoIncrementChange(_) => "autoincrement",
            ChangeOp::DefaultChange(_) => "default",
            ChangeOp::RenameChange(_) => "rename",
        }
    }
}

/// Compute the ordered alterations that turn `existing` into `proposed`
///
/// The order is fixed (type, nullability, autoincrement, default, rename) regardless of which
/// differences are present, since later statements can rely on earlier ones having succeeded.
#[must_use]
pub fn compute_changes(existing: &ColumnDescriptor, proposed: &ColumnDescriptor) -> Vec<ChangeOp> {
    let mut changes = Vec::new();

    let type_changed = existing.data_type != proposed.data_type
        || existing.type_name != proposed.type_name
        || existing.precision != proposed.precision
        || existing.scale != proposed.scale;
    if type_changed {
        changes.push(ChangeOp::TypeChange(proposed.type_spec()));
    }

    if existing.nullable != proposed.nullable {
        changes.push(ChangeOp::NullabilityChange(proposed.nullable));
    }

    if existing.auto_increment != proposed.auto_increment {
        changes.push(ChangeOp::AutoIncrementChange(proposed.auto_increment));
    }

    if existing.default_text() != proposed.default_text() {
        changes.push(ChangeOp::DefaultChange(
            proposed.default_text().map(str::to_owned),
        ));
    }

    if existing.name != proposed.name {
        changes.push(ChangeOp::RenameChange(proposed.name.clone()));
    }

    changes
}
