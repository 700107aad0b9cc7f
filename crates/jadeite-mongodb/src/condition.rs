//! Condition and update expression trees
//!
//! [`Condition`] is the abstract query expression: a leaf compares one field
//! against a value, a composite combines sub-conditions under a logical
//! operator, and `All` is the explicit empty condition that matches every
//! record. Trees are built fresh per query and never mutated after
//! construction; translation into the native BSON form lives in
//! [`crate::query`].
//!
//! [`Update`] is the typed counterpart for update documents. Filters and
//! updates have different grammars on the wire, so they are different types
//! and cannot be mixed.

use bson::Bson;

/// Comparison operator for a single-field condition leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Exists,
    Regex,
}

impl CompareOp {
    /// The native MongoDB operator key
    pub fn as_mongo(&self) -> &'static str {
        match self {
            CompareOp::Eq => "$eq",
            CompareOp::Ne => "$ne",
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
            CompareOp::In => "$in",
            CompareOp::NotIn => "$nin",
            CompareOp::Exists => "$exists",
            CompareOp::Regex => "$regex",
        }
    }
}

/// Logical combinator for composite condition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Nor,
}

impl LogicOp {
    /// The native MongoDB operator key
    pub fn as_mongo(&self) -> &'static str {
        match self {
            LogicOp::And => "$and",
            LogicOp::Or => "$or",
            LogicOp::Nor => "$nor",
        }
    }
}

/// Abstract query expression tree
///
/// The tree is strictly typed: a node is either the match-all `All`, a
/// comparison leaf, or a logical composite, so there is no ambiguity in how a
/// node translates. Malformed content (blank fields, an `In` without an array
/// value, a composite without children) is reported by the translator as a
/// `Condition` error rather than silently producing a wrong filter.
///
/// # Example
///
/// ```ignore
/// use jadeite_mongodb::Condition;
///
/// let adults_named_ada = Condition::and(vec![
///     Condition::gte("age", 18),
///     Condition::eq("name", "ada"),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Matches every record
    #[default]
    All,
    /// Comparison of one field against a value
    Compare {
        field: String,
        op: CompareOp,
        value: Bson,
    },
    /// Logical combination of sub-conditions
    Logic {
        op: LogicOp,
        children: Vec<Condition>,
    },
}

impl Condition {
    /// The empty condition: matches every record
    pub fn all() -> Self {
        Condition::All
    }

    /// Generic comparison leaf
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Bson>) -> Self {
        Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// `field` is one of `values`
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        Self::compare(field, CompareOp::In, Bson::Array(values))
    }

    /// `field` is none of `values`
    pub fn not_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        Self::compare(field, CompareOp::NotIn, Bson::Array(values))
    }

    /// `field` is present (or absent, with `false`)
    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Self::compare(field, CompareOp::Exists, present)
    }

    /// `field` matches the regular expression `pattern`
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Regex, Bson::String(pattern.into()))
    }

    /// All of `children` hold
    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Logic {
            op: LogicOp::And,
            children,
        }
    }

    /// At least one of `children` holds
    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Logic {
            op: LogicOp::Or,
            children,
        }
    }

    /// None of `children` hold
    pub fn nor(children: Vec<Condition>) -> Self {
        Condition::Logic {
            op: LogicOp::Nor,
            children,
        }
    }
}

/// One entry of an [`Update`]
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Write `value` into `field`
    Set { field: String, value: Bson },
    /// Remove `field`
    Unset { field: String },
    /// Add `amount` (which must be numeric) to `field`
    Inc { field: String, amount: Bson },
}

/// Typed update expression
///
/// Collects `$set`/`$unset`/`$inc` entries through a consuming builder; the
/// translator groups them by operator into one native update document. An
/// empty update is malformed (MongoDB rejects empty update documents).
///
/// # Example
///
/// ```ignore
/// use jadeite_mongodb::Update;
///
/// let update = Update::new()
///     .set("name", "ada")
///     .inc("logins", 1)
///     .unset("legacy_flag");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    /// Create an empty update to chain entries onto
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into `field`
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.ops.push(UpdateOp::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Remove `field`
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.ops.push(UpdateOp::Unset {
            field: field.into(),
        });
        self
    }

    /// Add `amount` to `field`
    pub fn inc(mut self, field: impl Into<String>, amount: impl Into<Bson>) -> Self {
        self.ops.push(UpdateOp::Inc {
            field: field.into(),
            amount: amount.into(),
        });
        self
    }

    /// True if no entries were added
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The collected entries, in insertion order
    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all() {
        assert_eq!(Condition::default(), Condition::All);
        assert_eq!(Condition::all(), Condition::All);
    }

    #[test]
    fn test_eq_leaf() {
        let condition = Condition::eq("name", "ada");
        assert_eq!(
            condition,
            Condition::Compare {
                field: "name".to_string(),
                op: CompareOp::Eq,
                value: Bson::String("ada".to_string()),
            }
        );
    }

    #[test]
    fn test_numeric_leaves() {
        let condition = Condition::gte("age", 18);
        match condition {
            Condition::Compare { field, op, value } => {
                assert_eq!(field, "age");
                assert_eq!(op, CompareOp::Gte);
                assert_eq!(value, Bson::Int32(18));
            }
            other => panic!("expected comparison leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_is_in_collects_array() {
        let condition = Condition::is_in("status", ["new", "open"]);
        match condition {
            Condition::Compare { op, value, .. } => {
                assert_eq!(op, CompareOp::In);
                assert_eq!(
                    value,
                    Bson::Array(vec![Bson::String("new".into()), Bson::String("open".into())])
                );
            }
            other => panic!("expected comparison leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_composite_keeps_children_in_order() {
        let condition = Condition::and(vec![
            Condition::gt("score", 10),
            Condition::eq("active", true),
        ]);
        match condition {
            Condition::Logic { op, children } => {
                assert_eq!(op, LogicOp::And);
                assert_eq!(children.len(), 2);
                assert!(matches!(
                    children[0],
                    Condition::Compare {
                        op: CompareOp::Gt,
                        ..
                    }
                ));
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_operator_keys() {
        assert_eq!(CompareOp::Eq.as_mongo(), "$eq");
        assert_eq!(CompareOp::NotIn.as_mongo(), "$nin");
        assert_eq!(LogicOp::And.as_mongo(), "$and");
        assert_eq!(LogicOp::Nor.as_mongo(), "$nor");
    }

    #[test]
    fn test_update_builder_preserves_order() {
        let update = Update::new().set("name", "ada").inc("logins", 1).unset("flag");
        assert!(!update.is_empty());
        assert_eq!(update.ops().len(), 3);
        assert!(matches!(update.ops()[0], UpdateOp::Set { .. }));
        assert!(matches!(update.ops()[1], UpdateOp::Inc { .. }));
        assert!(matches!(update.ops()[2], UpdateOp::Unset { .. }));
    }

    #[test]
    fn test_update_new_is_empty() {
        assert!(Update::new().is_empty());
        assert_eq!(Update::default(), Update::new());
    }
}
