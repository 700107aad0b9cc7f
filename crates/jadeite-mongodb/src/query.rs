//! Translation of condition and update trees into native BSON
//!
//! This is the single place where the abstract expression types from
//! [`crate::condition`] become MongoDB filter and update documents. Field
//! names are validated as they are emitted, value shapes are checked against
//! the operator that carries them, and the finished filter is swept for
//! server-side execution operators before it is handed to the driver.
//!
//! Translation rules:
//! - `All` becomes the empty filter `{}`
//! - an equality leaf becomes the direct form `{field: value}`
//! - every other comparison nests the operator, `{field: {"$op": value}}`
//! - a composite becomes `{"$op": [sub, sub, ...]}` and must have at least
//!   one sub-condition (the server rejects empty operator arrays)

use bson::Bson;

use jadeite_common::{JadeiteError, Result};

use crate::condition::{CompareOp, Condition, Update, UpdateOp};
use crate::document::Record;
use crate::validation::{validate_native_document, ValidatedFieldName};

/// Translate a condition tree into a native filter document
///
/// Returns a `Condition` error when the tree is malformed: a blank or
/// reserved field name, a value whose shape does not fit its operator, an
/// empty logical composite, or a value smuggling a server-side execution
/// operator.
pub fn translate_condition(condition: &Condition) -> Result<Record> {
    let document = walk(condition)?;
    validate_native_document(&document)?;
    Ok(document)
}

fn walk(condition: &Condition) -> Result<Record> {
    match condition {
        Condition::All => Ok(Record::new()),
        Condition::Compare { field, op, value } => translate_compare(field, *op, value),
        Condition::Logic { op, children } => {
            if children.is_empty() {
                return Err(JadeiteError::Condition(format!(
                    "logical operator {} requires at least one sub-condition",
                    op.as_mongo()
                )));
            }
            let mut translated = Vec::with_capacity(children.len());
            for child in children {
                translated.push(Bson::Document(walk(child)?));
            }
            let mut document = Record::new();
            document.insert(op.as_mongo(), Bson::Array(translated));
            Ok(document)
        }
    }
}

fn translate_compare(field: &str, op: CompareOp, value: &Bson) -> Result<Record> {
    let field = ValidatedFieldName::new(field)?;

    match op {
        CompareOp::In | CompareOp::NotIn => {
            if !matches!(value, Bson::Array(_)) {
                return Err(JadeiteError::Condition(format!(
                    "operator {} on field '{}' requires an array value",
                    op.as_mongo(),
                    field
                )));
            }
        }
        CompareOp::Exists => {
            if !matches!(value, Bson::Boolean(_)) {
                return Err(JadeiteError::Condition(format!(
                    "operator $exists on field '{}' requires a boolean value",
                    field
                )));
            }
        }
        CompareOp::Regex => {
            if !matches!(value, Bson::String(_)) {
                return Err(JadeiteError::Condition(format!(
                    "operator $regex on field '{}' requires a string pattern",
                    field
                )));
            }
        }
        _ => {}
    }

    let mut document = Record::new();
    if op == CompareOp::Eq {
        document.insert(field.as_str(), value.clone());
    } else {
        let mut inner = Record::new();
        inner.insert(op.as_mongo(), value.clone());
        document.insert(field.as_str(), inner);
    }
    Ok(document)
}

/// Translate an update into a native update document
///
/// Entries are grouped by operator, so repeated `set` calls end up under one
/// `$set` key. An empty update is a `Condition` error, as is a non-numeric
/// `inc` amount or an invalid field name.
pub fn translate_update(update: &Update) -> Result<Record> {
    if update.is_empty() {
        return Err(JadeiteError::Condition(
            "update must contain at least one operation".to_string(),
        ));
    }

    let mut set = Record::new();
    let mut unset = Record::new();
    let mut inc = Record::new();

    for op in update.ops() {
        match op {
            UpdateOp::Set { field, value } => {
                let field = ValidatedFieldName::new(field)?;
                set.insert(field.as_str(), value.clone());
            }
            UpdateOp::Unset { field } => {
                let field = ValidatedFieldName::new(field)?;
                unset.insert(field.as_str(), Bson::String(String::new()));
            }
            UpdateOp::Inc { field, amount } => {
                let field = ValidatedFieldName::new(field)?;
                if !matches!(amount, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) {
                    return Err(JadeiteError::Condition(format!(
                        "operator $inc on field '{}' requires a numeric amount",
                        field
                    )));
                }
                inc.insert(field.as_str(), amount.clone());
            }
        }
    }

    let mut document = Record::new();
    if !set.is_empty() {
        document.insert("$set", set);
    }
    if !unset.is_empty() {
        document.insert("$unset", unset);
    }
    if !inc.is_empty() {
        document.insert("$inc", inc);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{DateTime, Utc};

    // ===== Condition Translation Tests =====

    #[test]
    fn test_all_is_empty_filter() {
        let filter = translate_condition(&Condition::All).unwrap();
        assert_eq!(filter, doc! {});
    }

    #[test]
    fn test_eq_uses_direct_form() {
        let filter = translate_condition(&Condition::eq("name", "ada")).unwrap();
        assert_eq!(filter, doc! { "name": "ada" });
    }

    #[test]
    fn test_other_comparisons_nest_the_operator() {
        let filter = translate_condition(&Condition::ne("age", 7)).unwrap();
        assert_eq!(filter, doc! { "age": { "$ne": 7 } });

        let filter = translate_condition(&Condition::gt("age", 18)).unwrap();
        assert_eq!(filter, doc! { "age": { "$gt": 18 } });

        let filter = translate_condition(&Condition::lte("age", 65)).unwrap();
        assert_eq!(filter, doc! { "age": { "$lte": 65 } });
    }

    #[test]
    fn test_in_translates_to_array() {
        let filter = translate_condition(&Condition::is_in("status", ["new", "open"])).unwrap();
        assert_eq!(filter, doc! { "status": { "$in": ["new", "open"] } });
    }

    #[test]
    fn test_not_in_translates_to_nin() {
        let filter = translate_condition(&Condition::not_in("status", ["closed"])).unwrap();
        assert_eq!(filter, doc! { "status": { "$nin": ["closed"] } });
    }

    #[test]
    fn test_exists_and_regex() {
        let filter = translate_condition(&Condition::exists("email", true)).unwrap();
        assert_eq!(filter, doc! { "email": { "$exists": true } });

        let filter = translate_condition(&Condition::regex("name", "^a")).unwrap();
        assert_eq!(filter, doc! { "name": { "$regex": "^a" } });
    }

    #[test]
    fn test_datetime_value_translates_to_bson_datetime() {
        let cutoff: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let filter = translate_condition(&Condition::gt("created_at", cutoff)).unwrap();
        assert_eq!(
            filter,
            doc! { "created_at": { "$gt": bson::DateTime::from_millis(1_700_000_000_000) } }
        );
    }

    #[test]
    fn test_and_composite() {
        let condition = Condition::and(vec![
            Condition::gte("age", 18),
            Condition::eq("name", "ada"),
        ]);
        let filter = translate_condition(&condition).unwrap();
        assert_eq!(
            filter,
            doc! { "$and": [ { "age": { "$gte": 18 } }, { "name": "ada" } ] }
        );
    }

    #[test]
    fn test_nested_composites() {
        let condition = Condition::or(vec![
            Condition::and(vec![
                Condition::eq("kind", "user"),
                Condition::exists("email", true),
            ]),
            Condition::eq("kind", "service"),
        ]);
        let filter = translate_condition(&condition).unwrap();
        assert_eq!(
            filter,
            doc! {
                "$or": [
                    { "$and": [ { "kind": "user" }, { "email": { "$exists": true } } ] },
                    { "kind": "service" },
                ]
            }
        );
    }

    #[test]
    fn test_all_inside_composite_is_empty_document() {
        let condition = Condition::and(vec![Condition::All, Condition::eq("a", 1)]);
        let filter = translate_condition(&condition).unwrap();
        assert_eq!(filter, doc! { "$and": [ {}, { "a": 1 } ] });
    }

    // ===== Malformed Condition Tests =====

    #[test]
    fn test_empty_composite_is_rejected() {
        let err = translate_condition(&Condition::and(vec![])).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
        assert!(err.to_string().contains("$and"));
    }

    #[test]
    fn test_blank_field_name_is_rejected() {
        let err = translate_condition(&Condition::eq("", 1)).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }

    #[test]
    fn test_operator_field_name_is_rejected() {
        let err = translate_condition(&Condition::eq("$where", "1 == 1")).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }

    #[test]
    fn test_in_without_array_is_rejected() {
        let condition = Condition::Compare {
            field: "status".to_string(),
            op: CompareOp::In,
            value: Bson::Int32(1),
        };
        let err = translate_condition(&condition).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
        assert!(err.to_string().contains("$in"));
    }

    #[test]
    fn test_exists_without_boolean_is_rejected() {
        let condition = Condition::Compare {
            field: "email".to_string(),
            op: CompareOp::Exists,
            value: Bson::String("yes".to_string()),
        };
        let err = translate_condition(&condition).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }

    #[test]
    fn test_regex_without_string_is_rejected() {
        let condition = Condition::Compare {
            field: "name".to_string(),
            op: CompareOp::Regex,
            value: Bson::Int32(1),
        };
        let err = translate_condition(&condition).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }

    #[test]
    fn test_execution_operator_in_value_is_rejected() {
        let condition = Condition::eq("meta", doc! { "$where": "sleep(1000)" });
        let err = translate_condition(&condition).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
        assert!(err.to_string().contains("$where"));
    }

    // ===== Update Translation Tests =====

    #[test]
    fn test_update_groups_entries_by_operator() {
        let update = Update::new()
            .set("name", "ada")
            .unset("legacy_flag")
            .inc("logins", 1)
            .set("active", true);
        let document = translate_update(&update).unwrap();
        assert_eq!(
            document,
            doc! {
                "$set": { "name": "ada", "active": true },
                "$unset": { "legacy_flag": "" },
                "$inc": { "logins": 1 },
            }
        );
    }

    #[test]
    fn test_update_with_only_sets() {
        let update = Update::new().set("a", 1).set("b", 2);
        let document = translate_update(&update).unwrap();
        assert_eq!(document, doc! { "$set": { "a": 1, "b": 2 } });
    }

    #[test]
    fn test_inc_accepts_all_numeric_widths() {
        let update = Update::new().inc("a", 1i32).inc("b", 2i64).inc("c", 0.5f64);
        let document = translate_update(&update).unwrap();
        assert_eq!(
            document,
            doc! { "$inc": { "a": 1i32, "b": 2i64, "c": 0.5f64 } }
        );
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let err = translate_update(&Update::new()).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }

    #[test]
    fn test_non_numeric_inc_is_rejected() {
        let err = translate_update(&Update::new().inc("count", "three")).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
        assert!(err.to_string().contains("$inc"));
    }

    #[test]
    fn test_update_field_names_are_validated() {
        let err = translate_update(&Update::new().set("$rename", 1)).unwrap_err();
        assert!(matches!(err, JadeiteError::Condition(_)));
    }
}
