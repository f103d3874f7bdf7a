//! Session state reducers
//!
//! A session's state is a flat JSON object. Every worker returns a *partial*
//! update (only the fields it touched) and the update is folded into the
//! accumulated state field-by-field according to a [`StateSchema`]. This is
//! the same reducer idea LangGraph uses for `Annotated` state fields: each
//! field picks one merge strategy and workers never need to know whether
//! they are the first or the Nth writer.
//!
//! # Built-in reducers
//!
//! | Reducer | Behavior | Session field examples |
//! |---------|----------|-------------------------|
//! | [`OverwriteReducer`] | last write wins | `trip_summary`, `iteration_count` |
//! | [`AppendReducer`] | concatenates arrays | `messages`, `attractions`, `hotels` |
//! | [`MergeReducer`] | shallow object merge | `budget_breakdown` |
//! | [`SumReducer`] | numeric accumulation | (not currently used by any worker, kept for counters) |
//!
//! # Example
//!
//! ```rust
//! use travel_core::state::{StateSchema, AppendReducer, OverwriteReducer};
//! use serde_json::json;
//!
//! let mut schema = StateSchema::new();
//! schema.add_field("messages", Box::new(AppendReducer));
//! schema.add_field("status", Box::new(OverwriteReducer));
//!
//! let mut state = json!({"messages": ["hello"], "status": "idle"});
//! schema.apply(&mut state, &json!({"messages": ["world"], "status": "running"})).unwrap();
//!
//! assert_eq!(state["messages"], json!(["hello", "world"]));
//! assert_eq!(state["status"], "running");
//! ```
//!
//! Fields with no reducer registered and no default reducer fall back to
//! overwrite semantics, matching the spec's "unknown-key" rule: an update key
//! not in the schema is still applied, just without accumulation.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while applying a partial update to session state.
#[derive(Debug, Error)]
pub enum StateError {
    /// State or update was not a JSON object.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Schema-level validation failed.
    #[error("Schema validation failed: {0}")]
    ValidationFailed(String),

    /// A reducer was given a value shape it cannot merge.
    #[error("Reducer error: {0}")]
    ReducerError(String),

    /// Referenced field does not exist in schema.
    #[error("Field not found: {0}")]
    FieldNotFound(String),
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Defines how repeated writes to the same state field are combined.
pub trait Reducer: Send + Sync {
    /// Merge `update` into `current`, returning the new field value.
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value>;

    /// Human-readable reducer name, used in logging and diagnostics.
    fn name(&self) -> &str;
}

/// Replaces the current value outright. The default when no reducer is registered.
#[derive(Debug, Clone)]
pub struct OverwriteReducer;

impl Reducer for OverwriteReducer {
    fn reduce(&self, _current: &Value, update: &Value) -> Result<Value> {
        Ok(update.clone())
    }

    fn name(&self) -> &str {
        "overwrite"
    }
}

/// Concatenates arrays (or appends a scalar as a single element). Never shrinks
/// the accumulated array, matching the spec's append-never-shrinks invariant.
#[derive(Debug, Clone)]
pub struct AppendReducer;

impl Reducer for AppendReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value> {
        match (current, update) {
            (Value::Array(curr_arr), Value::Array(upd_arr)) => {
                let mut result = curr_arr.clone();
                result.extend_from_slice(upd_arr);
                Ok(Value::Array(result))
            }
            (Value::Null, Value::Array(upd_arr)) => Ok(Value::Array(upd_arr.clone())),
            (Value::Array(curr_arr), single_value) => {
                let mut result = curr_arr.clone();
                result.push(single_value.clone());
                Ok(Value::Array(result))
            }
            (Value::Null, single_value) => Ok(Value::Array(vec![single_value.clone()])),
            _ => Err(StateError::ReducerError(
                "AppendReducer requires array values".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "append"
    }
}

/// Shallow-merges objects; update keys win on conflict, other keys are preserved.
#[derive(Debug, Clone)]
pub struct MergeReducer;

impl Reducer for MergeReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value> {
        match (current, update) {
            (Value::Object(curr_obj), Value::Object(upd_obj)) => {
                let mut result = curr_obj.clone();
                for (key, value) in upd_obj {
                    result.insert(key.clone(), value.clone());
                }
                Ok(Value::Object(result))
            }
            (Value::Null, Value::Object(upd_obj)) => Ok(Value::Object(upd_obj.clone())),
            _ => Err(StateError::ReducerError(
                "MergeReducer requires object values".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "merge"
    }
}

/// Accumulates numeric values by addition.
#[derive(Debug, Clone)]
pub struct SumReducer;

impl Reducer for SumReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value> {
        match (current, update) {
            (Value::Number(a), Value::Number(b)) => {
                if let (Some(a_i64), Some(b_i64)) = (a.as_i64(), b.as_i64()) {
                    Ok(Value::Number((a_i64 + b_i64).into()))
                } else if let (Some(a_f64), Some(b_f64)) = (a.as_f64(), b.as_f64()) {
                    Ok(serde_json::Number::from_f64(a_f64 + b_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null))
                } else {
                    Err(StateError::ReducerError(
                        "Cannot add non-numeric values".to_string(),
                    ))
                }
            }
            (Value::Null, Value::Number(_)) => Ok(update.clone()),
            _ => Err(StateError::ReducerError(
                "SumReducer requires numeric values".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "sum"
    }
}

/// Maps session state field names to the reducer that governs them.
#[derive(Default)]
pub struct StateSchema {
    fields: HashMap<String, Box<dyn Reducer>>,
    default_reducer: Option<Box<dyn Reducer>>,
}

impl StateSchema {
    /// Create an empty schema. Fields added later via [`add_field`](Self::add_field).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reducer for a named field.
    pub fn add_field(&mut self, field_name: impl Into<String>, reducer: Box<dyn Reducer>) {
        self.fields.insert(field_name.into(), reducer);
    }

    /// Set the reducer used for fields with no explicit registration.
    pub fn with_default_reducer(mut self, reducer: Box<dyn Reducer>) -> Self {
        self.default_reducer = Some(reducer);
        self
    }

    fn get_reducer(&self, field_name: &str) -> Option<&dyn Reducer> {
        self.fields
            .get(field_name)
            .map(|r| r.as_ref())
            .or_else(|| self.default_reducer.as_ref().map(|r| r.as_ref()))
    }

    /// Fold `update` into `state` in place, field by field, using each
    /// field's registered reducer (or plain overwrite if none is registered).
    pub fn apply(&self, state: &mut Value, update: &Value) -> Result<()> {
        let state_obj = state
            .as_object_mut()
            .ok_or_else(|| StateError::InvalidState("State must be an object".to_string()))?;

        let update_obj = update
            .as_object()
            .ok_or_else(|| StateError::InvalidState("Update must be an object".to_string()))?;

        for (field_name, update_value) in update_obj {
            let current_value = state_obj.get(field_name).cloned().unwrap_or(Value::Null);

            let reduced_value = if let Some(reducer) = self.get_reducer(field_name) {
                reducer.reduce(&current_value, update_value)?
            } else {
                update_value.clone()
            };

            state_obj.insert(field_name.clone(), reduced_value);
        }

        Ok(())
    }

    /// State must at minimum be a JSON object to be reducible.
    pub fn validate(&self, state: &Value) -> Result<()> {
        if !state.is_object() {
            return Err(StateError::ValidationFailed(
                "State must be an object".to_string(),
            ));
        }
        Ok(())
    }

    /// Fields with an explicitly registered reducer.
    pub fn fields(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overwrite_reducer() {
        let reducer = OverwriteReducer;
        let current = json!({"old": "value"});
        let update = json!({"new": "value"});

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!({"new": "value"}));
    }

    #[test]
    fn test_append_reducer_arrays() {
        let reducer = AppendReducer;
        let current = json!([1, 2, 3]);
        let update = json!([4, 5]);

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!([1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_append_reducer_null_current() {
        let reducer = AppendReducer;
        let current = Value::Null;
        let update = json!([1, 2]);

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!([1, 2]));
    }

    #[test]
    fn test_append_reducer_single_value() {
        let reducer = AppendReducer;
        let current = json!([1, 2]);
        let update = json!(3);

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!([1, 2, 3]));
    }

    #[test]
    fn test_append_never_shrinks() {
        let reducer = AppendReducer;
        let mut accumulated = json!(["a", "b", "c"]);
        for batch in [json!(["d"]), json!([]), json!(["e", "f"])] {
            accumulated = reducer.reduce(&accumulated, &batch).unwrap();
        }
        assert_eq!(accumulated, json!(["a", "b", "c", "d", "e", "f"]));
    }

    #[test]
    fn test_merge_reducer() {
        let reducer = MergeReducer;
        let current = json!({"a": 1, "b": 2});
        let update = json!({"b": 3, "c": 4});

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_sum_reducer_integers() {
        let reducer = SumReducer;
        let current = json!(5);
        let update = json!(3);

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!(8));
    }

    #[test]
    fn test_sum_reducer_floats() {
        let reducer = SumReducer;
        let current = json!(2.5);
        let update = json!(3.5);

        let result = reducer.reduce(&current, &update).unwrap();
        assert_eq!(result, json!(6.0));
    }

    #[test]
    fn test_state_schema_apply() {
        let mut schema = StateSchema::new();
        schema.add_field("messages", Box::new(AppendReducer));
        schema.add_field("count", Box::new(SumReducer));

        let mut state = json!({"messages": ["hello"], "count": 1});
        let update = json!({"messages": ["world"], "count": 2});

        schema.apply(&mut state, &update).unwrap();

        assert_eq!(state["messages"], json!(["hello", "world"]));
        assert_eq!(state["count"], json!(3));
    }

    #[test]
    fn test_state_schema_default_reducer() {
        let schema = StateSchema::new().with_default_reducer(Box::new(OverwriteReducer));

        let mut state = json!({"field": "old"});
        let update = json!({"field": "new", "other": "value"});

        schema.apply(&mut state, &update).unwrap();

        assert_eq!(state["field"], json!("new"));
        assert_eq!(state["other"], json!("value"));
    }

    #[test]
    fn test_state_schema_unknown_key_falls_back_to_overwrite() {
        let schema = StateSchema::new();
        let mut state = json!({});
        schema.apply(&mut state, &json!({"unregistered_field": "value"})).unwrap();
        assert_eq!(state["unregistered_field"], json!("value"));
    }

    #[test]
    fn test_state_schema_validation() {
        let schema = StateSchema::new();

        let valid_state = json!({"field": "value"});
        assert!(schema.validate(&valid_state).is_ok());

        let invalid_state = json!("not an object");
        assert!(schema.validate(&invalid_state).is_err());
    }

    #[test]
    fn test_reducer_names() {
        assert_eq!(OverwriteReducer.name(), "overwrite");
        assert_eq!(AppendReducer.name(), "append");
        assert_eq!(MergeReducer.name(), "merge");
        assert_eq!(SumReducer.name(), "sum");
    }
}
