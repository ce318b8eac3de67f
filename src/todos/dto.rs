use serde::Deserialize;
use serde_json::Value;

use crate::field::Field;

/// Body of `POST /todos`. Values stay untyped until validated so a wrong
/// type is reported per field.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Field<Value>,
    #[serde(default)]
    pub completed: Field<Value>,
}

/// Body of `PUT /todos/:id`. Only present fields change.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Field<Value>,
    #[serde(default)]
    pub completed: Field<Value>,
}
