//! Request helper extensions.

use salvo::prelude::{Request, StatusError};
use serde_json::Value;

use crate::extensions::*;

pub(crate) trait RequestExt {
    /// Non-empty path parameter `name`.
    fn param_or_400(&self, name: &str) -> Result<String, StatusError>;

    /// JSON object body of field data. An empty body is an empty object.
    async fn fields_or_400(&mut self) -> Result<Value, StatusError>;
}

impl RequestExt for Request {
    fn param_or_400(&self, name: &str) -> Result<String, StatusError> {
        self.param::<String>(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| StatusError::bad_request().brief(format!("missing {name}")))
    }

    async fn fields_or_400(&mut self) -> Result<Value, StatusError> {
        let body = self.payload().await.or_400("could not read request body")?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        let fields: Value = serde_json::from_slice(body).or_400("invalid JSON body")?;

        if !fields.is_object() {
            return Err(StatusError::bad_request().brief("request body must be a JSON object"));
        }

        Ok(fields)
    }
}
