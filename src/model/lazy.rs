use crate::arr::client::kind_of;
use arrlink_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Backing state of a remote entity: the raw payload, its typed view and
/// whether the payload was a full single-item load.
#[derive(Debug, Clone)]
pub(crate) struct Lazy<T> {
    raw: Map<String, Value>,
    fields: T,
    materialized: bool,
}

impl<T: DeserializeOwned> Lazy<T> {
    /// State built from list data or an identifier only.
    pub(crate) fn stub(payload: Value) -> Result<Self> {
        Self::parse(payload, false)
    }

    /// State built from a single-item payload.
    pub(crate) fn full(payload: Value) -> Result<Self> {
        Self::parse(payload, true)
    }

    fn parse(payload: Value, materialized: bool) -> Result<Self> {
        let raw = match payload {
            Value::Object(map) => map,
            other => {
                return Err(Error::connection(format!(
                    "expected a JSON object, got {}",
                    kind_of(&other)
                )))
            }
        };
        let fields = decode(&raw)?;
        Ok(Self {
            raw,
            fields,
            materialized,
        })
    }

    pub(crate) fn replace(&mut self, payload: Value) -> Result<()> {
        *self = Self::full(payload)?;
        Ok(())
    }

    /// Forget the server id after a delete. The entity becomes a stub again.
    pub(crate) fn detach(&mut self) -> Result<()> {
        self.raw.remove("id");
        self.fields = decode(&self.raw)?;
        self.materialized = false;
        Ok(())
    }
}

impl<T> Lazy<T> {
    pub(crate) fn fields(&self) -> &T {
        &self.fields
    }

    pub(crate) fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub(crate) fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub(crate) fn mark_materialized(&mut self) {
        self.materialized = true;
    }
}

fn decode<T: DeserializeOwned>(raw: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|e| Error::connection(format!("unexpected payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        id: Option<i64>,
        title: Option<String>,
    }

    #[test]
    fn test_stub_and_full() {
        let stub: Lazy<Fields> = Lazy::stub(json!({"id": 3})).unwrap();
        assert!(!stub.is_materialized());
        assert_eq!(stub.fields().id, Some(3));
        assert!(stub.fields().title.is_none());

        let full: Lazy<Fields> = Lazy::full(json!({"id": 3, "title": "Alien"})).unwrap();
        assert!(full.is_materialized());
        assert_eq!(full.fields().title.as_deref(), Some("Alien"));
    }

    #[test]
    fn test_detach_clears_id() {
        let mut state: Lazy<Fields> = Lazy::full(json!({"id": 3, "title": "Alien"})).unwrap();
        state.detach().unwrap();
        assert!(state.fields().id.is_none());
        assert!(!state.raw().contains_key("id"));
        assert_eq!(state.fields().title.as_deref(), Some("Alien"));
        assert!(!state.is_materialized());
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            Lazy::<Fields>::stub(json!([1, 2])),
            Err(Error::ConnectionFailure(_))
        ));
    }
}
