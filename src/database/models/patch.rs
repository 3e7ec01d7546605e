use serde::{Deserialize, Deserializer};

/// A field of an update body: `None` when absent, `Some(None)` for an explicit
/// `null`, `Some(Some(v))` for a value.
pub type Patch<T> = Option<Option<T>>;

/// Use with `#[serde(default, deserialize_with = "present")]` so an explicit
/// `null` is distinguishable from a missing key.
pub fn present<'de, T, D>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Collects the camelCase names of the fields a patch touched.
#[derive(Debug, Default)]
pub struct Touched(Vec<&'static str>);

impl Touched {
    pub fn mark<T>(&mut self, field: &'static str, patch: &Patch<T>) -> &mut Self {
        if patch.is_some() {
            self.0.push(field);
        }
        self
    }

    pub fn into_fields(self) -> Vec<&'static str> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "present")]
        phone: Patch<String>,
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let missing: Body = serde_json::from_str("{}").unwrap();
        let null: Body = serde_json::from_str(r#"{"phone":null}"#).unwrap();
        let value: Body = serde_json::from_str(r#"{"phone":"555"}"#).unwrap();
        assert_eq!(missing.phone, None);
        assert_eq!(null.phone, Some(None));
        assert_eq!(value.phone, Some(Some("555".to_string())));

        let mut touched = Touched::default();
        touched.mark("phone", &missing.phone).mark("phone", &value.phone);
        assert_eq!(touched.into_fields(), vec!["phone"]);
    }
}
