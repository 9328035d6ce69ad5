use std::collections::HashMap;

use super::Value;

/// An input record mapping field names to [`Value`]s.
///
/// Records need not supply every schema field; rules that reference an absent
/// field fail to evaluate and are counted as non-matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
        }
    }

    /// Set a field value, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field value (mutable reference version).
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let rec = Record::new().set("env", "prod").set("user_id", 12345_i64);
        assert_eq!(rec.get("env"), Some(&Value::from("prod")));
        assert_eq!(rec.get("user_id"), Some(&Value::Int(12345)));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn get_missing_returns_none() {
        let rec = Record::new().set("is_vip", true);
        assert_eq!(rec.get("blacklisted"), None);
    }

    #[test]
    fn overwrite_value() {
        let rec = Record::new().set("score", 10_i64).set("score", 20_i64);
        assert_eq!(rec.get("score"), Some(&Value::Int(20)));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn dotted_names_are_flat_keys() {
        let rec = Record::new().set("user.age", 30_i64);
        assert_eq!(rec.get("user.age"), Some(&Value::Int(30)));
        assert_eq!(rec.get("user"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let rec: Record = [("is_vip", Value::Bool(true)), ("env", Value::from("test_env"))]
            .into_iter()
            .collect();
        assert_eq!(rec.get("is_vip"), Some(&Value::Bool(true)));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn empty_record() {
        let rec = Record::new();
        assert!(rec.is_empty());
        assert_eq!(rec.get("anything"), None);
    }
}
