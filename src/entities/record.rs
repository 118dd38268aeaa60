use serde_json::{Map, Value};

/// Field holding the remote identifier of a resource.
pub const IDENTIFIER: &str = "id";

/// A JSON object as MoneyBird sends and receives it.
pub type Fields = Map<String, Value>;

/// The field bag every model embeds.
///
/// `current` is the live state. `baseline` is a copy of the last payload received from the API
/// and is what [`Record::serialize`] diffs against when only changes are requested. Writes
/// through [`Record::set`] are limited to the `mutable` fields, an empty list allowing every
/// field; hydration bypasses that filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    current: Fields,
    baseline: Option<Fields>,
    mutable: &'static [&'static str],
}

impl Record {
    #[must_use]
    pub fn new(mutable: &'static [&'static str]) -> Self {
        Self {
            current: Fields::new(),
            baseline: None,
            mutable,
        }
    }

    /// Returns the current value of a field. Unset and `null` fields both read as `None`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.current.get(field).filter(|value| !value.is_null())
    }

    /// Sets a field if it is mutable. Writes to other fields are ignored.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let field = field.into();
        if self.is_mutable(&field) {
            self.current.insert(field, value.into());
        } else {
            trace!(%field, "ignoring write to immutable field");
        }
        self
    }

    /// Replaces the current fields with `data`, passing every pair through [`Record::set`].
    pub fn fill<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.current = Fields::new();
        for (field, value) in data {
            self.set(field, value);
        }
        self
    }

    /// Replaces the current fields and the baseline with a payload from the API.
    pub fn hydrate(&mut self, data: Fields) {
        self.baseline = Some(data.clone());
        self.current = data;
    }

    #[must_use]
    pub fn is_mutable(&self, field: &str) -> bool {
        self.mutable.is_empty() || self.mutable.contains(&field)
    }

    /// Whether a field differs from the last hydrated payload.
    ///
    /// Without a baseline every field counts as changed, there is no remote state to diff against.
    #[must_use]
    pub fn is_changed(&self, field: &str) -> bool {
        match &self.baseline {
            Some(baseline) => baseline.get(field) != self.current.get(field),
            None => true,
        }
    }

    /// Builds the request body fields.
    ///
    /// Only mutable fields are included. With `changes_only` the fields equal to the baseline are
    /// left out, and the identifier is added whenever anything remains because MoneyBird needs it
    /// to address the record.
    #[must_use]
    pub fn serialize(&self, changes_only: bool) -> Fields {
        let mut data: Fields = self
            .current
            .iter()
            .filter(|(field, _)| self.is_mutable(field))
            .filter(|(field, _)| !changes_only || self.is_changed(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        if changes_only && !data.is_empty() {
            if let Some(id) = self.current.get(IDENTIFIER) {
                data.entry(IDENTIFIER).or_insert_with(|| id.clone());
            }
        }

        data
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.current
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&Fields> {
        self.baseline.as_ref()
    }

    #[must_use]
    pub fn mutable_fields(&self) -> &'static [&'static str] {
        self.mutable
    }

    /// The identifier as a path segment, if it is set and not empty.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        match self.current.get(IDENTIFIER)? {
            Value::String(id) if !id.is_empty() && id != "0" => Some(id.clone()),
            Value::Number(id) if id.as_f64() != Some(0.0) => Some(id.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_identifier(&self) -> bool {
        self.identifier().is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const MUTABLE: &[&str] = &["name", "city"];

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    #[test]
    fn set_respects_mutable_fields() {
        let mut record = Record::new(MUTABLE);
        record.set("name", "Weblab").set("id", 5);

        assert_eq!(record.get("name"), Some(&json!("Weblab")));
        assert_eq!(record.get("id"), None);
    }

    #[test]
    fn empty_mutable_list_allows_everything() {
        let mut record = Record::new(&[]);
        record.set("anything", true);
        assert_eq!(record.get("anything"), Some(&json!(true)));
    }

    #[test]
    fn null_reads_as_absent() {
        let mut record = Record::new(&[]);
        record.hydrate(fields(json!({"city": null})));
        assert_eq!(record.get("city"), None);
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn fill_replaces_current_without_touching_baseline() {
        let mut record = Record::new(MUTABLE);
        record.hydrate(fields(json!({"id": "1", "name": "old"})));
        record.fill([("name", json!("new")), ("id", json!("2"))]);

        assert_eq!(record.fields(), &fields(json!({"name": "new"})));
        assert_eq!(record.baseline(), Some(&fields(json!({"id": "1", "name": "old"}))));
    }

    #[test]
    fn hydrate_bypasses_mutability() {
        let mut record = Record::new(MUTABLE);
        record.hydrate(fields(json!({"id": "1", "name": "Weblab", "state": "open"})));

        assert_eq!(record.get("state"), Some(&json!("open")));
        assert_eq!(record.serialize(false), fields(json!({"name": "Weblab"})));
    }

    #[test]
    fn hydrate_replaces_the_baseline() {
        let mut record = Record::new(&[]);
        record.hydrate(fields(json!({"id": "1", "name": "first"})));
        record.hydrate(fields(json!({"id": "1", "name": "second"})));

        assert!(record.serialize(true).is_empty());
    }

    #[test]
    fn changes_only_adds_identifier_last() {
        let mut record = Record::new(MUTABLE);
        record.hydrate(fields(json!({"id": 666, "name": "test", "city": "Enschede"})));
        record.set("name", "not test anymore");

        let data = record.serialize(true);
        assert_eq!(data, fields(json!({"name": "not test anymore", "id": 666})));
        assert_eq!(data.keys().collect::<Vec<_>>(), ["name", "id"]);
    }

    #[test]
    fn unchanged_record_serializes_empty() {
        let mut record = Record::new(MUTABLE);
        record.hydrate(fields(json!({"id": 1, "name": "test"})));
        record.set("name", "test");

        assert!(record.serialize(true).is_empty());
        assert_eq!(serde_json::to_string(&record.serialize(true)).unwrap(), "{}");
    }

    #[test]
    fn fields_missing_from_baseline_count_as_changed() {
        let mut record = Record::new(MUTABLE);
        record.hydrate(fields(json!({"id": 1, "name": "test"})));
        record.set("city", "Enschede");

        assert_eq!(record.serialize(true), fields(json!({"city": "Enschede", "id": 1})));
    }

    #[test]
    fn identifier_must_be_non_empty() {
        let mut record = Record::new(&[]);
        assert_eq!(record.identifier(), None);

        record.set("id", "");
        assert_eq!(record.identifier(), None);

        record.set("id", 0);
        assert_eq!(record.identifier(), None);

        record.set("id", Value::Null);
        assert!(!record.has_identifier());

        record.set("id", "260703856209380607");
        assert_eq!(record.identifier().as_deref(), Some("260703856209380607"));

        record.set("id", 42);
        assert_eq!(record.identifier().as_deref(), Some("42"));
    }
}
