//! Parameter and settings documents
//!
//! Both documents serialize as plain nested YAML/JSON: no enum tags, no
//! wrapper keys.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::btree_map;
use std::collections::BTreeMap;
use tracing::warn;

/// A parameter value: a string, a sequence, or a nested mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(String),
    List(Vec<ParameterValue>),
    Map(BTreeMap<String, ParameterValue>),
}

impl ParameterValue {
    /// Whether the value counts as set. Only an empty string does not.
    pub fn is_present(&self) -> bool {
        !matches!(self, ParameterValue::Scalar(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParameterValue]> {
        match self {
            ParameterValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ParameterValue>> {
        match self {
            ParameterValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Scalar(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(values: Vec<String>) -> Self {
        ParameterValue::List(values.into_iter().map(ParameterValue::Scalar).collect())
    }
}

impl From<Vec<ParameterValue>> for ParameterValue {
    fn from(values: Vec<ParameterValue>) -> Self {
        ParameterValue::List(values)
    }
}

/// Parameter mapping produced by the first build stage.
///
/// Keys are kept sorted so the written document is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, ParameterValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParameterValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether `key` exists and holds a present value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(ParameterValue::is_present)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Option<ParameterValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParameterValue> {
        self.0.remove(key)
    }

    /// Returns the nested mapping stored under `key`, creating it if absent.
    ///
    /// A non-mapping value already stored under `key` is replaced.
    pub fn nested_mut(&mut self, key: &str) -> &mut BTreeMap<String, ParameterValue> {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| ParameterValue::Map(BTreeMap::new()));
        if !matches!(slot, ParameterValue::Map(_)) {
            warn!(key, "Replacing non-mapping parameter with a nested mapping");
            *slot = ParameterValue::Map(BTreeMap::new());
        }
        match slot {
            ParameterValue::Map(map) => map,
            _ => unreachable!("slot was just set to a mapping"),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParameterValue> {
        self.0.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a String, &'a ParameterValue);
    type IntoIter = btree_map::Iter<'a, String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Settings document produced by the second build stage.
///
/// Seeded wholesale from a template (any YAML mapping), then extended by
/// section definitions. Key order follows the template, then insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Mapping);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up `section.name`, e.g. `("dynamodb", "t1")`.
    pub fn entry(&self, section: &str, name: &str) -> Option<&Value> {
        self.get(section)
            .and_then(Value::as_mapping)
            .and_then(|entries| entries.get(name))
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(Value::from(key), value.into())
    }

    /// Sets `section.name` to `entry`, replacing any previous entry.
    ///
    /// The section is created when absent. A section holding something other
    /// than a mapping is replaced by one.
    pub fn set_section_entry(&mut self, section: &str, name: &str, entry: Value) {
        let slot = self.0.entry(Value::from(section)).or_insert(Value::Null);
        if !slot.is_mapping() {
            if !slot.is_null() {
                warn!(section, "Replacing non-mapping settings section");
            }
            *slot = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(entries) = slot {
            entries.insert(Value::from(name), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for Settings {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// A settings leaf that may be a literal, a list of literals, or a reference
/// token. `Absent` is what a failed parameter reference yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingRef {
    Value(String),
    List(Vec<String>),
    Absent,
}

impl From<&str> for SettingRef {
    fn from(value: &str) -> Self {
        SettingRef::Value(value.to_string())
    }
}

impl From<String> for SettingRef {
    fn from(value: String) -> Self {
        SettingRef::Value(value)
    }
}

impl From<Option<String>> for SettingRef {
    fn from(value: Option<String>) -> Self {
        value.map_or(SettingRef::Absent, SettingRef::Value)
    }
}

impl From<Vec<String>> for SettingRef {
    fn from(values: Vec<String>) -> Self {
        SettingRef::List(values)
    }
}

impl From<Vec<&str>> for SettingRef {
    fn from(values: Vec<&str>) -> Self {
        SettingRef::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<SettingRef> for Value {
    fn from(value: SettingRef) -> Self {
        match value {
            SettingRef::Value(s) => Value::String(s),
            SettingRef::List(items) => Value::from(items),
            SettingRef::Absent => Value::Null,
        }
    }
}

/// Entry of the `vpcs` settings section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcDefinition {
    pub subnet_ids: SettingRef,
    pub security_groups: SettingRef,
}

impl From<VpcDefinition> for Value {
    fn from(vpc: VpcDefinition) -> Self {
        let mut record = Mapping::new();
        record.insert("security-groups".into(), vpc.security_groups.into());
        record.insert("subnet-ids".into(), vpc.subnet_ids.into());
        Value::Mapping(record)
    }
}

/// Entry of the `dynamodb` settings section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoTrigger {
    pub lambda: String,
    pub stream: SettingRef,
    pub batch_size: u32,
    pub starting_position: String,
}

impl From<DynamoTrigger> for Value {
    fn from(trigger: DynamoTrigger) -> Self {
        let mut record = Mapping::new();
        record.insert("lambda".into(), trigger.lambda.into());
        record.insert("stream".into(), trigger.stream.into());
        record.insert("batch_size".into(), trigger.batch_size.into());
        record.insert("starting_position".into(), trigger.starting_position.into());
        Value::Mapping(record)
    }
}
