//! Result records and the values they carry.
use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use std::cmp::Ordering;

use crate::model::{Outcome, RobotModel, RobotState, Vulnerability};
use crate::numbers::i64_to_f64;

/// Categorical field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Model(RobotModel),
    State(RobotState),
    Vulnerability(Vulnerability),
    Outcome(Outcome),
}

impl Category {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Model(model) => model.label(),
            Self::State(state) => state.label(),
            Self::Vulnerability(level) => level.label(),
            Self::Outcome(outcome) => outcome.label(),
        }
    }
}

/// A single field of a result record.
///
/// `Absent` is the explicit "no data" marker (for example a rate over zero
/// actions) and is never interchangeable with a computed zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Absent,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Category(Category),
}

impl Value {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(i64_to_f64(*value)),
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Category(category) => Some(category.label()),
            _ => None,
        }
    }

    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Decimal(_) => 0,
            Self::Text(_) | Self::Category(_) => 1,
            Self::Absent => 2,
        }
    }

    /// Ascending comparison used for group keys: numbers numerically, text
    /// and categories by label, absent after everything present.
    #[must_use]
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Decimal(_) | Self::Integer(_), Self::Decimal(_) | Self::Integer(_)) => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.total_cmp(&b)
            }
            (Self::Text(_) | Self::Category(_), Self::Text(_) | Self::Category(_)) => {
                self.as_str().cmp(&other.as_str())
            }
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Like [`Value::natural_cmp`], except vulnerability levels compare by
    /// their entry in the rank table.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Self::Category(Category::Vulnerability(a)),
                Self::Category(Category::Vulnerability(b)),
            ) => a.rank().cmp(&b.rank()),
            _ => self.natural_cmp(other),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Category(category) => f.write_str(category.label()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Decimal(value) => serializer.serialize_f64(*value),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Category(category) => serializer.serialize_str(category.label()),
        }
    }
}

/// One row of a report: an ordered mapping from field name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: Value) -> Self {
        self.push(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn fields(&self) -> &[(&'static str, Value)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Group key values of one partition, ordered naturally element by element.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyTuple(pub(crate) SmallVec<[Value; 4]>);

impl KeyTuple {
    pub(crate) fn cmp_with(&self, other: &Self, cmp: fn(&Value, &Value) -> Ordering) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| cmp(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

impl PartialEq for KeyTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for KeyTuple {}

impl PartialOrd for KeyTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_with(other, Value::natural_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn absent_sorts_after_present_values() {
        assert_eq!(Value::Absent.natural_cmp(&Value::Integer(1)), Ordering::Greater);
        assert_eq!(
            Value::Text("z".into()).natural_cmp(&Value::Absent),
            Ordering::Less
        );
        assert_eq!(Value::Absent.natural_cmp(&Value::Absent), Ordering::Equal);
    }

    #[test]
    fn categories_compare_by_label_or_rank() {
        let high = Value::Category(Category::Vulnerability(Vulnerability::High));
        let low = Value::Category(Category::Vulnerability(Vulnerability::Low));
        assert_eq!(high.natural_cmp(&low), Ordering::Less);
        assert_eq!(high.rank_cmp(&low), Ordering::Greater);
    }

    #[test]
    fn mixed_numbers_compare_numerically() {
        assert_eq!(
            Value::Integer(2).natural_cmp(&Value::Decimal(1.5)),
            Ordering::Greater
        );
    }

    #[test]
    fn record_serializes_in_field_order_with_null_for_absent() {
        let record = Record::new()
            .with("model", Value::Category(Category::Model(RobotModel::CombatB)))
            .with("total_actions", Value::Integer(0))
            .with("success_rate", Value::Absent);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"model":"Combat-B","total_actions":0,"success_rate":null}"#
        );
        assert_eq!(record.get("total_actions"), Some(&Value::Integer(0)));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn key_tuples_order_lexicographically() {
        let a = KeyTuple(smallvec![Value::Integer(1), Value::Text("b".into())]);
        let b = KeyTuple(smallvec![Value::Integer(1), Value::Absent]);
        let c = KeyTuple(smallvec![Value::Integer(0), Value::Absent]);
        let mut keys = vec![b.clone(), a.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, a, b]);
    }
}
