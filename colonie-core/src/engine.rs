//! Generic evaluation of catalog definitions.
//!
//! One pipeline serves every report: materialize the join, partition rows by
//! group key, compute measures, drop groups failing the having predicate,
//! derive rates, sort, then cut to the limit. Evaluation only reads the
//! snapshot it is handed.
use log::debug;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{
    Attr, FeedSpec, GroupedSpec, Having, JoinKind, MeasureKind, ReportDefinition, Shape,
    SortRule, SourceJoin, StoreCount,
};
use crate::model::{Action, Entity, Human, Outcome, Robot, Scenario};
use crate::numbers::{count_to_i64, percentage};
use crate::record::{Category, KeyTuple, Record, Value};
use crate::store::{Snapshot, StoreError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Failures of a report evaluation.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("data store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Evaluate a definition against a snapshot.
#[must_use]
pub fn evaluate(snapshot: &Snapshot, definition: &ReportDefinition) -> Vec<Record> {
    let rows = materialize(snapshot, &definition.source);
    let records = match &definition.shape {
        Shape::Grouped(spec) => evaluate_grouped(snapshot, spec, rows),
        Shape::Feed(spec) => evaluate_feed(spec, rows),
    };
    debug!(
        "report {} evaluated: {} records",
        definition.id,
        records.len()
    );
    records
}

/// One row of a materialized join. A `None` slot is an entity that was
/// either not joined or unmatched under a left join.
#[derive(Debug, Clone, Copy, Default)]
struct JoinedRow<'a> {
    robot: Option<&'a Robot>,
    human: Option<&'a Human>,
    scenario: Option<&'a Scenario>,
    action: Option<&'a Action>,
}

impl JoinedRow<'_> {
    fn driver_id(&self, driver: Entity) -> Option<u32> {
        match driver {
            Entity::Robot => self.robot.map(|r| r.id),
            Entity::Human => self.human.map(|h| h.id),
            Entity::Scenario => self.scenario.map(|s| s.id),
            Entity::Action => self.action.map(|a| a.id),
        }
    }

    fn attr(&self, attr: Attr) -> Value {
        match attr {
            Attr::RobotId => self
                .robot
                .map(|r| r.id)
                .or_else(|| self.action.map(|a| a.robot_id))
                .map_or(Value::Absent, |id| Value::Integer(i64::from(id))),
            Attr::RobotName => text(self.robot.map(|r| r.name.as_str())),
            Attr::RobotModel => self
                .robot
                .map_or(Value::Absent, |r| Value::Category(Category::Model(r.model))),
            Attr::RobotState => self
                .robot
                .map_or(Value::Absent, |r| Value::Category(Category::State(r.state))),
            Attr::HumanName => text(self.human.map(|h| h.name.as_str())),
            Attr::HumanVulnerability => self.human.map_or(Value::Absent, |h| {
                Value::Category(Category::Vulnerability(h.vulnerability))
            }),
            Attr::HumanLocation => text(self.human.map(|h| h.location.as_str())),
            Attr::ScenarioId => self
                .scenario
                .map(|s| s.id)
                .or_else(|| self.action.map(|a| a.scenario_id))
                .map_or(Value::Absent, |id| Value::Integer(i64::from(id))),
            Attr::ScenarioDescription => text(self.scenario.map(|s| s.description.as_str())),
            Attr::ScenarioLaw => self.scenario.map_or(Value::Absent, |s| {
                Value::Integer(i64::from(s.law_priority.number()))
            }),
            Attr::ScenarioLawLabel(vocabulary) => {
                text(self.scenario.map(|s| vocabulary.label(s.law_priority)))
            }
            Attr::ScenarioDifficulty => self
                .scenario
                .and_then(|s| s.difficulty)
                .map_or(Value::Absent, |d| Value::Integer(i64::from(d))),
            Attr::ActionId => self
                .action
                .map_or(Value::Absent, |a| Value::Integer(i64::from(a.id))),
            Attr::ActionKind => text(self.action.map(|a| a.kind.as_str())),
            Attr::ActionOutcome => self
                .action
                .map_or(Value::Absent, |a| Value::Category(Category::Outcome(a.outcome))),
            Attr::ActionTimestamp => self.action.map_or(Value::Absent, |a| {
                Value::Text(a.timestamp.format(TIMESTAMP_FORMAT).to_string())
            }),
        }
    }
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Absent, |s| Value::Text(s.to_string()))
}

fn materialize<'a>(snapshot: &'a Snapshot, source: &SourceJoin) -> Vec<JoinedRow<'a>> {
    let mut rows: Vec<JoinedRow<'a>> = match source.driver {
        Entity::Robot => snapshot
            .robots()
            .map(|robot| JoinedRow {
                robot: Some(robot),
                ..JoinedRow::default()
            })
            .collect(),
        Entity::Human => snapshot
            .humans()
            .map(|human| JoinedRow {
                human: Some(human),
                ..JoinedRow::default()
            })
            .collect(),
        Entity::Scenario => snapshot
            .scenarios()
            .map(|scenario| JoinedRow {
                scenario: Some(scenario),
                ..JoinedRow::default()
            })
            .collect(),
        Entity::Action => snapshot
            .actions()
            .map(|action| JoinedRow {
                action: Some(action),
                ..JoinedRow::default()
            })
            .collect(),
    };

    for join in source.joins {
        rows = match join.entity {
            Entity::Action => expand_actions(snapshot, source.driver, join.kind, rows),
            dimension => attach_dimension(snapshot, dimension, join.kind, rows),
        };
    }
    rows
}

/// Fan each driver row out to the actions referencing it.
fn expand_actions<'a>(
    snapshot: &'a Snapshot,
    driver: Entity,
    kind: JoinKind,
    rows: Vec<JoinedRow<'a>>,
) -> Vec<JoinedRow<'a>> {
    if driver == Entity::Action {
        return rows;
    }
    let mut joined = Vec::with_capacity(rows.len());
    for row in rows {
        let before = joined.len();
        if let Some(id) = row.driver_id(driver) {
            joined.extend(
                snapshot
                    .actions_referencing(driver, id)
                    .map(|action| JoinedRow {
                        action: Some(action),
                        ..row
                    }),
            );
        }
        if joined.len() == before && kind == JoinKind::Left {
            joined.push(row);
        }
    }
    joined
}

/// Resolve an action's foreign key into the given dimension.
fn attach_dimension<'a>(
    snapshot: &'a Snapshot,
    dimension: Entity,
    kind: JoinKind,
    rows: Vec<JoinedRow<'a>>,
) -> Vec<JoinedRow<'a>> {
    rows.into_iter()
        .filter_map(|mut row| {
            let matched = match (dimension, row.action) {
                (Entity::Robot, Some(action)) => {
                    row.robot = snapshot.robot(action.robot_id);
                    row.robot.is_some()
                }
                (Entity::Human, Some(action)) => {
                    row.human = snapshot.human(action.human_id);
                    row.human.is_some()
                }
                (Entity::Scenario, Some(action)) => {
                    row.scenario = snapshot.scenario(action.scenario_id);
                    row.scenario.is_some()
                }
                _ => false,
            };
            (matched || kind == JoinKind::Left).then_some(row)
        })
        .collect()
}

/// Rows of one partition plus the counts needed after measures are emitted.
struct Partition<'a> {
    key: KeyTuple,
    rows: Vec<JoinedRow<'a>>,
}

impl Partition<'_> {
    fn actions(&self) -> usize {
        self.rows.iter().filter(|row| row.action.is_some()).count()
    }

    fn outcomes(&self, outcome: Outcome) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.action)
            .filter(|action| action.outcome == outcome)
            .count()
    }

    fn distinct(&self, attr: Attr) -> usize {
        let mut values: Vec<Value> = self
            .rows
            .iter()
            .map(|row| row.attr(attr))
            .filter(|value| !value.is_absent())
            .collect();
        values.sort_by(Value::natural_cmp);
        values.dedup_by(|a, b| a.natural_cmp(b).is_eq());
        values.len()
    }

    fn concat(&self, attr: Attr, separator: &str) -> String {
        self.rows
            .iter()
            .map(|row| row.attr(attr))
            .filter(|value| !value.is_absent())
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn evaluate_grouped(
    snapshot: &Snapshot,
    spec: &GroupedSpec,
    rows: Vec<JoinedRow<'_>>,
) -> Vec<Record> {
    let mut partitions: BTreeMap<KeyTuple, Vec<JoinedRow<'_>>> = BTreeMap::new();
    if spec.keys.is_empty() {
        partitions.insert(KeyTuple::default(), Vec::new());
    }
    for row in rows {
        let key = KeyTuple(
            spec.keys
                .iter()
                .map(|key| row.attr(key.attr))
                .collect::<SmallVec<[Value; 4]>>(),
        );
        partitions.entry(key).or_default().push(row);
    }

    let mut groups: Vec<(KeyTuple, Record)> = partitions
        .into_iter()
        .map(|(key, rows)| Partition { key, rows })
        .filter(|partition| match spec.having {
            Some(Having::HasActions) => partition.actions() > 0,
            None => true,
        })
        .map(|partition| {
            let record = summarize(snapshot, spec, &partition);
            (partition.key, record)
        })
        .collect();

    sort_groups(spec, &mut groups);
    if let Some(limit) = spec.limit {
        groups.truncate(limit);
    }
    groups.into_iter().map(|(_, record)| record).collect()
}

fn summarize(snapshot: &Snapshot, spec: &GroupedSpec, partition: &Partition<'_>) -> Record {
    let mut record = Record::new();
    for (key, value) in spec.keys.iter().zip(partition.key.0.iter()) {
        if let Some(field) = key.field {
            record.push(field, value.clone());
        }
    }

    let actions = partition.actions();
    for measure in spec.measures {
        let value = match measure.kind {
            MeasureKind::Rows => Value::Integer(count_to_i64(partition.rows.len())),
            MeasureKind::Actions => Value::Integer(count_to_i64(actions)),
            MeasureKind::Outcome(outcome) => {
                Value::Integer(count_to_i64(partition.outcomes(outcome)))
            }
            MeasureKind::Distinct(attr) => Value::Integer(count_to_i64(partition.distinct(attr))),
            MeasureKind::Concat(attr, separator) => {
                Value::Text(partition.concat(attr, separator))
            }
            MeasureKind::Store(count) => Value::Integer(count_to_i64(store_count(snapshot, count))),
        };
        record.push(measure.field, value);
    }

    for metric in spec.derived {
        let value = percentage(partition.outcomes(metric.numerator), actions, metric.precision)
            .map_or(Value::Absent, Value::Decimal);
        record.push(metric.field, value);
    }
    record
}

fn store_count(snapshot: &Snapshot, count: StoreCount) -> usize {
    match count {
        StoreCount::All(entity) => snapshot.count(entity),
        StoreCount::RobotsIn(state) => snapshot.robots().filter(|r| r.state == state).count(),
    }
}

/// Groups arrive in natural key order; every rule sorts stably on top of it.
fn sort_groups(spec: &GroupedSpec, groups: &mut [(KeyTuple, Record)]) {
    match spec.sort {
        SortRule::GroupKeys => {}
        SortRule::VulnerabilityRank => {
            groups.sort_by(|(a, _), (b, _)| a.cmp_with(b, Value::rank_cmp));
        }
        SortRule::LawPriority => {
            let Some(position) = spec
                .keys
                .iter()
                .position(|key| key.attr == Attr::ScenarioLaw)
            else {
                return;
            };
            groups.sort_by(|(a, _), (b, _)| a.0[position].natural_cmp(&b.0[position]));
        }
        SortRule::Descending(field) => {
            groups.sort_by(|(_, a), (_, b)| {
                descending_absent_last(
                    a.get(field).unwrap_or(&Value::Absent),
                    b.get(field).unwrap_or(&Value::Absent),
                )
            });
        }
    }
}

fn descending_absent_last(a: &Value, b: &Value) -> Ordering {
    match (a.is_absent(), b.is_absent()) {
        (false, false) => b.natural_cmp(a),
        (absent_a, absent_b) => absent_a.cmp(&absent_b),
    }
}

fn evaluate_feed(spec: &FeedSpec, mut rows: Vec<JoinedRow<'_>>) -> Vec<Record> {
    let recency = |row: &JoinedRow<'_>| row.action.map(|a| (a.timestamp, a.id));
    rows.sort_by(|a, b| recency(b).cmp(&recency(a)));
    rows.truncate(spec.limit);
    rows.iter()
        .map(|row| {
            spec.columns
                .iter()
                .fold(Record::new(), |record, column| {
                    record.with(column.field, row.attr(column.attr))
                })
        })
        .collect()
}
