//! Read-only data store access.
//!
//! A [`StoreSource`] hands out one [`Snapshot`] per evaluation. The snapshot
//! owns everything it needs and is released when dropped, so every exit path
//! of an evaluation (including early returns on error) gives it back.
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::model::{Action, Dataset, Entity, EntityId, Human, Robot, Scenario};

/// Failures while acquiring a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store at {location} is unavailable: {source}")]
    Unavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store at {location} is malformed: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: Entity, id: EntityId },
}

/// Something a snapshot of the four collections can be acquired from.
pub trait StoreSource {
    /// Acquire a consistent, read-only snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or its content does
    /// not decode into the canonical model.
    fn open(&self) -> Result<Snapshot, StoreError>;

    /// Human-readable location used in logs and banners.
    fn describe(&self) -> String;
}

/// In-memory source sharing one dataset across evaluations.
#[derive(Debug, Clone)]
pub struct MemorySource {
    dataset: Arc<Dataset>,
}

impl MemorySource {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl StoreSource for MemorySource {
    fn open(&self) -> Result<Snapshot, StoreError> {
        Snapshot::new(Arc::clone(&self.dataset))
    }

    fn describe(&self) -> String {
        format!("memory ({} rows)", self.dataset.len())
    }
}

/// JSON dataset file, re-read on every acquisition.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreSource for JsonFileSource {
    fn open(&self) -> Result<Snapshot, StoreError> {
        let location = self.path.display().to_string();
        let raw = std::fs::read_to_string(&self.path).map_err(|source| {
            StoreError::Unavailable {
                location: location.clone(),
                source,
            }
        })?;
        let dataset = Dataset::from_json(&raw)
            .map_err(|source| StoreError::Malformed { location, source })?;
        Snapshot::new(Arc::new(dataset))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Indexed view over one dataset.
///
/// Collections iterate in ascending id order. Foreign keys can be traversed
/// from an action to its robot/human/scenario and back from any of those to
/// the actions referencing it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    dataset: Arc<Dataset>,
    robots: BTreeMap<EntityId, usize>,
    humans: BTreeMap<EntityId, usize>,
    scenarios: BTreeMap<EntityId, usize>,
    actions: BTreeMap<EntityId, usize>,
    by_robot: HashMap<EntityId, Vec<usize>>,
    by_human: HashMap<EntityId, Vec<usize>>,
    by_scenario: HashMap<EntityId, Vec<usize>>,
    dangling: usize,
}

impl Snapshot {
    /// Index a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if a collection repeats an id.
    pub fn new(dataset: Arc<Dataset>) -> Result<Self, StoreError> {
        let robots = index_ids(Entity::Robot, dataset.robots.iter().map(|r| r.id))?;
        let humans = index_ids(Entity::Human, dataset.humans.iter().map(|h| h.id))?;
        let scenarios = index_ids(Entity::Scenario, dataset.scenarios.iter().map(|s| s.id))?;
        let actions = index_ids(Entity::Action, dataset.actions.iter().map(|a| a.id))?;

        let mut by_robot: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut by_human: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut by_scenario: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut dangling = 0;
        for &idx in actions.values() {
            let action = &dataset.actions[idx];
            by_robot.entry(action.robot_id).or_default().push(idx);
            by_human.entry(action.human_id).or_default().push(idx);
            by_scenario.entry(action.scenario_id).or_default().push(idx);
            dangling += usize::from(!robots.contains_key(&action.robot_id))
                + usize::from(!humans.contains_key(&action.human_id))
                + usize::from(!scenarios.contains_key(&action.scenario_id));
        }

        if dangling > 0 {
            warn!("{dangling} action foreign keys do not resolve; joins treat them as absent");
        }
        debug!(
            "snapshot opened: {} robots, {} humans, {} scenarios, {} actions",
            robots.len(),
            humans.len(),
            scenarios.len(),
            actions.len()
        );

        Ok(Self {
            dataset,
            robots,
            humans,
            scenarios,
            actions,
            by_robot,
            by_human,
            by_scenario,
            dangling,
        })
    }

    pub fn robots(&self) -> impl Iterator<Item = &Robot> + '_ {
        self.robots.values().map(|&idx| &self.dataset.robots[idx])
    }

    pub fn humans(&self) -> impl Iterator<Item = &Human> + '_ {
        self.humans.values().map(|&idx| &self.dataset.humans[idx])
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> + '_ {
        self.scenarios.values().map(|&idx| &self.dataset.scenarios[idx])
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.values().map(|&idx| &self.dataset.actions[idx])
    }

    #[must_use]
    pub fn robot(&self, id: EntityId) -> Option<&Robot> {
        self.robots.get(&id).map(|&idx| &self.dataset.robots[idx])
    }

    #[must_use]
    pub fn human(&self, id: EntityId) -> Option<&Human> {
        self.humans.get(&id).map(|&idx| &self.dataset.humans[idx])
    }

    #[must_use]
    pub fn scenario(&self, id: EntityId) -> Option<&Scenario> {
        self.scenarios.get(&id).map(|&idx| &self.dataset.scenarios[idx])
    }

    /// Actions whose foreign key for `entity` equals `id`, in action id order.
    pub fn actions_referencing(
        &self,
        entity: Entity,
        id: EntityId,
    ) -> impl Iterator<Item = &Action> + '_ {
        let index = match entity {
            Entity::Robot => self.by_robot.get(&id),
            Entity::Human => self.by_human.get(&id),
            Entity::Scenario => self.by_scenario.get(&id),
            Entity::Action => None,
        };
        index
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&idx| &self.dataset.actions[idx])
    }

    /// Number of rows in one collection.
    #[must_use]
    pub fn count(&self, entity: Entity) -> usize {
        match entity {
            Entity::Robot => self.robots.len(),
            Entity::Human => self.humans.len(),
            Entity::Scenario => self.scenarios.len(),
            Entity::Action => self.actions.len(),
        }
    }

    /// Action foreign keys that point at a missing row.
    #[must_use]
    pub const fn dangling_references(&self) -> usize {
        self.dangling
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

fn index_ids(
    entity: Entity,
    ids: impl Iterator<Item = EntityId>,
) -> Result<BTreeMap<EntityId, usize>, StoreError> {
    let mut index = BTreeMap::new();
    for (idx, id) in ids.enumerate() {
        if index.insert(id, idx).is_some() {
            return Err(StoreError::DuplicateId { entity, id });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LawPriority, Outcome, RobotModel, RobotState, Vulnerability};
    use chrono::NaiveDate;

    fn robot(id: EntityId) -> Robot {
        Robot {
            id,
            name: format!("R{id:03}"),
            model: RobotModel::HumanoidY,
            state: RobotState::Active,
            processor_capacity: Some(80),
        }
    }

    fn action(id: EntityId, robot_id: EntityId, scenario_id: EntityId) -> Action {
        Action {
            id,
            robot_id,
            human_id: 1,
            scenario_id,
            kind: "Negotiation".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
            outcome: Outcome::Success,
            execution_time_ms: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            robots: vec![robot(3), robot(1)],
            humans: vec![Human {
                id: 1,
                name: "H001".to_string(),
                vulnerability: Vulnerability::Low,
                location: "Civil".to_string(),
            }],
            scenarios: vec![Scenario {
                id: 1,
                description: "Trolley".to_string(),
                law_priority: LawPriority::ProtectHumanLife,
                difficulty: None,
                title: None,
            }],
            actions: vec![action(2, 3, 1), action(1, 3, 1), action(3, 9, 1)],
        }
    }

    #[test]
    fn iterates_in_id_order_and_traverses_both_directions() {
        let snapshot = MemorySource::new(dataset()).open().unwrap();
        let ids: Vec<_> = snapshot.robots().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let referencing: Vec<_> = snapshot
            .actions_referencing(Entity::Robot, 3)
            .map(|a| a.id)
            .collect();
        assert_eq!(referencing, vec![1, 2]);
        assert_eq!(snapshot.actions_referencing(Entity::Robot, 1).count(), 0);

        let first = snapshot.actions().next().unwrap();
        assert_eq!(snapshot.robot(first.robot_id).map(|r| r.id), Some(3));
        assert_eq!(snapshot.count(Entity::Action), 3);
    }

    #[test]
    fn counts_dangling_references() {
        let snapshot = MemorySource::new(dataset()).open().unwrap();
        assert_eq!(snapshot.dangling_references(), 1);
        assert!(snapshot.robot(9).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut data = dataset();
        data.robots.push(robot(1));
        let err = MemorySource::new(data).open().unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateId {
                entity: Entity::Robot,
                id: 1
            }
        ));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = JsonFileSource::new(std::env::temp_dir().join("colonie-missing-store.json"));
        let err = source.open().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(err.to_string().contains("colonie-missing-store.json"));
    }

    #[test]
    fn file_source_reads_dataset() {
        let path = std::env::temp_dir().join(format!(
            "colonie-store-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&path, dataset().to_json_pretty().unwrap()).unwrap();
        let snapshot = JsonFileSource::new(&path).open().unwrap();
        assert_eq!(snapshot.count(Entity::Robot), 2);
        assert_eq!(snapshot.dataset().digest(), dataset().digest());

        std::fs::write(&path, "{\"robots\": [").unwrap();
        let err = JsonFileSource::new(&path).open().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        let _ = std::fs::remove_file(path);
    }
}
