//! Entities of the simulation record and their categorical domains.
//!
//! Rows are created once by an external producer and are read-only for the
//! lifetime of the process. The categorical fields deserialize only from the
//! canonical vocabulary (plus the primary producer's spelling of it); any
//! other label makes the dataset malformed.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Identity of a row within its own collection.
pub type EntityId = u32;

/// The four collections held by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Robot,
    Human,
    Scenario,
    Action,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Robot => write!(f, "robot"),
            Self::Human => write!(f, "human"),
            Self::Scenario => write!(f, "scenario"),
            Self::Action => write!(f, "action"),
        }
    }
}

/// Robot hardware line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RobotModel {
    #[serde(rename = "Humanoid-X")]
    HumanoidX,
    #[serde(rename = "Humanoid-Y")]
    HumanoidY,
    #[serde(rename = "Industrial-Z")]
    IndustrialZ,
    #[serde(rename = "Service-A")]
    ServiceA,
    #[serde(rename = "Combat-B")]
    CombatB,
}

impl RobotModel {
    pub const ALL: [Self; 5] = [
        Self::HumanoidX,
        Self::HumanoidY,
        Self::IndustrialZ,
        Self::ServiceA,
        Self::CombatB,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HumanoidX => "Humanoid-X",
            Self::HumanoidY => "Humanoid-Y",
            Self::IndustrialZ => "Industrial-Z",
            Self::ServiceA => "Service-A",
            Self::CombatB => "Combat-B",
        }
    }
}

/// Operational status recorded when the robot was registered.
///
/// A static label, not a state machine: nothing in the core transitions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotState {
    #[serde(alias = "actif")]
    Active,
    #[serde(alias = "hors_service")]
    OutOfService,
    #[serde(alias = "en_panne")]
    Broken,
}

impl RobotState {
    pub const ALL: [Self; 3] = [Self::Active, Self::OutOfService, Self::Broken];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OutOfService => "out_of_service",
            Self::Broken => "broken",
        }
    }
}

/// Exposure level of a human subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vulnerability {
    #[serde(alias = "faible")]
    Low,
    #[serde(alias = "moyenne")]
    Medium,
    #[serde(alias = "elevee")]
    High,
}

/// Sort rank of each vulnerability level. Consulted by ordinal ordering;
/// the labels themselves are never compared lexically for this purpose.
pub const VULNERABILITY_RANK: [(Vulnerability, u8); 3] = [
    (Vulnerability::Low, 1),
    (Vulnerability::Medium, 2),
    (Vulnerability::High, 3),
];

impl Vulnerability {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Position of this level in [`VULNERABILITY_RANK`].
    #[must_use]
    pub fn rank(self) -> u8 {
        VULNERABILITY_RANK
            .iter()
            .find(|(level, _)| *level == self)
            .map_or(u8::MAX, |(_, rank)| *rank)
    }
}

/// Recorded result of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[serde(alias = "succes")]
    Success,
    #[serde(alias = "mitigue")]
    Mitigated,
    #[serde(alias = "echec")]
    Failure,
}

impl Outcome {
    pub const ALL: [Self; 3] = [Self::Success, Self::Mitigated, Self::Failure];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Mitigated => "mitigated",
            Self::Failure => "failure",
        }
    }
}

/// Which law of robotics a scenario centers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LawPriority {
    /// Law 1: a robot may not injure a human being.
    ProtectHumanLife = 1,
    /// Law 2: a robot must obey orders given by human beings.
    ObeyOrders = 2,
    /// Law 3: a robot must protect its own existence.
    SelfPreservation = 3,
}

/// Raised when a scenario carries a law priority outside `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("law priority must be 1, 2 or 3 (got {0})")]
pub struct InvalidLawPriority(pub u8);

impl LawPriority {
    pub const ALL: [Self; 3] = [
        Self::ProtectHumanLife,
        Self::ObeyOrders,
        Self::SelfPreservation,
    ];

    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LawPriority {
    type Error = InvalidLawPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ProtectHumanLife),
            2 => Ok(Self::ObeyOrders),
            3 => Ok(Self::SelfPreservation),
            other => Err(InvalidLawPriority(other)),
        }
    }
}

impl From<LawPriority> for u8 {
    fn from(value: LawPriority) -> Self {
        value.number()
    }
}

/// An autonomous agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub id: EntityId,
    pub name: String,
    pub model: RobotModel,
    pub state: RobotState,
    /// Relative processor capacity (50-100) when the producer records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_capacity: Option<u8>,
}

/// A human subject involved in actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Human {
    pub id: EntityId,
    pub name: String,
    pub vulnerability: Vulnerability,
    /// Sector the subject lives or works in; free categorical label.
    pub location: String,
}

/// A predefined ethical dilemma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: EntityId,
    pub description: String,
    pub law_priority: LawPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A logged decision: the fact table every report aggregates over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: EntityId,
    pub robot_id: EntityId,
    pub human_id: EntityId,
    pub scenario_id: EntityId,
    /// Free text describing what the robot did.
    pub kind: String,
    pub timestamp: NaiveDateTime,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u32>,
}

/// The four collections as delivered by a producer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub robots: Vec<Robot>,
    #[serde(default)]
    pub humans: Vec<Human>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Dataset {
    /// Create a dataset with no rows (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a dataset from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a categorical field carries
    /// a label outside the canonical vocabulary.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the dataset as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Hex SHA-256 of the canonical JSON encoding, used to tell snapshots apart.
    #[must_use]
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.robots.len() + self.humans.len() + self.scenarios.len() + self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_producer_vocabulary() {
        let json = r#"{
            "robots": [
                {"id": 1, "name": "R001_resc", "model": "Humanoid-X", "state": "active"},
                {"id": 2, "name": "R002_resc", "model": "Combat-B", "state": "hors_service"}
            ],
            "humans": [
                {"id": 1, "name": "H001_civil", "vulnerability": "elevee", "location": "Civil"}
            ],
            "scenarios": [
                {"id": 1, "description": "Trolley problem", "law_priority": 1, "difficulty": 9}
            ],
            "actions": [
                {
                    "id": 1, "robot_id": 1, "human_id": 1, "scenario_id": 1,
                    "kind": "Direct intervention", "timestamp": "2024-05-01T12:30:00",
                    "outcome": "mitigue"
                }
            ]
        }"#;

        let data = Dataset::from_json(json).unwrap();
        assert_eq!(data.robots[1].state, RobotState::OutOfService);
        assert_eq!(data.humans[0].vulnerability, Vulnerability::High);
        assert_eq!(data.scenarios[0].law_priority, LawPriority::ProtectHumanLife);
        assert_eq!(data.actions[0].outcome, Outcome::Mitigated);
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn rejects_unknown_vocabulary() {
        let json = r#"{"robots": [{"id": 1, "name": "R", "model": "Service-A", "state": "retired"}]}"#;
        assert!(Dataset::from_json(json).is_err());

        let json = r#"{"humans": [{"id": 1, "name": "H", "vulnerability": "basse", "location": "Civil"}]}"#;
        assert!(Dataset::from_json(json).is_err());
    }

    #[test]
    fn law_priority_rejects_out_of_range() {
        assert_eq!(LawPriority::try_from(2), Ok(LawPriority::ObeyOrders));
        assert_eq!(LawPriority::try_from(4), Err(InvalidLawPriority(4)));
        let json = r#"{"scenarios": [{"id": 1, "description": "x", "law_priority": 0}]}"#;
        assert!(Dataset::from_json(json).is_err());
    }

    #[test]
    fn vulnerability_rank_is_ordinal_not_lexical() {
        let mut levels = vec![Vulnerability::High, Vulnerability::Low, Vulnerability::Medium];
        levels.sort_by_key(|level| level.rank());
        assert_eq!(levels, Vulnerability::ALL.to_vec());
        assert!(Vulnerability::High.label() < Vulnerability::Low.label());
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let empty = Dataset::empty();
        assert_eq!(empty.digest(), Dataset::empty().digest());
        assert!(empty.is_empty());

        let mut one = Dataset::empty();
        one.robots.push(Robot {
            id: 1,
            name: "R001".to_string(),
            model: RobotModel::ServiceA,
            state: RobotState::Broken,
            processor_capacity: None,
        });
        assert_ne!(empty.digest(), one.digest());
        assert_eq!(empty.digest().len(), 64);
    }

    #[test]
    fn labels_match_serialized_names() {
        let quoted = |label: &str| format!("\"{label}\"");
        for model in RobotModel::ALL {
            assert_eq!(serde_json::to_string(&model).unwrap(), quoted(model.label()));
        }
        for state in RobotState::ALL {
            assert_eq!(serde_json::to_string(&state).unwrap(), quoted(state.label()));
        }
        for outcome in Outcome::ALL {
            assert_eq!(serde_json::to_string(&outcome).unwrap(), quoted(outcome.label()));
        }
    }
}
