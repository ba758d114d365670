//! The closed catalog of report definitions.
//!
//! Every report is a declarative value: which entities participate and how
//! they are joined, how rows are partitioned, what is counted, which rates are
//! derived, how groups are ordered, and whether inactive groups are dropped.
//! The engine evaluates all of them with the same machinery.
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Entity, LawPriority, Outcome, RobotState};

/// Identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportId {
    GlobalStats,
    RobotsStatus,
    ActionsResults,
    HumansVulnerability,
    SectorsDistribution,
    Timeline,
    PerformanceByModel,
    ScenarioDifficulty,
    EthicalDilemmas,
    VulnerabilityVsOutcomes,
    RobotSpecialization,
    ScenariosByPriority,
    SectorRiskAnalysis,
    ActionCategories,
    EthicalComplexity,
    RobotSpecializationDetailed,
    DilemmaSuccessByLaw,
    VulnerabilityImpact,
    SectorEthicalAnalysis,
    LawConflictAnalysis,
    RobotEthicalMaturity,
    TimeExecutionPatterns,
    ActionKinds,
    PerformanceByDifficulty,
}

/// Raised by the boundary when a request names a report outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report id: {id}")]
pub struct UnknownReport {
    pub id: String,
}

impl ReportId {
    pub const ALL: [Self; 24] = [
        Self::GlobalStats,
        Self::RobotsStatus,
        Self::ActionsResults,
        Self::HumansVulnerability,
        Self::SectorsDistribution,
        Self::Timeline,
        Self::PerformanceByModel,
        Self::ScenarioDifficulty,
        Self::EthicalDilemmas,
        Self::VulnerabilityVsOutcomes,
        Self::RobotSpecialization,
        Self::ScenariosByPriority,
        Self::SectorRiskAnalysis,
        Self::ActionCategories,
        Self::EthicalComplexity,
        Self::RobotSpecializationDetailed,
        Self::DilemmaSuccessByLaw,
        Self::VulnerabilityImpact,
        Self::SectorEthicalAnalysis,
        Self::LawConflictAnalysis,
        Self::RobotEthicalMaturity,
        Self::TimeExecutionPatterns,
        Self::ActionKinds,
        Self::PerformanceByDifficulty,
    ];

    /// External identifier (dashboard path segment).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::GlobalStats => "global-stats",
            Self::RobotsStatus => "robots-status",
            Self::ActionsResults => "actions-results",
            Self::HumansVulnerability => "humans-vulnerability",
            Self::SectorsDistribution => "sectors-distribution",
            Self::Timeline => "timeline",
            Self::PerformanceByModel => "performance-by-model",
            Self::ScenarioDifficulty => "scenario-difficulty",
            Self::EthicalDilemmas => "ethical-dilemmas",
            Self::VulnerabilityVsOutcomes => "vulnerability-vs-outcomes",
            Self::RobotSpecialization => "robot-specialization",
            Self::ScenariosByPriority => "scenarios-by-priority",
            Self::SectorRiskAnalysis => "sector-risk-analysis",
            Self::ActionCategories => "action-categories",
            Self::EthicalComplexity => "ethical-complexity",
            Self::RobotSpecializationDetailed => "robot-specialization-detailed",
            Self::DilemmaSuccessByLaw => "dilemma-success-by-law",
            Self::VulnerabilityImpact => "vulnerability-impact",
            Self::SectorEthicalAnalysis => "sector-ethical-analysis",
            Self::LawConflictAnalysis => "law-conflict-analysis",
            Self::RobotEthicalMaturity => "robot-ethical-maturity",
            Self::TimeExecutionPatterns => "time-execution-patterns",
            Self::ActionKinds => "action-kinds",
            Self::PerformanceByDifficulty => "performance-by-difficulty",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GlobalStats => "Totals across the whole record and the overall success rate",
            Self::RobotsStatus => "Robot count per model and operational state",
            Self::ActionsResults => "Action count per outcome",
            Self::HumansVulnerability => "Human count per vulnerability level",
            Self::SectorsDistribution => "Human count per sector, largest first",
            Self::Timeline => "The 50 most recent actions with robot, human and scenario",
            Self::PerformanceByModel => "Outcome counts and success rate per robot model",
            Self::ScenarioDifficulty => "Attempts and success rate per scenario",
            Self::EthicalDilemmas => "Full outcome breakdown per scenario",
            Self::VulnerabilityVsOutcomes => "Action count per vulnerability level and outcome",
            Self::RobotSpecialization => "Top 15 robots by success rate",
            Self::ScenariosByPriority => "Scenarios grouped by law priority",
            Self::SectorRiskAnalysis => "Success and failure per sector",
            Self::ActionCategories => "Outcome counts and success rate per action kind",
            Self::EthicalComplexity => "Scenarios and attempts per law",
            Self::RobotSpecializationDetailed => "Top 15 robots by success rate, full detail",
            Self::DilemmaSuccessByLaw => "Outcome counts and success rate per law",
            Self::VulnerabilityImpact => "Outcome counts and success rate per vulnerability level",
            Self::SectorEthicalAnalysis => "Distinct scenarios and outcomes per sector",
            Self::LawConflictAnalysis => "Dilemmas and resolution rate per principal law",
            Self::RobotEthicalMaturity => "Top 10 active robots by success rate and law coverage",
            Self::TimeExecutionPatterns => "Decision count per decision category",
            Self::ActionKinds => "Action count per action kind",
            Self::PerformanceByDifficulty => {
                "Outcome counts and success rate per scenario difficulty"
            }
        }
    }

    /// The declarative definition evaluated by the engine.
    #[must_use]
    pub const fn definition(self) -> &'static ReportDefinition {
        match self {
            Self::GlobalStats => &GLOBAL_STATS,
            Self::RobotsStatus => &ROBOTS_STATUS,
            Self::ActionsResults => &ACTIONS_RESULTS,
            Self::HumansVulnerability => &HUMANS_VULNERABILITY,
            Self::SectorsDistribution => &SECTORS_DISTRIBUTION,
            Self::Timeline => &TIMELINE,
            Self::PerformanceByModel => &PERFORMANCE_BY_MODEL,
            Self::ScenarioDifficulty => &SCENARIO_DIFFICULTY,
            Self::EthicalDilemmas => &ETHICAL_DILEMMAS,
            Self::VulnerabilityVsOutcomes => &VULNERABILITY_VS_OUTCOMES,
            Self::RobotSpecialization => &ROBOT_SPECIALIZATION,
            Self::ScenariosByPriority => &SCENARIOS_BY_PRIORITY,
            Self::SectorRiskAnalysis => &SECTOR_RISK_ANALYSIS,
            Self::ActionCategories => &ACTION_CATEGORIES,
            Self::EthicalComplexity => &ETHICAL_COMPLEXITY,
            Self::RobotSpecializationDetailed => &ROBOT_SPECIALIZATION_DETAILED,
            Self::DilemmaSuccessByLaw => &DILEMMA_SUCCESS_BY_LAW,
            Self::VulnerabilityImpact => &VULNERABILITY_IMPACT,
            Self::SectorEthicalAnalysis => &SECTOR_ETHICAL_ANALYSIS,
            Self::LawConflictAnalysis => &LAW_CONFLICT_ANALYSIS,
            Self::RobotEthicalMaturity => &ROBOT_ETHICAL_MATURITY,
            Self::TimeExecutionPatterns => &TIME_EXECUTION_PATTERNS,
            Self::ActionKinds => &ACTION_KINDS,
            Self::PerformanceByDifficulty => &PERFORMANCE_BY_DIFFICULTY,
        }
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportId {
    type Err = UnknownReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownReport {
                id: wanted.to_string(),
            })
    }
}

/// Inner joins drop unmatched rows; left joins keep them with absent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    pub entity: Entity,
    pub kind: JoinKind,
}

impl Join {
    #[must_use]
    pub const fn inner(entity: Entity) -> Self {
        Self {
            entity,
            kind: JoinKind::Inner,
        }
    }

    #[must_use]
    pub const fn left(entity: Entity) -> Self {
        Self {
            entity,
            kind: JoinKind::Left,
        }
    }
}

/// The collection rows start from, followed by joins applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceJoin {
    pub driver: Entity,
    pub joins: &'static [Join],
}

/// Wording used when a law priority is rendered as a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LawVocabulary {
    /// `Law 1: Protect Human Life`
    Full,
    /// `Law 1: Protect Life`
    Short,
    /// `Law 1 (Protect Life)`
    Principal,
    /// `Emergency (Protect Life)`
    Decision,
}

impl LawVocabulary {
    #[must_use]
    pub const fn label(self, law: LawPriority) -> &'static str {
        match (self, law) {
            (Self::Full, LawPriority::ProtectHumanLife) => "Law 1: Protect Human Life",
            (Self::Short, LawPriority::ProtectHumanLife) => "Law 1: Protect Life",
            (Self::Full | Self::Short, LawPriority::ObeyOrders) => "Law 2: Obey Orders",
            (Self::Full | Self::Short, LawPriority::SelfPreservation) => {
                "Law 3: Self-Preservation"
            }
            (Self::Principal, LawPriority::ProtectHumanLife) => "Law 1 (Protect Life)",
            (Self::Principal, LawPriority::ObeyOrders) => "Law 2 (Obey Orders)",
            (Self::Principal, LawPriority::SelfPreservation) => "Law 3 (Self-Preservation)",
            (Self::Decision, LawPriority::ProtectHumanLife) => "Emergency (Protect Life)",
            (Self::Decision, LawPriority::ObeyOrders) => "Protocol (Obey)",
            (Self::Decision, LawPriority::SelfPreservation) => "Safety (Self-Preservation)",
        }
    }
}

/// An attribute readable from a joined row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    RobotId,
    RobotName,
    RobotModel,
    RobotState,
    HumanName,
    HumanVulnerability,
    HumanLocation,
    ScenarioId,
    ScenarioDescription,
    ScenarioLaw,
    ScenarioLawLabel(LawVocabulary),
    ScenarioDifficulty,
    ActionId,
    ActionKind,
    ActionOutcome,
    ActionTimestamp,
}

/// A partitioning attribute. Hidden keys split groups without being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupKey {
    pub field: Option<&'static str>,
    pub attr: Attr,
}

impl GroupKey {
    #[must_use]
    pub const fn shown(field: &'static str, attr: Attr) -> Self {
        Self {
            field: Some(field),
            attr,
        }
    }

    #[must_use]
    pub const fn hidden(attr: Attr) -> Self {
        Self { field: None, attr }
    }
}

/// Whole-collection counts, independent of the current group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCount {
    All(Entity),
    RobotsIn(RobotState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Joined rows in the group, whether or not they carry an action.
    Rows,
    /// Rows carrying an action.
    Actions,
    /// Rows whose action has the given outcome.
    Outcome(Outcome),
    /// Distinct present values of an attribute.
    Distinct(Attr),
    /// Present values of an attribute joined by a separator, in row order.
    Concat(Attr, &'static str),
    Store(StoreCount),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub field: &'static str,
    pub kind: MeasureKind,
}

impl Measure {
    #[must_use]
    pub const fn new(field: &'static str, kind: MeasureKind) -> Self {
        Self { field, kind }
    }

    #[must_use]
    pub const fn rows(field: &'static str) -> Self {
        Self::new(field, MeasureKind::Rows)
    }

    #[must_use]
    pub const fn actions(field: &'static str) -> Self {
        Self::new(field, MeasureKind::Actions)
    }

    #[must_use]
    pub const fn outcome(field: &'static str, outcome: Outcome) -> Self {
        Self::new(field, MeasureKind::Outcome(outcome))
    }

    #[must_use]
    pub const fn distinct(field: &'static str, attr: Attr) -> Self {
        Self::new(field, MeasureKind::Distinct(attr))
    }
}

/// `round(100 * count(outcome) / count(actions), precision)`; absent when the
/// group has no actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedMetric {
    pub field: &'static str,
    pub numerator: Outcome,
    pub precision: u32,
}

impl DerivedMetric {
    #[must_use]
    pub const fn success_rate(field: &'static str) -> Self {
        Self {
            field,
            numerator: Outcome::Success,
            precision: 1,
        }
    }
}

/// How groups are ordered. Ties always keep natural group key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    /// Ascending over every group key, in key order.
    GroupKeys,
    /// Vulnerability by rank (low, medium, high); other keys ascending.
    VulnerabilityRank,
    /// Law priority ascending (1, 2, 3); other keys ascending.
    LawPriority,
    /// Descending by an emitted field, absent values last.
    Descending(&'static str),
}

/// Group filter applied after measures are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Having {
    /// Drop groups with no contributing action.
    HasActions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedSpec {
    pub keys: &'static [GroupKey],
    pub measures: &'static [Measure],
    pub derived: &'static [DerivedMetric],
    pub sort: SortRule,
    pub having: Option<Having>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub attr: Attr,
}

impl Column {
    #[must_use]
    pub const fn new(field: &'static str, attr: Attr) -> Self {
        Self { field, attr }
    }
}

/// Ungrouped projection of the most recent actions, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSpec {
    pub columns: &'static [Column],
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Grouped(GroupedSpec),
    Feed(FeedSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDefinition {
    pub id: ReportId,
    pub source: SourceJoin,
    pub shape: Shape,
}

/// Maximum rows returned by the activity feed.
pub const TIMELINE_CAP: usize = 50;

const ACTIONS_ONLY: SourceJoin = SourceJoin {
    driver: Entity::Action,
    joins: &[],
};
const ROBOTS_ONLY: SourceJoin = SourceJoin {
    driver: Entity::Robot,
    joins: &[],
};
const HUMANS_ONLY: SourceJoin = SourceJoin {
    driver: Entity::Human,
    joins: &[],
};
const SCENARIOS_ONLY: SourceJoin = SourceJoin {
    driver: Entity::Scenario,
    joins: &[],
};
const ROBOTS_LEFT_ACTIONS: SourceJoin = SourceJoin {
    driver: Entity::Robot,
    joins: &[Join::left(Entity::Action)],
};
const SCENARIOS_LEFT_ACTIONS: SourceJoin = SourceJoin {
    driver: Entity::Scenario,
    joins: &[Join::left(Entity::Action)],
};
const SCENARIOS_WITH_ACTIONS: SourceJoin = SourceJoin {
    driver: Entity::Scenario,
    joins: &[Join::inner(Entity::Action)],
};
const HUMANS_WITH_ACTIONS: SourceJoin = SourceJoin {
    driver: Entity::Human,
    joins: &[Join::inner(Entity::Action)],
};

const OUTCOME_BREAKDOWN: [Measure; 4] = [
    Measure::actions("total_actions"),
    Measure::outcome("success", Outcome::Success),
    Measure::outcome("mitigated", Outcome::Mitigated),
    Measure::outcome("failure", Outcome::Failure),
];
const SUCCESS_RATE: [DerivedMetric; 1] = [DerivedMetric::success_rate("success_rate")];

const fn grouped(
    keys: &'static [GroupKey],
    measures: &'static [Measure],
    derived: &'static [DerivedMetric],
    sort: SortRule,
) -> GroupedSpec {
    GroupedSpec {
        keys,
        measures,
        derived,
        sort,
        having: None,
        limit: None,
    }
}

static GLOBAL_STATS: ReportDefinition = ReportDefinition {
    id: ReportId::GlobalStats,
    source: ACTIONS_ONLY,
    shape: Shape::Grouped(grouped(
        &[],
        &[
            Measure::actions("total_actions"),
            Measure::new("total_robots", MeasureKind::Store(StoreCount::All(Entity::Robot))),
            Measure::new(
                "active_robots",
                MeasureKind::Store(StoreCount::RobotsIn(RobotState::Active)),
            ),
            Measure::new(
                "inactive_robots",
                MeasureKind::Store(StoreCount::RobotsIn(RobotState::OutOfService)),
            ),
            Measure::new(
                "broken_robots",
                MeasureKind::Store(StoreCount::RobotsIn(RobotState::Broken)),
            ),
            Measure::new("total_humans", MeasureKind::Store(StoreCount::All(Entity::Human))),
            Measure::new(
                "total_scenarios",
                MeasureKind::Store(StoreCount::All(Entity::Scenario)),
            ),
            Measure::outcome("total_success", Outcome::Success),
            Measure::outcome("total_mitigated", Outcome::Mitigated),
            Measure::outcome("total_failure", Outcome::Failure),
        ],
        &[DerivedMetric {
            field: "success_rate",
            numerator: Outcome::Success,
            precision: 2,
        }],
        SortRule::GroupKeys,
    )),
};

static ROBOTS_STATUS: ReportDefinition = ReportDefinition {
    id: ReportId::RobotsStatus,
    source: ROBOTS_ONLY,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("model", Attr::RobotModel),
            GroupKey::shown("state", Attr::RobotState),
        ],
        &[Measure::rows("count")],
        &[],
        SortRule::GroupKeys,
    )),
};

static ACTIONS_RESULTS: ReportDefinition = ReportDefinition {
    id: ReportId::ActionsResults,
    source: ACTIONS_ONLY,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("outcome", Attr::ActionOutcome)],
        &[Measure::rows("count")],
        &[],
        SortRule::GroupKeys,
    )),
};

static HUMANS_VULNERABILITY: ReportDefinition = ReportDefinition {
    id: ReportId::HumansVulnerability,
    source: HUMANS_ONLY,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("vulnerability", Attr::HumanVulnerability)],
        &[Measure::rows("count")],
        &[],
        SortRule::VulnerabilityRank,
    )),
};

static SECTORS_DISTRIBUTION: ReportDefinition = ReportDefinition {
    id: ReportId::SectorsDistribution,
    source: HUMANS_ONLY,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("sector", Attr::HumanLocation)],
        &[Measure::rows("count")],
        &[],
        SortRule::Descending("count"),
    )),
};

static TIMELINE: ReportDefinition = ReportDefinition {
    id: ReportId::Timeline,
    source: SourceJoin {
        driver: Entity::Action,
        joins: &[
            Join::left(Entity::Robot),
            Join::left(Entity::Human),
            Join::left(Entity::Scenario),
        ],
    },
    shape: Shape::Feed(FeedSpec {
        columns: &[
            Column::new("timestamp", Attr::ActionTimestamp),
            Column::new("action", Attr::ActionKind),
            Column::new("outcome", Attr::ActionOutcome),
            Column::new("robot_name", Attr::RobotName),
            Column::new("human_name", Attr::HumanName),
            Column::new("scenario_description", Attr::ScenarioDescription),
        ],
        limit: TIMELINE_CAP,
    }),
};

static PERFORMANCE_BY_MODEL: ReportDefinition = ReportDefinition {
    id: ReportId::PerformanceByModel,
    source: ROBOTS_LEFT_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("model", Attr::RobotModel)],
        &OUTCOME_BREAKDOWN,
        &SUCCESS_RATE,
        SortRule::Descending("success_rate"),
    )),
};

static SCENARIO_DIFFICULTY: ReportDefinition = ReportDefinition {
    id: ReportId::ScenarioDifficulty,
    source: SCENARIOS_LEFT_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::hidden(Attr::ScenarioId),
            GroupKey::shown("description", Attr::ScenarioDescription),
            GroupKey::shown("law", Attr::ScenarioLaw),
        ],
        &[
            Measure::actions("total_actions"),
            Measure::outcome("success", Outcome::Success),
        ],
        &SUCCESS_RATE,
        SortRule::LawPriority,
    )),
};

static ETHICAL_DILEMMAS: ReportDefinition = ReportDefinition {
    id: ReportId::EthicalDilemmas,
    source: SCENARIOS_LEFT_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("scenario_id", Attr::ScenarioId),
            GroupKey::shown("description", Attr::ScenarioDescription),
            GroupKey::shown("law", Attr::ScenarioLaw),
        ],
        &[
            Measure::actions("times_faced"),
            Measure::outcome("success", Outcome::Success),
            Measure::outcome("mitigated", Outcome::Mitigated),
            Measure::outcome("failure", Outcome::Failure),
        ],
        &SUCCESS_RATE,
        SortRule::LawPriority,
    )),
};

static VULNERABILITY_VS_OUTCOMES: ReportDefinition = ReportDefinition {
    id: ReportId::VulnerabilityVsOutcomes,
    source: HUMANS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("vulnerability", Attr::HumanVulnerability),
            GroupKey::shown("outcome", Attr::ActionOutcome),
        ],
        &[Measure::actions("count")],
        &[],
        SortRule::VulnerabilityRank,
    )),
};

const ROBOT_SPECIALIZATION_SPEC: GroupedSpec = GroupedSpec {
    keys: &[
        GroupKey::hidden(Attr::RobotId),
        GroupKey::shown("robot_name", Attr::RobotName),
        GroupKey::shown("model", Attr::RobotModel),
        GroupKey::shown("state", Attr::RobotState),
    ],
    measures: &[
        Measure::distinct("scenarios_handled", Attr::ScenarioId),
        Measure::actions("total_actions"),
        Measure::outcome("success", Outcome::Success),
        Measure::outcome("mitigated", Outcome::Mitigated),
        Measure::outcome("failure", Outcome::Failure),
    ],
    derived: &SUCCESS_RATE,
    sort: SortRule::Descending("success_rate"),
    having: None,
    limit: Some(15),
};

static ROBOT_SPECIALIZATION: ReportDefinition = ReportDefinition {
    id: ReportId::RobotSpecialization,
    source: ROBOTS_LEFT_ACTIONS,
    shape: Shape::Grouped(ROBOT_SPECIALIZATION_SPEC),
};

static SCENARIOS_BY_PRIORITY: ReportDefinition = ReportDefinition {
    id: ReportId::ScenariosByPriority,
    source: SCENARIOS_ONLY,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("law", Attr::ScenarioLaw),
            GroupKey::shown("law_name", Attr::ScenarioLawLabel(LawVocabulary::Full)),
        ],
        &[
            Measure::rows("scenario_count"),
            Measure::new(
                "scenarios_list",
                MeasureKind::Concat(Attr::ScenarioDescription, " | "),
            ),
        ],
        &[],
        SortRule::LawPriority,
    )),
};

static SECTOR_RISK_ANALYSIS: ReportDefinition = ReportDefinition {
    id: ReportId::SectorRiskAnalysis,
    source: HUMANS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("sector", Attr::HumanLocation)],
        &[
            Measure::actions("actions"),
            Measure::outcome("success", Outcome::Success),
            Measure::outcome("failure", Outcome::Failure),
        ],
        &SUCCESS_RATE,
        SortRule::Descending("success_rate"),
    )),
};

static ACTION_CATEGORIES: ReportDefinition = ReportDefinition {
    id: ReportId::ActionCategories,
    source: ACTIONS_ONLY,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("category", Attr::ActionKind)],
        &[
            Measure::actions("total"),
            Measure::outcome("success", Outcome::Success),
            Measure::outcome("mitigated", Outcome::Mitigated),
            Measure::outcome("failure", Outcome::Failure),
        ],
        &SUCCESS_RATE,
        SortRule::Descending("success_rate"),
    )),
};

static ETHICAL_COMPLEXITY: ReportDefinition = ReportDefinition {
    id: ReportId::EthicalComplexity,
    source: SCENARIOS_LEFT_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("law", Attr::ScenarioLaw),
            GroupKey::shown("law_name", Attr::ScenarioLawLabel(LawVocabulary::Short)),
        ],
        &[
            Measure::distinct("scenario_count", Attr::ScenarioId),
            Measure::actions("total_attempts"),
        ],
        &[],
        SortRule::LawPriority,
    )),
};

static ROBOT_SPECIALIZATION_DETAILED: ReportDefinition = ReportDefinition {
    id: ReportId::RobotSpecializationDetailed,
    source: ROBOTS_LEFT_ACTIONS,
    shape: Shape::Grouped(ROBOT_SPECIALIZATION_SPEC),
};

static DILEMMA_SUCCESS_BY_LAW: ReportDefinition = ReportDefinition {
    id: ReportId::DilemmaSuccessByLaw,
    source: SCENARIOS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("law", Attr::ScenarioLaw),
            GroupKey::shown("law_name", Attr::ScenarioLawLabel(LawVocabulary::Short)),
        ],
        &OUTCOME_BREAKDOWN,
        &[DerivedMetric::success_rate("success_percent")],
        SortRule::LawPriority,
    )),
};

static VULNERABILITY_IMPACT: ReportDefinition = ReportDefinition {
    id: ReportId::VulnerabilityImpact,
    source: HUMANS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("vulnerability", Attr::HumanVulnerability)],
        &OUTCOME_BREAKDOWN,
        &SUCCESS_RATE,
        SortRule::VulnerabilityRank,
    )),
};

static SECTOR_ETHICAL_ANALYSIS: ReportDefinition = ReportDefinition {
    id: ReportId::SectorEthicalAnalysis,
    source: HUMANS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("sector", Attr::HumanLocation)],
        &[
            Measure::distinct("distinct_scenarios", Attr::ScenarioId),
            Measure::actions("total_actions"),
            Measure::outcome("success", Outcome::Success),
            Measure::outcome("mitigated", Outcome::Mitigated),
            Measure::outcome("failure", Outcome::Failure),
        ],
        &SUCCESS_RATE,
        SortRule::Descending("success_rate"),
    )),
};

static LAW_CONFLICT_ANALYSIS: ReportDefinition = ReportDefinition {
    id: ReportId::LawConflictAnalysis,
    source: SCENARIOS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::hidden(Attr::ScenarioLaw),
            GroupKey::shown(
                "principal_law",
                Attr::ScenarioLawLabel(LawVocabulary::Principal),
            ),
        ],
        &[
            Measure::distinct("dilemmas_identified", Attr::ScenarioId),
            Measure::actions("linked_actions"),
        ],
        &[DerivedMetric::success_rate("resolution_rate")],
        SortRule::LawPriority,
    )),
};

static ROBOT_ETHICAL_MATURITY: ReportDefinition = ReportDefinition {
    id: ReportId::RobotEthicalMaturity,
    source: SourceJoin {
        driver: Entity::Robot,
        joins: &[Join::left(Entity::Action), Join::left(Entity::Scenario)],
    },
    shape: Shape::Grouped(GroupedSpec {
        keys: &[
            GroupKey::hidden(Attr::RobotId),
            GroupKey::shown("robot_name", Attr::RobotName),
            GroupKey::shown("model", Attr::RobotModel),
        ],
        measures: &[
            Measure::distinct("scenarios_handled", Attr::ScenarioId),
            Measure::distinct("laws_handled", Attr::ScenarioLaw),
        ],
        derived: &SUCCESS_RATE,
        sort: SortRule::Descending("success_rate"),
        having: Some(Having::HasActions),
        limit: Some(10),
    }),
};

static TIME_EXECUTION_PATTERNS: ReportDefinition = ReportDefinition {
    id: ReportId::TimeExecutionPatterns,
    source: SCENARIOS_WITH_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[
            GroupKey::shown("law", Attr::ScenarioLaw),
            GroupKey::shown(
                "decision_category",
                Attr::ScenarioLawLabel(LawVocabulary::Decision),
            ),
        ],
        &[Measure::actions("decisions")],
        &[],
        SortRule::LawPriority,
    )),
};

static ACTION_KINDS: ReportDefinition = ReportDefinition {
    id: ReportId::ActionKinds,
    source: ACTIONS_ONLY,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("kind", Attr::ActionKind)],
        &[Measure::rows("count")],
        &[],
        SortRule::GroupKeys,
    )),
};

static PERFORMANCE_BY_DIFFICULTY: ReportDefinition = ReportDefinition {
    id: ReportId::PerformanceByDifficulty,
    source: SCENARIOS_LEFT_ACTIONS,
    shape: Shape::Grouped(grouped(
        &[GroupKey::shown("difficulty", Attr::ScenarioDifficulty)],
        &OUTCOME_BREAKDOWN,
        &SUCCESS_RATE,
        SortRule::GroupKeys,
    )),
};
