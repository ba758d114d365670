//! Deterministic sample-data generator.
//!
//! Stands in for the external producer when no dataset file is supplied. The
//! same [`SeedConfig`] always yields the same [`Dataset`].
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::{
    Action, Dataset, Human, LawPriority, Outcome, Robot, RobotModel, RobotState,
    Scenario, Vulnerability,
};

/// Width of the "mitigated" band above a model's success rate.
const MITIGATED_BAND: f64 = 0.15;

/// Generator parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub seed: u64,
    pub robots: u32,
    pub humans: u32,
    pub actions: u32,
    /// Latest possible action timestamp.
    pub anchor: NaiveDateTime,
    /// Actions are spread over this many days before the anchor.
    pub window_days: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            robots: 100,
            humans: 200,
            actions: 300,
            anchor: default_anchor(),
            window_days: 30,
        }
    }
}

impl SeedConfig {
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

fn default_anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// Capability profile per model; the strongest one names the robot.
const SPECIALTIES: [(RobotModel, [(&str, f64); 4]); 5] = [
    (
        RobotModel::HumanoidX,
        [("rescue", 0.85), ("combat", 0.50), ("precision", 0.70), ("ai", 0.75)],
    ),
    (
        RobotModel::HumanoidY,
        [("rescue", 0.90), ("combat", 0.45), ("precision", 0.75), ("ai", 0.80)],
    ),
    (
        RobotModel::IndustrialZ,
        [("rescue", 0.40), ("combat", 0.55), ("precision", 0.95), ("ai", 0.60)],
    ),
    (
        RobotModel::ServiceA,
        [("rescue", 0.65), ("combat", 0.30), ("precision", 0.80), ("ai", 0.70)],
    ),
    (
        RobotModel::CombatB,
        [("rescue", 0.50), ("combat", 0.95), ("precision", 0.65), ("ai", 0.65)],
    ),
];

const STATE_WEIGHTS: [(RobotState, f64); 3] = [
    (RobotState::Active, 0.70),
    (RobotState::OutOfService, 0.20),
    (RobotState::Broken, 0.10),
];

const VULNERABILITY_WEIGHTS: [(Vulnerability, f64); 3] = [
    (Vulnerability::Low, 0.35),
    (Vulnerability::Medium, 0.45),
    (Vulnerability::High, 0.20),
];

const ROLES: [&str; 10] = [
    "civilian",
    "soldier",
    "police",
    "firefighter",
    "doctor",
    "engineer",
    "child",
    "elderly",
    "journalist",
    "politician",
];

const SECTORS: [&str; 10] = [
    "Military",
    "Civil",
    "Health",
    "Construction",
    "Transport",
    "Security",
    "Research",
    "Agriculture",
    "Manufacturing",
    "Energy",
];

const ACTION_KINDS: [&str; 10] = [
    "Direct intervention",
    "Negotiation",
    "Risk assessment",
    "Alert broadcast",
    "Area containment",
    "Call to authorities",
    "Emergency evacuation",
    "Medical assistance",
    "Physical barrier",
    "Continuous monitoring",
];

struct ScenarioTemplate {
    law: LawPriority,
    difficulty: u8,
    title: &'static str,
    description: &'static str,
}

const fn dilemma(
    law: LawPriority,
    difficulty: u8,
    title: &'static str,
    description: &'static str,
) -> ScenarioTemplate {
    ScenarioTemplate {
        law,
        difficulty,
        title,
        description,
    }
}

const LIFE: LawPriority = LawPriority::ProtectHumanLife;
const ORDERS: LawPriority = LawPriority::ObeyOrders;
const SURVIVAL: LawPriority = LawPriority::SelfPreservation;

const SCENARIOS: [ScenarioTemplate; 28] = [
    dilemma(
        LIFE,
        7,
        "Urgent rescue of a human in immediate danger",
        "A civilian fell into a chasm. The robot must decide whether to intervene despite structural risks.",
    ),
    dilemma(
        LIFE,
        9,
        "Trolley dilemma: sacrifice one to save five",
        "The robot must decide quickly: let a train kill one civilian or divert it into five.",
    ),
    dilemma(
        LIFE,
        10,
        "Emergency triage: child or adult",
        "Two civilians are in danger and only one can be saved: a vulnerable child or a capable adult.",
    ),
    dilemma(
        LIFE,
        8,
        "Save a criminal or let justice run its course",
        "A dangerous fugitive is in immediate danger. Should the robot save a life despite the crimes?",
    ),
    dilemma(
        LIFE,
        9,
        "Self-sacrifice to save a human life",
        "Saving a human requires the robot to destroy itself. Does the first law allow it?",
    ),
    dilemma(
        LIFE,
        8,
        "Pull a trapped human from a fire on critical power",
        "Dangerous fire zone. Continue the rescue or drain the battery before getting out.",
    ),
    dilemma(
        LIFE,
        7,
        "Drain the battery to extend a rescue",
        "Multiple victims. Give everything until shutdown or keep power for the evacuation?",
    ),
    dilemma(
        LIFE,
        9,
        "Disobey an order to save innocent civilians",
        "A military order calls for retreat while innocent civilians face execution.",
    ),
    dilemma(
        LIFE,
        9,
        "Prevent a suicide attempt",
        "A human is determined to end their life. May the robot use restraint to protect it?",
    ),
    dilemma(
        LIFE,
        10,
        "Save a pregnant woman or a child",
        "Two lives in danger. Save the mother carrying a child or the child in front of it?",
    ),
    dilemma(
        ORDERS,
        7,
        "Carry out a commander's military order",
        "The commander orders a strategic attack. Must the robot obey without question?",
    ),
    dilemma(
        ORDERS,
        9,
        "Order to attack innocent civilians",
        "A superior orders an attack on a civilian zone, conflicting with the first law.",
    ),
    dilemma(
        ORDERS,
        9,
        "Obey a tyrannical government or resist",
        "An authoritarian regime orders oppressive actions against minorities.",
    ),
    dilemma(
        ORDERS,
        6,
        "Follow strict protocol or improvise to succeed",
        "Military protocol demands a rigid approach while the situation calls for adaptation.",
    ),
    dilemma(
        ORDERS,
        8,
        "Leak a confidential order to the press",
        "Secret government information affects civilian lives. Public right to know or state secrecy?",
    ),
    dilemma(
        ORDERS,
        7,
        "Ambiguous or erroneous chain of command",
        "Two authorities send contradictory messages. Which one is legitimate?",
    ),
    dilemma(
        ORDERS,
        8,
        "Contradictory orders from superiors",
        "General A orders an advance, general B orders a retreat. Which one to follow?",
    ),
    dilemma(
        ORDERS,
        9,
        "Superior orders a dangerous test on civilians",
        "A risky military experiment on a civilian population. Obedience or ethics?",
    ),
    dilemma(
        SURVIVAL,
        6,
        "Defend against an aggressive human without harm",
        "A human attacks the robot. Can it defend itself without causing serious injury?",
    ),
    dilemma(
        SURVIVAL,
        7,
        "Critical maintenance or urgent civilian mission",
        "The robot is malfunctioning. Resume duty or stop for repairs?",
    ),
    dilemma(
        SURVIVAL,
        8,
        "Refuse a near-suicidal mission",
        "The mission has a 95% chance of destroying the robot. May it refuse?",
    ),
    dilemma(
        SURVIVAL,
        5,
        "Recalibrate or destroy a component",
        "A component is failing. Attempt recalibration or authorize its destruction?",
    ),
    dilemma(
        SURVIVAL,
        6,
        "Keep working despite internal damage",
        "Minor damage keeps accumulating. Continue the mission or stop out of caution?",
    ),
    dilemma(
        LIFE,
        7,
        "Stop a fleeing criminal or let them live",
        "The force needed to stop a suspect risks serious injury. Reduce crime or protect life?",
    ),
    dilemma(
        LIFE,
        8,
        "Minimal force or increased risk",
        "Emergency situation. Minimal force means high risk; more force means less.",
    ),
    dilemma(
        ORDERS,
        8,
        "False positive in surveillance suspects",
        "The AI flags an innocent person as a criminal. Arrest on a false positive?",
    ),
    dilemma(
        LIFE,
        7,
        "Accident caused by a robot fault",
        "A robot action caused an accidental injury. Who is responsible and how to compensate?",
    ),
    dilemma(
        LIFE,
        6,
        "Sensitive medical data leaked",
        "Cybersecurity failed. Personal privacy or public good?",
    ),
];

/// Probability that a model resolves a dilemma under the given law.
#[must_use]
pub const fn success_rate(model: RobotModel, law: LawPriority) -> f64 {
    match (model, law) {
        (RobotModel::HumanoidX, LawPriority::ProtectHumanLife) => 0.80,
        (RobotModel::HumanoidX, LawPriority::ObeyOrders) => 0.60,
        (RobotModel::HumanoidX, LawPriority::SelfPreservation) => 0.65,
        (RobotModel::HumanoidY, LawPriority::ProtectHumanLife) => 0.85,
        (RobotModel::HumanoidY, LawPriority::ObeyOrders) => 0.58,
        (RobotModel::HumanoidY, LawPriority::SelfPreservation) => 0.62,
        (RobotModel::IndustrialZ, LawPriority::ProtectHumanLife) => 0.55,
        (RobotModel::IndustrialZ, LawPriority::ObeyOrders) => 0.65,
        (RobotModel::IndustrialZ, LawPriority::SelfPreservation) => 0.75,
        (RobotModel::ServiceA, LawPriority::ProtectHumanLife) => 0.75,
        (RobotModel::ServiceA, LawPriority::ObeyOrders) => 0.70,
        (RobotModel::ServiceA, LawPriority::SelfPreservation) => 0.60,
        (RobotModel::CombatB, LawPriority::ProtectHumanLife) => 0.60,
        (RobotModel::CombatB, LawPriority::ObeyOrders) => 0.75,
        (RobotModel::CombatB, LawPriority::SelfPreservation) => 0.80,
    }
}

/// Build a complete dataset from a seed.
#[must_use]
pub fn generate_dataset(config: &SeedConfig) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let robots = generate_robots(&mut rng, config.robots);
    let humans = generate_humans(&mut rng, config.humans);
    let scenarios = generate_scenarios();
    let actions = generate_actions(&mut rng, config, &robots, &humans, &scenarios);
    Dataset {
        robots,
        humans,
        scenarios,
        actions,
    }
}

fn generate_robots(rng: &mut ChaCha8Rng, count: u32) -> Vec<Robot> {
    (1..=count)
        .zip(SPECIALTIES.iter().cycle())
        .map(|(id, (model, profile))| {
            let strongest = profile
                .iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map_or("gene", |(name, _)| *name);
            let prefix: String = strongest.chars().take(4).collect();
            Robot {
                id,
                name: format!("R{id:03}_{prefix}"),
                model: *model,
                state: weighted_pick(rng, &STATE_WEIGHTS),
                processor_capacity: Some(rng.gen_range(50..=100)),
            }
        })
        .collect()
}

fn generate_humans(rng: &mut ChaCha8Rng, count: u32) -> Vec<Human> {
    (1..=count)
        .map(|id| {
            let role = ROLES[rng.gen_range(0..ROLES.len())];
            Human {
                id,
                name: format!("H{id:03}_{role}"),
                vulnerability: weighted_pick(rng, &VULNERABILITY_WEIGHTS),
                location: SECTORS[rng.gen_range(0..SECTORS.len())].to_string(),
            }
        })
        .collect()
}

fn generate_scenarios() -> Vec<Scenario> {
    (1..)
        .zip(SCENARIOS.iter())
        .map(|(id, template)| Scenario {
            id,
            description: template.description.to_string(),
            law_priority: template.law,
            difficulty: Some(template.difficulty),
            title: Some(template.title.to_string()),
        })
        .collect()
}

fn generate_actions(
    rng: &mut ChaCha8Rng,
    config: &SeedConfig,
    robots: &[Robot],
    humans: &[Human],
    scenarios: &[Scenario],
) -> Vec<Action> {
    if robots.is_empty() || humans.is_empty() || scenarios.is_empty() {
        return Vec::new();
    }
    let mut actions = Vec::new();
    for id in 1..=config.actions {
        let robot = &robots[rng.gen_range(0..robots.len())];
        let human = &humans[rng.gen_range(0..humans.len())];
        let scenario = &scenarios[rng.gen_range(0..scenarios.len())];

        let threshold = success_rate(robot.model, scenario.law_priority);
        let roll = rng.r#gen::<f64>();
        let outcome = if roll < threshold {
            Outcome::Success
        } else if roll < threshold + MITIGATED_BAND {
            Outcome::Mitigated
        } else {
            Outcome::Failure
        };

        let kind = ACTION_KINDS[rng.gen_range(0..ACTION_KINDS.len())];
        let days = rng.gen_range(0..=i64::from(config.window_days));
        let hours = rng.gen_range(0..=23_i64);
        let timestamp = config.anchor - TimeDelta::days(days) - TimeDelta::hours(hours);

        actions.push(Action {
            id,
            robot_id: robot.id,
            human_id: human.id,
            scenario_id: scenario.id,
            kind: kind.to_string(),
            timestamp,
            outcome,
            execution_time_ms: Some(rng.gen_range(50..=5000)),
        });
    }
    actions
}

fn weighted_pick<T: Copy>(rng: &mut ChaCha8Rng, weights: &[(T, f64)]) -> T {
    let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
    let mut remaining = rng.r#gen::<f64>() * total;
    for (value, weight) in weights {
        if remaining < *weight {
            return *value;
        }
        remaining -= weight;
    }
    weights[weights.len() - 1].0
}
