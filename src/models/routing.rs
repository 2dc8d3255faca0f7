//! Declarative branch-decision table for walking the route graph.
//!
//! Each station with a branch decision maps to a small rule tree whose leaves
//! say which outgoing link to follow. Rule conditions only look at a
//! [`WalkContext`], which is built once per train before the walk starts, so
//! the rules are plain data that can be loaded, tested and extended without
//! touching the walk itself.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::route_graph::{LinkKind, Station};
use super::Direction;
use crate::constants::LOOP_CLOSE_STATION;

/// Which link to follow out of the current station, and optionally which
/// station to land on instead of the link's own target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub link: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl Hop {
    #[must_use]
    pub const fn main() -> Self {
        Self { link: LinkKind::Main, to: None }
    }

    #[must_use]
    pub const fn branch() -> Self {
        Self { link: LinkKind::Branch, to: None }
    }

    #[must_use]
    pub const fn loop_line() -> Self {
        Self { link: LinkKind::Loop, to: None }
    }

    #[must_use]
    pub fn main_to(station: impl Into<String>) -> Self {
        Self { link: LinkKind::Main, to: Some(station.into()) }
    }

    #[must_use]
    pub fn branch_to(station: impl Into<String>) -> Self {
        Self { link: LinkKind::Branch, to: Some(station.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RoutingRule {
    /// Unconditional successor
    Follow(Hop),
    /// Successor depends on a branch flag raised for this train
    IfFlag {
        flag: String,
        then: Box<RoutingRule>,
        otherwise: Box<RoutingRule>,
    },
    /// Successor depends on the train's end station
    IfEndsAt {
        stations: Vec<String>,
        then: Box<RoutingRule>,
        otherwise: Box<RoutingRule>,
    },
    /// Successor depends on the train's sub-area code
    IfSubArea {
        codes: Vec<String>,
        then: Box<RoutingRule>,
        otherwise: Box<RoutingRule>,
    },
    /// No successor is defined
    Unroutable,
}

impl Default for RoutingRule {
    fn default() -> Self {
        Self::Follow(Hop::main())
    }
}

static FOLLOW_MAIN: RoutingRule = RoutingRule::Follow(Hop::main());
static FOLLOW_LOOP: RoutingRule = RoutingRule::Follow(Hop::loop_line());

impl RoutingRule {
    #[must_use]
    pub fn follow(hop: Hop) -> Self {
        Self::Follow(hop)
    }

    #[must_use]
    pub fn if_flag(flag: &str, then: Self, otherwise: Self) -> Self {
        Self::IfFlag {
            flag: flag.to_string(),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    #[must_use]
    pub fn if_ends_at(stations: &[&str], then: Self, otherwise: Self) -> Self {
        Self::IfEndsAt {
            stations: stations.iter().map(ToString::to_string).collect(),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    #[must_use]
    pub fn if_sub_area(codes: &[&str], then: Self, otherwise: Self) -> Self {
        Self::IfSubArea {
            codes: codes.iter().map(ToString::to_string).collect(),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Evaluate the rule tree; `None` means no successor is defined
    #[must_use]
    pub fn decide(&self, ctx: &WalkContext<'_>) -> Option<&Hop> {
        let mut rule = self;
        loop {
            rule = match rule {
                Self::Follow(hop) => return Some(hop),
                Self::Unroutable => return None,
                Self::IfFlag { flag, then, otherwise } => {
                    if ctx.flags.is_raised(flag) { then.as_ref() } else { otherwise.as_ref() }
                }
                Self::IfEndsAt { stations, then, otherwise } => {
                    if stations.iter().any(|s| s == ctx.end_station) { then.as_ref() } else { otherwise.as_ref() }
                }
                Self::IfSubArea { codes, then, otherwise } => {
                    if codes.iter().any(|c| c == ctx.sub_area) { then.as_ref() } else { otherwise.as_ref() }
                }
            };
        }
    }
}

/// Condition that raises a branch flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum FlagTrigger {
    /// The train declares this sub-area code
    SubArea { code: String },
    /// The timetable touches at least one of these stations
    AnyStation { stations: Vec<String> },
    /// The timetable touches every one of these stations
    AllStations { stations: Vec<String> },
}

impl FlagTrigger {
    fn fires(&self, sub_area: &str, touched: &HashSet<&str>) -> bool {
        match self {
            Self::SubArea { code } => code == sub_area,
            Self::AnyStation { stations } => stations.iter().any(|s| touched.contains(s.as_str())),
            Self::AllStations { stations } => {
                !stations.is_empty() && stations.iter().all(|s| touched.contains(s.as_str()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    pub name: String,
    /// The flag is raised when any trigger fires
    pub raised_by: Vec<FlagTrigger>,
}

/// Branch flags raised for one train
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchFlags {
    raised: HashSet<String>,
}

impl BranchFlags {
    #[must_use]
    pub fn is_raised(&self, flag: &str) -> bool {
        self.raised.contains(flag)
    }

    #[must_use]
    pub fn raised(&self) -> impl Iterator<Item = &str> {
        self.raised.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for BranchFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            raised: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything a routing rule may look at, fixed before the walk begins
#[derive(Debug, Clone)]
pub struct WalkContext<'a> {
    pub flags: BranchFlags,
    pub sub_area: &'a str,
    /// Station the walk must reach (the origin for round trips)
    pub end_station: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingTable {
    #[serde(default)]
    pub flags: Vec<FlagDefinition>,
    /// While this flag is raised, every hop follows the loop links
    #[serde(default)]
    pub loop_flag: Option<String>,
    /// Timetable end station meaning "returns to its origin"
    #[serde(default)]
    pub loop_close_station: Option<String>,
    #[serde(default)]
    pub clockwise: HashMap<String, RoutingRule>,
    #[serde(default)]
    pub counterclockwise: HashMap<String, RoutingRule>,
    /// Rule for stations with a branch link but no rule of their own
    #[serde(default)]
    pub branch_default: RoutingRule,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self {
            flags: Vec::new(),
            loop_flag: None,
            loop_close_station: Some(LOOP_CLOSE_STATION.to_string()),
            clockwise: HashMap::new(),
            counterclockwise: HashMap::new(),
            branch_default: RoutingRule::default(),
        }
    }
}

impl RoutingTable {
    #[must_use]
    pub fn rules(&self, direction: Direction) -> &HashMap<String, RoutingRule> {
        match direction {
            Direction::Clockwise => &self.clockwise,
            Direction::Counterclockwise => &self.counterclockwise,
        }
    }

    #[must_use]
    pub fn with_rule(mut self, direction: Direction, station: &str, rule: RoutingRule) -> Self {
        let rules = match direction {
            Direction::Clockwise => &mut self.clockwise,
            Direction::Counterclockwise => &mut self.counterclockwise,
        };
        rules.insert(station.to_string(), rule);
        self
    }

    #[must_use]
    pub fn with_flag(mut self, name: &str, raised_by: Vec<FlagTrigger>) -> Self {
        self.flags.push(FlagDefinition {
            name: name.to_string(),
            raised_by,
        });
        self
    }

    #[must_use]
    pub fn is_loop_close(&self, station: &str) -> bool {
        self.loop_close_station.as_deref() == Some(station)
    }

    /// Raise every flag whose triggers fire for this train
    #[must_use]
    pub fn derive_flags(&self, sub_area: &str, touched: &HashSet<&str>) -> BranchFlags {
        self.flags
            .iter()
            .filter(|def| def.raised_by.iter().any(|t| t.fires(sub_area, touched)))
            .map(|def| def.name.clone())
            .collect()
    }

    /// Pick the rule governing the hop out of `station`
    #[must_use]
    pub fn rule_for(&self, station: &Station, direction: Direction, flags: &BranchFlags) -> &RoutingRule {
        if self.loop_flag.as_deref().is_some_and(|f| flags.is_raised(f)) {
            return &FOLLOW_LOOP;
        }
        if !station.has_branch(direction) {
            return &FOLLOW_MAIN;
        }
        self.rules(direction)
            .get(&station.id)
            .unwrap_or(&self.branch_default)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a routing table.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Branch decisions of the Taiwan Railway network
    #[must_use]
    pub fn taiwan_railway() -> Self {
        use RoutingRule as R;

        let main = || R::follow(Hop::main());
        let branch_to = |s: &str| R::follow(Hop::branch_to(s));
        let main_to = |s: &str| R::follow(Hop::main_to(s));
        let any = |stations: &[&str]| FlagTrigger::AnyStation {
            stations: stations.iter().map(ToString::to_string).collect(),
        };

        let mut table = Self {
            loop_flag: Some("cheng_zhui".to_string()),
            // Mountain and central lines keep the main link, the coast line
            // takes the branch link
            branch_default: R::if_sub_area(
                &["0", "1"],
                main(),
                R::if_sub_area(&["2"], R::follow(Hop::branch()), R::Unroutable),
            ),
            ..Self::default()
        };

        table = table
            .with_flag(
                "cheng_zhui",
                vec![
                    FlagTrigger::SubArea { code: "3".to_string() },
                    FlagTrigger::AllStations {
                        stations: vec!["2260".to_string(), "3350".to_string()],
                    },
                ],
            )
            .with_flag("neiwan", vec![any(&["1194", "1203"])])
            .with_flag("pingxi", vec![any(&["7332"])])
            .with_flag("jiji", vec![any(&["3432", "3431"])])
            .with_flag("shalun", vec![any(&["4272"])]);

        table
            .with_rule(
                Direction::Counterclockwise,
                "7360",
                R::if_ends_at(&["7362"], branch_to("7361"), main()),
            )
            .with_rule(
                Direction::Counterclockwise,
                "3430",
                R::if_flag("jiji", branch_to("3431"), main()),
            )
            .with_rule(
                Direction::Counterclockwise,
                "4270",
                R::if_flag("shalun", branch_to("4271"), main()),
            )
            .with_rule(
                Direction::Clockwise,
                "0920",
                R::if_ends_at(&["0900"], main(), R::follow(Hop::branch())),
            )
            .with_rule(
                Direction::Clockwise,
                "7130",
                R::if_ends_at(&["7120"], branch_to("7120"), main_to("7110")),
            )
            .with_rule(
                Direction::Clockwise,
                "1190",
                R::if_flag("neiwan", branch_to("1191"), main_to("1180")),
            )
            .with_rule(
                Direction::Clockwise,
                "1193",
                R::if_flag(
                    "neiwan",
                    R::if_ends_at(
                        &["1208", "1203"],
                        branch_to("1201"),
                        R::if_ends_at(&["1194"], branch_to("1194"), R::Unroutable),
                    ),
                    main_to("1180"),
                ),
            )
            .with_rule(
                Direction::Clockwise,
                "7330",
                R::if_flag("pingxi", branch_to("7331"), main_to("7320")),
            )
    }
}
