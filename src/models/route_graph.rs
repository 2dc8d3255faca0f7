use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{lenient, Direction};
use crate::error::DataError;

/// Directed hop from one station to the next, with its distance delta in km
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub next: String,
    pub distance: f64,
}

impl Link {
    #[must_use]
    pub fn new(next: impl Into<String>, distance: f64) -> Self {
        Self { next: next.into(), distance }
    }
}

/// Which of a station's outgoing links a hop follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Main,
    Branch,
    Loop,
}

impl LinkKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Branch => "branch",
            Self::Loop => "loop",
        }
    }
}

/// Outgoing links of a station for one travel direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationLinks {
    pub main: Option<Link>,
    pub branch: Option<Link>,
    /// Link used while the train runs over the loop connection
    pub loop_line: Option<Link>,
}

impl StationLinks {
    #[must_use]
    pub fn get(&self, kind: LinkKind) -> Option<&Link> {
        match kind {
            LinkKind::Main => self.main.as_ref(),
            LinkKind::Branch => self.branch.as_ref(),
            LinkKind::Loop => self.loop_line.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    /// Kilometer post along the station's canonical line
    pub km_post: f64,
    pub clockwise: StationLinks,
    pub counterclockwise: StationLinks,
}

impl Station {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, km_post: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            km_post,
            clockwise: StationLinks::default(),
            counterclockwise: StationLinks::default(),
        }
    }

    #[must_use]
    pub fn links(&self, direction: Direction) -> &StationLinks {
        match direction {
            Direction::Clockwise => &self.clockwise,
            Direction::Counterclockwise => &self.counterclockwise,
        }
    }

    pub fn links_mut(&mut self, direction: Direction) -> &mut StationLinks {
        match direction {
            Direction::Clockwise => &mut self.clockwise,
            Direction::Counterclockwise => &mut self.counterclockwise,
        }
    }

    #[must_use]
    pub fn link(&self, direction: Direction, kind: LinkKind) -> Option<&Link> {
        self.links(direction).get(kind)
    }

    /// Whether the station offers a branch decision in this direction
    #[must_use]
    pub fn has_branch(&self, direction: Direction) -> bool {
        self.links(direction).branch.is_some()
    }

    /// Builder helper used when assembling graphs in code
    #[must_use]
    pub fn with_link(mut self, direction: Direction, kind: LinkKind, link: Link) -> Self {
        let links = self.links_mut(direction);
        match kind {
            LinkKind::Main => links.main = Some(link),
            LinkKind::Branch => links.branch = Some(link),
            LinkKind::Loop => links.loop_line = Some(link),
        }
        self
    }
}

/// Static station topology, shared read-only by every resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteGraph {
    stations: HashMap<String, Station>,
}

impl RouteGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_stations(stations: impl IntoIterator<Item = Station>) -> Self {
        Self {
            stations: stations.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn insert(&mut self, station: Station) {
        self.stations.insert(station.id.clone(), station);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Parse the route reference file: an object keyed by station id
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, or a station names a
    /// successor without a distance for it.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let records: HashMap<String, RouteRecord> = serde_json::from_str(json)?;
        let mut graph = Self::new();
        for (id, record) in records {
            graph.insert(record.into_station(id)?);
        }
        Ok(graph)
    }
}

#[derive(Deserialize)]
struct RouteRecord {
    #[serde(rename = "DSC", default)]
    name: String,
    #[serde(rename = "KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    km: Option<f64>,
    #[serde(rename = "CW", default, deserialize_with = "lenient::optional_code::deserialize")]
    cw: Option<String>,
    #[serde(rename = "CW_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    cw_km: Option<f64>,
    #[serde(rename = "CCW", default, deserialize_with = "lenient::optional_code::deserialize")]
    ccw: Option<String>,
    #[serde(rename = "CCW_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    ccw_km: Option<f64>,
    #[serde(rename = "CW_BRANCH", default, deserialize_with = "lenient::optional_code::deserialize")]
    cw_branch: Option<String>,
    #[serde(rename = "CW_BRANCH_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    cw_branch_km: Option<f64>,
    #[serde(rename = "CCW_BRANCH", default, deserialize_with = "lenient::optional_code::deserialize")]
    ccw_branch: Option<String>,
    #[serde(rename = "CCW_BRANCH_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    ccw_branch_km: Option<f64>,
    #[serde(rename = "CHENG_ZHUI_CW", default, deserialize_with = "lenient::optional_code::deserialize")]
    loop_cw: Option<String>,
    #[serde(rename = "CHENG_ZHUI_CW_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    loop_cw_km: Option<f64>,
    #[serde(rename = "CHENG_ZHUI_CCW", default, deserialize_with = "lenient::optional_code::deserialize")]
    loop_ccw: Option<String>,
    #[serde(rename = "CHENG_ZHUI_CCW_KM", default, deserialize_with = "lenient::optional_float::deserialize")]
    loop_ccw_km: Option<f64>,
}

impl RouteRecord {
    fn into_station(self, id: String) -> Result<Station, DataError> {
        let clockwise = StationLinks {
            main: make_link(&id, "CW_KM", self.cw, self.cw_km)?,
            branch: make_link(&id, "CW_BRANCH_KM", self.cw_branch, self.cw_branch_km)?,
            loop_line: make_link(&id, "CHENG_ZHUI_CW_KM", self.loop_cw, self.loop_cw_km)?,
        };
        let counterclockwise = StationLinks {
            main: make_link(&id, "CCW_KM", self.ccw, self.ccw_km)?,
            branch: make_link(&id, "CCW_BRANCH_KM", self.ccw_branch, self.ccw_branch_km)?,
            loop_line: make_link(&id, "CHENG_ZHUI_CCW_KM", self.loop_ccw, self.loop_ccw_km)?,
        };

        Ok(Station {
            id,
            name: self.name,
            km_post: self.km.unwrap_or_default(),
            clockwise,
            counterclockwise,
        })
    }
}

fn make_link(
    station: &str,
    field: &'static str,
    next: Option<String>,
    distance: Option<f64>,
) -> Result<Option<Link>, DataError> {
    let Some(next) = next else {
        return Ok(None);
    };
    let Some(distance) = distance.filter(|d| d.is_finite()) else {
        return Err(DataError::InvalidField {
            station: station.to_string(),
            field,
            value: String::new(),
        });
    };
    Ok(Some(Link { next, distance }))
}
