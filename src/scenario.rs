use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::Position;
use crate::error::{Actor, Error, Result};
use crate::map::Map;

/// Explicit coordinates for every actor on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placements {
    pub agent: Position,
    pub secondary_hazard: Position,
    pub primary_hazard: Position,
    pub obstacle: Position,
    pub goal: Position,
    pub waypoint: Position,
}

impl Placements {
    /// Order of the coordinate pairs in a text scenario.
    pub const TEXT_ORDER: [Actor; 6] = [
        Actor::Agent,
        Actor::SecondaryHazard,
        Actor::PrimaryHazard,
        Actor::Obstacle,
        Actor::Goal,
        Actor::Waypoint,
    ];

    pub fn position_of(&self, actor: Actor) -> Position {
        match actor {
            Actor::Agent => self.agent,
            Actor::PrimaryHazard => self.primary_hazard,
            Actor::SecondaryHazard => self.secondary_hazard,
            Actor::Obstacle => self.obstacle,
            Actor::Waypoint => self.waypoint,
            Actor::Goal => self.goal,
        }
    }

    fn from_text_order(positions: [Position; 6]) -> Self {
        let [agent, secondary_hazard, primary_hazard, obstacle, goal, waypoint] = positions;
        Placements {
            agent,
            secondary_hazard,
            primary_hazard,
            obstacle,
            goal,
            waypoint,
        }
    }
}

/// How far the agent can see. Carried through to reports; the search does not use it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PerceptionScenario {
    #[default]
    Near,
    Far,
}

impl TryFrom<u8> for PerceptionScenario {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(PerceptionScenario::Near),
            2 => Ok(PerceptionScenario::Far),
            other => Err(format!("perception scenario must be 1 or 2, got {other}")),
        }
    }
}

impl From<PerceptionScenario> for u8 {
    fn from(scenario: PerceptionScenario) -> Self {
        match scenario {
            PerceptionScenario::Near => 1,
            PerceptionScenario::Far => 2,
        }
    }
}

impl fmt::Display for PerceptionScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub placements: Placements,
    #[serde(default)]
    pub perception: PerceptionScenario,
}

impl Scenario {
    pub fn from_map(map: &Map, perception: PerceptionScenario) -> Self {
        Scenario {
            placements: map.placements(),
            perception,
        }
    }

    /// Parses the two-line text format:
    /// `[x,y] [x,y] [x,y] [x,y] [x,y] [x,y]` followed by the perception scenario.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());

        let (_, coordinates) = lines
            .next()
            .ok_or_else(|| malformed(1, "missing coordinates line"))?;
        let tokens: Vec<&str> = coordinates.split_whitespace().collect();
        if tokens.len() != Placements::TEXT_ORDER.len() {
            return Err(malformed(
                1,
                format!(
                    "expected {} coordinate pairs, found {}",
                    Placements::TEXT_ORDER.len(),
                    tokens.len()
                ),
            ));
        }
        let mut positions = [(0, 0); 6];
        for (slot, token) in positions.iter_mut().zip(&tokens) {
            *slot = parse_position(token).ok_or_else(|| {
                malformed(1, format!("wrong coordinate {token:?}, expected [x,y]"))
            })?;
        }

        let (index, perception) = lines
            .next()
            .ok_or_else(|| malformed(2, "missing perception scenario"))?;
        let perception = perception
            .trim()
            .parse::<u8>()
            .map_err(|err| err.to_string())
            .and_then(PerceptionScenario::try_from)
            .map_err(|message| malformed(index + 1, message))?;

        if let Some((index, _)) = lines.next() {
            return Err(malformed(index + 1, "file contains more than 2 lines"));
        }

        Ok(Scenario {
            placements: Placements::from_text_order(positions),
            perception,
        })
    }

    /// Loads YAML for `.yaml`/`.yml` files and the text format otherwise.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

        let scenario = if is_yaml {
            let reader = BufReader::new(File::open(path)?);
            serde_yaml::from_reader(reader)?
        } else {
            Self::parse(&std::fs::read_to_string(path)?)?
        };

        info!("Load scenario from {}: {scenario:?}", path.display());
        Ok(scenario)
    }

    pub fn write_to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(self)?;
        writer.write_all(yaml_data.as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    pub fn build_map(&self, rows: usize, columns: usize) -> Result<Map> {
        Map::from_placements(rows, columns, &self.placements)
    }

    /// Inverse of [`Scenario::parse`].
    pub fn to_text(&self) -> String {
        let coordinates: Vec<String> = Placements::TEXT_ORDER
            .iter()
            .map(|&actor| {
                let (x, y) = self.placements.position_of(actor);
                format!("[{x},{y}]")
            })
            .collect();
        format!("{}\n{}\n", coordinates.join(" "), self.perception)
    }
}

fn parse_position(token: &str) -> Option<Position> {
    let inner = token.strip_prefix('[')?.strip_suffix(']')?;
    let (x, y) = inner.split_once(',')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

fn malformed(line: usize, message: impl Into<String>) -> Error {
    Error::MalformedScenario {
        line,
        message: message.into(),
    }
}
