use std::fmt;

use rand::Rng;
use tracing::{debug, trace};

use crate::common::{Offset, Position, AXIS_MOVES, MOVES};
use crate::error::{Actor, Error, PlacementIssue, Result};
use crate::scenario::Placements;

/// Perception footprint of the neutralizable hazard.
pub const PRIMARY_FOOTPRINT: [Offset; 4] = AXIS_MOVES;

/// Perception footprint of the roaming hazard.
pub const SECONDARY_FOOTPRINT: [Offset; 8] = MOVES;

/// Order in which actors are validated and placed. Generation samples in the same order.
pub const PLACEMENT_ORDER: [Actor; 6] = [
    Actor::Agent,
    Actor::PrimaryHazard,
    Actor::SecondaryHazard,
    Actor::Obstacle,
    Actor::Waypoint,
    Actor::Goal,
];

/// Where a generated map puts the agent.
pub const GENERATED_START: Position = (0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Agent,
    PrimaryCore,
    PrimaryCoreWithObstacle,
    PrimaryZone,
    SecondaryCore,
    SecondaryZone,
    Obstacle,
    Waypoint,
    Goal,
}

impl Cell {
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Agent => 'J',
            Cell::PrimaryCore => 'O',
            Cell::PrimaryCoreWithObstacle => 'W',
            Cell::PrimaryZone => 'K',
            Cell::SecondaryCore => 'A',
            Cell::SecondaryZone => 'D',
            Cell::Obstacle => 'R',
            Cell::Waypoint => 'T',
            Cell::Goal => 'C',
        }
    }

    pub fn is_hazard_core(self) -> bool {
        matches!(
            self,
            Cell::PrimaryCore | Cell::PrimaryCoreWithObstacle | Cell::SecondaryCore
        )
    }

    pub fn is_primary_core(self) -> bool {
        matches!(self, Cell::PrimaryCore | Cell::PrimaryCoreWithObstacle)
    }

    pub fn is_perception_zone(self) -> bool {
        matches!(self, Cell::PrimaryZone | Cell::SecondaryZone)
    }

    /// Never enterable, whatever the travel flags.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Cell::Obstacle
                | Cell::PrimaryCoreWithObstacle
                | Cell::SecondaryCore
                | Cell::SecondaryZone
        )
    }

    /// Enterable only once the primary hazard is neutralized.
    pub fn is_neutralizable(self) -> bool {
        matches!(self, Cell::PrimaryCore | Cell::PrimaryZone)
    }

    // Perception zones do not count as occupied.
    fn is_occupied(self) -> bool {
        !matches!(self, Cell::Empty | Cell::PrimaryZone | Cell::SecondaryZone)
    }
}

/// Static board. Built once, read-only for every search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub rows: usize,
    pub columns: usize,
    grid: Vec<Vec<Cell>>,
    pub start: Position,
    pub goal: Position,
    pub waypoint: Position,
    pub primary_hazard: Position,
    pub secondary_hazard: Position,
    pub obstacle: Position,
}

impl Map {
    fn blank(rows: usize, columns: usize) -> Self {
        Map {
            rows,
            columns,
            grid: vec![vec![Cell::Empty; columns]; rows],
            start: GENERATED_START,
            goal: GENERATED_START,
            waypoint: GENERATED_START,
            primary_hazard: GENERATED_START,
            secondary_hazard: GENERATED_START,
            obstacle: GENERATED_START,
        }
    }

    /// Builds a board from explicit coordinates, failing on the first invalid placement.
    pub fn from_placements(rows: usize, columns: usize, placements: &Placements) -> Result<Self> {
        let mut map = Map::blank(rows, columns);
        for actor in PLACEMENT_ORDER {
            let position = placements.position_of(actor);
            if let Some(issue) = map.placement_issue(actor, position) {
                return Err(Error::InvalidPlacement {
                    actor,
                    position,
                    issue,
                });
            }
            map.place(actor, position);
        }

        debug!("built {rows}x{columns} map from {placements:?}");
        Ok(map)
    }

    /// Samples every actor uniformly until its placement is valid. The agent always starts
    /// at the origin.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        columns: usize,
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<Self> {
        let mut map = Map::blank(rows, columns);
        if let Some(issue) = map.placement_issue(Actor::Agent, GENERATED_START) {
            return Err(Error::InvalidPlacement {
                actor: Actor::Agent,
                position: GENERATED_START,
                issue,
            });
        }
        map.place(Actor::Agent, GENERATED_START);

        for actor in PLACEMENT_ORDER.into_iter().skip(1) {
            let position = (0..max_attempts)
                .map(|_| (rng.gen_range(0..rows), rng.gen_range(0..columns)))
                .find(|&position| map.placement_issue(actor, position).is_none())
                .ok_or(Error::GenerationExhausted {
                    actor,
                    attempts: max_attempts,
                })?;
            trace!("sampled {actor} at {position:?}");
            map.place(actor, position);
        }

        debug!("generated {rows}x{columns} map: {:?}", map.placements());
        Ok(map)
    }

    pub fn placements(&self) -> Placements {
        Placements {
            agent: self.start,
            secondary_hazard: self.secondary_hazard,
            primary_hazard: self.primary_hazard,
            obstacle: self.obstacle,
            goal: self.goal,
            waypoint: self.waypoint,
        }
    }

    pub fn classify(&self, position: Position) -> Option<Cell> {
        self.grid.get(position.0)?.get(position.1).copied()
    }

    pub fn shift(&self, position: Position, offset: Offset) -> Option<Position> {
        let x = position.0.checked_add_signed(offset.0)?;
        let y = position.1.checked_add_signed(offset.1)?;
        (x < self.rows && y < self.columns).then_some((x, y))
    }

    pub fn is_hazard_core(&self, position: Position) -> bool {
        self.classify(position).is_some_and(Cell::is_hazard_core)
    }

    pub fn is_primary_core(&self, position: Position) -> bool {
        self.classify(position).is_some_and(Cell::is_primary_core)
    }

    pub fn is_perception_zone(&self, position: Position) -> bool {
        self.classify(position).is_some_and(Cell::is_perception_zone)
    }

    /// Out-of-bounds cells count as blocking.
    pub fn is_blocking(&self, position: Position) -> bool {
        self.classify(position).map_or(true, Cell::is_blocking)
    }

    /// Whether a traveller may step onto `position`.
    pub fn is_passable(&self, position: Position, hazard_neutralized: bool) -> bool {
        match self.classify(position) {
            None => false,
            Some(cell) if cell.is_blocking() => false,
            Some(cell) if cell.is_neutralizable() => hazard_neutralized,
            Some(_) => true,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.grid.iter().enumerate().flat_map(|(x, row)| {
            row.iter()
                .enumerate()
                .map(move |(y, &cell)| ((x, y), cell))
        })
    }

    fn placement_issue(&self, actor: Actor, position: Position) -> Option<PlacementIssue> {
        let Some(cell) = self.classify(position) else {
            return Some(PlacementIssue::OutOfBounds);
        };
        if actor == Actor::Agent {
            return None;
        }
        // A zone may have been stamped over the start cell; it stays taken.
        if position == self.start {
            return Some(PlacementIssue::Occupied);
        }

        match actor {
            Actor::Agent => None,
            Actor::PrimaryHazard | Actor::SecondaryHazard => {
                cell.is_occupied().then_some(PlacementIssue::Occupied)
            }
            Actor::Obstacle => (cell.is_occupied() && cell != Cell::PrimaryCore)
                .then_some(PlacementIssue::Occupied),
            Actor::Waypoint | Actor::Goal => {
                if cell.is_occupied() {
                    Some(PlacementIssue::Occupied)
                } else if cell.is_perception_zone() {
                    Some(PlacementIssue::InsidePerceptionZone)
                } else {
                    None
                }
            }
        }
    }

    fn place(&mut self, actor: Actor, position: Position) {
        match actor {
            Actor::Agent => self.place_agent(position),
            Actor::PrimaryHazard => self.place_primary_hazard(position),
            Actor::SecondaryHazard => self.place_secondary_hazard(position),
            Actor::Obstacle => self.place_obstacle(position),
            Actor::Waypoint => self.place_waypoint(position),
            Actor::Goal => self.place_goal(position),
        }
    }

    fn set(&mut self, position: Position, cell: Cell) {
        self.grid[position.0][position.1] = cell;
    }

    pub(crate) fn place_agent(&mut self, position: Position) {
        self.start = position;
        self.set(position, Cell::Agent);
    }

    pub(crate) fn place_primary_hazard(&mut self, position: Position) {
        self.primary_hazard = position;
        let core = if self.classify(position) == Some(Cell::Obstacle) {
            Cell::PrimaryCoreWithObstacle
        } else {
            Cell::PrimaryCore
        };
        self.set(position, core);

        for offset in PRIMARY_FOOTPRINT {
            let Some(neighbor) = self.shift(position, offset) else {
                continue;
            };
            // The roaming hazard's zone stays lethal where the two overlap.
            match self.classify(neighbor) {
                Some(cell) if cell.is_hazard_core() || cell == Cell::SecondaryZone => {}
                _ => self.set(neighbor, Cell::PrimaryZone),
            }
        }
    }

    pub(crate) fn place_secondary_hazard(&mut self, position: Position) {
        self.secondary_hazard = position;
        self.set(position, Cell::SecondaryCore);

        for offset in SECONDARY_FOOTPRINT {
            let Some(neighbor) = self.shift(position, offset) else {
                continue;
            };
            if !self.is_hazard_core(neighbor) {
                self.set(neighbor, Cell::SecondaryZone);
            }
        }
    }

    pub(crate) fn place_obstacle(&mut self, position: Position) {
        self.obstacle = position;
        let cell = if self.classify(position) == Some(Cell::PrimaryCore) {
            Cell::PrimaryCoreWithObstacle
        } else {
            Cell::Obstacle
        };
        self.set(position, cell);
    }

    pub(crate) fn place_waypoint(&mut self, position: Position) {
        self.waypoint = position;
        self.set(position, Cell::Waypoint);
    }

    pub(crate) fn place_goal(&mut self, position: Position) {
        self.goal = position;
        self.set(position, Cell::Goal);
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for y in 0..self.columns {
            write!(f, "{y} ")?;
        }
        writeln!(f)?;
        for (x, row) in self.grid.iter().enumerate() {
            write!(f, "{x} ")?;
            for cell in row {
                write!(f, "{} ", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
