//! Static territory catalog
//!
//! The classic 42-territory world map: adjacency lists and continent
//! groupings. Read-only, shared by every session without locking.

use serde::{Deserialize, Serialize};

/// Number of territories in the catalog
pub const TERRITORY_COUNT: usize = 42;

/// Continent grouping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Australia,
}

impl Continent {
    /// Fixed reinforcement bonus for controlling the whole continent
    pub fn bonus(self) -> u32 {
        match self {
            Continent::NorthAmerica => 5,
            Continent::SouthAmerica => 2,
            Continent::Europe => 5,
            Continent::Africa => 3,
            Continent::Asia => 7,
            Continent::Australia => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Europe => "Europe",
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Australia => "Australia",
        }
    }

    pub const ALL: [Continent; 6] = [
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Europe,
        Continent::Africa,
        Continent::Asia,
        Continent::Australia,
    ];
}

/// Territory definition
#[derive(Clone, Debug)]
pub struct TerritoryDef {
    pub id: &'static str,
    pub continent: Continent,
    pub neighbors: &'static [&'static str],
}

impl TerritoryDef {
    const fn new(id: &'static str, continent: Continent, neighbors: &'static [&'static str]) -> Self {
        Self { id, continent, neighbors }
    }
}

use Continent::{Africa, Asia, Australia, Europe, NorthAmerica, SouthAmerica};

/// All 42 territories
pub static TERRITORIES: [TerritoryDef; TERRITORY_COUNT] = [
    // North America
    TerritoryDef::new("alaska", NorthAmerica, &["northwest_territory", "alberta", "kamchatka"]),
    TerritoryDef::new("northwest_territory", NorthAmerica, &["alaska", "alberta", "ontario", "greenland"]),
    TerritoryDef::new("greenland", NorthAmerica, &["northwest_territory", "ontario", "quebec", "iceland"]),
    TerritoryDef::new("alberta", NorthAmerica, &["alaska", "northwest_territory", "ontario", "western_united_states"]),
    TerritoryDef::new("ontario", NorthAmerica, &["alberta", "northwest_territory", "greenland", "quebec", "western_united_states", "eastern_united_states"]),
    TerritoryDef::new("quebec", NorthAmerica, &["ontario", "greenland", "eastern_united_states"]),
    TerritoryDef::new("western_united_states", NorthAmerica, &["alberta", "ontario", "eastern_united_states", "central_america"]),
    TerritoryDef::new("eastern_united_states", NorthAmerica, &["western_united_states", "ontario", "quebec", "central_america"]),
    TerritoryDef::new("central_america", NorthAmerica, &["western_united_states", "eastern_united_states", "venezuela"]),
    // South America
    TerritoryDef::new("venezuela", SouthAmerica, &["central_america", "peru", "brazil"]),
    TerritoryDef::new("peru", SouthAmerica, &["venezuela", "brazil", "argentina"]),
    TerritoryDef::new("brazil", SouthAmerica, &["venezuela", "peru", "argentina", "north_africa"]),
    TerritoryDef::new("argentina", SouthAmerica, &["peru", "brazil"]),
    // Europe
    TerritoryDef::new("iceland", Europe, &["greenland", "great_britain", "scandinavia"]),
    TerritoryDef::new("great_britain", Europe, &["iceland", "scandinavia", "northern_europe", "western_europe"]),
    TerritoryDef::new("scandinavia", Europe, &["iceland", "great_britain", "northern_europe", "ukraine"]),
    TerritoryDef::new("ukraine", Europe, &["scandinavia", "northern_europe", "southern_europe", "ural", "afghanistan", "middle_east"]),
    TerritoryDef::new("northern_europe", Europe, &["great_britain", "scandinavia", "ukraine", "southern_europe", "western_europe"]),
    TerritoryDef::new("western_europe", Europe, &["great_britain", "northern_europe", "southern_europe", "north_africa"]),
    TerritoryDef::new("southern_europe", Europe, &["western_europe", "northern_europe", "ukraine", "middle_east", "egypt", "north_africa"]),
    // Africa
    TerritoryDef::new("north_africa", Africa, &["western_europe", "southern_europe", "egypt", "east_africa", "congo", "brazil"]),
    TerritoryDef::new("egypt", Africa, &["southern_europe", "middle_east", "east_africa", "north_africa"]),
    TerritoryDef::new("east_africa", Africa, &["egypt", "middle_east", "madagascar", "south_africa", "congo", "north_africa"]),
    TerritoryDef::new("congo", Africa, &["north_africa", "east_africa", "south_africa"]),
    TerritoryDef::new("south_africa", Africa, &["congo", "east_africa", "madagascar"]),
    TerritoryDef::new("madagascar", Africa, &["east_africa", "south_africa"]),
    // Asia
    TerritoryDef::new("ural", Asia, &["ukraine", "siberia", "china", "afghanistan"]),
    TerritoryDef::new("siberia", Asia, &["ural", "yakutsk", "irkutsk", "mongolia", "china"]),
    TerritoryDef::new("yakutsk", Asia, &["siberia", "kamchatka", "irkutsk"]),
    TerritoryDef::new("kamchatka", Asia, &["yakutsk", "irkutsk", "mongolia", "japan", "alaska"]),
    TerritoryDef::new("irkutsk", Asia, &["siberia", "yakutsk", "kamchatka", "mongolia"]),
    TerritoryDef::new("mongolia", Asia, &["siberia", "irkutsk", "kamchatka", "japan", "china"]),
    TerritoryDef::new("japan", Asia, &["kamchatka", "mongolia"]),
    TerritoryDef::new("afghanistan", Asia, &["ukraine", "ural", "china", "india", "middle_east"]),
    TerritoryDef::new("china", Asia, &["ural", "siberia", "mongolia", "afghanistan", "india", "siam"]),
    TerritoryDef::new("middle_east", Asia, &["ukraine", "southern_europe", "egypt", "east_africa", "afghanistan", "india"]),
    TerritoryDef::new("india", Asia, &["middle_east", "afghanistan", "china", "siam"]),
    TerritoryDef::new("siam", Asia, &["india", "china", "indonesia"]),
    // Australia
    TerritoryDef::new("indonesia", Australia, &["siam", "new_guinea", "western_australia"]),
    TerritoryDef::new("new_guinea", Australia, &["indonesia", "western_australia", "eastern_australia"]),
    TerritoryDef::new("western_australia", Australia, &["indonesia", "new_guinea", "eastern_australia"]),
    TerritoryDef::new("eastern_australia", Australia, &["new_guinea", "western_australia"]),
];

/// Look up a territory definition by id
pub fn territory(id: &str) -> Option<&'static TerritoryDef> {
    TERRITORIES.iter().find(|t| t.id == id)
}

/// Whether two territories share a border
pub fn adjacent(a: &str, b: &str) -> bool {
    territory(a).is_some_and(|t| t.neighbors.contains(&b))
}

/// Continent a territory belongs to
pub fn continent_of(id: &str) -> Option<Continent> {
    territory(id).map(|t| t.continent)
}

/// All territory ids in catalog order
pub fn territory_ids() -> impl Iterator<Item = &'static str> {
    TERRITORIES.iter().map(|t| t.id)
}

/// All territories of one continent
pub fn territories_in(continent: Continent) -> impl Iterator<Item = &'static TerritoryDef> {
    TERRITORIES.iter().filter(move |t| t.continent == continent)
}
