//! City registry and connection list.
//!
//! Maps city names to `(lng, lat)` coordinates. Lookups for unknown
//! cities return [`COORD_SENTINEL`]; callers must treat the sentinel as
//! "skip, do not render" rather than a real coordinate.

use std::collections::HashMap;

/// Sentinel coordinate returned for unknown cities
pub const COORD_SENTINEL: (f64, f64) = (0.0, 0.0);

/// An ordered pair of city names with a drawn connection between them
pub type Connection = (&'static str, &'static str);

/// Built-in European city set used by the demo traffic and the dispatcher
const DEFAULT_CITIES: &[(&str, f64, f64)] = &[
    ("Warsaw", 21.0122, 52.2297),
    ("Berlin", 13.4050, 52.5200),
    ("Amsterdam", 4.9041, 52.3676),
    ("Brussels", 4.3517, 50.8503),
    ("Paris", 2.3522, 48.8566),
    ("Madrid", -3.7038, 40.4168),
    ("Lisbon", -9.1393, 38.7223),
    ("Rome", 12.4964, 41.9028),
    ("Vienna", 16.3738, 48.2082),
    ("Prague", 14.4378, 50.0755),
    ("Stockholm", 18.0686, 59.3293),
    ("Helsinki", 24.9384, 60.1699),
    ("Copenhagen", 12.5683, 55.6761),
    ("Budapest", 19.0402, 47.4979),
    ("Athens", 23.7275, 37.9838),
    ("Bucharest", 26.1025, 44.4268),
    ("Dublin", -6.2603, 53.3498),
    ("Zagreb", 15.9819, 45.8150),
    ("Ljubljana", 14.5058, 46.0569),
    ("Bratislava", 17.1077, 48.1486),
];

/// Connections drawn on the default map; also drives the traffic simulator
pub const DEFAULT_CONNECTIONS: &[Connection] = &[
    ("Warsaw", "Berlin"),
    ("Berlin", "Amsterdam"),
    ("Amsterdam", "Brussels"),
    ("Brussels", "Paris"),
    ("Paris", "Madrid"),
    ("Madrid", "Lisbon"),
    ("Rome", "Vienna"),
    ("Vienna", "Prague"),
    ("Prague", "Warsaw"),
    ("Stockholm", "Helsinki"),
    ("Stockholm", "Copenhagen"),
    ("Copenhagen", "Berlin"),
    ("Budapest", "Vienna"),
    ("Athens", "Rome"),
    ("Bucharest", "Budapest"),
    ("Brussels", "Dublin"),
    ("Zagreb", "Ljubljana"),
    ("Ljubljana", "Vienna"),
    ("Bratislava", "Vienna"),
    ("Budapest", "Warsaw"),
];

/// Name to coordinate lookup for event origins and targets
#[derive(Debug, Clone)]
pub struct CityRegistry {
    cities: HashMap<String, (f64, f64)>,
}

impl CityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            cities: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in European city set
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, lng, lat) in DEFAULT_CITIES {
            registry.insert(*name, *lng, *lat);
        }
        registry
    }

    /// Add or replace a city
    pub fn insert(&mut self, name: impl Into<String>, lng: f64, lat: f64) {
        self.cities.insert(name.into(), (lng, lat));
    }

    /// Resolve `(lng, lat)` from a city name.
    ///
    /// Returns [`COORD_SENTINEL`] for unknown names.
    pub fn coords(&self, name: &str) -> (f64, f64) {
        self.cities.get(name).copied().unwrap_or(COORD_SENTINEL)
    }

    /// Whether the name resolves to a real city
    pub fn contains(&self, name: &str) -> bool {
        self.cities.contains_key(name)
    }

    /// Number of registered cities
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
