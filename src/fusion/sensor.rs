//! Static sensor configuration and the lookup tables built from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FusionError, Result};

/// Road label given to sensors whose name carries no road prefix.
pub const UNKNOWN_ROAD: &str = "unknown";

const PORT_TOKEN: &str = ":origin_port, ";
const PORT_DIGITS: usize = 5;

/// One fixed radar unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub name: String,
    /// Installation azimuth in degrees, clockwise from north.
    pub azimuth: f64,
    pub easting: f64,
    pub northing: f64,
    #[serde(default)]
    pub ethernet_port: Option<u16>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Explicit road label. Derived from the name prefix when absent.
    #[serde(default)]
    pub road: Option<String>,
}

fn default_active() -> bool {
    true
}

impl SensorConfig {
    pub fn new(name: impl Into<String>, azimuth: f64, easting: f64, northing: f64) -> Self {
        Self {
            name: name.into(),
            azimuth,
            easting,
            northing,
            ethernet_port: None,
            active: true,
            road: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.ethernet_port = Some(port);
        self
    }

    pub fn with_road(mut self, road: impl Into<String>) -> Self {
        self.road = Some(road.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Derive a road label from a sensor name: a leading letter `A`..=`Q`
/// optionally followed by one digit (`"A1, ttyS0"` -> `"A1"`, `"B, ttyS2"`
/// -> `"B"`).
pub fn road_label(sensor_name: &str) -> Option<&str> {
    let mut chars = sensor_name.char_indices();
    match chars.next() {
        Some((_, c)) if ('A'..='Q').contains(&c) => {}
        _ => return None,
    }
    let end = match chars.next() {
        Some((i, c)) if c.is_ascii_digit() => i + c.len_utf8(),
        _ => 1,
    };
    Some(&sensor_name[..end])
}

/// Extract the five digit port from labels like `"...:origin_port, 55001"`.
fn parse_origin_port(label: &str) -> Option<u16> {
    let start = label.find(PORT_TOKEN)? + PORT_TOKEN.len();
    let digits = label.get(start..start + PORT_DIGITS)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lookup tables over the active sensors, built once at startup.
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    sensors: Vec<SensorConfig>,
    by_name: HashMap<String, Vec<usize>>,
    by_port: HashMap<u16, Vec<usize>>,
    roads: HashMap<String, String>,
}

impl SensorRegistry {
    pub fn new(configs: impl IntoIterator<Item = SensorConfig>) -> Result<Self> {
        let sensors: Vec<SensorConfig> = configs.into_iter().filter(|s| s.active).collect();
        if sensors.is_empty() {
            return Err(FusionError::EmptySensorList);
        }

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_port: HashMap<u16, Vec<usize>> = HashMap::new();
        let mut roads = HashMap::new();

        for (idx, sensor) in sensors.iter().enumerate() {
            if !sensor.azimuth.is_finite()
                || !sensor.easting.is_finite()
                || !sensor.northing.is_finite()
            {
                return Err(FusionError::InvalidConfig(format!(
                    "sensor `{}` has a non-finite placement",
                    sensor.name
                )));
            }

            by_name.entry(sensor.name.clone()).or_default().push(idx);
            if let Some(port) = sensor.ethernet_port {
                by_port.entry(port).or_default().push(idx);
            }

            let road = match sensor.road.as_deref().or_else(|| road_label(&sensor.name)) {
                Some(road) => road.to_string(),
                None => {
                    warn!(sensor = %sensor.name, "sensor name carries no road label");
                    UNKNOWN_ROAD.to_string()
                }
            };
            roads.insert(sensor.name.clone(), road);
        }

        for (name, idxs) in &by_name {
            if idxs.len() > 1 {
                warn!(sensor = %name, count = idxs.len(), "duplicate sensor name, detections will be dropped");
            }
        }
        for (port, idxs) in &by_port {
            if idxs.len() > 1 {
                warn!(port, count = idxs.len(), "ethernet port shared by several sensors");
            }
        }

        Ok(Self {
            sensors,
            by_name,
            by_port,
            roads,
        })
    }

    pub fn sensors(&self) -> &[SensorConfig] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Resolve a sensor name to exactly one configuration.
    pub fn resolve(&self, name: &str) -> Result<&SensorConfig> {
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([idx]) => Ok(&self.sensors[*idx]),
            other => Err(FusionError::UnresolvedSensor {
                name: name.to_string(),
                matches: other.map_or(0, <[usize]>::len),
            }),
        }
    }

    /// Road label of a configured sensor.
    pub fn road(&self, name: &str) -> Option<&str> {
        self.roads.get(name).map(String::as_str)
    }

    /// Map a raw sensor label to a configured name.
    ///
    /// Known names are returned as is. Otherwise an `:origin_port, NNNNN`
    /// token is looked up in the port table. Labels that cannot be mapped
    /// are returned unchanged.
    pub fn canonical_name<'a>(&'a self, raw: &'a str) -> &'a str {
        if self.contains(raw) {
            return raw;
        }
        let Some(port) = parse_origin_port(raw) else {
            return raw;
        };
        match self.by_port.get(&port).map(Vec::as_slice) {
            Some([idx]) => &self.sensors[*idx].name,
            _ => {
                warn!(label = raw, port, "origin port does not map to a single sensor");
                raw
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SensorRegistry {
        SensorRegistry::new(vec![
            SensorConfig::new("A1, ttyS0", 30.0, 1000.0, 2000.0).with_port(55001),
            SensorConfig::new("A1, ttyS3", 40.0, 1000.0, 2000.0).with_port(55004),
            SensorConfig::new("B, ttyS2", 200.0, 1100.0, 2100.0).with_port(55003),
            SensorConfig::new("C9, ttyS9", 0.0, 0.0, 0.0).inactive(),
        ])
        .unwrap()
    }

    #[test]
    fn test_road_label() {
        assert_eq!(road_label("A1, ttyS0"), Some("A1"));
        assert_eq!(road_label("B, ttyS2"), Some("B"));
        assert_eq!(road_label("Q7"), Some("Q7"));
        assert_eq!(road_label("R1, ttyS0"), None);
        assert_eq!(road_label("a1"), None);
        assert_eq!(road_label(""), None);
    }

    #[test]
    fn test_resolve_only_active() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve("B, ttyS2").unwrap().azimuth, 200.0);
        assert!(matches!(
            registry.resolve("C9, ttyS9"),
            Err(FusionError::UnresolvedSensor { matches: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_names_do_not_resolve() {
        let registry = SensorRegistry::new(vec![
            SensorConfig::new("A1", 0.0, 0.0, 0.0),
            SensorConfig::new("A1", 90.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(matches!(
            registry.resolve("A1"),
            Err(FusionError::UnresolvedSensor { matches: 2, .. })
        ));
    }

    #[test]
    fn test_empty_sensor_list() {
        let err = SensorRegistry::new(vec![SensorConfig::new("A1", 0.0, 0.0, 0.0).inactive()])
            .unwrap_err();
        assert!(matches!(err, FusionError::EmptySensorList));
    }

    #[test]
    fn test_canonical_name_from_port() {
        let registry = registry();
        assert_eq!(registry.canonical_name("A1, ttyS0"), "A1, ttyS0");
        assert_eq!(
            registry.canonical_name("udp:origin_port, 55003"),
            "B, ttyS2"
        );
        assert_eq!(registry.canonical_name("udp:origin_port, 59999"), "udp:origin_port, 59999");
        assert_eq!(registry.canonical_name("garbage"), "garbage");
    }

    #[test]
    fn test_road_table() {
        let registry = SensorRegistry::new(vec![
            SensorConfig::new("A2, ttyS1", 0.0, 0.0, 0.0),
            SensorConfig::new("north", 0.0, 0.0, 0.0),
            SensorConfig::new("south", 0.0, 0.0, 0.0).with_road("S"),
        ])
        .unwrap();
        assert_eq!(registry.road("A2, ttyS1"), Some("A2"));
        assert_eq!(registry.road("north"), Some(UNKNOWN_ROAD));
        assert_eq!(registry.road("south"), Some("S"));
    }
}
