//! Static water-network topology.
//!
//! The topology (zones, towers, stations, the sparse station-zone eligibility
//! matrix, and the tower-station feed links) is read-only reference data,
//! expected constant for the lifetime of a process. It is supplied by an
//! external collaborator either as typed records or as a single JSON document
//! parsed here.

use crate::api::{
    EligibilityEntry, GeoPoint, Station, StationId, Tower, TowerId, TowerStationLink, Zone,
    ZoneId,
};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Calculate the SHA-256 checksum of a topology JSON document.
///
/// Used to deduplicate topology snapshots across planning cycles: two
/// documents with the same checksum describe the same network.
pub fn topology_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

#[derive(serde::Deserialize)]
struct NetworkInput {
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub towers: Vec<Tower>,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub eligibility: Vec<EligibilityEntry>,
    #[serde(default)]
    pub links: Vec<TowerStationLink>,
}

fn validate_input_network(network_json: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(network_json).context("Invalid network JSON")?;
    let has_zones = value
        .as_object()
        .and_then(|obj| obj.get("zones"))
        .is_some();
    if !has_zones {
        anyhow::bail!("Missing required 'zones' field");
    }
    Ok(())
}

/// The complete static network topology.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct WaterNetwork {
    /// SHA-256 of the source JSON, for snapshot deduplication
    pub checksum: String,
    pub zones: Vec<Zone>,
    pub towers: Vec<Tower>,
    pub stations: Vec<Station>,
    pub eligibility: Vec<EligibilityEntry>,
    pub links: Vec<TowerStationLink>,
}

impl WaterNetwork {
    /// Build a network from already-typed records. The checksum is left empty;
    /// it only exists for JSON-sourced topologies.
    pub fn new(
        zones: Vec<Zone>,
        towers: Vec<Tower>,
        stations: Vec<Station>,
        eligibility: Vec<EligibilityEntry>,
        links: Vec<TowerStationLink>,
    ) -> Self {
        WaterNetwork {
            checksum: String::new(),
            zones,
            towers,
            stations,
            eligibility,
            links,
        }
    }

    /// Parse a network topology from a JSON document.
    ///
    /// Duplicate ids and out-of-range coordinates are hard errors; eligibility
    /// entries and feed links that reference unknown entities are kept but
    /// logged as warnings, matching the degrade-gracefully policy for
    /// per-record anomalies.
    pub fn from_json_str(network_json: &str) -> Result<WaterNetwork> {
        validate_input_network(network_json)?;

        let input: NetworkInput = serde_json::from_str(network_json)
            .context("Failed to deserialize network JSON using Serde")?;

        let mut network = WaterNetwork {
            checksum: input.checksum,
            zones: input.zones,
            towers: input.towers,
            stations: input.stations,
            eligibility: input.eligibility,
            links: input.links,
        };

        if network.checksum.is_empty() {
            network.checksum = topology_checksum(network_json);
        }

        network.check_integrity()?;
        Ok(network)
    }

    /// Verify id uniqueness and coordinate ranges; warn about dangling
    /// references.
    fn check_integrity(&self) -> Result<()> {
        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(&zone.id) {
                anyhow::bail!("Duplicate zone id '{}'", zone.id);
            }
            GeoPoint::new(zone.location.lat, zone.location.lng)
                .map_err(|err| anyhow::anyhow!("Zone '{}': {}", zone.id, err))?;
        }
        let mut tower_ids = HashSet::new();
        for tower in &self.towers {
            if !tower_ids.insert(&tower.id) {
                anyhow::bail!("Duplicate tower id '{}'", tower.id);
            }
            GeoPoint::new(tower.location.lat, tower.location.lng)
                .map_err(|err| anyhow::anyhow!("Tower '{}': {}", tower.id, err))?;
        }
        let mut station_ids = HashSet::new();
        for station in &self.stations {
            if !station_ids.insert(&station.id) {
                anyhow::bail!("Duplicate station id '{}'", station.id);
            }
            GeoPoint::new(station.location.lat, station.location.lng)
                .map_err(|err| anyhow::anyhow!("Station '{}': {}", station.id, err))?;
        }

        for entry in &self.eligibility {
            if !zone_ids.contains(&entry.zone_id) {
                log::warn!(
                    "Eligibility entry references unknown zone '{}'",
                    entry.zone_id
                );
            }
            if !station_ids.contains(&entry.station_id) {
                log::warn!(
                    "Eligibility entry references unknown station '{}'",
                    entry.station_id
                );
            }
        }
        for link in &self.links {
            if !tower_ids.contains(&link.tower_id) {
                log::warn!("Feed link references unknown tower '{}'", link.tower_id);
            }
            if !station_ids.contains(&link.station_id) {
                log::warn!("Feed link references unknown station '{}'", link.station_id);
            }
        }
        Ok(())
    }

    /// Precomputed zone -> eligible-entries map, preserving matrix order.
    pub fn eligibility_index(&self) -> HashMap<&ZoneId, Vec<&EligibilityEntry>> {
        let mut index: HashMap<&ZoneId, Vec<&EligibilityEntry>> = HashMap::new();
        for entry in &self.eligibility {
            index.entry(&entry.zone_id).or_default().push(entry);
        }
        index
    }

    /// Precomputed station -> feeding-tower map. A station fed by more than
    /// one tower resolves to its first link in list order.
    pub fn station_tower_index(&self) -> HashMap<&StationId, &TowerId> {
        let mut index = HashMap::new();
        for link in &self.links {
            index.entry(&link.station_id).or_insert(&link.tower_id);
        }
        index
    }

    /// Tower ids in first-appearance order of the feed-link list. This is the
    /// authoritative draw order for the balancer.
    pub fn linked_tower_order(&self) -> Vec<&TowerId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for link in &self.links {
            if seen.insert(&link.tower_id) {
                order.push(&link.tower_id);
            }
        }
        order
    }

    /// Keyed lookup for stations.
    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| &s.id == id)
    }

    /// Keyed lookup for towers.
    pub fn tower(&self, id: &TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| &t.id == id)
    }
}
