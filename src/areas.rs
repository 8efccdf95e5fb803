//! Region → office index built from the JMA `areas.json` hierarchy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AreaError {
    #[error("Failed to read area file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Area file is empty")]
    Empty,
    #[error("Area file is not a valid hierarchy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Area file defines no regions")]
    NoRegions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Center {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Office {
    pub name: String,
    pub parent: String,
}

/// The two maps of `areas.json` this service cares about. The remaining
/// levels (`class10s`, `class15s`, ...) are ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaHierarchy {
    pub centers: BTreeMap<String, Center>,
    pub offices: BTreeMap<String, Office>,
}

pub fn parse_area_hierarchy(raw: &str) -> Result<AreaHierarchy, AreaError> {
    if raw.trim().is_empty() {
        return Err(AreaError::Empty);
    }
    Ok(serde_json::from_str(raw)?)
}

pub fn load_area_hierarchy(path: impl AsRef<Path>) -> Result<AreaHierarchy, AreaError> {
    let raw = std::fs::read_to_string(path)?;
    parse_area_hierarchy(&raw)
}

/// Load and index the area file. An index without regions is unusable
/// and reported as [`AreaError::NoRegions`].
pub fn load_region_index(path: impl AsRef<Path>) -> Result<RegionIndex, AreaError> {
    let index = RegionIndex::build(&load_area_hierarchy(path)?);
    if index.is_empty() {
        return Err(AreaError::NoRegions);
    }
    Ok(index)
}

#[derive(Debug, Clone, Serialize)]
pub struct OfficeOption {
    pub code: String,
    pub name: String,
}

/// `region name → (office code → office name)`. Built once, read-only after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionIndex {
    regions: BTreeMap<String, BTreeMap<String, String>>,
}

impl RegionIndex {
    pub fn build(hierarchy: &AreaHierarchy) -> Self {
        let mut regions: BTreeMap<String, BTreeMap<String, String>> = hierarchy
            .centers
            .values()
            .map(|center| (center.name.clone(), BTreeMap::new()))
            .collect();

        for (code, office) in &hierarchy.offices {
            let Some(center) = hierarchy.centers.get(&office.parent) else {
                tracing::warn!(
                    office_code = %code,
                    parent = %office.parent,
                    "Skipping office {} ({}): parent center not found",
                    code,
                    office.name
                );
                continue;
            };

            regions
                .entry(center.name.clone())
                .or_default()
                .insert(code.clone(), office.name.clone());
        }

        Self { regions }
    }

    pub fn regions(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    pub fn offices(&self, region: &str) -> Option<Vec<OfficeOption>> {
        self.regions.get(region).map(|offices| {
            offices
                .iter()
                .map(|(code, name)| OfficeOption {
                    code: code.clone(),
                    name: name.clone(),
                })
                .collect()
        })
    }

    pub fn office_name(&self, office_code: &str) -> Option<&str> {
        self.regions
            .values()
            .find_map(|offices| offices.get(office_code))
            .map(String::as_str)
    }

    pub fn region_of(&self, office_code: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, offices)| offices.contains_key(office_code))
            .map(|(region, _)| region.as_str())
    }

    /// `(region, office code, office name)` triples, for seeding storage.
    pub fn iter_offices(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.regions.iter().flat_map(|(region, offices)| {
            offices
                .iter()
                .map(move |(code, name)| (region.as_str(), code.as_str(), name.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
