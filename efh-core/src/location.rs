use crate::error::Result;
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

/// A location of the hub (country id, display name, population).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationLookupItem {
    /// Two-letter location code (e.g., "DE")
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub population: u64,
}

/// All known locations, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationLookup {
    items: Vec<LocationLookupItem>,
}

impl LocationLookup {
    pub fn new(mut items: Vec<LocationLookupItem>) -> Self {
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Self { items }
    }

    pub fn get(&self, id: &str) -> Option<&LocationLookupItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[LocationLookupItem] {
        &self.items
    }

    /// The first location by name, used when no location was chosen yet.
    pub fn first(&self) -> Option<&LocationLookupItem> {
        self.items.first()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse `location_codes.csv` with headers `location,location_name,population`.
    ///
    /// Rows with an unparseable population are skipped.
    pub fn parse_location_csv(csv_data: &str) -> Result<LocationLookup> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut items = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let id = r.get(0).unwrap_or("");
            let name = r.get(1).unwrap_or("");
            let population = r.get(2).and_then(|p| p.parse::<u64>().ok());
            match population {
                Some(population) if !id.is_empty() => items.push(LocationLookupItem {
                    id: id.to_string(),
                    name: name.to_string(),
                    population,
                }),
                _ => skipped += 1,
            }
        }
        log::info!(
            "[EFH] loader: Loaded {} locations, skipped {}",
            items.len(),
            skipped
        );
        Ok(LocationLookup::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_csv_orders_by_name() {
        let csv_data = "\
location,location_name,population
DE,Germany,83166711
AT,Austria,8901064
XX,Nowhere,unknown
";
        let lookup = LocationLookup::parse_location_csv(csv_data).unwrap();
        assert_eq!(lookup.items().len(), 2);
        assert_eq!(lookup.first().unwrap().id, "AT");
        assert_eq!(lookup.get("DE").unwrap().population, 83166711);
        assert!(lookup.get("XX").is_none());
    }
}
