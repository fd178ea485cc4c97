//! Registry statistics: attribute counts and registration activity

use chrono::{DateTime, Utc};
use serde::Serialize;

use plategate_types::RegisteredVehicle;

use crate::vehicles::VehicleStore;

/// Entries kept in each top list and in the recent registrations
pub const TOP_N: usize = 5;

/// Summary of the local registry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub unique_colors: usize,
    pub unique_makes: usize,
    pub with_owners: usize,
    /// Most common colors, highest count first
    pub top_colors: Vec<(String, usize)>,
    /// Most common makes (first word of make/model), highest count first
    pub top_makes: Vec<(String, usize)>,
    pub registered_today: usize,
    pub registered_this_week: usize,
    pub registered_this_month: usize,
    /// Newest registrations first
    pub recent: Vec<RegisteredVehicle>,
}

impl RegistryStats {
    /// Vehicles are expected in registration order. Blank colors and makes are
    /// not counted.
    pub fn from_vehicles(vehicles: &[RegisteredVehicle], now: DateTime<Utc>) -> Self {
        let colors = count_labels(vehicles.iter().map(|v| v.record.color.trim()));
        let makes = count_labels(vehicles.iter().map(|v| make_of(&v.record.make_model)));

        let mut stats = Self {
            total: vehicles.len(),
            unique_colors: colors.len(),
            unique_makes: makes.len(),
            with_owners: vehicles
                .iter()
                .filter(|v| !v.record.owner_name.trim().is_empty())
                .count(),
            top_colors: top(colors),
            top_makes: top(makes),
            recent: vehicles.iter().rev().take(TOP_N).cloned().collect(),
            ..Self::default()
        };

        for vehicle in vehicles {
            let days = (now - vehicle.registered_at).num_days();
            if days == 0 {
                stats.registered_today += 1;
            }
            if days < 7 {
                stats.registered_this_week += 1;
            }
            if days < 30 {
                stats.registered_this_month += 1;
            }
        }

        stats
    }
}

impl VehicleStore {
    pub fn stats(&self) -> RegistryStats {
        RegistryStats::from_vehicles(self.all_vehicles(), Utc::now())
    }
}

fn make_of(make_model: &str) -> &str {
    make_model.split_whitespace().next().unwrap_or("")
}

/// Counts in first-seen order
fn count_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels.filter(|l| !l.is_empty()) {
        match counts.iter_mut().find(|(seen, _)| seen.as_str() == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }
    counts
}

/// Highest counts first; equal counts keep first-seen order
fn top(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_N);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use plategate_types::VehicleRecord;

    fn registered(plate: &str, color: &str, make: &str, owner: &str, age_days: i64) -> RegisteredVehicle {
        let mut vehicle = RegisteredVehicle::new(
            VehicleRecord::new(plate)
                .with_color(color)
                .with_make_model(make)
                .with_owner(owner),
        );
        vehicle.registered_at = Utc::now() - Duration::days(age_days);
        vehicle
    }

    #[test]
    fn test_counts_by_color_and_make() {
        let vehicles = vec![
            registered("AAA111", "Red", "Toyota Corolla", "Alice", 0),
            registered("BBB222", "Blue", "Honda Civic", "", 0),
            registered("CCC333", "Red", "Toyota Camry", "Carol", 0),
            registered("DDD444", "", "", "", 0),
        ];
        let stats = RegistryStats::from_vehicles(&vehicles, Utc::now());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.unique_colors, 2);
        assert_eq!(stats.unique_makes, 2);
        assert_eq!(stats.with_owners, 2);
        assert_eq!(stats.top_colors[0], ("Red".to_string(), 2));
        assert_eq!(stats.top_makes[0], ("Toyota".to_string(), 2));
        assert_eq!(stats.top_makes[1], ("Honda".to_string(), 1));
    }

    #[test]
    fn test_top_lists_are_capped_and_stable() {
        let vehicles: Vec<_> = ["White", "Black", "Grey", "Green", "Gold", "Blue", "Black"]
            .iter()
            .enumerate()
            .map(|(i, color)| registered(&format!("P{}", i), color, "", "", 0))
            .collect();
        let stats = RegistryStats::from_vehicles(&vehicles, Utc::now());

        let names: Vec<_> = stats.top_colors.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Black", "White", "Grey", "Green", "Gold"]);
    }

    #[test]
    fn test_registration_activity_windows() {
        let vehicles = vec![
            registered("AAA111", "", "", "", 0),
            registered("BBB222", "", "", "", 3),
            registered("CCC333", "", "", "", 20),
            registered("DDD444", "", "", "", 90),
        ];
        let stats = RegistryStats::from_vehicles(&vehicles, Utc::now());

        assert_eq!(stats.registered_today, 1);
        assert_eq!(stats.registered_this_week, 2);
        assert_eq!(stats.registered_this_month, 3);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let vehicles: Vec<_> = (0..7)
            .map(|i| registered(&format!("P{}", i), "", "", "", 0))
            .collect();
        let stats = RegistryStats::from_vehicles(&vehicles, Utc::now());

        let plates: Vec<_> = stats.recent.iter().map(|v| v.record.plate_number.as_str()).collect();
        assert_eq!(plates, vec!["P6", "P5", "P4", "P3", "P2"]);
    }

    #[test]
    fn test_empty_registry() {
        assert_eq!(RegistryStats::from_vehicles(&[], Utc::now()), RegistryStats::default());
    }
}
