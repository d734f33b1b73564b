use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::WeightEntry;

/// One entry per UTC calendar day, the latest timestamp of the day winning,
/// in ascending date order. Entries sharing a timestamp are told apart by
/// id, so the output does not depend on input order.
pub fn latest_per_day(entries: impl IntoIterator<Item = WeightEntry>) -> Vec<WeightEntry> {
    let mut days: BTreeMap<NaiveDate, WeightEntry> = BTreeMap::new();
    for entry in entries {
        match days.entry(entry.date.date_naive()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if (entry.date, entry.id) > (current.date, current.id) {
                    slot.insert(entry);
                }
            }
        }
    }
    days.into_values().collect()
}

/// Chart points, one per day.
pub fn weight_series(entries: &[WeightEntry]) -> Vec<(NaiveDate, f64)> {
    entries
        .iter()
        .map(|entry| (entry.date.date_naive(), entry.weight))
        .collect()
}
