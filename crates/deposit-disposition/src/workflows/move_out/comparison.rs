use std::collections::HashMap;

use serde::Serialize;

use super::domain::InspectionItem;

/// Move-in and move-out observations of the same (room, item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub room: String,
    pub item: String,
    pub move_in: Option<InspectionItem>,
    pub move_out: Option<InspectionItem>,
    pub condition_changed: bool,
    pub damage_added: bool,
    pub item_removed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub rows: usize,
    pub condition_changed: usize,
    pub damage_added: usize,
    pub items_removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectionComparison {
    pub comparison: Vec<ComparisonRow>,
    pub missing_move_in: bool,
    pub missing_move_out: bool,
    pub summary: ComparisonSummary,
}

/// Diff two inspection snapshots keyed by (room, item).
///
/// A missing snapshot is an expected state; it yields an empty comparison with the matching
/// flag set. Rows are sorted by room then item, byte-wise, regardless of input order.
pub fn compare_inspections<'a>(
    move_in: Option<&'a [InspectionItem]>,
    move_out: Option<&'a [InspectionItem]>,
) -> InspectionComparison {
    let (move_in, move_out) = match (move_in, move_out) {
        (Some(move_in), Some(move_out)) => (move_in, move_out),
        (move_in, move_out) => {
            return InspectionComparison {
                missing_move_in: move_in.is_none(),
                missing_move_out: move_out.is_none(),
                ..InspectionComparison::default()
            }
        }
    };

    // Duplicate keys: the last move-in record wins.
    let mut baseline: HashMap<(&'a str, &'a str), &'a InspectionItem> = move_in
        .iter()
        .map(|record| ((record.room.as_str(), record.item.as_str()), record))
        .collect();

    let mut rows: Vec<ComparisonRow> = Vec::with_capacity(move_out.len() + baseline.len());

    for observed in move_out {
        let matched = baseline.remove(&(observed.room.as_str(), observed.item.as_str()));
        let condition_changed = match matched {
            Some(before) => before.condition != observed.condition,
            None => true,
        };
        let damage_added = observed.has_damage && !matched.is_some_and(|before| before.has_damage);

        rows.push(ComparisonRow {
            room: observed.room.clone(),
            item: observed.item.clone(),
            move_in: matched.cloned(),
            move_out: Some(observed.clone()),
            condition_changed,
            damage_added,
            item_removed: false,
        });
    }

    rows.extend(baseline.into_values().map(|before| ComparisonRow {
        room: before.room.clone(),
        item: before.item.clone(),
        move_in: Some(before.clone()),
        move_out: None,
        condition_changed: true,
        damage_added: false,
        item_removed: true,
    }));

    rows.sort_by(|a, b| (&a.room, &a.item).cmp(&(&b.room, &b.item)));

    let summary = ComparisonSummary {
        rows: rows.len(),
        condition_changed: rows.iter().filter(|row| row.condition_changed).count(),
        damage_added: rows.iter().filter(|row| row.damage_added).count(),
        items_removed: rows.iter().filter(|row| row.item_removed).count(),
    };

    InspectionComparison {
        comparison: rows,
        missing_move_in: false,
        missing_move_out: false,
        summary,
    }
}
