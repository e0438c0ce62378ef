use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{DedupedCompoundRecord, MULTI_VALUE_DELIMITER};
use crate::domain::Classification;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub class_summary: String,
    pub superclass_summary: String,
}

impl ClassificationSummary {
    pub fn is_empty(&self) -> bool {
        self.class_summary.is_empty() && self.superclass_summary.is_empty()
    }
}

/// Counts per class and per superclass, rendered as `"<count> <label>"`
/// tokens joined by `|`, most frequent first. Sentinel categories are not
/// counted.
pub fn summarize(records: &[DedupedCompoundRecord]) -> ClassificationSummary {
    ClassificationSummary {
        class_summary: frequency_string(records.iter().map(|r| &r.class)),
        superclass_summary: frequency_string(records.iter().map(|r| &r.superclass)),
    }
}

/// Descending count; equal counts keep the order labels were first seen.
pub fn frequency_string<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Classification>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for label in values.into_iter().filter_map(Classification::label) {
        match slots.get(label) {
            Some(slot) => counts[*slot].1 += 1,
            None => {
                slots.insert(label, counts.len());
                counts.push((label, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .iter()
        .map(|(label, count)| format!("{count} {label}"))
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_DELIMITER)
}
