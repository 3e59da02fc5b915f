//! Free-text narrowing of a collection.

/// Accessor for the searchable text of a record.
pub type SearchFields<R> = fn(&R) -> Vec<&str>;

/// Returns true when the query should leave the collection untouched.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

fn matches<R>(record: &R, needle: &str, fields: SearchFields<R>) -> bool {
    fields(record)
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Positions of matching records, in collection order.
///
/// A record matches when any of its search fields contains the query,
/// compared case-insensitively. A blank query matches every record.
pub fn filter_indices<R>(records: &[R], query: &str, fields: SearchFields<R>) -> Vec<usize> {
    if is_blank(query) {
        return (0..records.len()).collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(*record, &needle, fields))
        .map(|(index, _)| index)
        .collect()
}

pub fn filter_records<R: Clone>(records: &[R], query: &str, fields: SearchFields<R>) -> Vec<R> {
    filter_indices(records, query, fields)
        .into_iter()
        .map(|index| records[index].clone())
        .collect()
}
