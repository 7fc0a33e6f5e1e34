use crate::data::filter::EventFilter;
use crate::data::model::{Displacement, EventRecord, PassVector, END_X, X};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Event filter & vectorizer
// ---------------------------------------------------------------------------

/// Select `player`'s actions of type `action_type` and turn each into a
/// directed vector from its start to its end location.
///
/// Output order is input order. No match yields an empty vector. A selected
/// record without a start or end location is a [`SchemaError`]; records the
/// predicate rejects are not inspected.
pub fn filter_and_vectorize(
    events: &[EventRecord],
    player: &str,
    action_type: &str,
) -> Result<Vec<PassVector>, SchemaError> {
    vectorize_matching(events, &EventFilter::new(player, action_type))
}

/// Same as [`filter_and_vectorize`] with a prebuilt predicate.
pub fn vectorize_matching(
    events: &[EventRecord],
    filter: &EventFilter,
) -> Result<Vec<PassVector>, SchemaError> {
    let vectors = events
        .iter()
        .filter(|ev| filter.matches(ev))
        .map(to_vector)
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "{} {:?} actions by {:?} out of {} events",
        vectors.len(),
        filter.action_type,
        filter.player,
        events.len()
    );
    Ok(vectors)
}

fn to_vector(event: &EventRecord) -> Result<PassVector, SchemaError> {
    let missing = |field: &str| SchemaError::MissingField {
        row: event.row,
        field: field.to_string(),
    };
    let origin = event.location.ok_or_else(|| missing(X))?;
    let end = event.end_location.ok_or_else(|| missing(END_X))?;
    Ok(PassVector {
        origin,
        displacement: Displacement::between(origin, end),
        minute: event.minute,
        second: event.second,
        outcome: event.outcome.clone(),
    })
}
