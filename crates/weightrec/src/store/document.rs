//! Stored document shape.
//!
//! Every entry is persisted as
//! `{ _id: ObjectId, date: "YYYY-MM-DD", weight: <number>, sports_activity: "Yes"|"No" }`.
//! Documents are converted to [`WeightEntry`] here and nowhere else, so
//! nothing above the store ever sees an untyped document.

use mongodb::bson::{doc, Bson, Document};

use crate::entry::{parse_date, EntryId, NewEntry, WeightEntry, DATE_FORMAT};
use crate::error::{Error, Result};

/// Identifier field.
pub const ID_FIELD: &str = "_id";
/// Date field.
pub const DATE_FIELD: &str = "date";
/// Weight field.
pub const WEIGHT_FIELD: &str = "weight";
/// Sports activity field.
pub const ACTIVITY_FIELD: &str = "sports_activity";

/// Reject weights that no store can represent as a plain number.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] for NaN and infinite values.
pub fn check_weight(weight: f64) -> Result<f64> {
    if weight.is_finite() {
        Ok(weight)
    } else {
        Err(Error::invalid_document(format!(
            "{WEIGHT_FIELD} must be a finite number, got {weight}"
        )))
    }
}

/// Build the document inserted for a new entry. The store assigns `_id`.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] if the weight is not finite.
pub fn to_document(entry: &NewEntry) -> Result<Document> {
    let weight = check_weight(entry.weight)?;
    Ok(doc! {
        DATE_FIELD: entry.date.format(DATE_FORMAT).to_string(),
        WEIGHT_FIELD: weight,
        ACTIVITY_FIELD: entry.sports_activity.as_str(),
    })
}

/// Filter matching a single entry by id.
#[must_use]
pub fn id_filter(id: &EntryId) -> Document {
    doc! { ID_FIELD: id.object_id() }
}

/// Update that overwrites only the weight field.
#[must_use]
pub fn set_weight(weight: f64) -> Document {
    doc! { "$set": { WEIGHT_FIELD: weight } }
}

/// Read a stored document back into an entry.
///
/// Integer weights written by other clients are widened to `f64`. Any other
/// deviation from the stored shape is rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] describing the first offending field.
pub fn from_document(document: &Document) -> Result<WeightEntry> {
    let id = match field(document, ID_FIELD)? {
        Bson::ObjectId(oid) => EntryId::from(*oid),
        other => return Err(wrong_type(ID_FIELD, "an ObjectId", other)),
    };

    let date = match field(document, DATE_FIELD)? {
        Bson::String(s) => parse_date(s)?,
        other => return Err(wrong_type(DATE_FIELD, "a YYYY-MM-DD string", other)),
    };

    #[allow(clippy::cast_precision_loss)]
    let weight = match field(document, WEIGHT_FIELD)? {
        Bson::Double(w) => check_weight(*w)?,
        Bson::Int32(w) => f64::from(*w),
        Bson::Int64(w) => *w as f64,
        other => return Err(wrong_type(WEIGHT_FIELD, "a number", other)),
    };

    let sports_activity = match field(document, ACTIVITY_FIELD)? {
        Bson::String(s) => s.parse()?,
        other => return Err(wrong_type(ACTIVITY_FIELD, "\"Yes\" or \"No\"", other)),
    };

    Ok(WeightEntry {
        id,
        date,
        weight,
        sports_activity,
    })
}

fn field<'a>(document: &'a Document, name: &str) -> Result<&'a Bson> {
    document
        .get(name)
        .ok_or_else(|| Error::invalid_document(format!("missing field '{name}'")))
}

fn wrong_type(name: &str, expected: &str, found: &Bson) -> Error {
    Error::invalid_document(format!(
        "field '{name}' must be {expected}, found {:?}",
        found.element_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::SportsActivity;
    use chrono::NaiveDate;
    use mongodb::bson::oid::ObjectId;

    fn stored(weight: Bson) -> Document {
        doc! {
            "_id": ObjectId::parse_str("65a1b2c3d4e5f6a7b8c9d0e1").unwrap(),
            "date": "2024-01-01",
            "weight": weight,
            "sports_activity": "Yes",
        }
    }

    #[test]
    fn test_to_document_shape() {
        let entry = NewEntry::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            80.0,
            SportsActivity::No,
        );
        let document = to_document(&entry).unwrap();

        assert!(document.get(ID_FIELD).is_none());
        assert_eq!(document.get_str(DATE_FIELD).unwrap(), "2024-01-01");
        assert_eq!(document.get_f64(WEIGHT_FIELD).unwrap(), 80.0);
        assert_eq!(document.get_str(ACTIVITY_FIELD).unwrap(), "No");
        assert_eq!(document.len(), 3);
    }

    #[test]
    fn test_to_document_rejects_non_finite_weight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for weight in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = to_document(&NewEntry::new(date, weight, SportsActivity::No)).unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_from_document() {
        let entry = from_document(&stored(Bson::Double(72.5))).unwrap();
        assert_eq!(entry.id.to_string(), "65a1b2c3d4e5f6a7b8c9d0e1");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(entry.weight, 72.5);
        assert_eq!(entry.sports_activity, SportsActivity::Yes);
    }

    #[test]
    fn test_from_document_widens_integer_weight() {
        assert_eq!(from_document(&stored(Bson::Int32(80))).unwrap().weight, 80.0);
        assert_eq!(from_document(&stored(Bson::Int64(81))).unwrap().weight, 81.0);
    }

    #[test]
    fn test_from_document_rejects_string_weight() {
        let err = from_document(&stored(Bson::String("80".to_string()))).unwrap_err();
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn test_from_document_missing_field() {
        let mut document = stored(Bson::Double(70.0));
        document.remove(ACTIVITY_FIELD);
        let err = from_document(&document).unwrap_err();
        assert!(err.to_string().contains("missing field 'sports_activity'"));
    }

    #[test]
    fn test_from_document_rejects_string_id() {
        let mut document = stored(Bson::Double(70.0));
        document.insert(ID_FIELD, "65a1b2c3d4e5f6a7b8c9d0e1");
        assert!(from_document(&document).unwrap_err().is_validation());
    }

    #[test]
    fn test_from_document_rejects_bad_date_and_activity() {
        let mut document = stored(Bson::Double(70.0));
        document.insert(DATE_FIELD, "1/1/2024");
        assert!(from_document(&document).is_err());

        let mut document = stored(Bson::Double(70.0));
        document.insert(ACTIVITY_FIELD, "maybe");
        assert!(from_document(&document).is_err());
    }

    #[test]
    fn test_id_filter_and_set_weight() {
        let id: EntryId = "65a1b2c3d4e5f6a7b8c9d0e1".parse().unwrap();
        let filter = id_filter(&id);
        assert_eq!(filter.get_object_id(ID_FIELD).unwrap(), id.object_id());

        let update = set_weight(75.5);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_f64(WEIGHT_FIELD).unwrap(), 75.5);
        assert_eq!(set.len(), 1);
    }
}
