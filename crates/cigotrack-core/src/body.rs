//! Request body shaping.
//!
//! Each builder reads one typed parameter set and produces the flat JSON
//! object the API expects. Transformed fields (dates, coordinates, time
//! frames, operator lists, embedded JSON) are shaped here; every other
//! collection entry is merged verbatim.
//!
//! Unusable optional values are dropped with a [`FieldWarning`] in lenient
//! mode and rejected as item errors in strict mode.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::fields::{
    ActionCreate, ActionFields, ItineraryCreate, ItineraryFields, JobCreate, JobFields,
    PreviewFields, SearchFields,
};
use crate::transform::{
    coordinates_from_value, normalize_date, parse_embedded_json, split_list, TimeFrame,
};
use crate::{ConnectorError, ValidationError};

/// A value that was left out of the outgoing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub field: &'static str,
    pub reason: String,
}

/// Payload ready for serialization plus the drops made while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltBody {
    pub payload: Map<String, Value>,
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyBuilder {
    strict: bool,
}

impl BodyBuilder {
    pub const fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub const fn lenient() -> Self {
        Self::new(false)
    }

    pub const fn strict() -> Self {
        Self::new(true)
    }

    pub const fn is_strict(self) -> bool {
        self.strict
    }

    pub fn job_create(self, create: &JobCreate) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.insert("skip_staging", Value::Bool(create.skip_staging));
        draft.insert("first_name", required_text("firstName", &create.first_name)?);
        if !create.last_name.trim().is_empty() {
            draft.insert("last_name", Value::String(create.last_name.clone()));
        }
        draft.insert("address", required_text("address", &create.address)?);
        draft.insert("date", required_date("date", &create.date)?);

        draft.job_fields(&create.additional_fields)?;
        Ok(draft.finish())
    }

    pub fn job_update(self, fields: &JobFields) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.job_fields(fields)?;
        Ok(draft.finish())
    }

    pub fn job_search(self, fields: &SearchFields) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.insert("start_date", required_date("start_date", &fields.start_date)?);
        draft.insert("end_date", required_date("end_date", &fields.end_date)?);
        draft.merge(fields)?;
        Ok(draft.finish())
    }

    pub fn action_create(self, create: &ActionCreate) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.insert("type", serde_json::to_value(create.action_type)?);
        draft.action_fields(&create.additional_fields)?;
        Ok(draft.finish())
    }

    pub fn action_update(self, fields: &ActionFields) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.action_fields(fields)?;
        Ok(draft.finish())
    }

    pub fn itinerary_create(self, create: &ItineraryCreate) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.insert("name", required_text("name", &create.name)?);
        draft.insert("date", required_date("date", &create.date)?);
        draft.itinerary_fields(&create.additional_fields)?;
        Ok(draft.finish())
    }

    pub fn itinerary_update(self, fields: &ItineraryFields) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        draft.itinerary_fields(fields)?;
        Ok(draft.finish())
    }

    pub fn preview_route(self, fields: &PreviewFields) -> Result<BuiltBody, ConnectorError> {
        let mut draft = Draft::new(self.strict);
        if is_blank(&fields.jobs) {
            return Err(ConnectorError::configuration(ValidationError::MissingField {
                field: "jobs",
            }));
        }
        draft.embedded_json("jobs", &fields.jobs)?;
        if let Some(start) = fields.start_location.as_ref().filter(|value| !is_blank(value)) {
            draft.embedded_json("start_location", start)?;
        }
        if let Some(end) = fields.end_location.as_ref().filter(|value| !is_blank(value)) {
            draft.embedded_json("end_location", end)?;
        }
        draft.merge(fields)?;
        Ok(draft.finish())
    }
}

struct Draft {
    strict: bool,
    payload: Map<String, Value>,
    warnings: Vec<FieldWarning>,
}

impl Draft {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            payload: Map::new(),
            warnings: Vec::new(),
        }
    }

    fn insert(&mut self, field: &str, value: Value) {
        self.payload.insert(field.to_owned(), value);
    }

    /// Serializes a typed collection and merges every entry it emits.
    ///
    /// Collection entries overwrite base fields of the same name. Transformed
    /// fields are never emitted here, so their shaped values are kept.
    fn merge<T: Serialize>(&mut self, fields: &T) -> Result<(), ConnectorError> {
        if let Value::Object(entries) = serde_json::to_value(fields)? {
            self.payload.extend(entries);
        }
        Ok(())
    }

    fn drop_field(&mut self, field: &'static str, reason: String) -> Result<(), ConnectorError> {
        if self.strict {
            return Err(ConnectorError::invalid_item(ValidationError::InvalidField {
                field,
                reason,
            }));
        }

        warn!(field, reason = %reason, "dropping unusable field from request body");
        self.warnings.push(FieldWarning { field, reason });
        Ok(())
    }

    fn optional_date(&mut self, field: &'static str, value: Option<&str>) -> Result<(), ConnectorError> {
        if let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) {
            let date = normalize_date(raw).ok_or_else(|| invalid_date(field, raw))?;
            self.insert(field, Value::String(date));
        }
        Ok(())
    }

    fn job_fields(&mut self, fields: &JobFields) -> Result<(), ConnectorError> {
        self.optional_date("date", fields.date.as_deref())?;

        if let Some(raw) = fields.coordinates.as_ref().filter(|value| !is_blank(value)) {
            match coordinates_from_value(raw) {
                Some(coordinates) => self.insert("coordinates", serde_json::to_value(coordinates)?),
                None => self.drop_field(
                    "coordinates",
                    format!("expected 'lat,lng' or [lat, lng], got {raw}"),
                )?,
            }
        }

        if let Some(raw) = fields.time_frame.as_ref().filter(|value| !is_blank(value)) {
            let (start, end) = time_frame_bounds(raw);
            match TimeFrame::new(start, end) {
                Some(frame) => self.insert("time_frame", serde_json::to_value(frame)?),
                None => self.drop_field(
                    "time_frame",
                    format!("expected HH:MM start and end, got {raw}"),
                )?,
            }
        }

        self.merge(fields)
    }

    fn action_fields(&mut self, fields: &ActionFields) -> Result<(), ConnectorError> {
        if let Some(custom) = fields.custom_fields.as_ref().filter(|value| !is_blank(value)) {
            self.embedded_json("custom_fields", custom)?;
        }
        self.merge(fields)
    }

    fn itinerary_fields(&mut self, fields: &ItineraryFields) -> Result<(), ConnectorError> {
        self.optional_date("date", fields.date.as_deref())?;

        match &fields.operator_ids {
            Some(Value::String(raw)) if !raw.trim().is_empty() => {
                let ids = split_list(raw).into_iter().map(Value::String).collect();
                self.insert("operator_ids", Value::Array(ids));
            }
            Some(list @ Value::Array(_)) => self.insert("operator_ids", list.clone()),
            Some(value) if !is_blank(value) => self.drop_field(
                "operator_ids",
                String::from("expected a comma-separated list of identifiers"),
            )?,
            _ => {}
        }

        if let Some(jobs) = fields.jobs.as_ref().filter(|value| !is_blank(value)) {
            self.embedded_json("jobs", jobs)?;
        }

        self.merge(fields)
    }

    /// Parses JSON text; values that are already structured pass through.
    fn embedded_json(&mut self, field: &'static str, value: &Value) -> Result<(), ConnectorError> {
        match value {
            Value::String(raw) => match parse_embedded_json(raw) {
                Some(parsed) => self.insert(field, parsed),
                None => self.drop_field(field, String::from("value is not valid JSON"))?,
            },
            other => self.insert(field, other.clone()),
        }
        Ok(())
    }

    fn finish(self) -> BuiltBody {
        BuiltBody {
            payload: self.payload,
            warnings: self.warnings,
        }
    }
}

/// `start`/`end` text from a flat row or the first `timeFrame` row.
fn time_frame_bounds(value: &Value) -> (Option<&str>, Option<&str>) {
    let row = match value.get("timeFrame") {
        Some(Value::Array(rows)) => rows.first(),
        Some(_) => None,
        None => Some(value),
    };
    let bound = |name: &str| row.and_then(|row| row.get(name)).and_then(Value::as_str);
    (bound("start"), bound("end"))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(raw) => raw.trim().is_empty(),
        _ => false,
    }
}

fn required_text(field: &'static str, value: &str) -> Result<Value, ConnectorError> {
    if value.trim().is_empty() {
        return Err(ConnectorError::configuration(ValidationError::MissingField { field }));
    }
    Ok(Value::String(value.to_owned()))
}

fn required_date(field: &'static str, value: &str) -> Result<Value, ConnectorError> {
    if value.trim().is_empty() {
        return Err(ConnectorError::configuration(ValidationError::MissingField { field }));
    }
    normalize_date(value)
        .map(Value::String)
        .ok_or_else(|| invalid_date(field, value))
}

fn invalid_date(field: &'static str, value: &str) -> ConnectorError {
    ConnectorError::invalid_item(ValidationError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}
