//! Field schema: one typed variant per `(resource, operation)` pair.
//!
//! A node call is read from JSON shaped like the automation node's parameter
//! set:
//!
//! ```json
//! { "resource": "job", "operation": "get", "jobId": "J-100" }
//! ```
//!
//! Each variant carries only the fields legal for its pair, so a field that
//! does not apply cannot be requested. Collections (`additionalFields`,
//! `updateFields`, `searchFields`, `previewFields`) use the API's snake_case
//! field names; unrecognized keys are kept in `extra` and sent verbatim.

use std::fmt::{Formatter, Result as FmtResult};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routes::{Resource, Route};
use crate::{ConnectorError, ValidationError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resource", rename_all = "camelCase")]
pub enum NodeCall {
    Job(JobCall),
    Action(ActionCall),
    Itinerary(ItineraryCall),
    Location(LocationCall),
    Vehicle(VehicleCall),
    Operator(OperatorCall),
}

impl NodeCall {
    /// Parses a parameter set, rejecting unmapped pairs before field checks.
    pub fn from_value(value: Value) -> Result<Self, ConnectorError> {
        let tag = |name: &'static str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| {
                    ConnectorError::configuration(ValidationError::MissingField { field: name })
                })
        };
        let resource: Resource = tag("resource")?
            .parse()
            .map_err(ConnectorError::configuration)?;
        Route::lookup(resource, &tag("operation")?).map_err(ConnectorError::configuration)?;

        serde_json::from_value(value).map_err(|error| {
            ConnectorError::configuration(ValidationError::InvalidNodeConfig {
                message: error.to_string(),
            })
        })
    }

    pub const fn resource(&self) -> Resource {
        match self {
            Self::Job(_) => Resource::Job,
            Self::Action(_) => Resource::Action,
            Self::Itinerary(_) => Resource::Itinerary,
            Self::Location(_) => Resource::Location,
            Self::Vehicle(_) => Resource::Vehicle,
            Self::Operator(_) => Resource::Operator,
        }
    }

    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Job(call) => match call {
                JobCall::Ping => "ping",
                JobCall::Create(_) => "create",
                JobCall::Get(_) => "get",
                JobCall::Update(_) => "update",
                JobCall::Delete(_) => "delete",
                JobCall::Search(_) => "search",
                JobCall::Cancel(_) => "cancel",
            },
            Self::Action(call) => match call {
                ActionCall::Create(_) => "create",
                ActionCall::Get(_) => "get",
                ActionCall::GetAll(_) => "getAll",
                ActionCall::Update(_) => "update",
                ActionCall::Delete(_) => "delete",
            },
            Self::Itinerary(call) => match call {
                ItineraryCall::Create(_) => "create",
                ItineraryCall::Get(_) => "get",
                ItineraryCall::GetByDate(_) => "getByDate",
                ItineraryCall::GetByOperator(_) => "getByOperator",
                ItineraryCall::GetByVehicle(_) => "getByVehicle",
                ItineraryCall::Update(_) => "update",
                ItineraryCall::Delete(_) => "delete",
                ItineraryCall::PreviewRoute(_) => "previewRoute",
                ItineraryCall::AddJob(_) => "addJob",
                ItineraryCall::RemoveJob(_) => "removeJob",
                ItineraryCall::UpdateJobPosition(_) => "updateJobPosition",
            },
            Self::Location(call) => match call {
                LocationCall::Get(_) => "get",
                LocationCall::GetAll => "getAll",
            },
            Self::Vehicle(call) => match call {
                VehicleCall::Get(_) => "get",
                VehicleCall::GetAll => "getAll",
            },
            Self::Operator(call) => match call {
                OperatorCall::Get(_) => "get",
                OperatorCall::GetAll => "getAll",
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum JobCall {
    Ping,
    Create(JobCreate),
    Get(JobRef),
    Update(JobUpdate),
    Delete(JobRef),
    Search(JobSearch),
    Cancel(JobRef),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRef {
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreate {
    #[serde(default)]
    pub skip_staging: bool,
    pub first_name: String,
    /// Omitted from the body when empty.
    #[serde(default)]
    pub last_name: String,
    pub address: String,
    pub date: String,
    #[serde(default)]
    pub additional_fields: JobFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(default)]
    pub update_fields: JobFields,
}

/// Optional job attributes shared by create's additional fields and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFields {
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub balance_owed: Option<f64>,
    /// Required for sub-users.
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub customer_reference_id: Option<String>,
    /// Required for sub-users.
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub distribution_center_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    #[serde(default, deserialize_with = "optional_text", skip_serializing)]
    pub date: Option<String>,
    /// `"lat,lng"` text or a `[lat, lng]` array.
    #[serde(skip_serializing)]
    pub coordinates: Option<Value>,
    /// `{start, end}`, or that row wrapped as `{"timeFrame": [...]}`.
    #[serde(skip_serializing)]
    pub time_frame: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearch {
    pub search_fields: SearchFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFields {
    #[serde(skip_serializing)]
    pub start_date: String,
    #[serde(skip_serializing)]
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "staging")]
    Staging,
    #[serde(rename = "new")]
    New,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "incomplete")]
    Incomplete,
    #[serde(rename = "partially completed")]
    PartiallyCompleted,
    #[serde(rename = "damaged")]
    Damaged,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "cancelled")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ActionCall {
    Create(ActionCreate),
    Get(ActionRef),
    GetAll(JobRef),
    Update(ActionUpdate),
    Delete(ActionRef),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRef {
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(deserialize_with = "id_string")]
    pub action_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCreate {
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(rename = "type", alias = "actionType", default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub additional_fields: ActionFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionUpdate {
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(deserialize_with = "id_string")]
    pub action_id: String,
    #[serde(default)]
    pub update_fields: ActionFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFields {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Minutes.
    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub handle_time: Option<f64>,
    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub stop_location_id: Option<String>,

    /// JSON text or an already-structured object.
    #[serde(skip_serializing)]
    pub custom_fields: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    #[default]
    Delivery,
    Pickup,
    Return,
    Exchange,
    Installation,
    Service,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Undetermined,
    Completed,
    Incomplete,
    Damaged,
}

// ---------------------------------------------------------------------------
// Itinerary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ItineraryCall {
    Create(ItineraryCreate),
    Get(ItineraryRef),
    GetByDate(DateRef),
    GetByOperator(OperatorRef),
    GetByVehicle(VehicleRef),
    Update(ItineraryUpdate),
    Delete(ItineraryRef),
    PreviewRoute(PreviewRoute),
    AddJob(ItineraryJobRef),
    RemoveJob(ItineraryJobRef),
    UpdateJobPosition(JobPosition),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRef {
    #[serde(deserialize_with = "id_string")]
    pub itinerary_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateRef {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryCreate {
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub additional_fields: ItineraryFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryUpdate {
    #[serde(deserialize_with = "id_string")]
    pub itinerary_id: String,
    #[serde(default)]
    pub update_fields: ItineraryFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryFields {
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub start_location_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub end_location_id: Option<String>,

    #[serde(default, deserialize_with = "optional_text", skip_serializing)]
    pub date: Option<String>,
    /// Comma-separated text or an already-split array.
    #[serde(skip_serializing)]
    pub operator_ids: Option<Value>,
    /// JSON text or an already-structured array.
    #[serde(skip_serializing)]
    pub jobs: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRoute {
    pub preview_fields: PreviewFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewFields {
    #[serde(skip_serializing)]
    pub jobs: Value,
    #[serde(skip_serializing)]
    pub start_location: Option<Value>,
    #[serde(skip_serializing)]
    pub end_location: Option<Value>,
    #[serde(default, deserialize_with = "optional_text", skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryJobRef {
    #[serde(deserialize_with = "id_string")]
    pub itinerary_id: String,
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosition {
    #[serde(deserialize_with = "id_string")]
    pub itinerary_id: String,
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    /// Zero-based index within the itinerary.
    pub position: u32,
}

// ---------------------------------------------------------------------------
// Read-only lookups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum LocationCall {
    Get(LocationRef),
    GetAll,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum VehicleCall {
    Get(VehicleRef),
    GetAll,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperatorCall {
    Get(OperatorRef),
    GetAll,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRef {
    #[serde(deserialize_with = "id_string")]
    pub location_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRef {
    #[serde(deserialize_with = "id_string")]
    pub vehicle_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorRef {
    #[serde(deserialize_with = "id_string")]
    pub operator_id: String,
}

/// Identifiers arrive as strings or bare numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
            f.write_str("an identifier string or integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.trim().to_owned())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Free-text collection values; numbers and booleans keep their JSON text.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected text or a number, got {other}"
        ))),
    }
}

/// Numeric collection values, given as numbers or numeric text.
fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got '{text}'"))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_nested_resource_and_operation_tags() {
        let call = NodeCall::from_value(json!({
            "resource": "itinerary",
            "operation": "updateJobPosition",
            "itineraryId": "IT-1",
            "jobId": 42,
            "position": 3,
        }))
        .expect("valid call");

        assert_eq!(
            call,
            NodeCall::Itinerary(ItineraryCall::UpdateJobPosition(JobPosition {
                itinerary_id: String::from("IT-1"),
                job_id: String::from("42"),
                position: 3,
            }))
        );
        assert_eq!(call.resource(), Resource::Itinerary);
        assert_eq!(call.operation(), "updateJobPosition");
    }

    #[test]
    fn operation_names_match_endpoint_table() {
        let call = NodeCall::from_value(json!({ "resource": "job", "operation": "ping" }))
            .expect("ping takes no fields");
        assert!(Route::lookup(call.resource(), call.operation()).is_ok());
    }

    #[test]
    fn unmapped_pair_is_a_configuration_error() {
        let error = NodeCall::from_value(json!({ "resource": "vehicle", "operation": "delete" }))
            .expect_err("vehicles are read-only");

        assert!(error.is_configuration());
        assert_eq!(error.code(), "config.unmapped_operation");
    }

    #[test]
    fn missing_required_identifier_is_a_configuration_error() {
        let error = NodeCall::from_value(json!({ "resource": "action", "operation": "get", "jobId": "J-1" }))
            .expect_err("actionId is required");

        assert!(error.is_configuration());
        assert!(error.to_string().contains("actionId"));
    }

    #[test]
    fn unknown_collection_keys_land_in_extra() {
        let call = NodeCall::from_value(json!({
            "resource": "job",
            "operation": "update",
            "jobId": "J-1",
            "updateFields": {
                "city": "Ottawa",
                "coordinates": "45.1,-75.2",
                "priority": 2,
            },
        }))
        .expect("valid call");

        let NodeCall::Job(JobCall::Update(update)) = call else {
            panic!("expected job update");
        };
        assert_eq!(update.update_fields.city.as_deref(), Some("Ottawa"));
        assert_eq!(update.update_fields.coordinates, Some(json!("45.1,-75.2")));
        assert_eq!(update.update_fields.extra.get("priority"), Some(&json!(2)));
        assert!(!update.update_fields.extra.contains_key("coordinates"));
    }

    #[test]
    fn collection_values_accept_numbers_and_arrays() {
        let call = NodeCall::from_value(json!({
            "resource": "job",
            "operation": "update",
            "jobId": "J-1",
            "updateFields": {
                "postal_code": 12345,
                "reference_id": 77,
                "balance_owed": "12.50",
                "coordinates": [45.1, -75.2],
                "time_frame": "09:00-17:00",
            },
        }))
        .expect("loose collection values still parse");

        let NodeCall::Job(JobCall::Update(update)) = call else {
            panic!("expected job update");
        };
        let fields = update.update_fields;
        assert_eq!(fields.postal_code.as_deref(), Some("12345"));
        assert_eq!(fields.reference_id.as_deref(), Some("77"));
        assert_eq!(fields.balance_owed, Some(12.5));
        assert_eq!(fields.coordinates, Some(json!([45.1, -75.2])));
        assert_eq!(fields.time_frame, Some(json!("09:00-17:00")));
    }

    #[test]
    fn action_type_defaults_to_delivery_and_accepts_legacy_name() {
        let call = NodeCall::from_value(json!({
            "resource": "action",
            "operation": "create",
            "jobId": "J-1",
        }))
        .expect("type has a default");
        let NodeCall::Action(ActionCall::Create(create)) = call else {
            panic!("expected action create");
        };
        assert_eq!(create.action_type, ActionType::Delivery);

        let legacy = NodeCall::from_value(json!({
            "resource": "action",
            "operation": "create",
            "jobId": "J-1",
            "actionType": "pickup",
        }))
        .expect("legacy field name");
        let NodeCall::Action(ActionCall::Create(create)) = legacy else {
            panic!("expected action create");
        };
        assert_eq!(create.action_type, ActionType::Pickup);
    }

    #[test]
    fn search_status_uses_spaced_api_names() {
        let fields: SearchFields = serde_json::from_value(json!({
            "start_date": "2024-03-01",
            "end_date": "2024-03-31",
            "status": "partially completed",
        }))
        .expect("valid search fields");

        assert_eq!(fields.status, Some(JobStatus::PartiallyCompleted));
        assert_eq!(
            serde_json::to_value(&fields).expect("serializable"),
            json!({ "status": "partially completed" })
        );
    }
}
