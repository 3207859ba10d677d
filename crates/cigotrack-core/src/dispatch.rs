//! Request dispatch: typed node call to concrete HTTP call.

use serde_json::{Map, Value};
use tracing::debug;

use crate::body::{BodyBuilder, BuiltBody, FieldWarning};
use crate::client::CigoClient;
use crate::fields::{
    ActionCall, ItineraryCall, JobCall, LocationCall, NodeCall, OperatorCall, VehicleCall,
};
use crate::http_client::HttpMethod;
use crate::routes::Route;
use crate::transform::normalize_date;
use crate::{ConnectorError, ValidationError};

/// Fully resolved call, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub route: &'static Route,
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Map<String, Value>>,
    pub warnings: Vec<FieldWarning>,
}

/// Raw response of one dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub response: Value,
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: CigoClient,
    builder: BodyBuilder,
}

impl Dispatcher {
    pub fn new(client: CigoClient, builder: BodyBuilder) -> Self {
        Self { client, builder }
    }

    pub const fn client(&self) -> &CigoClient {
        &self.client
    }

    /// Resolves method, path and body without touching the network.
    pub fn plan(&self, call: &NodeCall) -> Result<RequestPlan, ConnectorError> {
        let route = Route::lookup(call.resource(), call.operation())
            .map_err(ConnectorError::configuration)?;
        let builder = self.builder;

        let (params, built): (Vec<(&str, String)>, Option<BuiltBody>) = match call {
            NodeCall::Job(job) => match job {
                JobCall::Ping => (Vec::new(), None),
                JobCall::Create(create) => (Vec::new(), Some(builder.job_create(create)?)),
                JobCall::Get(job) | JobCall::Delete(job) | JobCall::Cancel(job) => {
                    (vec![("jobId", job.job_id.clone())], None)
                }
                JobCall::Update(update) => (
                    vec![("jobId", update.job_id.clone())],
                    Some(builder.job_update(&update.update_fields)?),
                ),
                JobCall::Search(search) => {
                    (Vec::new(), Some(builder.job_search(&search.search_fields)?))
                }
            },
            NodeCall::Action(action) => match action {
                ActionCall::Create(create) => (
                    vec![("jobId", create.job_id.clone())],
                    Some(builder.action_create(create)?),
                ),
                ActionCall::Get(action) | ActionCall::Delete(action) => (
                    vec![
                        ("jobId", action.job_id.clone()),
                        ("actionId", action.action_id.clone()),
                    ],
                    None,
                ),
                ActionCall::GetAll(job) => (vec![("jobId", job.job_id.clone())], None),
                ActionCall::Update(update) => (
                    vec![
                        ("jobId", update.job_id.clone()),
                        ("actionId", update.action_id.clone()),
                    ],
                    Some(builder.action_update(&update.update_fields)?),
                ),
            },
            NodeCall::Itinerary(itinerary) => match itinerary {
                ItineraryCall::Create(create) => {
                    (Vec::new(), Some(builder.itinerary_create(create)?))
                }
                ItineraryCall::Get(itinerary) | ItineraryCall::Delete(itinerary) => {
                    (vec![("itineraryId", itinerary.itinerary_id.clone())], None)
                }
                ItineraryCall::GetByDate(by_date) => (vec![("date", path_date(&by_date.date)?)], None),
                ItineraryCall::GetByOperator(operator) => {
                    (vec![("operatorId", operator.operator_id.clone())], None)
                }
                ItineraryCall::GetByVehicle(vehicle) => {
                    (vec![("vehicleId", vehicle.vehicle_id.clone())], None)
                }
                ItineraryCall::Update(update) => (
                    vec![("itineraryId", update.itinerary_id.clone())],
                    Some(builder.itinerary_update(&update.update_fields)?),
                ),
                ItineraryCall::PreviewRoute(preview) => {
                    (Vec::new(), Some(builder.preview_route(&preview.preview_fields)?))
                }
                ItineraryCall::AddJob(pair) | ItineraryCall::RemoveJob(pair) => (
                    vec![
                        ("itineraryId", pair.itinerary_id.clone()),
                        ("jobId", pair.job_id.clone()),
                    ],
                    None,
                ),
                ItineraryCall::UpdateJobPosition(position) => (
                    vec![
                        ("itineraryId", position.itinerary_id.clone()),
                        ("jobId", position.job_id.clone()),
                        ("position", position.position.to_string()),
                    ],
                    None,
                ),
            },
            NodeCall::Location(location) => match location {
                LocationCall::Get(location) => {
                    (vec![("locationId", location.location_id.clone())], None)
                }
                LocationCall::GetAll => (Vec::new(), None),
            },
            NodeCall::Vehicle(vehicle) => match vehicle {
                VehicleCall::Get(vehicle) => (vec![("vehicleId", vehicle.vehicle_id.clone())], None),
                VehicleCall::GetAll => (Vec::new(), None),
            },
            NodeCall::Operator(operator) => match operator {
                OperatorCall::Get(operator) => {
                    (vec![("operatorId", operator.operator_id.clone())], None)
                }
                OperatorCall::GetAll => (Vec::new(), None),
            },
        };

        for placeholder in route.placeholders() {
            let provided = params
                .iter()
                .find(|(name, _)| *name == placeholder)
                .is_some_and(|(_, value)| !value.trim().is_empty());
            if !provided {
                return Err(ConnectorError::configuration(ValidationError::MissingField {
                    field: placeholder,
                }));
            }
        }

        let borrowed: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        let path = route.render(&borrowed).map_err(ConnectorError::configuration)?;

        let (body, warnings) = match built {
            Some(built) if route.method.allows_body() => (Some(built.payload), built.warnings),
            Some(built) => (None, built.warnings),
            None => (None, Vec::new()),
        };

        Ok(RequestPlan {
            route,
            method: route.method,
            path,
            body,
            warnings,
        })
    }

    /// Plans and sends one call for the item at `item_index`.
    pub async fn dispatch(
        &self,
        call: &NodeCall,
        item_index: usize,
    ) -> Result<Dispatched, ConnectorError> {
        let plan = self.plan(call)?;
        self.send(plan, item_index).await
    }

    /// Sends an already planned call.
    pub async fn send(
        &self,
        plan: RequestPlan,
        item_index: usize,
    ) -> Result<Dispatched, ConnectorError> {
        debug!(
            item_index,
            resource = %plan.route.resource,
            operation = plan.route.operation,
            method = %plan.method,
            path = %plan.path,
            "dispatching"
        );

        let response = self
            .client
            .send(plan.method, &plan.path, plan.body.as_ref())
            .await?;

        Ok(Dispatched {
            response,
            warnings: plan.warnings,
        })
    }
}

fn path_date(raw: &str) -> Result<String, ConnectorError> {
    if raw.trim().is_empty() {
        return Err(ConnectorError::configuration(ValidationError::MissingField { field: "date" }));
    }
    normalize_date(raw).ok_or_else(|| {
        ConnectorError::invalid_item(ValidationError::InvalidDate {
            field: "date",
            value: raw.to_owned(),
        })
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::credentials::{Credentials, Environment};

    fn dispatcher() -> Dispatcher {
        let credentials =
            Credentials::new(Environment::Sandbox, "acct-1", "key-1").expect("valid credentials");
        Dispatcher::new(CigoClient::new(credentials), BodyBuilder::lenient())
    }

    fn plan(value: Value) -> Result<RequestPlan, ConnectorError> {
        dispatcher().plan(&NodeCall::from_value(value)?)
    }

    #[test]
    fn job_get_substitutes_identifier() {
        let plan = plan(json!({ "resource": "job", "operation": "get", "jobId": "J-100" }))
            .expect("plan builds");

        assert_eq!(plan.method, HttpMethod::Get);
        assert_eq!(plan.path, "/jobs/id/J-100");
        assert_eq!(plan.body, None);
    }

    #[test]
    fn get_by_date_normalizes_into_path() {
        let plan = plan(json!({
            "resource": "itinerary",
            "operation": "getByDate",
            "date": "2024-03-05T22:00:00Z",
        }))
        .expect("plan builds");

        assert_eq!(plan.path, "/itineraries/date/2024-03-05");
    }

    #[test]
    fn empty_identifier_is_a_configuration_error() {
        let error = plan(json!({ "resource": "job", "operation": "delete", "jobId": "" }))
            .expect_err("blank id");

        assert!(error.is_configuration());
        assert_eq!(error.code(), "field.missing");
    }

    #[test]
    fn update_carries_body_with_identifier_in_path() {
        let plan = plan(json!({
            "resource": "action",
            "operation": "update",
            "jobId": "J-1",
            "actionId": 7,
            "updateFields": { "status": "completed" },
        }))
        .expect("plan builds");

        assert_eq!(plan.method, HttpMethod::Put);
        assert_eq!(plan.path, "/jobs/id/J-1/actions/7");
        assert_eq!(
            plan.body.map(Value::Object),
            Some(json!({ "status": "completed" }))
        );
    }

    #[test]
    fn update_job_position_renders_numeric_position() {
        let plan = plan(json!({
            "resource": "itinerary",
            "operation": "updateJobPosition",
            "itineraryId": "IT-1",
            "jobId": "J-2",
            "position": 0,
        }))
        .expect("plan builds");

        assert_eq!(plan.path, "/itineraries/id/IT-1/job_id/J-2/position/0");
    }
}
