//! Resource tags and the endpoint table.
//!
//! Every `(resource, operation)` pair the connector supports maps to exactly
//! one HTTP method and path template.
//!
//! | Resource | Operations |
//! |----------|------------|
//! | `job` | ping, create, get, update, delete, search, cancel |
//! | `action` | create, get, getAll, update, delete |
//! | `itinerary` | create, get, getByDate, getByOperator, getByVehicle, update, delete, previewRoute, addJob, removeJob, updateJobPosition |
//! | `location` | get, getAll |
//! | `vehicle` | get, getAll |
//! | `operator` | get, getAll |

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http_client::HttpMethod;
use crate::ValidationError;

/// URL namespace and field schema selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Job,
    Action,
    Itinerary,
    Location,
    Vehicle,
    Operator,
}

impl Resource {
    pub const ALL: [Self; 6] = [
        Self::Job,
        Self::Action,
        Self::Itinerary,
        Self::Location,
        Self::Vehicle,
        Self::Operator,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Action => "action",
            Self::Itinerary => "itinerary",
            Self::Location => "location",
            Self::Vehicle => "vehicle",
            Self::Operator => "operator",
        }
    }

    /// Operations declared for this resource, in table order.
    pub fn operations(self) -> impl Iterator<Item = &'static str> {
        ROUTES
            .iter()
            .filter(move |route| route.resource == self)
            .map(|route| route.operation)
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "job" => Ok(Self::Job),
            "action" => Ok(Self::Action),
            "itinerary" => Ok(Self::Itinerary),
            "location" => Ok(Self::Location),
            "vehicle" => Ok(Self::Vehicle),
            "operator" => Ok(Self::Operator),
            other => Err(ValidationError::UnknownResource {
                value: other.to_owned(),
            }),
        }
    }
}

/// One row of the endpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub resource: Resource,
    pub operation: &'static str,
    pub method: HttpMethod,
    /// Path below `/api/v1`, with `{name}` placeholders.
    pub path: &'static str,
}

const fn route(
    resource: Resource,
    operation: &'static str,
    method: HttpMethod,
    path: &'static str,
) -> Route {
    Route {
        resource,
        operation,
        method,
        path,
    }
}

pub const ROUTES: &[Route] = &[
    route(Resource::Job, "ping", HttpMethod::Get, "/ping"),
    route(Resource::Job, "create", HttpMethod::Post, "/jobs"),
    route(Resource::Job, "get", HttpMethod::Get, "/jobs/id/{jobId}"),
    route(Resource::Job, "update", HttpMethod::Put, "/jobs/id/{jobId}"),
    route(Resource::Job, "delete", HttpMethod::Delete, "/jobs/id/{jobId}"),
    route(Resource::Job, "search", HttpMethod::Post, "/jobs/search"),
    route(Resource::Job, "cancel", HttpMethod::Post, "/jobs/id/{jobId}/cancel"),
    route(Resource::Action, "create", HttpMethod::Post, "/jobs/id/{jobId}/actions"),
    route(Resource::Action, "get", HttpMethod::Get, "/jobs/id/{jobId}/actions/{actionId}"),
    route(Resource::Action, "getAll", HttpMethod::Get, "/jobs/id/{jobId}/actions"),
    route(Resource::Action, "update", HttpMethod::Put, "/jobs/id/{jobId}/actions/{actionId}"),
    route(Resource::Action, "delete", HttpMethod::Delete, "/jobs/id/{jobId}/actions/{actionId}"),
    route(Resource::Itinerary, "create", HttpMethod::Post, "/itineraries"),
    route(Resource::Itinerary, "get", HttpMethod::Get, "/itineraries/id/{itineraryId}"),
    route(Resource::Itinerary, "getByDate", HttpMethod::Get, "/itineraries/date/{date}"),
    route(Resource::Itinerary, "getByOperator", HttpMethod::Get, "/itineraries/operator/{operatorId}"),
    route(Resource::Itinerary, "getByVehicle", HttpMethod::Get, "/itineraries/vehicle/{vehicleId}"),
    route(Resource::Itinerary, "update", HttpMethod::Put, "/itineraries/id/{itineraryId}"),
    route(Resource::Itinerary, "delete", HttpMethod::Delete, "/itineraries/id/{itineraryId}"),
    route(Resource::Itinerary, "previewRoute", HttpMethod::Post, "/itineraries/action/previewRoute"),
    route(Resource::Itinerary, "addJob", HttpMethod::Post, "/itineraries/id/{itineraryId}/job_id/{jobId}"),
    route(Resource::Itinerary, "removeJob", HttpMethod::Delete, "/itineraries/id/{itineraryId}/job_id/{jobId}"),
    route(
        Resource::Itinerary,
        "updateJobPosition",
        HttpMethod::Put,
        "/itineraries/id/{itineraryId}/job_id/{jobId}/position/{position}",
    ),
    route(Resource::Location, "get", HttpMethod::Get, "/locations/id/{locationId}"),
    route(Resource::Location, "getAll", HttpMethod::Get, "/locations"),
    route(Resource::Vehicle, "get", HttpMethod::Get, "/vehicles/id/{vehicleId}"),
    route(Resource::Vehicle, "getAll", HttpMethod::Get, "/vehicles"),
    route(Resource::Operator, "get", HttpMethod::Get, "/operators/id/{operatorId}"),
    route(Resource::Operator, "getAll", HttpMethod::Get, "/operators"),
];

impl Route {
    /// Finds the table row for a pair, failing fast on unmapped combinations.
    pub fn lookup(resource: Resource, operation: &str) -> Result<&'static Route, ValidationError> {
        ROUTES
            .iter()
            .find(|route| route.resource == resource && route.operation == operation)
            .ok_or_else(|| ValidationError::UnmappedOperation {
                resource: resource.as_str().to_owned(),
                operation: operation.to_owned(),
            })
    }

    /// Substitutes `{name}` placeholders literally.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, ValidationError> {
        let mut rendered = String::with_capacity(self.path.len() + 16);
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| ValidationError::InvalidNodeConfig {
                message: format!("malformed path template '{}'", self.path),
            })?;
            let name = &after[..close];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| ValidationError::InvalidNodeConfig {
                    message: format!(
                        "no value for placeholder '{name}' in {} {}",
                        self.resource, self.operation
                    ),
                })?;
            rendered.push_str(value);
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }

    pub fn placeholders(&self) -> Vec<&'static str> {
        self.path
            .split('{')
            .skip(1)
            .filter_map(|segment| segment.split_once('}').map(|(name, _)| name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_row_per_pair() {
        for (index, route) in ROUTES.iter().enumerate() {
            let duplicates = ROUTES[index + 1..]
                .iter()
                .filter(|other| {
                    other.resource == route.resource && other.operation == route.operation
                })
                .count();
            assert_eq!(duplicates, 0, "{} {} mapped twice", route.resource, route.operation);
        }
        assert_eq!(ROUTES.len(), 29);
    }

    #[test]
    fn lookup_rejects_unmapped_pair() {
        let error = Route::lookup(Resource::Vehicle, "delete").expect_err("must be unmapped");
        assert_eq!(
            error,
            ValidationError::UnmappedOperation {
                resource: String::from("vehicle"),
                operation: String::from("delete"),
            }
        );
    }

    #[test]
    fn render_substitutes_placeholders_literally() {
        let route = Route::lookup(Resource::Itinerary, "updateJobPosition").expect("mapped");
        let path = route
            .render(&[("itineraryId", "IT-9"), ("jobId", "J-100"), ("position", "3")])
            .expect("all placeholders provided");

        assert_eq!(path, "/itineraries/id/IT-9/job_id/J-100/position/3");
        assert_eq!(route.placeholders(), vec!["itineraryId", "jobId", "position"]);
    }

    #[test]
    fn render_reports_missing_placeholder_value() {
        let route = Route::lookup(Resource::Job, "get").expect("mapped");
        assert!(matches!(
            route.render(&[]),
            Err(ValidationError::InvalidNodeConfig { .. })
        ));
    }

    #[test]
    fn resource_operations_follow_table_order() {
        let operations: Vec<_> = Resource::Location.operations().collect();
        assert_eq!(operations, vec!["get", "getAll"]);
        assert_eq!("operator".parse::<Resource>(), Ok(Resource::Operator));
        assert!("route".parse::<Resource>().is_err());
    }
}
