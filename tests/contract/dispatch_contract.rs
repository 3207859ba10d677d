use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cigotrack_core::{
    BodyBuilder, CigoClient, Dispatcher, Environment, HttpClient, HttpError, HttpMethod,
    HttpRequest, HttpResponse, NodeCall, Resource, Route, ROUTES,
};
use cigotrack_tests::{credentials, AUTH_HEADER};
use serde_json::{json, Value};

#[derive(Default)]
struct RecordingHttpClient {
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn take(&self) -> Vec<HttpRequest> {
        std::mem::take(&mut *self.requests.lock().expect("lock"))
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        Box::pin(async { Ok(HttpResponse::ok_json(r#"{"ok":true}"#)) })
    }
}

struct RouteCase {
    node: Value,
    method: HttpMethod,
    path: &'static str,
    has_body: bool,
}

fn case(node: Value, method: HttpMethod, path: &'static str, has_body: bool) -> RouteCase {
    RouteCase {
        node,
        method,
        path,
        has_body,
    }
}

fn route_cases() -> Vec<RouteCase> {
    use HttpMethod::{Delete, Get, Post, Put};

    vec![
        case(json!({ "resource": "job", "operation": "ping" }), Get, "/ping", false),
        case(
            json!({
                "resource": "job", "operation": "create",
                "firstName": "Ada", "address": "1 Main St", "date": "2024-03-05",
            }),
            Post,
            "/jobs",
            true,
        ),
        case(json!({ "resource": "job", "operation": "get", "jobId": "J-100" }), Get, "/jobs/id/J-100", false),
        case(
            json!({ "resource": "job", "operation": "update", "jobId": "J-100", "updateFields": { "city": "Ottawa" } }),
            Put,
            "/jobs/id/J-100",
            true,
        ),
        case(json!({ "resource": "job", "operation": "delete", "jobId": "J-100" }), Delete, "/jobs/id/J-100", false),
        case(
            json!({
                "resource": "job", "operation": "search",
                "searchFields": { "start_date": "2024-03-01", "end_date": "2024-03-31" },
            }),
            Post,
            "/jobs/search",
            true,
        ),
        case(json!({ "resource": "job", "operation": "cancel", "jobId": "J-100" }), Post, "/jobs/id/J-100/cancel", false),
        case(
            json!({ "resource": "action", "operation": "create", "jobId": "J-100", "type": "pickup" }),
            Post,
            "/jobs/id/J-100/actions",
            true,
        ),
        case(
            json!({ "resource": "action", "operation": "get", "jobId": "J-100", "actionId": "A-1" }),
            Get,
            "/jobs/id/J-100/actions/A-1",
            false,
        ),
        case(json!({ "resource": "action", "operation": "getAll", "jobId": "J-100" }), Get, "/jobs/id/J-100/actions", false),
        case(
            json!({
                "resource": "action", "operation": "update", "jobId": "J-100", "actionId": "A-1",
                "updateFields": { "status": "completed" },
            }),
            Put,
            "/jobs/id/J-100/actions/A-1",
            true,
        ),
        case(
            json!({ "resource": "action", "operation": "delete", "jobId": "J-100", "actionId": "A-1" }),
            Delete,
            "/jobs/id/J-100/actions/A-1",
            false,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "create", "name": "Morning", "date": "2024-03-05" }),
            Post,
            "/itineraries",
            true,
        ),
        case(json!({ "resource": "itinerary", "operation": "get", "itineraryId": "IT-9" }), Get, "/itineraries/id/IT-9", false),
        case(
            json!({ "resource": "itinerary", "operation": "getByDate", "date": "2024-03-05" }),
            Get,
            "/itineraries/date/2024-03-05",
            false,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "getByOperator", "operatorId": "OP-2" }),
            Get,
            "/itineraries/operator/OP-2",
            false,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "getByVehicle", "vehicleId": "V-3" }),
            Get,
            "/itineraries/vehicle/V-3",
            false,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "update", "itineraryId": "IT-9", "updateFields": { "name": "Evening" } }),
            Put,
            "/itineraries/id/IT-9",
            true,
        ),
        case(json!({ "resource": "itinerary", "operation": "delete", "itineraryId": "IT-9" }), Delete, "/itineraries/id/IT-9", false),
        case(
            json!({ "resource": "itinerary", "operation": "previewRoute", "previewFields": { "jobs": "[\"J-1\"]" } }),
            Post,
            "/itineraries/action/previewRoute",
            true,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "addJob", "itineraryId": "IT-9", "jobId": "J-100" }),
            Post,
            "/itineraries/id/IT-9/job_id/J-100",
            false,
        ),
        case(
            json!({ "resource": "itinerary", "operation": "removeJob", "itineraryId": "IT-9", "jobId": "J-100" }),
            Delete,
            "/itineraries/id/IT-9/job_id/J-100",
            false,
        ),
        case(
            json!({
                "resource": "itinerary", "operation": "updateJobPosition",
                "itineraryId": "IT-9", "jobId": "J-100", "position": 3,
            }),
            Put,
            "/itineraries/id/IT-9/job_id/J-100/position/3",
            false,
        ),
        case(json!({ "resource": "location", "operation": "get", "locationId": "L-4" }), Get, "/locations/id/L-4", false),
        case(json!({ "resource": "location", "operation": "getAll" }), Get, "/locations", false),
        case(json!({ "resource": "vehicle", "operation": "get", "vehicleId": "V-3" }), Get, "/vehicles/id/V-3", false),
        case(json!({ "resource": "vehicle", "operation": "getAll" }), Get, "/vehicles", false),
        case(json!({ "resource": "operator", "operation": "get", "operatorId": "OP-2" }), Get, "/operators/id/OP-2", false),
        case(json!({ "resource": "operator", "operation": "getAll" }), Get, "/operators", false),
    ]
}

fn dispatcher(http: Arc<RecordingHttpClient>) -> Dispatcher {
    Dispatcher::new(
        CigoClient::with_http_client(credentials(Environment::Production), http),
        BodyBuilder::lenient(),
    )
}

#[test]
fn cases_cover_every_route() {
    let cases = route_cases();
    assert_eq!(cases.len(), ROUTES.len());

    for route in ROUTES {
        let covered = cases.iter().any(|case| {
            case.node["resource"] == route.resource.as_str() && case.node["operation"] == route.operation
        });
        assert!(covered, "no contract case for {} {}", route.resource, route.operation);
    }
}

#[tokio::test]
async fn dispatch_builds_exact_method_and_path_for_every_route() {
    let http = Arc::new(RecordingHttpClient::default());
    let dispatcher = dispatcher(http.clone());

    for case in route_cases() {
        let call = NodeCall::from_value(case.node.clone())
            .unwrap_or_else(|error| panic!("node {} failed to parse: {error}", case.node));
        let label = format!("{} {}", call.resource(), call.operation());

        dispatcher
            .dispatch(&call, 0)
            .await
            .unwrap_or_else(|error| panic!("{label}: dispatch failed: {error}"));

        let requests = http.take();
        assert_eq!(requests.len(), 1, "{label}: exactly one request");
        let request = &requests[0];
        assert_eq!(request.method, case.method, "{label}: method");
        assert_eq!(
            request.url,
            format!("https://app.cigotracker.com/api/v1{}", case.path),
            "{label}: url"
        );
        assert_eq!(request.body.is_some(), case.has_body, "{label}: body presence");
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some(AUTH_HEADER),
            "{label}: basic auth"
        );
        assert_eq!(
            request.headers.get("accept").map(String::as_str),
            Some("application/json"),
            "{label}: accept header"
        );
    }
}

#[test]
fn get_and_delete_routes_never_allow_a_body() {
    for route in ROUTES {
        if matches!(route.method, HttpMethod::Get | HttpMethod::Delete) {
            assert!(!route.method.allows_body(), "{} {}", route.resource, route.operation);
        }
    }
}

#[test]
fn unmapped_pairs_fail_as_configuration_errors() {
    for resource in [Resource::Location, Resource::Vehicle, Resource::Operator] {
        for operation in ["create", "update", "delete"] {
            assert!(Route::lookup(resource, operation).is_err());

            let error = NodeCall::from_value(json!({
                "resource": resource.as_str(),
                "operation": operation,
            }))
            .expect_err("unmapped pair must not parse");
            assert!(error.is_configuration(), "{resource} {operation}");
            assert_eq!(error.code(), "config.unmapped_operation");
        }
    }
}

#[test]
fn unknown_resource_is_a_configuration_error() {
    let error = NodeCall::from_value(json!({ "resource": "depot", "operation": "get" }))
        .expect_err("unknown resource");
    assert!(error.is_configuration());
    assert_eq!(error.code(), "config.unknown_resource");
}
