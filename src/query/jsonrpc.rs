//! JSON-RPC 2.0 surface of the schedule query.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    core::schedule::Schedule,
    prelude::*,
    query::{
        service::{ScheduleEntry, ScheduleQueryService},
        timedata::Timedata,
    },
};

pub const GET_SCHEDULE: &str = "getSchedule";

const VERSION: &str = "2.0";

/// Standard JSON-RPC error codes.
pub mod error_code {
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[derive(Debug, Deserialize)]
pub struct Request {
    pub jsonrpc: String,

    #[serde(default)]
    pub id: Value,

    pub method: String,
}

#[derive(Debug, Serialize)]
#[must_use]
pub struct Response {
    jsonrpc: &'static str,
    id: Value,

    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

#[derive(Debug, Serialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize)]
struct GetScheduleResult<'a> {
    schedule: &'a [ScheduleEntry],
}

impl Response {
    const fn result(id: Value, result: Value) -> Self {
        Self { jsonrpc: VERSION, id, outcome: Outcome::Result(result) }
    }

    const fn error(id: Value, code: i64, message: String) -> Self {
        Self { jsonrpc: VERSION, id, outcome: Outcome::Error(ErrorObject { code, message }) }
    }
}

impl<T: Timedata> ScheduleQueryService<T> {
    /// Answer a request, the failures are reported as JSON-RPC errors.
    #[instrument(skip_all, fields(method = %request.method))]
    pub fn handle(
        &self,
        request: Request,
        schedule: Option<&Schedule>,
        now: DateTime<Local>,
    ) -> Response {
        if request.jsonrpc != VERSION {
            return Response::error(
                request.id,
                error_code::INVALID_REQUEST,
                format!("unsupported JSON-RPC version `{}`", request.jsonrpc),
            );
        }
        match request.method.as_str() {
            GET_SCHEDULE => {
                let entries = self.get_schedule(schedule, now);
                match serde_json::to_value(GetScheduleResult { schedule: &entries }) {
                    Ok(result) => Response::result(request.id, result),
                    Err(error) => {
                        error!("failed to serialize the schedule: {error:#}");
                        Response::error(request.id, error_code::INTERNAL_ERROR, error.to_string())
                    }
                }
            }
            method => {
                warn!("unhandled method");
                Response::error(
                    request.id,
                    error_code::METHOD_NOT_FOUND,
                    format!("unhandled method `{method}`"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::{
        core::{control_mode::ControlMode, interval::Interval},
        query::timedata::HistoricalSample,
        quantity::{energy::WattHours, power::Watts, rate::KilowattHourRate},
    };

    struct NoHistory;

    impl Timedata for NoHistory {
        fn query_history(&self, _interval: Interval) -> Result<Vec<HistoricalSample>> {
            Ok(Vec::new())
        }
    }

    fn request(value: Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_get_schedule() {
        let schedule = Schedule::builder()
            .control_mode(ControlMode::ChargeFromGrid)
            .ess_usable_energy(WattHours(10_000))
            .ess_initial_energy(WattHours(5_000))
            .ess_max_discharge_power(Watts(4_000))
            .ess_max_charge_power(Watts(4_000))
            .max_charge_power_from_grid(Watts(4_000))
            .prices(&[Some(KilowattHourRate(0.25))])
            .consumption(&[Some(WattHours(100))])
            .production(&[Some(WattHours(400))])
            .create();
        let response = ScheduleQueryService::new(NoHistory).handle(
            request(json!({"jsonrpc": "2.0", "id": "42", "method": "getSchedule", "params": {}})),
            Some(&schedule),
            now(),
        );
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": "42",
                "result": {
                    "schedule": [{
                        "timestamp": now().to_utc(),
                        "price": 0.25,
                        "state": 2,
                    }],
                },
            }),
        );
    }

    #[test]
    fn test_empty_schedule() {
        let response = ScheduleQueryService::new(NoHistory).handle(
            request(json!({"jsonrpc": "2.0", "id": 1, "method": "getSchedule"})),
            None,
            now(),
        );
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {"schedule": []}}),
        );
    }

    #[test]
    fn test_unknown_method() {
        let response = ScheduleQueryService::new(NoHistory).handle(
            request(json!({"jsonrpc": "2.0", "id": 1, "method": "setSchedule"})),
            None,
            now(),
        );
        let response = serde_json::to_value(response).unwrap();
        assert_eq!(response["error"]["code"], json!(-32601));
        assert!(response.get("result").is_none());
    }

    #[test]
    fn test_wrong_version() {
        let response = ScheduleQueryService::new(NoHistory).handle(
            request(json!({"jsonrpc": "1.0", "id": 1, "method": "getSchedule"})),
            None,
            now(),
        );
        let response = serde_json::to_value(response).unwrap();
        assert_eq!(response["error"]["code"], json!(-32600));
    }
}
