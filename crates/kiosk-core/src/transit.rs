//! Transit client: one GraphQL POST to the routing API for the kiosk's stop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DownstreamStop, KioskConfig};
use crate::departure::{DepartureRecord, DownstreamArrival, StopBoard};
use crate::error::UpstreamError;

pub const DEFAULT_TRANSIT_URL: &str =
    "https://api.digitransit.fi/routing/v1/routers/hsl/index/graphql";
pub const DEFAULT_SUBSCRIPTION_HEADER: &str = "digitransit-subscription-key";
pub const DEFAULT_DEPARTURE_COUNT: u32 = 5;

/// Fixed query text; the stop and count travel as variables.
const DEPARTURES_QUERY: &str = r#"
query Departures($stopId: String!, $count: Int!) {
  stop(id: $stopId) {
    name
    stoptimesWithoutPatterns(numberOfDepartures: $count) {
      scheduledDeparture
      realtimeDeparture
      realtime
      trip {
        routeShortName
        stoptimes {
          scheduledArrival
          realtimeArrival
          realtime
          stop {
            gtfsId
            name
          }
        }
      }
    }
  }
}
"#;

#[derive(Clone)]
pub struct TransitClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_header: String,
    api_key: String,
    stop_id: String,
    departure_count: u32,
    downstream_stops: Vec<DownstreamStop>,
}

impl TransitClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        stop_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            subscription_header: DEFAULT_SUBSCRIPTION_HEADER.to_string(),
            api_key: api_key.into(),
            stop_id: stop_id.into(),
            departure_count: DEFAULT_DEPARTURE_COUNT,
            downstream_stops: Vec::new(),
        })
    }

    pub fn from_config(config: &KioskConfig, api_key: String) -> Result<Self, UpstreamError> {
        Ok(Self::new(
            config.transit_url.as_str(),
            api_key,
            config.stop_id.as_str(),
            config.upstream_timeout(),
        )?
        .with_subscription_header(config.subscription_header.as_str())
        .with_departure_count(config.departure_count)
        .with_downstream_stops(config.downstream_stops.clone()))
    }

    pub fn with_subscription_header(mut self, header: impl Into<String>) -> Self {
        self.subscription_header = header.into();
        self
    }

    pub fn with_departure_count(mut self, count: u32) -> Self {
        self.departure_count = count;
        self
    }

    pub fn with_downstream_stops(mut self, stops: Vec<DownstreamStop>) -> Self {
        self.downstream_stops = stops;
        self
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    /// Fetches upcoming departures. Not retried; the caller decides what to show on failure.
    pub async fn fetch_departures(&self) -> Result<StopBoard, UpstreamError> {
        let body = GraphQlRequest {
            query: DEPARTURES_QUERY,
            variables: QueryVariables {
                stop_id: &self.stop_id,
                count: self.departure_count,
            },
        };

        let res = self
            .http
            .post(&self.endpoint)
            .header(self.subscription_header.as_str(), self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = res.status();
        let text = res.text().await.map_err(UpstreamError::from_transport)?;

        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16(), text));
        }

        let board = parse_board(&text, &self.downstream_stops)?;
        tracing::debug!(
            stop = %self.stop_id,
            departures = board.departures.len(),
            "transit departures fetched"
        );
        Ok(board)
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: QueryVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryVariables<'a> {
    stop_id: &'a str,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    stop: Option<StopPayload>,
}

#[derive(Debug, Deserialize)]
struct StopPayload {
    name: String,
    #[serde(rename = "stoptimesWithoutPatterns", default)]
    stoptimes: Vec<StoptimePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoptimePayload {
    scheduled_departure: i64,
    realtime_departure: Option<i64>,
    realtime: Option<bool>,
    trip: Option<TripPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripPayload {
    route_short_name: Option<String>,
    #[serde(default)]
    stoptimes: Vec<TripStoptime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripStoptime {
    scheduled_arrival: Option<i64>,
    realtime_arrival: Option<i64>,
    realtime: Option<bool>,
    stop: Option<StopRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopRef {
    gtfs_id: String,
}

impl TripStoptime {
    fn is_at(&self, stop_id: &str) -> bool {
        self.stop.as_ref().is_some_and(|s| s.gtfs_id == stop_id)
    }

    fn effective_arrival(&self) -> Option<i64> {
        match (self.realtime.unwrap_or(false), self.realtime_arrival) {
            (true, Some(realtime)) => Some(realtime),
            _ => self.scheduled_arrival,
        }
    }
}

/// Arrivals at the configured stops, matched by stop id. Stops the trip skips are left out.
fn downstream_arrivals(trip: &TripPayload, stops: &[DownstreamStop]) -> Vec<DownstreamArrival> {
    stops
        .iter()
        .filter_map(|wanted| {
            trip.stoptimes
                .iter()
                .find(|st| st.is_at(&wanted.stop_id))
                .and_then(TripStoptime::effective_arrival)
                .map(|arrival| DownstreamArrival {
                    label: wanted.label.clone(),
                    arrival,
                })
        })
        .collect()
}

fn parse_board(text: &str, downstream: &[DownstreamStop]) -> Result<StopBoard, UpstreamError> {
    let parsed: GraphQlResponse =
        serde_json::from_str(text).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    let stop = parsed.data.and_then(|d| d.stop);
    let Some(stop) = stop else {
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(UpstreamError::GraphQl(messages.join("; ")));
        }
        return Ok(StopBoard::empty());
    };

    let departures = stop
        .stoptimes
        .into_iter()
        .map(|st| DepartureRecord {
            scheduled_departure: st.scheduled_departure,
            realtime_departure: st.realtime_departure,
            is_realtime: st.realtime.unwrap_or(false),
            route_short_name: st.trip.as_ref().and_then(|t| t.route_short_name.clone()),
            downstream: st
                .trip
                .as_ref()
                .map(|t| downstream_arrivals(t, downstream))
                .unwrap_or_default(),
        })
        .collect();

    Ok(StopBoard {
        station_name: Some(stop.name),
        departures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::json;

    fn stops() -> Vec<DownstreamStop> {
        vec![
            DownstreamStop {
                label: "Otaniemi".to_string(),
                stop_id: "HSL:OTA".to_string(),
            },
            DownstreamStop {
                label: "Kamppi".to_string(),
                stop_id: "HSL:KAMPPI".to_string(),
            },
        ]
    }

    #[test]
    fn parses_stop_and_departures() {
        let text = json!({
            "data": { "stop": {
                "name": "Matinkylä",
                "stoptimesWithoutPatterns": [
                    { "scheduledDeparture": 28800, "realtimeDeparture": 28860, "realtime": true,
                      "trip": { "routeShortName": "M2", "stoptimes": [] } },
                    { "scheduledDeparture": 29400, "realtimeDeparture": 29400, "realtime": false,
                      "trip": null }
                ]
            }}
        })
        .to_string();

        let board = parse_board(&text, &[]).unwrap();
        assert_eq!(board.station_name.as_deref(), Some("Matinkylä"));
        assert_eq!(board.departures.len(), 2);
        assert_eq!(board.departures[0].effective_departure(), 28860);
        assert_eq!(board.departures[0].route_short_name.as_deref(), Some("M2"));
        assert_eq!(board.departures[1].effective_departure(), 29400);
        assert!(board.departures[1].route_short_name.is_none());
    }

    #[test]
    fn missing_stop_is_empty_not_error() {
        let board = parse_board(r#"{"data":{"stop":null}}"#, &[]).unwrap();
        assert!(board.is_empty());
        assert!(board.station_name.is_none());

        let board = parse_board(r#"{"data":{}}"#, &[]).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn graphql_errors_without_stop_fail() {
        let text = r#"{"data":null,"errors":[{"message":"bad stop id"}]}"#;
        match parse_board(text, &[]) {
            Err(UpstreamError::GraphQl(msg)) => assert_eq!(msg, "bad stop id"),
            other => panic!("expected GraphQl error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_payload_fails() {
        assert!(matches!(
            parse_board("<html>oops</html>", &[]),
            Err(UpstreamError::Malformed(_))
        ));
        assert!(matches!(
            parse_board(r#"{"data":{"stop":{"name":"X","stoptimesWithoutPatterns":[{"realtime":true}]}}}"#, &[]),
            Err(UpstreamError::Malformed(_))
        ));
    }

    #[test]
    fn downstream_stops_match_by_id_not_position() {
        // Kamppi listed before Otaniemi, with an extra stop in between.
        let text = json!({
            "data": { "stop": {
                "name": "Matinkylä",
                "stoptimesWithoutPatterns": [{
                    "scheduledDeparture": 28800, "realtimeDeparture": 28800, "realtime": false,
                    "trip": { "routeShortName": "M1", "stoptimes": [
                        { "scheduledArrival": 30000, "realtimeArrival": 30060, "realtime": true,
                          "stop": { "gtfsId": "HSL:KAMPPI", "name": "Kamppi" } },
                        { "scheduledArrival": 29500, "realtimeArrival": 29500, "realtime": false,
                          "stop": { "gtfsId": "HSL:OTHER", "name": "Other" } },
                        { "scheduledArrival": 29400, "realtimeArrival": 29460, "realtime": false,
                          "stop": { "gtfsId": "HSL:OTA", "name": "Otaniemi" } }
                    ]}
                }]
            }}
        })
        .to_string();

        let board = parse_board(&text, &stops()).unwrap();
        let downstream = &board.departures[0].downstream;
        assert_eq!(
            downstream,
            &vec![
                DownstreamArrival { label: "Otaniemi".to_string(), arrival: 29400 },
                DownstreamArrival { label: "Kamppi".to_string(), arrival: 30060 },
            ]
        );
    }

    #[test]
    fn downstream_stop_not_on_trip_is_skipped() {
        let text = json!({
            "data": { "stop": {
                "name": "Matinkylä",
                "stoptimesWithoutPatterns": [{
                    "scheduledDeparture": 28800, "realtime": false,
                    "trip": { "stoptimes": [
                        { "scheduledArrival": 29400, "stop": { "gtfsId": "HSL:OTA" } }
                    ]}
                }]
            }}
        })
        .to_string();

        let board = parse_board(&text, &stops()).unwrap();
        assert_eq!(board.departures[0].downstream.len(), 1);
        assert_eq!(board.departures[0].downstream[0].label, "Otaniemi");
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/graphql", addr)
    }

    #[tokio::test]
    async fn sends_key_header_and_stop_variable() {
        let app = Router::new().route(
            "/graphql",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers["digitransit-subscription-key"], "secret");
                assert_eq!(body["variables"]["stopId"], "HSL:2314601");
                assert_eq!(body["variables"]["count"], 3);
                assert!(body["query"].as_str().unwrap().contains("stoptimesWithoutPatterns"));
                Json(json!({ "data": { "stop": {
                    "name": "Matinkylä",
                    "stoptimesWithoutPatterns": [
                        { "scheduledDeparture": 28800, "realtimeDeparture": 28800, "realtime": false }
                    ]
                }}}))
            }),
        );
        let url = spawn(app).await;

        let client = TransitClient::new(url, "secret", "HSL:2314601", Duration::from_secs(5))
            .unwrap()
            .with_departure_count(3);
        let board = client.fetch_departures().await.unwrap();
        assert_eq!(board.departures.len(), 1);
        assert_eq!(board.departures[0].clock(), "08:00");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/graphql",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = spawn(app).await;

        let client = TransitClient::new(url, "secret", "HSL:2314601", Duration::from_secs(5)).unwrap();
        match client.fetch_departures().await {
            Err(UpstreamError::Status(500, body)) => assert_eq!(body, "boom"),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let url = spawn(app).await;

        let client =
            TransitClient::new(url, "secret", "HSL:2314601", Duration::from_millis(100)).unwrap();
        assert!(matches!(
            client.fetch_departures().await,
            Err(UpstreamError::Timeout)
        ));
    }
}
