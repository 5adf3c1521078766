//! JSON API for running searches and previewing budgets

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::GetawayError;
use crate::getaway_service::RecommendationSearch;
use crate::models::{Activity, DepartureDay, Recommendation, SearchCriteria, total_budget};

/// Body of `POST /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub departure_location: String,
    #[serde(default)]
    pub departure_day: DepartureDay,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    pub budget_per_traveler: f64,
    #[serde(default)]
    pub activity: Activity,
    #[serde(default)]
    pub weather_preference: Option<String>,
}

fn default_travelers() -> u32 {
    1
}

impl SearchRequest {
    pub fn into_criteria(self) -> crate::Result<SearchCriteria> {
        SearchCriteria::new(
            self.departure_location,
            self.departure_day,
            self.travelers,
            self.budget_per_traveler,
            self.activity,
            self.weather_preference,
        )
    }
}

/// Result of one search run as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    Ok {
        recommendations: Vec<Recommendation>,
        completed_at: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl SearchOutcome {
    fn from_result(result: crate::Result<Vec<Recommendation>>) -> Self {
        match result {
            Ok(recommendations) => SearchOutcome::Ok {
                recommendations,
                completed_at: Utc::now(),
            },
            Err(e) => SearchOutcome::Error {
                message: e.user_message(),
            },
        }
    }
}

/// Latest outcome of any search plus the number of running searches.
///
/// Searches write their outcome when they complete, the last one wins.
#[derive(Debug, Default)]
pub struct ResultSlot {
    latest: RwLock<Option<SearchOutcome>>,
    in_flight: AtomicUsize,
}

impl ResultSlot {
    /// Mark a search as running until the guard is dropped
    pub fn begin(self: &Arc<Self>) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            slot: Arc::clone(self),
        }
    }

    pub async fn store(&self, outcome: SearchOutcome) {
        *self.latest.write().await = Some(outcome);
    }

    pub async fn latest(&self) -> Option<SearchOutcome> {
        self.latest.read().await.clone()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the running-search count on every exit path
#[derive(Debug)]
pub struct BusyGuard {
    slot: Arc<ResultSlot>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.slot.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn RecommendationSearch>,
    pub slot: Arc<ResultSlot>,
    pub flight_budget_ratio: f64,
}

impl AppState {
    pub fn new(service: Arc<dyn RecommendationSearch>, flight_budget_ratio: f64) -> Self {
        Self {
            service,
            slot: Arc::new(ResultSlot::default()),
            flight_budget_ratio,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub busy: bool,
    pub in_flight: usize,
}

#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    pub per_traveler: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetPreview {
    pub travelers: u32,
    pub per_traveler: f64,
    pub total: f64,
    pub max_flight_price: u64,
}

#[derive(Debug, Deserialize)]
pub struct DepartureQuery {
    #[serde(default)]
    pub day: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeparturePreview {
    pub day: DepartureDay,
    pub departure: NaiveDateTime,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/recommendations", get(recommendations))
        .route("/status", get(status))
        .route("/budget", get(budget))
        .route("/departure", get(departure))
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> (StatusCode, Json<SearchOutcome>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            info!("Rejected search body: {}", rejection.body_text());
            let status = match &rejection {
                JsonRejection::BytesRejection(_) => rejection.status(),
                _ => StatusCode::BAD_REQUEST,
            };
            return (
                status,
                Json(SearchOutcome::Error {
                    message: GetawayError::validation("the search request is malformed")
                        .user_message(),
                }),
            );
        }
    };

    let criteria = match request.into_criteria() {
        Ok(criteria) => criteria,
        Err(e) => {
            info!("Rejected search request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchOutcome::Error {
                    message: e.user_message(),
                }),
            );
        }
    };

    // the run outlives the request: it owns the busy mark and the slot write
    let busy = state.slot.begin();
    let run = tokio::spawn(run_search(
        Arc::clone(&state.service),
        Arc::clone(&state.slot),
        criteria,
        busy,
    ));

    match run.await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)),
        Err(e) => {
            error!("Search task ended abnormally: {}", e);
            (
                StatusCode::OK,
                Json(SearchOutcome::from_result(Err(GetawayError::general(
                    "search task failed",
                )))),
            )
        }
    }
}

async fn run_search(
    service: Arc<dyn RecommendationSearch>,
    slot: Arc<ResultSlot>,
    criteria: SearchCriteria,
    _busy: BusyGuard,
) -> SearchOutcome {
    let now = Local::now().naive_local();
    let run = tokio::spawn(async move { service.search(&criteria, now).await });

    let outcome = match run.await {
        Ok(result) => {
            if let Err(e) = &result {
                warn!("Search failed: {}", e);
            }
            SearchOutcome::from_result(result)
        }
        Err(e) => {
            error!("Search task ended abnormally: {}", e);
            SearchOutcome::from_result(Err(GetawayError::general("search task failed")))
        }
    };

    slot.store(outcome.clone()).await;
    outcome
}

async fn recommendations(State(state): State<AppState>) -> Json<Option<SearchOutcome>> {
    Json(state.slot.latest().await)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let in_flight = state.slot.in_flight();
    Json(StatusResponse {
        busy: in_flight > 0,
        in_flight,
    })
}

async fn budget(
    State(state): State<AppState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetPreview>, StatusCode> {
    if !query.per_traveler.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let travelers = query.travelers.max(1);
    let per_traveler = query.per_traveler.max(1.0);
    let total = total_budget(travelers, per_traveler);

    Ok(Json(BudgetPreview {
        travelers,
        per_traveler,
        total,
        max_flight_price: (total * state.flight_budget_ratio).floor() as u64,
    }))
}

async fn departure(Query(query): Query<DepartureQuery>) -> Result<Json<DeparturePreview>, StatusCode> {
    let day = match query.day.as_deref() {
        None | Some("") => DepartureDay::default(),
        Some(text) => text.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
    };

    Ok(Json(DeparturePreview {
        day,
        departure: day.earliest_departure(Local::now().naive_local()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::time::Duration;
    use tower::ServiceExt;

    #[test]
    fn test_busy_guard_clears_on_drop() {
        let slot = Arc::new(ResultSlot::default());
        let first = slot.begin();
        let second = slot.begin();
        assert_eq!(slot.in_flight(), 2);

        drop(first);
        assert_eq!(slot.in_flight(), 1);
        drop(second);
        assert_eq!(slot.in_flight(), 0);
    }

    #[test]
    fn test_busy_guard_clears_on_panic() {
        let slot = Arc::new(ResultSlot::default());
        let inner = Arc::clone(&slot);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _busy = inner.begin();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(slot.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let slot = ResultSlot::default();
        assert!(slot.latest().await.is_none());

        slot.store(SearchOutcome::Error {
            message: "first".to_string(),
        })
        .await;
        slot.store(SearchOutcome::Error {
            message: "second".to_string(),
        })
        .await;

        assert_eq!(
            slot.latest().await,
            Some(SearchOutcome::Error {
                message: "second".to_string()
            })
        );
    }

    #[test]
    fn test_search_request_defaults() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"departureLocation":"Chicago","budgetPerTraveler":300}"#,
        )
        .unwrap();
        assert_eq!(request.travelers, 1);
        assert_eq!(request.departure_day, DepartureDay::Friday);
        assert_eq!(request.activity, Activity::Any);
        assert!(request.weather_preference.is_none());
    }

    struct SlowSearch;

    #[async_trait]
    impl RecommendationSearch for SlowSearch {
        async fn search(
            &self,
            _criteria: &SearchCriteria,
            _now: NaiveDateTime,
        ) -> crate::Result<Vec<Recommendation>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(vec![])
        }
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_outlives_dropped_request() {
        let state = AppState::new(Arc::new(SlowSearch), 0.4);
        let app = router(state.clone());

        let request = app.oneshot(search_request(
            r#"{"departureLocation":"Chicago","budgetPerTraveler":300}"#,
        ));
        let cut_off = tokio::time::timeout(Duration::from_millis(50), request).await;
        assert!(cut_off.is_err());
        assert_eq!(state.slot.in_flight(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(state.slot.in_flight(), 0);
        assert!(matches!(
            state.slot.latest().await,
            Some(SearchOutcome::Ok { .. })
        ));
    }

    #[rstest]
    #[case(r#"{"departureLocation":"Chicago","travelers":-1,"budgetPerTraveler":300}"#)]
    #[case(r#"{"departureLocation":"Chicago"}"#)]
    #[case(r#"{"departureLocation":"#)]
    #[tokio::test]
    async fn test_malformed_body_becomes_error_outcome(#[case] body: &str) {
        let state = AppState::new(Arc::new(SlowSearch), 0.4);
        let response = router(state.clone())
            .oneshot(search_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("malformed"));
        assert_eq!(state.slot.in_flight(), 0);
        assert!(state.slot.latest().await.is_none());
    }

    #[test]
    fn test_outcome_json_tags() {
        let json = serde_json::to_value(SearchOutcome::Error {
            message: "nope".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
    }
}
