//! JSON API over discovery, reminders and the admin dataset upload.
//!
//! - `GET  /api/v1/products/{id}/service-centers`  ranked centers for a stored product
//! - `GET  /api/v1/customers/{mobile}/reminders`   reminders for a customer's products
//! - `GET  /api/v1/alerts`                         due-soon feed across all products
//! - `GET  /api/v1/calendar`                       reminders grouped by due date
//! - `POST /api/v1/reminders/notify`               hand one reminder to the notifier
//! - `PUT  /api/v1/admin/products`                 bulk replace products (bearer token)
//! - `PUT  /api/v1/admin/service-centers`          bulk replace service centers (bearer token)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use carewise_core::config::{AppConfig, MAX_ALERT_WINDOW_DAYS};
use carewise_core::dataset;
use carewise_core::discovery::{
    DiscoveryRequest, DiscoveryResult, ServiceCenterCatalog, ServiceCenterDiscovery,
};
use carewise_core::domain::customer::normalize_mobile;
use carewise_core::domain::location::Coordinates;
use carewise_core::domain::product::{Product, ProductId};
use carewise_core::errors::{ApplicationError, InterfaceError, ValidationError};
use carewise_core::reminders::{
    self, CalendarWindow, LogNotifier, NotificationReceipt, Notifier, NotifyError, Reminder,
    ReminderFilter, ReminderKind,
};
use carewise_db::{
    DbPool, ProductRepository, RepositoryError, ServiceCenterRepository, SqlProductRepository,
    SqlServiceCenterRepository,
};

/// Service center storage usable both for admin replacement and discovery reads.
pub trait CenterStore: ServiceCenterRepository + ServiceCenterCatalog {}

impl<T> CenterStore for T where T: ServiceCenterRepository + ServiceCenterCatalog {}

/// Source of "now" for status and ranking computations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => at,
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    products: Arc<dyn ProductRepository>,
    centers: Arc<dyn CenterStore>,
    notifier: Arc<dyn Notifier>,
    config: Arc<AppConfig>,
    clock: Clock,
}

impl ApiState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        centers: Arc<dyn CenterStore>,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
    ) -> Self {
        Self { products, centers, notifier, config: Arc::new(config), clock: Clock::System }
    }

    /// SQL-backed repositories with the log notifier.
    pub fn for_pool(db_pool: DbPool, config: AppConfig) -> Self {
        Self::new(
            Arc::new(SqlProductRepository::new(db_pool.clone())),
            Arc::new(SqlServiceCenterRepository::new(db_pool)),
            Arc::new(LogNotifier),
            config,
        )
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub correlation_id: String,
}

type ApiFailure = (StatusCode, Json<ApiErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiFailure>;

/// Coordinates arrive as raw strings so malformed values get the JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReminders {
    pub customer_mobile: String,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertParams {
    pub window_days: Option<String>,
    pub consented_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFeed {
    pub window_days: u32,
    pub alerts: Vec<Reminder>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub month: Option<String>,
    pub week: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
    pub window: CalendarWindow,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub product_id: String,
    pub kind: ReminderKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceSummary {
    pub dataset: String,
    pub rows_written: usize,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/products/{id}/service-centers", get(discover_for_product))
        .route("/api/v1/customers/{mobile}/reminders", get(customer_reminders))
        .route("/api/v1/alerts", get(alerts))
        .route("/api/v1/calendar", get(calendar))
        .route("/api/v1/reminders/notify", post(notify))
        .route("/api/v1/admin/products", put(replace_products))
        .route("/api/v1/admin/service-centers", put(replace_service_centers))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn discover_for_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(params): Query<DiscoveryParams>,
) -> ApiResult<DiscoveryResult> {
    let correlation_id = new_correlation_id();

    let customer = parse_coordinates(&params).map_err(|e| reject(e.into(), &correlation_id))?;
    let product = find_product(&state, &id).await.map_err(|e| reject(e, &correlation_id))?;

    let now = state.clock.now();
    let request = DiscoveryRequest::for_product(&product, now.date_naive())
        .with_customer_coordinates(customer);
    let result = ServiceCenterDiscovery::new(state.centers.clone())
        .discover(&request, now)
        .await
        .map_err(|e| reject(e, &correlation_id))?;

    info!(
        event_name = "api.discovery.completed",
        correlation_id = %correlation_id,
        product_id = %product.id.0,
        centers = result.service_centers.len(),
        recommendations = result.recommendations.len(),
        "service center discovery served"
    );
    Ok(Json(result))
}

async fn customer_reminders(
    State(state): State<ApiState>,
    Path(mobile): Path<String>,
) -> ApiResult<CustomerReminders> {
    let correlation_id = new_correlation_id();

    let customer_mobile = normalize_mobile(&mobile).map_err(|e| reject(e.into(), &correlation_id))?;
    let products = state
        .products
        .list_for_customer(&customer_mobile)
        .await
        .map_err(|e| reject(storage(e), &correlation_id))?;

    let today = state.clock.now().date_naive();
    let reminders = reminders::project_all(&products, today);

    Ok(Json(CustomerReminders { customer_mobile, reminders }))
}

async fn alerts(
    State(state): State<ApiState>,
    Query(params): Query<AlertParams>,
) -> ApiResult<AlertFeed> {
    let correlation_id = new_correlation_id();

    let window_days = parse_window_days(params.window_days.as_deref(), &state.config)
        .map_err(|e| reject(e.into(), &correlation_id))?;
    let products = state.products.list_all().await.map_err(|e| reject(storage(e), &correlation_id))?;

    let today = state.clock.now().date_naive();
    let due_soon = reminders::filter_alerts(reminders::project_all(&products, today), window_days);
    let filter = ReminderFilter {
        consented_only: params.consented_only.unwrap_or(false),
        ..ReminderFilter::default()
    };

    Ok(Json(AlertFeed { window_days, alerts: filter.apply(due_soon) }))
}

async fn calendar(
    State(state): State<ApiState>,
    Query(params): Query<CalendarParams>,
) -> ApiResult<CalendarView> {
    let correlation_id = new_correlation_id();
    let today = state.clock.now().date_naive();

    let window = parse_calendar_window(&params, today).map_err(|e| reject(e.into(), &correlation_id))?;
    let products = state.products.list_all().await.map_err(|e| reject(storage(e), &correlation_id))?;

    let in_window = reminders::within_window(reminders::project_all(&products, today), &window)
        .map_err(|e| reject(e.into(), &correlation_id))?;
    let days = reminders::group_by_due_date(in_window)
        .into_iter()
        .map(|(date, reminders)| CalendarDay { date, reminders })
        .collect();

    Ok(Json(CalendarView { window, days }))
}

async fn notify(
    State(state): State<ApiState>,
    Json(body): Json<NotifyRequest>,
) -> Result<(StatusCode, Json<NotificationReceipt>), ApiFailure> {
    let correlation_id = new_correlation_id();

    let product =
        find_product(&state, &body.product_id).await.map_err(|e| reject(e, &correlation_id))?;
    let today = state.clock.now().date_naive();
    let reminder = reminders::project_reminders(&product, today)
        .into_iter()
        .find(|reminder| reminder.kind == body.kind)
        .ok_or_else(|| {
            reject(
                ApplicationError::NotFound(format!(
                    "product `{}` has no {} reminder",
                    product.id.0,
                    body.kind.as_str()
                )),
                &correlation_id,
            )
        })?;

    let receipt = state.notifier.notify(&reminder).await.map_err(|e| {
        let error = match e {
            NotifyError::ConsentRequired { .. } => {
                ValidationError::InvalidValue { field: "notification_consent", reason: e.to_string() }
                    .into()
            }
            NotifyError::Channel(_) => ApplicationError::Dependency(e.to_string()),
        };
        reject(error, &correlation_id)
    })?;

    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

async fn replace_products(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<ReplaceSummary> {
    let correlation_id = new_correlation_id();
    authorize(&state.config, &headers, &correlation_id)?;

    let products = dataset::product_rows_from_json(&body)
        .and_then(dataset::validate_products)
        .map_err(|e| reject(e.into(), &correlation_id))?;
    let rows_written =
        state.products.replace_all(products).await.map_err(|e| reject(storage(e), &correlation_id))?;

    info!(
        event_name = "api.admin.dataset_replaced",
        correlation_id = %correlation_id,
        dataset = "products",
        rows_written,
        "product dataset replaced"
    );
    Ok(Json(ReplaceSummary { dataset: "products".to_string(), rows_written }))
}

async fn replace_service_centers(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<ReplaceSummary> {
    let correlation_id = new_correlation_id();
    authorize(&state.config, &headers, &correlation_id)?;

    let centers = dataset::service_center_rows_from_json(&body)
        .and_then(dataset::validate_service_centers)
        .map_err(|e| reject(e.into(), &correlation_id))?;
    let rows_written =
        state.centers.replace_all(centers).await.map_err(|e| reject(storage(e), &correlation_id))?;

    info!(
        event_name = "api.admin.dataset_replaced",
        correlation_id = %correlation_id,
        dataset = "service_centers",
        rows_written,
        "service center dataset replaced"
    );
    Ok(Json(ReplaceSummary { dataset: "service_centers".to_string(), rows_written }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_product(state: &ApiState, id: &str) -> Result<Product, ApplicationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingField("product_id").into());
    }

    state
        .products
        .find_by_id(&ProductId(id.to_string()))
        .await
        .map_err(storage)?
        .ok_or_else(|| ApplicationError::NotFound(format!("product `{id}` does not exist")))
}

fn parse_coordinates(params: &DiscoveryParams) -> Result<Option<Coordinates>, ValidationError> {
    let lat = parse_degrees("lat", params.lat.as_deref())?;
    let lon = parse_degrees("lon", params.lon.as_deref())?;
    Coordinates::from_pair(lat, lon)
}

fn parse_degrees(field: &str, raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    raw.map(|value| {
        value.trim().parse::<f64>().map_err(|_| {
            ValidationError::MalformedCoordinates(format!("{field} `{value}` is not a number"))
        })
    })
    .transpose()
}

fn parse_window_days(raw: Option<&str>, config: &AppConfig) -> Result<u32, ValidationError> {
    let Some(raw) = raw else {
        return Ok(config.reminders.alert_window_days);
    };

    match raw.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_ALERT_WINDOW_DAYS).contains(&days) => Ok(days),
        _ => Err(ValidationError::InvalidValue {
            field: "window_days",
            reason: format!("`{raw}` must be a whole number in 1..={MAX_ALERT_WINDOW_DAYS}"),
        }),
    }
}

/// `month` or `week`, never both; the current month when neither is given.
fn parse_calendar_window(
    params: &CalendarParams,
    today: NaiveDate,
) -> Result<CalendarWindow, ValidationError> {
    match (params.month.as_deref(), params.week.as_deref()) {
        (Some(_), Some(_)) => Err(ValidationError::InvalidValue {
            field: "month",
            reason: "use either `month` or `week`, not both".to_string(),
        }),
        (Some(month), None) => CalendarWindow::parse_month(month),
        (None, Some(week)) => CalendarWindow::parse_week(week),
        (None, None) => Ok(CalendarWindow::month_of(today)),
    }
}

fn authorize(config: &AppConfig, headers: &HeaderMap, correlation_id: &str) -> Result<(), ApiFailure> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if config.admin_token_matches(token) => Ok(()),
        _ => {
            warn!(
                event_name = "api.admin.unauthorized",
                correlation_id = %correlation_id,
                token_presented = presented.is_some(),
                "admin request refused"
            );
            Err(interface_failure(InterfaceError::Unauthorized {
                message: "admin token missing or invalid".to_string(),
                correlation_id: correlation_id.to_string(),
            }))
        }
    }
}

fn storage(error: RepositoryError) -> ApplicationError {
    ApplicationError::Dependency(error.to_string())
}

fn reject(error: ApplicationError, correlation_id: &str) -> ApiFailure {
    interface_failure(error.into_interface(correlation_id))
}

fn interface_failure(error: InterfaceError) -> ApiFailure {
    let (status, message) = match &error {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
        InterfaceError::Unauthorized { .. } => {
            (StatusCode::UNAUTHORIZED, error.user_message().to_string())
        }
        InterfaceError::Internal { message, .. } => {
            error!(
                event_name = "api.request.failed",
                correlation_id = %error.correlation_id(),
                error = %message,
                "request failed on a dependency"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, error.user_message().to_string())
        }
    };

    (
        status,
        Json(ApiErrorBody { error: message, correlation_id: error.correlation_id().to_string() }),
    )
}

fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
