mod auth;
mod bookings;
mod db;
mod error;
mod fleet;
mod marketing;
mod models;
mod notify;
mod pricing;
mod query;
mod validation;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, RequireRole};
use auth::repository::{AdminRepository, TokenRepository};
use auth::token::TokenService;
use bookings::{BookingService, BookingsRepository};
use error::ApiError;
use fleet::VehicleRepository;
use marketing::{DraftRepository, RecoveryService};
use models::{CreateRoute, Route, UpdateRoute};
use notify::{EmailSender, HttpEmailClient, Notifier, RealtimePublisher};
use pricing::{DiscountConfigStore, PriceResolver, PricingAlerts};
use query::{QueryParams, QueryValidator};
use validator::Validate;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_route,
        get_route_by_id,
        update_route,
        delete_route,
    ),
    components(
        schemas(Route, CreateRoute, UpdateRoute)
    ),
    tags(
        (name = "routes", description = "Transfer route catalog endpoints")
    ),
    info(
        title = "Transport Booking API",
        version = "1.0.0",
        description = "RESTful API for Umrah transfer routes, fleet, pricing, and bookings",
        contact(
            name = "API Support",
            email = "support@transportbooking.example"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: Arc<AuthService>,
    pub discount_store: Arc<DiscountConfigStore>,
    pub resolver: Arc<PriceResolver>,
    pub alerts: PricingAlerts,
    pub booking_service: BookingService,
    pub vehicle_repo: VehicleRepository,
    pub draft_repo: DraftRepository,
    pub recovery: Arc<RecoveryService>,
}

/// Handler for POST /api/routes
/// Creates a new transfer route (admin)
#[utoipa::path(
    post,
    path = "/api/routes",
    request_body = CreateRoute,
    responses(
        (status = 201, description = "Route created successfully", body = Route),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Request validation failed"})),
        (status = 409, description = "Route already exists", body = String, example = json!({"error": "Route Madinah -> Makkah already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "routes"
)]
async fn create_route(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoute>,
) -> Result<(StatusCode, Json<Route>), ApiError> {
    tracing::debug!("Creating new route: {} -> {}", payload.origin, payload.destination);

    // Validate the request using validator crate
    payload.validate()?;

    // Check for duplicate origin/destination/category triple
    if db::check_duplicate_route(&state.db, &payload.origin, &payload.destination, &payload.category).await? {
        tracing::warn!(
            "Attempt to create duplicate route: {} -> {} ({})",
            payload.origin,
            payload.destination,
            payload.category
        );
        return Err(ApiError::Conflict {
            message: format!(
                "Route {} -> {} already exists in category '{}'",
                payload.origin, payload.destination, payload.category
            ),
        });
    }

    // Insert route into database
    let route = sqlx::query_as::<_, Route>(
        r#"
        INSERT INTO routes (origin, destination, distance, duration, category)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, origin, destination, distance, duration, category, is_active, created_at, updated_at
        "#,
    )
    .bind(&payload.origin)
    .bind(&payload.destination)
    .bind(&payload.distance)
    .bind(&payload.duration)
    .bind(&payload.category)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created route with id: {}", route.id);
    Ok((StatusCode::CREATED, Json(route)))
}

/// Handler for GET /api/routes with query parameters
/// Supports search, category/active filtering, sorting, and pagination
async fn get_routes_with_query(
    Query(params): Query<QueryParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Route>>, ApiError> {
    tracing::debug!("Fetching routes with query parameters: {:?}", params);

    // 1. Validate query parameters
    let validated = QueryValidator::validate(params)
        .map_err(|_e| ApiError::ValidationError(
            validator::ValidationErrors::new()
        ))?;

    // 2. Build SQL query
    let mut builder = query::SQLQueryBuilder::new();

    if let Some(search) = validated.search {
        builder.add_search_filter(&search);
    }
    if let Some(category) = validated.category {
        builder.add_category_filter(&category);
    }
    if validated.active_only {
        builder.add_active_filter();
    }

    if let Some(sort_field) = validated.sort_field {
        builder.set_sort(sort_field, validated.sort_order);
    }

    builder.set_pagination(validated.page, validated.limit);

    let (query_str, params) = builder.build();

    // 3. Execute query using sqlx with parameterized binding
    let mut query = sqlx::query_as::<_, Route>(&query_str);

    for param in params {
        query = query.bind(param);
    }

    let routes = query
        .fetch_all(&state.db)
        .await?;

    tracing::debug!("Query returned {} routes", routes.len());

    Ok(Json(routes))
}

/// Handler for GET /api/routes/:id
/// Retrieves a specific route by ID
#[utoipa::path(
    get,
    path = "/api/routes/{id}",
    params(
        ("id" = i32, Path, description = "Route ID")
    ),
    responses(
        (status = 200, description = "Route found", body = Route),
        (status = 404, description = "Route not found", body = String, example = json!({"error": "Route with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "routes"
)]
async fn get_route_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Route>, ApiError> {
    tracing::debug!("Fetching route with id: {}", id);

    let route = sqlx::query_as::<_, Route>(
        r#"
        SELECT id, origin, destination, distance, duration, category, is_active, created_at, updated_at
        FROM routes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Route with id {} not found", id);
        ApiError::NotFound {
            resource: "Route".to_string(),
            id: id.to_string(),
        }
    })?;

    Ok(Json(route))
}

/// Handler for PUT /api/routes/:id
/// Updates an existing route (admin)
#[utoipa::path(
    put,
    path = "/api/routes/{id}",
    params(
        ("id" = i32, Path, description = "Route ID")
    ),
    request_body = UpdateRoute,
    responses(
        (status = 200, description = "Route updated successfully", body = Route),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Request validation failed"})),
        (status = 404, description = "Route not found", body = String, example = json!({"error": "Route with id 1 not found"})),
        (status = 409, description = "Route already exists", body = String, example = json!({"error": "Route already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "routes"
)]
async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoute>,
) -> Result<Json<Route>, ApiError> {
    tracing::debug!("Updating route with id: {}", id);

    // Validate the request using validator crate
    payload.validate()?;

    // Transaction keeps the duplicate check and the update atomic
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Route>(
        "SELECT id, origin, destination, distance, duration, category, is_active, created_at, updated_at FROM routes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Route with id {} not found for update", id);
        ApiError::NotFound {
            resource: "Route".to_string(),
            id: id.to_string(),
        }
    })?;

    let new_origin = payload.origin.unwrap_or(existing.origin);
    let new_destination = payload.destination.unwrap_or(existing.destination);
    let new_category = payload.category.unwrap_or(existing.category);

    // If the identifying triple changes, check it stays unique
    let duplicate_exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM routes WHERE origin = $1 AND destination = $2 AND category = $3 AND id != $4)"
    )
    .bind(&new_origin)
    .bind(&new_destination)
    .bind(&new_category)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if duplicate_exists.unwrap_or(false) {
        tracing::warn!("Attempt to update route {} to duplicate pair: {} -> {}", id, new_origin, new_destination);
        // Transaction rolls back when tx is dropped
        return Err(ApiError::Conflict {
            message: format!(
                "Route {} -> {} already exists in category '{}'",
                new_origin, new_destination, new_category
            ),
        });
    }

    let updated_route = sqlx::query_as::<_, Route>(
        r#"
        UPDATE routes
        SET origin = $1,
            destination = $2,
            distance = $3,
            duration = $4,
            category = $5,
            is_active = $6,
            updated_at = NOW()
        WHERE id = $7
        RETURNING id, origin, destination, distance, duration, category, is_active, created_at, updated_at
        "#,
    )
    .bind(&new_origin)
    .bind(&new_destination)
    .bind(payload.distance.unwrap_or(existing.distance))
    .bind(payload.duration.unwrap_or(existing.duration))
    .bind(&new_category)
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated route with id: {}", id);
    Ok(Json(updated_route))
}

/// Handler for DELETE /api/routes/:id
/// Deletes an inactive route (admin); active routes are retired with
/// is_active = false first
#[utoipa::path(
    delete,
    path = "/api/routes/{id}",
    params(
        ("id" = i32, Path, description = "Route ID")
    ),
    responses(
        (status = 204, description = "Route deleted successfully"),
        (status = 404, description = "Route not found", body = String, example = json!({"error": "Route with id 1 not found"})),
        (status = 409, description = "Route is still active", body = String, example = json!({"error": "Deactivate the route before deleting it"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "routes"
)]
async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deleting route with id: {}", id);

    let is_active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM routes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    match is_active {
        None => {
            return Err(ApiError::NotFound {
                resource: "Route".to_string(),
                id: id.to_string(),
            });
        }
        Some(true) => {
            return Err(ApiError::Conflict {
                message: "Deactivate the route before deleting it".to_string(),
            });
        }
        Some(false) => {}
    }

    sqlx::query("DELETE FROM routes WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!("Successfully deleted route with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers, adds CORS, role gates, and
/// rate limiting on the public surface
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limit the public surface; key by peer IP
    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(5)
            .burst_size(20)
            .finish()
            .expect("valid governor configuration"),
    );

    // Public catalog, quoting, booking funnel, and draft capture
    let public_routes = Router::new()
        .route("/api/routes", get(get_routes_with_query))
        .route("/api/routes/:id", get(get_route_by_id))
        .route("/api/routes/:id/prices", get(pricing::handlers::list_route_prices_handler))
        .route("/api/vehicles", get(fleet::list_vehicles_handler))
        .route("/api/vehicles/:id", get(fleet::get_vehicle_handler))
        .route("/api/pricing/quote", post(pricing::handlers::quote_handler))
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/drafts", post(marketing::create_draft_handler))
        .route("/api/drafts/:id", patch(marketing::update_draft_handler))
        .layer(GovernorLayer {
            config: Box::leak(governor_conf),
        });

    // Back-office authentication
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/auth/me", get(auth::me_handler));

    // Booking desk (staff and above)
    let staff_routes = Router::new()
        .route("/api/bookings", get(bookings::list_bookings_handler))
        .route("/api/bookings/:booking_id", get(bookings::get_booking_handler))
        .route("/api/bookings/:booking_id/status", patch(bookings::update_booking_status_handler))
        .route("/api/bookings/:booking_id/payment", patch(bookings::update_booking_payment_handler))
        .route_layer(middleware::from_fn(|req: axum::extract::Request, next: middleware::Next| {
            RequireRole::staff().middleware(req, next)
        }));

    // Catalog, fleet, settings, and marketing administration (admin only)
    let admin_routes = Router::new()
        .route("/api/routes", post(create_route))
        .route("/api/routes/:id", put(update_route))
        .route("/api/routes/:id", delete(delete_route))
        .route("/api/routes/:id/prices/:vehicle_id", put(pricing::handlers::upsert_route_price_handler))
        .route("/api/vehicles", post(fleet::create_vehicle_handler))
        .route("/api/vehicles/:id", put(fleet::update_vehicle_handler))
        .route("/api/vehicles/:id", delete(fleet::deactivate_vehicle_handler))
        .route("/api/vehicles/:id/unavailable-dates", put(fleet::set_unavailable_dates_handler))
        .route("/api/bookings/:booking_id", delete(bookings::delete_booking_handler))
        .route("/api/admin/settings/discount", get(pricing::handlers::get_discount_handler))
        .route("/api/admin/settings/discount", put(pricing::handlers::update_discount_handler))
        .route("/api/admin/pricing/alerts", get(pricing::handlers::list_pricing_alerts_handler))
        .route("/api/admin/marketing/recovery-run", post(marketing::recovery_run_handler))
        .route_layer(middleware::from_fn(|req: axum::extract::Request, next: middleware::Next| {
            RequireRole::admin().middleware(req, next)
        }));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(auth_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .layer(cors)
        .with_state(state)
}

/// Build the shared application state from a pool and environment
async fn build_state(pool: PgPool, jwt_secret: String) -> AppState {
    // Optional email provider
    let email: Option<Arc<dyn EmailSender>> = match (
        std::env::var("EMAIL_API_URL"),
        std::env::var("EMAIL_API_KEY"),
    ) {
        (Ok(api_url), Ok(api_key)) => Some(Arc::new(HttpEmailClient::new(api_url, api_key))),
        _ => {
            tracing::warn!("EMAIL_API_URL/EMAIL_API_KEY not set; email channels disabled");
            None
        }
    };

    // Optional realtime publisher
    let realtime = match std::env::var("REDIS_URL") {
        Ok(redis_url) => match RealtimePublisher::connect(&redis_url).await {
            Ok(publisher) => Some(publisher),
            Err(e) => {
                tracing::warn!("Realtime publisher unavailable: {}", e);
                None
            }
        },
        Err(_) => {
            tracing::warn!("REDIS_URL not set; realtime channels disabled");
            None
        }
    };

    let admin_email = std::env::var("ADMIN_EMAIL").ok();
    let notifier = Arc::new(Notifier::new(email.clone(), realtime, admin_email));

    let discount_store = Arc::new(DiscountConfigStore::new(pool.clone()));
    let alerts = PricingAlerts::new(pool.clone());
    let resolver = Arc::new(PriceResolver::new(
        pool.clone(),
        discount_store.clone(),
        alerts.clone(),
    ));

    let booking_service = BookingService::new(
        BookingsRepository::new(pool.clone()),
        resolver.clone(),
        notifier,
    );

    let auth_service = Arc::new(AuthService::new(
        AdminRepository::new(pool.clone()),
        TokenRepository::new(pool.clone()),
        TokenService::new(jwt_secret),
    ));

    let draft_repo = DraftRepository::new(pool.clone());
    let recovery = Arc::new(RecoveryService::new(draft_repo.clone(), email));

    AppState {
        db: pool.clone(),
        auth_service,
        discount_store,
        resolver,
        alerts,
        booking_service,
        vehicle_repo: VehicleRepository::new(pool),
        draft_repo,
        recovery,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Transport Booking API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET")
        .expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = build_state(db_pool, jwt_secret).await;
    let app = create_router(state);

    // Start the Axum server; connect info feeds the per-IP rate limiter
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Transport Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

#[cfg(test)]
mod tests;
