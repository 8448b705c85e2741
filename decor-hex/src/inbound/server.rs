//! HTTP Server configuration and startup.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use decor_types::{DecorRepository, IdentityVerifier};

use super::auth::{require_admin, require_identity};
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, evict_idle_buckets, rate_limit_middleware};
use crate::DecorService;
use crate::openapi::ApiDoc;

/// HTTP Server for the booking API.
pub struct HttpServer<R: DecorRepository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R: DecorRepository> HttpServer<R> {
    /// Creates a new HTTP server with the default rate limit (100 req/min).
    pub fn new(service: DecorService<R>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            state: Arc::new(AppState { service, verifier }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(
        service: DecorService<R>,
        verifier: Arc<dyn IdentityVerifier>,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            state: Arc::new(AppState { service, verifier }),
            rate_limiter: Arc::new(RateLimiterState::per_minute(requests_per_minute)),
        }
    }

    /// Routes that need no token.
    fn public_routes() -> Router<Arc<AppState<R>>> {
        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .route(
                "/create-checkout-session",
                post(handlers::create_checkout_session::<R>),
            )
            .route("/payment-success", patch(handlers::payment_success::<R>))
            .route(
                "/bookings",
                post(handlers::create_booking::<R>).get(handlers::list_bookings::<R>),
            )
            .route(
                "/bookings/{id}",
                get(handlers::get_booking::<R>).delete(handlers::delete_booking::<R>),
            )
            .route(
                "/users",
                get(handlers::list_users::<R>).post(handlers::register_user::<R>),
            )
            .route("/users/{user}/role", get(handlers::get_user_role::<R>))
            .route("/services", get(handlers::list_services::<R>))
            .route("/services/{id}", get(handlers::get_service::<R>))
            .route("/all-decorators", get(handlers::top_decorators::<R>))
            .route(
                "/decorators",
                get(handlers::list_decorators::<R>).post(handlers::apply_decorator::<R>),
            )
    }

    /// Routes that need a verified identity.
    fn identity_routes(&self) -> Router<Arc<AppState<R>>> {
        Router::new()
            .route("/payments", get(handlers::list_payments::<R>))
            .route(
                "/users/profile",
                get(handlers::get_profile::<R>).patch(handlers::update_profile::<R>),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_identity::<R>,
            ))
    }

    /// Routes that need a verified identity with the admin role.
    fn admin_routes(&self) -> Router<Arc<AppState<R>>> {
        Router::new()
            .route("/users/{user}/role", patch(handlers::set_user_role::<R>))
            .route("/services", post(handlers::create_service::<R>))
            .route("/decorators/{id}", patch(handlers::review_decorator::<R>))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_admin::<R>,
            ))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_identity::<R>,
            ))
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Self::public_routes()
            .merge(self.identity_routes())
            .merge(self.admin_routes())
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let eviction = tokio::spawn(evict_idle_buckets(self.rate_limiter.clone()));

        let served = axum::serve(
            listener,
            self.router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        eviction.abort();
        served?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
