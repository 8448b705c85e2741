//! # Decor Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Build the checkout gateway and identity verifier
//! - Create the booking service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use decor_gateway::{FirebaseVerifier, SharedSecretVerifier, StripeGateway};
use decor_hex::{DecorService, inbound::HttpServer};
use decor_repo::build_repo;
use decor_types::IdentityVerifier;

use config::{Config, IdentityConfig};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("decor-service"), provider))
}

fn build_verifier(identity: &IdentityConfig) -> Arc<dyn IdentityVerifier> {
    match identity {
        IdentityConfig::Firebase { project_id } => Arc::new(FirebaseVerifier::new(project_id)),
        IdentityConfig::SharedSecret { secret } => {
            tracing::warn!("Verifying tokens with a shared secret; not for production");
            Arc::new(SharedSecretVerifier::new(secret))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Export spans only when a collector is configured
    let otel = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,decor_app=debug,decor_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting decor server on port {}", config.port);
    tracing::info!("Using database: {}", config.redacted_database_url());

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let gateway = Arc::new(StripeGateway::with_api_base(
        &config.stripe_secret,
        &config.stripe_api_base,
    ));
    let verifier = build_verifier(&config.identity);

    // Create the booking service
    let service = DecorService::new(repo.clone(), gateway, &config.stripe_domain);

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, verifier, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    repo.close().await;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
