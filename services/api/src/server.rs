use crate::cli::ServeArgs;
use crate::infra::{
    ApiCheckoutGateway, AppState, InMemoryApplicationStore, InMemoryPaymentStore,
    InMemoryTuitionStore, InMemoryUserStore, SandboxCheckoutGateway,
};
use crate::routes::with_service_routes;
use crate::stripe::StripeCheckoutClient;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use tutorhive::config::AppConfig;
use tutorhive::error::AppError;
use tutorhive::marketplace::applications::ApplicationService;
use tutorhive::marketplace::payments::{CheckoutConfig, PaymentService};
use tutorhive::marketplace::tuitions::TuitionService;
use tutorhive::marketplace::users::UserService;
use tutorhive::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let tuitions = Arc::new(TuitionService::new(Arc::new(
        InMemoryTuitionStore::default(),
    )));
    let application_store = Arc::new(InMemoryApplicationStore::default());
    let applications = Arc::new(ApplicationService::new(
        application_store.clone(),
        config.applications.reapply_scope,
    ));

    let gateway = Arc::new(match config.payments.secret_key.take() {
        Some(secret_key) => {
            info!("payment secret key configured; using the live checkout processor");
            ApiCheckoutGateway::Stripe(StripeCheckoutClient::new(
                secret_key,
                config.payments.processor_timeout(),
            ))
        }
        None => {
            info!("no payment secret key configured; using the sandbox checkout gateway");
            ApiCheckoutGateway::Sandbox(SandboxCheckoutGateway::default())
        }
    });
    let payments = Arc::new(PaymentService::new(
        Arc::new(InMemoryPaymentStore::default()),
        application_store,
        gateway,
        CheckoutConfig {
            currency: config.payments.currency.clone(),
            site_base_url: config.payments.site_base_url.clone(),
            processor_timeout: config.payments.processor_timeout(),
        },
    ));
    let users = Arc::new(UserService::new(Arc::new(InMemoryUserStore::default())));

    let app = with_service_routes(tuitions, applications, payments, users)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tuition marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
