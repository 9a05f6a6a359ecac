use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use policyhub_core::{
    chat::{ChatService, ChatServiceTrait},
    dashboard::{DashboardService, DashboardServiceTrait},
    events::{DomainEventSink, Mediator},
    payments::{PaymentService, PaymentServiceTrait},
    policies::{PolicyService, PolicyServiceTrait},
    pricing::{PricingService, PricingServiceTrait},
    products::{ProductService, ProductServiceTrait},
    search::{PolicySearchService, PolicySearchServiceTrait},
};
use policyhub_messaging::Dispatcher;
use policyhub_storage_memory::{
    dashboard::PolicyDocumentStore,
    payments::PolicyAccountRepository,
    policies::{OfferRepository, PolicyRepository},
    pricing::TariffRepository,
    products::ProductRepository,
    search::PolicyIndex,
    seed,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::{demo_agents, resolve_secret_key, AuthConfig, AuthManager};
use crate::config::{Config, LogFormat, ServiceRole};
use crate::events::EventBus;
use crate::integration::{
    build_transport, EventBusChatBroadcaster, HubBroadcastHandler, MediatorEnvelopeHandler,
    TransportEventSink,
};
use crate::pricing_client::RemotePricingClient;

const EVENT_BUS_CAPACITY: usize = 256;

pub struct AppState {
    pub roles: BTreeSet<ServiceRole>,
    pub product_service: Arc<dyn ProductServiceTrait>,
    pub pricing_service: Arc<dyn PricingServiceTrait>,
    pub policy_service: Arc<dyn PolicyServiceTrait>,
    pub payment_service: Arc<dyn PaymentServiceTrait>,
    pub dashboard_service: Arc<dyn DashboardServiceTrait>,
    pub search_service: Arc<dyn PolicySearchServiceTrait>,
    pub chat_service: Arc<dyn ChatServiceTrait>,
    pub event_bus: EventBus,
    pub auth: Arc<AuthManager>,
    pub transport_name: &'static str,
    shutdown: watch::Sender<bool>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl AppState {
    pub fn hosts(&self, role: ServiceRole) -> bool {
        self.roles.contains(&role)
    }

    /// Signals background workers to stop and waits for them.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handles = match self.background.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Background task ended abnormally: {}", e);
            }
        }
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let roles = config
        .roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(",");
    tracing::info!(
        "Starting {} hosting [{}] over {} transport",
        config.service_name,
        roles,
        config.transport
    );

    let jwt_secret = resolve_secret_key(config.jwt_secret.as_deref())?;
    let auth = Arc::new(AuthManager::new(&AuthConfig {
        jwt_secret,
        access_token_ttl: config.token_ttl,
        agents: demo_agents(&config.demo_password)?,
    })?);

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Catalog
    let product_repository = Arc::new(ProductRepository::new(seed::products())?);
    let product_service: Arc<dyn ProductServiceTrait> =
        Arc::new(ProductService::new(product_repository));
    let tariff_repository = Arc::new(TariffRepository::new(seed::tariffs())?);
    let local_pricing: Arc<dyn PricingServiceTrait> =
        Arc::new(PricingService::new(tariff_repository));

    let policy_pricing: Arc<dyn PricingServiceTrait> = if config.hosts(ServiceRole::Pricing) {
        local_pricing.clone()
    } else if let Some(url) = &config.pricing_url {
        tracing::info!("Offers are priced remotely by {}", url);
        Arc::new(RemotePricingClient::new(
            url,
            auth.clone(),
            &config.service_name,
            config.request_timeout,
        )?)
    } else if config.hosts(ServiceRole::Policies) {
        anyhow::bail!("The policies service needs the pricing service or PH_PRICING_URL");
    } else {
        local_pricing.clone()
    };

    // Policies publish through the transport
    let event_sink = Arc::new(TransportEventSink::new());
    let policy_service: Arc<dyn PolicyServiceTrait> = Arc::new(PolicyService::new(
        Arc::new(OfferRepository::new()),
        Arc::new(PolicyRepository::new()),
        product_service.clone(),
        policy_pricing,
        event_sink.clone() as Arc<dyn DomainEventSink>,
    ));

    // Downstream projections
    let payments = Arc::new(PaymentService::new(Arc::new(PolicyAccountRepository::new())));
    let dashboard = Arc::new(DashboardService::new(Arc::new(PolicyDocumentStore::new())));
    let search = Arc::new(PolicySearchService::new(Arc::new(PolicyIndex::new())));
    let chat = Arc::new(ChatService::new(Arc::new(EventBusChatBroadcaster::new(
        event_bus.clone(),
    ))));

    let mut mediator = Mediator::new();
    if config.hosts(ServiceRole::Payments) {
        mediator.register(payments.clone());
    }
    if config.hosts(ServiceRole::Dashboard) {
        mediator.register(dashboard.clone());
    }
    if config.hosts(ServiceRole::Search) {
        mediator.register(search.clone());
    }
    if config.hosts(ServiceRole::Chat) {
        mediator.register(chat.clone());
    }
    mediator.register(Arc::new(HubBroadcastHandler::new(event_bus.clone())));
    tracing::info!(
        "Integration event handlers: {}",
        mediator.handler_names().join(", ")
    );

    let transport = build_transport(config).await?;
    let transport_name = transport.name();

    // Subscribe before anything can publish so no event is missed.
    let dispatcher = Dispatcher::new(
        transport.clone(),
        Arc::new(MediatorEnvelopeHandler::new(mediator)),
    )
    .start(shutdown_rx.clone())
    .await;
    let publisher = event_sink.start_worker(
        transport,
        config.service_name.clone(),
        config.publish_retries,
        shutdown_rx,
    )?;

    Ok(Arc::new(AppState {
        roles: config.roles.clone(),
        product_service,
        pricing_service: local_pricing,
        policy_service,
        payment_service: payments,
        dashboard_service: dashboard,
        search_service: search,
        chat_service: chat,
        event_bus,
        auth,
        transport_name,
        shutdown: shutdown_tx,
        background: Mutex::new(vec![dispatcher, publisher]),
    }))
}
