use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pilotes_orders::config::AppConfig;
use pilotes_orders::domain::order::{
    OrderDetails, OrderFilter, OrderLifecycleManager, OrderSearchEngine, Pagination, PlaceOrder,
    UpdateOrder,
};
use pilotes_orders::metrics::{self, Metrics};
use pilotes_orders::store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use pilotes_orders::utils::{retry_on_transient, RetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pilotes_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting pilotes order service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        unit_price_in_cents = config.order.unit_price_in_cents(),
        update_window_secs = config.order.update_window().num_seconds(),
        "Loaded configuration"
    );

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to Postgres...");
            let store = retry_on_transient(RetryConfig::default(), |attempt| async move {
                tracing::debug!(attempt = attempt, "Connecting to database");
                PostgresOrderStore::connect(url).await
            })
            .await
            .into_result()?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory order store");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        if let Err(e) = system.block_on(metrics::start_metrics_server(metrics_registry, metrics_port)) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 4. Core services ===
    let manager = OrderLifecycleManager::new(store.clone(), config.order).with_metrics(metrics.clone());
    let search = OrderSearchEngine::new(store).with_metrics(metrics);

    // === 5. Demonstrate the order lifecycle ===
    tracing::info!("📝 Demonstrating order lifecycle");

    let order_id = manager
        .place_order(PlaceOrder {
            details: OrderDetails {
                first_name: "Mike".to_string(),
                last_name: "Wazowski".to_string(),
                phone: "5551234567".to_string(),
                delivery_address: "1 Monster Alley, Monstropolis".to_string(),
                pilotes: 5,
            },
        })
        .await?;

    let updated = manager
        .update_order(UpdateOrder {
            order_id,
            details: OrderDetails {
                first_name: "Mike".to_string(),
                last_name: "Wazowski".to_string(),
                phone: "5551234567".to_string(),
                delivery_address: "2 Scare Floor, Monstropolis".to_string(),
                pilotes: 10,
            },
        })
        .await?;
    tracing::info!(
        order_id = %updated.id,
        version = updated.version,
        unit_price_in_cents = manager.pricing().unit_price_in_cents(),
        "Order revised"
    );

    let page = search
        .search(
            &OrderFilter {
                first_name: Some("Mik".to_string()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await?;
    let results = serde_json::to_string(&page.items)?;
    tracing::info!(
        total_count = page.total_count,
        results = %results,
        "🔎 Search results"
    );

    tracing::info!("🎉 Demo complete! Metrics remain available on /metrics (Ctrl+C to exit)");
    tokio::signal::ctrl_c().await?;

    Ok(())
}
