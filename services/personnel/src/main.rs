use sea_orm::Database;
use tracing::info;

use hrm_core::config::Config;
use hrm_core::tracing::init_tracing;

use hrm_personnel::config::PersonnelConfig;
use hrm_personnel::infra::storage::LocalAttachmentStore;
use hrm_personnel::router::build_router;
use hrm_personnel::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = PersonnelConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        attachments: LocalAttachmentStore::new(&config.attachment_dir),
        attachment_max_bytes: config.attachment_max_bytes,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.personnel_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!(
        attachment_dir = %config.attachment_dir,
        "personnel service listening on {http_addr}"
    );
    axum::serve(listener, router).await.expect("server error");
}
