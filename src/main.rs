use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academic_requests::academic::{AcademicClient, HttpAcademicClient, NoopAcademicClient};
use academic_requests::api::router;
use academic_requests::config::AppConfig;
use academic_requests::state::{AppState, FormState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "academic_requests=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let academic: Arc<dyn AcademicClient> = if config.offline {
        warn!("ACADEMIC_API_OFFLINE is set; using the no-op academic client");
        Arc::new(NoopAcademicClient)
    } else {
        Arc::new(HttpAcademicClient::new(&config)?)
    };

    let semester = match academic.get_current_semester().await {
        Ok(semester) => {
            info!("Current semester {} (id {})", semester.key(), semester.id);
            Some(semester)
        }
        Err(e) => {
            warn!("Could not load the current semester, defaulting dates by month: {}", e);
            None
        }
    };

    let mut form = FormState::new(semester.clone());
    if let Some(semester) = &semester {
        match academic.get_academic_requests_by_semester(semester.id).await {
            Ok(existing) if !existing.is_empty() => {
                info!("Loaded {} saved request(s) for {}", existing.len(), semester.key());
                form.table.load_existing(existing);
            }
            Ok(_) => {}
            Err(e) => warn!("Could not load saved requests: {}", e),
        }
    }

    let app = router(AppState::new(form, academic));

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
