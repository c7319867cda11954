use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use crate::config::FortuneConfig;
use crate::server::page::FortunePage;
use crate::server::AppState;
use crate::storage::FortuneStore;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let page = fetch_page(state).await?;
    Ok(Html(page.render()))
}

pub async fn api_fortune(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FortunePage>, (StatusCode, Json<ErrorResponse>)> {
    Ok(Json(fetch_page(state).await?))
}

async fn fetch_page(state: Arc<AppState>) -> Result<FortunePage, (StatusCode, Json<ErrorResponse>)> {
    tokio::task::spawn_blocking(move || load_page(&state.config))
        .await
        .map_err(|e| {
            tracing::error!("Join error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
        })
}

/// Open a store, read one fortune, close the store.
///
/// Store failures degrade the page instead of failing the request.
pub fn load_page(config: &FortuneConfig) -> FortunePage {
    let mut page = FortunePage {
        app_version: config.app_version.clone(),
        app_env: config.app_env.clone(),
        ..FortunePage::default()
    };

    let store = match FortuneStore::open(&config.database, config.uniqueness) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("An error occurred while connecting to the database: {}", e);
            return page;
        }
    };
    tracing::debug!("Successfully connected to the database.");
    page.connected = true;

    match store.read_random_fortune() {
        Ok(text) => page.fortune = Some(text),
        Err(e) if e.is_connection() => {
            tracing::error!("Lost the database connection: {}", e);
            page.connected = false;
        }
        Err(e) => tracing::warn!("No fortune to show: {}", e),
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortune::{NewFortune, UniquenessMode};

    fn config_for(dir: &tempfile::TempDir) -> FortuneConfig {
        FortuneConfig {
            database: dir.path().join("fortunes.db"),
            app_version: Some("0.1.0".to_string()),
            app_env: Some("test".to_string()),
            ..FortuneConfig::default()
        }
    }

    fn seed(config: &FortuneConfig, texts: &[&str]) {
        let mut store = FortuneStore::open(&config.database, config.uniqueness).unwrap();
        store.initialize(false).unwrap();
        for text in texts {
            store.insert(&NewFortune::new(*text, UniquenessMode::ContentHash)).unwrap();
        }
    }

    #[test]
    fn test_load_page_with_fortune() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        seed(&config, &["Be yourself."]);

        let page = load_page(&config);
        assert!(page.connected);
        assert_eq!(page.fortune.as_deref(), Some("Be yourself."));
        assert_eq!(page.app_env.as_deref(), Some("test"));
    }

    #[test]
    fn test_load_page_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        seed(&config, &[]);

        let page = load_page(&config);
        assert!(page.connected);
        assert!(page.fortune.is_none());
    }

    #[test]
    fn test_load_page_unreachable_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = FortuneConfig {
            database: dir.path().join("no").join("such").join("dir.db"),
            ..FortuneConfig::default()
        };

        let page = load_page(&config);
        assert!(!page.connected);
        assert!(page.fortune.is_none());
    }

    #[tokio::test]
    async fn test_index_handler_renders_fortune() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        seed(&config, &["Look & listen"]);

        let state = Arc::new(AppState { config });
        let Html(body) = index(State(state.clone())).await.unwrap();
        assert!(body.contains("Look &amp; listen"));
        assert!(body.contains("Version: 0.1.0"));

        let Json(page) = api_fortune(State(state)).await.unwrap();
        assert_eq!(page.fortune.as_deref(), Some("Look & listen"));
    }

    #[tokio::test]
    async fn test_api_fortune_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        seed(&config, &["Look & listen"]);

        let state = Arc::new(AppState { config });
        let Json(page) = api_fortune(State(state)).await.unwrap();
        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "fortune": "Look & listen",
                "connected": true,
                "app_version": "0.1.0",
                "app_env": "test",
            })
        );
    }

    #[test]
    fn test_unreachable_store_serializes_null_fortune() {
        let dir = tempfile::tempdir().unwrap();
        let config = FortuneConfig {
            database: dir.path().join("no").join("such").join("dir.db"),
            ..FortuneConfig::default()
        };

        let value = serde_json::to_value(load_page(&config)).unwrap();
        assert_eq!(value["connected"], false);
        assert!(value["fortune"].is_null());
    }
}
