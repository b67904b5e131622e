use metrics_exporter_prometheus::PrometheusHandle;
use screening::config::{SinkConfig, StorageConfig, SurveyConfig};
use screening::error::AppError;
use screening::survey::{
    DirectoryResultSink, DisabledResultSink, HttpResultSink, RecommendationCatalog, ResultSink,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) frontend_dir: PathBuf,
}

pub(crate) fn result_sink(storage: &StorageConfig) -> Result<Arc<dyn ResultSink>, AppError> {
    let sink: Arc<dyn ResultSink> = match &storage.sink {
        SinkConfig::Directory { root } => {
            info!(root = %root.display(), "storing evaluation records on disk");
            Arc::new(DirectoryResultSink::new(root.clone()))
        }
        SinkConfig::Http {
            endpoint,
            bucket,
            token,
        } => {
            info!(%endpoint, %bucket, "storing evaluation records in object store");
            Arc::new(HttpResultSink::new(
                endpoint.clone(),
                bucket.clone(),
                token.clone(),
            )?)
        }
        SinkConfig::Disabled => {
            info!("evaluation record persistence disabled");
            Arc::new(DisabledResultSink)
        }
    };

    Ok(sink)
}

pub(crate) fn recommendation_catalog(
    survey: &SurveyConfig,
) -> Result<RecommendationCatalog, AppError> {
    match &survey.messages_path {
        Some(path) => {
            info!(path = %path.display(), "loading recommendation templates");
            Ok(RecommendationCatalog::from_path(path)?)
        }
        None => Ok(RecommendationCatalog::standard()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builds_every_configured_sink() {
        for sink in [
            SinkConfig::Directory {
                root: PathBuf::from("results"),
            },
            SinkConfig::Http {
                endpoint: "https://store.example.com".to_string(),
                bucket: "screen-results".to_string(),
                token: Some("secret".to_string()),
            },
            SinkConfig::Disabled,
        ] {
            let storage = StorageConfig {
                sink,
                timeout: Duration::from_secs(1),
            };
            assert!(result_sink(&storage).is_ok());
        }
    }

    #[test]
    fn missing_template_file_fails_startup() {
        let survey = SurveyConfig {
            question_root: PathBuf::from("assets"),
            frontend_dir: PathBuf::from("frontend/build"),
            messages_path: Some(PathBuf::from("/nonexistent/messages.json")),
        };

        assert!(matches!(
            recommendation_catalog(&survey),
            Err(AppError::Catalog(_))
        ));
    }
}
