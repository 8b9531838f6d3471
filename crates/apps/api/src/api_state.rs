use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::database::DetectionStore;
use common_services::ocr_client::LayoutAnalyzer;
use form_detection::FieldClassifier;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn DetectionStore>,
    pub layout_analyzer: Arc<dyn LayoutAnalyzer>,
    pub classifier: Arc<FieldClassifier>,
    pub settings: AppSettings,
}

// Lets handlers that only touch the store extract it directly.
impl FromRef<ApiContext> for Arc<dyn DetectionStore> {
    fn from_ref(state: &ApiContext) -> Self {
        state.store.clone()
    }
}
