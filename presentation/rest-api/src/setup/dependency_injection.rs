use std::sync::Arc;

use logger::TracingLogger;
use openai::client::OpenAIClient;
use openai::structured_extraction::StructuredExtractionOpenAI;

use business::application::receipt::extract_batch::BatchOrchestrator;
use business::application::receipt::extraction_client::ExtractionClient;

use crate::api::health::routes::Api as HealthApi;
use crate::api::receipt::routes::ReceiptApi;
use crate::config::app_config::AppConfig;

pub struct DependencyContainer {
    pub health_api: HealthApi,
    pub receipt_api: ReceiptApi,
}

impl DependencyContainer {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let openai = &config.openai;
        let client = OpenAIClient::with_options(
            openai.api_key.clone(),
            &openai.base_url,
            &openai.model,
            openai.timeout,
        );
        let backend = Arc::new(StructuredExtractionOpenAI::new(client));
        tracing::info!(model = backend.model(), base_url = %openai.base_url, "Extraction backend ready");

        let extractor = Arc::new(ExtractionClient::new(
            backend,
            Arc::new(TracingLogger::new("extraction_client")),
        ));
        let orchestrator = Arc::new(BatchOrchestrator {
            extractor,
            logger: Arc::new(TracingLogger::new("batch_orchestrator")),
            config: config.batch,
        });

        Ok(Self {
            health_api: HealthApi::new(openai.model.clone()),
            receipt_api: ReceiptApi::new(orchestrator),
        })
    }
}
