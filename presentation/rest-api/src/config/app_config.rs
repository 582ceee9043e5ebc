use super::{
    batch_config, cors_config, openai_config::OpenAIConfig, server_config::ServerConfig,
};
use business::application::receipt::extract_batch::BatchConfig;
use poem::middleware::Cors;

pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: Cors,
    pub openai: OpenAIConfig,
    pub batch: BatchConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(),
            cors: cors_config::init_cors(),
            openai: OpenAIConfig::from_env()?,
            batch: batch_config::from_env()?,
        })
    }
}
