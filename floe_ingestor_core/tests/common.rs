use std::collections::HashMap;
use std::sync::Arc;

use floe_ingestor_core::IngestPipeline;
use floe_snowpipe::{ConnectionConfig, InMemoryIngestService, config::keys};

pub fn test_connection_config() -> ConnectionConfig {
    let values: HashMap<String, String> = [
        (keys::ACCOUNT, "test-account"),
        (keys::USER, "test_user"),
        (keys::PASSWORD, "test-password"),
        (keys::DB_SCHEMA_TABLE, "analytics.events.raw"),
        (keys::STREAMING_CHANNEL, "test-channel"),
        (keys::TABLE_VARIANT_COLUMN, "v"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ConnectionConfig::from_map(&values).expect("test config")
}

pub fn create_test_pipeline() -> (InMemoryIngestService, Arc<IngestPipeline>) {
    let service = InMemoryIngestService::new();
    let pipeline = IngestPipeline::new(
        Arc::new(service.clone()),
        test_connection_config(),
    );

    (service, Arc::new(pipeline))
}
