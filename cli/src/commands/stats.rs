use super::ui::{print_header, print_key_value};
use alchemist_config::Config;
use alchemist_core::traits::VectorStore;
use alchemist_index::PineconeStore;
use anyhow::Result;

pub async fn handle_stats(config: &Config) -> Result<()> {
    let store = PineconeStore::from_config(&config.index, &config.retry)?;
    let stats = store.stats().await?;

    print_header(&format!("Index '{}'", store.name()));
    print_key_value("Dimension", &stats.dimension.to_string());
    print_key_value("Total vectors", &stats.total_vector_count.to_string());
    for (namespace, count) in &stats.namespaces {
        let name = if namespace.is_empty() { "(default)" } else { namespace.as_str() };
        print_key_value(&format!("Namespace {name}"), &count.to_string());
    }
    Ok(())
}
