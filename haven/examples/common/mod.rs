use haven::SourceAdapter;
use std::sync::Arc;

#[must_use]
pub fn get_sources() -> Vec<Arc<dyn SourceAdapter>> {
    if std::env::var("HAVEN_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using fixture source for CI) ---");
        vec![Arc::new(haven_mock::FixtureSource::new())]
    } else {
        let mut out: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        match haven_sources::DirectorySource::from_env() {
            Ok(s) => out.push(Arc::new(s)),
            Err(e) => eprintln!("directory source disabled: {e}"),
        }
        match haven_sources::FinderSource::from_env() {
            Ok(s) => out.push(Arc::new(s)),
            Err(e) => eprintln!("finder source disabled: {e}"),
        }
        out
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,haven=debug")),
        )
        .try_init();
}
