mod common;
use haven::{Category, Haven};
use common::{get_sources, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // 1. Register sources (fixtures in CI when HAVEN_EXAMPLES_USE_MOCK is set).
    let mut builder = Haven::builder();
    for s in get_sources() {
        builder = builder.with_source(s);
    }
    let haven = builder.build()?;

    // 2. Look up shelters near downtown San Diego.
    println!("Sources: {:?}", haven.source_names());
    let shelters = haven.lookup(32.7157, -117.1611, Category::Shelter).await?;
    for r in &shelters {
        println!("{:>6.0} m  {}  ({})", r.distance_meters, r.name, r.address);
    }

    // 3. The same query again is served from the cache.
    let again = haven.lookup(32.7157, -117.1611, Category::Shelter).await?;
    println!("cached: {} results, {} cache entries", again.len(), haven.cached_entries());

    Ok(())
}
