mod common;
use haven::{Haven, LookupRequest};
use common::{get_sources, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut builder = Haven::builder();
    for s in get_sources() {
        builder = builder.with_source(s);
    }
    let haven = builder.build()?;

    // Requests arrive as JSON from the voice/UI layer.
    let raw = r#"{ "latitude": 32.7157, "longitude": -117.1611, "category": "food", "radiusMeters": 2000 }"#;
    let req: LookupRequest = serde_json::from_str(raw)?;
    let resp = haven.handle(&req).await;
    println!("{}", serde_json::to_string_pretty(&resp)?);

    Ok(())
}
