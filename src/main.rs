use log::{info, warn};
use recipe_shopper::{load_config, RecipeShopper};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // recipe-shopper <url> [location]
    let args: Vec<String> = env::args().collect();
    let url = args
        .get(1)
        .ok_or("Usage: recipe-shopper <url> [location]")?;

    let config = load_config()?;
    let mut builder = RecipeShopper::builder().url(url).config(config);
    if let Some(location) = args.get(2) {
        builder = builder.location(location);
    }

    let list = builder.build().await?;
    info!(
        "{} items, estimated total ${:.2}",
        list.items.len(),
        list.estimated_total
    );
    if !list.unmatched.is_empty() {
        warn!("No products found for: {}", list.unmatched.join(", "));
    }

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
