use restyle::{
    compose_prompt, GeminiClient, GeminiConfig, PromptParams, Quality, SourceImage, StyleOption,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    restyle::logger::init()?;

    let input = env::args().nth(1).unwrap_or_else(|| "photo.jpg".to_string());
    let image = SourceImage::from_path(&input)?;

    let client = GeminiClient::new(GeminiConfig::from_env())?;
    let style = StyleOption::by_id("watercolor").ok_or("watercolor style missing")?;
    let params = PromptParams::new(style.prompt_template)
        .with_influence(85)
        .with_character("a scarred pilot")
        .with_quality(Quality::High);

    let prompt = compose_prompt(&params);
    println!("{}", prompt);

    let result = client.image().transform_image(&image, &prompt).await?;
    result.save("restyled.png")?;
    println!("saved restyled.png ({} bytes)", result.size());

    Ok(())
}
