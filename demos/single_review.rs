use review_sentiment::error::Result;
use review_sentiment::sentiment::{ArtifactSource, SentimentPipelineBuilder};
use tracing_subscriber::EnvFilter;

// Usage: cargo run --example single_review -- <artifact-dir> ["review text"]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| "artifacts/reviews".to_string());
    let text = args
        .next()
        .unwrap_or_else(|| "Runs cool and quiet, best upgrade I've made.".to_string());

    println!("Building pipeline...");

    let pipeline = SentimentPipelineBuilder::lstm(ArtifactSource::local(dir)).build()?;

    println!("Pipeline built successfully.");

    let output = pipeline.run(text.as_str())?;

    println!("\n=== Review Sentiment ===");
    println!("Text: \"{}\"", text);
    println!(
        "Sentiment: {} (score: {:.4})",
        output.prediction.sentiment, output.prediction.score
    );
    println!(
        "Completed in {:.2}ms",
        output.stats.total_time.as_secs_f64() * 1000.0
    );

    Ok(())
}
