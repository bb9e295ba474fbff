use review_sentiment::error::{PipelineError, Result};
use review_sentiment::reviews::read_comments_path;
use review_sentiment::sentiment::{ArtifactSource, SentimentPipelineBuilder};
use tracing_subscriber::EnvFilter;

// Usage: cargo run --example stock_report -- <artifact-dir> <reviews.csv>
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(dir), Some(csv_path)) = (args.next(), args.next()) else {
        eprintln!("usage: stock_report <artifact-dir> <reviews.csv>");
        std::process::exit(2);
    };

    let pipeline = SentimentPipelineBuilder::lstm(ArtifactSource::local(dir)).build()?;
    let comments = read_comments_path(&csv_path)?;

    let output = pipeline.run(&comments)?;
    let summary = &output.summary;

    println!("=== Stock Report: {} ===", csv_path);
    println!("Total comments:   {}", summary.total_comments());
    println!("Positive:         {}", summary.positive_count());
    println!("Negative:         {}", summary.negative_count());
    println!("Positive share:   {:.2}%", summary.positive_percentage());
    println!("Recommendation:   {}", summary.recommendation().message());
    println!(
        "Scored in {:.2}ms ({:.3}ms per review)",
        output.stats.total_time.as_secs_f64() * 1000.0,
        output.stats.time_per_item().as_secs_f64() * 1000.0
    );

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| PipelineError::Unexpected(format!("Failed to render summary: {e}")))?;
    println!("\n{json}");

    Ok(())
}
