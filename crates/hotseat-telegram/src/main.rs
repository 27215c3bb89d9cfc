//! Hotseat bot binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx cargo run -p hotseat-telegram
//! ```

use clap::Parser;
use hotseat_telegram::HotseatBot;
use tracing_subscriber::EnvFilter;

/// Hotseat - office attendance coordination over Telegram
#[derive(Parser, Debug)]
#[command(name = "hotseat")]
#[command(about = "Telegram bot that keeps a minimum office headcount every weekday")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::dotenv();

    let filter = match args.verbose {
        0 => "hotseat_telegram=info,teloxide=warn",
        1 => "hotseat_telegram=debug,teloxide=info",
        2 => "hotseat_telegram=trace,teloxide=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bot = HotseatBot::new()?;
    let identity = bot.identity().await?;
    tracing::info!(username = %identity.username, "Bot initialized");

    println!("\n🔥 Hotseat");
    println!("   Bot: @{}", identity.username);
    println!("\n   Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling(identity).await?;
    Ok(())
}
