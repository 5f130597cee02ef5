use chrono::Utc;
use clap::Parser;
use common::config::Config;
use platform::anchor::make_token;

use crate::config::parse_duration;
use crate::error::Result;

#[derive(Parser, Clone)]
pub struct Token {
    #[arg(long)]
    pub config: std::path::PathBuf,
    /// Website the token grants access to
    #[arg(long)]
    pub website_id: String,
    /// Anchor as unix seconds, records created at or before it are not counted. Defaults to now
    #[arg(long)]
    pub timestamp: Option<i64>,
    #[arg(long, default_value = "1h")]
    pub expires: String,
}

/// Prints a bearer token for the API.
pub fn issue(args: &Token, cfg: Config) -> Result<()> {
    let timestamp = args.timestamp.unwrap_or_else(|| Utc::now().timestamp());
    let token = make_token(
        args.website_id.as_str(),
        timestamp,
        parse_duration(&args.expires)?,
        cfg.auth.token_key.as_bytes(),
    )?;
    println!("{token}");

    Ok(())
}
