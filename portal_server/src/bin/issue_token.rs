//! Prints a signed portal token for a user id, for local testing and ops.

use std::process::ExitCode;

use clap::Parser;
use portal_server::PortalConfig;
use portal_server::domain::auth::Claims;
use portal_server::domain::ports::{Clock, TokenCodec};
use portal_server::interface_adapters::jwt::Hs256Codec;
use portal_server::interface_adapters::state::SystemClock;

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Sign a portal JWT with the configured secret", long_about = None)]
struct Args {
    /// Id of the user the token authenticates
    user_id: i64,

    /// Email claim to embed
    #[arg(long)]
    email: Option<String>,

    /// Lifetime in seconds (defaults to JWT_EXPIRATION_SECONDS)
    #[arg(long)]
    ttl: Option<u64>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = match PortalConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if config.jwt.secret.is_none() {
        eprintln!("warning: JWT_SECRET is not set; signing with the development secret");
    }

    let ttl = args.ttl.unwrap_or(config.jwt.expiration_seconds);
    let claims = Claims::new(args.user_id, args.email, SystemClock.now_epoch_seconds(), ttl);
    let codec = Hs256Codec::new(config.jwt_secret(), config.jwt.leeway_seconds);

    match codec.encode(&claims) {
        Ok(token) => {
            println!("{token}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
