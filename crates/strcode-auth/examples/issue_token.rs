//! Issue a strcode token from the command line
//!
//! Usage:
//!   cargo run --example issue_token -- --secret "your-secret" --payload "user@example.com"
//!   cargo run --example issue_token -- --secret "your-secret" --payload "42" --seconds 60

use std::time::Duration;

use clap::Parser;
use strcode_auth::StrCode;

#[derive(Parser, Debug)]
#[command(name = "issue_token")]
#[command(about = "Issue a time-limited strcode token", long_about = None)]
struct Args {
    /// Shared secret (must match the verifier's secret)
    #[arg(long, env = "STRCODE_SECRET")]
    secret: String,

    /// Payload to embed in the token
    #[arg(long)]
    payload: String,

    /// Field separator
    #[arg(long, default_value = ":")]
    separator: String,

    /// Token validity in seconds (default: 1 hour)
    #[arg(long, default_value = "3600")]
    seconds: u64,
}

fn main() {
    let args = Args::parse();

    let codec = match StrCode::new(&args.secret, args.separator, Duration::from_secs(args.seconds)) {
        Ok(codec) => codec,
        Err(e) => {
            eprintln!("Failed to create codec: {}", e);
            std::process::exit(1);
        }
    };

    let token = codec.encode(&args.payload);

    println!("\nToken issued\n");
    println!("Payload:   {}", args.payload);
    println!("Valid for: {} seconds", args.seconds);
    println!("\nToken:");
    println!("{}\n", token);
    println!("Verify with:");
    println!("  strcode decode \"{}\"\n", token);
}
