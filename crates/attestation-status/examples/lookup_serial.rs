//! Look up attestation certificate serial numbers against the status list
//!
//! Usage: `cargo run --example lookup_serial -- <hex-serial>...`
//!
//! Set `RUST_LOG=attestation_status=debug` to see which source answered.

use attestation_status::{SerialNumber, StatusConfig};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let serials: Vec<String> = std::env::args().skip(1).collect();
    if serials.is_empty() {
        eprintln!("usage: lookup_serial <hex-serial>...");
        process::exit(2);
    }

    if let Err(e) = attestation_status::configure_global(StatusConfig::default()) {
        eprintln!("invalid configuration: {}", e);
        process::exit(1);
    }

    for text in &serials {
        let serial: SerialNumber = match text.parse() {
            Ok(serial) => serial,
            Err(e) => {
                eprintln!("{}: {}", text, e);
                continue;
            }
        };

        match attestation_status::get(&serial) {
            Some(record) => println!("{}: {}", serial, record),
            None => println!("{}: no status entry", serial),
        }
    }

    println!(
        "source: {}",
        attestation_status::global().store().source()
    );
}
