//! Koi - headless fish tank demo
//!
//! # Usage
//!
//! ```bash
//! koi
//! koi tank.json
//! koi tank.json --seconds 120
//! ```

mod app;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "koi")]
#[command(author, version, about = "Autonomous fish in a headless tank")]
struct Args {
    /// JSON fish config. Missing fields take their defaults.
    config: Option<PathBuf>,

    /// How long to run, in seconds
    #[arg(long, short = 's', default_value_t = 30.0, value_parser = parse_seconds)]
    seconds: f64,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("{s} is not a positive number of seconds"))
    }
}

fn main() {
    let args = Args::parse();

    env_logger::init();
    log::info!("Koi starting up");

    if let Err(e) = app::run(app::RunOptions {
        config_path: args.config,
        duration: args.seconds,
    }) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_is_positional_and_seconds_is_a_flag() {
        let args = Args::try_parse_from(["koi", "tank.json", "--seconds", "12"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("tank.json")));
        assert_eq!(args.seconds, 12.0);

        let args = Args::try_parse_from(["koi"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.seconds, 30.0);
    }

    #[test]
    fn rejects_non_positive_seconds() {
        assert!(Args::try_parse_from(["koi", "--seconds", "0"]).is_err());
        assert!(Args::try_parse_from(["koi", "-s", "nope"]).is_err());
    }
}
