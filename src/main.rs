use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

mod answer;
mod error;
mod logging;
mod packet;
mod question;

use packet::QType;

const DEFAULT_SERVER: &str = "127.0.0.1:2053";

#[derive(Parser)]
#[command(name = "mqdns")]
#[command(about = "Send several DNS questions in one query and print the answers")]
struct Cli {
    /// Names to query, sent in the order given
    #[arg(value_name = "NAME", default_values_t = question::DEFAULT_NAMES.map(String::from))]
    names: Vec<String>,

    /// Resolver address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    server: SocketAddr,

    /// Question type for every name
    #[arg(short = 't', long, default_value = "A")]
    qtype: QType,

    /// Clear the recursion-desired bit
    #[arg(long)]
    no_recursion: bool,

    /// How long to wait for the response
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    timeout_ms: u64,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let query = question::create_query(&cli.names, cli.qtype, !cli.no_recursion);
    debug!(
        id = query.header.id,
        rd = query.header.rd,
        questions = ?query.questions.iter().map(|q| q.to_string()).collect::<Vec<_>>(),
        "query built"
    );

    let response = answer::exchange(cli.server, &query, Duration::from_millis(cli.timeout_ms))?;
    print!("{}", answer::render_answers(&response.answers));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn no_arguments_reproduce_the_fixed_query() {
        let cli = Cli::parse_from(["mqdns"]);
        assert_eq!(cli.names, question::DEFAULT_NAMES);
        assert_eq!(cli.server, "127.0.0.1:2053".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.qtype, QType::A);
        assert!(!cli.no_recursion);
        assert_eq!(cli.timeout_ms, 2000);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "mqdns",
            "-s",
            "[::1]:53",
            "-t",
            "aaaa",
            "--no-recursion",
            "--timeout-ms",
            "50",
            "b.example",
            "a.example",
        ]);
        assert_eq!(cli.names, ["b.example", "a.example"]);
        assert_eq!(cli.server, "[::1]:53".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.qtype, QType::AAAA);
        assert!(cli.no_recursion);
        assert_eq!(cli.timeout_ms, 50);
    }

    #[test]
    fn unknown_qtype_is_rejected() {
        assert!(Cli::try_parse_from(["mqdns", "-t", "bogus"]).is_err());
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
