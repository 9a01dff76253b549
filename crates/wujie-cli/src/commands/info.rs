use anyhow::Result;
use console::style;
use wujie_mcp::WujieConfig;

use crate::paths::Paths;

fn print_aligned(label: &str, value: &str, width: usize) {
    println!("  {:<width$} {}", label, value, width = width);
}

pub fn handle_info() -> Result<()> {
    let logs_dir = Paths::in_state_dir("logs");
    let width = 20;

    println!("{}", style("wujie Version:").cyan().bold());
    print_aligned("Version:", env!("CARGO_PKG_VERSION"), width);
    println!();

    println!("{}", style("Paths:").cyan().bold());
    print_aligned("Logs dir:", &logs_dir.display().to_string(), width);
    println!();

    println!("{}", style("Configuration:").cyan().bold());
    match WujieConfig::load() {
        Ok(config) => {
            print_aligned("Base URL:", config.base_url.as_str(), width);
            print_aligned("API key:", &config.masked_api_key(), width);
            print_aligned("Default model:", &config.default_model.to_string(), width);
            print_aligned(
                "Poll interval:",
                &format!("{}ms", config.poll.interval.as_millis()),
                width,
            );
            print_aligned(
                "Timeout factor:",
                &config.poll.timeout_multiplier.to_string(),
                width,
            );
            print_aligned(
                "Max poll time:",
                &format!("{}s", config.poll.max_poll_time.as_secs()),
                width,
            );
            print_aligned(
                "HTTP timeout:",
                &format!("{}s", config.http_timeout.as_secs()),
                width,
            );
        }
        Err(e) => println!("  {}", style(e.to_string()).red()),
    }

    Ok(())
}
