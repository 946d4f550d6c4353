//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::APP_NAME;
use crate::utils::terminal::terminal_link;

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, cache_backend: &str, refresh_enabled: bool) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    let base = format!("http://{}:{}", display_host, port);

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    // "Dashboard:" is the widest label
    const W: usize = 12;

    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Dashboard:",
        terminal_link(&base)
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Stats:",
        terminal_link(&format!("{base}/stats/telco5g"))
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Health:",
        terminal_link(&format!("{base}/api/v1/health"))
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Cache:", cache_backend);
    if !refresh_enabled {
        println!(
            "  \x1b[90m➜  {:<W$} disabled (set --refresh-url)\x1b[0m",
            "Refresh:"
        );
    }

    println!();
}
