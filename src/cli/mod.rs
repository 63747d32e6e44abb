//! CLI definitions

use clap::Parser;

use crate::config::BufferConfig;

#[derive(Parser)]
#[command(name = "logring")]
#[command(
    about = "Rolling in-memory log buffer with a line-oriented query socket",
    long_about = None
)]
pub struct Cli {
    /// Port to host the command server socket on
    #[arg(short, long)]
    pub port: u16,

    /// Byte ring capacity in bytes (default 1 MiB)
    #[arg(long)]
    pub buffer_capacity: Option<usize>,

    /// Number of line descriptor slots (default 1024)
    #[arg(long)]
    pub line_slots: Option<usize>,
}

impl Cli {
    /// Buffer configuration with CLI overrides applied over the
    /// compiled-in defaults.
    pub fn buffer_config(&self) -> BufferConfig {
        let defaults = BufferConfig::default();
        BufferConfig {
            byte_capacity: self.buffer_capacity.unwrap_or(defaults.byte_capacity),
            line_slots: self.line_slots.unwrap_or(defaults.line_slots),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_is_required() {
        assert!(Cli::try_parse_from(["logring"]).is_err());
        let cli = Cli::try_parse_from(["logring", "--port", "4000"]).unwrap();
        assert_eq!(cli.port, 4000);
    }

    #[test]
    fn capacities_default_and_override() {
        let cli = Cli::try_parse_from(["logring", "-p", "4000"]).unwrap();
        let config = cli.buffer_config();
        assert_eq!(config.byte_capacity, 1024 * 1024);
        assert_eq!(config.line_slots, 1024);

        let cli = Cli::try_parse_from([
            "logring",
            "-p",
            "4000",
            "--buffer-capacity",
            "64",
            "--line-slots",
            "4",
        ])
        .unwrap();
        let config = cli.buffer_config();
        assert_eq!(config.byte_capacity, 64);
        assert_eq!(config.line_slots, 4);
    }
}
