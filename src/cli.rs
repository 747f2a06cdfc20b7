//! Command-line interface definition using clap.
//!
//! - [`Args`] - CLI argument structure
//! - [`DumpFormat`] - dump format flag, converted into [`crate::format::OutputFormat`]
//!
//! [`Args::to_config`] maps the flags onto an [`ExportConfig`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_OUTPUT_DIR, ExportConfig};

/// Export a range of Telegram messages into an HTML document, a structured
/// data dump and a media folder.
#[derive(Parser, Debug, Clone)]
#[command(name = "tgexport")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    tgexport https://t.me/chan/100 https://t.me/chan/150 --archive chan.json
    tgexport https://t.me/c/1234567890/5 https://t.me/c/1234567890/9 --archive a.json -f jsonl
    tgexport https://t.me/chan/1 https://t.me/chan/500 --archive chan.json --dump-only")]
pub struct Args {
    /// Link to the first message of the range
    pub start: String,

    /// Link to the last message of the range
    pub end: String,

    /// Message archive to export from
    #[arg(long, value_name = "FILE")]
    pub archive: PathBuf,

    /// Directory holding the archive's media blobs [default: <archive dir>/media]
    #[arg(long, value_name = "DIR")]
    pub media_root: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Messages fetched concurrently per window
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub batch_size: usize,

    /// Media files downloaded concurrently per window
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub media_batch_size: usize,

    /// Pause between fetch windows in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub batch_delay_ms: u64,

    /// Format of the structured data dump
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: DumpFormat,

    /// Skip media downloads
    #[arg(long)]
    pub no_media: bool,

    /// Write only the data dump (no media, no HTML)
    #[arg(long)]
    pub dump_only: bool,

    /// Suppress progress output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the export configuration from the flags.
    pub fn to_config(&self) -> ExportConfig {
        ExportConfig::new()
            .with_output_dir(&self.output)
            .with_batch_size(self.batch_size)
            .with_media_batch_size(self.media_batch_size)
            .with_batch_delay_ms(self.batch_delay_ms)
            .with_dump_format(self.format.into())
            .with_media(!self.no_media && !self.dump_only)
    }
}

/// Dump format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum DumpFormat {
    /// `{"export_info": ..., "messages": [...]}`
    #[default]
    Json,

    /// Export info line, then one message per line
    #[value(alias = "ndjson")]
    Jsonl,

    /// One row per message, semicolon-separated
    Csv,
}

impl From<DumpFormat> for crate::format::OutputFormat {
    fn from(format: DumpFormat) -> crate::format::OutputFormat {
        match format {
            DumpFormat::Json => crate::format::OutputFormat::Json,
            DumpFormat::Jsonl => crate::format::OutputFormat::Jsonl,
            DumpFormat::Csv => crate::format::OutputFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "tgexport",
            "https://t.me/chan/1",
            "https://t.me/chan/9",
            "--archive",
            "a.json",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = args.to_config();
        assert_eq!(config, ExportConfig::default());
        assert!(args.media_root.is_none());
    }

    #[test]
    fn test_flags_map_to_config() {
        let args = parse(&[
            "-o",
            "out",
            "--batch-size",
            "3",
            "--media-batch-size",
            "2",
            "--batch-delay-ms",
            "250",
            "-f",
            "jsonl",
            "--no-media",
        ]);
        let config = args.to_config();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.media_batch_size, 2);
        assert_eq!(config.batch_delay_ms, 250);
        assert_eq!(config.dump_format, OutputFormat::Jsonl);
        assert!(!config.download_media);
    }

    #[test]
    fn test_dump_only_disables_media() {
        assert!(!parse(&["--dump-only"]).to_config().download_media);
    }

    #[test]
    fn test_ndjson_alias() {
        assert_eq!(parse(&["-f", "ndjson"]).format, DumpFormat::Jsonl);
    }

    #[test]
    fn test_archive_is_required() {
        let result = Args::try_parse_from(["tgexport", "https://t.me/chan/1", "https://t.me/chan/2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from([
            "tgexport",
            "https://t.me/chan/1",
            "https://t.me/chan/2",
            "--archive",
            "a.json",
            "-q",
            "-v",
        ]);
        assert!(result.is_err());
    }
}
