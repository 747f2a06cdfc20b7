//! # tgexport CLI
//!
//! Command-line interface for the tgexport library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use tgexport::cli::Args;
use tgexport::export::{ExportReport, Exporter};
use tgexport::progress::stderr_progress;
use tgexport::source::ArchiveSource;
use tgexport::ExportError;

#[tokio::main]
async fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn,tgexport=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<(), ExportError> {
    let started = Instant::now();
    let config = args.to_config();

    println!("📦 tgexport v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🔗 Start:   {}", args.start);
    println!("🔗 End:     {}", args.end);
    println!("📂 Archive: {}", args.archive.display());
    println!("💾 Output:  {}", config.output_dir.display());
    println!("📄 Dump:    {}", config.dump_format);
    if args.dump_only {
        println!("⏭️  Mode:    dump only");
    } else if !config.download_media {
        println!("⏭️  Media:   skipped (--no-media)");
    }
    println!();

    let source = ArchiveSource::open(&args.archive, args.media_root.clone()).await?;
    let mut exporter = Exporter::new(source, config);
    if !args.quiet {
        exporter = exporter.with_progress(stderr_progress());
    }

    let report = if args.dump_only {
        exporter.export_dump_only(&args.start, &args.end).await?
    } else {
        exporter.export_range(&args.start, &args.end).await?
    };

    print_report(&report);
    println!();
    println!("⚡ Done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn print_report(report: &ExportReport) {
    let summary = &report.summary;

    println!();
    if report.is_emergency() {
        println!("⚠️  Document rendering failed, emergency document written");
    } else {
        println!("✅ Export complete");
    }
    if let Some(html) = &report.html_path {
        println!("   Document: {}", html.display());
    }
    println!("   Dump:     {}", report.dump_path.display());

    println!();
    println!("📊 Summary:");
    println!("   Total:       {}", summary.total);
    println!("   Successful:  {}", summary.successful);
    println!("   Service:     {}", summary.service);
    println!("   Failed:      {}", summary.failed);
    if report.html_path.is_some() {
        println!("   Media files: {}", summary.media_downloaded);
    }
}
