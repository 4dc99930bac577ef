//! CLI entry point for the sepolgraph CSV importer.
//!
//! Exit codes: 0 success, 1 report output failure, 2 configuration,
//! 3 missing CSV file, 4 unreadable CSV, 5 Neo4j unreachable, 6 write failure.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use sepolgraph_core::Settings;
use sepolgraph_graph::{GraphClient, GraphConfig, GraphError, MemoryStore, PolicyStore};
use sepolgraph_import::{ImportError, ImportReport, PolicyLoader};

#[derive(Parser)]
#[command(name = "sepolgraph-import")]
#[command(about = "Load SELinux policy CSV files into the Neo4j policy graph")]
struct Cli {
    /// Directory containing subjects.csv, objects.csv, classes.csv and relationships.csv.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Config file prefix (default: sepolgraph).
    #[arg(short, long, default_value = "sepolgraph")]
    config: String,

    /// Parse and load into an in-memory store without connecting to Neo4j.
    #[arg(long)]
    dry_run: bool,

    /// Skip creating constraints and indexes.
    #[arg(long)]
    skip_schema: bool,

    /// Print the import report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let connect = |config: GraphConfig| async move { GraphClient::connect(&config).await };
    let report = match run(&cli, connect).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Import aborted");
            return ExitCode::from(e.exit_code());
        }
    };

    let mut out = std::io::stdout().lock();
    if let Err(e) = write_report(&mut out, &report, cli.json) {
        tracing::error!(error = %e, "Failed to write import report");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Load settings, acquire a store and run the import.
///
/// `connect` is only called outside dry-run mode, before any file is read.
async fn run<C, F, S>(cli: &Cli, connect: C) -> Result<ImportReport, ImportError>
where
    C: FnOnce(GraphConfig) -> F,
    F: Future<Output = Result<S, GraphError>>,
    S: PolicyStore,
{
    let settings = Settings::load(&cli.config)?.with_data_dir(cli.data_dir.as_deref());

    let mut import = settings.import;
    if cli.skip_schema {
        import.create_schema = false;
    }

    if cli.dry_run {
        tracing::info!("Dry run: loading into in-memory store");
        return PolicyLoader::new(MemoryStore::new(), import).run().await;
    }

    let graph_config = GraphConfig::from(&settings.neo4j);
    tracing::info!(uri = %graph_config.uri, "Connecting to Neo4j");
    let store = connect(graph_config)
        .await
        .map_err(ImportError::Connection)?;

    PolicyLoader::new(store, import).run().await
}

fn write_report(out: &mut impl Write, report: &ImportReport, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report).context("serializing import report")?;
        writeln!(out, "{rendered}").context("writing import report")?;
        out.flush().context("writing import report")?;
        return Ok(());
    }

    writeln!(
        out,
        "Imported {} subjects, {} objects, {} classes, {}/{} relationships",
        report.subjects,
        report.objects,
        report.classes,
        report.relationships_written,
        report.relationships,
    )
    .context("writing import report")?;
    for skip in &report.skipped {
        writeln!(out, "  skipped line {}: {}", skip.line, skip.reason)
            .context("writing import report")?;
    }
    if let Some(graph) = &report.graph {
        writeln!(
            out,
            "Graph now holds {} subjects, {} objects, {} classes, {} ALLOWS edges",
            graph.subjects, graph.objects, graph.classes, graph.allows
        )
        .context("writing import report")?;
    }
    out.flush().context("writing import report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tempfile::TempDir;

    fn sample_data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    fn cli(dir: &TempDir, data_dir: &Path, extra: &[&str]) -> Cli {
        let config = dir.path().join("absent");
        let mut args = vec![
            "sepolgraph-import".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--data-dir".to_string(),
            data_dir.display().to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        Cli::parse_from(args)
    }

    async fn sample_report() -> ImportReport {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &sample_data_dir(), &["--dry-run"]);
        run(&cli, |_| async { Err::<MemoryStore, _>(GraphError::Connection("unused".into())) })
            .await
            .unwrap()
    }

    /// Rejects every write, like a closed pipe or a full disk.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_connection_failure_exits_before_reading_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-data");
        let cli = cli(&dir, &missing, &[]);

        let err = run(&cli, |config| async move {
            Err::<MemoryStore, _>(GraphError::Connection(format!(
                "connection refused: {}",
                config.uri
            )))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ImportError::Connection(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[tokio::test]
    async fn test_connected_store_is_loaded_and_closed() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &sample_data_dir(), &["--skip-schema"]);
        let store = MemoryStore::new();
        let handle = store.clone();

        let report = run(&cli, |_| async move { Ok(store) }).await.unwrap();

        assert_eq!(report.relationships_written, 1);
        assert!(handle.allows("init", "passwd").await.is_some());
        assert!(!handle.schema_created().await);
        assert_eq!(handle.close_count().await, 1);
    }

    #[tokio::test]
    async fn test_dry_run_never_connects() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &sample_data_dir(), &["--dry-run"]);
        let connected = AtomicBool::new(false);

        let report = run(&cli, |_| {
            connected.store(true, Ordering::SeqCst);
            async { Err::<MemoryStore, _>(GraphError::Connection("unreachable".into())) }
        })
        .await
        .unwrap();

        assert!(!connected.load(Ordering::SeqCst));
        assert_eq!(report.subjects, 1);
    }

    #[tokio::test]
    async fn test_write_report_text_and_json() {
        let report = sample_report().await;

        let mut text = Vec::new();
        write_report(&mut text, &report, false).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.starts_with("Imported 1 subjects, 1 objects, 1 classes, 1/1 relationships"));

        let mut json = Vec::new();
        write_report(&mut json, &report, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["relationships_written"], 1);
    }

    #[tokio::test]
    async fn test_write_report_surfaces_output_errors() {
        let report = sample_report().await;
        assert!(write_report(&mut BrokenPipe, &report, true).is_err());
        assert!(write_report(&mut BrokenPipe, &report, false).is_err());
    }
}
