use anyhow::Result;
use clap::Parser;
use logged_users_exporter::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let cli = config::Cli::parse();
    let app_config = config::AppConfig::load(&cli)?;

    let host = Arc::new(
        host_repo::get_host_identity()
            .await
            .map_err(|e| anyhow::anyhow!("host identity: {}", e))?,
    );
    tracing::info!(
        hostname = %host.hostname,
        os = %host.os,
        os_version = %host.os_version,
        "{} {} starting",
        version::NAME,
        version::VERSION
    );

    let collection = &app_config.collection;
    let cgroups = cgroup_repo::CgroupResolver::new(Arc::new(
        cgroup_repo::ProcCgroupSource::new(&collection.proc_root),
    ));
    let names = docker_repo::ContainerNameResolver::new(
        Arc::new(docker_repo::DockerRepo::connect()?),
        Duration::from_millis(collection.lookup_timeout_ms),
    );
    let attributor = Arc::new(attribution::Attributor::new(
        cgroups,
        names,
        collection.max_concurrent_lookups,
    ));
    let source = Arc::new(sample_repo::CommandSampleRepo::new(Duration::from_millis(
        collection.command_timeout_ms,
    )));
    let collector = Arc::new(collector::Collector::new(host, source, attributor));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = match &app_config.push {
        Some(push_config) => {
            let sink = Arc::new(push::InfluxSink::new(push_config)?);
            tracing::info!(
                url = %push_config.url,
                org = %push_config.org,
                bucket = %push_config.bucket,
                interval_secs = push_config.interval_secs,
                "Push enabled"
            );
            Some(worker::spawn(
                worker::WorkerDeps {
                    collector: collector.clone(),
                    sink,
                    shutdown_rx,
                },
                worker::WorkerConfig {
                    interval_secs: push_config.interval_secs,
                },
            ))
        }
        None => {
            tracing::info!("Push disabled (no [push] config or flags)");
            None
        }
    };

    let app = routes::app(collector);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    if let Some(handle) = worker_handle {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
