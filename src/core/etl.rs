use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting CSV cleaning process...");
        self.monitor.log_stats("Start");

        // Extract
        let text = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} bytes of CSV text", text.len());
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(text).await?;
        tracing::info!(
            "🧹 Cleaned {} of {} rows, total amount ${:.2}",
            report.stats.cleaned_rows,
            report.stats.original_rows,
            report.stats.total_amount
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
