use crate::core::report::console_summary;
use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run reports back to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub placed: usize,
    pub leftover_applicants: Vec<String>,
    pub report: String,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.leftover_applicants.is_empty()
    }
}

/// Drives a pipeline through extract, transform and load.
pub struct PipelineEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PipelineEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting allocation run");
        self.monitor.log_stats("start");

        tracing::info!("📥 Reading score sheet...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} applicants and {} slots",
            input.applicants.len(),
            input.slots.len()
        );
        self.monitor.log_stats("extract");

        tracing::info!("🧮 Allocating...");
        let outcome = self.pipeline.transform(input).await?;
        if outcome.is_complete() {
            tracing::info!("All {} applicants placed", outcome.placed_count());
        } else {
            // 未分配不算錯誤，只提示
            tracing::warn!(
                "⚠️ {} applicants could not be placed: {}",
                outcome.leftover_count(),
                outcome.leftover_applicants.join(", ")
            );
        }
        self.monitor.log_stats("transform");

        let placed = outcome.placed_count();
        let leftover_applicants = outcome.leftover_applicants.clone();
        let report = console_summary(&outcome);

        tracing::info!("💾 Writing results...");
        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            placed,
            leftover_applicants,
            report,
        })
    }
}
