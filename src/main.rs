use bayesopt_harness::config::ContextSpec;
use bayesopt_harness::core::benchmarks::objective_by_name;
use bayesopt_harness::core::{ContextSource, Session, SessionOutcome};
use bayesopt_harness::utils::{format::format_vector, logger, validation::Validate};
use bayesopt_harness::{
    CliConfig, ContextSchedule, ContextualOptimizationSession, FixedContext, Harness,
    HttpOptimizationService, LocalReportStore, OptimizationSession, RunSettings,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting bayesopt-harness CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = match RunSettings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Could not resolve run settings: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match run(settings).await {
        Ok(outcome) => {
            tracing::info!("✅ Optimization session completed");
            match &outcome.best {
                Some(best) => {
                    println!("✅ Optimization session completed!");
                    println!(
                        "📈 y_best = {:.4} at x_best = {}",
                        best.y,
                        format_vector(&best.x, 3)
                    );
                }
                None => println!("⚠️ Session ended without a single observation"),
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Harness run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                bayesopt_harness::utils::error::ErrorSeverity::Low => 0,
                bayesopt_harness::utils::error::ErrorSeverity::Medium => 2,
                bayesopt_harness::utils::error::ErrorSeverity::High => 1,
                bayesopt_harness::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(settings: RunSettings) -> bayesopt_harness::Result<SessionOutcome> {
    let service =
        HttpOptimizationService::new(settings.service_url.clone(), settings.request_timeout)?;
    let objective = objective_by_name(&settings.objective, settings.input_dim)?;
    let store = LocalReportStore::new(settings.output_path.clone());

    match &settings.context {
        None => {
            let mut session =
                OptimizationSession::new(service, objective, settings.ready_timeout);
            if let Some(cap) = settings.max_trials {
                session = session.with_max_trials(cap);
            }
            run_harness(session, store, &settings).await
        }
        Some(spec) => {
            let contexts: Box<dyn ContextSource> = match spec {
                ContextSpec::Fixed(context) => Box::new(FixedContext::new(context.clone())),
                ContextSpec::Schedule(schedule) => {
                    Box::new(ContextSchedule::new(schedule.clone())?)
                }
            };
            let mut session = ContextualOptimizationSession::new(
                service,
                objective,
                contexts,
                settings.ready_timeout,
            )?;
            if let Some(cap) = settings.max_trials {
                session = session.with_max_trials(cap);
            }
            run_harness(session, store, &settings).await
        }
    }
}

async fn run_harness<S: Session>(
    session: S,
    store: LocalReportStore,
    settings: &RunSettings,
) -> bayesopt_harness::Result<SessionOutcome> {
    let mut harness = Harness::new(
        session,
        store,
        settings.experiment.clone(),
        settings.objective.clone(),
    );
    if let Some(reference) = settings.reference.clone() {
        harness = harness.with_reference(reference);
    }
    harness.run().await
}
