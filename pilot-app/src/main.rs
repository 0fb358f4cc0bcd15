use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pilot_common::observability::{LogConfig, init_logging};
use pilot_config::{PilotConfig, PilotConfigLoader, default_config_paths};
use pilot_drivers::PilotDriver;
use pilot_engine::{StepInterpreter, TaskExecutor, TaskResult};
use pilot_llm::traits::LlmClient as _;
use pilot_ocr::HttpOcrClient;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tasks::{load_task_file, planned_task_file, select_tasks};

mod tasks;

/// Pilot - declarative browser automation
#[derive(Parser, Debug)]
#[command(name = "pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./pilot.yaml, then the user config dir)
    #[arg(long, short = 'c', global = true, env = "PILOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the tasks of a `{"tasks": [...]}` file against a WebDriver session
    Run {
        tasks_file: PathBuf,

        /// Only run the task with this id or name
        #[arg(long, short = 't')]
        task: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Also write the results (JSON array) to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Ask the language model to draft steps for a task description
    Plan {
        description: String,

        /// Name for the generated task
        #[arg(long, default_value = "Generated task")]
        name: String,
    },
}

fn load_config(explicit: Option<&PathBuf>) -> Result<PilotConfig> {
    let loader = match explicit {
        Some(path) => PilotConfigLoader::new().with_file(path),
        None => default_config_paths()
            .into_iter()
            .rev()
            .fold(PilotConfigLoader::new(), |loader, path| {
                loader.with_optional_file(path)
            }),
    };
    loader.load().context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(cli.config.as_ref())?;

    let log_path = init_logging(LogConfig::from_settings("pilot", &cfg.logging))?;
    tracing::info!(log = %log_path.display(), "pilot.start");

    match cli.command {
        Command::Run {
            tasks_file,
            task,
            headed,
            output,
        } => run(cfg, tasks_file, task, headed, output).await,
        Command::Plan { description, name } => plan(cfg, &description, &name).await,
    }
}

async fn run(
    mut cfg: PilotConfig,
    tasks_file: PathBuf,
    wanted: Option<String>,
    headed: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let tasks = select_tasks(load_task_file(&tasks_file)?, wanted.as_deref())?;
    if headed {
        cfg.browser.headless = false;
    }

    let llm = pilot_llm::connect_llm(&cfg.llm).await?;
    let ocr = Arc::new(HttpOcrClient::new(&cfg.ocr)?);
    let executor = TaskExecutor::new(StepInterpreter::with_config(llm, ocr, cfg.engine.clone()));

    let driver = PilotDriver::connect(&cfg.browser).await?;
    let page = driver.page();

    let abort = driver.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl+C, aborting the page...");
            abort.cancel();
        }
    });

    let mut results: Vec<TaskResult> = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let result = executor.run(task, &page).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        results.push(result);
    }

    if let Err(err) = driver.close().await {
        tracing::warn!(error = %err, "driver.close_failed");
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_vec_pretty(&results)?)
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    tracing::info!(total = results.len(), failed, "pilot.run.done");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn plan(cfg: PilotConfig, description: &str, name: &str) -> Result<ExitCode> {
    let llm = pilot_llm::connect_llm(&cfg.llm).await?;
    let generated = llm.generate_automation_steps(description).await?;
    let file = planned_task_file(name, description, generated);
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(ExitCode::SUCCESS)
}
