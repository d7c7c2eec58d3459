use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use tokio_util::sync::CancellationToken;

use scentctl::api::{DeviceApi, HttpDeviceApi, SharedApi};
use scentctl::clock::{Clock, SystemClock};
use scentctl::config::AppConfig;
use scentctl::console::ConsoleSurface;
use scentctl::demo::run_demo;
use scentctl::models::schedule::parse_hhmm;
use scentctl::models::{
    ActivateRequest, CycleConfig, Formula, Recurrence, ScheduleDraft, DEFAULT_ACTIVE_SECS,
    DEFAULT_CYCLE_SECS,
};
use scentctl::notify::LogNotifier;
use scentctl::quiz::score_answers;
use scentctl::schedule::find_overlapping;
use scentctl::store::{SessionSnapshot, SnapshotStore};
use scentctl::sync::ProgressSynchronizer;

#[derive(Parser)]
#[command(name = "scentctl", about = "Control panel client for a home scent diffuser")]
struct Cli {
    /// Backend base URL (overrides SCENTCTL_SERVER).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current device status.
    Status,
    /// Activate a formula.
    Activate {
        /// Formula color: red, blue, yellow or green.
        color: Formula,
        /// Diffusing seconds per cycle.
        #[arg(long, default_value_t = DEFAULT_ACTIVE_SECS)]
        duration: f64,
        /// Cycle length in seconds.
        #[arg(long, default_value_t = DEFAULT_CYCLE_SECS)]
        cycle_time: f64,
    },
    /// Deactivate all formulas.
    Deactivate,
    /// Drop a manual override so paused schedules resume.
    ClearOverride,
    /// Run the synchronized progress view until Ctrl-C.
    Watch,
    /// Tour every formula for five seconds each.
    Demo,
    /// Manage recurring schedules.
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Score the preference quiz: pass ten color answers.
    Quiz { answers: Vec<Formula> },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// List all schedules.
    List,
    /// Create a schedule.
    Add {
        /// Start time, HH:MM.
        start: String,
        /// End time, HH:MM.
        end: String,
        color: Formula,
        /// daily, weekdays, weekends, a weekday name, or once.
        #[arg(long, default_value = "daily")]
        recurrence: Recurrence,
        /// Date for one-time schedules, YYYY-MM-DD.
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        #[arg(long, default_value_t = DEFAULT_ACTIVE_SECS)]
        duration: f64,
    },
    /// Check a prospective schedule for conflicts without creating it.
    Check {
        /// Start time, HH:MM.
        start: String,
        /// End time, HH:MM.
        end: String,
        color: Formula,
        /// daily, weekdays, weekends, a weekday name, or once.
        #[arg(long, default_value = "daily")]
        recurrence: Recurrence,
        /// Date for one-time schedules, YYYY-MM-DD.
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        #[arg(long, default_value_t = DEFAULT_ACTIVE_SECS)]
        duration: f64,
    },
    /// Delete a schedule by id.
    Remove { id: u32 },
    /// Pause scheduled activations.
    Pause,
    /// Resume scheduled activations.
    Resume,
    /// Show schedule status (active and upcoming).
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let mut config = AppConfig::from_env();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    let api: SharedApi = Arc::new(HttpDeviceApi::new(config.server_url.clone()));

    match cli.command {
        Command::Status => show_status(api.as_ref()).await,
        Command::Activate {
            color,
            duration,
            cycle_time,
        } => {
            let cycle = CycleConfig::new(cycle_time, duration)?;
            let response = api.activate(&ActivateRequest::new(color, cycle)).await?;
            println!(
                "{} activated ({:.0}s of {:.0}s)",
                color.display_name(),
                cycle.active_secs,
                cycle.cycle_secs
            );
            if let Some(paused) = response.paused_schedule {
                println!(
                    "paused schedule #{} ({}) while the manual formula runs",
                    paused.id,
                    paused.formula.display_name()
                );
            }
            Ok(())
        }
        Command::Deactivate => {
            api.deactivate().await?;
            println!("All formulas deactivated");
            Ok(())
        }
        Command::ClearOverride => {
            api.clear_override().await?;
            println!("Manual override cleared; schedules resume");
            Ok(())
        }
        Command::Watch => watch(api, &config).await,
        Command::Demo => demo(api, &config).await,
        Command::Schedule { command } => schedule(api.as_ref(), &config, command).await,
        Command::Quiz { answers } => quiz(api.as_ref(), &answers).await,
    }
}

async fn show_status(api: &dyn DeviceApi) -> Result<()> {
    let status = api.status().await?;
    match status.active_formula {
        Some(formula) => {
            println!("Active: {} ({})", formula.display_name(), formula);
            if let Some((_, start, cycle)) = status.cycle_anchor() {
                let now = SystemClock.now_epoch_secs();
                let phase = scentctl::sync::progress_phase(now, start, cycle.cycle_secs);
                println!(
                    "Cycle: {:.0}s of {:.0}s diffusing, {:.0}% through the current cycle",
                    cycle.active_secs,
                    cycle.cycle_secs,
                    phase * 100.0
                );
            }
            if status.is_scheduled {
                println!("Running from a schedule");
            } else if status.user_override {
                println!("Manual activation (schedules paused)");
            }
        }
        None => println!("Ready (no formula active)"),
    }
    Ok(())
}

async fn watch(api: SharedApi, config: &AppConfig) -> Result<()> {
    let store = SnapshotStore::new(config.snapshot_path.clone())?;

    let sync = ProgressSynchronizer::with_intervals(
        api,
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
        Arc::new(ConsoleSurface::new()),
        config.frame_interval,
        config.poll_interval,
    );

    // The last session's state renders immediately; the first successful
    // poll supersedes it.
    if let Some(snapshot) = store.take_session()? {
        if let (Some(formula), true) = (snapshot.selected_formula, snapshot.is_active) {
            if let Ok(cycle) = CycleConfig::new(snapshot.cycle_secs, snapshot.active_secs) {
                info!(
                    "restored session snapshot: {} active ({:.0}s of {:.0}s)",
                    formula.display_name(),
                    cycle.active_secs,
                    cycle.cycle_secs
                );
                sync.restore(formula, cycle).await;
            }
        }
    }

    if sync.refresh().await.is_err() {
        warn!("initial status fetch failed; waiting for the next poll");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for Ctrl-C")?;

    let state = sync.snapshot().await;
    if let Some(cycle) = state.cycle {
        store.save_session(SessionSnapshot {
            selected_formula: Some(cycle.formula),
            is_active: state.is_running(),
            cycle_secs: cycle.config.cycle_secs,
            active_secs: cycle.config.active_secs,
        })?;
    }
    sync.shutdown().await;
    Ok(())
}

async fn demo(api: SharedApi, config: &AppConfig) -> Result<()> {
    let sync = ProgressSynchronizer::with_intervals(
        api,
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
        Arc::new(ConsoleSurface::new()),
        config.frame_interval,
        config.poll_interval,
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    run_demo(&sync, &cancel).await?;
    sync.shutdown().await;
    Ok(())
}

async fn schedule(
    api: &dyn DeviceApi,
    config: &AppConfig,
    command: ScheduleCommand,
) -> Result<()> {
    match command {
        ScheduleCommand::List => {
            let list = api.list_schedules().await?;
            if list.schedules.is_empty() {
                println!("No schedules configured");
            }
            for schedule in list.schedules {
                println!(
                    "#{} {} {}-{} {} ({}){}",
                    schedule.id,
                    schedule.formula.display_name(),
                    schedule.start_time.format("%H:%M"),
                    schedule.end_time.format("%H:%M"),
                    schedule.recurrence,
                    if schedule.enabled { "enabled" } else { "disabled" },
                    schedule
                        .schedule_date
                        .map(|date| format!(" on {date}"))
                        .unwrap_or_default()
                );
            }
            Ok(())
        }
        ScheduleCommand::Add {
            start,
            end,
            color,
            recurrence,
            date,
            duration,
        } => {
            let draft = ScheduleDraft {
                start_time: parse_hhmm(&start).map_err(anyhow::Error::msg)?,
                end_time: parse_hhmm(&end).map_err(anyhow::Error::msg)?,
                formula: color,
                cycle_time: DEFAULT_CYCLE_SECS,
                duration,
                recurrence,
                schedule_date: date,
            };
            draft.validate()?;

            // Surface conflicts locally before the backend rejects them.
            if let Ok(existing) = api.list_schedules().await {
                let conflicts = find_overlapping(&draft, &existing.schedules, None);
                if !conflicts.is_empty() {
                    let ids: Vec<String> =
                        conflicts.iter().map(|s| format!("#{}", s.id)).collect();
                    bail!("schedule overlaps existing {}", ids.join(", "));
                }
            }

            let created = api.create_schedule(&draft).await?;
            println!("Created schedule #{}", created.id);
            Ok(())
        }
        ScheduleCommand::Check {
            start,
            end,
            color,
            recurrence,
            date,
            duration,
        } => {
            let draft = ScheduleDraft {
                start_time: parse_hhmm(&start).map_err(anyhow::Error::msg)?,
                end_time: parse_hhmm(&end).map_err(anyhow::Error::msg)?,
                formula: color,
                cycle_time: DEFAULT_CYCLE_SECS,
                duration,
                recurrence,
                schedule_date: date,
            };
            draft.validate()?;

            let report = api.check_overlap(&draft).await?;
            if report.valid {
                println!("No conflicts");
            } else {
                println!(
                    "{}",
                    report
                        .message
                        .as_deref()
                        .unwrap_or("Schedule conflicts with existing schedules")
                );
                for overlap in report.overlapping_schedules {
                    println!(
                        "  #{} {} {} ({})",
                        overlap.id,
                        overlap.formula.display_name(),
                        overlap.time_range,
                        overlap.recurrence
                    );
                }
            }
            Ok(())
        }
        ScheduleCommand::Remove { id } => {
            api.delete_schedule(id).await?;
            println!("Deleted schedule #{id}");
            Ok(())
        }
        ScheduleCommand::Pause => {
            api.pause_schedule().await?;
            println!("Schedules paused");
            Ok(())
        }
        ScheduleCommand::Resume => {
            api.resume_schedule().await?;
            println!("Schedules resumed");
            Ok(())
        }
        ScheduleCommand::Status => {
            let store = SnapshotStore::new(config.snapshot_path.clone())?;
            match api.schedule_status().await {
                Ok(status) => {
                    match &status.active_schedule {
                        Some(active) => println!(
                            "Active schedule: #{} {} until {}",
                            active.id,
                            active.formula.display_name(),
                            active.end_time.format("%H:%M")
                        ),
                        None => println!("No schedule currently active"),
                    }
                    if let Some(next) = &status.next_schedule {
                        println!(
                            "Next: #{} {} at {}",
                            next.id,
                            next.formula.display_name(),
                            status.next_schedule_time.as_deref().unwrap_or("?")
                        );
                        // Remembered for display continuity if the backend
                        // becomes unreachable.
                        store.remember_inactive_schedule(next.clone())?;
                    }
                    Ok(())
                }
                Err(err) => {
                    warn!("schedule status fetch failed: {err}");
                    match store.last_inactive_schedule() {
                        Some(last) => {
                            println!(
                                "Backend unreachable; last known schedule: #{} {} {}-{}",
                                last.id,
                                last.formula.display_name(),
                                last.start_time.format("%H:%M"),
                                last.end_time.format("%H:%M")
                            );
                            Ok(())
                        }
                        None => Err(err.into()),
                    }
                }
            }
        }
    }
}

async fn quiz(api: &dyn DeviceApi, answers: &[Formula]) -> Result<()> {
    let local = score_answers(answers)?;

    match api.submit_quiz(answers).await {
        Ok(response) => {
            println!(
                "Recommended: {} - {}",
                response.scent_info.name, response.scent_info.description
            );
            println!("Mood: {}", response.scent_info.mood);
        }
        Err(err) => {
            warn!("quiz submission failed, using local scoring: {err}");
            let formula = local.recommended;
            println!(
                "Recommended: {} - {}",
                formula.display_name().to_uppercase(),
                formula.description()
            );
            println!("Mood: {}", formula.mood());
        }
    }

    for (formula, count) in local.breakdown {
        println!("  {:<8} {count}", formula.color_code());
    }
    Ok(())
}
