use clap::{Parser, Subcommand};
use sched_core::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sched")]
#[command(about = "Personal task scheduler with recurring tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override today's date (YYYYMMDD)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<CalendarDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the next date of a repeat rule
    NextDate {
        /// Reference date (YYYYMMDD)
        #[arg(long, value_parser = parse_date)]
        now: CalendarDate,

        /// Stored task date (YYYYMMDD)
        #[arg(long)]
        date: String,

        /// Repeat rule: y | d N | w 1,..,7 | m DAYS [MONTHS]
        #[arg(long)]
        repeat: String,
    },

    /// Add a task
    Add {
        #[arg(long)]
        title: String,

        /// Task date (YYYYMMDD), today when omitted
        #[arg(long, default_value = "")]
        date: String,

        #[arg(long, default_value = "")]
        comment: String,

        /// Repeat rule, empty for a one-off task
        #[arg(long, default_value = "")]
        repeat: String,
    },

    /// Change fields of an existing task
    Edit {
        #[arg(long)]
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        #[arg(long)]
        repeat: Option<String>,
    },

    /// Show one task as JSON
    Show {
        #[arg(long)]
        id: String,
    },

    /// List upcoming tasks
    List {
        /// Text to look for, or a date as DD.MM.YYYY
        #[arg(long)]
        search: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Mark a task done: recurring tasks move on, others are deleted
    Done {
        #[arg(long)]
        id: String,
    },

    /// Delete a task
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Show recently completed tasks
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Export all tasks to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_date(s: &str) -> std::result::Result<CalendarDate, String> {
    CalendarDate::parse(s).map_err(|_| format!("{:?} is not a valid YYYYMMDD date", s))
}

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Pure evaluation needs neither config nor data
    if let Commands::NextDate { now, date, repeat } = &cli.command {
        let next = next_date(*now, date, repeat)?;
        println!("{}", next);
        return Ok(());
    }

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli
        .today
        .unwrap_or_else(|| CalendarDate::from(chrono::Local::now().date_naive()));
    tracing::debug!("Using data dir {:?}, today {}", data_dir, today);

    let mut service = TaskService::open(&data_dir, config.tasks.clone());

    match cli.command {
        Commands::NextDate { .. } => Ok(()),
        Commands::Add {
            title,
            date,
            comment,
            repeat,
        } => {
            let task = NewTask {
                date,
                title,
                comment,
                repeat,
            };
            let id = service.add_task(task, today)?;
            let task = service.get_task(&id)?;
            println!("✓ Created task {} on {}", id, task.date);
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            date,
            comment,
            repeat,
        } => {
            let mut task = service.get_task(&id)?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(date) = date {
                task.date = date;
            }
            if let Some(comment) = comment {
                task.comment = comment;
            }
            if let Some(repeat) = repeat {
                task.repeat = repeat;
            }
            service.edit_task(task, today)?;
            println!("✓ Updated task {}", id);
            Ok(())
        }
        Commands::Show { id } => {
            let task = service.get_task(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            Ok(())
        }
        Commands::List { search, json } => {
            let tasks = match search {
                Some(query) => service.search_tasks(&query)?,
                None => service.list_tasks()?,
            };
            if json {
                let body = serde_json::json!({ "tasks": tasks });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                display_tasks(&tasks);
            }
            Ok(())
        }
        Commands::Done { id } => {
            match service.complete_task(&id, today)? {
                CompletionOutcome::Rescheduled(next) => {
                    println!("✓ Task {} done, next on {}", id, next)
                }
                CompletionOutcome::Deleted => println!("✓ Task {} done and deleted", id),
            }
            Ok(())
        }
        Commands::Delete { id } => {
            service.delete_task(&id)?;
            println!("✓ Deleted task {}", id);
            Ok(())
        }
        Commands::History { limit } => {
            let completions = service.history(limit)?;
            if completions.is_empty() {
                println!("No completed tasks yet.");
            }
            for completion in completions {
                let outcome = completion
                    .next_date
                    .map(|d| format!("→ {}", d))
                    .unwrap_or_else(|| "deleted".into());
                println!(
                    "{}  {:>4}  {}  {}",
                    completion.completed_at.format("%Y-%m-%d %H:%M"),
                    completion.task_id,
                    completion.title,
                    outcome
                );
            }
            Ok(())
        }
        Commands::Export { out } => {
            let count = service.export_csv(&out)?;
            println!("✓ Exported {} tasks", count);
            println!("  CSV: {}", out.display());
            Ok(())
        }
    }
}

fn display_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    for task in tasks {
        let repeat = if task.repeat.is_empty() {
            String::new()
        } else {
            format!("  [{}]", task.repeat)
        };
        println!("{:>4}  {}  {}{}", task.id, task.date, task.title, repeat);
        if !task.comment.is_empty() {
            println!("            {}", task.comment);
        }
    }
}
