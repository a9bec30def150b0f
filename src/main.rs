use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use dobee_lib::calendar::{CalendarView, Direction, ViewMode};
use dobee_lib::commands::{self, CalendarSnapshot, CommandCtx, CommandResult, TaskFilter};
use dobee_lib::events::{StatePayload, EVENT_STATE_UPDATED};
use dobee_lib::format::{weekday_short, WEEKDAY_INITIALS};
use dobee_lib::logging::init_logging;
use dobee_lib::models::{NewTask, Settings, Task, TaskPriority, DEFAULT_PROJECT_COLORS};
use dobee_lib::progress::{completion_percent, project_summaries, HoneyStats, Nectar};
use dobee_lib::range::WEEK_LENGTH;
use dobee_lib::state::AppState;
use dobee_lib::storage::StorageError;
use dobee_lib::task_list::SortBy;

#[derive(Parser)]
#[command(name = "dobee", version, about = "Do Bee task calendar")]
struct Cli {
    /// Directory holding data.json and settings.json.
    #[arg(long, env = "DOBEE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a calendar window and the selected day's tasks.
    Calendar {
        /// 5day, week or month. Defaults to the saved setting.
        #[arg(long)]
        view: Option<ViewMode>,
        /// Day to select, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Navigation steps; negative goes back.
        #[arg(
            long,
            default_value_t = 0,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i32).range(-MAX_STEPS..=MAX_STEPS)
        )]
        step: i32,
    },
    /// Add a task.
    Add {
        title: String,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_priority, default_value = "low")]
        priority: TaskPriority,
    },
    /// Toggle a task between open and done.
    Toggle { id: String },
    /// Delete a task.
    Delete { id: String },
    /// List projects, or add/delete one.
    Projects {
        #[arg(long, conflicts_with = "delete")]
        add: Option<String>,
        #[arg(long, requires = "add")]
        color: Option<String>,
        #[arg(long, default_value = "🐝")]
        icon: String,
        #[arg(long)]
        delete: Option<String>,
    },
    /// List tasks, optionally only those due today or in one project.
    List {
        #[arg(long, value_parser = parse_sort_by)]
        sort: Option<SortBy>,
        #[arg(long)]
        today: bool,
        /// Project id.
        #[arg(long)]
        project: Option<String>,
    },
    /// Show today's nectar and honey stats, optionally setting the daily goal first.
    Nectar {
        #[arg(long)]
        goal: Option<u32>,
    },
}

const MAX_STEPS: i64 = 10_000;

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(TaskPriority::Low),
        "medium" => Ok(TaskPriority::Medium),
        "high" => Ok(TaskPriority::High),
        other => Err(format!("unknown priority: {other}")),
    }
}

fn parse_sort_by(raw: &str) -> Result<SortBy, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unknown sort: {raw}"))
}

struct CliCtx {
    data_dir: PathBuf,
}

impl CommandCtx for CliCtx {
    fn data_dir(&self) -> Result<PathBuf, StorageError> {
        Ok(self.data_dir.clone())
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        log::debug!(
            "{EVENT_STATE_UPDATED} tasks={} projects={}",
            payload.tasks.len(),
            payload.projects.len()
        );
    }
}

fn into_result<T>(result: CommandResult<T>) -> Result<T, String> {
    match (result.ok, result.data) {
        (true, Some(data)) => Ok(data),
        _ => Err(result
            .error
            .unwrap_or_else(|| "command failed".to_string())),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(data_dir) = cli
        .data_dir
        .or_else(|| dirs::data_dir().map(|dir| dir.join("dobee")))
    else {
        eprintln!("error: no data directory; pass --data-dir or set DOBEE_DATA_DIR");
        return ExitCode::FAILURE;
    };

    if let Err(error) = init_logging(&data_dir) {
        eprintln!("warning: file logging disabled: {error}");
    }

    let ctx = CliCtx { data_dir };
    let state = AppState::new(Vec::new(), Vec::new(), Settings::default());
    let outcome = into_result(commands::load_state(&ctx, &state))
        .and_then(|_| run(&ctx, &state, cli.command));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("command failed: {message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &CliCtx, state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Calendar { view, date, step } => {
            let mode = view.unwrap_or(state.settings().default_view);
            let mut calendar = CalendarView::starting_today(mode);
            if let Some(date) = date {
                calendar.jump_to(date);
            }
            let direction = if step < 0 {
                Direction::Prev
            } else {
                Direction::Next
            };
            for _ in 0..step.unsigned_abs() {
                calendar.step(direction);
            }
            let snapshot = into_result(commands::calendar_page(state, &calendar))?;
            print_calendar(&snapshot);
        }
        Command::Add {
            title,
            due,
            time,
            project,
            category,
            priority,
        } => {
            let input = NewTask {
                title,
                due_date: due,
                due_time: time,
                project_id: project,
                category,
                priority,
                ..NewTask::default()
            };
            let task = into_result(commands::create_task(ctx, state, input))?;
            println!("added {} {}", task.id, task.title);
        }
        Command::Toggle { id } => {
            let task = into_result(commands::toggle_task(ctx, state, &id))?;
            println!("{} {}", checkbox(&task), task.title);
        }
        Command::Delete { id } => {
            into_result(commands::delete_task(ctx, state, &id))?;
            println!("deleted {id}");
        }
        Command::Projects {
            add,
            color,
            icon,
            delete,
        } => {
            if let Some(name) = add {
                let color = color.unwrap_or_else(|| {
                    let index = state.projects().len() % DEFAULT_PROJECT_COLORS.len();
                    DEFAULT_PROJECT_COLORS[index].to_string()
                });
                let project =
                    into_result(commands::create_project(ctx, state, &name, &color, &icon))?;
                println!("added project {}", project.id);
            }
            if let Some(project_id) = delete {
                let detached = into_result(commands::delete_project(ctx, state, &project_id))?;
                println!("deleted project {project_id} ({detached} tasks unassigned)");
            }
            print_projects(state);
        }
        Command::List {
            sort,
            today,
            project,
        } => {
            let sort_by = sort.unwrap_or(state.settings().sort_by);
            let now = Local::now().date_naive();
            let filter = TaskFilter {
                due_on: today.then_some(now),
                project_id: project,
            };
            let tasks = into_result(commands::list_tasks(state, sort_by, &filter, now.year()))?;
            for task in &tasks {
                print_task_line(task);
            }
            println!("{}% done", completion_percent(&tasks));
        }
        Command::Nectar { goal } => {
            if let Some(goal) = goal {
                into_result(commands::set_daily_goal(ctx, state, goal))?;
            }
            let honey = into_result(commands::stats(state))?;
            print_stats(&honey);
        }
    }
    Ok(())
}

fn checkbox(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn print_task_line(task: &Task) {
    let due = task.due_date.as_deref().unwrap_or("-");
    println!("{} {:<32} {:<12} {}", checkbox(task), task.title, due, task.id);
}

fn print_calendar(snapshot: &CalendarSnapshot) {
    println!("{} ({})", snapshot.header, snapshot.mode.label());

    if snapshot.mode == ViewMode::Month {
        let header: Vec<String> = WEEKDAY_INITIALS
            .iter()
            .map(|initial| format!("{initial:^7}"))
            .collect();
        println!("{}", header.join(""));
    } else {
        let header: Vec<String> = snapshot
            .days
            .iter()
            .map(|day| format!("{:^7}", weekday_short(day.cell.date)))
            .collect();
        println!("{}", header.join(""));
    }

    for row in snapshot.days.chunks(WEEK_LENGTH) {
        let numbers: Vec<String> = row
            .iter()
            .map(|day| {
                let number = day.cell.date.day();
                let text = if day.is_selected {
                    format!("[{number:>2}]")
                } else if day.is_today {
                    format!("<{number:>2}>")
                } else if day.cell.is_current_month {
                    format!(" {number:>2} ")
                } else {
                    format!("({number:>2})")
                };
                format!("{text:^7}")
            })
            .collect();
        println!("{}", numbers.join(""));

        let dots: Vec<String> = row
            .iter()
            .map(|day| {
                let mut text = "·".repeat(day.indicators.dots.len());
                if let Some(label) = day.indicators.overflow_label() {
                    text.push_str(&label);
                }
                format!("{text:^7}")
            })
            .collect();
        println!("{}", dots.join(""));
    }

    println!();
    println!("{}", snapshot.selected_label);
    if snapshot.selected_tasks.is_empty() {
        println!("  nothing due");
    }
    for task in &snapshot.selected_tasks {
        print!("  ");
        print_task_line(task);
    }
    println!();
    print_nectar(snapshot.nectar);
}

fn print_nectar(nectar: Nectar) {
    let cells: String = nectar
        .cells()
        .into_iter()
        .map(|filled| if filled { '⬢' } else { '⬡' })
        .collect();
    println!(
        "nectar {}/{} {} {}%",
        nectar.completed,
        nectar.goal,
        cells,
        nectar.percent()
    );
    if nectar.goal_reached() {
        println!("daily goal reached");
    }
}

fn print_stats(honey: &HoneyStats) {
    print_nectar(honey.today);
    println!(
        "this month {} ({} jars)  all time {} ({} jars)",
        honey.month, honey.month_jars, honey.all_time, honey.all_time_jars
    );
    for bar in &honey.week {
        let initial = WEEKDAY_INITIALS[bar.date.weekday().num_days_from_sunday() as usize];
        let width = (bar.height / 10) as usize;
        println!(
            "{initial} {:<10} {:>3}% {}",
            "█".repeat(width),
            bar.height,
            bar.completed
        );
    }
}

fn print_projects(state: &AppState) {
    let tasks = state.tasks();
    let projects = state.projects();
    for (project, summary) in projects.iter().zip(project_summaries(&tasks, &projects)) {
        println!(
            "{} {:<20} {} {}/{} done  {}",
            project.icon, project.name, project.color, summary.completed, summary.total, project.id
        );
    }
}
