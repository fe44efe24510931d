//! CLI probe for the task store.
//!
//! # Responsibility
//! - Open a task database and list one page of tasks for a filter.
//! - Keep output deterministic for quick local sanity checks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::info;
use taskdesk_core::{
    init_logging, open_db, sqlite_task_service, LabelId, LoggingConfig, Page, PageRequest, Task,
    TaskFilter, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Parser)]
#[command(name = "taskdesk", version = taskdesk_core::core_version())]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,
    /// `all`, `completed`, or anything else for open tasks.
    #[arg(long, value_name = "STATUS")]
    status: Option<String>,
    #[arg(long, value_name = "low|medium|high")]
    priority: Option<String>,
    /// Tasks must carry every listed label id.
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    labels: Vec<LabelId>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<NaiveDate>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: Option<NaiveDate>,
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
    /// 1-based page number.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    #[arg(long, default_value_t = i64::from(DEFAULT_PAGE_SIZE), allow_negative_numbers = true)]
    limit: i64,
    /// `dueDate`, `priority` or `createdAt`.
    #[arg(long, value_name = "FIELD")]
    sort: Option<String>,
    /// `asc` or `desc`.
    #[arg(long, value_name = "DIRECTION")]
    order: Option<String>,
    /// Absolute directory for log files; logging stays off when omitted.
    #[arg(long, value_name = "PATH")]
    log_dir: Option<PathBuf>,
    #[arg(long, value_name = "LEVEL", requires = "log_dir")]
    log_level: Option<String>,
}

impl Cli {
    fn filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.status.clone(),
            priority: self.priority.clone(),
            label_ids: (!self.labels.is_empty()).then(|| self.labels.clone()),
            start_date: self.start,
            end_date: self.end,
            search: self.search.clone(),
        }
    }

    fn page_request(&self) -> PageRequest {
        PageRequest::from_client(
            self.page,
            self.limit,
            self.sort.as_deref(),
            self.order.as_deref(),
        )
    }

    fn logging(&self) -> Option<LoggingConfig> {
        self.log_dir.as_ref().map(|dir| {
            let config = LoggingConfig::new(dir.clone());
            match &self.log_level {
                Some(level) => config.with_level(level.clone()),
                None => config,
            }
        })
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(config) = cli.logging() {
        init_logging(&config).context("failed to start logging")?;
    }

    let conn = open_db(&cli.db_path)
        .with_context(|| format!("failed to open {}", cli.db_path.display()))?;
    let service = sqlite_task_service(&conn)?;
    let page = service.find_tasks(&cli.filter(), &cli.page_request())?;
    info!(
        "event=cli_list module=cli status=ok returned={} total={}",
        page.content.len(),
        page.total_elements
    );

    print!("{}", render_page(&page));
    Ok(())
}

fn render_page(page: &Page<Task>) -> String {
    let mut out = format!(
        "page {}/{} total={}\n",
        page.request.client_page(),
        page.total_pages(),
        page.total_elements
    );
    for task in &page.content {
        let labels: Vec<&str> = task.labels.iter().map(|label| label.name.as_str()).collect();
        out.push_str(&format!(
            "{} [{}] {:<6} {} due={} labels={}\n",
            task.id,
            if task.completed { "x" } else { " " },
            task.priority.as_str(),
            task.title,
            task.due_date
                .map_or_else(|| "-".to_string(), |due| due.to_string()),
            labels.join(",")
        ));
    }
    out
}
