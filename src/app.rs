//! Interactive to-do session: cached task count and the menu loop.
//!
//! The loop reads from any `BufRead` and writes to any `Write`, so tests can
//! drive it with scripted input instead of a terminal.

use crate::error::Result;
use crate::tasks::{Task, TaskStore};
use chrono::Local;
use comfy_table::{presets::ASCII_MARKDOWN, ContentArrangement, Table};
use std::io::{BufRead, Write};

/// Notice shown when the current user has no stored tasks.
const NO_TASKS_NOTICE: &str = "No tasks available right now. Maybe you would like to add one?";

/// Notice shown for unrecognized menu choices and unparseable input.
const INVALID_OPTION_NOTICE: &str = "Please choose a valid option only!";

/// One user's to-do session over a task store.
///
/// Holds the title-cased user name and a cached count of that user's tasks.
/// The cache is refreshed against the store at the top of every operation,
/// so it always reflects durable state before a decision is made on it.
pub struct TodoApp<S: TaskStore> {
    user: String,
    store: S,
    task_count: usize,
}

impl<S: TaskStore> TodoApp<S> {
    /// Create a session for the given user, normalizing the name to
    /// title case.
    pub fn new(user: &str, store: S) -> Self {
        Self { user: title_case(user), store, task_count: 0 }
    }

    /// The normalized display name of the session's user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The cached number of tasks belonging to the session's user.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.task_count
    }

    /// Re-read the user's task count from the store.
    ///
    /// A store failure keeps the stale cache and logs a warning; the next
    /// refresh reconciles it.
    fn refresh_count(&mut self) {
        match self.store.count_by_user(&self.user) {
            Ok(count) => self.task_count = count,
            Err(e) => log::warn!("Error refreshing task count: {e}"),
        }
    }

    /// Print the user's tasks as a table, or a notice when there are none.
    ///
    /// Storage and formatting failures are printed and the session
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn list_tasks(&mut self, out: &mut impl Write) -> Result<()> {
        self.refresh_count();
        if self.task_count == 0 {
            writeln!(out, "{NO_TASKS_NOTICE}")?;
            return Ok(());
        }

        match self.store.query_by_user(&self.user) {
            Ok(tasks) => {
                let mut table = Table::new();
                table
                    .load_preset(ASCII_MARKDOWN)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["TASK ID", "DATE ADDED", "TASK DETAILS"]);
                for task in &tasks {
                    table.add_row(vec![
                        task.id.to_string(),
                        task.display_date(),
                        task.task.clone(),
                    ]);
                }
                writeln!(out, "{table}")?;
            }
            Err(e) => writeln!(out, "Error during loading: {e}")?,
        }

        Ok(())
    }

    /// Add a task with the given details, timestamped now.
    ///
    /// Empty details are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_task(&mut self, details: &str) -> Result<Task> {
        self.refresh_count();
        let task = self.store.insert(&self.user, &Local::now().to_rfc3339(), details)?;
        self.task_count += 1;
        Ok(task)
    }

    /// Mark the task with the given id as completed.
    ///
    /// Storage errors are logged, not raised; completing a missing id is a
    /// no-op.
    pub fn complete_task(&mut self, id: i64) {
        self.refresh_count();
        if let Err(e) = self.store.complete_by_id(id) {
            log::error!("Error completing task: {e}");
        }
    }

    /// Delete the task with the given id.
    ///
    /// Storage errors are logged, not raised; deleting a missing id is a
    /// no-op. The cached count is reconciled by the next refresh.
    pub fn delete_task(&mut self, id: i64) {
        self.refresh_count();
        if let Err(e) = self.store.delete_by_id(id) {
            log::error!("Error during task deletion: {e}");
        }
    }

    /// The text of the user's earliest-recorded task, or `None` when they
    /// have no tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn nearest_task(&mut self) -> Result<Option<String>> {
        self.refresh_count();
        Ok(self.store.first_by_user(&self.user)?.map(|task| task.task))
    }

    /// Run the interactive menu loop until the exit choice or end of input.
    ///
    /// Unparseable menu choices and task ids print a notice and redisplay
    /// the menu rather than ending the session.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn run(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(out, "WELCOME TO {}'S TASK LIST!", self.user.to_uppercase())?;
        writeln!(out, "---------------------------")?;

        loop {
            print_menu(out)?;

            let Some(line) = prompt(input, out, "Action: ")? else { break };
            let Ok(choice) = line.trim().parse::<i64>() else {
                writeln!(out, "{INVALID_OPTION_NOTICE}")?;
                continue;
            };

            match choice {
                1 => self.list_tasks(out)?,
                2 => {
                    let Some(details) = prompt(input, out, "Please input task details: ")? else {
                        break;
                    };
                    if let Err(e) = self.add_task(&details) {
                        writeln!(out, "Error adding task: {e}")?;
                    }
                }
                3 => {
                    let Some(answer) = prompt(input, out, "Input task ID, or C to cancel: ")?
                    else {
                        break;
                    };
                    if let Some(id) = parse_task_id(&answer, out)? {
                        self.complete_task(id);
                        writeln!(out, "Marked task {id} as completed!")?;
                    }
                }
                4 => match self.nearest_task() {
                    Ok(Some(task)) => writeln!(out, "Here is your next upcoming task: {task}")?,
                    Ok(None) => writeln!(out, "{NO_TASKS_NOTICE}")?,
                    Err(e) => writeln!(out, "Error during loading: {e}")?,
                },
                5 => {
                    let Some(answer) = prompt(input, out, "Input task ID, or 'C' to cancel: ")?
                    else {
                        break;
                    };
                    if let Some(id) = parse_task_id(&answer, out)? {
                        self.delete_task(id);
                    }
                }
                6 => {
                    writeln!(out, "Exiting...")?;
                    break;
                }
                _ => writeln!(out, "{INVALID_OPTION_NOTICE}")?,
            }
        }

        Ok(())
    }
}

/// Print the fixed six-item menu.
fn print_menu(out: &mut impl Write) -> Result<()> {
    writeln!(out, "[1] Show all tasks")?;
    writeln!(out, "[2] Add new task")?;
    writeln!(out, "[3] Mark task as completed")?;
    writeln!(out, "[4] Show nearest due task")?;
    writeln!(out, "[5] Delete task")?;
    writeln!(out, "[6] Exit program")?;
    writeln!(out)?;
    Ok(())
}

/// Print a prompt and read one line, without its trailing newline.
///
/// Returns `None` at end of input.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, text: &str) -> Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Interpret an id-prompt answer.
///
/// `C` or `c` cancels. Anything else must parse as an integer id; otherwise
/// the invalid-option notice is printed and `None` returned.
fn parse_task_id(answer: &str, out: &mut impl Write) -> Result<Option<i64>> {
    let answer = answer.trim();
    if answer == "C" || answer == "c" {
        return Ok(None);
    }
    match answer.parse::<i64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            writeln!(out, "{INVALID_OPTION_NOTICE}")?;
            Ok(None)
        }
    }
}

/// Title-case a display name: first letter of each word upper, rest lower.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
