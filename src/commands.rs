use uuid::Uuid;

use studyplan::Planner;
use studyplan::core::goal::{Goal, GoalFields};
use studyplan::core::task::{Task, TaskFields};
use studyplan::core::task_store::{SortKey, SubjectFilter};
use studyplan::core::timeline;

pub const USAGE: &str = "\
Usage: studyplan <command> [args]

Tasks:
  tasks [--subject S] [--sort date|priority|subject]
  timeline
  subjects
  add-task <title> <subject> <due YYYY-MM-DD> [priority] [description]
  edit-task <id> <title> <subject> <due> [priority] [description]
  toggle <id>
  rm-task <id> --yes

Goals:
  goals
  add-goal <title> <target> [current] [deadline] [description]
  edit-goal <id> <title> <target> [current] [deadline] [description]
  progress <id> <current>
  rm-goal <id> --yes

Reminders:
  remind       run one reminder sweep
  watch        keep sweeping until interrupted";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tasks { filter: SubjectFilter, sort: SortKey },
    Timeline,
    Subjects,
    AddTask(TaskFields),
    EditTask(Uuid, TaskFields),
    Toggle(Uuid),
    RemoveTask { id: Uuid, confirmed: bool },
    Goals,
    AddGoal(GoalFields),
    EditGoal(Uuid, GoalFields),
    Progress(Uuid, i64),
    RemoveGoal { id: Uuid, confirmed: bool },
    Remind,
    Watch,
    Help,
}

fn arg(args: &[String], index: usize, name: &str) -> Result<String, String> {
    args.get(index)
        .cloned()
        .ok_or_else(|| format!("missing <{name}>\n\n{USAGE}"))
}

fn opt(args: &[String], index: usize) -> Option<String> {
    args.get(index).cloned()
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("invalid id `{raw}`: {e}"))
}

fn task_fields(args: &[String], start: usize) -> Result<TaskFields, String> {
    let mut fields = TaskFields::new(
        arg(args, start, "title")?,
        arg(args, start + 1, "subject")?,
        arg(args, start + 2, "due")?,
    );
    if let Some(priority) = opt(args, start + 3) {
        fields = fields.with_priority(priority);
    }
    if let Some(description) = opt(args, start + 4) {
        fields = fields.with_description(description);
    }
    Ok(fields)
}

fn goal_fields(args: &[String], start: usize) -> Result<GoalFields, String> {
    Ok(GoalFields::from_input(
        arg(args, start, "title")?,
        &arg(args, start + 1, "target")?,
        &opt(args, start + 2).unwrap_or_default(),
        &opt(args, start + 3).unwrap_or_default(),
        opt(args, start + 4),
    ))
}

/// Parse the arguments that follow the program name.
pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some(name) = args.first() else {
        return Ok(Command::Help);
    };
    let confirmed = args.iter().any(|a| a == "--yes");
    match name.as_str() {
        "tasks" => {
            let mut filter = SubjectFilter::All;
            let mut sort = SortKey::Date;
            let mut rest = args[1..].iter();
            while let Some(flag) = rest.next() {
                match flag.as_str() {
                    "--subject" => {
                        let value = rest.next().ok_or("--subject needs a value")?;
                        filter = SubjectFilter::from_keyword(value);
                    }
                    "--sort" => {
                        let value = rest.next().ok_or("--sort needs a value")?;
                        sort = SortKey::from_keyword(value)
                            .ok_or_else(|| format!("unknown sort key `{value}`"))?;
                    }
                    other => return Err(format!("unknown option `{other}`")),
                }
            }
            Ok(Command::Tasks { filter, sort })
        }
        "timeline" => Ok(Command::Timeline),
        "subjects" => Ok(Command::Subjects),
        "add-task" => Ok(Command::AddTask(task_fields(args, 1)?)),
        "edit-task" => Ok(Command::EditTask(
            parse_id(&arg(args, 1, "id")?)?,
            task_fields(args, 2)?,
        )),
        "toggle" => Ok(Command::Toggle(parse_id(&arg(args, 1, "id")?)?)),
        "rm-task" => Ok(Command::RemoveTask {
            id: parse_id(&arg(args, 1, "id")?)?,
            confirmed,
        }),
        "goals" => Ok(Command::Goals),
        "add-goal" => Ok(Command::AddGoal(goal_fields(args, 1)?)),
        "edit-goal" => Ok(Command::EditGoal(
            parse_id(&arg(args, 1, "id")?)?,
            goal_fields(args, 2)?,
        )),
        "progress" => {
            let id = parse_id(&arg(args, 1, "id")?)?;
            let raw = arg(args, 2, "current")?;
            let current = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("progress must be a whole number, got `{raw}`"))?;
            Ok(Command::Progress(id, current))
        }
        "rm-goal" => Ok(Command::RemoveGoal {
            id: parse_id(&arg(args, 1, "id")?)?,
            confirmed,
        }),
        "remind" => Ok(Command::Remind),
        "watch" => Ok(Command::Watch),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

pub fn format_task(task: &Task, today: chrono::NaiveDate) -> String {
    let mut line = format!(
        "[{}] {:<10}  {:<6}  {:<12}  {}  ({})",
        if task.completed { "x" } else { " " },
        task.due_date,
        task.priority.as_keyword().to_uppercase(),
        task.subject,
        task.title,
        task.id
    );
    if task.is_overdue(today) {
        line.push_str("  OVERDUE");
    }
    if let Some(description) = &task.description {
        line.push_str(&format!("\n      {description}"));
    }
    line
}

pub fn format_goal(goal: &Goal) -> String {
    let deadline = goal
        .deadline
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "No deadline".to_string());
    let mut line = format!(
        "{}  {}/{}  {}%  Deadline: {}  ({})",
        goal.title,
        goal.current,
        goal.target,
        goal.progress_percent(),
        deadline,
        goal.id
    );
    if goal.is_complete() {
        line.push_str("  DONE");
    }
    if let Some(description) = &goal.description {
        line.push_str(&format!("\n      {description}"));
    }
    line
}

fn warn_if_unsaved(planner: &Planner) {
    if let Some(e) = planner.last_storage_error() {
        eprintln!("warning: change kept in memory but not saved: {e}");
    }
}

/// Run every command except `watch`, which needs the async runtime.
pub fn execute(command: Command, planner: &mut Planner) -> Result<(), String> {
    let today = planner.clock().today();
    match command {
        Command::Tasks { filter, sort } => {
            let tasks = planner.list_filtered(&filter, sort);
            if tasks.is_empty() {
                println!("No tasks yet. Use `studyplan add-task` to create one.");
            } else {
                println!("{} task(s), sorted by {}", tasks.len(), sort.as_keyword());
            }
            for task in tasks {
                println!("{}", format_task(task, today));
            }
        }
        Command::Timeline => {
            let groups = planner.upcoming_grouped();
            if groups.is_empty() {
                println!("No upcoming deadlines.");
            } else {
                println!("{} upcoming task(s)", timeline::total_count(&groups));
            }
            for group in groups {
                println!("{}", group.due_date);
                for task in group.tasks {
                    println!(
                        "    {} ({} - {} priority)",
                        task.title,
                        task.subject,
                        task.priority.as_keyword().to_uppercase()
                    );
                }
            }
        }
        Command::Subjects => {
            for subject in planner.distinct_subjects() {
                println!("{subject}");
            }
        }
        Command::AddTask(fields) => {
            let task = planner.add_task(fields);
            println!("Added task {}", task.id);
            warn_if_unsaved(planner);
        }
        Command::EditTask(id, fields) => {
            planner.update_task(id, fields).map_err(|e| e.to_string())?;
            println!("Updated task {id}");
            warn_if_unsaved(planner);
        }
        Command::Toggle(id) => {
            let completed = planner.toggle_complete(id).map_err(|e| e.to_string())?;
            println!(
                "Task {id} marked {}",
                if completed { "complete" } else { "incomplete" }
            );
            warn_if_unsaved(planner);
        }
        Command::RemoveTask { id, confirmed } => {
            if !confirmed {
                return Err(format!("refusing to delete task {id} without --yes"));
            }
            if planner.delete_task(id) {
                println!("Deleted task {id}");
            } else {
                println!("No task {id}; nothing deleted");
            }
            warn_if_unsaved(planner);
        }
        Command::Goals => {
            if planner.goals().is_empty() {
                println!("No study goals yet. Use `studyplan add-goal` to set one.");
            }
            for goal in planner.goals() {
                println!("{}", format_goal(goal));
            }
        }
        Command::AddGoal(fields) => {
            let goal = planner.add_goal(fields);
            println!("Added goal {}", goal.id);
            warn_if_unsaved(planner);
        }
        Command::EditGoal(id, fields) => {
            planner.update_goal(id, fields).map_err(|e| e.to_string())?;
            println!("Updated goal {id}");
            warn_if_unsaved(planner);
        }
        Command::Progress(id, current) => {
            let goal = planner
                .set_progress(id, current)
                .map_err(|e| e.to_string())?;
            println!("{}", format_goal(&goal));
            warn_if_unsaved(planner);
        }
        Command::RemoveGoal { id, confirmed } => {
            if !confirmed {
                return Err(format!("refusing to delete goal {id} without --yes"));
            }
            if planner.delete_goal(id) {
                println!("Deleted goal {id}");
            } else {
                println!("No goal {id}; nothing deleted");
            }
            warn_if_unsaved(planner);
        }
        Command::Help => println!("{USAGE}"),
        Command::Remind | Command::Watch => {
            return Err("reminder commands are handled by the runtime".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan::storage::MemoryStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_tasks_options() {
        let cmd = parse(&args(&["tasks", "--subject", "Bio", "--sort", "priority"])).unwrap();
        assert_eq!(
            cmd,
            Command::Tasks {
                filter: SubjectFilter::Only("Bio".into()),
                sort: SortKey::Priority
            }
        );
        assert!(parse(&args(&["tasks", "--sort", "size"])).is_err());
    }

    #[test]
    fn parse_add_task_keeps_raw_priority() {
        let cmd = parse(&args(&["add-task", "Read Ch.3", "Bio", "2026-03-01", "urgent"])).unwrap();
        let Command::AddTask(fields) = cmd else {
            panic!("expected add-task");
        };
        assert_eq!(fields.priority, "urgent");
        assert_eq!(fields.description, None);
    }

    #[test]
    fn parse_add_goal_coerces() {
        let cmd = parse(&args(&["add-goal", "Flashcards", "-5", "10"])).unwrap();
        let Command::AddGoal(fields) = cmd else {
            panic!("expected add-goal");
        };
        assert_eq!((fields.target, fields.current), (1, 1));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse(&args(&["toggle", "not-a-uuid"])).is_err());
        assert!(parse(&args(&["add-task", "only title"])).is_err());
        assert!(parse(&args(&["frobnicate"])).is_err());
        assert_eq!(parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut planner = Planner::load(Box::new(MemoryStore::new()));
        let task = planner.add_task(TaskFields::new("Essay", "History", "2026-03-01"));
        let cmd = parse(&args(&["rm-task", &task.id.to_string()])).unwrap();
        assert!(execute(cmd, &mut planner).is_err());
        assert_eq!(planner.tasks().len(), 1);

        let cmd = parse(&args(&["rm-task", &task.id.to_string(), "--yes"])).unwrap();
        execute(cmd, &mut planner).unwrap();
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut planner = Planner::load(Box::new(MemoryStore::new()));
        let cmd = Command::Toggle(Uuid::new_v4());
        assert!(execute(cmd, &mut planner).unwrap_err().contains("no task"));
    }

    #[test]
    fn overdue_rows_are_marked() {
        let mut planner = Planner::load(Box::new(MemoryStore::new()));
        let task = planner.add_task(TaskFields::new("Quiz", "Math", "2026-01-05"));
        let today = chrono::NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        assert!(format_task(&task, today).ends_with("OVERDUE"));
    }

    #[test]
    fn completed_goals_are_marked() {
        let mut planner = Planner::load(Box::new(MemoryStore::new()));
        let goal = planner.add_goal(GoalFields::new("Flashcards", 3).with_current(2));
        assert!(!format_goal(&goal).contains("DONE"));
        let goal = planner.set_progress(goal.id, 3).unwrap();
        assert!(format_goal(&goal).ends_with("DONE"));
    }

    #[test]
    fn blank_titles_are_stored_as_untitled() {
        let mut planner = Planner::load(Box::new(MemoryStore::new()));
        let cmd = parse(&args(&["add-task", "  ", "Bio", "2026-03-01"])).unwrap();
        execute(cmd, &mut planner).unwrap();
        assert_eq!(planner.tasks()[0].title, "Untitled");
    }
}
