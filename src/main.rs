use std::sync::Arc;

use daily_planner::config::{PlannerConfig, Theme};
use daily_planner::core::calendar_grid::{DayCell, WEEKDAY_LABELS, weeks};
use daily_planner::core::date_key::DateKey;
use daily_planner::core::note::NoteId;
use daily_planner::message::Message;
use daily_planner::planner::Planner;
use daily_planner::sync::SyncController;
use daily_planner::sync::http::HttpPlannerClient;

const USAGE: &str = "\
usage: planner [--date YEAR-MONTH-DAY] <command>

commands:
  month                 show the month grid with open-note counts
  day                   show notes and the on-this-day fact
  add <text>            add a note to the selected day
  complete <note-id>    mark a note complete
  on-this-day           fetch and store the historical fact for the day
  theme [light|dark|toggle]";

enum Command {
    Month,
    Day,
    Add(String),
    Complete(NoteId),
    OnThisDay,
    Theme(Option<String>),
}

fn parse_args(args: &[String]) -> Result<(Option<DateKey>, Command), String> {
    let mut date = None;
    let mut rest = args;
    if rest.first().map(String::as_str) == Some("--date") {
        let raw = rest.get(1).ok_or("--date needs a value")?;
        date = Some(raw.parse::<DateKey>().map_err(|e| e.to_string())?);
        rest = &rest[2..];
    }

    let (name, tail) = rest.split_first().ok_or("missing command")?;
    let command = match name.as_str() {
        "month" => Command::Month,
        "day" => Command::Day,
        "add" => Command::Add(tail.join(" ")),
        "complete" => {
            let id = tail.first().ok_or("complete needs a note id")?;
            Command::Complete(NoteId::from(id.as_str()))
        }
        "on-this-day" => Command::OnThisDay,
        "theme" => Command::Theme(tail.first().cloned()),
        other => return Err(format!("unknown command {:?}", other)),
    };
    Ok((date, command))
}

fn install_logger(config: &PlannerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Journal output (`journalctl --user -t daily-planner -f`): this crate at
    // info/debug per config, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("daily_planner") || metadata.target().starts_with("planner") {
                let max = if daily_planner::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    let journal = systemd_journal_logger::JournalLog::new()?
        .with_syslog_identifier("daily-planner".to_string());

    daily_planner::set_debug_logging(config.debug_logging);

    log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

fn print_month(planner: &Planner) {
    println!("{:^28}", planner.selection().displayed_month.to_string());
    println!(
        "{}",
        WEEKDAY_LABELS.iter().map(|l| format!("{:>4}", l)).collect::<String>()
    );
    let cells = planner.grid();
    for week in weeks(&cells) {
        let line: String = week.iter().map(cell_label).collect();
        println!("{}", line.trim_end());
    }
}

/// Four columns per cell: selection mark, day, open-note count (`+` past 9).
fn cell_label(cell: &DayCell) -> String {
    match cell {
        DayCell::Padding => "    ".to_string(),
        DayCell::Day {
            day,
            is_today,
            is_selected,
            indicator_count,
            ..
        } => {
            let mark = if *is_selected {
                '['
            } else if *is_today {
                '*'
            } else {
                ' '
            };
            let count = match *indicator_count {
                0 => ' ',
                n @ 1..=9 => char::from_digit(n as u32, 10).unwrap_or('+'),
                _ => '+',
            };
            format!("{}{:>2}{}", mark, day, count)
        }
    }
}

fn print_day(planner: &Planner) {
    let date = planner.selection().selected_date;
    println!("{}", date.as_naive().format("%A, %B %-d %Y"));

    let Some(detail) = planner.day_detail() else {
        println!("  (not loaded)");
        return;
    };

    println!("\nOn this day:");
    match &detail.on_this_day {
        Some(fact) => println!("  {} ({})\n  {}", fact.title, fact.year, fact.wiki_link),
        None => println!("  nothing yet; run `planner --date {} on-this-day`", date),
    }

    println!("\nNotes:");
    if detail.notes.is_empty() {
        println!("  none");
    }
    for note in &detail.notes {
        let check = if note.is_completed { 'x' } else { ' ' };
        println!("  [{}] {}  (id {})", check, note.content, note.id);
    }
    if !planner.can_add_note() {
        println!("\n  past day: new notes are not accepted");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = PlannerConfig::default_path();
    let config = PlannerConfig::load_or_default(&config_path);

    if let Err(e) = install_logger(&config) {
        eprintln!("journal logging unavailable: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (date, command) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let client = HttpPlannerClient::new(&config.effective_service_url())?;
    log::info!("Using planner service at {}", client.base_url());

    let mut planner = Planner::new(config.theme);
    if let Some(date) = date {
        planner = planner.on_date(date);
    }
    let mut controller = SyncController::new(Arc::new(client), planner)
        .with_config(config.clone(), config_path);

    if let Command::Theme(choice) = &command {
        let message = match choice.as_deref() {
            None => {
                println!("{}", controller.planner().theme().as_str());
                return Ok(());
            }
            Some("toggle") => Message::ToggleTheme,
            Some(name) => match Theme::from_name(name) {
                Some(theme) => Message::SetTheme(theme),
                None => {
                    eprintln!("unknown theme {:?}\n\n{}", name, USAGE);
                    std::process::exit(2);
                }
            },
        };
        controller.dispatch(message);
        println!("{}", controller.planner().theme().as_str());
        return Ok(());
    }

    controller.start();
    controller.settle().await;

    match command {
        Command::Month => print_month(controller.planner()),
        Command::Day => print_day(controller.planner()),
        Command::Add(text) => {
            if let Err(reason) = daily_planner::planner::validate_note(
                &text,
                controller.planner().selection().selected_date,
                controller.planner().today(),
            ) {
                eprintln!("not added: {}", reason);
                std::process::exit(1);
            }
            controller.dispatch(Message::AddNote(text));
            controller.settle().await;
            print_day(controller.planner());
        }
        Command::Complete(id) => {
            controller.dispatch(Message::CompleteNote(id));
            controller.settle().await;
            print_day(controller.planner());
        }
        Command::OnThisDay => {
            controller.dispatch(Message::FetchOnThisDay);
            controller.settle().await;
            print_day(controller.planner());
        }
        Command::Theme(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_cell(day: u32, indicator_count: usize) -> DayCell {
        DayCell::Day {
            day,
            date: DateKey::new(2024, 2, day).unwrap(),
            is_today: false,
            is_selected: false,
            is_past: false,
            indicator_count,
        }
    }

    #[test]
    fn cells_keep_their_width() {
        assert_eq!(cell_label(&DayCell::Padding), "    ");
        assert_eq!(cell_label(&day_cell(5, 0)), "  5 ");
        assert_eq!(cell_label(&day_cell(15, 3)), " 153");
        assert_eq!(cell_label(&day_cell(15, 12)), " 15+");
        for cell in [day_cell(1, 0), day_cell(28, 9), day_cell(29, 250)] {
            assert_eq!(cell_label(&cell).chars().count(), 4);
        }
    }

    #[test]
    fn date_flag_is_parsed_before_the_command() {
        let args: Vec<String> = ["--date", "2024-2-9", "day"].iter().map(|s| s.to_string()).collect();
        let (date, command) = parse_args(&args).unwrap();
        assert_eq!(date, Some(DateKey::new(2024, 2, 9).unwrap()));
        assert!(matches!(command, Command::Day));
    }
}
