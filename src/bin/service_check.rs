use daily_planner::config::PlannerConfig;
use daily_planner::core::date_key::DateKey;
use daily_planner::core::day_detail::DayDetail;
use daily_planner::core::month_aggregate::MonthAggregate;
use daily_planner::sync::http::HttpPlannerClient;
use daily_planner::sync::service::PlannerService;

#[tokio::main]
async fn main() {
    if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
        let _ = journal
            .with_syslog_identifier("daily-planner-check".to_string())
            .install();
    }
    log::set_max_level(log::LevelFilter::Info);

    let config = PlannerConfig::load_or_default(&PlannerConfig::default_path());
    let url = config.effective_service_url();

    println!("=== Planner service check ===\n");
    println!("Service: {}", url);

    let client = match HttpPlannerClient::new(&url) {
        Ok(c) => c,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };

    let today = DateKey::today();
    let month = today.year_month();
    let mut failures = 0;

    println!("\n--- Month {} ---", month);
    match client.get_month_data(month.year(), month.month()).await {
        Ok(entries) => {
            let raw = entries.len();
            let outside = entries.iter().filter(|(d, _)| !month.contains(*d)).count();
            let aggregate = MonthAggregate::from_entries(month, entries);
            println!("  Days with records: {}", raw);
            if aggregate.is_empty() {
                println!("  No notes this month");
            }
            if outside > 0 {
                println!("  WARNING: {} entries outside the requested month", outside);
            }
            for date in month.iter_days() {
                let notes = aggregate.notes_for(date);
                if !notes.is_empty() {
                    println!(
                        "    {:>10}  {} open / {} total",
                        date.to_string(),
                        aggregate.indicator_count(date),
                        notes.len()
                    );
                }
            }
        }
        Err(e) => {
            failures += 1;
            println!("  Error: {}", e);
        }
    }

    println!("\n--- Day {} ---", today);
    match client.get_day_data(today).await {
        Ok(records) => {
            if records.len() > 1 {
                println!("  WARNING: {} records for one day", records.len());
            }
            if records.is_empty() {
                println!("  No record yet");
            }
            let detail = DayDetail::from_records(records);
            println!("  Notes: {} ({} open)", detail.notes.len(), detail.open_count());
            match &detail.on_this_day {
                Some(fact) => println!("  On this day: {} ({})", fact.title, fact.year),
                None => println!("  On this day: not fetched"),
            }
        }
        Err(e) => {
            failures += 1;
            println!("  Error: {}", e);
        }
    }

    if failures == 0 {
        println!("\n=== Service reachable ===");
    } else {
        println!("\n=== {} check(s) failed ===", failures);
        std::process::exit(1);
    }
}
