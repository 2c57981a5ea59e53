use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medoffice_client::{ApiConnection, ResourceApi};
use medoffice_core::{builtin_views, find_view, AppConfig, ListController, RescheduleController};
use medoffice_export::ExportFormat;
use medoffice_types::{FieldMap, RecordId};

#[derive(Parser)]
#[command(name = "medoffice")]
#[command(about = "Medical office administration client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available views
    Views,
    /// Show one page of a view
    List {
        /// View slug (see `views`)
        view: String,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Free-text search term
        #[arg(long)]
        search: Option<String>,
        /// Filter as name=value (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Show one record in full
    Show {
        view: String,
        id: String,
    },
    /// Create a record from field=value pairs
    Create {
        view: String,
        /// Field as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// Update fields of a record
    Update {
        view: String,
        id: String,
        /// Field as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// Delete a record
    Delete {
        view: String,
        id: String,
    },
    /// Export everything matching the current filters of a view
    Export {
        view: String,
        /// Output format: printable, spreadsheet or html
        #[arg(long, default_value = "spreadsheet")]
        format: String,
        /// Free-text search term
        #[arg(long)]
        search: Option<String>,
        /// Filter as name=value (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Move an appointment to another doctor and day
    Reschedule {
        /// Appointment id
        id: String,
        /// Target doctor id
        #[arg(long)]
        doctor: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Slot to book (HH:MM); omit to just list the free slots
        #[arg(long)]
        time: Option<NaiveTime>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medoffice=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_values(
        std::env::var("MEDOFFICE_API_URL").ok(),
        std::env::var("MEDOFFICE_API_TOKEN").ok(),
        std::env::var("MEDOFFICE_PAGE_SIZE").ok(),
    )?;
    tracing::info!("++ medoffice talking to {}", config.base_url());

    let conn = ApiConnection::new(config.base_url(), config.api_token().map(str::to_owned))?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Views) => {
            for view in builtin_views()? {
                println!("{:<16} {}", view.slug, view.title);
            }
        }
        Some(Commands::List {
            view,
            page,
            search,
            filters,
        }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection.clone());
            let mut controller = ListController::new(descriptor);
            if let Some(term) = search {
                controller.set_search(term);
            }
            controller.apply_filter(parse_pairs(&filters)?);
            controller.refresh(&api).await?;
            if page > 1 {
                let ticket = controller.change_page(page)?;
                controller.load(&api, ticket).await?;
            }
            print_page(&controller);
        }
        Some(Commands::Show { view, id }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection);
            let record = api.get(&RecordId::new(id)).await?;
            println!("{}", serde_json::to_string_pretty(record.fields())?);
        }
        Some(Commands::Create { view, fields }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection);
            let payload = parse_fields(&fields)?;
            let record = api.create(&payload).await?;
            println!("created record {}", record.id());
        }
        Some(Commands::Update { view, id, fields }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection);
            let payload = parse_fields(&fields)?;
            let record = api.update(&RecordId::new(id), &payload).await?;
            println!("updated record {}", record.id());
        }
        Some(Commands::Delete { view, id }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection);
            let id = RecordId::new(id);
            match api.delete(&id).await {
                Ok(()) => println!("deleted record {id}"),
                Err(e) if e.is_not_found() => println!("record {id} was already deleted"),
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Export {
            view,
            format,
            search,
            filters,
        }) => {
            let descriptor = find_view(&view)?;
            let api = conn.resource(descriptor.collection.clone());
            let mut controller = ListController::new(descriptor);
            if let Some(term) = search {
                controller.set_search(term);
            }
            controller.apply_filter(parse_pairs(&filters)?);
            let format: ExportFormat = format.parse()?;
            let today = Local::now().date_naive();
            let file = controller.export_current_view(&api, format, today).await?;
            std::fs::write(&file.name, &file.bytes)?;
            println!("wrote {}", file.name);
        }
        Some(Commands::Reschedule {
            id,
            doctor,
            date,
            time,
        }) => {
            let descriptor = find_view("appointments")?;
            let resources = conn.resource(descriptor.collection.clone());
            let schedule = conn.schedule(descriptor.collection);
            let appointment = resources.get(&RecordId::new(id)).await?;

            let mut controller = RescheduleController::new();
            controller
                .begin(&schedule, &appointment, RecordId::new(doctor), date)
                .await?;

            match time {
                None => {
                    let proposal = controller
                        .proposal()
                        .ok_or_else(|| anyhow::anyhow!("no slot proposal received"))?;
                    if proposal.is_empty() {
                        println!("no free slots on {date}");
                    } else {
                        println!("free slots on {date}:");
                        for slot in &proposal.candidate_times {
                            println!("  {}", slot.format("%H:%M"));
                        }
                    }
                }
                Some(time) => {
                    let record = controller.commit(&schedule, time).await?;
                    println!(
                        "appointment {} moved to {date} {}",
                        record.id(),
                        time.format("%H:%M")
                    );
                }
            }
        }
        None => {
            println!("Use 'medoffice --help' for commands");
        }
    }

    Ok(())
}

fn print_page(controller: &ListController) {
    let columns = &controller.descriptor().columns;
    let Some(page) = controller.page() else {
        println!("nothing loaded");
        return;
    };
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", labels.join(" | "));
    for record in &page.items {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.display_value(&c.key))
            .collect();
        println!("{}", cells.join(" | "));
    }
    println!(
        "page {} of {} ({} records)",
        page.page_index,
        page.total_pages(),
        page.total_count
    );
}

/// Splits repeatable `name=value` arguments into string pairs.
fn parse_pairs(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| anyhow::anyhow!("expected name=value, got {entry:?}"))
        })
        .collect()
}

/// Builds a JSON payload from `name=value` pairs. Values that parse as
/// JSON scalars are kept typed (numbers, booleans, null); everything
/// else is a string.
fn parse_fields(raw: &[String]) -> anyhow::Result<FieldMap> {
    let mut map = FieldMap::new();
    for (name, value) in parse_pairs(raw)? {
        let value = match serde_json::from_str::<serde_json::Value>(&value) {
            Ok(json @ serde_json::Value::Number(_))
            | Ok(json @ serde_json::Value::Bool(_))
            | Ok(json @ serde_json::Value::Null) => json,
            _ => serde_json::Value::String(value),
        };
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_requires_an_equals_sign() {
        let pairs = parse_pairs(&["status=ok".into(), "doctor = 3".into()]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("status".to_string(), "ok".to_string()),
                ("doctor".to_string(), "3".to_string()),
            ]
        );
        assert!(parse_pairs(&["nonsense".into()]).is_err());
    }

    #[test]
    fn test_parse_fields_keeps_json_scalars_typed() {
        let map = parse_fields(&[
            "age=42".into(),
            "active=true".into(),
            "phone=null".into(),
            "name=Ana".into(),
            "room=12b".into(),
        ])
        .unwrap();
        assert_eq!(map["age"], serde_json::json!(42));
        assert_eq!(map["active"], serde_json::json!(true));
        assert_eq!(map["phone"], serde_json::Value::Null);
        assert_eq!(map["name"], serde_json::json!("Ana"));
        assert_eq!(map["room"], serde_json::json!("12b"));
    }
}
