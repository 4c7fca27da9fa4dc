//! `carona` - CLI for the carpool ledger
//!
//! Each invocation loads the ledger, applies one command, and writes the
//! ledger back when the command changed it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;

use carpool::backup;
use carpool::cli::{
    to_index, AddTripCommand, BackupCommand, Cli, Command, ConfigCommand, ExportTextCommand,
    ParticipantCommand, TripCommand, WeekCommand,
};
use carpool::names::{merge_names, parse_name_list};
use carpool::summary::format_money;
use carpool::week::WeekEntry;
use carpool::{init_logging, Config, Session, TripType};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let command = match cli.command {
        Command::Config(cmd) => return handle_config(cli.config, cmd),
        command => command,
    };

    let config = Config::load_from(cli.config).context("loading configuration")?;

    let mut session = Session::open(config).context("opening ledger store")?;
    match command {
        Command::Status(cmd) => handle_status(&session, cmd.json),
        Command::Week(cmd) => handle_week(&mut session, cmd),
        Command::Trip(cmd) => handle_trip(&mut session, cmd),
        Command::Participant(cmd) => handle_participant(&mut session, cmd),
        Command::Names(cmd) => handle_names(&session, cmd.json),
        Command::Backup(cmd) => handle_backup(&mut session, cmd),
        Command::ExportText(cmd) => handle_export_text(&session, &cmd),
        Command::Config(_) => Ok(()),
    }
}

fn handle_status(session: &Session, json: bool) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let stats = session.stats();
    let today = Local::now().date_naive();
    let past_due = ledger.past_due_trips(today);
    let overdue_unpaid: usize = past_due
        .iter()
        .map(|&i| {
            let trip = &ledger.active_trips()[i];
            trip.participants.len() - trip.paid_count()
        })
        .sum();
    let store = session.storage().stats().context("reading store statistics")?;

    if json {
        let status = serde_json::json!({
            "week": ledger.current_week_name(),
            "trips": ledger.active_trips().len(),
            "payers": stats.payers,
            "participants": stats.participants,
            "total_received": stats.total_received,
            "fare": session.config().ledger.fare,
            "overdue_unpaid": overdue_unpaid,
            "archived_weeks": ledger.archives().len(),
            "storage": store,
            "database_path": session.storage().path(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Semana Ativa: {}", ledger.current_week_name());
        println!("-------------");
        println!("Trips:          {}", ledger.active_trips().len());
        println!("Total:          {}", format_money(stats.total_received));
        println!("Payments:       {} / {}", stats.payers, stats.participants);
        if overdue_unpaid > 0 {
            println!("Overdue unpaid: {overdue_unpaid}");
        }
        println!("Archived weeks: {}", ledger.archives().len());
        println!();
        println!("Database:       {}", session.storage().path().display());
        println!("Size:           {} bytes", store.db_size_bytes);
        if let Some(updated) = store.last_updated {
            println!("Last saved:     {updated}");
        }
    }
    Ok(())
}

fn handle_week(session: &mut Session, cmd: WeekCommand) -> anyhow::Result<()> {
    let now = Local::now();
    match cmd {
        WeekCommand::New { date } => {
            let change = session.update(|l| l.create_week(date, &now))?;
            if let Some(archived) = change.archived {
                println!("Previous week archived as \"{archived}\".");
            }
            println!("Week \"{}\" started.", change.active);
        }
        WeekCommand::Select { name } => {
            let change = session.update(|l| l.select_week(&name, &now))?;
            if let Some(archived) = change.archived {
                println!("Previous week archived as \"{archived}\".");
            }
            println!("Week \"{}\" loaded.", change.active);
        }
        WeekCommand::Delete { name, yes } => {
            if !yes {
                println!("This will permanently delete week \"{name}\".");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            session.update(|l| l.delete_week(&name))?;
            println!("Week \"{name}\" deleted.");
        }
        WeekCommand::Rename { name } => {
            let applied = session.update(|l| l.rename_active_week(&name))?;
            println!("Active week renamed to \"{applied}\".");
        }
        WeekCommand::List { json } => {
            let tree = session.ledger().week_tree();
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else if tree.is_empty() {
                println!("No weeks yet. Start one with `carona week new <DATE>`.");
            } else {
                for year in &tree.years {
                    println!("{}", year.year);
                    for month in &year.months {
                        println!("  {}", month.label);
                        for week in &month.weeks {
                            print_week_entry(session, week);
                        }
                    }
                }
                if !tree.other.is_empty() {
                    println!("Outros Arquivos");
                    for week in &tree.other {
                        print_week_entry(session, week);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_week_entry(session: &Session, week: &WeekEntry) {
    let ledger = session.ledger();
    let trips = if week.active {
        ledger.active_trips().len()
    } else {
        ledger.archive(&week.name).map_or(0, <[_]>::len)
    };
    let marker = if week.active { '*' } else { ' ' };
    println!("    {marker} {} ({trips} trips)", week.name);
}

fn collect_riders(session: &Session, cmd: &AddTripCommand) -> anyhow::Result<Vec<String>> {
    let known = session.ledger().unique_names();
    for pick in &cmd.picks {
        if !known.contains(pick) {
            bail!("\"{pick}\" is not a recorded participant; see `carona names`");
        }
    }

    let from_file = match &cmd.names_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading names from {}", path.display()))?;
            parse_name_list(&text)
        }
        None => Vec::new(),
    };

    Ok(merge_names(
        cmd.picks.iter().chain(&cmd.names).chain(&from_file),
    ))
}

fn handle_trip(session: &mut Session, cmd: TripCommand) -> anyhow::Result<()> {
    match cmd {
        TripCommand::Add(add) => {
            let riders = collect_riders(session, &add)?;
            let trip_type = TripType::from(add.trip_type);
            let now = Local::now();
            let index = session.update(|l| l.add_trip(add.date, trip_type, &riders, &now))?;
            let trip = &session.ledger().active_trips()[index];
            println!(
                "Trip {} added: {} - {} ({} participants).",
                index + 1,
                trip.day,
                trip.trip_type,
                trip.participants.len()
            );
        }
        TripCommand::List { json } => print_trips(session, json)?,
        TripCommand::Delete { trip, yes } => {
            if !yes {
                println!("This will delete trip {trip} and its payments.");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            let removed = session.update(|l| l.delete_trip(to_index(trip)))?;
            println!("Trip deleted: {} - {}.", removed.day, removed.trip_type);
        }
    }
    Ok(())
}

fn print_trips(session: &Session, json: bool) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let today = Local::now().date_naive();
    let past_due = ledger.past_due_trips(today);
    let groups = ledger.day_groups();

    if json {
        let out = serde_json::json!({
            "week": ledger.current_week_name(),
            "trips": ledger.active_trips(),
            "days": groups,
            "past_due": past_due,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", ledger.current_week_name());
    if ledger.active_trips().is_empty() {
        println!("No trips in the active week.");
        return Ok(());
    }
    for group in &groups {
        println!();
        println!("{}", group.day);
        for &index in group.ida.iter().chain(&group.volta) {
            let trip = &ledger.active_trips()[index];
            let due = if past_due.contains(&index) { "  (past)" } else { "" };
            println!("  [{}] {}{due}", index + 1, trip.trip_type);
            for (n, p) in trip.participants.iter().enumerate() {
                let status = if p.paid { "PAGO" } else { "PENDENTE" };
                println!("      {}. {:<24} {status}", n + 1, p.name);
            }
        }
    }
    Ok(())
}

fn handle_participant(session: &mut Session, cmd: ParticipantCommand) -> anyhow::Result<()> {
    match cmd {
        ParticipantCommand::Pay { trip, participant } => {
            let (t, p) = (to_index(trip), to_index(participant));
            let paid = session.update(|l| l.toggle_payment(t, p))?;
            let name = &session.ledger().active_trips()[t].participants[p].name;
            let state = if paid { "paid" } else { "pending" };
            println!("{name}: {state}.");
        }
        ParticipantCommand::Rename {
            trip,
            participant,
            name,
        } => {
            let (t, p) = (to_index(trip), to_index(participant));
            session.update(|l| l.rename_participant(t, p, &name))?;
            let applied = &session.ledger().active_trips()[t].participants[p].name;
            println!("Participant renamed to \"{applied}\".");
        }
        ParticipantCommand::Remove { trip, participant } => {
            let removed =
                session.update(|l| l.remove_participant(to_index(trip), to_index(participant)))?;
            println!("{} removed from trip {trip}.", removed.name);
        }
    }
    Ok(())
}

fn handle_names(session: &Session, json: bool) -> anyhow::Result<()> {
    let names = session.ledger().unique_names();
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        println!("No participants recorded yet.");
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn write_output(
    session: &Session,
    output: Option<PathBuf>,
    default_name: &str,
    contents: &str,
) -> anyhow::Result<PathBuf> {
    let path = match output {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("output path has no file name")?;
            backup::write_export(&dir, file_name, contents)?
        }
        None => backup::write_export(session.config().export_dir(), default_name, contents)?,
    };
    Ok(path)
}

fn handle_backup(session: &mut Session, cmd: BackupCommand) -> anyhow::Result<()> {
    match cmd {
        BackupCommand::Export { output, stdout } => {
            let json = backup::export_json(session.ledger())?;
            if stdout {
                println!("{json}");
            } else {
                let name = backup::backup_file_name(Local::now().date_naive());
                let path = write_output(session, output, &name, &json)?;
                println!("Backup written to {}.", path.display());
            }
        }
        BackupCommand::Import { file, yes } => {
            let ledger = backup::import_file(&file)
                .with_context(|| format!("restoring {}", file.display()))?;
            if !yes {
                println!(
                    "This will replace all data with {} ({} archived weeks).",
                    file.display(),
                    ledger.archives().len()
                );
                println!("Use --yes to confirm.");
                return Ok(());
            }
            session.replace(ledger)?;
            println!("Data restored from {}.", file.display());
        }
    }
    Ok(())
}

fn handle_export_text(session: &Session, cmd: &ExportTextCommand) -> anyhow::Result<()> {
    let text = session.share_text();
    if cmd.stdout {
        println!("{text}");
    } else {
        let path = write_output(
            session,
            cmd.output.clone(),
            backup::TEXT_EXPORT_FILE_NAME,
            &text,
        )?;
        println!("Summary written to {}.", path.display());
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("loading configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  Key:            {}", config.storage.key);
                println!();
                println!("[Ledger]");
                println!("  Fare:           {}", format_money(config.ledger.fare));
                println!();
                println!("[Export]");
                println!("  Directory:      {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path.clone())) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    bail!("invalid configuration in {}", path.display());
                }
            }
        }
    }
    Ok(())
}
