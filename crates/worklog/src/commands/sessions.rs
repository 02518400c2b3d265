//! Session listing, inspection and deletion.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;

use worklog_core::export::render_session;
use worklog_core::{Error, Session};

use super::{open_store, parse_date, short_id};
use crate::config::Config;

pub async fn list(date: Option<&str>, json: bool, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let sessions = match date {
        Some(_) => store.sessions_by_date(parse_date(date)?),
        None => store.all_sessions(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No sessions recorded".dimmed());
        return Ok(());
    }

    println!(
        "{:<10} {:<17} {:>8} {:>7}  {}",
        "ID".bold(),
        "STARTED".bold(),
        "DURATION".bold(),
        "EVENTS".bold(),
        "SUMMARY".bold()
    );
    for session in &sessions {
        println!("{}", format_row(session));
    }
    Ok(())
}

fn format_row(session: &Session) -> String {
    let started = session
        .start_time
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let duration = match session.duration() {
        Some(d) => format!("{}m", d.num_minutes()),
        None if session.is_active => "active".to_string(),
        None => "-".to_string(),
    };
    let summary = session
        .summary
        .as_ref()
        .and_then(|s| s.summary.lines().next())
        .unwrap_or("");
    format!(
        "{:<10} {:<17} {:>8} {:>7}  {}",
        short_id(&session.id),
        started,
        duration,
        session.events.len(),
        summary
    )
}

pub async fn show(session_id: &str, json: bool, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let session = find_session(&store.all_sessions(), session_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("{} {}", "Session".bold(), session.id.cyan());
        println!();
        print!("{}", render_session(&session));
    }
    Ok(())
}

pub async fn delete(session_id: &str, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let session = find_session(&store.all_sessions(), session_id)?;
    store
        .delete_session(&session.id)
        .context("Failed to rewrite session store")?;
    println!("{} Deleted session {}", "✓".green(), session.id);
    Ok(())
}

/// Look a session up by full id or unique id prefix.
pub(crate) fn find_session(sessions: &[Session], id: &str) -> Result<Session> {
    if let Some(session) = sessions.iter().find(|s| s.id == id) {
        return Ok(session.clone());
    }
    let mut matches = sessions.iter().filter(|s| s.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(session), None) if !id.is_empty() => Ok(session.clone()),
        (Some(_), Some(_)) => anyhow::bail!("Ambiguous session id prefix: {}", id),
        _ => Err(Error::SessionNotFound(id.to_string()).into()),
    }
}
