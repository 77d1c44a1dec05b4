//! Text and JSON renderings of a loaded session

use std::io::Write;

use serde::Serialize;

use crate::services::{
    format_amount, format_number, format_percentage_bar, pad_width, Session,
};
use crate::types::{AggregateStats, ConsumptionRecord};

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct ReportJson<'a> {
    source: Option<&'a str>,
    total_records: usize,
    query: Option<&'a str>,
    /// Over the matching records when a query is set, otherwise over all
    stats: Option<AggregateStats>,
    records: Vec<&'a ConsumptionRecord>,
}

#[derive(Serialize)]
struct UsersJson<'a> {
    source: Option<&'a str>,
    users: Vec<String>,
}

/// Apply the `--user` query; an absent flag reports on the whole set
fn apply_query(session: &mut Session, user: Option<&str>) {
    session.set_query(user.unwrap_or_default());
}

fn scoped_stats(session: &Session) -> Option<AggregateStats> {
    if session.query().is_empty() {
        session.global_stats()
    } else {
        session.query_stats()
    }
}

pub fn write_report_json<W: Write>(
    out: &mut W,
    session: &mut Session,
    user: Option<&str>,
) -> anyhow::Result<()> {
    apply_query(session, user);

    let report = ReportJson {
        source: session.label(),
        total_records: session.records().len(),
        query: user,
        stats: scoped_stats(session),
        records: session.filtered(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    session: &mut Session,
    user: Option<&str>,
) -> anyhow::Result<()> {
    apply_query(session, user);

    let label = session.label().unwrap_or("(none)");
    writeln!(out, "Source: {} ({} records)", label, format_number(session.records().len()))?;

    if session.records().is_empty() {
        writeln!(out, "No consumption records found.")?;
        return Ok(());
    }

    if let Some(query) = user {
        writeln!(out, "Query:  {:?}", query)?;
    }
    writeln!(out)?;

    let Some(stats) = scoped_stats(session) else {
        writeln!(out, "No records match {:?}.", session.query())?;
        return Ok(());
    };
    write_stats(out, &stats)?;

    if user.is_some() {
        writeln!(out)?;
        writeln!(out, "Records")?;
        for record in session.filtered() {
            writeln!(
                out,
                "  {}  {} {} {} {:>8}",
                record.local_time_label(),
                pad_width(&record.user_id, 8),
                pad_width(&record.user_name, 16),
                pad_width(&record.beverage_name, 16),
                format_amount(record.price)
            )?;
        }
    }
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, stats: &AggregateStats) -> std::io::Result<()> {
    writeln!(out, "Total spent:  {}", format_amount(stats.total_spent))?;
    writeln!(out, "Items bought: {}", format_number(stats.total_items))?;
    writeln!(out, "Users:        {}", format_number(stats.unique_users))?;

    writeln!(out)?;
    writeln!(out, "Top items")?;
    for (rank, item) in stats.top_items.iter().enumerate() {
        let share = item.share(stats.total_items);
        writeln!(
            out,
            "  {}. {} {:>5}  {} {:>5.1}%",
            rank + 1,
            pad_width(&item.name, 20),
            format_number(item.count),
            format_percentage_bar(share, BAR_WIDTH),
            share
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Busiest hours")?;
    for slot in &stats.top_hours {
        writeln!(out, "  {}  {:>5}", slot.label(), format_number(slot.count))?;
    }
    Ok(())
}

pub fn write_users<W: Write>(out: &mut W, session: &Session, json: bool) -> anyhow::Result<()> {
    let users = session.users();
    if json {
        let payload = UsersJson {
            source: session.label(),
            users,
        };
        serde_json::to_writer_pretty(&mut *out, &payload)?;
        writeln!(out)?;
    } else {
        for user in users {
            writeln!(out, "{}", user)?;
        }
    }
    Ok(())
}
