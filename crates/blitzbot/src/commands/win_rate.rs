//! The "tank-win-rate" and "win-rate" commands.
//!
//! Both take the collaborators and the invoker's stored record as
//! explicit parameters; neither writes anything. Collaborator failures
//! propagate unchanged to the dispatch layer.

use anyhow::{Context, Result};
use tracing::{debug, info};

use blitz_common::display_format::{format_number, format_win_rate};
use blitz_common::{stats, AccountRecord, BattleCounters, RecordUpdate};

use crate::commands::{format_mention, CommandOutcome, IncomingMessage, Reply};
use crate::matcher::{self, MatchResult};
use crate::record::RecordStore;
use crate::wargaming::WargamingApi;

/// Who a query is about.
enum Target {
    Resolved(AccountRecord),
    UnknownMention(String),
}

/// Resolve the queried account: a mentioned user is looked up in the
/// record store by platform id; otherwise the invoker's own record,
/// already loaded by the dispatch layer, is the target.
async fn resolve_target(
    store: &dyn RecordStore,
    message: &IncomingMessage,
    invoker_record: &AccountRecord,
) -> Result<Target> {
    let Some(mention) = message.target_mention() else {
        return Ok(Target::Resolved(invoker_record.clone()));
    };

    debug!(user_id = %mention.id, "resolving mentioned user");
    match store
        .find(&mention.id)
        .await
        .context("record store lookup failed")?
    {
        Some(record) => Ok(Target::Resolved(record)),
        None => Ok(Target::UnknownMention(mention.id.clone())),
    }
}

/// Win rate per vehicle, for the vehicles matching a free-text query.
///
/// Terminal outcomes: a prompt when the argument is missing, a complaint
/// when the query is too broad, silence when nothing matches, a "no
/// stats" notice when the account never played any matched vehicle, and
/// otherwise one line per played vehicle.
pub async fn tank_win_rate(
    api: &dyn WargamingApi,
    store: &dyn RecordStore,
    message: &IncomingMessage,
    invoker_record: &AccountRecord,
    query: &str,
) -> Result<CommandOutcome> {
    let author = &message.author.username;

    if query.is_empty() {
        return Ok(CommandOutcome::message(format!(
            "@{author}, Must specify a vehicle for \"tank-win-rate\"."
        )));
    }

    let catalog = api
        .vehicles(query)
        .await
        .context("tankopedia lookup failed")?;
    let vehicles = match matcher::resolve(query, &catalog) {
        MatchResult::NoMatch => {
            info!(query, "no vehicle matched, staying quiet");
            return Ok(CommandOutcome::silent());
        }
        MatchResult::TooManyCandidates(count) => {
            info!(query, count, "query too broad");
            return Ok(CommandOutcome::message(format!(
                "@{author}, Found too many vehicles with `{query}`."
            )));
        }
        MatchResult::Matched(vehicles) => vehicles,
    };

    let record = match resolve_target(store, message, invoker_record).await? {
        Target::Resolved(record) => record,
        Target::UnknownMention(id) => {
            return Ok(CommandOutcome::message(format!(
                "@{author}, I do not know who {} is. Sorry about that.",
                format_mention(&id)
            )));
        }
    };

    let tank_ids: Vec<u32> = vehicles.iter().map(|vehicle| vehicle.tank_id).collect();
    let per_vehicle = api
        .tank_stats(record.account_id, &tank_ids)
        .await
        .context("tank stats lookup failed")?;

    let mut lines = Vec::new();
    if let Some(entries) = &per_vehicle {
        for vehicle in &vehicles {
            // A vehicle the account never played has no entry; it is
            // simply left out of the reply.
            let Some(entry) = entries.iter().find(|s| s.tank_id == vehicle.tank_id) else {
                continue;
            };
            let derived = stats::derive(&entry.all);
            let prefix = if lines.is_empty() {
                format!("@{author}, ")
            } else {
                String::new()
            };
            lines.push(format!(
                "{prefix}{name} ({nation}, {tier}): {win_rate}%, {avg} damage after {battles} battles.",
                name = vehicle.name,
                nation = vehicle.nation,
                tier = vehicle.tier,
                win_rate = format_win_rate(derived.win_rate_pct),
                avg = format_number(derived.avg_damage),
                battles = format_number(entry.all.battles as f64),
            ));
        }
    }

    if lines.is_empty() {
        return Ok(CommandOutcome::message(format!(
            "@{author}, I found no stats related to your search."
        )));
    }
    Ok(CommandOutcome::message(lines.join("\n")))
}

/// Whole-account win rate, with progress since the last query.
///
/// The delta narrative appears only when the stored record holds usable
/// counters and battles were played since; its damage clause appears only
/// when the stored record tracked damage. The returned update always
/// carries the fresh totals and is omitted when the stored battle count
/// already matches.
pub async fn win_rate(
    api: &dyn WargamingApi,
    store: &dyn RecordStore,
    message: &IncomingMessage,
    invoker_record: &AccountRecord,
) -> Result<CommandOutcome> {
    let author = &message.author.username;

    let record = match resolve_target(store, message, invoker_record).await? {
        Target::Resolved(record) => record,
        Target::UnknownMention(id) => {
            return Ok(CommandOutcome::message(format!(
                "@{author}, I do not know who {} is. Sorry about that.",
                format_mention(&id)
            )));
        }
    };

    let current = api
        .account_info(record.account_id)
        .await
        .context("account info lookup failed")?
        .with_context(|| format!("account {} missing from stats response", record.account_id))?;

    let derived = stats::derive(&current);
    let mut lines = vec![format!(
        "@{author}, You have won {wins} of {battles} battles. That is {win_rate}% victory! Your average damage is {avg}.",
        wins = format_number(current.wins as f64),
        battles = format_number(current.battles as f64),
        win_rate = format_win_rate(derived.win_rate_pct),
        avg = format_number(derived.avg_damage),
    )];

    if let Some(delta) = stats::delta(&current, &record) {
        // Prior wins/battles are present whenever a delta exists.
        let prior = stats::derive(&BattleCounters {
            battles: record.battles.unwrap_or(0),
            wins: record.wins.unwrap_or(0),
            damage_dealt: record.damage.unwrap_or(0.0),
        });
        let battles_ago = format_number(delta.battles as f64);
        let prior_win_rate = format_win_rate(prior.win_rate_pct);
        let delta_win_rate = format_win_rate(delta.win_rate_pct);

        match delta.avg_damage {
            Some(delta_avg) => {
                lines.push(format!(
                    "Last time you asked was {battles_ago} battles ago, at {prior_win_rate}% victory and {prior_avg} average damage dealt.",
                    prior_avg = format_number(prior.avg_damage),
                ));
                lines.push(format!(
                    "Over those {battles_ago} battles, you won {delta_win_rate}% with average damage of {delta_avg}!",
                    delta_avg = format_number(delta_avg),
                ));
            }
            None => {
                lines.push(format!(
                    "Last time you asked was {battles_ago} battles ago, at {prior_win_rate}% victory."
                ));
                lines.push(format!(
                    "Over those {battles_ago} battles, you won {delta_win_rate}%!"
                ));
            }
        }
    }

    let update = if record.battles != Some(current.battles) {
        Some(RecordUpdate {
            wins: current.wins,
            battles: current.battles,
            damage: current.damage_dealt,
        })
    } else {
        None
    };

    Ok(CommandOutcome {
        reply: Reply::Message(lines.join("\n")),
        update,
    })
}
