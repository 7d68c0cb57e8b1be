use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{format_price, parse_call_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use freightdesk_core::time::{format_timestamp_local, format_timestamp_rfc3339, now_utc};
use freightdesk_core::{CallDraft, CallDto, CallRecordDto, DealDto};
use serde::Serialize;

#[derive(Debug, Subcommand)]
pub enum CallCommand {
    /// Record a call; outcome "yes" also records its deal
    Add(AddCallArgs),
    List,
    Show(ShowCallArgs),
    Edit(EditCallArgs),
    Rm(RemoveCallArgs),
}

#[derive(Debug, Args)]
pub struct AddCallArgs {
    #[arg(long)]
    pub sentiment: String,
    #[arg(long)]
    pub dba: String,
    /// RFC 3339, YYYY-MM-DD HH:MM[:SS] or YYYY-MM-DD (UTC)
    #[arg(long)]
    pub datetime: String,
    #[arg(long)]
    pub outcome: String,
    #[arg(long)]
    pub call_outcome: Option<String>,
    #[arg(long)]
    pub load_id: Option<String>,
    #[arg(long)]
    pub start_location: Option<String>,
    #[arg(long)]
    pub end_location: Option<String>,
    #[arg(long)]
    pub initial_price: Option<f64>,
    #[arg(long)]
    pub agreed_price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ShowCallArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct EditCallArgs {
    pub id: String,
    #[arg(long)]
    pub sentiment: Option<String>,
    #[arg(long)]
    pub dba: Option<String>,
    #[arg(long)]
    pub datetime: Option<String>,
    #[arg(long)]
    pub outcome: Option<String>,
    /// Pass an empty string to clear
    #[arg(long)]
    pub call_outcome: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveCallArgs {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CallDetail {
    #[serde(flatten)]
    call: CallDto,
    deals: Vec<DealDto>,
}

pub fn add_call(ctx: &Context<'_>, args: AddCallArgs) -> Result<()> {
    let draft = CallDraft {
        sentiment: Some(args.sentiment),
        dba: Some(args.dba),
        datetime: Some(args.datetime),
        outcome: Some(args.outcome),
        call_outcome: args.call_outcome,
        load_id: args.load_id,
        start_location: args.start_location,
        end_location: args.end_location,
        initial_price: args.initial_price,
        agreed_price: args.agreed_price,
    };
    let (fields, terms) = draft.into_parts()?;
    let record = ctx.store.calls().create(now_utc(), fields, terms)?;

    if ctx.json {
        return print_json(&CallRecordDto::from(record));
    }
    match &record.deal {
        Some(deal) => println!(
            "created call {} {} with deal {} ({})",
            record.call.id, record.call.dba, deal.id, deal.load_id
        ),
        None => println!("created call {} {}", record.call.id, record.call.dba),
    }
    Ok(())
}

pub fn list_calls(ctx: &Context<'_>) -> Result<()> {
    let calls = ctx.store.calls().list()?;
    if ctx.json {
        let dtos: Vec<CallDto> = calls.into_iter().map(CallDto::from).collect();
        return print_json(&dtos);
    }

    if calls.is_empty() {
        println!("no calls");
        return Ok(());
    }
    for call in calls {
        println!(
            "{}  {}  {}  [{}]  {}",
            call.id,
            format_timestamp_local(call.datetime),
            call.dba,
            call.outcome,
            call.sentiment
        );
    }
    Ok(())
}

pub fn show_call(ctx: &Context<'_>, args: ShowCallArgs) -> Result<()> {
    let id = parse_call_id(&args.id)?;
    let call = ctx
        .store
        .calls()
        .get(id)?
        .ok_or_else(|| not_found(format!("call {id}")))?;
    let deals = ctx.store.deals().list_for_call(id)?;

    if ctx.json {
        return print_json(&CallDetail {
            call: call.into(),
            deals: deals.into_iter().map(DealDto::from).collect(),
        });
    }

    println!("id: {}", call.id);
    println!("dba: {}", call.dba);
    println!("datetime: {}", format_timestamp_local(call.datetime));
    println!("sentiment: {}", call.sentiment);
    println!("outcome: {}", call.outcome);
    if let Some(detail) = call.call_outcome.as_deref() {
        println!("call_outcome: {}", detail);
    }
    println!("created_at: {}", format_timestamp_local(call.created_at));
    if deals.is_empty() {
        println!("deals: none");
    } else {
        println!("deals:");
        for deal in deals {
            println!(
                "  {} {}  {} -> {}  agreed {}",
                deal.id,
                deal.load_id,
                deal.start_location,
                deal.end_location,
                format_price(deal.agreed_price)
            );
        }
    }
    Ok(())
}

/// Fields not passed keep their stored values. Switching the outcome to "yes"
/// does not create a deal; use `deal add --call-id` for that.
pub fn edit_call(ctx: &Context<'_>, args: EditCallArgs) -> Result<()> {
    let id = parse_call_id(&args.id)?;
    if args.sentiment.is_none()
        && args.dba.is_none()
        && args.datetime.is_none()
        && args.outcome.is_none()
        && args.call_outcome.is_none()
    {
        return Err(invalid_input("no updates provided"));
    }

    let existing = ctx
        .store
        .calls()
        .get(id)?
        .ok_or_else(|| not_found(format!("call {id}")))?;
    let draft = CallDraft {
        sentiment: Some(args.sentiment.unwrap_or(existing.sentiment)),
        dba: Some(args.dba.unwrap_or(existing.dba)),
        datetime: Some(
            args.datetime
                .unwrap_or_else(|| format_timestamp_rfc3339(existing.datetime)),
        ),
        outcome: Some(args.outcome.unwrap_or(existing.outcome)),
        call_outcome: args.call_outcome.or(existing.call_outcome),
        ..CallDraft::default()
    };
    let call = ctx.store.calls().update(id, draft.into_fields()?)?;

    if ctx.json {
        return print_json(&CallDto::from(call));
    }
    println!("updated call {} {}", call.id, call.dba);
    Ok(())
}

pub fn remove_call(ctx: &Context<'_>, args: RemoveCallArgs) -> Result<()> {
    let id = parse_call_id(&args.id)?;
    ctx.store.calls().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("deleted call {}", id);
    }
    Ok(())
}
