use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{format_optional_timestamp, format_price, parse_call_id, parse_deal_id};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use freightdesk_core::time::{format_timestamp_local, now_utc};
use freightdesk_core::{DealDraft, DealDto, DealViewDto};

#[derive(Debug, Subcommand)]
pub enum DealCommand {
    Add(AddDealArgs),
    List,
    Show(ShowDealArgs),
    Edit(EditDealArgs),
    Rm(RemoveDealArgs),
}

#[derive(Debug, Args)]
pub struct AddDealArgs {
    #[arg(long)]
    pub load_id: String,
    #[arg(long)]
    pub start_location: String,
    #[arg(long)]
    pub end_location: String,
    #[arg(long)]
    pub call_id: Option<String>,
    #[arg(long)]
    pub initial_price: Option<f64>,
    #[arg(long)]
    pub agreed_price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ShowDealArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct EditDealArgs {
    pub id: String,
    #[arg(long)]
    pub load_id: Option<String>,
    #[arg(long)]
    pub start_location: Option<String>,
    #[arg(long)]
    pub end_location: Option<String>,
    #[arg(long)]
    pub call_id: Option<String>,
    /// Unlink the deal from its call
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "call_id")]
    pub detach: bool,
    #[arg(long)]
    pub initial_price: Option<f64>,
    #[arg(long)]
    pub agreed_price: Option<f64>,
    /// Reset the initial price to none
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "initial_price")]
    pub clear_initial_price: bool,
    /// Reset the agreed price to none
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "agreed_price")]
    pub clear_agreed_price: bool,
}

#[derive(Debug, Args)]
pub struct RemoveDealArgs {
    pub id: String,
}

pub fn add_deal(ctx: &Context<'_>, args: AddDealArgs) -> Result<()> {
    let call_id = args.call_id.as_deref().map(parse_call_id).transpose()?;
    let draft = DealDraft {
        load_id: Some(args.load_id),
        start_location: Some(args.start_location),
        end_location: Some(args.end_location),
        call_id,
        initial_price: args.initial_price,
        agreed_price: args.agreed_price,
    };
    let deal = ctx.store.deals().create(now_utc(), draft.into_new()?)?;

    if ctx.json {
        return print_json(&DealDto::from(deal));
    }
    println!("created deal {} {}", deal.id, deal.load_id);
    Ok(())
}

pub fn list_deals(ctx: &Context<'_>) -> Result<()> {
    let deals = ctx.store.deals().list()?;
    if ctx.json {
        let dtos: Vec<DealViewDto> = deals.into_iter().map(DealViewDto::from).collect();
        return print_json(&dtos);
    }

    if deals.is_empty() {
        println!("no deals");
        return Ok(());
    }
    for view in deals {
        let deal = &view.deal;
        let carrier = view.call_dba.as_deref().unwrap_or("-");
        println!(
            "{}  {}  {} -> {}  agreed {}  {}",
            deal.id,
            deal.load_id,
            deal.start_location,
            deal.end_location,
            format_price(deal.agreed_price),
            carrier
        );
    }
    Ok(())
}

pub fn show_deal(ctx: &Context<'_>, args: ShowDealArgs) -> Result<()> {
    let id = parse_deal_id(&args.id)?;
    let view = ctx
        .store
        .deals()
        .get(id)?
        .ok_or_else(|| not_found(format!("deal {id}")))?;

    if ctx.json {
        return print_json(&DealViewDto::from(view));
    }

    let deal = &view.deal;
    println!("id: {}", deal.id);
    println!("load_id: {}", deal.load_id);
    println!("route: {} -> {}", deal.start_location, deal.end_location);
    println!("initial_price: {}", format_price(deal.initial_price));
    println!("agreed_price: {}", format_price(deal.agreed_price));
    println!("created_at: {}", format_timestamp_local(deal.created_at));
    match deal.call_id {
        Some(call_id) => {
            println!("call: {}", call_id);
            println!("  dba: {}", view.call_dba.as_deref().unwrap_or("-"));
            println!("  sentiment: {}", view.call_sentiment.as_deref().unwrap_or("-"));
            println!("  outcome: {}", view.call_outcome.as_deref().unwrap_or("-"));
            println!("  datetime: {}", format_optional_timestamp(view.call_datetime));
        }
        None => println!("call: none"),
    }
    Ok(())
}

/// Fields not passed keep their stored values.
pub fn edit_deal(ctx: &Context<'_>, args: EditDealArgs) -> Result<()> {
    let id = parse_deal_id(&args.id)?;
    if args.load_id.is_none()
        && args.start_location.is_none()
        && args.end_location.is_none()
        && args.call_id.is_none()
        && !args.detach
        && args.initial_price.is_none()
        && args.agreed_price.is_none()
        && !args.clear_initial_price
        && !args.clear_agreed_price
    {
        return Err(invalid_input("no updates provided"));
    }

    let existing = ctx
        .store
        .deals()
        .get(id)?
        .ok_or_else(|| not_found(format!("deal {id}")))?
        .deal;
    let call_id = match args.call_id.as_deref() {
        Some(raw) => Some(parse_call_id(raw)?),
        None if args.detach => None,
        None => existing.call_id,
    };
    let draft = DealDraft {
        load_id: Some(args.load_id.unwrap_or(existing.load_id)),
        start_location: Some(args.start_location.unwrap_or(existing.start_location)),
        end_location: Some(args.end_location.unwrap_or(existing.end_location)),
        call_id,
        initial_price: merge_price(
            args.initial_price,
            args.clear_initial_price,
            existing.initial_price,
        ),
        agreed_price: merge_price(args.agreed_price, args.clear_agreed_price, existing.agreed_price),
    };
    let deal = ctx.store.deals().update(id, draft.into_new()?)?;

    if ctx.json {
        return print_json(&DealDto::from(deal));
    }
    println!("updated deal {} {}", deal.id, deal.load_id);
    Ok(())
}

fn merge_price(given: Option<f64>, clear: bool, existing: Option<f64>) -> Option<f64> {
    match given {
        Some(price) => Some(price),
        None if clear => None,
        None => existing,
    }
}

pub fn remove_deal(ctx: &Context<'_>, args: RemoveDealArgs) -> Result<()> {
    let id = parse_deal_id(&args.id)?;
    ctx.store.deals().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("deleted deal {}", id);
    }
    Ok(())
}
