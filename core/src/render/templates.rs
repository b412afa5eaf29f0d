//! One template per event category.

use super::format::{
    clip, escape_html, format_bps, format_ppm, format_timestamp, format_units, short_addr,
    time_until, tx_url,
};
use super::RenderContext;
use crate::feed::records::{
    BridgedTokenRegistration, Challenge, ChallengeBid, EmergencyStop, FactoryOwnerChange,
    FeeCollectorCollectorUpdate, FeeCollectorOwnerUpdate, FeeCollectorProtectionUpdate,
    FeeCollectorRouterUpdate, ForcedSale, GovernorProposal, Minter, Position, PositionDenial,
    RateChanges, SavingsRateChanged, SavingsRateProposed,
};

const DESCRIPTION_CHARS: usize = 200;

fn deadline_line(label: &str, ts: &str, ctx: &RenderContext) -> String {
    format!(
        "<b>{}: {} ({})</b>",
        label,
        format_timestamp(ts),
        time_until(ts, ctx.now_secs)
    )
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("unknown")
}

fn quoted(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or(""))
}

// ---------------------------------------------------------------------------
// JuiceSwap
// ---------------------------------------------------------------------------

pub fn governor_proposal_created(e: &GovernorProposal, ctx: &RenderContext) -> String {
    let desc = match e.description.as_deref() {
        Some(d) if !d.is_empty() => escape_html(&clip(d, DESCRIPTION_CHARS)),
        _ => "No description".to_string(),
    };
    format!(
        "<b>New Governor Proposal</b>\n\n\
         Proposal #{}\n\
         Proposer: {}\n\
         Target: {}\n\
         Description: {}\n\n\
         {}\n\n\
         Chain: Citrea ({})\n\
         Tx: {}",
        e.proposal_id,
        short_addr(&e.proposer),
        short_addr(&e.target),
        desc,
        deadline_line("Auto-executes", &e.execute_after, ctx),
        e.chain_id,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

fn resolved_proposal(
    title: &str,
    actor_label: &str,
    actor: &Option<String>,
    e: &GovernorProposal,
    ctx: &RenderContext,
) -> String {
    let desc = escape_html(&clip(e.description.as_deref().unwrap_or(""), DESCRIPTION_CHARS));
    let hash = e.resolved_tx_hash.as_deref().unwrap_or(&e.tx_hash);
    format!(
        "<b>{}</b>\n\n\
         Proposal #{}\n\
         {}: {}\n\
         Target: {}\n\
         Description: {}\n\n\
         Chain: Citrea ({})\n\
         Tx: {}",
        title,
        e.proposal_id,
        actor_label,
        short_addr(or_unknown(actor)),
        short_addr(&e.target),
        desc,
        e.chain_id,
        tx_url(&ctx.explorer_url, hash),
    )
}

pub fn governor_proposal_executed(e: &GovernorProposal, ctx: &RenderContext) -> String {
    resolved_proposal("Governor Proposal Executed", "Executed by", &e.executed_by, e, ctx)
}

pub fn governor_proposal_vetoed(e: &GovernorProposal, ctx: &RenderContext) -> String {
    resolved_proposal("Governor Proposal Vetoed", "Vetoed by", &e.vetoed_by, e, ctx)
}

fn old_new(title: &str, old: &str, new: &str, chain_id: u64, tx_hash: &str, ctx: &RenderContext) -> String {
    format!(
        "<b>{}</b>\n\n\
         Old: {}\n\
         New: {}\n\
         Chain: Citrea ({})\n\n\
         Tx: {}",
        title,
        short_addr(old),
        short_addr(new),
        chain_id,
        tx_url(&ctx.explorer_url, tx_hash),
    )
}

pub fn factory_owner_changed(e: &FactoryOwnerChange, ctx: &RenderContext) -> String {
    old_new("Factory Owner Changed", &e.old_owner, &e.new_owner, e.chain_id, &e.tx_hash, ctx)
}

pub fn fee_collector_owner_updated(e: &FeeCollectorOwnerUpdate, ctx: &RenderContext) -> String {
    format!(
        "<b>FeeCollector Owner Updated</b>\n\n\
         New Owner: {}\n\
         Chain: Citrea ({})\n\n\
         Tx: {}",
        short_addr(&e.new_owner),
        e.chain_id,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn swap_router_updated(e: &FeeCollectorRouterUpdate, ctx: &RenderContext) -> String {
    old_new("Swap Router Updated", &e.old_router, &e.new_router, e.chain_id, &e.tx_hash, ctx)
}

pub fn fee_collector_updated(e: &FeeCollectorCollectorUpdate, ctx: &RenderContext) -> String {
    old_new(
        "Fee Collector Updated",
        &e.old_collector,
        &e.new_collector,
        e.chain_id,
        &e.tx_hash,
        ctx,
    )
}

pub fn protection_params_updated(e: &FeeCollectorProtectionUpdate, ctx: &RenderContext) -> String {
    format!(
        "<b>Protection Params Updated</b>\n\n\
         TWAP Period: {}s\n\
         Max Slippage: {}\n\
         Chain: Citrea ({})\n\n\
         Tx: {}",
        e.twap_period,
        format_bps(&e.max_slippage_bps),
        e.chain_id,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn bridged_token_registered(e: &BridgedTokenRegistration, ctx: &RenderContext) -> String {
    format!(
        "<b>Bridged Token Registered</b>\n\n\
         Token: {}\n\
         Bridge: {}\n\
         Registered by: {}\n\
         Decimals: {}\n\
         Chain: Citrea ({})\n\n\
         Tx: {}",
        short_addr(&e.token),
        short_addr(&e.bridge),
        short_addr(&e.registered_by),
        e.decimals,
        e.chain_id,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

// ---------------------------------------------------------------------------
// JuiceDollar
// ---------------------------------------------------------------------------

pub fn new_original_position(e: &Position, ctx: &RenderContext) -> String {
    let decimals = if e.stablecoin_decimals == 0 {
        18
    } else {
        e.stablecoin_decimals as usize
    };
    let collateral = if e.collateral_symbol.is_empty() {
        short_addr(&e.collateral)
    } else {
        escape_html(&e.collateral_symbol)
    };
    let stablecoin = if e.stablecoin_symbol.is_empty() {
        "JUSD".to_string()
    } else {
        escape_html(&e.stablecoin_symbol)
    };
    format!(
        "<b>New Original Position Opened</b>\n\n\
         Position: {}\n\
         Owner: {}\n\
         Collateral: {}\n\
         Price: {} {}\n\n\
         {}\n\n\
         Action: Review and deny before cooldown ends if inappropriate.\n\
         Tx: {}",
        short_addr(&e.position),
        short_addr(&e.owner),
        collateral,
        format_units(&e.price, decimals, 2),
        stablecoin,
        deadline_line("Cooldown ends", &e.cooldown, ctx),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

/// Apply date plus application period; unparsable parts count as zero.
pub fn minter_deadline(e: &Minter) -> i64 {
    let apply = e.apply_date.trim().parse::<i64>().unwrap_or(0);
    let period = e.application_period.trim().parse::<i64>().unwrap_or(0);
    apply.saturating_add(period)
}

pub fn minter_application(e: &Minter, ctx: &RenderContext) -> String {
    let deadline = minter_deadline(e).to_string();
    format!(
        "<b>New Minter Application</b>\n\n\
         Minter: {}\n\
         Suggestor: {}\n\
         Message: \"{}\"\n\n\
         {}\n\n\
         Action: Deny before deadline or minter is approved.\n\
         Tx: {}",
        short_addr(&e.minter),
        short_addr(&e.suggestor),
        quoted(&e.apply_message),
        deadline_line("Auto-approved", &deadline, ctx),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn minter_denied(e: &Minter, ctx: &RenderContext) -> String {
    let hash = e.deny_tx_hash.as_deref().unwrap_or(&e.tx_hash);
    format!(
        "<b>Minter Denied</b>\n\n\
         Minter: {}\n\
         Vetor: {}\n\
         Deny Message: \"{}\"\n\
         Original Application: \"{}\"\n\n\
         Tx: {}",
        short_addr(&e.minter),
        short_addr(or_unknown(&e.vetor)),
        quoted(&e.deny_message),
        quoted(&e.apply_message),
        tx_url(&ctx.explorer_url, hash),
    )
}

pub fn savings_rate_proposed(e: &SavingsRateProposed, ctx: &RenderContext) -> String {
    let next_change = e.next_change.to_string();
    format!(
        "<b>Savings Rate Proposed</b>\n\n\
         Proposer: {}\n\
         Next Rate: {}\n\n\
         {}\n\n\
         Tx: {}",
        short_addr(&e.proposer),
        format_ppm(e.next_rate),
        deadline_line("Takes effect", &next_change, ctx),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn savings_rate_changed(e: &SavingsRateChanged, ctx: &RenderContext) -> String {
    format!(
        "<b>Savings Rate Changed</b>\n\n\
         Approved Rate: {}\n\n\
         Tx: {}",
        format_ppm(e.approved_rate),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

fn rate_lines(e: &RateChanges) -> String {
    format!(
        "By: {}\n\
         Fee Rate: {}\n\
         Savings Fee Rate: {}\n\
         Minting Fee Rate: {}",
        short_addr(&e.who),
        format_ppm(e.next_fee_rate),
        format_ppm(e.next_savings_fee_rate),
        format_ppm(e.next_minting_fee_rate),
    )
}

pub fn fee_rate_changes_proposed(e: &RateChanges, ctx: &RenderContext) -> String {
    let next_change = e.next_change.as_deref().unwrap_or("0");
    format!(
        "<b>Fee Rate Changes Proposed</b>\n\n\
         {}\n\n\
         {}\n\n\
         Tx: {}",
        rate_lines(e),
        deadline_line("Takes effect", next_change, ctx),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn fee_rate_changes_executed(e: &RateChanges, ctx: &RenderContext) -> String {
    format!(
        "<b>Fee Rate Changes Executed</b>\n\n\
         {}\n\n\
         Tx: {}",
        rate_lines(e),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn emergency_stop(e: &EmergencyStop, ctx: &RenderContext) -> String {
    format!(
        "<b>BRIDGE EMERGENCY STOP</b>\n\n\
         Bridge: {}\n\
         Caller: {}\n\
         Message: \"{}\"\n\n\
         Tx: {}",
        short_addr(&e.bridge_address),
        short_addr(&e.caller),
        quoted(&e.message),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn forced_liquidation(e: &ForcedSale, ctx: &RenderContext) -> String {
    format!(
        "<b>Forced Liquidation</b>\n\n\
         Position: {}\n\
         Amount: {}\n\n\
         Tx: {}",
        short_addr(&e.position),
        e.amount,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn position_denied(e: &PositionDenial, ctx: &RenderContext) -> String {
    format!(
        "<b>Position Denied by Governance</b>\n\n\
         Position: {}\n\
         Denier: {}\n\
         Message: \"{}\"\n\n\
         Tx: {}",
        short_addr(&e.position),
        short_addr(&e.denier),
        quoted(&e.message),
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn challenge_started(e: &Challenge, ctx: &RenderContext) -> String {
    format!(
        "<b>Challenge Started</b>\n\n\
         Position: {}\n\
         Challenge #{}\n\
         Challenger: {}\n\
         Size: {}\n\
         Liq Price: {}\n\
         Duration: {}s\n\n\
         Tx: {}",
        short_addr(&e.position),
        e.number,
        short_addr(&e.challenger),
        e.size,
        e.liq_price,
        e.duration,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn challenge_succeeded(e: &ChallengeBid, ctx: &RenderContext) -> String {
    format!(
        "<b>Challenge Succeeded</b>\n\n\
         Position: {}\n\
         Challenge #{}\n\
         Bidder: {}\n\
         Bid: {}\n\
         Filled Size: {}\n\
         Acquired Collateral: {}\n\n\
         Tx: {}",
        short_addr(&e.position),
        e.number,
        short_addr(&e.bidder),
        e.bid,
        e.filled_size,
        e.acquired_collateral,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

pub fn challenge_averted(e: &ChallengeBid, ctx: &RenderContext) -> String {
    format!(
        "<b>Challenge Averted</b>\n\n\
         Position: {}\n\
         Challenge #{}\n\
         Bidder: {}\n\
         Bid: {}\n\
         Position saved.\n\n\
         Tx: {}",
        short_addr(&e.position),
        e.number,
        short_addr(&e.bidder),
        e.bid,
        tx_url(&ctx.explorer_url, &e.tx_hash),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const NOW: i64 = 1_700_000_000;

    fn ctx() -> RenderContext {
        RenderContext::new("https://citreascan.com", NOW)
    }

    #[test]
    fn proposal_created_shows_deadline_and_link() {
        let p = GovernorProposal {
            proposal_id: "42".into(),
            proposer: ADDR.into(),
            target: ADDR.into(),
            description: Some("Raise <limit>".into()),
            execute_after: (NOW + 2 * 3600).to_string(),
            chain_id: 4114,
            tx_hash: "0xabc".into(),
            ..Default::default()
        };
        let msg = governor_proposal_created(&p, &ctx());
        assert!(msg.starts_with("<b>New Governor Proposal</b>"));
        assert!(msg.contains("Proposal #42"));
        assert!(msg.contains("Raise &lt;limit&gt;"));
        assert!(msg.contains("(in 2h)"));
        assert!(msg.contains("Chain: Citrea (4114)"));
        assert!(msg.ends_with("https://citreascan.com/tx/0xabc"));
    }

    #[test]
    fn proposal_without_description() {
        let p = GovernorProposal::default();
        assert!(governor_proposal_created(&p, &ctx()).contains("Description: No description"));
    }

    #[test]
    fn resolved_proposal_prefers_resolution_tx() {
        let p = GovernorProposal {
            tx_hash: "0xcreate".into(),
            resolved_tx_hash: Some("0xresolve".into()),
            executed_by: None,
            ..Default::default()
        };
        let msg = governor_proposal_executed(&p, &ctx());
        assert!(msg.contains("Executed by: unknown"));
        assert!(msg.ends_with("/tx/0xresolve"));
    }

    #[test]
    fn description_is_clipped() {
        let p = GovernorProposal {
            description: Some("x".repeat(500)),
            ..Default::default()
        };
        let msg = governor_proposal_vetoed(&p, &ctx());
        assert!(msg.contains(&"x".repeat(200)));
        assert!(!msg.contains(&"x".repeat(201)));
    }

    #[test]
    fn minter_application_deadline_is_apply_plus_period() {
        let m = Minter {
            minter: ADDR.into(),
            suggestor: ADDR.into(),
            apply_date: NOW.to_string(),
            application_period: "86400".into(),
            apply_message: Some("please".into()),
            tx_hash: "0xm".into(),
            ..Default::default()
        };
        assert_eq!(minter_deadline(&m), NOW + 86_400);
        let msg = minter_application(&m, &ctx());
        assert!(msg.contains("Message: \"please\""));
        assert!(msg.contains("(in 1d)"));
    }

    #[test]
    fn minter_denied_uses_deny_tx_when_present() {
        let m = Minter {
            tx_hash: "0xapply".into(),
            deny_tx_hash: Some("0xdeny".into()),
            vetor: Some(ADDR.into()),
            ..Default::default()
        };
        let msg = minter_denied(&m, &ctx());
        assert!(msg.contains("Vetor: 0x1234...5678"));
        assert!(msg.ends_with("/tx/0xdeny"));
    }

    #[test]
    fn position_price_uses_stablecoin_decimals() {
        let p = Position {
            price: "98500000000".into(),
            stablecoin_decimals: 6,
            collateral_symbol: "WcBTC".into(),
            stablecoin_symbol: String::new(),
            cooldown: (NOW - 1).to_string(),
            ..Default::default()
        };
        let msg = new_original_position(&p, &ctx());
        assert!(msg.contains("Price: 98,500.00 JUSD"));
        assert!(msg.contains("Collateral: WcBTC"));
        assert!(msg.contains("(EXPIRED)"));
    }

    #[test]
    fn rate_templates_format_ppm() {
        let r = RateChanges {
            who: ADDR.into(),
            next_fee_rate: 10_000,
            next_savings_fee_rate: 20_000,
            next_minting_fee_rate: 0,
            next_change: Some((NOW + 600).to_string()),
            ..Default::default()
        };
        let proposed = fee_rate_changes_proposed(&r, &ctx());
        assert!(proposed.contains("Fee Rate: 1.00%"));
        assert!(proposed.contains("Savings Fee Rate: 2.00%"));
        assert!(proposed.contains("(in 10m)"));
        let executed = fee_rate_changes_executed(&r, &ctx());
        assert!(!executed.contains("Takes effect"));
    }

    #[test]
    fn emergency_stop_escapes_message() {
        let e = EmergencyStop {
            message: Some("a & b".into()),
            ..Default::default()
        };
        assert!(emergency_stop(&e, &ctx()).contains("Message: \"a &amp; b\""));
    }

    #[test]
    fn protection_params_formats_bps() {
        let e = FeeCollectorProtectionUpdate {
            twap_period: 1800,
            max_slippage_bps: "250".into(),
            ..Default::default()
        };
        let msg = protection_params_updated(&e, &ctx());
        assert!(msg.contains("TWAP Period: 1800s"));
        assert!(msg.contains("Max Slippage: 2.50%"));
    }
}
