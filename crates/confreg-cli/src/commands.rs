use anyhow::bail;
use colored::Colorize;
use confreg_registry::{
    Amount, CallContext, ConferenceRegistry, Notification, NotificationKind, Quota,
    RegistryConfig,
};
use serde_json::json;

use crate::cli::*;
use crate::store::StateFile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = StateFile::new(cli.state.clone());
    let format = cli.format;
    match cli.command {
        Command::Deploy(args) => cmd_deploy(&store, args, format),
        Command::Buy(args) => cmd_buy(&store, args, format),
        Command::ChangeQuota(args) => cmd_change_quota(&store, args, format),
        Command::Refund(args) => cmd_refund(&store, args, format),
        Command::Show(args) => cmd_show(&store, args, format),
        Command::Log(args) => cmd_log(&store, args, format),
        Command::Verify(_) => cmd_verify(&store, format),
        Command::Id(args) => cmd_id(args, format),
    }
}

fn print_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_notification(notification: &Notification) {
    let kind = match notification.kind {
        NotificationKind::Deposit => "Deposit".green(),
        NotificationKind::Refund => "Refund".magenta(),
    };
    println!(
        "{}  {:<8} {}  {}",
        format!("#{}", notification.seq).yellow(),
        kind,
        notification.registrant.to_hex().cyan(),
        notification.amount.to_string().bold()
    );
}

fn cmd_deploy(store: &StateFile, args: DeployArgs, format: OutputFormat) -> anyhow::Result<()> {
    if store.exists() && !args.force {
        bail!(
            "{} already holds a registry; pass --force to replace it",
            store.path().display()
        );
    }

    let mut config = match &args.config {
        Some(path) => RegistryConfig::load(path)?,
        None => RegistryConfig::default(),
    };
    if let Some(quota) = args.quota {
        config.quota = Quota::new(quota);
    }

    let registry = ConferenceRegistry::deploy(args.operator, &config)?;
    store.save(&registry)?;

    match format {
        OutputFormat::Json => print_json(json!({
            "operator": args.operator,
            "quota": config.quota,
            "enforce_quota": config.enforce_quota,
            "state": store.path().display().to_string(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Deployed registry in {}",
                "✓".green().bold(),
                store.path().display().to_string().bold()
            );
            println!("  Operator: {}", args.operator.to_hex().cyan());
            println!("  Quota: {}", config.quota.to_string().yellow());
            Ok(())
        }
    }
}

fn cmd_buy(store: &StateFile, args: BuyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (registry, _) = store.load()?;
    let call = CallContext::paying(args.from, Amount::new(args.value));

    if args.dry_run {
        let result = registry.probe_buy_ticket(&call)?;
        return match format {
            OutputFormat::Json => print_json(json!({ "dry_run": true, "result": result })),
            OutputFormat::Text => {
                println!("{} Purchase would succeed (returns {result})", "✓".green());
                Ok(())
            }
        };
    }

    let result = registry.buy_ticket(&call)?;
    store.save(&registry)?;
    let paid = registry.registrants_paid(&args.from)?;

    match format {
        OutputFormat::Json => print_json(json!({
            "result": result,
            "registrant": args.from,
            "paid": paid,
            "notification": registry.notifications()?.last(),
        })),
        OutputFormat::Text => {
            println!("{} Ticket purchased", "✓".green().bold());
            println!("  Registrant: {}", args.from.to_hex().cyan());
            println!("  Total paid: {}", paid.to_string().bold());
            if let Some(notification) = registry.notifications()?.last() {
                print_notification(notification);
            }
            Ok(())
        }
    }
}

fn cmd_change_quota(
    store: &StateFile,
    args: ChangeQuotaArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (registry, _) = store.load()?;
    let previous = registry.quota()?;
    registry.change_quota(&CallContext::new(args.from), Quota::new(args.quota))?;
    store.save(&registry)?;

    match format {
        OutputFormat::Json => print_json(json!({
            "previous": previous,
            "quota": registry.quota()?,
        })),
        OutputFormat::Text => {
            println!(
                "{} Quota changed: {} → {}",
                "✓".green().bold(),
                previous.to_string().dimmed(),
                registry.quota()?.to_string().yellow().bold()
            );
            Ok(())
        }
    }
}

fn cmd_refund(store: &StateFile, args: RefundArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (registry, payout) = store.load()?;
    let call = CallContext::new(args.from);
    let amount = Amount::new(args.amount);

    if args.dry_run {
        registry.probe_refund_ticket(&call, &args.registrant, amount)?;
        return match format {
            OutputFormat::Json => print_json(json!({ "dry_run": true, "result": null })),
            OutputFormat::Text => {
                println!("{} Refund would succeed", "✓".green());
                Ok(())
            }
        };
    }

    registry.refund_ticket(&call, &args.registrant, amount)?;
    store.save(&registry)?;

    match format {
        OutputFormat::Json => print_json(json!({
            "transfers": payout.transfers(),
            "balance": registry.get_balance()?,
        })),
        OutputFormat::Text => {
            println!("{} Refund issued", "✓".green().bold());
            for transfer in payout.transfers() {
                println!(
                    "  Transfer: {} to {}",
                    transfer.amount.to_string().bold(),
                    transfer.recipient.to_hex().cyan()
                );
            }
            println!("  Held balance: {}", registry.get_balance()?);
            Ok(())
        }
    }
}

fn cmd_show(store: &StateFile, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (registry, _) = store.load()?;

    if let Some(registrant) = args.registrant {
        let paid = registry.registrants_paid(&registrant)?;
        return match format {
            OutputFormat::Json => print_json(json!({ "registrant": registrant, "paid": paid })),
            OutputFormat::Text => {
                println!("{} paid {}", registrant.to_hex().cyan(), paid.to_string().bold());
                Ok(())
            }
        };
    }

    let registrants = registry.registrants()?;
    match format {
        OutputFormat::Json => print_json(json!({
            "organizer": registry.organizer(),
            "quota": registry.quota()?,
            "num_registrants": registry.num_registrants()?,
            "balance": registry.get_balance()?,
            "registrants": registrants
                .iter()
                .map(|(id, paid)| json!({ "registrant": id, "paid": paid }))
                .collect::<Vec<_>>(),
        })),
        OutputFormat::Text => {
            println!("Organizer: {}", registry.organizer().to_hex().cyan());
            println!(
                "Registrants: {} / {}",
                registry.num_registrants()?.to_string().bold(),
                registry.quota()?.to_string().yellow()
            );
            println!("Held balance: {}", registry.get_balance()?.to_string().bold());
            if registrants.is_empty() {
                println!("\nNo payments recorded.");
            } else {
                println!();
                for (id, paid) in &registrants {
                    println!("  {}  {}", id.to_hex().cyan(), paid);
                }
            }
            Ok(())
        }
    }
}

fn cmd_log(store: &StateFile, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (registry, _) = store.load()?;
    let notifications = registry.notifications_since(args.since)?;

    match format {
        OutputFormat::Json => print_json(json!(notifications)),
        OutputFormat::Text => {
            if notifications.is_empty() {
                println!("Audit trail: no notifications.");
            }
            for notification in &notifications {
                print_notification(notification);
            }
            Ok(())
        }
    }
}

fn cmd_verify(store: &StateFile, format: OutputFormat) -> anyhow::Result<()> {
    // Restoring already rejects an imbalanced book or a gapped trail.
    let (registry, _) = store.load()?;
    let report = registry.audit()?;
    let digest = registry.snapshot()?.digest_hex()?;

    match format {
        OutputFormat::Json => print_json(json!({
            "balanced": report.is_balanced(),
            "report": report,
            "digest": digest,
        })),
        OutputFormat::Text => {
            println!("{} Registry integrity verified", "✓".green().bold());
            println!("  Held: {}  Recorded: {}", report.held, report.recorded);
            println!(
                "  Registrants: {} paying, count {}",
                report.registrants, report.count
            );
            println!("  Digest: {}", digest.dimmed());
            Ok(())
        }
    }
}

fn cmd_id(args: IdArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = confreg_types::RegistrantId::from_label(args.label.as_str());
    match format {
        OutputFormat::Json => print_json(json!({ "label": args.label, "id": id })),
        OutputFormat::Text => {
            println!("{}  {}", id.to_hex(), id.short_id().cyan());
            Ok(())
        }
    }
}
