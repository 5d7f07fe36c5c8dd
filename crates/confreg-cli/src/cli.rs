use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use confreg_types::RegistrantId;

#[derive(Parser)]
#[command(
    name = "confreg",
    about = "Conference registry: ticket sales, quota, and exact refunds",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Registry snapshot file
    #[arg(long, global = true, default_value = "confreg.json")]
    pub state: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy a new registry into the state file
    Deploy(DeployArgs),
    /// Buy a ticket by depositing value
    Buy(BuyArgs),
    /// Change the registrant quota (operator only)
    ChangeQuota(ChangeQuotaArgs),
    /// Refund a registrant's full payment (operator only)
    Refund(RefundArgs),
    /// Show registry state, or one registrant's payment
    Show(ShowArgs),
    /// Show the Deposit/Refund audit trail
    Log(LogArgs),
    /// Check that the held balance matches recorded payments
    Verify(VerifyArgs),
    /// Derive an identity from a label
    Id(IdArgs),
}

#[derive(Args)]
pub struct DeployArgs {
    /// Operator identity (hex or @label)
    #[arg(long, value_parser = parse_identity)]
    pub operator: RegistrantId,
    /// TOML registry configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Initial quota, overriding the configuration file
    #[arg(long)]
    pub quota: Option<u64>,
    /// Replace an existing state file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct BuyArgs {
    /// Purchaser identity (hex or @label)
    #[arg(long, value_parser = parse_identity)]
    pub from: RegistrantId,
    /// Attached deposit
    #[arg(long)]
    pub value: u64,
    /// Report the outcome without committing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ChangeQuotaArgs {
    #[arg(long, value_parser = parse_identity)]
    pub from: RegistrantId,
    pub quota: u64,
}

#[derive(Args)]
pub struct RefundArgs {
    #[arg(long, value_parser = parse_identity)]
    pub from: RegistrantId,
    #[arg(value_parser = parse_identity)]
    pub registrant: RegistrantId,
    pub amount: u64,
    /// Report the outcome without committing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(value_parser = parse_identity)]
    pub registrant: Option<RegistrantId>,
}

#[derive(Args)]
pub struct LogArgs {
    /// Only notifications after this sequence number
    #[arg(long, default_value = "0")]
    pub since: u64,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct IdArgs {
    pub label: String,
}

/// Accepts `@label` (derived from the label) or a hex identity with an
/// optional `rg:` prefix.
pub fn parse_identity(text: &str) -> Result<RegistrantId, String> {
    match text.strip_prefix('@') {
        Some("") => Err("empty identity label".into()),
        Some(label) => Ok(RegistrantId::from_label(label)),
        None => RegistrantId::from_hex(text).map_err(|e| e.to_string()),
    }
}
