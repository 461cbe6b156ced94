use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use commission_server::settlement::period;
use commission_server::{Server, ServerState, setup_environment};
use shared::models::Period;

/// 佣金结算服务
#[derive(Parser, Debug)]
#[command(name = "commission-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Run one settlement batch and print the summary as JSON
    Settle(SettleArgs),
}

#[derive(Args, Debug)]
struct SettleArgs {
    /// Order ids to settle
    #[arg(
        long = "order",
        num_args = 1..,
        conflicts_with_all = ["until", "period"],
        required_unless_present_any = ["until", "period"]
    )]
    orders: Vec<String>,

    /// Settle every confirmed order dated on or before this day (YYYY-MM-DD)
    #[arg(long, conflicts_with = "period")]
    until: Option<NaiveDate>,

    /// Settle every confirmed order that books into this period (YYYY-MM)
    #[arg(long)]
    period: Option<Period>,

    /// Restrict --until / --period to one company
    #[arg(long, conflicts_with = "orders")]
    company: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    // 2. 初始化服务器状态 (数据库 + 迁移)
    let state = ServerState::initialize(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Commission server starting...");
            let server = Server::with_state(config, state);
            if let Err(e) = server.run().await {
                tracing::error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        Command::Settle(args) => {
            let until = match (args.until, args.period) {
                (Some(date), _) => Some(date),
                (None, Some(p)) => Some(
                    period::last_order_date(p)
                        .ok_or_else(|| anyhow::anyhow!("period {p} out of range"))?,
                ),
                (None, None) => None,
            };
            let summary = match until {
                Some(date) => state.engine.settle_until(date, args.company).await?,
                None => state.engine.settle(&args.orders).await?,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["commission-server"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_settle_by_orders() {
        let cli =
            Cli::try_parse_from(["commission-server", "settle", "--order", "A1", "A2"]).unwrap();
        let Some(Command::Settle(args)) = cli.command else {
            panic!("expected settle");
        };
        assert_eq!(args.orders, vec!["A1", "A2"]);
        assert!(args.until.is_none());
    }

    #[test]
    fn test_settle_by_period_with_company() {
        let cli = Cli::try_parse_from([
            "commission-server",
            "settle",
            "--period",
            "2024-04",
            "--company",
            "3",
        ])
        .unwrap();
        let Some(Command::Settle(args)) = cli.command else {
            panic!("expected settle");
        };
        assert_eq!(args.period, Period::new(2024, 4));
        assert_eq!(args.company, Some(3));
    }

    #[test]
    fn test_settle_scope_conflicts() {
        assert!(Cli::try_parse_from(["commission-server", "settle"]).is_err());
        assert!(
            Cli::try_parse_from([
                "commission-server",
                "settle",
                "--order",
                "A1",
                "--until",
                "2024-03-31"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["commission-server", "settle", "--order", "A1", "--company", "1"])
                .is_err()
        );
    }
}
