use clap::Args;

use crate::{cli::Runnable, client::ClientContext, Result};

use super::{parse_events, query_account, query_tx, search_txs};

#[derive(Debug, Args)]
pub struct AccountCmd {
    #[arg(help = "Bech32 account address")]
    address: String,
}

impl Runnable for AccountCmd {
    const NAME: &'static str = "account";
    const ABOUT: &'static str = "Query account balance";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&query_account(ctx, &self.address).await?)
    }
}

#[derive(Debug, Args)]
pub struct QueryTxsCmd {
    #[arg(long, help = "List of transaction events in the form of {eventType}.{eventAttribute}={value}, joined by &")]
    events: String,

    #[arg(long, default_value_t = 1, help = "Query a specific page of paginated results")]
    page: u32,

    #[arg(long, default_value_t = 30, help = "Query number of transactions results per page returned")]
    limit: u32,
}

impl Runnable for QueryTxsCmd {
    const NAME: &'static str = "txs";
    const ABOUT: &'static str = "Query for paginated transactions that match a set of events";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let events = parse_events(&self.events)?;
        ctx.print_output(&search_txs(ctx, &events, self.page, self.limit).await?)
    }
}

#[derive(Debug, Args)]
pub struct QueryTxCmd {
    #[arg(help = "Hex encoded transaction hash")]
    hash: String,
}

impl Runnable for QueryTxCmd {
    const NAME: &'static str = "tx";
    const ABOUT: &'static str = "Query for a transaction by hash in a committed block";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&query_tx(ctx, &self.hash).await?)
    }
}
