use clap::Args;

use crate::{
    cli::{flags::TxFlags, Runnable},
    client::ClientContext,
    tx::{Msg, TxContext},
    types::parse_coins,
    Result,
};

use super::{names, resolve, whois, MsgBuyName, MsgDeleteName, MsgSetName};

#[derive(Debug, Args)]
pub struct ResolveCmd {
    name: String,
}

impl Runnable for ResolveCmd {
    const NAME: &'static str = "resolve";
    const ABOUT: &'static str = "resolve name";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&resolve(ctx, &self.name).await?)
    }
}

#[derive(Debug, Args)]
pub struct WhoisCmd {
    name: String,
}

impl Runnable for WhoisCmd {
    const NAME: &'static str = "whois";
    const ABOUT: &'static str = "Query whois info of name";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&whois(ctx, &self.name).await?)
    }
}

#[derive(Debug, Args)]
pub struct NamesCmd {}

impl Runnable for NamesCmd {
    const NAME: &'static str = "names";
    const ABOUT: &'static str = "names";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&names(ctx).await?)
    }
}

#[derive(Debug, Args)]
pub struct BuyNameCmd {
    name: String,

    #[arg(help = "Bid, e.g. 10nametoken")]
    amount: String,

    #[arg(long, help = "Name of the buying key, or its address with --generate-only")]
    from: String,

    #[command(flatten)]
    tx: TxFlags,
}

impl Runnable for BuyNameCmd {
    const NAME: &'static str = "buy-name";
    const ABOUT: &'static str = "bid for existing name or claim new name";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx_ctx = TxContext::new(ctx, self.tx);
        let sender = tx_ctx.sender(&self.from)?;
        let msg = Msg::BuyName(MsgBuyName {
            name: self.name,
            bid: parse_coins(&self.amount)?,
            buyer: sender.address.clone(),
        });
        tx_ctx.complete_and_broadcast(&sender, vec![msg]).await
    }
}

#[derive(Debug, Args)]
pub struct SetNameCmd {
    name: String,

    value: String,

    #[arg(long, help = "Name of the owning key, or its address with --generate-only")]
    from: String,

    #[command(flatten)]
    tx: TxFlags,
}

impl Runnable for SetNameCmd {
    const NAME: &'static str = "set-name";
    const ABOUT: &'static str = "set the value associated with a name that you own";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx_ctx = TxContext::new(ctx, self.tx);
        let sender = tx_ctx.sender(&self.from)?;
        let msg = Msg::SetName(MsgSetName {
            name: self.name,
            value: self.value,
            owner: sender.address.clone(),
        });
        tx_ctx.complete_and_broadcast(&sender, vec![msg]).await
    }
}

#[derive(Debug, Args)]
pub struct DeleteNameCmd {
    name: String,

    #[arg(long, help = "Name of the owning key, or its address with --generate-only")]
    from: String,

    #[command(flatten)]
    tx: TxFlags,
}

impl Runnable for DeleteNameCmd {
    const NAME: &'static str = "delete-name";
    const ABOUT: &'static str = "delete the name that you own along with it's associated fields";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx_ctx = TxContext::new(ctx, self.tx);
        let sender = tx_ctx.sender(&self.from)?;
        let msg = Msg::DeleteName(MsgDeleteName {
            name: self.name,
            owner: sender.address.clone(),
        });
        tx_ctx.complete_and_broadcast(&sender, vec![msg]).await
    }
}
