use clap::Args;

use crate::{
    cli::{flags::TxFlags, Runnable},
    client::ClientContext,
    tx::{Msg, TxContext},
    types::parse_coins,
    Result,
};

use super::MsgSend;

#[derive(Debug, Args)]
pub struct SendCmd {
    #[arg(help = "Name of the sending key, or its address with --generate-only")]
    from: String,

    #[arg(help = "Bech32 address of the recipient")]
    to: String,

    #[arg(help = "Coins to send, e.g. 10stake,5nametoken")]
    amount: String,

    #[command(flatten)]
    tx: TxFlags,
}

impl Runnable for SendCmd {
    const NAME: &'static str = "send";
    const ABOUT: &'static str = "Create and sign a send tx";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx_ctx = TxContext::new(ctx, self.tx);
        let sender = tx_ctx.sender(&self.from)?;
        let msg = Msg::Send(MsgSend {
            from_address: sender.address.clone(),
            to_address: self.to,
            amount: parse_coins(&self.amount)?,
        });
        tx_ctx.complete_and_broadcast(&sender, vec![msg]).await
    }
}
