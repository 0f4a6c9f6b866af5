use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json,
};
use serde_derive::Deserialize;

use crate::{
    client::ClientContext,
    modules::auth::query_account,
    rest::{unsigned_tx, BaseReq, RestServer},
    tx::{Msg, StdTx},
    types::Coin,
    Result,
};

use super::MsgSend;

type Ctx = State<Arc<ClientContext>>;

pub fn register_routes(rs: &mut RestServer) {
    rs.handle("/bank/balances/:address", get(balances));
    rs.handle("/bank/accounts/:address/transfers", post(transfer));
}

async fn balances(State(ctx): Ctx, Path(address): Path<String>) -> Result<Json<Vec<Coin>>> {
    Ok(Json(query_account(&ctx, &address).await?.coins))
}

#[derive(Debug, Deserialize)]
struct SendReq {
    base_req: BaseReq,
    amount: Vec<Coin>,
}

/// Builds an unsigned send from `base_req.from` to the address in the path.
async fn transfer(State(ctx): Ctx, Path(address): Path<String>, Json(req): Json<SendReq>) -> Result<Json<StdTx>> {
    let msg = Msg::Send(MsgSend {
        from_address: req.base_req.from.clone(),
        to_address: address,
        amount: req.amount,
    });
    Ok(Json(unsigned_tx(&ctx, &req.base_req, msg)?))
}
