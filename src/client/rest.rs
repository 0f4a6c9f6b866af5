use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json,
};
use serde_json::{json, Value};

use crate::{
    rest::{parse_height, RestServer},
    Result,
};

use super::{query::validator_set, query::ValidatorSetOutput, ClientContext};

type Ctx = State<Arc<ClientContext>>;

/// Node and chain information routes that need no module.
pub fn register_routes(rs: &mut RestServer) {
    rs.handle("/node_info", get(node_info));
    rs.handle("/syncing", get(syncing));
    rs.handle("/blocks/latest", get(latest_block));
    rs.handle("/blocks/:height", get(block_at));
    rs.handle("/validatorsets/latest", get(latest_validator_set));
    rs.handle("/validatorsets/:height", get(validator_set_at));
}

async fn node_info(State(ctx): Ctx) -> Result<Json<Value>> {
    let status = ctx.rpc().status().await?;
    Ok(Json(status["node_info"].clone()))
}

async fn syncing(State(ctx): Ctx) -> Result<Json<Value>> {
    let status = ctx.rpc().status().await?;
    let syncing = status["sync_info"]["catching_up"].as_bool().unwrap_or(false);
    Ok(Json(json!({ "syncing": syncing })))
}

async fn latest_block(State(ctx): Ctx) -> Result<Json<Value>> {
    Ok(Json(ctx.rpc().block(None).await?))
}

async fn block_at(State(ctx): Ctx, Path(height): Path<String>) -> Result<Json<Value>> {
    let height = parse_height(&height)?;
    Ok(Json(ctx.rpc().block(Some(height)).await?))
}

async fn latest_validator_set(State(ctx): Ctx) -> Result<Json<ValidatorSetOutput>> {
    Ok(Json(validator_set(&ctx, None).await?))
}

async fn validator_set_at(State(ctx): Ctx, Path(height): Path<String>) -> Result<Json<ValidatorSetOutput>> {
    let height = parse_height(&height)?;
    Ok(Json(validator_set(&ctx, Some(height)).await?))
}
