use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    client::ClientContext,
    config::BroadcastMode,
    rest::RestServer,
    tx::{broadcast, BaseAccount, StdTx},
    Error, Result,
};

use super::{query_account, query_tx, search_txs, SearchTxsResult, TxResponse};

type Ctx = State<Arc<ClientContext>>;

const DEFAULT_LIMIT: u32 = 30;

/// Transaction lookup, search, broadcast and codec routes.
pub fn register_tx_routes(rs: &mut RestServer) {
    rs.handle("/txs/:hash", get(tx_by_hash));
    rs.handle("/txs", get(search).post(broadcast_tx));
    rs.handle("/txs/encode", post(encode_tx));
    rs.handle("/txs/decode", post(decode_tx));
}

pub fn register_routes(rs: &mut RestServer) {
    rs.handle("/auth/accounts/:address", get(account));
}

async fn account(State(ctx): Ctx, Path(address): Path<String>) -> Result<Json<BaseAccount>> {
    Ok(Json(query_account(&ctx, &address).await?))
}

async fn tx_by_hash(State(ctx): Ctx, Path(hash): Path<String>) -> Result<Json<TxResponse>> {
    Ok(Json(query_tx(&ctx, &hash).await?))
}

fn page_param(name: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::CustomError(format!("couldn't parse {name} {value:?}")))
}

/// Splits the query string into events and the `page`/`limit` parameters.
fn search_params(params: Vec<(String, String)>) -> Result<(Vec<(String, String)>, u32, u32)> {
    let mut page = 1;
    let mut limit = DEFAULT_LIMIT;
    let mut events = vec![];
    for (key, value) in params {
        match key.as_str() {
            "page" => page = page_param("page", &value)?,
            "limit" => limit = page_param("limit", &value)?,
            _ => events.push((key, value)),
        }
    }
    Ok((events, page, limit))
}

async fn search(State(ctx): Ctx, Query(params): Query<Vec<(String, String)>>) -> Result<Json<SearchTxsResult>> {
    let (events, page, limit) = search_params(params)?;
    Ok(Json(search_txs(&ctx, &events, page, limit).await?))
}

#[derive(Debug, Deserialize)]
struct BroadcastReq {
    tx: StdTx,
    #[serde(default)]
    mode: String,
}

async fn broadcast_tx(State(ctx): Ctx, Json(req): Json<BroadcastReq>) -> Result<Json<Value>> {
    let mode = if req.mode.is_empty() {
        ctx.settings.broadcast_mode
    } else {
        BroadcastMode::from_str(&req.mode, true).map_err(Error::CustomError)?
    };
    Ok(Json(broadcast(&ctx, &req.tx, mode).await?))
}

#[derive(Debug, Deserialize)]
struct EncodeReq {
    tx: StdTx,
}

#[derive(Debug, Deserialize, Serialize)]
struct EncodeResp {
    tx: String,
}

async fn encode_tx(State(ctx): Ctx, Json(req): Json<EncodeReq>) -> Result<Json<EncodeResp>> {
    let bytes = ctx.codec.marshal_binary(&req.tx)?;
    Ok(Json(EncodeResp {
        tx: STANDARD.encode(bytes),
    }))
}

#[derive(Debug, Deserialize)]
struct DecodeReq {
    tx: String,
}

#[derive(Debug, Serialize)]
struct DecodeResp {
    tx: StdTx,
}

async fn decode_tx(State(ctx): Ctx, Json(req): Json<DecodeReq>) -> Result<Json<DecodeResp>> {
    let bytes = STANDARD.decode(req.tx.trim())?;
    Ok(Json(DecodeResp {
        tx: ctx.codec.unmarshal_binary(&bytes)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::tests::context, tx::StdFee};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router(home: &TempDir) -> Router {
        let mut rs = RestServer::new(context(home.path()));
        register_tx_routes(&mut rs);
        rs.into_router()
    }

    async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn encode_then_decode_over_http() {
        let home = TempDir::new().unwrap();
        let router = router(&home);
        let tx = StdTx::new(vec![], StdFee::default(), "over http".to_owned());

        let (status, encoded) = post_json(&router, "/txs/encode", json!({ "tx": tx })).await;
        assert_eq!(status, StatusCode::OK);

        let (status, decoded) = post_json(&router, "/txs/decode", encoded).await;
        assert_eq!(status, StatusCode::OK);
        let decoded: StdTx = serde_json::from_value(decoded["tx"].clone()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[tokio::test]
    async fn bad_base64_is_a_bad_request() {
        let home = TempDir::new().unwrap();
        let (status, body) = post_json(&router(&home), "/txs/decode", json!({ "tx": "***" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn search_without_events_is_a_bad_request() {
        let home = TempDir::new().unwrap();
        let response = router(&home)
            .oneshot(Request::get("/txs?page=1&limit=10").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn page_and_limit_are_split_from_events() {
        let (events, page, limit) = search_params(vec![
            ("message.action".to_owned(), "send".to_owned()),
            ("page".to_owned(), "2".to_owned()),
        ])
        .unwrap();
        assert_eq!(events, vec![("message.action".to_owned(), "send".to_owned())]);
        assert_eq!((page, limit), (2, DEFAULT_LIMIT));
        assert!(search_params(vec![("limit".to_owned(), "x".to_owned())]).is_err());
    }
}
