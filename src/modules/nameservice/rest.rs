use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json,
};
use serde_derive::Deserialize;

use crate::{
    client::ClientContext,
    rest::{unsigned_tx, BaseReq, RestServer},
    tx::{Msg, StdTx},
    types::parse_coins,
    Result,
};

use super::{names, resolve, whois, MsgBuyName, MsgDeleteName, MsgSetName, QueryResResolve, Whois};

type Ctx = State<Arc<ClientContext>>;

pub fn register_routes(rs: &mut RestServer) {
    rs.handle(
        "/nameservice/names",
        get(names_handler)
            .post(buy_name_handler)
            .put(set_name_handler)
            .delete(delete_name_handler),
    );
    rs.handle("/nameservice/names/:name", get(resolve_handler));
    rs.handle("/nameservice/names/:name/whois", get(whois_handler));
}

async fn names_handler(State(ctx): Ctx) -> Result<Json<Vec<String>>> {
    Ok(Json(names(&ctx).await?))
}

async fn resolve_handler(State(ctx): Ctx, Path(name): Path<String>) -> Result<Json<QueryResResolve>> {
    Ok(Json(resolve(&ctx, &name).await?))
}

async fn whois_handler(State(ctx): Ctx, Path(name): Path<String>) -> Result<Json<Whois>> {
    Ok(Json(whois(&ctx, &name).await?))
}

#[derive(Debug, Deserialize)]
struct BuyNameReq {
    base_req: BaseReq,
    name: String,
    amount: String,
    buyer: String,
}

async fn buy_name_handler(State(ctx): Ctx, Json(req): Json<BuyNameReq>) -> Result<Json<StdTx>> {
    let msg = Msg::BuyName(MsgBuyName {
        name: req.name,
        bid: parse_coins(&req.amount)?,
        buyer: req.buyer,
    });
    Ok(Json(unsigned_tx(&ctx, &req.base_req, msg)?))
}

#[derive(Debug, Deserialize)]
struct SetNameReq {
    base_req: BaseReq,
    name: String,
    value: String,
    owner: String,
}

async fn set_name_handler(State(ctx): Ctx, Json(req): Json<SetNameReq>) -> Result<Json<StdTx>> {
    let msg = Msg::SetName(MsgSetName {
        name: req.name,
        value: req.value,
        owner: req.owner,
    });
    Ok(Json(unsigned_tx(&ctx, &req.base_req, msg)?))
}

#[derive(Debug, Deserialize)]
struct DeleteNameReq {
    base_req: BaseReq,
    name: String,
    owner: String,
}

async fn delete_name_handler(State(ctx): Ctx, Json(req): Json<DeleteNameReq>) -> Result<Json<StdTx>> {
    let msg = Msg::DeleteName(MsgDeleteName {
        name: req.name,
        owner: req.owner,
    });
    Ok(Json(unsigned_tx(&ctx, &req.base_req, msg)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::context;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn send(router: &Router, method: Method, body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri("/nameservice/names")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec())
    }

    #[tokio::test]
    async fn write_routes_return_unsigned_transactions() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let owner = ctx.prefixes.account_address(&[6u8; 20]).unwrap();
        let mut rs = RestServer::new(ctx);
        register_routes(&mut rs);
        let router = rs.into_router();
        let base_req = json!({ "from": owner, "chain_id": "namechain" });

        let (status, body) = send(
            &router,
            Method::POST,
            json!({ "base_req": base_req, "name": "alice.id", "amount": "5nametoken", "buyer": owner }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let tx: StdTx = serde_json::from_slice(&body).unwrap();
        assert!(matches!(&tx.msg[0], Msg::BuyName(msg) if msg.name == "alice.id"));

        let (status, body) = send(
            &router,
            Method::PUT,
            json!({ "base_req": base_req, "name": "alice.id", "value": "8.8.8.8", "owner": owner }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let tx: StdTx = serde_json::from_slice(&body).unwrap();
        assert!(matches!(&tx.msg[0], Msg::SetName(msg) if msg.value == "8.8.8.8"));

        let (status, body) = send(
            &router,
            Method::DELETE,
            json!({ "base_req": base_req, "name": "alice.id", "owner": owner }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let tx: StdTx = serde_json::from_slice(&body).unwrap();
        assert_eq!(tx.signers(), vec![owner.as_str()]);
    }

    #[tokio::test]
    async fn invalid_bids_are_bad_requests() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let owner = ctx.prefixes.account_address(&[6u8; 20]).unwrap();
        let mut rs = RestServer::new(ctx);
        register_routes(&mut rs);

        let (status, _) = send(
            &rs.into_router(),
            Method::POST,
            json!({
                "base_req": { "from": owner, "chain_id": "namechain" },
                "name": "alice.id",
                "amount": "lots",
                "buyer": owner
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
