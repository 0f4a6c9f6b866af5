//! Local REST gateway in front of the node.
//!
//! Routes come from three places, registered in this order: the core client routes,
//! the auth transaction routes, then every application module. Registration does no
//! conflict detection of its own: a duplicate path and method panics inside the router
//! as it is registered, so a collision stops `rest-server` at startup before any
//! request is served.

use std::{mem, sync::Arc, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json, Router,
};
use clap::Args;
use serde_derive::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::{
    cli::Runnable,
    client::{self, ClientContext},
    modules::{auth, ModuleBasics},
    tx::{Msg, StdFee, StdTx, DEFAULT_GAS},
    types::Coin,
    Error, Result,
};

pub type Mux = Router<Arc<ClientContext>>;

pub struct RestServer {
    cli_ctx: Arc<ClientContext>,
    mux: Mux,
    paths: Vec<String>,
}

impl RestServer {
    pub fn new(cli_ctx: ClientContext) -> Self {
        Self {
            cli_ctx: Arc::new(cli_ctx),
            mux: Router::new(),
            paths: vec![],
        }
    }

    pub fn handle(&mut self, path: &str, method_router: MethodRouter<Arc<ClientContext>>) {
        debug!(path, "registering route");
        self.paths.push(path.to_owned());
        self.mux = mem::take(&mut self.mux).route(path, method_router);
    }

    /// Paths in registration order.
    pub fn registered_paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_router(self) -> Router {
        self.mux.with_state(self.cli_ctx)
    }

    pub async fn start(self, laddr: &str, read_timeout: Duration, unsafe_cors: bool) -> Result<()> {
        let addr = laddr.strip_prefix("tcp://").unwrap_or(laddr).to_owned();
        let routes = self.paths.len();

        let mut router = self
            .into_router()
            .layer(TimeoutLayer::new(read_timeout))
            .layer(TraceLayer::new_for_http());
        if unsafe_cors {
            router = router.layer(CorsLayer::permissive());
        }

        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, routes, "starting rest server");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down rest server");
    }
}

/// Core client routes, auth tx routes, then every module's routes.
pub fn register_routes(rs: &mut RestServer, modules: &ModuleBasics) {
    client::rest::register_routes(rs);
    auth::rest::register_tx_routes(rs);
    modules.register_rest_routes(rs);
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::KeyNotFound(_) | Error::AbciQuery { .. } => StatusCode::NOT_FOUND,
            Error::Bech32 { .. }
            | Error::InvalidCoins(_)
            | Error::HexError { .. }
            | Error::Base64Error { .. }
            | Error::Base58Error { .. }
            | Error::JsonError { .. }
            | Error::BincodeError { .. }
            | Error::CustomError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Fields common to every request that builds a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseReq {
    pub from: String,
    #[serde(default)]
    pub memo: String,
    pub chain_id: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub gas: Option<String>,
    #[serde(default)]
    pub fees: Vec<Coin>,
}

impl BaseReq {
    pub fn validate(&self, ctx: &ClientContext) -> Result<()> {
        if self.chain_id.trim().is_empty() {
            return Err(Error::CustomError("chain-id required but not specified".to_owned()));
        }
        ctx.prefixes.validate_account_address(&self.from)
    }

    pub fn fee(&self) -> Result<StdFee> {
        let gas = match self.gas.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_GAS,
            Some(gas) => gas
                .parse()
                .map_err(|_| Error::CustomError(format!("invalid gas {gas:?}")))?,
        };
        Ok(StdFee {
            amount: self.fees.clone(),
            gas,
        })
    }
}

/// Validates `base_req` and `msg` and wraps the message in an unsigned transaction.
pub fn unsigned_tx(ctx: &ClientContext, base_req: &BaseReq, msg: Msg) -> Result<StdTx> {
    base_req.validate(ctx)?;
    msg.validate_basic(&ctx.prefixes)?;
    Ok(StdTx::new(vec![msg], base_req.fee()?, base_req.memo.clone()))
}

pub fn parse_height(height: &str) -> Result<u64> {
    height
        .parse()
        .map_err(|_| Error::CustomError(format!("couldn't parse block height {height:?}")))
}

#[derive(Debug, Args)]
pub struct RestServerCmd {
    #[arg(long, default_value = "tcp://localhost:1317", help = "The address for the server to listen on")]
    laddr: String,

    #[arg(long, default_value_t = 10, help = "The RPC read timeout (in seconds)")]
    read_timeout: u64,

    #[arg(long, help = "Allows CORS requests from all domains. For development purposes only, use it at your own risk.")]
    unsafe_cors: bool,
}

impl Runnable for RestServerCmd {
    const NAME: &'static str = "rest-server";
    const ABOUT: &'static str = "Start LCD (light-client daemon), a local REST server";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let mut rs = RestServer::new(ctx.clone());
        register_routes(&mut rs, &ctx.modules);
        rs.start(&self.laddr, Duration::from_secs(self.read_timeout), self.unsafe_cors)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, client::tests::context, modules::bank::MsgSend};
    use axum::{body::Body, http::Request};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[test]
    fn routes_register_core_then_auth_then_modules() {
        let home = TempDir::new().unwrap();
        let mut rs = RestServer::new(context(home.path()));
        register_routes(&mut rs, &app::module_basics());

        let paths = rs.registered_paths();
        let position = |path: &str| paths.iter().position(|p| p == path).unwrap();
        assert!(position("/node_info") < position("/txs"));
        assert!(position("/txs") < position("/auth/accounts/:address"));
        assert!(position("/auth/accounts/:address") < position("/bank/balances/:address"));
        assert!(position("/bank/balances/:address") < position("/nameservice/names"));
    }

    #[test]
    #[should_panic]
    fn duplicate_routes_panic_while_registering() {
        async fn ok() {}

        let home = TempDir::new().unwrap();
        let mut rs = RestServer::new(context(home.path()));
        rs.handle("/node_info", axum::routing::get(ok));
        rs.handle("/node_info", axum::routing::get(ok));
    }

    #[test]
    fn base_req_fee_defaults_gas() {
        let req: BaseReq = serde_json::from_value(json!({
            "from": "cosmos1xyz",
            "chain_id": "namechain",
            "fees": [{ "amount": "1", "denom": "stake" }]
        }))
        .unwrap();
        let fee = req.fee().unwrap();
        assert_eq!(fee.gas, DEFAULT_GAS);
        assert_eq!(fee.amount, vec![Coin::new(1, "stake").unwrap()]);
    }

    #[test]
    fn unsigned_tx_rejects_missing_chain_id() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let from = ctx.prefixes.account_address(&[1u8; 20]).unwrap();
        let msg = Msg::Send(MsgSend {
            from_address: from.clone(),
            to_address: ctx.prefixes.account_address(&[2u8; 20]).unwrap(),
            amount: vec![Coin::new(1, "stake").unwrap()],
        });
        let mut req = BaseReq {
            from,
            memo: String::new(),
            chain_id: " ".to_owned(),
            account_number: None,
            sequence: None,
            gas: None,
            fees: vec![],
        };
        assert!(unsigned_tx(&ctx, &req, msg.clone()).is_err());

        req.chain_id = "namechain".to_owned();
        assert_eq!(unsigned_tx(&ctx, &req, msg).unwrap().msg.len(), 1);
    }

    #[tokio::test]
    async fn errors_become_json_with_a_status() {
        let response = Error::KeyNotFound("alice".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Error::InvalidCoins("x".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "invalid coins: x" }));
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let home = TempDir::new().unwrap();
        let mut rs = RestServer::new(context(home.path()));
        register_routes(&mut rs, &app::module_basics());

        let response = rs
            .into_router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
