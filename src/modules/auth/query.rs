use base64::{engine::general_purpose::STANDARD, Engine};
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    client::ClientContext,
    codec::base64_bytes,
    config::AddressKind,
    tx::{BaseAccount, StdTx},
    Error, Result,
};

use super::QUERIER_ROUTE;

const QUERY_ACCOUNT: &str = "account";

#[derive(Debug, Serialize)]
struct QueryAccountParams {
    #[serde(rename = "Address", with = "base64_bytes")]
    address: Vec<u8>,
}

/// The node may wrap the account as `{"type": ..., "value": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountResponse {
    Typed { value: BaseAccount },
    Plain(BaseAccount),
}

pub async fn query_account(ctx: &ClientContext, address: &str) -> Result<BaseAccount> {
    let bytes = ctx.prefixes.decode_address(AddressKind::Account, address)?;
    let params = ctx.codec.marshal_json(&QueryAccountParams { address: bytes })?;
    let path = format!("custom/{QUERIER_ROUTE}/{QUERY_ACCOUNT}");

    let response = ctx.rpc().abci_query(&path, &params, ctx.prove()).await?;
    Ok(match ctx.codec.unmarshal_json(&response)? {
        AccountResponse::Typed { value } => value,
        AccountResponse::Plain(account) => account,
    })
}

/// Parses `message.action=send&message.sender=cosmos1...` into key/value pairs.
/// Keys must have the `{eventType}.{eventAttribute}` form.
pub fn parse_events(events: &str) -> Result<Vec<(String, String)>> {
    events
        .split('&')
        .filter(|event| !event.is_empty())
        .map(|event| {
            let (key, value) = event.split_once('=').ok_or_else(|| {
                Error::CustomError(format!("invalid event {event:?}; events must be in the form {{eventType}}.{{eventAttribute}}={{value}}"))
            })?;
            validate_event(key, value)?;
            Ok((key.to_owned(), value.to_owned()))
        })
        .collect()
}

fn validate_event(key: &str, value: &str) -> Result<()> {
    let valid_key = key
        .split_once('.')
        .is_some_and(|(kind, attribute)| !kind.is_empty() && !attribute.is_empty());
    if !valid_key || value.is_empty() {
        return Err(Error::CustomError(format!(
            "invalid event {key}={value}; events must be in the form {{eventType}}.{{eventAttribute}}={{value}}"
        )));
    }
    // The query language has no escape for a quote inside a quoted value.
    if key.contains('\'') || value.contains('\'') {
        return Err(Error::CustomError(format!(
            "invalid event {key}={value}; quotes are not allowed in event keys or values"
        )));
    }
    Ok(())
}

/// `k='v' AND k2='v2'`, the tendermint query syntax.
pub fn events_query(events: &[(String, String)]) -> Result<String> {
    if events.is_empty() {
        return Err(Error::CustomError("must declare at least one event to search".to_owned()));
    }
    for (key, value) in events {
        validate_event(key, value)?;
    }
    Ok(events
        .iter()
        .map(|(key, value)| format!("{key}='{value}'"))
        .collect::<Vec<_>>()
        .join(" AND "))
}

#[derive(Debug, Deserialize)]
struct RpcTxSearch {
    txs: Vec<RpcTx>,
    total_count: String,
}

#[derive(Debug, Deserialize)]
struct RpcTx {
    hash: String,
    height: String,
    #[serde(default)]
    tx_result: RpcTxResult,
    tx: String,
}

#[derive(Debug, Default, Deserialize)]
struct RpcTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    gas_wanted: String,
    #[serde(default)]
    gas_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxResponse {
    pub height: String,
    pub txhash: String,
    pub code: u32,
    pub raw_log: String,
    pub gas_wanted: String,
    pub gas_used: String,
    pub tx: StdTx,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTxsResult {
    pub total_count: u64,
    pub count: usize,
    pub page_number: u32,
    pub page_total: u64,
    pub limit: u32,
    pub txs: Vec<TxResponse>,
}

fn tx_response(ctx: &ClientContext, rpc: RpcTx) -> Result<TxResponse> {
    let bytes = STANDARD.decode(&rpc.tx)?;
    Ok(TxResponse {
        height: rpc.height,
        txhash: rpc.hash,
        code: rpc.tx_result.code,
        raw_log: rpc.tx_result.log,
        gas_wanted: rpc.tx_result.gas_wanted,
        gas_used: rpc.tx_result.gas_used,
        tx: ctx.codec.unmarshal_binary(&bytes)?,
    })
}

pub async fn query_tx(ctx: &ClientContext, hash: &str) -> Result<TxResponse> {
    let hash = hex::decode(hash)?;
    let result = ctx.rpc().tx(&hash, ctx.prove()).await?;
    tx_response(ctx, serde_json::from_value(result)?)
}

pub async fn search_txs(ctx: &ClientContext, events: &[(String, String)], page: u32, limit: u32) -> Result<SearchTxsResult> {
    if page == 0 || limit == 0 {
        return Err(Error::CustomError("page and limit must be greater than 0".to_owned()));
    }
    let query = events_query(events)?;
    debug!(%query, page, limit, "searching transactions");

    let result = ctx.rpc().tx_search(&query, page, limit, ctx.prove()).await?;
    search_result(ctx, serde_json::from_value(result)?, page, limit)
}

fn search_result(ctx: &ClientContext, rpc: RpcTxSearch, page: u32, limit: u32) -> Result<SearchTxsResult> {
    let total_count: u64 = rpc
        .total_count
        .parse()
        .map_err(|_| Error::CustomError(format!("invalid total_count {:?}", rpc.total_count)))?;
    let txs = rpc
        .txs
        .into_iter()
        .map(|tx| tx_response(ctx, tx))
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchTxsResult {
        total_count,
        count: txs.len(),
        page_number: page,
        page_total: total_count.div_ceil(u64::from(limit)),
        limit,
        txs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::tests::context, tx::StdFee};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn events_become_a_tendermint_query() {
        let events = parse_events("message.action=send&message.sender=cosmos1abc").unwrap();
        assert_eq!(
            events_query(&events).unwrap(),
            "message.action='send' AND message.sender='cosmos1abc'"
        );
    }

    #[test]
    fn malformed_events_are_rejected() {
        assert!(parse_events("action=send").is_err());
        assert!(parse_events("message.action").is_err());
        assert!(parse_events("message.=send").is_err());
        assert!(parse_events("message.action=").is_err());
        assert!(events_query(&[]).is_err());
    }

    #[test]
    fn quoted_event_values_are_rejected() {
        assert!(parse_events("message.sender=o'brien").is_err());
        let events = vec![("message.action".to_owned(), "send' OR tx.height>'0".to_owned())];
        assert!(events_query(&events).is_err());
    }

    #[test]
    fn account_responses_may_be_typed() {
        let typed: AccountResponse = serde_json::from_value(json!({
            "type": "cosmos-sdk/Account",
            "value": { "address": "cosmos1abc", "account_number": 3, "sequence": 4 }
        }))
        .unwrap();
        let AccountResponse::Typed { value } = typed else {
            panic!("expected typed response");
        };
        assert_eq!(value.account_number, 3);
        assert_eq!(value.sequence, 4);
    }

    #[test]
    fn search_results_decode_transactions() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let tx = StdTx::new(vec![], StdFee::default(), "hello".to_owned());
        let encoded = STANDARD.encode(ctx.codec.marshal_binary(&tx).unwrap());

        let rpc: RpcTxSearch = serde_json::from_value(json!({
            "txs": [{
                "hash": "AB",
                "height": "7",
                "tx_result": { "code": 0, "log": "[]", "gas_wanted": "200000", "gas_used": "1000" },
                "tx": encoded
            }],
            "total_count": "31"
        }))
        .unwrap();

        let result = search_result(&ctx, rpc, 1, 30).unwrap();
        assert_eq!(result.total_count, 31);
        assert_eq!(result.page_total, 2);
        assert_eq!(result.count, 1);
        assert_eq!(result.txs[0].tx, tx);
        assert_eq!(result.txs[0].height, "7");
    }
}
