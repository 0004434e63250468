//! Ethereum JSON-RPC endpoint served from an in-memory devnet.

use std::{net::TcpListener, thread};

use actix_web::{web, App, HttpResponse, HttpServer};
use register_dapp::{
    abi,
    devnet::Devnet,
    primitives::{decode_hex, encode_hex, Address, TxHash},
    provider::{CallRequest, TransactionRequest, WalletProvider},
    Error, Result,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct RpcCall {
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

pub struct Endpoint {
    pub url: String,
    pub devnet: web::Data<Devnet>,
}

/// Serves `devnet` on a loopback port until the test process exits.
pub fn serve(devnet: Devnet) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let url = format!("http://{}/", listener.local_addr().expect("local addr"));
    let devnet = web::Data::new(devnet);
    let shared = devnet.clone();

    thread::spawn(move || {
        actix_web::rt::System::new().block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .app_data(shared.clone())
                    .route("/", web::post().to(handle_json_rpc))
            })
            .workers(1)
            .disable_signals()
            .listen(listener)
            .expect("listen")
            .run()
            .await
            .expect("serve");
        });
    });

    Endpoint { url, devnet }
}

async fn handle_json_rpc(devnet: web::Data<Devnet>, body: web::Json<RpcCall>) -> HttpResponse {
    let call = body.into_inner();
    let response = match dispatch(&devnet, &call.method, &call.params).await {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": call.id, "result": result }),
        Err(err) => json!({ "jsonrpc": "2.0", "id": call.id, "error": error_object(&err) }),
    };
    HttpResponse::Ok().json(response)
}

fn error_object(err: &Error) -> Value {
    match err {
        Error::Reverted(reason) => json!({
            "code": 3,
            "message": format!("execution reverted: {reason}"),
            "data": encode_hex(abi::encode_revert(reason)),
        }),
        Error::WalletRejected(message) => json!({ "code": 4001, "message": message }),
        Error::Rpc { code, message } => json!({ "code": code, "message": message }),
        other => json!({ "code": -32603, "message": other.to_string() }),
    }
}

fn param_str<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params.get(0).and_then(|p| p.get(field)).and_then(Value::as_str)
}

fn invalid_params(method: &str) -> Error {
    Error::Rpc {
        code: -32602,
        message: format!("invalid params for {method}"),
    }
}

async fn dispatch(devnet: &Devnet, method: &str, params: &Value) -> Result<Value> {
    match method {
        "eth_requestAccounts" => Ok(json!(devnet.connect().await?)),
        "eth_accounts" => Ok(json!(devnet.accounts().await?)),
        "eth_chainId" => Ok(json!(format!("0x{:x}", devnet.chain_id().await?))),
        "eth_call" => {
            let to: Address = param_str(params, "to")
                .ok_or_else(|| invalid_params(method))?
                .parse()?;
            let data = decode_hex(param_str(params, "data").unwrap_or("0x"))?;
            let output = devnet.call(&CallRequest { to, data }).await?;
            Ok(json!(encode_hex(output)))
        }
        "eth_sendTransaction" => {
            let from: Address = param_str(params, "from")
                .ok_or_else(|| invalid_params(method))?
                .parse()?;
            let to = param_str(params, "to").map(str::parse).transpose()?;
            let data = decode_hex(param_str(params, "data").unwrap_or("0x"))?;
            let hash = devnet
                .send_transaction(&TransactionRequest { from, to, data })
                .await?;
            Ok(json!(hash))
        }
        "eth_getTransactionReceipt" => {
            let hash: TxHash = params
                .get(0)
                .and_then(Value::as_str)
                .ok_or_else(|| invalid_params(method))?
                .parse()?;
            let Some(receipt) = devnet.transaction_receipt(&hash).await? else {
                return Ok(Value::Null);
            };
            let status = if receipt.success { "0x1" } else { "0x0" };
            Ok(json!({
                "transactionHash": receipt.transaction_hash,
                "blockNumber": format!("0x{:x}", receipt.block_number),
                "status": status,
                "contractAddress": receipt.contract_address,
            }))
        }
        other => Err(Error::Rpc {
            code: -32601,
            message: format!("method {other} not found"),
        }),
    }
}
