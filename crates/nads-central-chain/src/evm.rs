use crate::{
    error::{ReadError, ReadResult},
    reader::ChainReader,
};
use async_trait::async_trait;
use nads_central_gate::WalletAddress;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

/// `balanceOf(address)` selector
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

const EVM_ADDRESS_BYTES: usize = 20;

/// Reads ERC-721 balances with an `eth_call` to `balanceOf`
#[derive(Debug, Clone)]
pub struct Erc721BalanceReader {
    http: reqwest::Client,
    rpc_url: Url,
    contract: [u8; EVM_ADDRESS_BYTES],
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl Erc721BalanceReader {
    pub fn new(rpc_url: Url, contract: &str) -> ReadResult<Self> {
        Self::with_client(reqwest::Client::new(), rpc_url, contract)
    }

    pub fn with_client(http: reqwest::Client, rpc_url: Url, contract: &str) -> ReadResult<Self> {
        let contract = parse_evm_address(contract)
            .map_err(|e| ReadError::Config(format!("Invalid contract address: {}", e)))?;
        Ok(Self {
            http,
            rpc_url,
            contract,
        })
    }

    pub fn contract_hex(&self) -> String {
        format!("0x{}", hex::encode(self.contract))
    }
}

#[async_trait]
impl ChainReader for Erc721BalanceReader {
    async fn read_balance(&self, owner: &WalletAddress) -> ReadResult<u64> {
        let owner_bytes = parse_evm_address(owner.as_str())?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.contract_hex(), "data": encode_balance_of(&owner_bytes) },
                "latest"
            ],
        });

        debug!("eth_call balanceOf({}) on {}", owner, self.contract_hex());
        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReadError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ReadError::Decode(format!("Malformed JSON-RPC response: {}", e)))?;

        if let Some(error) = payload.error {
            return Err(ReadError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = payload
            .result
            .ok_or_else(|| ReadError::Decode("JSON-RPC response has no result".to_string()))?;
        decode_quantity(&result)
    }

    fn describe(&self) -> String {
        format!("erc721 {} via {}", self.contract_hex(), self.rpc_url)
    }
}

/// Parse a `0x`-prefixed, 20-byte hex address
pub fn parse_evm_address(raw: &str) -> ReadResult<[u8; EVM_ADDRESS_BYTES]> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ReadError::InvalidAddress(format!("{} is missing the 0x prefix", raw)))?;

    let bytes = hex::decode(digits)
        .map_err(|e| ReadError::InvalidAddress(format!("{}: {}", raw, e)))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        ReadError::InvalidAddress(format!(
            "{} is {} bytes, expected {}",
            raw,
            bytes.len(),
            EVM_ADDRESS_BYTES
        ))
    })
}

/// ABI-encode `balanceOf(owner)` as call data
pub fn encode_balance_of(owner: &[u8; EVM_ADDRESS_BYTES]) -> String {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&[0u8; 32 - EVM_ADDRESS_BYTES]);
    data.extend_from_slice(owner);
    format!("0x{}", hex::encode(data))
}

/// Decode a hex quantity returned by `eth_call`
///
/// Values above `u64::MAX` saturate; only zero versus non-zero matters to
/// the gate.
pub fn decode_quantity(raw: &str) -> ReadResult<u64> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() {
        return Err(ReadError::Decode(
            "empty call result, is the contract deployed?".to_string(),
        ));
    }

    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };

    let bytes =
        hex::decode(digits).map_err(|e| ReadError::Decode(format!("{}: {}", raw, e)))?;

    let split = bytes.len().saturating_sub(8);
    let (high, low) = bytes.split_at(split);
    if high.iter().any(|byte| *byte != 0) {
        return Ok(u64::MAX);
    }

    Ok(low.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}
