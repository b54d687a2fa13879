// Chronik indexer client
//
// Read-only access to blocks, transactions and per-script history. The
// handlers only see the `ChronikClient` trait; `HttpChronik` talks to the
// indexer's REST interface, whose bodies are protobuf messages (`proto`)
// converted to the chain types at this boundary.

mod proto;

use async_trait::async_trait;
use prost::Message;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::types::{Block, BlockInfo, BlockchainInfo, Tx, TxHistoryPage, Utxo};
use crate::upstream::{check_status, join_url, send_raw, UpstreamError};

const SERVICE: &str = "chronik";

#[async_trait]
pub trait ChronikClient: Send + Sync {
    async fn blockchain_info(&self) -> Result<BlockchainInfo, UpstreamError>;

    /// Block by hash or height, with its transactions
    async fn block(&self, hash_or_height: &str) -> Result<Block, UpstreamError>;

    /// Block infos for the inclusive height range, lowest first
    async fn blocks(&self, start_height: i32, end_height: i32)
        -> Result<Vec<BlockInfo>, UpstreamError>;

    async fn tx(&self, txid: &str) -> Result<Tx, UpstreamError>;

    /// One page of a script's history, newest first. `page` is 0-indexed.
    async fn script_history(
        &self,
        script_type: &str,
        payload_hex: &str,
        page: u32,
        page_size: u32,
    ) -> Result<TxHistoryPage, UpstreamError>;

    async fn script_utxos(
        &self,
        script_type: &str,
        payload_hex: &str,
    ) -> Result<Vec<Utxo>, UpstreamError>;
}

fn decode<P: Message + Default>(body: &[u8]) -> Result<P, UpstreamError> {
    P::decode(body).map_err(|e| UpstreamError::decode(SERVICE, e))
}

pub struct HttpChronik {
    client: Client,
    base_url: String,
}

impl HttpChronik {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn request(&self, segments: &[&str]) -> Result<RequestBuilder, UpstreamError> {
        Ok(self.client.get(join_url(SERVICE, &self.base_url, segments)?))
    }

    async fn fetch<P: Message + Default>(&self, request: RequestBuilder) -> Result<P, UpstreamError> {
        let (status, body) = send_raw(SERVICE, request).await?;
        if !status.is_success() {
            if let Ok(error) = proto::ErrorBody::decode(body.as_slice()) {
                debug!(
                    status = status.as_u16(),
                    code = %error.error_code,
                    msg = %error.msg,
                    "Chronik rejected request"
                );
            }
        }
        check_status(SERVICE, status)?;
        decode(&body)
    }
}

#[async_trait]
impl ChronikClient for HttpChronik {
    async fn blockchain_info(&self) -> Result<BlockchainInfo, UpstreamError> {
        let info: proto::BlockchainInfo = self.fetch(self.request(&["blockchain-info"])?).await?;
        Ok(info.into())
    }

    async fn block(&self, hash_or_height: &str) -> Result<Block, UpstreamError> {
        let block: proto::Block = self.fetch(self.request(&["block", hash_or_height])?).await?;
        block.try_into()
    }

    async fn blocks(
        &self,
        start_height: i32,
        end_height: i32,
    ) -> Result<Vec<BlockInfo>, UpstreamError> {
        let start = start_height.to_string();
        let end = end_height.to_string();
        let blocks: proto::Blocks = self.fetch(self.request(&["blocks", &start, &end])?).await?;
        blocks.into_infos()
    }

    async fn tx(&self, txid: &str) -> Result<Tx, UpstreamError> {
        let tx: proto::Tx = self.fetch(self.request(&["tx", txid])?).await?;
        tx.try_into()
    }

    async fn script_history(
        &self,
        script_type: &str,
        payload_hex: &str,
        page: u32,
        page_size: u32,
    ) -> Result<TxHistoryPage, UpstreamError> {
        let request = self
            .request(&["script", script_type, payload_hex, "history"])?
            .query(&[("page", page), ("page_size", page_size)]);
        let history: proto::TxHistoryPage = self.fetch(request).await?;
        history.try_into()
    }

    async fn script_utxos(
        &self,
        script_type: &str,
        payload_hex: &str,
    ) -> Result<Vec<Utxo>, UpstreamError> {
        let utxos: proto::Utxos = self
            .fetch(self.request(&["script", script_type, payload_hex, "utxos"])?)
            .await?;
        utxos.flatten()
    }
}
