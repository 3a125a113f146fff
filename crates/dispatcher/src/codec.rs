//! Batch wire codec for control messages

use bytes::Bytes;
use contracts::{Batch, ContractError, WireFormat};

/// Encode a batch as a control message payload
pub fn encode_batch(batch: &Batch, format: WireFormat) -> Result<Bytes, ContractError> {
    let data = match format {
        WireFormat::Json => {
            serde_json::to_vec(batch).map_err(|e| ContractError::codec(format!("json error: {e}")))?
        }
        WireFormat::Bincode => bincode::serialize(batch)
            .map_err(|e| ContractError::codec(format!("bincode error: {e}")))?,
    };
    Ok(Bytes::from(data))
}

/// Decode a control message payload
pub fn decode_batch(payload: &[u8], format: WireFormat) -> Result<Batch, ContractError> {
    match format {
        WireFormat::Json => serde_json::from_slice(payload)
            .map_err(|e| ContractError::codec(format!("json error: {e}"))),
        WireFormat::Bincode => bincode::deserialize(payload)
            .map_err(|e| ContractError::codec(format!("bincode error: {e}"))),
    }
}
