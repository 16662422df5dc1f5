//! BatchEncoder: packed payloads and `multiSend(bytes)` call data

use super::{BatchExecutor, BatchItem, ITEM_HEADER_LEN};
use crate::abi::{AbiDecoder, AbiEncoder, AbiType, AbiValue, KnownSelectors};
use crate::config::{self, CoreConfig};
use crate::error::{SafeError, SafeResult};
use crate::types::Operation;
use crate::utils::u256_word;
use ethers_core::types::{Address, U256};

/// Packs and unpacks batch payloads under the configured size limits
#[derive(Debug, Clone)]
pub struct BatchEncoder {
    config: CoreConfig,
}

impl Default for BatchEncoder {
    fn default() -> Self {
        Self::new(config::global())
    }
}

impl BatchEncoder {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Pack items in input order
    pub fn encode(&self, items: &[BatchItem]) -> SafeResult<Vec<u8>> {
        if items.is_empty() {
            return Err(SafeError::EmptyBatch);
        }
        if items.len() > self.config.max_batch_items {
            return Err(SafeError::PayloadTooLarge {
                size: items.len(),
                limit: self.config.max_batch_items,
            });
        }

        let mut payload = Vec::with_capacity(items.iter().map(BatchItem::encoded_len).sum());
        for (index, item) in items.iter().enumerate() {
            if item.data.len() > self.config.max_batch_item_size {
                crate::log_warn!(
                    "multisend",
                    "batch item rejected",
                    index = index,
                    size = item.data.len()
                );
                return Err(SafeError::PayloadTooLarge {
                    size: item.data.len(),
                    limit: self.config.max_batch_item_size,
                });
            }
            payload.push(item.operation.as_u8());
            payload.extend_from_slice(item.to.as_bytes());
            payload.extend_from_slice(&u256_word(&item.value));
            payload.extend_from_slice(&u256_word(&U256::from(item.data.len())));
            payload.extend_from_slice(&item.data);
        }

        crate::log_debug!(
            "multisend",
            "batch encoded",
            items = items.len(),
            bytes = payload.len()
        );
        Ok(payload)
    }

    /// Pack items and check they can run on `executor`
    pub fn encode_for(&self, items: &[BatchItem], executor: BatchExecutor) -> SafeResult<Vec<u8>> {
        if executor == BatchExecutor::MultiSendCallOnly {
            if let Some(index) = items
                .iter()
                .position(|item| item.operation == Operation::DelegateCall)
            {
                return Err(SafeError::invalid_input(format!(
                    "batch item {} is a delegate call; MultiSendCallOnly cannot run it",
                    index
                )));
            }
        }
        self.encode(items)
    }
}

/// Pack items with the process-wide limits
pub fn encode_batch(items: &[BatchItem]) -> SafeResult<Vec<u8>> {
    BatchEncoder::default().encode(items)
}

/// Unpack a payload produced by [`BatchEncoder::encode`]
pub fn decode_batch(payload: &[u8]) -> SafeResult<Vec<BatchItem>> {
    let mut items = Vec::new();
    let mut offset = 0;

    while offset < payload.len() {
        let header = payload
            .get(offset..offset + ITEM_HEADER_LEN)
            .ok_or_else(|| SafeError::abi_decoding(format!("truncated batch item at byte {}", offset)))?;

        let operation = Operation::try_from(header[0])
            .map_err(|_| SafeError::abi_decoding(format!("invalid operation byte {}", header[0])))?;
        let to = Address::from_slice(&header[1..21]);
        let value = U256::from_big_endian(&header[21..53]);
        let length = U256::from_big_endian(&header[53..85]);

        let start = offset + ITEM_HEADER_LEN;
        let remaining = payload.len() - start;
        if length > U256::from(remaining) {
            return Err(SafeError::abi_decoding(format!(
                "batch item at byte {} declares {} data bytes, {} remain",
                offset, length, remaining
            )));
        }
        let end = start + length.as_usize();

        items.push(BatchItem {
            operation,
            to,
            value,
            data: payload[start..end].to_vec(),
        });
        offset = end;
    }

    if items.is_empty() {
        return Err(SafeError::EmptyBatch);
    }
    Ok(items)
}

/// Wrap a packed payload as `multiSend(bytes)` call data
pub fn multi_send_call_data(payload: &[u8]) -> Vec<u8> {
    AbiEncoder::encode_with_selector(KnownSelectors::MULTI_SEND, &[AbiValue::Bytes(payload.to_vec())])
}

/// Inverse of [`multi_send_call_data`] followed by [`decode_batch`]
pub fn decode_multi_send_call(call_data: &[u8]) -> SafeResult<Vec<BatchItem>> {
    let values = AbiDecoder::decode_function_call(KnownSelectors::MULTI_SEND, call_data, &[AbiType::Bytes])?;
    let payload = values
        .first()
        .and_then(AbiValue::as_bytes)
        .ok_or_else(|| SafeError::abi_decoding("multiSend payload missing"))?;
    decode_batch(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<BatchItem> {
        vec![
            BatchItem::call(Address::repeat_byte(0x11), U256::from(5u64), vec![]),
            BatchItem::delegate_call(Address::repeat_byte(0x22), vec![0xca, 0xfe]),
        ]
    }

    #[test]
    fn test_packed_layout() {
        let payload = encode_batch(&items()).unwrap();
        assert_eq!(payload.len(), ITEM_HEADER_LEN * 2 + 2);

        // first item
        assert_eq!(payload[0], 0);
        assert_eq!(&payload[1..21], Address::repeat_byte(0x11).as_bytes());
        assert_eq!(payload[52], 5);
        assert!(payload[53..85].iter().all(|b| *b == 0));

        // second item starts right after, no padding
        assert_eq!(payload[85], 1);
        assert_eq!(payload[85 + 84], 2);
        assert_eq!(&payload[85 + 85..], &[0xca, 0xfe]);
    }

    #[test]
    fn test_decode_restores_order() {
        let payload = encode_batch(&items()).unwrap();
        assert_eq!(decode_batch(&payload).unwrap(), items());
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(encode_batch(&[]).unwrap_err(), SafeError::EmptyBatch);
        assert_eq!(decode_batch(&[]).unwrap_err(), SafeError::EmptyBatch);
    }

    #[test]
    fn test_item_size_limit() {
        let encoder = BatchEncoder::new(CoreConfig {
            max_batch_item_size: 4,
            ..CoreConfig::default()
        });
        let item = BatchItem::call(Address::zero(), U256::zero(), vec![0; 5]);
        assert_eq!(
            encoder.encode(&[item]).unwrap_err(),
            SafeError::PayloadTooLarge { size: 5, limit: 4 }
        );
        let item = BatchItem::call(Address::zero(), U256::zero(), vec![0; 4]);
        assert!(encoder.encode(&[item]).is_ok());
    }

    #[test]
    fn test_item_count_limit() {
        let encoder = BatchEncoder::new(CoreConfig {
            max_batch_items: 1,
            ..CoreConfig::default()
        });
        assert!(matches!(
            encoder.encode(&items()),
            Err(SafeError::PayloadTooLarge { size: 2, limit: 1 })
        ));
    }

    #[test]
    fn test_call_only_rejects_delegate_call() {
        let encoder = BatchEncoder::default();
        assert!(matches!(
            encoder.encode_for(&items(), BatchExecutor::MultiSendCallOnly),
            Err(SafeError::InvalidInput(_))
        ));
        assert!(encoder.encode_for(&items(), BatchExecutor::MultiSend).is_ok());
        assert_eq!(BatchExecutor::for_items(&items()), BatchExecutor::MultiSend);
        assert_eq!(
            BatchExecutor::for_items(&items()[..1]),
            BatchExecutor::MultiSendCallOnly
        );
    }

    #[test]
    fn test_truncated_payload() {
        let payload = encode_batch(&items()).unwrap();
        assert!(matches!(
            decode_batch(&payload[..payload.len() - 1]),
            Err(SafeError::AbiDecoding(_))
        ));
        assert!(matches!(decode_batch(&payload[..40]), Err(SafeError::AbiDecoding(_))));
    }

    #[test]
    fn test_multi_send_call_round_trip() {
        let payload = encode_batch(&items()).unwrap();
        let call = multi_send_call_data(&payload);
        assert_eq!(&call[..4], &[0x8d, 0x80, 0xff, 0x0a]);
        assert_eq!(decode_multi_send_call(&call).unwrap(), items());
    }
}
