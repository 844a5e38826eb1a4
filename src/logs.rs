//! Log Decoder
//!
//! Topic filter construction for eth_getLogs and decoding of ERC20-style
//! `Transfer(from, to, value)` events into `LogRecord`s.

use crate::contracts::transfer_topic;
use crate::types::{LogRecord, RawLog};
use alloy::primitives::{Address, B256, U256};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-position topic constraints. An empty position matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFilter {
    pub topic0: Vec<B256>,
    pub topic1: Vec<B256>,
    pub topic2: Vec<B256>,
}

impl TopicFilter {
    /// Match any of the given event signatures
    pub fn events(signatures: Vec<B256>) -> Self {
        Self {
            topic0: signatures,
            ..Default::default()
        }
    }

    pub fn event(signature: B256) -> Self {
        Self::events(vec![signature])
    }

    /// Constrain the first indexed argument to one of `addresses` (sorted, deduped)
    pub fn topic1_any<I: IntoIterator<Item = Address>>(mut self, addresses: I) -> Self {
        self.topic1 = address_topics(addresses);
        self
    }

    /// Constrain the second indexed argument to one of `addresses` (sorted, deduped)
    pub fn topic2_any<I: IntoIterator<Item = Address>>(mut self, addresses: I) -> Self {
        self.topic2 = address_topics(addresses);
        self
    }

    /// Whether `log` satisfies every constrained position
    pub fn matches(&self, log: &RawLog) -> bool {
        let position = |allowed: &Vec<B256>, index: usize| {
            allowed.is_empty()
                || log
                    .topics
                    .get(index)
                    .map(|t| allowed.contains(t))
                    .unwrap_or(false)
        };
        position(&self.topic0, 0) && position(&self.topic1, 1) && position(&self.topic2, 2)
    }
}

fn address_topics<I: IntoIterator<Item = Address>>(addresses: I) -> Vec<B256> {
    addresses
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|a| a.into_word())
        .collect()
}

/// Transfers from any of `senders` to any of `receivers`
pub fn transfer_filter<S, R>(senders: S, receivers: R) -> TopicFilter
where
    S: IntoIterator<Item = Address>,
    R: IntoIterator<Item = Address>,
{
    TopicFilter::event(transfer_topic())
        .topic1_any(senders)
        .topic2_any(receivers)
}

/// Address stored in the low 20 bytes of a 32-byte word
pub fn word_to_address(word: &[u8]) -> Address {
    Address::from_slice(&word[12..32])
}

/// Decode one Transfer log. Supports both indexed and fully non-indexed layouts.
pub fn decode_transfer(log: &RawLog) -> Result<LogRecord> {
    let data = log.data.as_ref();

    let (sender, receiver, amount) = match log.topics.len() {
        3 if data.len() >= 32 => (
            Address::from_word(log.topics[1]),
            Address::from_word(log.topics[2]),
            U256::from_be_slice(&data[..32]),
        ),
        1 if data.len() >= 96 => (
            word_to_address(&data[..32]),
            word_to_address(&data[32..64]),
            U256::from_be_slice(&data[64..96]),
        ),
        n => bail!(
            "Malformed Transfer event in tx {} ({} topics, {} data bytes)",
            log.transaction_hash,
            n,
            data.len()
        ),
    };

    Ok(LogRecord {
        address: log.address,
        block_number: log.block_number,
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        sender,
        receiver,
        amount,
    })
}

/// Decode Transfer logs, preserving order. Logs of other events are ignored.
pub fn decode_transfers(raw: &[RawLog]) -> Result<Vec<LogRecord>> {
    let topic = transfer_topic();
    raw.iter()
        .filter(|log| log.topics.first() == Some(&topic))
        .map(decode_transfer)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};

    const FROM: Address = address!("00000000000000000000000000000000000000b1");
    const TO: Address = address!("00000000000000000000000000000000000000c1");
    const TOKEN: Address = address!("00000000000000000000000000000000000000a1");

    fn transfer_log(amount: u64) -> RawLog {
        RawLog {
            address: TOKEN,
            topics: vec![transfer_topic(), FROM.into_word(), TO.into_word()],
            data: Bytes::from(U256::from(amount).to_be_bytes::<32>().to_vec()),
            block_number: 100,
            transaction_hash: B256::repeat_byte(0xaa),
            log_index: 4,
        }
    }

    #[test]
    fn test_decode_indexed_transfer() {
        let record = decode_transfer(&transfer_log(1234)).unwrap();
        assert_eq!(record.sender, FROM);
        assert_eq!(record.receiver, TO);
        assert_eq!(record.amount, U256::from(1234));
        assert_eq!(record.address, TOKEN);
        assert_eq!(record.log_index, 4);
    }

    #[test]
    fn test_decode_unindexed_transfer() {
        let mut data = Vec::new();
        data.extend_from_slice(FROM.into_word().as_slice());
        data.extend_from_slice(TO.into_word().as_slice());
        data.extend_from_slice(&U256::from(7).to_be_bytes::<32>());
        let log = RawLog {
            topics: vec![transfer_topic()],
            data: Bytes::from(data),
            ..transfer_log(0)
        };

        let record = decode_transfer(&log).unwrap();
        assert_eq!((record.sender, record.receiver), (FROM, TO));
        assert_eq!(record.amount, U256::from(7));
    }

    #[test]
    fn test_malformed_transfer_is_error() {
        let log = RawLog {
            data: Bytes::new(),
            ..transfer_log(0)
        };
        assert!(decode_transfer(&log).is_err());
    }

    #[test]
    fn test_decode_transfers_ignores_other_events() {
        let other = RawLog {
            topics: vec![B256::repeat_byte(1)],
            ..transfer_log(5)
        };
        let decoded = decode_transfers(&[other, transfer_log(5)]).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_filter_sorts_and_matches() {
        let filter = transfer_filter([TO, FROM, FROM], [TO]);
        assert_eq!(filter.topic1, vec![FROM.into_word(), TO.into_word()]);
        assert!(filter.matches(&transfer_log(1)));

        let wrong_receiver = transfer_filter([FROM], [FROM]);
        assert!(!wrong_receiver.matches(&transfer_log(1)));
    }

    #[test]
    fn test_empty_positions_match_anything() {
        let filter = TopicFilter::event(transfer_topic());
        assert!(filter.matches(&transfer_log(1)));
        assert!(TopicFilter::default().matches(&transfer_log(1)));
    }
}
