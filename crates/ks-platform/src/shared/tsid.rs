//! TSID Generator
//!
//! Time-Sorted IDs as 13-character Crockford Base32 strings. Stores return
//! documents in `_id` order, so ids issued by one process are strictly
//! increasing: that order is the creation order.

use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U)
const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const TIMESTAMP_MASK: u64 = 0x3FF_FFFF_FFFF;

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

pub struct TsidGenerator;

impl TsidGenerator {
    /// 42 bits of milliseconds since the epoch, then 22 bits starting at a
    /// random offset. Within one millisecond (or if the clock steps back)
    /// the previous id plus one is issued instead.
    pub fn generate() -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let random: u64 = rand::thread_rng().gen_range(0..0x20_0000);
        let candidate = ((now & TIMESTAMP_MASK) << 22) | random;

        let previous = LAST_ISSUED
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last.wrapping_add(1)))
            })
            .unwrap_or_else(|last| last);

        encode_crockford(candidate.max(previous.wrapping_add(1)))
    }
}

fn encode_crockford(mut value: u64) -> String {
    let mut result = [b'0'; 13];

    for slot in result.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }

    result.iter().map(|&b| b as char).collect()
}
