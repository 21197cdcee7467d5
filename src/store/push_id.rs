//! Insertion-ordered child keys.
//!
//! A push id is 20 characters drawn from an alphabet whose characters are in
//! ASCII order: 8 characters encode the creation time in milliseconds, the
//! remaining 12 are random. Ids minted within the same millisecond reuse the
//! previous random part incremented by one, so a generator never produces a
//! key that sorts before one it already handed out.

use chrono::Utc;
use uuid::Uuid;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIME_LEN: usize = 8;
const RANDOM_LEN: usize = 12;
// v4 UUID bytes whose high bits are fixed by the version and variant fields
const UUID_VERSION_BYTE: usize = 6;
const UUID_VARIANT_BYTE: usize = 8;

#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_time: i64,
    last_random: [u8; RANDOM_LEN],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a key for the current wall-clock time
    pub fn next_id(&mut self) -> String {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    /// Mints a key for an explicit millisecond timestamp
    pub fn next_id_at(&mut self, now_millis: i64) -> String {
        let now = now_millis.max(0);

        if now == self.last_time {
            increment(&mut self.last_random);
        } else {
            self.last_random = random_digits();
        }
        self.last_time = now;

        let mut time_chars = [0u8; TIME_LEN];
        let mut remaining = now;
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }

        let mut id = String::with_capacity(TIME_LEN + RANDOM_LEN);
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(
            self.last_random
                .iter()
                .map(|&digit| PUSH_CHARS[digit as usize] as char),
        );
        id
    }
}

/// Twelve uniform base-64 digits taken from the fully random bytes of a v4 UUID
fn random_digits() -> [u8; RANDOM_LEN] {
    let bytes = Uuid::new_v4().into_bytes();
    let mut digits = [0u8; RANDOM_LEN];
    let random_bytes = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != UUID_VERSION_BYTE && *index != UUID_VARIANT_BYTE)
        .map(|(_, byte)| byte % 64);
    for (slot, digit) in digits.iter_mut().zip(random_bytes) {
        *slot = digit;
    }
    digits
}

/// Adds one to a base-64 number stored most-significant digit first
fn increment(digits: &mut [u8; RANDOM_LEN]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}
