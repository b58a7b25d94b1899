//! Identifier generation for trips, city stops and activities.
//!
//! Ids only need to be unique within their owning sequence (a trip's city
//! list, a city's activity list) plus the session's trip collection, so a
//! short random token is enough. The generator sits behind a trait so tests
//! can swap in a deterministic one and assert on produced ids.

use uuid::Uuid;

/// Length of a generated token. 9 base-36 chars carry ~46 bits of entropy,
/// far beyond session-scale collision risk.
const TOKEN_LEN: usize = 9;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub trait IdGenerator {
    /// Returns a fresh identifier.
    fn next_id(&mut self) -> String;
}

/// Default generator: base-36 tokens drawn from UUID v4 entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenIds;

impl IdGenerator for TokenIds {
    fn next_id(&mut self) -> String {
        let mut bits = Uuid::new_v4().as_u128();
        let mut token = String::with_capacity(TOKEN_LEN);
        for _ in 0..TOKEN_LEN {
            token.push(ALPHABET[(bits % 36) as usize] as char);
            bits /= 36;
        }
        token
    }
}

/// Deterministic generator for tests: `id-1`, `id-2`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("id-{}", self.next)
    }
}
