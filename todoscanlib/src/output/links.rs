//! Reference-style Markdown links with short, stable ids.
//!
//! Long source URLs would bloat table cells, so each cell holds
//! `[title][id]` and the `[id]: url` definitions are emitted once at the end
//! of the document. Ids are derived from the URL alone, so the same URL gets
//! the same id in every report.

use std::collections::BTreeMap;

/// Width ids are padded to.
const ID_WIDTH: usize = 7;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Collects links and their reference definitions.
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    urls_by_id: BTreeMap<String, String>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url` and return the `[title][id]` link text.
    ///
    /// The id comes from the URL, so equal titles of different files still
    /// link to their own source.
    pub fn add(&mut self, title: &str, url: &str) -> String {
        let id = link_id(url);
        self.urls_by_id.entry(id.clone()).or_insert_with(|| url.to_string());
        format!("[{}][{}]", title, id)
    }

    pub fn is_empty(&self) -> bool {
        self.urls_by_id.is_empty()
    }

    /// `[id]: url` lines, ids in descending order.
    pub fn references(&self) -> Vec<String> {
        self.urls_by_id
            .iter()
            .rev()
            .map(|(id, url)| format!("[{}]: {}", id, url))
            .collect()
    }
}

/// Stable id for a URL: [`deterministic_hash`] rendered by [`to_base36`].
pub fn link_id(url: &str) -> String {
    to_base36(deterministic_hash(url))
}

/// Two interleaved djb2 hashes over the UTF-16 code units of `s`, combined
/// into one 32 bit value. Independent of process and platform.
pub fn deterministic_hash(s: &str) -> u32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut hash1: u32 = (5381 << 16) + 5381;
    let mut hash2 = hash1;

    for pair in units.chunks(2) {
        hash1 = (hash1 << 5).wrapping_add(hash1) ^ u32::from(pair[0]);
        if let Some(&second) = pair.get(1) {
            hash2 = (hash2 << 5).wrapping_add(hash2) ^ u32::from(second);
        }
    }

    hash1.wrapping_add(hash2.wrapping_mul(1_566_083_941))
}

/// Base-36 digits, least significant first, left-padded with `0` to seven
/// characters.
pub fn to_base36(mut value: u32) -> String {
    let mut digits = String::new();
    while value > 0 {
        digits.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    format!("{:0>width$}", digits, width = ID_WIDTH)
}
