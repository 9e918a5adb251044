//! Tooltip placeholders.
//!
//! Graphviz HTML labels can only carry a tooltip on a whole cell, so a
//! tooltip-bearing cell is emitted with an opaque key as its content and the
//! serializer swaps the key for a tooltip wrapper around the original text.
//! Placeholder cells also carry the key as their `ID`, and only cells
//! marked that way are substituted, so plain cell text that happens to
//! spell a key is left alone.

use crate::error::BuildError;

/// Keys are spelled with letters outside the hex range so they never look
/// like colors, numbers or markup.
const KEY_ALPHABET: &[u8; 16] = b"ghijklmnopqrstuv";

/// Length of keys that don't need to match a visual width.
pub const SHORT_KEY_LEN: usize = 16;

/// Fresh ids drawn for a taken key before stepping to neighbouring ids.
const MAX_DRAWS: usize = 32;

/// Source of 128-bit ids for tooltip keys.
pub trait KeySource {
    fn next_id(&mut self) -> u128;
}

/// Random v4 UUIDs. Output differs between runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeys;

impl KeySource for RandomKeys {
    fn next_id(&mut self) -> u128 {
        uuid::Uuid::new_v4().as_u128()
    }
}

/// Deterministic ids from a seed, for reproducible output.
#[derive(Debug, Clone)]
pub struct SeededKeys {
    state: u64,
}

impl SeededKeys {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    // splitmix64
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl KeySource for SeededKeys {
    fn next_id(&mut self) -> u128 {
        let hi = self.next_u64();
        let lo = self.next_u64();
        uuid::Uuid::from_u64_pair(hi, lo).as_u128()
    }
}

/// Attribute marking a cell whose content is the placeholder `key`.
pub fn marker(key: &str) -> String {
    format!(r#" ID="{}""#, key)
}

/// How a marked placeholder cell ends in the serialized label. Escaped
/// label text can't contain a `"`, so only marked cells match.
pub fn placeholder(key: &str) -> String {
    format!("{}>{}</TD>", marker(key), key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipEntry {
    pub key: String,
    /// Markup the key stands in for
    pub text: String,
    pub tooltip: String,
}

pub struct TooltipRegistry<'k> {
    keys: &'k mut dyn KeySource,
    entries: Vec<TooltipEntry>,
}

impl<'k> TooltipRegistry<'k> {
    pub fn new(keys: &'k mut dyn KeySource) -> Self {
        Self {
            keys,
            entries: Vec::new(),
        }
    }

    /// Register `text` under a short key.
    pub fn register(&mut self, text: &str, tooltip: &str) -> Result<String, BuildError> {
        self.register_fixed(text, tooltip, SHORT_KEY_LEN)
    }

    /// Register `text` under a key exactly `width` characters long, so the
    /// placeholder occupies the same room as the text it replaces.
    ///
    /// Narrow widths have few possible keys, so a taken key is redrawn, and
    /// after `MAX_DRAWS` repeats the neighbouring ids are tried in turn.
    /// Fails only once every key of that width is in use.
    pub fn register_fixed(
        &mut self,
        text: &str,
        tooltip: &str,
        width: usize,
    ) -> Result<String, BuildError> {
        let width = width.max(1);
        let taken = self.entries.iter().filter(|e| e.key.len() == width).count();
        let space = 16u128.checked_pow(width as u32);
        if space.is_some_and(|space| taken as u128 >= space) {
            return Err(BuildError::KeyCollision(width));
        }

        let mut id = self.keys.next_id();
        let mut draws = 1;
        let mut key = encode_key(id, width);
        while self.is_taken(&key) {
            if draws < MAX_DRAWS {
                id = self.keys.next_id();
                draws += 1;
            } else {
                // consecutive ids spell consecutive keys, so this ends
                id = id.wrapping_add(1);
            }
            key = encode_key(id, width);
        }

        self.entries.push(TooltipEntry {
            key: key.clone(),
            text: text.to_string(),
            tooltip: tooltip.to_string(),
        });
        Ok(key)
    }

    fn is_taken(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn entries(&self) -> &[TooltipEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TooltipEntry> {
        self.entries
    }
}

/// Spell `id` one nibble per character, cycling through its 32 nibbles
/// when `len` is longer.
fn encode_key(id: u128, len: usize) -> String {
    (0..len)
        .map(|i| {
            let nibble = (id >> (4 * (i % 32))) & 0xF;
            KEY_ALPHABET[nibble as usize] as char
        })
        .collect()
}
