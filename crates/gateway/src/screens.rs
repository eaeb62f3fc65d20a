//! Screen allocation
//!
//! Hands out a fresh screen number per request, rotating through the block
//! that starts at the request's base screen. The control echoes the screen on
//! every notification, so a reply for an abandoned request never matches the
//! screen of a newer request under the same name until the block wraps.

use dashmap::DashMap;
use kiwi_ports::codes::Screens;
use log::warn;

pub struct ScreenPool {
    block_size: u16,
    cursors: DashMap<String, u16>,
}

impl ScreenPool {
    pub fn new(block_size: u16) -> Self {
        Self {
            block_size: block_size.max(1),
            cursors: DashMap::new(),
        }
    }

    /// Next screen in the block starting at `base`
    pub fn next(&self, base: &str) -> String {
        let Ok(start) = base.parse::<u16>() else {
            warn!("Screen base {:?} is not numeric, issuing it as is", base);
            return base.to_string();
        };

        let mut cursor = self.cursors.entry(base.to_string()).or_insert(0);
        let offset = *cursor;
        *cursor = (offset + 1) % self.block_size;
        drop(cursor);

        format!("{:04}", start.saturating_add(offset) % 10_000)
    }
}

impl Default for ScreenPool {
    fn default() -> Self {
        Self::new(Screens::BLOCK_SIZE)
    }
}
