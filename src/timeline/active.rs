// Active note tracking
// Fixed-size presence table for the pitches sounding at one instant

/// The set of (channel, pitch) pairs currently sounding
///
/// A fixed 16x128 table indexed directly by channel and pitch, so the
/// sweep loop updates it without hashing. Duplicate On marks are
/// idempotent; an Off for an inactive pitch is a no-op.
#[derive(Debug, Clone)]
pub struct ActiveNoteSet {
    table: [[bool; 128]; 16],
    count: usize,
}

impl ActiveNoteSet {
    /// Create an empty set
    pub fn new() -> Self {
        ActiveNoteSet {
            table: [[false; 128]; 16],
            count: 0,
        }
    }

    /// Mark a (channel, pitch) pair as sounding
    pub fn note_on(&mut self, channel: u8, pitch: u8) {
        if let Some(slot) = slot_mut(&mut self.table, channel, pitch) {
            if !*slot {
                *slot = true;
                self.count += 1;
            }
        }
    }

    /// Mark a (channel, pitch) pair as no longer sounding
    pub fn note_off(&mut self, channel: u8, pitch: u8) {
        if let Some(slot) = slot_mut(&mut self.table, channel, pitch) {
            if *slot {
                *slot = false;
                self.count -= 1;
            }
        }
    }

    /// Whether a (channel, pitch) pair is currently sounding
    pub fn contains(&self, channel: u8, pitch: u8) -> bool {
        self.table
            .get(channel as usize)
            .and_then(|row| row.get(pitch as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Number of active (channel, pitch) pairs
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when nothing is sounding
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Distinct sounding pitches unioned across channels, ascending
    pub fn sounding_pitches(&self) -> Vec<u8> {
        let mut pitches = Vec::new();
        for pitch in 0..128 {
            if self.table.iter().any(|row| row[pitch]) {
                pitches.push(pitch as u8);
            }
        }
        pitches
    }

    /// All active (channel, pitch) pairs, channel-major ascending
    pub fn active_pairs(&self) -> Vec<(u8, u8)> {
        let mut pairs = Vec::with_capacity(self.count);
        for (channel, row) in self.table.iter().enumerate() {
            for (pitch, active) in row.iter().enumerate() {
                if *active {
                    pairs.push((channel as u8, pitch as u8));
                }
            }
        }
        pairs
    }
}

impl Default for ActiveNoteSet {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_mut(table: &mut [[bool; 128]; 16], channel: u8, pitch: u8) -> Option<&mut bool> {
    table.get_mut(channel as usize)?.get_mut(pitch as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_on_is_idempotent() {
        let mut set = ActiveNoteSet::new();
        set.note_on(0, 60);
        set.note_on(0, 60);

        assert_eq!(set.len(), 1);
        assert_eq!(set.sounding_pitches(), vec![60]);
    }

    #[test]
    fn test_orphan_off_is_noop() {
        let mut set = ActiveNoteSet::new();
        set.note_off(0, 60);

        assert!(set.is_empty());

        set.note_on(0, 62);
        set.note_off(0, 60);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_pitches_union_across_channels() {
        let mut set = ActiveNoteSet::new();
        set.note_on(0, 60);
        set.note_on(3, 60);
        set.note_on(1, 48);

        // Same pitch on two channels is one sounding pitch
        assert_eq!(set.sounding_pitches(), vec![48, 60]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_active_pairs_ordering() {
        let mut set = ActiveNoteSet::new();
        set.note_on(2, 40);
        set.note_on(0, 72);
        set.note_on(2, 36);

        assert_eq!(set.active_pairs(), vec![(0, 72), (2, 36), (2, 40)]);
    }

    #[test]
    fn test_off_then_on_again() {
        let mut set = ActiveNoteSet::new();
        set.note_on(0, 60);
        set.note_off(0, 60);
        assert!(set.is_empty());

        set.note_on(0, 60);
        assert!(set.contains(0, 60));
    }
}
