use std::fmt;

use crate::error::LevelError;

/// Number of units every tube in a session can hold.
pub const TUBE_CAPACITY: usize = 4;

/// An opaque color token. Level data spells colors as letters.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FluidColor(usize);

impl FluidColor {
    pub fn new(color_id: usize) -> Self {
        FluidColor(color_id)
    }

    pub fn get_color_id(&self) -> usize {
        self.0
    }

    /// Parses a letter label like "A", "Z" or "AA".
    pub fn new_from_repr(repr: &str) -> Option<Self> {
        let s = repr.trim();
        if s.is_empty() {
            return None;
        }
        Self::letters_to_color_id(s).map(FluidColor)
    }

    /// Convert a single letter (A-Z) into a 0-based id.
    pub fn letter_to_color_id(ch: char) -> Option<usize> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let up = ch.to_ascii_uppercase();
        Some((up as u8 - b'A') as usize)
    }

    /// Excel-style base-26 numbering: A=0, B=1, ..., Z=25, AA=26, AB=27, ...
    fn letters_to_color_id(s: &str) -> Option<usize> {
        let mut acc: usize = 0;
        for ch in s.chars() {
            let digit = Self::letter_to_color_id(ch)?;
            acc = acc.checked_mul(26)?.checked_add(digit + 1)?;
        }
        acc.checked_sub(1)
    }

    pub fn get_letter_representation(&self) -> String {
        let mut chars = Vec::new();
        let mut id = self.0 + 1;
        while id > 0 {
            let rem = (id - 1) % 26;
            chars.push((b'A' + rem as u8) as char);
            id = (id - 1) / 26;
        }
        chars.iter().rev().collect()
    }
}

impl fmt::Display for FluidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_letter_representation())
    }
}

/// A capacity-bounded stack of colors, index 0 at the bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tube {
    packets: Vec<FluidColor>,
    capacity: usize,
}

impl Tube {
    pub fn from_colors(packets: Vec<FluidColor>, capacity: usize) -> Result<Self, LevelError> {
        if packets.len() > capacity {
            return Err(LevelError::TubeOverCapacity {
                len: packets.len(),
                capacity,
            });
        }
        Ok(Self { packets, capacity })
    }

    /// Parses a bottom-to-top letter string such as `"ABAB"`. `.` marks free
    /// space and is skipped. Multi-letter colors need commas: `"A,AB,."`.
    pub fn new_from_repr(repr: &str, capacity: usize) -> Result<Self, LevelError> {
        let tokens: Vec<String> = if repr.contains(',') {
            repr.split(',').map(|t| t.trim().to_string()).collect()
        } else {
            repr.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_string())
                .collect()
        };
        let mut packets = Vec::new();
        for token in tokens {
            if token.is_empty() || token == "." {
                continue;
            }
            let color = FluidColor::new_from_repr(&token)
                .ok_or_else(|| LevelError::BadColor(token.clone()))?;
            packets.push(color);
        }
        Self::from_colors(packets, capacity)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.packets.len() >= self.capacity
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity.saturating_sub(self.packets.len())
    }

    pub fn get_packets(&self) -> &[FluidColor] {
        &self.packets
    }

    pub fn get_top_fluid(&self) -> Option<FluidColor> {
        self.packets.last().copied()
    }

    /// Top color and the length of the contiguous run of it at the open end.
    pub fn top_run(&self) -> Option<(FluidColor, usize)> {
        let top = self.get_top_fluid()?;
        let depth = self
            .packets
            .iter()
            .rev()
            .take_while(|&&p| p == top)
            .count();
        Some((top, depth))
    }

    pub fn get_top_fluid_depth(&self) -> usize {
        self.top_run().map_or(0, |(_, depth)| depth)
    }

    pub fn is_complete(&self) -> bool {
        match self.packets.first() {
            Some(first) => {
                self.packets.len() == self.capacity && self.packets.iter().all(|p| p == first)
            }
            None => false,
        }
    }

    /// Pour legality. The source run does not have to fit entirely.
    pub fn could_pour_into(&self, other: &Tube) -> bool {
        let Some(color) = self.get_top_fluid() else {
            return false;
        };
        if other.is_full() {
            return false;
        }
        match other.get_top_fluid() {
            None => true,
            Some(dst_top) => dst_top == color,
        }
    }

    pub fn get_pourable_amount(&self, other: &Tube) -> usize {
        if !self.could_pour_into(other) {
            return 0;
        }
        self.get_top_fluid_depth().min(other.get_empty_space())
    }

    /// Moves the top run (bounded by free space) onto `other`, one unit at a
    /// time, and returns how many units moved.
    pub fn pour_into(&mut self, other: &mut Tube) -> usize {
        let transfer_amount = self.get_pourable_amount(other);
        for _ in 0..transfer_amount {
            if let Some(packet) = self.packets.pop() {
                other.packets.push(packet);
            }
        }
        transfer_amount
    }

    /// Letters bottom to top, padded with `.` up to capacity.
    pub fn get_text_representation(&self) -> String {
        let mut repr: Vec<String> = self
            .packets
            .iter()
            .map(FluidColor::get_letter_representation)
            .collect();
        repr.resize(self.capacity.max(repr.len()), ".".to_string());
        let has_multi_char = repr.iter().any(|s| s.len() > 1);
        let separator = if has_multi_char { "," } else { "" };
        repr.join(separator)
    }
}

/// A pour from one tube index to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveAction {
    pub from: usize,
    pub to: usize,
}

impl MoveAction {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// One line per tube, used for the clipboard copy.
pub fn board_text_representation(tubes: &[Tube]) -> String {
    tubes
        .iter()
        .map(Tube::get_text_representation)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube(repr: &str) -> Tube {
        Tube::new_from_repr(repr, TUBE_CAPACITY).unwrap()
    }

    #[test]
    fn test_letter_round_trip_past_z() {
        assert_eq!(FluidColor::new_from_repr("A"), Some(FluidColor::new(0)));
        assert_eq!(FluidColor::new_from_repr("Z"), Some(FluidColor::new(25)));
        assert_eq!(FluidColor::new_from_repr("AA"), Some(FluidColor::new(26)));
        assert_eq!(FluidColor::new(27).get_letter_representation(), "AB");
        assert_eq!(FluidColor::new_from_repr("3"), None);
    }

    #[test]
    fn test_parse_skips_free_space() {
        let t = tube("AB..");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get_top_fluid(), Some(FluidColor::new(1)));
        assert_eq!(t.get_text_representation(), "AB..");
    }

    #[test]
    fn test_parse_rejects_overfull_and_bad_tokens() {
        assert!(matches!(
            Tube::new_from_repr("AAAAA", TUBE_CAPACITY),
            Err(LevelError::TubeOverCapacity { len: 5, capacity: 4 })
        ));
        assert!(matches!(
            Tube::new_from_repr("A,1", TUBE_CAPACITY),
            Err(LevelError::BadColor(_))
        ));
    }

    #[test]
    fn test_top_run() {
        assert_eq!(tube("").top_run(), None);
        assert_eq!(tube("ABB").top_run(), Some((FluidColor::new(1), 2)));
        assert_eq!(tube("AAAA").top_run(), Some((FluidColor::new(0), 4)));
        assert_eq!(tube("").get_top_fluid_depth(), 0);
    }

    #[test]
    fn test_partial_pour_is_bounded_by_space() {
        let mut src = tube("ABBB");
        let mut dst = tube("CCB");
        assert_eq!(src.pour_into(&mut dst), 1);
        assert_eq!(src.get_text_representation(), "ABB.");
        assert_eq!(dst.get_text_representation(), "CCBB");
    }

    #[test]
    fn test_complete() {
        assert!(tube("AAAA").is_complete());
        assert!(!tube("AAA").is_complete());
        assert!(!tube("AABA").is_complete());
        assert!(!tube("").is_complete());
    }
}
