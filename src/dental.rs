//! FDI dental chart model.
//!
//! Tooth codes follow the two-digit FDI scheme: the first digit is the
//! quadrant (1-4 permanent, 5-8 deciduous), the second the position counted
//! from the midline. Permanent quadrants run positions 1-8, deciduous
//! quadrants 1-5. The chart UI uses this module to classify teeth and to
//! validate selections before a treatment record is saved.

use std::collections::BTreeSet;

/// Permanent arch rows in chart layout order, mirroring how the chart draws
/// each quadrant (upper rows run distal→mesial on the right side).
pub const UPPER_RIGHT: [u8; 8] = [18, 17, 16, 15, 14, 13, 12, 11];
pub const UPPER_LEFT: [u8; 8] = [21, 22, 23, 24, 25, 26, 27, 28];
pub const LOWER_LEFT: [u8; 8] = [31, 32, 33, 34, 35, 36, 37, 38];
pub const LOWER_RIGHT: [u8; 8] = [41, 42, 43, 44, 45, 46, 47, 48];

/// A validated FDI tooth code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToothCode(u8);

/// Tooth class, labelled as the chart displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToothKind {
    Incisivo,
    Canino,
    Premolar,
    Molar,
}

impl ToothKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incisivo => "Incisivo",
            Self::Canino => "Canino",
            Self::Premolar => "Premolar",
            Self::Molar => "Molar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dentition {
    Permanent,
    Deciduous,
}

impl ToothCode {
    /// Validate a raw code. `None` for anything outside
    /// {11-18, 21-28, 31-38, 41-48} ∪ {51-55, 61-65, 71-75, 81-85}.
    pub fn new(code: u8) -> Option<Self> {
        let quadrant = code / 10;
        let position = code % 10;
        let valid = match quadrant {
            1..=4 => (1..=8).contains(&position),
            5..=8 => (1..=5).contains(&position),
            _ => false,
        };
        valid.then_some(Self(code))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn quadrant(&self) -> u8 {
        self.0 / 10
    }

    /// Position within the quadrant, counted from the midline.
    pub fn position(&self) -> u8 {
        self.0 % 10
    }

    pub fn dentition(&self) -> Dentition {
        if self.quadrant() <= 4 {
            Dentition::Permanent
        } else {
            Dentition::Deciduous
        }
    }

    /// Classify by position: 1-2 incisor, 3 canine, 4-5 premolar, 6-8 molar.
    pub fn kind(&self) -> ToothKind {
        match self.position() {
            1 | 2 => ToothKind::Incisivo,
            3 => ToothKind::Canino,
            4 | 5 => ToothKind::Premolar,
            _ => ToothKind::Molar,
        }
    }
}

/// Validate a list of raw FDI codes; returns the first invalid one.
pub fn validate_teeth(codes: &[u8]) -> Result<(), u8> {
    match codes.iter().find(|&&c| ToothCode::new(c).is_none()) {
        Some(&bad) => Err(bad),
        None => Ok(()),
    }
}

/// Selection state for the dental chart: a set of codes toggled in and out.
/// Duplicates are impossible and iteration is in ascending code order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToothSelection {
    selected: BTreeSet<ToothCode>,
}

impl ToothSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a tooth in or out. Returns `true` when the tooth is selected
    /// after the call.
    pub fn toggle(&mut self, tooth: ToothCode) -> bool {
        if self.selected.remove(&tooth) {
            false
        } else {
            self.selected.insert(tooth);
            true
        }
    }

    pub fn contains(&self, tooth: ToothCode) -> bool {
        self.selected.contains(&tooth)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Raw codes in ascending order, ready to embed in a treatment record.
    pub fn codes(&self) -> Vec<u8> {
        self.selected.iter().map(|t| t.get()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(code: u8) -> ToothCode {
        ToothCode::new(code).unwrap()
    }

    #[test]
    fn permanent_codes_valid() {
        for row in [UPPER_RIGHT, UPPER_LEFT, LOWER_LEFT, LOWER_RIGHT] {
            for code in row {
                let t = ToothCode::new(code).unwrap();
                assert_eq!(t.dentition(), Dentition::Permanent);
            }
        }
    }

    #[test]
    fn deciduous_codes_valid() {
        for quadrant in 5..=8u8 {
            for position in 1..=5u8 {
                let t = ToothCode::new(quadrant * 10 + position).unwrap();
                assert_eq!(t.dentition(), Dentition::Deciduous);
            }
        }
    }

    #[test]
    fn invalid_codes_rejected() {
        for code in [0, 9, 10, 19, 29, 48 + 1, 50, 56, 59, 86, 90, 99, 255] {
            assert!(ToothCode::new(code).is_none(), "{code} should be invalid");
        }
    }

    #[test]
    fn classification_by_position() {
        assert_eq!(tooth(16).kind(), ToothKind::Molar);
        assert_eq!(tooth(21).kind(), ToothKind::Incisivo);
        assert_eq!(tooth(33).kind(), ToothKind::Canino);
        assert_eq!(tooth(44).kind(), ToothKind::Premolar);
        assert_eq!(tooth(45).kind(), ToothKind::Premolar);
        assert_eq!(tooth(12).kind(), ToothKind::Incisivo);
        assert_eq!(tooth(38).kind(), ToothKind::Molar);
    }

    #[test]
    fn deciduous_canine_classifies() {
        let t = tooth(53);
        assert_eq!(t.kind(), ToothKind::Canino);
        assert_eq!(t.dentition(), Dentition::Deciduous);
        assert_eq!(t.kind().as_str(), "Canino");
    }

    #[test]
    fn quadrant_and_position() {
        let t = tooth(47);
        assert_eq!(t.quadrant(), 4);
        assert_eq!(t.position(), 7);
        assert_eq!(t.get(), 47);
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let mut sel = ToothSelection::new();
        sel.toggle(tooth(11));
        sel.toggle(tooth(26));
        let before = sel.clone();

        assert!(sel.toggle(tooth(35)));
        assert!(!sel.toggle(tooth(35)));
        assert_eq!(sel, before);
    }

    #[test]
    fn toggle_has_no_duplicates() {
        let mut sel = ToothSelection::new();
        assert!(sel.toggle(tooth(16)));
        assert!(!sel.toggle(tooth(16)));
        assert!(sel.toggle(tooth(16)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn codes_sorted_ascending() {
        let mut sel = ToothSelection::new();
        sel.toggle(tooth(48));
        sel.toggle(tooth(11));
        sel.toggle(tooth(26));
        assert_eq!(sel.codes(), vec![11, 26, 48]);
    }

    #[test]
    fn clear_empties_selection() {
        let mut sel = ToothSelection::new();
        sel.toggle(tooth(11));
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn validate_teeth_finds_first_invalid() {
        assert_eq!(validate_teeth(&[11, 26, 48, 55]), Ok(()));
        assert_eq!(validate_teeth(&[11, 56, 48]), Err(56));
        assert_eq!(validate_teeth(&[]), Ok(()));
    }
}
