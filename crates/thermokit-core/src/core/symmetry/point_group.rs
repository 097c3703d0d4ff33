use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Molecular point groups recognized by the detector.
///
/// `S2n` stores the full improper-rotation order, so `S2n(4)` is S4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointGroup {
    C1,
    Ci,
    Cs,
    Cn(u32),
    Cnv(u32),
    Cnh(u32),
    Dn(u32),
    Dnh(u32),
    Dnd(u32),
    S2n(u32),
    T,
    Td,
    Th,
    O,
    Oh,
    I,
    Ih,
    CInfV,
    DInfH,
    /// A single atom.
    Kh,
}

impl PointGroup {
    /// Rotational symmetry number: the order of the pure rotational subgroup.
    pub fn symmetry_number(&self) -> u32 {
        match *self {
            PointGroup::C1 | PointGroup::Ci | PointGroup::Cs | PointGroup::CInfV | PointGroup::Kh => 1,
            PointGroup::DInfH => 2,
            PointGroup::Cn(n) | PointGroup::Cnv(n) | PointGroup::Cnh(n) => n,
            PointGroup::Dn(n) | PointGroup::Dnh(n) | PointGroup::Dnd(n) => 2 * n,
            PointGroup::S2n(order) => order / 2,
            PointGroup::T | PointGroup::Td | PointGroup::Th => 12,
            PointGroup::O | PointGroup::Oh => 24,
            PointGroup::I | PointGroup::Ih => 60,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, PointGroup::CInfV | PointGroup::DInfH)
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointGroup::C1 => write!(f, "C1"),
            PointGroup::Ci => write!(f, "Ci"),
            PointGroup::Cs => write!(f, "Cs"),
            PointGroup::Cn(n) => write!(f, "C{n}"),
            PointGroup::Cnv(n) => write!(f, "C{n}v"),
            PointGroup::Cnh(n) => write!(f, "C{n}h"),
            PointGroup::Dn(n) => write!(f, "D{n}"),
            PointGroup::Dnh(n) => write!(f, "D{n}h"),
            PointGroup::Dnd(n) => write!(f, "D{n}d"),
            PointGroup::S2n(n) => write!(f, "S{n}"),
            PointGroup::T => write!(f, "T"),
            PointGroup::Td => write!(f, "Td"),
            PointGroup::Th => write!(f, "Th"),
            PointGroup::O => write!(f, "O"),
            PointGroup::Oh => write!(f, "Oh"),
            PointGroup::I => write!(f, "I"),
            PointGroup::Ih => write!(f, "Ih"),
            PointGroup::CInfV => write!(f, "C*v"),
            PointGroup::DInfH => write!(f, "D*h"),
            PointGroup::Kh => write!(f, "Kh"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unrecognized point group '{0}'")]
pub struct ParsePointGroupError(pub String);

impl FromStr for PointGroup {
    type Err = ParsePointGroupError;

    /// Parses Schoenflies labels case-insensitively. Linear groups accept `C*v`, `Cinfv` and
    /// `Coov` spellings (likewise for `D*h`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePointGroupError(s.to_string());
        let label = s.trim().to_ascii_lowercase();
        let fixed = match label.as_str() {
            "c1" => Some(PointGroup::C1),
            "ci" => Some(PointGroup::Ci),
            "cs" => Some(PointGroup::Cs),
            "t" => Some(PointGroup::T),
            "td" => Some(PointGroup::Td),
            "th" => Some(PointGroup::Th),
            "o" => Some(PointGroup::O),
            "oh" => Some(PointGroup::Oh),
            "i" => Some(PointGroup::I),
            "ih" => Some(PointGroup::Ih),
            "kh" => Some(PointGroup::Kh),
            "c*v" | "cinfv" | "coov" => Some(PointGroup::CInfV),
            "d*h" | "dinfh" | "dooh" => Some(PointGroup::DInfH),
            _ => None,
        };
        if let Some(group) = fixed {
            return Ok(group);
        }

        let mut chars = label.chars();
        let family = chars.next().ok_or_else(err)?;
        let rest: String = chars.collect();
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, suffix) = rest.split_at(digits_end);
        let n: u32 = digits.parse().map_err(|_| err())?;
        if n == 0 {
            return Err(err());
        }

        let group = match (family, suffix) {
            ('c', "") if n == 1 => PointGroup::C1,
            ('c', "") => PointGroup::Cn(n),
            ('c', "v") if n >= 2 => PointGroup::Cnv(n),
            ('c', "h") if n == 1 => PointGroup::Cs,
            ('c', "h") => PointGroup::Cnh(n),
            ('d', "") if n >= 2 => PointGroup::Dn(n),
            ('d', "h") if n >= 2 => PointGroup::Dnh(n),
            ('d', "d") if n >= 2 => PointGroup::Dnd(n),
            ('s', "") if n == 2 => PointGroup::Ci,
            ('s', "") if n >= 4 && n % 2 == 0 => PointGroup::S2n(n),
            _ => return Err(err()),
        };
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetry_numbers_follow_rotational_subgroup_order() {
        assert_eq!(PointGroup::C1.symmetry_number(), 1);
        assert_eq!(PointGroup::Cs.symmetry_number(), 1);
        assert_eq!(PointGroup::CInfV.symmetry_number(), 1);
        assert_eq!(PointGroup::DInfH.symmetry_number(), 2);
        assert_eq!(PointGroup::Cnv(2).symmetry_number(), 2);
        assert_eq!(PointGroup::Cnv(3).symmetry_number(), 3);
        assert_eq!(PointGroup::Dnh(6).symmetry_number(), 12);
        assert_eq!(PointGroup::Dnd(2).symmetry_number(), 4);
        assert_eq!(PointGroup::S2n(4).symmetry_number(), 2);
        assert_eq!(PointGroup::Td.symmetry_number(), 12);
        assert_eq!(PointGroup::Oh.symmetry_number(), 24);
        assert_eq!(PointGroup::Ih.symmetry_number(), 60);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("C2v".parse::<PointGroup>().unwrap(), PointGroup::Cnv(2));
        assert_eq!("d3H".parse::<PointGroup>().unwrap(), PointGroup::Dnh(3));
        assert_eq!("s6".parse::<PointGroup>().unwrap(), PointGroup::S2n(6));
        assert_eq!("Dooh".parse::<PointGroup>().unwrap(), PointGroup::DInfH);
        assert_eq!("c*v".parse::<PointGroup>().unwrap(), PointGroup::CInfV);
        assert_eq!("TD".parse::<PointGroup>().unwrap(), PointGroup::Td);
        assert_eq!("C1h".parse::<PointGroup>().unwrap(), PointGroup::Cs);
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for label in ["", "X2", "C0", "S3", "D1", "C2q", "Cv"] {
            assert!(label.parse::<PointGroup>().is_err(), "{label} should not parse");
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for group in [
            PointGroup::Cnh(2),
            PointGroup::Dnd(5),
            PointGroup::S2n(8),
            PointGroup::DInfH,
            PointGroup::Th,
        ] {
            assert_eq!(group.to_string().parse::<PointGroup>().unwrap(), group);
        }
    }
}
