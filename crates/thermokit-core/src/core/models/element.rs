use phf::phf_map;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub number: u8,
    pub symbol: &'static str,
    /// Standard atomic weight, amu.
    pub average_mass: f64,
    /// Mass of the most abundant isotope, amu.
    pub isotope_mass: f64,
}

impl Element {
    const fn new(number: u8, symbol: &'static str, average_mass: f64, isotope_mass: f64) -> Self {
        Self {
            number,
            symbol,
            average_mass,
            isotope_mass,
        }
    }

    /// Looks up an element by symbol, ignoring case (`"CL"`, `"cl"` and `"Cl"` all match).
    pub fn from_symbol(symbol: &str) -> Option<&'static Element> {
        let trimmed = symbol.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        let normalized: String = first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect();
        SYMBOL_INDEX
            .get(normalized.as_str())
            .map(|&index| &ELEMENTS[index])
    }

    pub fn from_number(number: u32) -> Option<&'static Element> {
        if number == 0 {
            return None;
        }
        ELEMENTS.get(number as usize - 1)
    }

    /// Finds the element whose average or isotope mass lies within `tolerance` of `mass`.
    pub fn from_mass(mass: f64, tolerance: f64) -> Option<&'static Element> {
        ELEMENTS.iter().find(|e| {
            (e.average_mass - mass).abs() < tolerance || (e.isotope_mass - mass).abs() < tolerance
        })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

#[rustfmt::skip]
pub static ELEMENTS: [Element; 86] = [
    Element::new(1, "H", 1.00794, 1.00782503223),
    Element::new(2, "He", 4.002602, 4.00260325413),
    Element::new(3, "Li", 6.941, 7.0160034366),
    Element::new(4, "Be", 9.0121831, 9.012183065),
    Element::new(5, "B", 10.811, 11.00930536),
    Element::new(6, "C", 12.0107, 12.0),
    Element::new(7, "N", 14.0067, 14.00307400443),
    Element::new(8, "O", 15.9994, 15.99491461957),
    Element::new(9, "F", 18.998403163, 18.99840316273),
    Element::new(10, "Ne", 20.1797, 19.9924401762),
    Element::new(11, "Na", 22.98976928, 22.989769282),
    Element::new(12, "Mg", 24.305, 23.985041697),
    Element::new(13, "Al", 26.9815385, 26.98153853),
    Element::new(14, "Si", 28.0855, 27.97692653465),
    Element::new(15, "P", 30.973761998, 30.97376199842),
    Element::new(16, "S", 32.065, 31.9720711744),
    Element::new(17, "Cl", 35.453, 34.968852682),
    Element::new(18, "Ar", 39.948, 39.9623831237),
    Element::new(19, "K", 39.0983, 38.9637064864),
    Element::new(20, "Ca", 40.078, 39.962590863),
    Element::new(21, "Sc", 44.955908, 44.95590828),
    Element::new(22, "Ti", 47.867, 47.94794198),
    Element::new(23, "V", 50.9415, 50.94395704),
    Element::new(24, "Cr", 51.9961, 51.94050623),
    Element::new(25, "Mn", 54.938044, 54.93804391),
    Element::new(26, "Fe", 55.845, 55.93493633),
    Element::new(27, "Co", 58.933194, 58.93319429),
    Element::new(28, "Ni", 58.6934, 57.93534241),
    Element::new(29, "Cu", 63.546, 62.92959772),
    Element::new(30, "Zn", 65.38, 63.92914201),
    Element::new(31, "Ga", 69.723, 68.9255735),
    Element::new(32, "Ge", 72.630, 73.921177761),
    Element::new(33, "As", 74.921595, 74.92159457),
    Element::new(34, "Se", 78.971, 79.9165218),
    Element::new(35, "Br", 79.904, 78.9183376),
    Element::new(36, "Kr", 83.798, 83.9114977282),
    Element::new(37, "Rb", 85.4678, 84.9117897379),
    Element::new(38, "Sr", 87.62, 87.9056125),
    Element::new(39, "Y", 88.90584, 88.9058403),
    Element::new(40, "Zr", 91.224, 89.9046977),
    Element::new(41, "Nb", 92.90637, 92.906373),
    Element::new(42, "Mo", 95.95, 97.90540482),
    Element::new(43, "Tc", 98.0, 97.9072124),
    Element::new(44, "Ru", 101.07, 101.9043441),
    Element::new(45, "Rh", 102.90550, 102.905498),
    Element::new(46, "Pd", 106.42, 105.9034804),
    Element::new(47, "Ag", 107.8682, 106.9050916),
    Element::new(48, "Cd", 112.414, 113.90336509),
    Element::new(49, "In", 114.818, 114.903878776),
    Element::new(50, "Sn", 118.710, 119.90220163),
    Element::new(51, "Sb", 121.760, 120.903812),
    Element::new(52, "Te", 127.60, 129.906222748),
    Element::new(53, "I", 126.90447, 126.9044719),
    Element::new(54, "Xe", 131.293, 131.9041550856),
    Element::new(55, "Cs", 132.90545196, 132.905451961),
    Element::new(56, "Ba", 137.327, 137.905247),
    Element::new(57, "La", 138.90547, 138.9063563),
    Element::new(58, "Ce", 140.116, 139.9054431),
    Element::new(59, "Pr", 140.90766, 140.9076576),
    Element::new(60, "Nd", 144.242, 141.907729),
    Element::new(61, "Pm", 145.0, 144.9127559),
    Element::new(62, "Sm", 150.36, 151.9197397),
    Element::new(63, "Eu", 151.964, 152.921238),
    Element::new(64, "Gd", 157.25, 157.9241123),
    Element::new(65, "Tb", 158.92535, 158.9253547),
    Element::new(66, "Dy", 162.500, 163.9291819),
    Element::new(67, "Ho", 164.93033, 164.9303288),
    Element::new(68, "Er", 167.259, 165.9302995),
    Element::new(69, "Tm", 168.93422, 168.9342179),
    Element::new(70, "Yb", 173.045, 173.9388664),
    Element::new(71, "Lu", 174.9668, 174.9407752),
    Element::new(72, "Hf", 178.49, 179.946557),
    Element::new(73, "Ta", 180.94788, 180.9479958),
    Element::new(74, "W", 183.84, 183.95093092),
    Element::new(75, "Re", 186.207, 186.9557501),
    Element::new(76, "Os", 190.23, 191.961477),
    Element::new(77, "Ir", 192.217, 192.9629216),
    Element::new(78, "Pt", 195.084, 194.9647917),
    Element::new(79, "Au", 196.966569, 196.96656879),
    Element::new(80, "Hg", 200.592, 201.9706434),
    Element::new(81, "Tl", 204.38, 204.9744278),
    Element::new(82, "Pb", 207.2, 207.9766525),
    Element::new(83, "Bi", 208.98040, 208.9803991),
    Element::new(84, "Po", 209.0, 208.9824308),
    Element::new(85, "At", 210.0, 209.9871479),
    Element::new(86, "Rn", 222.0, 222.0175782),
];

#[rustfmt::skip]
static SYMBOL_INDEX: phf::Map<&'static str, usize> = phf_map! {
    "H" => 0, "He" => 1, "Li" => 2, "Be" => 3, "B" => 4, "C" => 5, "N" => 6, "O" => 7,
    "F" => 8, "Ne" => 9, "Na" => 10, "Mg" => 11, "Al" => 12, "Si" => 13, "P" => 14, "S" => 15,
    "Cl" => 16, "Ar" => 17, "K" => 18, "Ca" => 19, "Sc" => 20, "Ti" => 21, "V" => 22, "Cr" => 23,
    "Mn" => 24, "Fe" => 25, "Co" => 26, "Ni" => 27, "Cu" => 28, "Zn" => 29, "Ga" => 30, "Ge" => 31,
    "As" => 32, "Se" => 33, "Br" => 34, "Kr" => 35, "Rb" => 36, "Sr" => 37, "Y" => 38, "Zr" => 39,
    "Nb" => 40, "Mo" => 41, "Tc" => 42, "Ru" => 43, "Rh" => 44, "Pd" => 45, "Ag" => 46, "Cd" => 47,
    "In" => 48, "Sn" => 49, "Sb" => 50, "Te" => 51, "I" => 52, "Xe" => 53, "Cs" => 54, "Ba" => 55,
    "La" => 56, "Ce" => 57, "Pr" => 58, "Nd" => 59, "Pm" => 60, "Sm" => 61, "Eu" => 62, "Gd" => 63,
    "Tb" => 64, "Dy" => 65, "Ho" => 66, "Er" => 67, "Tm" => 68, "Yb" => 69, "Lu" => 70, "Hf" => 71,
    "Ta" => 72, "W" => 73, "Re" => 74, "Os" => 75, "Ir" => 76, "Pt" => 77, "Au" => 78, "Hg" => 79,
    "Tl" => 80, "Pb" => 81, "Bi" => 82, "Po" => 83, "At" => 84, "Rn" => 85,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_by_atomic_number() {
        for (index, element) in ELEMENTS.iter().enumerate() {
            assert_eq!(element.number as usize, index + 1);
        }
    }

    #[test]
    fn symbol_index_points_at_matching_entries() {
        for element in ELEMENTS.iter() {
            let found = Element::from_symbol(element.symbol).unwrap();
            assert_eq!(found.number, element.number);
        }
    }

    #[test]
    fn symbol_lookup_ignores_case_and_whitespace() {
        assert_eq!(Element::from_symbol(" CL ").unwrap().number, 17);
        assert_eq!(Element::from_symbol("fe").unwrap().number, 26);
        assert!(Element::from_symbol("Xx").is_none());
        assert!(Element::from_symbol("").is_none());
    }

    #[test]
    fn number_lookup_rejects_out_of_range_values() {
        assert_eq!(Element::from_number(8).unwrap().symbol, "O");
        assert!(Element::from_number(0).is_none());
        assert!(Element::from_number(87).is_none());
    }

    #[test]
    fn mass_lookup_recognizes_isotope_masses() {
        assert_eq!(Element::from_mass(15.99491, 0.01).unwrap().symbol, "O");
        assert_eq!(Element::from_mass(1.008, 0.01).unwrap().symbol, "H");
    }
}
