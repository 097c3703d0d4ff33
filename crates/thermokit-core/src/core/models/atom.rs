use super::element::Element;
use nalgebra::Point3;

/// An atom as read from a program output.
///
/// `mass` is the mass used for all geometry and thermochemistry work. Loaders initialize it to
/// the element's average mass; the mass policy applied during preparation may replace it.
/// `reported_mass` keeps whatever the program printed, if anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: &'static Element,
    /// Mass in amu.
    pub mass: f64,
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    pub reported_mass: Option<f64>,
}

impl Atom {
    pub fn new(element: &'static Element, position: Point3<f64>) -> Self {
        Self {
            element,
            mass: element.average_mass,
            position,
            reported_mass: None,
        }
    }

    pub fn with_reported_mass(mut self, mass: f64) -> Self {
        self.reported_mass = Some(mass);
        self
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }

    /// Two atoms are interchangeable by a symmetry operation only if element and mass agree.
    #[inline]
    pub fn is_equivalent_to(&self, other: &Atom) -> bool {
        self.element.number == other.element.number && (self.mass - other.mass).abs() < 1e-3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oxygen() -> &'static Element {
        Element::from_symbol("O").unwrap()
    }

    #[test]
    fn new_atom_uses_average_element_mass() {
        let atom = Atom::new(oxygen(), Point3::origin());
        assert_eq!(atom.mass, oxygen().average_mass);
        assert!(atom.reported_mass.is_none());
        assert_eq!(atom.symbol(), "O");
    }

    #[test]
    fn isotopologues_are_not_equivalent() {
        let a = Atom::new(oxygen(), Point3::origin());
        let mut b = a.clone();
        assert!(a.is_equivalent_to(&b));
        b.mass = 17.999;
        assert!(!a.is_equivalent_to(&b));
    }
}
