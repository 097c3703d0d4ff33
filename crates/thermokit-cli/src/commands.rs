pub mod identify;
pub mod thermo;
