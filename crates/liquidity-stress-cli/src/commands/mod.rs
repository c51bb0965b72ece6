pub mod reference;
pub mod stress;
