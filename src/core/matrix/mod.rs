pub mod complex_set;

// 재수출
pub use complex_set::{ComplexMatrixSet, Variable};
