pub mod determinant_test;
