pub mod training_loop_test;
