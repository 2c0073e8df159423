pub mod gradient_descent;
pub mod config;

pub use gradient_descent::{GradientDescent, StepReport};
pub use config::OptimizerConfig;
