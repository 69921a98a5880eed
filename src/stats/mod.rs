pub mod bayesian;
pub mod frequentist;
pub mod normal;
