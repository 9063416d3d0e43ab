pub mod capture;
pub mod sampler;
