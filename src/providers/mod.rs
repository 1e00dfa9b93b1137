pub mod exchangerate_host;

pub use exchangerate_host::RateClient;
