pub mod series_provider;
pub mod twelvedata;
