pub(crate) mod chart;
pub(crate) mod health;
pub(crate) mod stocks;
