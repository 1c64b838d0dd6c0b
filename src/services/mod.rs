pub mod chart_assembler;
pub mod chart_cycle;
pub mod labels;
pub mod series_fetcher;
