// Price-history sources: CSV files, synthetic samples and the in-memory store
pub mod csv_parser;
pub mod market_data;
pub mod sample_data;

pub use csv_parser::CsvPriceParser;
pub use market_data::{MarketDataStore, PriceHistoryProvider};
pub use sample_data::SampleDataGenerator;
