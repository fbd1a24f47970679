pub mod forecast_postgres;

pub use forecast_postgres::ForecastPostgresRepository;
