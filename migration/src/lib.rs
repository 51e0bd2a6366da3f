pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_crypto_prices;
mod m20261016_000002_add_market_cap_tier;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_crypto_prices::Migration),
            Box::new(m20261016_000002_add_market_cap_tier::Migration),
        ]
    }
}
