use medscan::db::{self, seed};

#[tokio::main]
async fn main() -> Result<(), medscan::Error> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").unwrap();
    let pool = db::init_db(&database_url).await?;

    let outcome = seed::seed_database(&pool).await?;
    log::info!("{}", outcome);
    Ok(())
}
