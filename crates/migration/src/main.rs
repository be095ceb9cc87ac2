//! Apply or roll back the budget schema outside of the server.
//!
//! The database is taken from `DATABASE_URL`, falling back to a `budget.db`
//! file in the working directory.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./budget.db?mode=rwc";
const USAGE: &str = "Usage: migration [up|down|fresh|refresh|status]";

enum Step {
    Up,
    Down,
    Fresh,
    Refresh,
    Status,
}

impl TryFrom<&str> for Step {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "fresh" => Ok(Self::Fresh),
            "refresh" => Ok(Self::Refresh),
            "status" => Ok(Self::Status),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let raw = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let step = match Step::try_from(raw.as_str()) {
        Ok(step) => step,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match step {
        Step::Up => migration::Migrator::up(&db, None).await?,
        Step::Down => migration::Migrator::down(&db, None).await?,
        Step::Fresh => migration::Migrator::fresh(&db).await?,
        Step::Refresh => migration::Migrator::refresh(&db).await?,
        Step::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
