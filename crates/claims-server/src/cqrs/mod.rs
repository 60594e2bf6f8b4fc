//! Mediator wiring
//!
//! Every command and query handler is registered here so callers outside
//! the HTTP layer can dispatch requests by type.

pub use mediator::DefaultAsyncMediator;
use sqlx::SqlitePool;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(pool: SqlitePool) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Claims
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::claims::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::claims::queries::get::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::claims::queries::filters::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::claims::queries::flags_notes::handle(pool, query).await }
            }
        })
        // Flags
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::flags::commands::create::handle(pool, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::flags::commands::resolve::handle(pool, cmd).await }
            }
        })
        // Notes
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::notes::commands::create::handle(pool, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::notes::commands::update::handle(pool, cmd).await }
            }
        })
        // Users
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::users::commands::create::handle(pool, cmd).await }
            }
        })
        // Dashboard
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::dashboard::queries::stats::handle(pool, query).await }
            }
        })
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use claims_common::db::connect_in_memory;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mediator_builds() {
        let pool = connect_in_memory().await.unwrap();
        let _mediator = build_mediator(pool);
    }
}
