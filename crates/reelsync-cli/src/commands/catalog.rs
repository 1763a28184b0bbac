use super::AppContext;
use crate::output::Output;
use catalog_sync_core::{CatalogService, ServiceError};
use catalog_sync_models::{Identity, MovieDraft};
use color_eyre::Result;

async fn open_service(ctx: &AppContext) -> Result<CatalogService> {
    Ok(CatalogService::new(ctx.open_store().await?))
}

pub async fn run_list(ctx: &AppContext, output: &Output) -> Result<()> {
    let service = open_service(ctx).await?;
    let movies = service
        .list()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read catalog: {}", e))?;

    output.movies(&movies);
    Ok(())
}

pub async fn run_add(ctx: &AppContext, draft: MovieDraft, output: &Output) -> Result<()> {
    let service = open_service(ctx).await?;

    let (record, outcome) = match service.save(&draft).await {
        Ok(saved) => saved,
        Err(ServiceError::Validation(e)) => {
            return Err(color_eyre::eyre::eyre!("{} ({:?})", e, e.field));
        }
        Err(e) => return Err(color_eyre::eyre::eyre!("Failed to save movie: {}", e)),
    };

    output.saved(&record, outcome);
    Ok(())
}

pub async fn run_delete(ctx: &AppContext, title: String, release: String, output: &Output) -> Result<()> {
    let identity = Identity::parse(title, &release)
        .map_err(|e| color_eyre::eyre::eyre!("Release date '{}' is not YYYY-MM-DD: {}", release, e))?;

    let service = open_service(ctx).await?;
    let removed = service
        .delete(&identity)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to delete {}: {}", identity, e))?;

    output.deleted(&identity, removed);
    Ok(())
}
