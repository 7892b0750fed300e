use anyhow::Result;
use malsort_tracker::{MyAnimeList, Token};

use crate::{
    application::authorize::authorize,
    domain::{
        entities::{history::format_iso, reorder::ReorderRow},
        repositories::{token::TokenRepository, tracker::TrackerRepositoryError},
        services::{
            auth::AuthService, catalog::CatalogService, history::HistoryService,
            reorder::ReorderService,
        },
    },
    infrastructure::{
        config::Config,
        repositories::{
            history::HistoryRepositoryImpl, token::TokenRepositoryImpl,
            tracker::TrackerRepositoryImpl,
        },
    },
    presentation::callback::CallbackListener,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// Build and print the reorder table without writing anything back.
    pub dry_run: bool,
}

/// Authorize if needed, fetch the list, cache the histories of completed
/// entries and rewrite their dates in finish order.
pub async fn run(config: &Config, opts: Options) -> Result<Vec<ReorderRow>> {
    let credentials = config.myanimelist.clone().unwrap_or_default();
    let client = MyAnimeList::with_oauth_urls(
        credentials.client_id,
        credentials.client_secret,
        config.redirect_url.clone(),
        &config.authorize_url,
        &config.token_url,
    )?
    .with_base_urls(&config.api_url, &config.web_url);

    let tracker_repo = TrackerRepositoryImpl::new(client);
    let history_repo = HistoryRepositoryImpl::new(&config.cache_path);

    let auth_svc = AuthService::new(
        tracker_repo.clone(),
        TokenRepositoryImpl::new(&config.token_path),
    );
    let catalog_svc = CatalogService::new(tracker_repo.clone());
    let history_svc = HistoryService::new(tracker_repo.clone(), history_repo.clone());
    let reorder_svc = ReorderService::new(tracker_repo, history_repo, config.on_update_error);

    let mut token = load_or_authorize(config, &auth_svc).await?;

    let catalog = match catalog_svc.fetch_catalog(&token).await {
        Err(TrackerRepositoryError::Unauthorized) => {
            info!("token rejected, refreshing");
            config.credentials()?;
            token = auth_svc.refresh(&token).await?;
            catalog_svc.fetch_catalog(&token).await?
        }
        result => result?,
    };

    history_svc.cache_completed(&token, &catalog).await?;

    let rows = reorder_svc.build_table(&catalog).await?;
    if opts.dry_run {
        print_table(&rows);
        return Ok(rows);
    }

    let summary = reorder_svc.apply(&token, &rows).await?;
    info!(
        "reordered {} entries, {} updates rejected",
        summary.updated, summary.rejected
    );

    Ok(rows)
}

async fn load_or_authorize<S>(
    config: &Config,
    auth_svc: &AuthService<TrackerRepositoryImpl, S>,
) -> Result<Token>
where
    S: TokenRepository,
{
    if let Some(token) = auth_svc.load_token().await? {
        return Ok(token);
    }

    config.credentials()?;
    let listener = CallbackListener::bind(config.callback_addr).await?;

    Ok(authorize(auth_svc, listener).await?)
}

fn print_table(rows: &[ReorderRow]) {
    println!(
        "{:>8}  {:<10}  {:<10}  {:>5}  title",
        "id", "start", "finish", "score"
    );
    for row in rows {
        println!(
            "{:>8}  {:<10}  {:<10}  {:>5}  {}",
            row.id,
            format_iso(row.start_date),
            format_iso(row.finish_date),
            row.score,
            row.title
        );
    }
}
