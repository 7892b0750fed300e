use malsort_tracker::Token;

use crate::domain::{
    entities::catalog::Catalog,
    repositories::tracker::{TrackerRepository, TrackerRepositoryError},
};

pub struct CatalogService<R>
where
    R: TrackerRepository,
{
    repo: R,
}

impl<R> CatalogService<R>
where
    R: TrackerRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads the whole list, page by page, until no next link is returned.
    /// Any failed page aborts the fetch.
    pub async fn fetch_catalog(&self, token: &Token) -> Result<Catalog, TrackerRepositoryError> {
        let total = self.repo.fetch_total_count(token).await?;

        let mut catalog = Catalog::new();
        let mut fetched = 0;
        let mut next: Option<String> = None;
        loop {
            let page = self.repo.fetch_catalog_page(token, next.as_deref()).await?;
            fetched += page.entries.len();
            catalog.extend(page.entries);
            info!("{fetched}/{total}");

            match page.next {
                Some(link) => next = Some(link),
                None => break,
            }
        }

        if fetched as i64 != total {
            warn!("fetched {fetched} entries but the user statistics report {total}");
        }

        Ok(catalog)
    }
}
