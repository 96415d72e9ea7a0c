//! Object listing: single pages and full paginated listings.
//!
//! A full listing hides the server's page size from the caller. It issues
//! page requests one after another with an advancing `offset`, keeps the
//! caller's other parameters unchanged, drops elements already seen by
//! identity, and stops on a short page or once the reported total is reached.
//! Any failing page aborts the whole listing.

use std::collections::HashSet;

use bytes::Bytes;
use tracing::debug;

use crate::{
    Error, Identifiable, LIMIT, Method, OFFSET, Page, PageParser, RawResponse, Request,
    RequestParam, RequestParams, Result, ResultsWrapper, Transport,
};

impl Transport {
    async fn fetch_page<T, P>(&self, path: &str, params: &RequestParams, parser: &P) -> Result<Page<T>>
    where
        T: Send,
        P: PageParser<T>,
    {
        let request = Request::<Bytes>::builder(Method::Get, self.url(path)?)
            .query_params(params)
            .build();
        self.send(request, |response: RawResponse| parser.parse_page(&response))
            .await
    }

    /// Issues exactly one request with the caller's parameters, including
    /// any `limit` and `offset`, and returns that page as the server sent it.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the request.
    pub async fn get_objects_list_no_paging<T, P>(
        &self,
        path: &str,
        params: &RequestParams,
        parser: &P,
    ) -> Result<ResultsWrapper<T>>
    where
        T: Send,
        P: PageParser<T>,
    {
        let page = self.fetch_page(path, params, parser).await?;
        debug!(
            path,
            received = page.items.len(),
            total = ?page.total_count,
            "fetched single page"
        );
        Ok(ResultsWrapper::from_page(page))
    }

    /// Fetches every element matching `params`, page by page.
    ///
    /// Pages hold [`ClientConfig::objects_per_page`](crate::ClientConfig)
    /// elements. Elements whose identity was already seen are dropped, first
    /// occurrence wins. The reported total is the last one the server sent,
    /// or the number of results if it never sent one. The server echo of
    /// `limit` and `offset` comes from the first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] without sending anything if `params`
    /// contains `limit` or `offset`; use
    /// [`Transport::get_objects_list_no_paging`] for an explicit window.
    /// Returns [`Error::InternalClient`] if the listing would need more than
    /// [`ClientConfig::max_pages`](crate::ClientConfig) pages. Otherwise
    /// returns the classified error of the first failing page. No partial
    /// results are returned.
    pub async fn get_objects_list<T, P>(
        &self,
        path: &str,
        params: &RequestParams,
        parser: &P,
    ) -> Result<ResultsWrapper<T>>
    where
        T: Identifiable + Send,
        P: PageParser<T>,
    {
        if let Some(name) = [LIMIT, OFFSET]
            .into_iter()
            .find(|name| params.contains_name(name))
        {
            return Err(Error::internal(format!(
                "'{name}' is managed by the full listing; use the no-paging listing to pass it"
            )));
        }

        let page_size = self.config().objects_per_page.max(1);
        let max_pages = self.config().max_pages;
        let limit = RequestParam::new(LIMIT, page_size.to_string())?;

        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = 0;
        let mut total_count = None;
        let mut echo = None;
        let mut pages = 0;

        loop {
            if pages >= max_pages {
                return Err(Error::internal(format!(
                    "listing of {path} needs more than {max_pages} pages; raise max_pages or narrow the query"
                )));
            }

            let page_params = params
                .clone()
                .with(limit.clone())
                .with(RequestParam::new(OFFSET, offset.to_string())?);
            let page = self.fetch_page(path, &page_params, parser).await?;
            pages += 1;

            let received = page.items.len();
            debug!(
                path,
                offset,
                limit = page_size,
                received,
                total = ?page.total_count,
                "fetched page"
            );

            if echo.is_none() {
                echo = Some((page.limit, page.offset));
            }
            // A server may cap the page below what was asked for.
            let expected = page.limit.unwrap_or(page_size).min(page_size);
            total_count = page.total_count;
            for item in page.items {
                let fresh = item.identity().is_none_or(|id| seen.insert(id));
                if fresh {
                    results.push(item);
                }
            }

            offset += received;
            match total_count {
                Some(total) if received > 0 && received >= expected && offset < total => {}
                _ => break,
            }
        }

        let (limit_on_server, offset_on_server) = echo.unwrap_or_default();
        let total_count = total_count.unwrap_or(results.len());
        Ok(ResultsWrapper::new(
            results,
            total_count,
            limit_on_server,
            offset_on_server,
        ))
    }
}

/// Listing driven by a plain key/value map.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectObjectsSearcher;

impl DirectObjectsSearcher {
    /// Converts `pairs` into request parameters and performs a no-paging
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalClient`] before any request if a value is
    /// missing or a name is empty; otherwise the classified error of the
    /// request.
    pub async fn get_objects_list_no_paging<I, K, V, T, P>(
        transport: &Transport,
        pairs: I,
        path: &str,
        parser: &P,
    ) -> Result<ResultsWrapper<T>>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
        T: Send,
        P: PageParser<T>,
    {
        let params = RequestParams::from_pairs(pairs)?;
        transport
            .get_objects_list_no_paging(path, &params, parser)
            .await
    }
}
