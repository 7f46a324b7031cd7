//! Fixed-range page walk that merges one collection field across pages.
use super::contract::Contract;
use super::error::HarnessError;
use super::json_path::FieldPath;
use super::request::RequestSpec;
use super::transport::Transport;
use serde_json::Value;

pub const DEFAULT_PER_PAGE: u32 = 30;
pub const DEFAULT_MAX_PAGES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub per_page: u32,
    pub max_pages: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Items from every page in page order, plus the per-page item counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAggregate {
    pub items: Vec<Value>,
    pub page_counts: Vec<usize>,
}

/// Request pages `1..=max_pages` and append the array at `extract` from each.
///
/// Empty pages do not end the walk early; any per-page contract failure is
/// returned with the page number attached.
pub fn fetch_all_pages<T: Transport>(
    transport: &T,
    request: &RequestSpec,
    page_contract: &Contract,
    extract: &FieldPath,
    options: PageOptions,
) -> Result<PageAggregate, HarnessError> {
    let mut aggregate = PageAggregate::default();
    for page in 1..=options.max_pages {
        let page_request = request
            .clone()
            .with_query("page", page)
            .with_query("per_page", options.per_page);
        let outcome = transport.send(&page_request)?;
        page_contract.check(&outcome).map_err(|err| match err {
            HarnessError::ContractViolation(reason) => {
                HarnessError::contract(format!("page {page}: {reason}"))
            }
            other => other,
        })?;
        let body = outcome.json_body().map_err(|err| {
            HarnessError::contract(format!("page {page}: response body is not valid JSON: {err}"))
        })?;
        let items = match extract.lookup(body) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(HarnessError::contract(format!(
                    "page {page}: field `{extract}` is not an array: {other}"
                )))
            }
            None => {
                return Err(HarnessError::contract(format!(
                    "page {page}: field `{extract}` is absent from the response"
                )))
            }
        };
        tracing::debug!(page, items = items.len(), "page fetched");
        aggregate.page_counts.push(items.len());
        aggregate.items.extend(items);
    }
    Ok(aggregate)
}
