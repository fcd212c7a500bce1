use crate::error::{PaginationError, PagingParameter, PagingResult};
use crate::pagination::Pagination;
use crate::validation::validate_page;
use error_stack::{Report, ResultExt};
use futures::future::try_join_all;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use utoipa::ToSchema;

/// Whether [`PaginationResult::new`] should cut the page out of the results
/// it is given.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Window {
    /// The results hold every matching record, keep only the requested page.
    Apply,
    /// The results already are the requested page (a data source did the
    /// skip/take), store them as they are.
    #[default]
    Presliced,
}

/// One page of a larger result set along with how to navigate to the pages
/// around it.
///
/// The limit used to compute the page is not kept. `total_items` is whatever
/// the caller reports, it is never derived from the length of `results`.
///
/// Deserializing rejects a `CurrentPage` of 0, the same as [`PaginationResult::new`].
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PaginationResult<T> {
    total_items: u64,
    current_page: u64,
    next_page: Option<u64>,
    previous_page: Option<u64>,
    total_pages: u64,
    results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPaginationResult<T> {
    total_items: u64,
    current_page: u64,
    next_page: Option<u64>,
    previous_page: Option<u64>,
    total_pages: u64,
    results: Vec<T>,
}

impl<'de, T> Deserialize<'de> for PaginationResult<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPaginationResult::<T>::deserialize(deserializer)?;
        if raw.current_page == 0 {
            return Err(serde::de::Error::custom(
                PaginationError::InvalidPagingParameter(PagingParameter::Page),
            ));
        }

        Ok(Self {
            total_items: raw.total_items,
            current_page: raw.current_page,
            next_page: raw.next_page,
            previous_page: raw.previous_page,
            total_pages: raw.total_pages,
            results: raw.results,
        })
    }
}

impl<T> PaginationResult<T> {
    /// Builds a page and its navigation metadata.
    ///
    /// Only the page number is validated here. A limit of 0 is accepted and
    /// turns the paging math off: no windowing and 0 total pages.
    pub fn new<I>(
        results: I,
        total_items: u64,
        pagination: Pagination,
        window: Window,
    ) -> PagingResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        validate_page(pagination.page)?;

        let Pagination { page, limit } = pagination;
        let start = pagination.skip();

        let results = match window {
            Window::Apply if limit > 0 => results
                .into_iter()
                .skip(saturating_usize(start))
                .take(saturating_usize(limit))
                .collect(),
            _ => results.into_iter().collect(),
        };

        Ok(Self {
            total_items,
            current_page: page,
            next_page: if pagination.end() < total_items {
                page.checked_add(1)
            } else {
                None
            },
            previous_page: (start > 0).then(|| page - 1),
            total_pages: total_pages(total_items, limit),
            results,
        })
    }

    /// A page with nothing on it.
    pub fn empty(pagination: Pagination) -> PagingResult<Self> {
        Self::new(Vec::new(), 0, pagination, Window::Presliced)
    }

    /// Builds a page whose items go through `convert` first.
    ///
    /// When windowing is applied only the items of the requested page are
    /// converted.
    pub async fn from_async_conversion<S, I, C, Fut, E>(
        results: I,
        total_items: u64,
        pagination: Pagination,
        window: Window,
        convert: C,
    ) -> PagingResult<Self>
    where
        I: IntoIterator<Item = S>,
        C: Fn(S) -> Fut,
        Fut: Future<Output = Result<T, Report<E>>>,
        E: Error + Send + Sync + 'static,
    {
        PaginationResult::new(results, total_items, pagination, window)?
            .map_results_async(convert)
            .await
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn next_page(&self) -> Option<u64> {
        self.next_page
    }

    pub fn previous_page(&self) -> Option<u64> {
        self.previous_page
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Converts every item, keeping the page metadata as it is.
    pub fn map_results<D, F>(self, convert: F) -> PaginationResult<D>
    where
        F: FnMut(T) -> D,
    {
        PaginationResult {
            total_items: self.total_items,
            current_page: self.current_page,
            next_page: self.next_page,
            previous_page: self.previous_page,
            total_pages: self.total_pages,
            results: self.results.into_iter().map(convert).collect(),
        }
    }

    /// Converts every item concurrently and waits for all of them. Results keep
    /// their original order. The first failed conversion fails the whole page.
    pub async fn map_results_async<D, C, Fut, E>(
        self,
        convert: C,
    ) -> PagingResult<PaginationResult<D>>
    where
        C: Fn(T) -> Fut,
        Fut: Future<Output = Result<D, Report<E>>>,
        E: Error + Send + Sync + 'static,
    {
        let Self {
            total_items,
            current_page,
            next_page,
            previous_page,
            total_pages,
            results,
        } = self;

        let results = if results.is_empty() {
            Vec::new()
        } else {
            let count = results.len();
            try_join_all(results.into_iter().map(convert))
                .await
                .change_context(PaginationError::Convert)
                .attach_with(|| format!("converting {count} records of page {current_page}"))?
        };

        Ok(PaginationResult {
            total_items,
            current_page,
            next_page,
            previous_page,
            total_pages,
            results,
        })
    }
}

/// Exact ceiling division, no floating point involved.
pub fn total_pages(total_items: u64, limit: u64) -> u64 {
    if limit == 0 {
        0
    } else {
        total_items.div_ceil(limit)
    }
}

fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("could not convert record")]
    struct ConvertErr;

    async fn never_called<T>(_: T) -> Result<T, Report<ConvertErr>> {
        panic!("converter should not be called")
    }

    fn one_two() -> Vec<&'static str> {
        vec!["one", "two"]
    }

    #[test]
    fn applying_window_keeps_only_requested_page() {
        let page =
            PaginationResult::new(one_two(), 2, Pagination::new(1, 1), Window::Apply).unwrap();

        assert_eq!(&["one"], page.results());
        assert_eq!(Some(2), page.next_page());
        assert_eq!(None, page.previous_page());
        assert_eq!(2, page.total_pages());
        assert_eq!(1, page.current_page());
    }

    #[test]
    fn second_page_of_window_points_back() {
        let page =
            PaginationResult::new(one_two(), 2, Pagination::new(2, 1), Window::Apply).unwrap();

        assert_eq!(&["two"], page.results());
        assert_eq!(None, page.next_page());
        assert_eq!(Some(1), page.previous_page());
    }

    #[test]
    fn total_items_is_not_derived_from_results() {
        let page = PaginationResult::new(one_two(), 0, Pagination::new(1, 10), Window::Apply)
            .unwrap();

        assert_eq!(0, page.total_items());
        assert_eq!(0, page.total_pages());
        assert_eq!(&["one", "two"], page.results());
        assert_eq!(None, page.next_page());
        assert_eq!(None, page.previous_page());
    }

    #[test]
    fn presliced_results_are_stored_verbatim() {
        let page = PaginationResult::new(one_two(), 30, Pagination::new(3, 2), Window::Presliced)
            .unwrap();

        assert_eq!(&["one", "two"], page.results());
        assert_eq!(Some(4), page.next_page());
        assert_eq!(Some(2), page.previous_page());
        assert_eq!(15, page.total_pages());
    }

    #[rstest]
    #[case(Window::Apply)]
    #[case(Window::Presliced)]
    fn zero_limit_disables_paging_math(#[case] window: Window) {
        let page = PaginationResult::new(one_two(), 2, Pagination::new(1, 0), window).unwrap();

        assert_eq!(0, page.total_pages());
        assert_eq!(&["one", "two"], page.results());
        assert_eq!(None, page.previous_page());
        // next page still follows `page * limit < total_items`, even with 0 total pages
        assert_eq!(Some(2), page.next_page());
    }

    #[rstest]
    #[case(Window::Apply, 0)]
    #[case(Window::Presliced, 10)]
    #[case(Window::Presliced, 0)]
    fn page_zero_is_rejected(#[case] window: Window, #[case] limit: u64) {
        let err = PaginationResult::new(one_two(), 2, Pagination::new(0, limit), window)
            .unwrap_err();

        assert_eq!(
            &PaginationError::InvalidPagingParameter(PagingParameter::Page),
            err.current_context()
        );
    }

    #[rstest]
    #[case(0, 7, 0)]
    #[case(1, 7, 1)]
    #[case(7, 7, 1)]
    #[case(8, 7, 2)]
    #[case(10_000_000_003, 7, 1_428_571_429)]
    #[case(u64::MAX, 1, u64::MAX)]
    #[case(u64::MAX, u64::MAX, 1)]
    #[case(5, 0, 0)]
    fn total_pages_is_exact_ceiling(
        #[case] total_items: u64,
        #[case] limit: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(expected, total_pages(total_items, limit));
    }

    #[rstest]
    #[case(1, 10, 11, true)]
    #[case(1, 10, 10, false)]
    #[case(2, 10, 21, true)]
    #[case(2, 10, 20, false)]
    #[case(5, 3, 0, false)]
    fn next_page_present_iff_more_items_remain(
        #[case] page: u64,
        #[case] limit: u64,
        #[case] total_items: u64,
        #[case] has_next: bool,
    ) {
        let result = PaginationResult::<u8>::new(
            Vec::new(),
            total_items,
            Pagination::new(page, limit),
            Window::Presliced,
        )
        .unwrap();

        assert_eq!(has_next, result.next_page().is_some());
        if has_next {
            assert_eq!(Some(page + 1), result.next_page());
        }
    }

    #[rstest]
    #[case(1, 10, false)]
    #[case(2, 10, true)]
    #[case(2, 0, false)]
    #[case(9, 1, true)]
    fn previous_page_present_iff_items_came_before(
        #[case] page: u64,
        #[case] limit: u64,
        #[case] has_previous: bool,
    ) {
        let result = PaginationResult::<u8>::new(
            Vec::new(),
            100,
            Pagination::new(page, limit),
            Window::Presliced,
        )
        .unwrap();

        assert_eq!(has_previous, result.previous_page().is_some());
    }

    #[test]
    fn window_past_the_end_is_empty() {
        let page =
            PaginationResult::new(one_two(), 2, Pagination::new(5, 2), Window::Apply).unwrap();

        assert!(page.is_empty());
        assert_eq!(Some(4), page.previous_page());
        assert_eq!(None, page.next_page());
    }

    #[test]
    fn empty_page_has_no_navigation() {
        let page = PaginationResult::<String>::empty(Pagination::default()).unwrap();

        assert_eq!(0, page.total_items());
        assert_eq!(0, page.total_pages());
        assert!(page.is_empty());
        assert_eq!(None, page.next_page());
        assert_eq!(None, page.previous_page());
    }

    #[test]
    fn map_results_keeps_metadata() {
        let page =
            PaginationResult::new(one_two(), 9, Pagination::new(2, 2), Window::Presliced).unwrap();

        let mapped = page.clone().map_results(str::len);

        assert_eq!(&[3, 3], mapped.results());
        assert_eq!(page.total_items(), mapped.total_items());
        assert_eq!(page.current_page(), mapped.current_page());
        assert_eq!(page.next_page(), mapped.next_page());
        assert_eq!(page.previous_page(), mapped.previous_page());
        assert_eq!(page.total_pages(), mapped.total_pages());
    }

    #[test]
    fn serialized_field_names_are_stable() {
        let page =
            PaginationResult::new(one_two(), 2, Pagination::new(1, 1), Window::Apply).unwrap();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(
            serde_json::json!({
                "TotalItems": 2,
                "CurrentPage": 1,
                "NextPage": 2,
                "PreviousPage": null,
                "TotalPages": 2,
                "Results": ["one"],
            }),
            json
        );
    }

    #[test]
    fn json_round_trip_reproduces_page() {
        let page = PaginationResult::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            12,
            Pagination::new(2, 3),
            Window::Presliced,
        )
        .unwrap();

        let json = serde_json::to_string(&page).unwrap();
        let back: PaginationResult<String> = serde_json::from_str(&json).unwrap();

        assert_eq!(page, back);
    }

    #[test]
    fn page_zero_does_not_deserialize() {
        let json = r#"{"TotalItems":5,"CurrentPage":0,"NextPage":1,"PreviousPage":null,"TotalPages":1,"Results":[1,2]}"#;

        let err = serde_json::from_str::<PaginationResult<u8>>(json).unwrap_err();

        assert!(err.to_string().contains("page must be greater than 0"));
    }

    #[tokio::test]
    async fn async_conversion_keeps_input_order() {
        // c finishes first, a finishes last
        let delays = [("a", 30), ("b", 15), ("c", 1)];

        let page = PaginationResult::from_async_conversion(
            delays,
            3,
            Pagination::new(1, 10),
            Window::Presliced,
            |(name, delay)| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, Report<ConvertErr>>(name.to_uppercase())
            },
        )
        .await
        .unwrap();

        assert_eq!(&["A", "B", "C"], page.results());
    }

    #[tokio::test]
    async fn async_conversion_only_converts_the_window() {
        let converted = std::sync::atomic::AtomicUsize::new(0);

        let page = PaginationResult::from_async_conversion(
            1..=20,
            20,
            Pagination::new(2, 5),
            Window::Apply,
            |n| {
                converted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move { Ok::<_, Report<ConvertErr>>(n * 10) }
            },
        )
        .await
        .unwrap();

        assert_eq!(&[60, 70, 80, 90, 100], page.results());
        assert_eq!(5, converted.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(4, page.total_pages());
    }

    #[tokio::test]
    async fn empty_results_never_call_the_converter() {
        let page = PaginationResult::<u32>::from_async_conversion(
            Vec::<u32>::new(),
            0,
            Pagination::default(),
            Window::Apply,
            never_called,
        )
        .await
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(0, page.total_pages());
    }

    #[tokio::test]
    async fn one_failed_conversion_fails_the_page() {
        let result = PaginationResult::from_async_conversion(
            vec![1, 2, 3],
            3,
            Pagination::default(),
            Window::Presliced,
            |n| async move {
                if n == 2 {
                    Err(Report::new(ConvertErr))
                } else {
                    Ok(n)
                }
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(&PaginationError::Convert, err.current_context());
        assert!(err.downcast_ref::<ConvertErr>().is_some());
    }

    #[tokio::test]
    async fn async_conversion_validates_page_first() {
        let err = PaginationResult::<u8>::from_async_conversion(
            vec![1u8],
            1,
            Pagination::new(0, 1),
            Window::Apply,
            never_called,
        )
        .await
        .unwrap_err();

        assert!(err.current_context().is_invalid_paging_parameter());
    }
}
