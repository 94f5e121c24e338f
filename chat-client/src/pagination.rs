use crate::models::chat::{Chat, ChatListResponse};
use crate::models::user::UserListResponse;
use crate::services::ChatService;
use client_core::error::ApiError;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Page/limit/search query parameters shared by the list endpoints.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// A paginated list response.
pub trait Paged {
    fn page(&self) -> u32;
    fn limit(&self) -> u32;
    fn total(&self) -> u64;

    fn has_next_page(&self) -> bool {
        u64::from(self.page()) * u64::from(self.limit()) < self.total()
    }

    fn next_page(&self) -> Option<u32> {
        self.has_next_page().then(|| self.page() + 1)
    }
}

macro_rules! impl_paged {
    ($ty:ty) => {
        impl Paged for $ty {
            fn page(&self) -> u32 {
                self.page
            }
            fn limit(&self) -> u32 {
                self.limit
            }
            fn total(&self) -> u64 {
                self.total
            }
        }
    };
}

impl_paged!(ChatListResponse);
impl_paged!(UserListResponse);
impl_paged!(crate::models::chat::MessagesResponse);

/// Accumulates chat-history pages for the sidebar.
///
/// Stands in for the scroll-driven "load more": each [`load_more`] call
/// fetches the next page and appends it, until the server reports no
/// further pages.
///
/// [`load_more`]: ChatHistoryPager::load_more
pub struct ChatHistoryPager {
    service: ChatService,
    limit: u32,
    search: Option<String>,
    next_page: Option<u32>,
    chats: Vec<Chat>,
}

impl ChatHistoryPager {
    pub fn new(service: ChatService) -> Self {
        Self::with_limit(service, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_limit(service: ChatService, limit: u32) -> Self {
        Self {
            service,
            limit,
            search: None,
            next_page: Some(1),
            chats: Vec::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the next page. Returns whether more pages remain after it.
    /// Calling past the last page is a no-op.
    pub async fn load_more(&mut self) -> Result<bool, ApiError> {
        let Some(page) = self.next_page else {
            return Ok(false);
        };

        let mut query = PageQuery::page(page, self.limit);
        query.search = self.search.clone();

        let response = self.service.history(&query).await?;
        self.next_page = response.next_page();
        self.chats.extend(response.chats);

        Ok(self.next_page.is_some())
    }
}
