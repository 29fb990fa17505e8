//! Sharing requests service

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{
        item::Item,
        page::PageQuery,
        request::{CreateItemRequest, ItemRequest, ItemRequestDetails},
    },
    repository::Repository,
};

use super::validation::require_text;

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_request(
        &self,
        requester_id: i64,
        request: CreateItemRequest,
    ) -> AppResult<ItemRequestDetails> {
        self.repository.users.get_by_id(requester_id).await?;
        let description =
            require_text(request.description.as_deref(), "Description has to be not empty")?;

        let created = self
            .repository
            .requests
            .create(requester_id, &description, Utc::now())
            .await?;
        tracing::info!("Request {} created by user {}", created.id, requester_id);
        Ok(ItemRequestDetails::new(created, &[]))
    }

    /// Own requests, oldest first
    pub async fn list_own(&self, requester_id: i64) -> AppResult<Vec<ItemRequestDetails>> {
        self.repository.users.get_by_id(requester_id).await?;
        let requests = self.repository.requests.list_by_requester(requester_id).await?;
        self.with_items(requests).await
    }

    pub async fn get_request(&self, request_id: i64, user_id: i64) -> AppResult<ItemRequestDetails> {
        self.repository.users.get_by_id(user_id).await?;
        let request = self.repository.requests.get_by_id(request_id).await?;
        let items = self.repository.items.list_by_requests(&[request_id]).await?;
        Ok(ItemRequestDetails::new(request, &items))
    }

    /// Requests of other users, newest first
    pub async fn list_all(&self, user_id: i64, page: PageQuery) -> AppResult<Vec<ItemRequestDetails>> {
        let page = page.or_default()?;
        self.repository.users.get_by_id(user_id).await?;
        let requests = self.repository.requests.list_others(user_id, page).await?;
        self.with_items(requests).await
    }

    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<ItemRequestDetails>> {
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let items: Vec<Item> = if ids.is_empty() {
            Vec::new()
        } else {
            self.repository.items.list_by_requests(&ids).await?
        };
        Ok(requests
            .into_iter()
            .map(|request| ItemRequestDetails::new(request, &items))
            .collect())
    }
}
