//! `/users` endpoints.

use teamhub_shared::requests::UserUpdate;
use teamhub_shared::User;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// The profile of the signed-in user.
    pub async fn me(&self) -> Result<User> {
        self.get("/users/me").await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.get(&format!("/users/{user_id}")).await
    }

    pub async fn update_me(&self, update: &UserUpdate) -> Result<User> {
        self.put("/users/me", update).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.get_query("/users", &[("search", query)]).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use teamhub_shared::fixtures;

    use crate::mock;

    #[tokio::test]
    async fn search_passes_query_string() {
        let router = Router::new().route(
            "/users",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("search").map(String::as_str), Some("ann lee"));
                Json(vec![fixtures::user("u-1", "ann@example.com")])
            }),
        );
        let api = mock::client(router).await;

        let found = api.search_users("ann lee").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u-1");
    }
}
