//! Menu items, categories and recipes.

use super::{ApiClient, CategoryUpsert, ClientError, MenuItemUpsert, MenuQuery, RecipeUpsert};
use bistro_core::{Category, CategoryId, MenuItem, MenuItemId, Page, Recipe, RecipeId};
use reqwest::Method;

impl ApiClient {
    // =========================================================================
    // MENU ITEMS
    // =========================================================================

    /// GET /api/menu-items
    pub async fn list_menu_items(&self, query: &MenuQuery) -> Result<Page<MenuItem>, ClientError> {
        let req = self
            .request(Method::GET, "/api/menu-items")
            .query(&query.params());
        self.call_page(req).await
    }

    /// GET /api/menu-items/{id}
    pub async fn get_menu_item(&self, id: MenuItemId) -> Result<MenuItem, ClientError> {
        let req = self.request(Method::GET, &format!("/api/menu-items/{}", id));
        self.call(req).await
    }

    /// POST /api/menu-items
    pub async fn create_menu_item(&self, body: &MenuItemUpsert) -> Result<MenuItem, ClientError> {
        let req = self.request(Method::POST, "/api/menu-items").json(body);
        self.call(req).await
    }

    /// PUT /api/menu-items/{id}
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        body: &MenuItemUpsert,
    ) -> Result<MenuItem, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/api/menu-items/{}", id))
            .json(body);
        self.call(req).await
    }

    /// DELETE /api/menu-items/{id}
    pub async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/menu-items/{}", id));
        self.call_unit(req).await
    }

    // =========================================================================
    // CATEGORIES
    // =========================================================================

    /// GET /api/categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let req = self.request(Method::GET, "/api/categories");
        self.call_list(req).await
    }

    /// POST /api/categories
    pub async fn create_category(&self, body: &CategoryUpsert) -> Result<Category, ClientError> {
        let req = self.request(Method::POST, "/api/categories").json(body);
        self.call(req).await
    }

    /// PUT /api/categories/{id}
    pub async fn update_category(
        &self,
        id: CategoryId,
        body: &CategoryUpsert,
    ) -> Result<Category, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/api/categories/{}", id))
            .json(body);
        self.call(req).await
    }

    /// DELETE /api/categories/{id}
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/categories/{}", id));
        self.call_unit(req).await
    }

    // =========================================================================
    // RECIPES
    // =========================================================================

    /// GET /api/recipes, optionally for one menu item.
    pub async fn list_recipes(
        &self,
        menu_item: Option<MenuItemId>,
    ) -> Result<Vec<Recipe>, ClientError> {
        let mut req = self.request(Method::GET, "/api/recipes");
        if let Some(id) = menu_item {
            req = req.query(&[("menuItemId", id.to_string())]);
        }
        self.call_list(req).await
    }

    /// GET /api/recipes/{id}
    pub async fn get_recipe(&self, id: RecipeId) -> Result<Recipe, ClientError> {
        let req = self.request(Method::GET, &format!("/api/recipes/{}", id));
        self.call(req).await
    }

    /// POST /api/recipes
    pub async fn create_recipe(&self, body: &RecipeUpsert) -> Result<Recipe, ClientError> {
        let req = self.request(Method::POST, "/api/recipes").json(body);
        self.call(req).await
    }

    /// PUT /api/recipes/{id}
    pub async fn update_recipe(
        &self,
        id: RecipeId,
        body: &RecipeUpsert,
    ) -> Result<Recipe, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/api/recipes/{}", id))
            .json(body);
        self.call(req).await
    }

    /// DELETE /api/recipes/{id}
    pub async fn delete_recipe(&self, id: RecipeId) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/recipes/{}", id));
        self.call_unit(req).await
    }
}
