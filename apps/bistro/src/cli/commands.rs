//! # CLI Command Implementations
//!
//! Each `cmd_*` function runs one subcommand against the storefront API,
//! the local state database and, for `watch`, the hub.

use super::{CartAction, CategoryAction, CliError, MenuAction, OrderAction, RecipeAction};
use crate::api::{
    AddCartItemRequest, ApiClient, CategoryUpsert, CheckoutRequest, ClientError, LoginRequest,
    MenuItemUpsert, MenuQuery, OrderQuery, Paging, RecipeUpsert, RegisterRequest, ReportRange,
    UpdateCartItemRequest,
};
use crate::config::Config;
use crate::hub::{HubClient, HubError, SseTransport};
use crate::sync::LiveCart;
use bistro_core::{
    BistroError, Cart, CartCache, CartCleared, CartEdit, CartToken, CategoryId, Ingredient,
    LineId, LocalStore, MenuItem, MenuItemId, OptionId, Order, OrderBoard, OrderId, RecipeId,
    pricing,
    primitives::{KEY_CART_SNAPSHOT, KEY_CART_TOKEN},
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

// =============================================================================
// CONTEXT
// =============================================================================

/// Shared state for one CLI invocation.
pub struct Context {
    pub config: Config,
    pub store: Arc<LocalStore>,
    pub json_mode: bool,
}

impl Context {
    /// Open the local state database named by the config.
    pub fn open(config: Config, json_mode: bool) -> Result<Self, CliError> {
        let store = LocalStore::open(&config.state_path)?;
        Ok(Self {
            config,
            store: Arc::new(store),
            json_mode,
        })
    }

    /// API client carrying the stored bearer token, if any.
    pub fn api(&self) -> Result<ApiClient, CliError> {
        let session = self.store.session()?;
        let client = ApiClient::new(self.config.api_base(), self.config.request_timeout())?;
        Ok(client.with_token(session.auth_token))
    }

    fn cart_token(&self) -> Result<Option<CartToken>, CliError> {
        Ok(self.store.session()?.cart_token)
    }

    fn require_cart_token(&self) -> Result<CartToken, CliError> {
        self.cart_token()?
            .ok_or_else(|| CliError::Usage("No cart yet. Add an item first.".to_string()))
    }

    /// Drop the local cart token and snapshot.
    fn forget_cart(&self) -> Result<(), CliError> {
        self.store.remove(KEY_CART_TOKEN)?;
        self.store.remove(KEY_CART_SNAPSHOT)?;
        Ok(())
    }
}

/// The stored cart, or a fresh one when none exists or the server forgot it.
async fn ensure_cart(ctx: &Context, api: &ApiClient) -> Result<Cart, CliError> {
    if let Some(token) = ctx.cart_token()? {
        match api.get_cart(&token).await {
            Ok(cart) => return Ok(cart),
            Err(ClientError::Rejected(404, _) | ClientError::Core(BistroError::Api(_))) => {
                tracing::info!(cart = %token, "Stored cart no longer exists, opening a new one");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let cart = api.create_cart().await?;
    ctx.store.set_cart_token(&cart.token)?;
    tracing::debug!(cart = %cart.token, "Opened cart");
    Ok(cart)
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// ACCOUNT
// =============================================================================

pub async fn cmd_login(ctx: &Context, email: String, password: String) -> Result<(), CliError> {
    let api = ctx.api()?;
    let session = api.login(&LoginRequest { email, password }).await?;
    ctx.store.set_auth_token(&session.token)?;

    if ctx.json_mode {
        print_json(&session.user);
        return Ok(());
    }

    println!(
        "Signed in as {} <{}> ({})",
        session.user.full_name, session.user.email, session.user.role
    );
    Ok(())
}

pub async fn cmd_register(
    ctx: &Context,
    full_name: String,
    email: String,
    password: String,
    phone: Option<String>,
) -> Result<(), CliError> {
    let api = ctx.api()?;
    let request = RegisterRequest {
        full_name,
        email,
        password,
        phone,
    };
    let session = api.register(&request).await?;
    ctx.store.set_auth_token(&session.token)?;

    if ctx.json_mode {
        print_json(&session.user);
        return Ok(());
    }

    println!("Registered {} <{}>", session.user.full_name, session.user.email);
    Ok(())
}

pub fn cmd_logout(ctx: &Context) -> Result<(), CliError> {
    ctx.store.clear_session()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "signed_out": true }));
        return Ok(());
    }

    println!("Signed out");
    Ok(())
}

pub async fn cmd_dashboard(
    ctx: &Context,
    from: Option<String>,
    to: Option<String>,
) -> Result<(), CliError> {
    let api = ctx.api()?;
    let report = api.dashboard(&ReportRange { from, to }).await?;

    if ctx.json_mode {
        print_json(&report);
        return Ok(());
    }

    println!("Sales Dashboard");
    println!("===============");
    println!("Revenue:    {}", report.total_revenue);
    println!("Orders:     {}", report.order_count);
    println!("Items sold: {}", report.items_sold);

    if !report.top_items.is_empty() {
        println!();
        println!("Top items:");
        for item in &report.top_items {
            println!("  {:<24} x{:<5} {}", item.name, item.quantity, item.revenue);
        }
    }

    if !report.daily.is_empty() {
        println!();
        println!("Daily:");
        for day in &report.daily {
            println!("  {}  {:>4} orders  {}", day.date, day.orders, day.revenue);
        }
    }
    Ok(())
}

// =============================================================================
// CATALOG
// =============================================================================

pub async fn cmd_menu(ctx: &Context, action: MenuAction) -> Result<(), CliError> {
    let api = ctx.api()?;

    match action {
        MenuAction::List {
            category,
            search,
            page,
            page_size,
        } => {
            let query = MenuQuery {
                category_id: category.map(CategoryId),
                search,
                paging: Paging { page, page_size },
            };
            let page = api.list_menu_items(&query).await?;

            if ctx.json_mode {
                print_json(&serde_json::json!({
                    "items": page.items,
                    "metadata": page.meta,
                }));
                return Ok(());
            }

            if page.items.is_empty() {
                println!("No menu items found");
            }
            for item in &page.items {
                let flag = if item.is_available { "" } else { " (unavailable)" };
                println!("{:>5}  {:<28} {:>10}{}", item.id, item.name, item.price, flag);
            }
            if let Some(meta) = page.meta {
                println!();
                println!(
                    "Page {} of {} ({} items)",
                    meta.page, meta.total_pages, meta.total_count
                );
            }
        }

        MenuAction::Show { id } => {
            let item = api.get_menu_item(MenuItemId(id)).await?;
            if ctx.json_mode {
                print_json(&item);
                return Ok(());
            }
            print_menu_item(&item);
        }

        MenuAction::Create {
            name,
            price,
            category,
            description,
            unavailable,
        } => {
            let body = MenuItemUpsert {
                name,
                price,
                category_id: CategoryId(category),
                description,
                is_available: !unavailable,
                option_groups: Vec::new(),
            };
            let item = api.create_menu_item(&body).await?;
            if ctx.json_mode {
                print_json(&item);
                return Ok(());
            }
            println!("Created menu item {} ({})", item.id, item.name);
        }

        MenuAction::Update {
            id,
            name,
            price,
            category,
            description,
            available,
        } => {
            let id = MenuItemId(id);
            let current = api.get_menu_item(id).await?;
            let mut body = MenuItemUpsert::from(&current);
            if let Some(name) = name {
                body.name = name;
            }
            if let Some(price) = price {
                body.price = price;
            }
            if let Some(category) = category {
                body.category_id = CategoryId(category);
            }
            if description.is_some() {
                body.description = description;
            }
            if let Some(available) = available {
                body.is_available = available;
            }
            let item = api.update_menu_item(id, &body).await?;
            if ctx.json_mode {
                print_json(&item);
                return Ok(());
            }
            println!("Updated menu item {} ({})", item.id, item.name);
        }

        MenuAction::Delete { id } => {
            api.delete_menu_item(MenuItemId(id)).await?;
            if ctx.json_mode {
                print_json(&serde_json::json!({ "deleted": id }));
                return Ok(());
            }
            println!("Deleted menu item {}", id);
        }
    }
    Ok(())
}

fn print_menu_item(item: &MenuItem) {
    println!("{} - {}", item.name, item.price);
    println!("  Id:        {}", item.id);
    println!("  Category:  {}", item.category_id);
    println!("  Available: {}", item.is_available);
    if let Some(description) = &item.description {
        println!("  {}", description);
    }
    for group in &item.option_groups {
        let rule = match (group.required, group.max_select) {
            (true, 0) => "required".to_string(),
            (true, max) => format!("required, up to {}", max),
            (false, 0) => "optional".to_string(),
            (false, max) => format!("optional, up to {}", max),
        };
        println!();
        println!("  {} ({})", group.name, rule);
        for option in &group.options {
            println!("    {:>5}  {:<20} +{}", option.id, option.name, option.extra_price);
        }
    }
}

pub async fn cmd_category(ctx: &Context, action: CategoryAction) -> Result<(), CliError> {
    let api = ctx.api()?;

    match action {
        CategoryAction::List => {
            let categories = api.list_categories().await?;
            if ctx.json_mode {
                print_json(&categories);
                return Ok(());
            }
            if categories.is_empty() {
                println!("No categories");
            }
            for category in &categories {
                println!("{:>5}  {}", category.id, category.name);
            }
        }

        CategoryAction::Create { name, description } => {
            let category = api
                .create_category(&CategoryUpsert { name, description })
                .await?;
            if ctx.json_mode {
                print_json(&category);
                return Ok(());
            }
            println!("Created category {} ({})", category.id, category.name);
        }

        CategoryAction::Update {
            id,
            name,
            description,
        } => {
            let category = api
                .update_category(CategoryId(id), &CategoryUpsert { name, description })
                .await?;
            if ctx.json_mode {
                print_json(&category);
                return Ok(());
            }
            println!("Updated category {} ({})", category.id, category.name);
        }

        CategoryAction::Delete { id } => {
            api.delete_category(CategoryId(id)).await?;
            if ctx.json_mode {
                print_json(&serde_json::json!({ "deleted": id }));
                return Ok(());
            }
            println!("Deleted category {}", id);
        }
    }
    Ok(())
}

/// Parse `name:quantity[:unit]`.
pub fn parse_ingredient(text: &str) -> Result<Ingredient, BistroError> {
    let mut parts = text.splitn(3, ':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let quantity = parts.next().unwrap_or_default();
    let unit = parts.next().unwrap_or_default();

    if name.is_empty() || quantity.is_empty() {
        return Err(BistroError::InvalidInput(format!(
            "Invalid ingredient '{}'. Use name:quantity[:unit]",
            text
        )));
    }

    Ok(Ingredient {
        name: name.to_string(),
        quantity: quantity.to_string(),
        unit: unit.to_string(),
    })
}

fn parse_ingredients(items: &[String]) -> Result<Vec<Ingredient>, BistroError> {
    items.iter().map(|s| parse_ingredient(s)).collect()
}

pub async fn cmd_recipe(ctx: &Context, action: RecipeAction) -> Result<(), CliError> {
    let api = ctx.api()?;

    match action {
        RecipeAction::List { menu_item } => {
            let recipes = api.list_recipes(menu_item.map(MenuItemId)).await?;
            if ctx.json_mode {
                print_json(&recipes);
                return Ok(());
            }
            if recipes.is_empty() {
                println!("No recipes");
            }
            for recipe in &recipes {
                println!(
                    "{:>5}  menu item {:<5} {} ingredients",
                    recipe.id,
                    recipe.menu_item_id,
                    recipe.ingredients.len()
                );
            }
        }

        RecipeAction::Show { id } => {
            let recipe = api.get_recipe(RecipeId(id)).await?;
            if ctx.json_mode {
                print_json(&recipe);
                return Ok(());
            }
            println!("Recipe {} for menu item {}", recipe.id, recipe.menu_item_id);
            for ingredient in &recipe.ingredients {
                println!(
                    "  - {} {} {}",
                    ingredient.quantity, ingredient.unit, ingredient.name
                );
            }
            if let Some(instructions) = &recipe.instructions {
                println!();
                println!("{}", instructions);
            }
        }

        RecipeAction::Create {
            menu_item,
            ingredients,
            instructions,
        } => {
            let body = RecipeUpsert {
                menu_item_id: MenuItemId(menu_item),
                ingredients: parse_ingredients(&ingredients)?,
                instructions,
            };
            let recipe = api.create_recipe(&body).await?;
            if ctx.json_mode {
                print_json(&recipe);
                return Ok(());
            }
            println!("Created recipe {}", recipe.id);
        }

        RecipeAction::Update {
            id,
            ingredients,
            instructions,
        } => {
            let id = RecipeId(id);
            let current = api.get_recipe(id).await?;
            let body = RecipeUpsert {
                menu_item_id: current.menu_item_id,
                ingredients: if ingredients.is_empty() {
                    current.ingredients
                } else {
                    parse_ingredients(&ingredients)?
                },
                instructions: instructions.or(current.instructions),
            };
            let recipe = api.update_recipe(id, &body).await?;
            if ctx.json_mode {
                print_json(&recipe);
                return Ok(());
            }
            println!("Updated recipe {}", recipe.id);
        }

        RecipeAction::Delete { id } => {
            api.delete_recipe(RecipeId(id)).await?;
            if ctx.json_mode {
                print_json(&serde_json::json!({ "deleted": id }));
                return Ok(());
            }
            println!("Deleted recipe {}", id);
        }
    }
    Ok(())
}

// =============================================================================
// CART
// =============================================================================

fn print_cart(json_mode: bool, cart: &Cart, offline: bool) {
    if json_mode {
        print_json(&serde_json::json!({
            "cart": cart,
            "offline": offline,
        }));
        return;
    }

    if offline {
        println!("(offline - showing last saved cart)");
    }
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    println!("Cart {}", cart.token);
    for line in &cart.items {
        println!(
            "{:>5}  {:<28} x{:<4} {:>10}",
            line.id,
            line.name,
            line.quantity,
            line.line_total()
        );
        if let Some(note) = &line.note {
            println!("       note: {}", note);
        }
    }
    println!();
    println!("Items: {}", cart.total_items);
    println!("Total: {}", cart.total_amount);
}

pub async fn cmd_cart(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    match action {
        CartAction::Show => cart_show(ctx).await,
        CartAction::Add {
            menu_item,
            quantity,
            options,
            note,
        } => cart_add(ctx, MenuItemId(menu_item), quantity, options, note).await,
        CartAction::Update {
            line,
            quantity,
            note,
        } => cart_update(ctx, LineId(line), quantity, note).await,
        CartAction::Remove { line } => cart_remove(ctx, LineId(line)).await,
        CartAction::Clear => cart_clear(ctx).await,
    }
}

async fn cart_show(ctx: &Context) -> Result<(), CliError> {
    let Some(token) = ctx.cart_token()? else {
        print_cart(ctx.json_mode, &Cart::default(), false);
        return Ok(());
    };

    let api = ctx.api()?;
    match api.get_cart(&token).await {
        Ok(cart) => {
            ctx.store.save_cart(&cart)?;
            print_cart(ctx.json_mode, &cart, false);
            Ok(())
        }
        Err(ClientError::ConnectionFailed(reason)) => {
            tracing::warn!(%reason, "API unreachable, falling back to saved cart");
            let cart = ctx.store.load_cart()?.unwrap_or_else(|| Cart::new(token));
            print_cart(ctx.json_mode, &cart, true);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn cart_add(
    ctx: &Context,
    menu_item: MenuItemId,
    quantity: u32,
    options: Vec<u64>,
    note: Option<String>,
) -> Result<(), CliError> {
    pricing::validate_note(note.as_deref())?;
    let api = ctx.api()?;

    let item = api.get_menu_item(menu_item).await?;
    let selected: Vec<OptionId> = options.into_iter().map(OptionId).collect();
    let quote = pricing::quote(&item, &selected, quantity)?;
    tracing::debug!(line_total = %quote.line_total, "Quoted line");

    let mut cache = CartCache::with_cart(ensure_cart(ctx, &api).await?);
    let request = AddCartItemRequest {
        menu_item_id: item.id,
        quantity,
        options: quote.options.clone(),
        note: note.clone(),
    };
    let edit = cache.edit(CartEdit::AddLine(quote.into_cart_item(&item, note)))?;
    tracing::debug!(total = %cache.cart().total_amount, "Optimistic cart total");

    match api.add_cart_item(cache.token(), &request).await {
        Ok(server) => {
            cache.confirm(edit, Some(&server));
        }
        Err(e) => {
            cache.rollback(edit);
            return Err(e.into());
        }
    }

    ctx.store.save_cart(cache.cart())?;
    print_cart(ctx.json_mode, cache.cart(), false);
    Ok(())
}

async fn cart_update(
    ctx: &Context,
    line: LineId,
    quantity: u32,
    note: Option<String>,
) -> Result<(), CliError> {
    pricing::validate_note(note.as_deref())?;
    let token = ctx.require_cart_token()?;
    let api = ctx.api()?;

    let mut cache = CartCache::with_cart(api.get_cart(&token).await?);
    let quantity_edit = cache.edit(CartEdit::SetQuantity { line, quantity })?;
    let note_edit = match &note {
        Some(text) if quantity > 0 => Some(cache.edit(CartEdit::SetNote {
            line,
            note: Some(text.clone()),
        })?),
        _ => None,
    };

    let request = UpdateCartItemRequest { quantity, note };
    let result = if quantity == 0 {
        api.remove_cart_item(&token, line).await
    } else {
        api.update_cart_item(&token, line, &request).await
    };

    match result {
        Ok(server) => {
            cache.load(&server);
        }
        Err(e) => {
            if let Some(id) = note_edit {
                cache.rollback(id);
            }
            cache.rollback(quantity_edit);
            return Err(e.into());
        }
    }

    ctx.store.save_cart(cache.cart())?;
    print_cart(ctx.json_mode, cache.cart(), false);
    Ok(())
}

async fn cart_remove(ctx: &Context, line: LineId) -> Result<(), CliError> {
    let token = ctx.require_cart_token()?;
    let api = ctx.api()?;

    let mut cache = CartCache::with_cart(api.get_cart(&token).await?);
    let edit = cache.edit(CartEdit::RemoveLine(line))?;

    match api.remove_cart_item(&token, line).await {
        Ok(server) => {
            cache.confirm(edit, Some(&server));
        }
        Err(e) => {
            cache.rollback(edit);
            return Err(e.into());
        }
    }

    ctx.store.save_cart(cache.cart())?;
    print_cart(ctx.json_mode, cache.cart(), false);
    Ok(())
}

async fn cart_clear(ctx: &Context) -> Result<(), CliError> {
    let token = ctx.require_cart_token()?;
    let api = ctx.api()?;
    api.clear_cart(&token).await?;

    let mut cache = CartCache::with_cart(Cart::new(token.clone()));
    cache.apply_cleared(&CartCleared { token: Some(token) });
    ctx.store.save_cart(cache.cart())?;
    print_cart(ctx.json_mode, cache.cart(), false);
    Ok(())
}

// =============================================================================
// CHECKOUT & ORDERS
// =============================================================================

fn print_order(order: &Order) {
    let code = if order.code.is_empty() {
        format!("#{}", order.id)
    } else {
        order.code.clone()
    };
    println!("Order {} for {} ({})", code, order.customer_name, order.payment_method);
    for line in &order.items {
        println!(
            "{:>5}  {:<28} x{:<4} {:>10}  [{}]",
            line.id,
            line.name,
            line.quantity,
            line.line_total(),
            line.status
        );
    }
    println!("Total: {}", order.total_amount);
}

pub async fn cmd_checkout(ctx: &Context, request: CheckoutRequest) -> Result<(), CliError> {
    let token = ctx.require_cart_token()?;
    let api = ctx.api()?;

    let cart = api.get_cart(&token).await?;
    if cart.is_empty() {
        return Err(CliError::Usage("Cart is empty".to_string()));
    }

    let order = api.checkout(&token, &request).await?;
    ctx.forget_cart()?;
    tracing::info!(order = %order.id, total = %order.total_amount, "Order placed");

    if ctx.json_mode {
        print_json(&order);
        return Ok(());
    }

    print_order(&order);
    Ok(())
}

pub async fn cmd_order(ctx: &Context, action: OrderAction) -> Result<(), CliError> {
    let api = ctx.api()?;

    match action {
        OrderAction::List {
            status,
            page,
            page_size,
        } => {
            let query = OrderQuery {
                status,
                paging: Paging { page, page_size },
            };
            let page = api.list_orders(&query).await?;

            if ctx.json_mode {
                print_json(&serde_json::json!({
                    "items": page.items,
                    "metadata": page.meta,
                }));
                return Ok(());
            }

            if page.items.is_empty() {
                println!("No orders");
            }
            for order in &page.items {
                let state = if order.is_complete() { "complete" } else { "open" };
                println!(
                    "{:>6}  {:<20} {:>10}  {}",
                    order.id, order.customer_name, order.total_amount, state
                );
            }
        }

        OrderAction::Show { id } => {
            let order = api.get_order(OrderId(id)).await?;
            if ctx.json_mode {
                print_json(&order);
                return Ok(());
            }
            print_order(&order);
        }

        OrderAction::Status {
            order,
            item,
            status,
        } => {
            let (order, item) = (OrderId(order), LineId(item));
            let mut board = OrderBoard::new();
            board.upsert(api.get_order(order).await?);
            // Reject invalid moves before touching the server.
            board.set_item_status(order, item, status)?;

            api.update_item_status(order, item, status).await?;

            if ctx.json_mode {
                print_json(&board.get(order));
                return Ok(());
            }
            println!("Order {} line {} is now {}", order, item, status);
        }
    }
    Ok(())
}

// =============================================================================
// WATCH
// =============================================================================

/// Cart to seed the live cache with: the server copy, else the saved snapshot.
async fn initial_cart(ctx: &Context) -> Result<Cart, CliError> {
    let Some(token) = ctx.cart_token()? else {
        return Ok(Cart::default());
    };

    match ctx.api()?.get_cart(&token).await {
        Ok(cart) => Ok(cart),
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch cart, using saved snapshot");
            Ok(ctx.store.load_cart()?.unwrap_or_else(|| Cart::new(token)))
        }
    }
}

pub async fn cmd_watch(ctx: &Context, limit: Option<usize>) -> Result<(), CliError> {
    let session = ctx.store.session()?;
    let transport = SseTransport::new(ctx.config.hub_url(), ctx.config.hub.connect_timeout())?;
    let hub = HubClient::new(transport, ctx.config.hub.options());
    hub.set_access_token(session.auth_token);
    hub.set_cart_token(session.cart_token);

    let live = LiveCart::new(CartCache::with_cart(initial_cart(ctx).await?))
        .with_store(Arc::clone(&ctx.store));
    let attachment = live.attach(&hub);
    let mut revisions = live.watch();
    let mut states = hub.watch_state();

    if !ctx.json_mode {
        println!("Watching {} (Ctrl+C to stop)", ctx.config.hub_url());
    }

    if let Err(e) = hub.start().await {
        attachment.detach(&hub);
        return Err(e.into());
    }

    let mut seen_orders: BTreeSet<OrderId> = BTreeSet::new();
    let mut updates = 0usize;
    let mut outcome = Ok(());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let revision = *revisions.borrow_and_update();
                tracing::debug!(revision, "Live state changed");
                report_update(ctx.json_mode, &live, &mut seen_orders);

                updates = updates.saturating_add(1);
                if limit.is_some_and(|max| updates >= max) {
                    break;
                }
            }

            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                if ctx.json_mode {
                    print_json(&serde_json::json!({ "connection": state.to_string() }));
                } else {
                    println!("[hub] {}", state);
                }
                if let crate::hub::ConnectionState::Failed { reason } = state {
                    outcome = Err(CliError::Hub(HubError::Failed {
                        attempts: ctx.config.hub.max_retries.saturating_add(1),
                        reason,
                    }));
                    break;
                }
            }
        }
    }

    attachment.detach(&hub);
    hub.stop().await;
    outcome
}

fn report_update(json_mode: bool, live: &LiveCart, seen_orders: &mut BTreeSet<OrderId>) {
    let cart = live.cart();
    let new_orders: Vec<Order> = live
        .recent_orders(16)
        .into_iter()
        .filter(|order| seen_orders.insert(order.id))
        .collect();

    if json_mode {
        print_json(&serde_json::json!({
            "cart": cart,
            "new_orders": new_orders,
        }));
        return;
    }

    for order in &new_orders {
        println!("[order] #{} {} {}", order.id, order.customer_name, order.total_amount);
    }
    println!(
        "[cart] {} item(s), total {}",
        cart.total_items, cart.total_amount
    );
}

// =============================================================================
// TESTS
// =============================================================================
