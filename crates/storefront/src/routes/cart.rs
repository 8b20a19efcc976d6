//! Cart route handlers.
//!
//! The cart lives in the visitor's session under the configured storage key.
//! Every handler loads it, applies at most one mutation, and answers with
//! JSON. Mutations also set an `HX-Trigger: cart-updated` header so
//! badges and drawers on the page can refresh themselves.

use aromiq_core::{Cart, CurrencyCode, LineItem, Price};
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::SessionCart;
use crate::state::AppState;

/// Header telling the page the cart changed.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub name: String,
    pub size: String,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Price,
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Price,
    pub total_display: String,
    pub item_count: u64,
    pub currency: CurrencyCode,
}

impl CartView {
    /// Build the view of `cart` with amounts formatted in `currency`.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView::new(line, currency))
                .collect(),
            total: cart.total(),
            total_display: currency.format(cart.total()),
            item_count: cart.item_count(),
            currency,
        }
    }
}

impl CartItemView {
    fn new(line: &LineItem, currency: CurrencyCode) -> Self {
        Self {
            name: line.name.clone(),
            size: line.size.clone(),
            price: line.price,
            quantity: line.quantity,
            line_total: line.line_total(),
            line_total_display: currency.format(line.line_total()),
        }
    }
}

/// Response to an add.
#[derive(Debug, Serialize)]
pub struct AddedView {
    pub message: String,
    pub quantity: u32,
    pub item_count: u64,
}

/// Item count response.
#[derive(Debug, Serialize)]
pub struct CountView {
    pub item_count: u64,
}

/// Cart total response.
#[derive(Debug, Serialize)]
pub struct TotalView {
    pub total: Price,
    pub total_display: String,
    pub currency: CurrencyCode,
}

// =============================================================================
// Form Data
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub name: String,
    pub size: String,
    pub price: String,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub name: String,
    pub size: String,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub name: String,
    pub size: String,
}

/// Reject blank product names or sizes.
fn require_key<'a>(name: &'a str, size: &'a str) -> Result<(&'a str, &'a str)> {
    let (name, size) = (name.trim(), size.trim());
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if size.is_empty() {
        return Err(AppError::BadRequest("size is required".to_string()));
    }
    Ok((name, size))
}

async fn load_cart(state: &AppState, session: Session) -> SessionCart {
    SessionCart::load(session, &state.cart_config().storage_key).await
}

fn cart_view(state: &AppState, cart: &SessionCart) -> CartView {
    CartView::new(cart.cart(), state.cart_config().currency)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = load_cart(&state, session).await;
    Json(cart_view(&state, &cart))
}

/// Add one unit of a product/size to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let (name, size) = require_key(&form.name, &form.size)?;
    let price = Price::parse(&form.price).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut cart = load_cart(&state, session).await;
    let quantity = cart.add(name, size, price).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product", name), ("size", size)][..]));

    let body = AddedView {
        message: format!("{name} ({size}) added to cart!"),
        quantity,
        item_count: cart.cart().item_count(),
    };
    Ok((AppendHeaders([CART_UPDATED_TRIGGER]), Json(body)).into_response())
}

/// Set a line's quantity; zero or less removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let (name, size) = require_key(&form.name, &form.size)?;
    let quantity = form
        .quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity: {}", form.quantity)))?;

    let mut cart = load_cart(&state, session).await;
    if !cart.set_quantity(name, size, quantity).await? {
        tracing::debug!(product = %name, size = %size, "Update for missing cart line ignored");
    }

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        Json(cart_view(&state, &cart)),
    )
        .into_response())
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&state, session).await;
    cart.remove(form.name.trim(), form.size.trim()).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        Json(cart_view(&state, &cart)),
    )
        .into_response())
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut cart = load_cart(&state, session).await;
    cart.clear().await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        Json(cart_view(&state, &cart)),
    )
        .into_response())
}

/// Get the cart item count.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session).await;
    Json(CountView {
        item_count: cart.cart().item_count(),
    })
}

/// Get the cart total.
#[instrument(skip(state, session))]
pub async fn total(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session).await;
    let currency = state.cart_config().currency;
    let total = cart.cart().total();
    Json(TotalView {
        total,
        total_display: currency.format(total),
        currency,
    })
}
