//! Cart inspection commands.

use libreria_core::UserId;
use libreria_storefront::config::CartConfig;
use libreria_storefront::services::cart::CartService;
use tracing::info;

/// Log a user's cart as the storefront would show it.
///
/// Lines whose product is gone are left out, exactly as in the API.
///
/// # Errors
///
/// Returns an error if the user id is blank, the database is unreachable or
/// the stored cart is malformed.
pub async fn show(user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user = UserId::parse(user)?;
    let store = super::open_store().await?;
    let service = CartService::new(store, CartConfig::default());

    let stored = service.repository().load(Some(&user)).await?;
    let cart = service.reconciler().resolve(&stored).await;

    info!("Cart for {user}");
    info!("========================");
    for line in &cart.lines {
        info!(
            "  [{}] {} x{} = {:.2} (line {})",
            line.stored_index, line.product.name, line.quantity, line.subtotal, line.line_id
        );
    }
    let dropped = stored.len() - cart.lines.len();
    if dropped > 0 {
        info!("  ({dropped} line(s) reference products that no longer exist)");
    }
    info!("Total: {:.2} ({} items)", cart.total, cart.item_count());

    Ok(())
}
