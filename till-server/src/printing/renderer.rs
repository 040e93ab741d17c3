//! KOT and Bill rendering
//!
//! Pure transformations: an order in, ticket text out. No clock reads,
//! no side effects - identical input always yields byte-identical
//! output, so reprints are safe.

use dhaba_printer::{TicketBuilder, pad_width};
use shared::order::{LineItem, Order};

/// Currency symbol printed on bills
const CURRENCY: &str = "₹";

fn item_display_name(item: &LineItem) -> String {
    match &item.variation {
        Some(variation) => format!("{} ({})", item.name, variation),
        None => item.name.clone(),
    }
}

/// Render a kitchen order ticket for one order.
///
/// Layout contract: quantity in a fixed-width field of at least three
/// characters padded with trailing spaces, followed by the item name;
/// a separator rule; a trailing `Total Items: N` line summing
/// quantities.
pub fn render_kot(order: &Order, width: usize) -> String {
    let mut b = TicketBuilder::new(width);

    b.align_center();
    b.size_double();
    b.bold_on();
    b.write_line("KOT");
    b.bold_off();
    b.size_reset();

    b.align_left();
    b.line_lr(&format!("Table: {}", order.table_no), &order.display_time);
    b.dash_sep();

    for item in &order.items {
        // {:<3} never truncates larger quantities
        b.write_line(&format!("{:<3}{}", item.quantity, item_display_name(item)));
    }

    b.dash_sep();
    b.write_line(&format!("Total Items: {}", order.item_count()));

    b.cut();
    b.finalize()
}

/// Render one bill covering every supplied order.
///
/// Every line item across all orders is listed as name, quantity ×
/// unit price and line subtotal, followed by a single grand total with
/// two-decimal rounding and the currency symbol.
pub fn render_bill(orders: &[Order], total: f64, width: usize) -> String {
    let mut b = TicketBuilder::new(width);

    b.align_center();
    b.size_double();
    b.bold_on();
    b.write_line("BILL");
    b.bold_off();
    b.size_reset();

    b.align_left();
    if let Some(first) = orders.first() {
        b.line_lr(&format!("Table: {}", first.table_no), &first.display_time);
    }
    b.eq_sep();

    // Columns: name | qty x price | subtotal
    let name_width = width.saturating_sub(21);
    for order in orders {
        for item in &order.items {
            let qty_price = format!("{} x {:.2}", item.quantity, item.price);
            let subtotal = format!("{:.2}", item.subtotal());
            b.write_line(&format!(
                "{} {} {}",
                pad_width(&item_display_name(item), name_width, false),
                pad_width(&qty_price, 11, true),
                pad_width(&subtotal, 8, true)
            ));
        }
    }

    b.eq_sep();
    b.bold_on();
    b.line_lr("Total", &format!("{}{:.2}", CURRENCY, total));
    b.bold_off();

    b.align_center();
    b.write_line("Thank you, visit again!");

    b.cut();
    b.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderOrigin, OrderStatus};

    fn sample_order() -> Order {
        let mut order = Order::new(
            OrderOrigin::digital(),
            "4",
            vec![
                LineItem::new("Tea", 10.0, 2),
                LineItem::new("Paneer Tikka", 180.0, 1).with_variation("Half"),
            ],
        )
        .with_status(OrderStatus::Kot);
        order.display_time = "14/03/2025 19:05".to_string();
        order
    }

    #[test]
    fn test_kot_layout_contract() {
        let out = render_kot(&sample_order(), 32);
        assert!(out.contains("2  Tea"));
        assert!(out.contains("1  Paneer Tikka (Half)"));
        assert!(out.contains(&"-".repeat(32)));
        assert!(out.contains("Total Items: 3"));
    }

    #[test]
    fn test_kot_quantity_field_grows_past_three() {
        let mut order = sample_order();
        order.items = vec![LineItem::new("Roti", 12.0, 1234)];
        let out = render_kot(&order, 32);
        assert!(out.contains("1234Roti"));
    }

    #[test]
    fn test_kot_is_idempotent() {
        let order = sample_order();
        assert_eq!(render_kot(&order, 32), render_kot(&order, 32));
    }

    #[test]
    fn test_bill_lists_items_and_grand_total() {
        let orders = vec![sample_order()];
        let total: f64 = orders.iter().map(Order::total).sum();
        let out = render_bill(&orders, total, 32);
        assert!(out.contains("2 x 10.00"));
        assert!(out.contains("1 x 180.00"));
        assert!(out.contains("180.00"));
        assert!(out.contains("₹200.00"));
    }

    #[test]
    fn test_bill_rounds_to_two_decimals() {
        let orders = vec![Order::new(
            OrderOrigin::digital(),
            "2",
            vec![LineItem::new("Chai", 10.333, 3)],
        )];
        let out = render_bill(&orders, 30.999, 32);
        assert!(out.contains("₹31.00"));
    }

    #[test]
    fn test_bill_is_idempotent() {
        let orders = vec![sample_order()];
        assert_eq!(render_bill(&orders, 200.0, 32), render_bill(&orders, 200.0, 32));
    }
}
