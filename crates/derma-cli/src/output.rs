use chrono::Utc;
use derma_app::ChatTurn;
use derma_core::cart::{cart_item_count, cart_total, format_rupiah, CartItem};
use derma_core::chat::{relative_label, ChatMessage, ChatSession};
use derma_core::order::{Order, OrderStatus};
use derma_core::product::{Prediction, Product};
use derma_core::user::User;

pub fn print_user(user: &User) {
    let role = if user.is_admin() { " \x1b[35m(admin)\x1b[0m" } else { "" };
    println!(
        "\x1b[1m{}\x1b[0m{role}  @{}  {}",
        user.display_name(),
        user.username,
        user.email
    );
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for p in products {
        let brand = p.brand.as_deref().unwrap_or("");
        println!(
            "  \x1b[90m{:>4}\x1b[0m  {:<40} {:<14} \x1b[33m{}\x1b[0m",
            p.id,
            p.name,
            brand,
            format_rupiah(p.price)
        );
        if !p.for_conditions.is_empty() {
            println!("        \x1b[90mfor: {}\x1b[0m", p.for_conditions.join(", "));
        }
    }
}

pub fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in items {
        println!(
            "  \x1b[90m{:>4}\x1b[0m  {:<40} {} x {:>3} = \x1b[33m{}\x1b[0m",
            item.id,
            item.name,
            format_rupiah(item.price),
            item.quantity,
            format_rupiah(item.subtotal())
        );
    }
    println!(
        "  \x1b[1mTotal ({} items): {}\x1b[0m",
        cart_item_count(items),
        format_rupiah(cart_total(items))
    );
}

pub fn print_prediction(prediction: &Prediction) {
    println!(
        "Prediction: \x1b[1m{}\x1b[0m ({:.1}%)",
        prediction.label,
        prediction.confidence * 100.0
    );
    for (label, score) in prediction.top_k.iter().skip(1) {
        println!("  \x1b[90m{label}: {:.1}%\x1b[0m", score * 100.0);
    }
}

pub fn print_sessions(sessions: &[ChatSession], current: Option<&str>) {
    if sessions.is_empty() {
        println!("No chats yet.");
        return;
    }
    let now = Utc::now();
    for s in sessions {
        let marker = if Some(s.id.as_str()) == current { " *" } else { "" };
        println!(
            "  \x1b[90m{}\x1b[0m  {}{}  ({} msgs, {})",
            s.id,
            s.title,
            marker,
            s.message_count,
            relative_label(s.last_updated, now)
        );
    }
}

pub fn print_message(message: &ChatMessage) {
    if message.is_bot {
        println!("\x1b[36;1mbot>\x1b[0m {}", message.text);
        for p in &message.products {
            println!(
                "      \x1b[90m[{}] {} {}\x1b[0m",
                p.id,
                p.name,
                format_rupiah(p.price)
            );
        }
    } else {
        println!("\x1b[32;1myou>\x1b[0m {}", message.text);
    }
}

pub fn print_turn(turn: &ChatTurn) {
    if let Some(reply) = turn.reply() {
        print_message(reply);
    }
    if let Some(e) = &turn.error {
        eprintln!("\x1b[31m[error]\x1b[0m {e}");
    }
}

fn status_color(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::Delivered => "32",
        OrderStatus::Cancelled => "31",
        OrderStatus::Shipping | OrderStatus::Processing => "36",
        _ => "33",
    }
}

pub fn print_order(order: &Order) {
    println!(
        "\x1b[1m{}\x1b[0m  \x1b[{}m{}\x1b[0m  {}  {}",
        order.id,
        status_color(&order.status),
        order.status.label(),
        order.payment_method.label(),
        format_rupiah(order.total_amount)
    );
    for item in &order.items {
        println!(
            "    {} x {}  {}",
            item.quantity,
            item.product_name,
            format_rupiah(item.price * u64::from(item.quantity))
        );
    }
    let a = &order.shipping_address;
    println!(
        "    \x1b[90mto {}, {}, {}, {}\x1b[0m",
        a.full_name, a.address, a.city, a.province
    );
}

pub fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        print_order(order);
    }
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
