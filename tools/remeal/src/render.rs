//! Plain-text output for the terminal.

use remeal_client::list_view::ReservationRow;
use remeal_client::{Feedback, ReservationListView};
use remeal_common::identity::Role;
use remeal_common::product::ProductProjection;
use remeal_common::rating::Rating;
use remeal_common::reservation::Reservation;

pub fn list(view: &ReservationListView) {
    if view.is_empty() {
        match view.role() {
            Role::Requester => println!("You have no reservations."),
            Role::Owner => println!("Nobody has reserved your products yet."),
        }
        return;
    }
    for (state, rows) in view.groups() {
        println!("{} ({})", capitalize(&state.to_string()), rows.len());
        for entry in rows {
            row(entry, view.error_for(&entry.reservation.id));
        }
    }
}

pub fn row(row: &ReservationRow, error: Option<&str>) {
    let r = &row.reservation;
    println!(
        "  #{:<8} product {:<10} pickup {}  [{}]",
        r.id,
        r.product_id,
        r.pickup_time.format("%Y-%m-%d %H:%M UTC"),
        r.state
    );
    if !r.message.is_empty() {
        println!("            \"{}\"", r.message);
    }
    if !row.actions.is_empty() {
        let actions: Vec<String> = row.actions.iter().map(ToString::to_string).collect();
        println!("            actions: {}", actions.join(", "));
    }
    if let Some(error) = error {
        println!("            error: {error}");
    }
}

pub fn reservation(r: &Reservation) {
    println!(
        "Reservation #{} for product {}: {} (pickup {})",
        r.id,
        r.product_id,
        r.state,
        r.pickup_time.format("%Y-%m-%d %H:%M UTC")
    );
}

pub fn projection(p: &ProductProjection) {
    println!(
        "Product {}: {} left, {}",
        p.product_id,
        p.quantity(),
        p.status()
    );
}

pub fn rating(rating: &Rating) {
    println!(
        "Rating #{} on reservation #{}: {}",
        rating.id, rating.reservation_id, rating.score
    );
}

pub fn feedback(feedback: &Feedback) {
    match feedback {
        Feedback::Success(message) => println!("{message}"),
        Feedback::Error(message) => eprintln!("{message}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
