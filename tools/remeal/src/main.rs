//! REMEAL command-line client.
//!
//! Drives the reservation flow against a REMEAL backend: create reservations,
//! review the ones made on your products, move them through their lifecycle
//! and rate delivered pickups.

mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use remeal_client::config::DEFAULT_API_BASE;
use remeal_client::{
    ClientConfig, RatingPrompt, RequestContext, ReservationClient, ReservationLifecycleManager,
    ReservationListView, Session, SessionStore,
};
use remeal_common::identity::Role;
use remeal_common::product::{ProductId, ProductProjection};
use remeal_common::rating::RatingInvitation;
use remeal_common::reservation::{ReservationAction, ReservationId};

#[derive(Parser)]
#[command(name = "remeal", about = "REMEAL surplus food reservations")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REMEAL_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Session file (default: <config dir>/remeal/session.json).
    #[arg(long, env = "REMEAL_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the bearer token issued by the backend.
    Login {
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token.
    Logout,
    /// Reserve one unit of a product.
    Reserve {
        #[arg(long)]
        product: String,
        /// Pickup time, RFC 3339 (e.g. 2026-03-01T18:00:00Z).
        #[arg(long, conflicts_with = "in_minutes", required_unless_present = "in_minutes")]
        pickup: Option<DateTime<Utc>>,
        /// Pickup this many minutes from now.
        #[arg(long)]
        in_minutes: Option<i64>,
        /// Note for the product owner.
        #[arg(long)]
        message: String,
        /// Units the product had before this reservation, to show what is left.
        #[arg(long)]
        stock: Option<u32>,
    },
    /// List your reservations.
    Mine,
    /// List reservations made on your products.
    Incoming,
    /// Accept a pending reservation on one of your products.
    Accept { id: String },
    /// Reject a pending reservation on one of your products.
    Reject { id: String },
    /// Cancel one of your pending reservations.
    Cancel { id: String },
    /// Mark one of your reservations as picked up, optionally rating it.
    Deliver {
        id: String,
        #[arg(long, requires = "comment")]
        score: Option<u8>,
        #[arg(long, requires = "score")]
        comment: Option<String>,
    },
    /// Delete one of your reservations.
    Delete { id: String },
    /// Rate a delivered reservation.
    Rate {
        #[arg(long)]
        product: String,
        #[arg(long)]
        reservation: Option<String>,
        #[arg(long)]
        score: u8,
        #[arg(long)]
        comment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match &cli.session_file {
        Some(path) => SessionStore::at(path),
        None => SessionStore::default_location()?,
    };

    match cli.command {
        Command::Login { ref token } => {
            let token = token.trim();
            if token.is_empty() {
                bail!("token must not be empty");
            }
            store.save(&Session {
                token: token.to_string(),
            })?;
            println!("Logged in (session stored at {})", store.path().display());
            return Ok(());
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
            return Ok(());
        }
        _ => {}
    }

    let session = store.load()?.with_context(|| {
        format!(
            "not logged in (no session at {}); run `remeal login --token ...`",
            store.path().display()
        )
    })?;
    let config = ClientConfig::new(&cli.api_base)?
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let ctx = RequestContext::new(&config, &session)?;
    tracing::debug!("Using backend at {}", ctx.api_base());
    let manager = ReservationLifecycleManager::new(ReservationClient::new(ctx));

    run(&manager, cli.command).await
}

async fn run(
    manager: &ReservationLifecycleManager<ReservationClient>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Login { .. } | Command::Logout => {}
        Command::Reserve {
            product,
            pickup,
            in_minutes,
            message,
            stock,
        } => {
            let product_id = ProductId(product);
            let pickup = match (pickup, in_minutes) {
                (Some(at), _) => at,
                (None, Some(minutes)) => pickup_after(Utc::now(), minutes)?,
                (None, None) => bail!("either --pickup or --in-minutes is required"),
            };
            if let Some(quantity) = stock {
                manager
                    .track_product(ProductProjection::available(product_id.clone(), quantity))
                    .await;
            }
            let reservation = manager
                .create_reservation(&product_id, pickup, &message)
                .await
                .context("reservation failed")?;
            if let Some(notice) = manager.notice() {
                println!("{notice}");
            }
            render::reservation(&reservation);
            if let Some(projection) = manager.product(&product_id).await {
                render::projection(&projection);
            }
        }
        Command::Mine => {
            let mut view = ReservationListView::new(Role::Requester);
            view.reload(manager).await?;
            render::list(&view);
        }
        Command::Incoming => {
            let mut view = ReservationListView::new(Role::Owner);
            view.reload(manager).await?;
            render::list(&view);
        }
        Command::Accept { id } => {
            act(manager, Role::Owner, id, ReservationAction::Accept).await?;
        }
        Command::Reject { id } => {
            act(manager, Role::Owner, id, ReservationAction::Reject).await?;
        }
        Command::Cancel { id } => {
            act(manager, Role::Requester, id, ReservationAction::Cancel).await?;
        }
        Command::Delete { id } => {
            act(manager, Role::Requester, id, ReservationAction::Delete).await?;
        }
        Command::Deliver { id, score, comment } => {
            let invitation = act(manager, Role::Requester, id, ReservationAction::MarkDelivered)
                .await?
                .context("delivery did not produce a rating invitation")?;
            match (score, comment) {
                (Some(score), Some(comment)) => rate(manager, invitation, score, comment).await?,
                _ => println!(
                    "Rate this pickup with `remeal rate --product {} --reservation {} --score N --comment ...`",
                    invitation.product_id,
                    invitation
                        .reservation_id
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                ),
            }
        }
        Command::Rate {
            product,
            reservation,
            score,
            comment,
        } => {
            let invitation = RatingInvitation {
                product_id: ProductId(product),
                reservation_id: reservation.map(ReservationId),
            };
            rate(manager, invitation, score, comment).await?;
        }
    }
    Ok(())
}

/// `minutes` after `now`, refusing offsets chrono cannot represent.
fn pickup_after(now: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| now.checked_add_signed(delta))
        .with_context(|| format!("--in-minutes {minutes} is out of range"))
}

/// Load the list for `role`, run `action` on row `id` and print the result.
async fn act(
    manager: &ReservationLifecycleManager<ReservationClient>,
    role: Role,
    id: String,
    action: ReservationAction,
) -> Result<Option<RatingInvitation>> {
    let id = ReservationId(id);
    let mut view = ReservationListView::new(role);
    view.reload(manager).await?;
    let invitation = view
        .dispatch(manager, &id, action)
        .await
        .with_context(|| format!("could not {action} reservation {id}"))?;
    match view.row(&id) {
        Some(row) => render::row(row, None),
        None => println!("Reservation {id} deleted"),
    }
    Ok(invitation)
}

async fn rate(
    manager: &ReservationLifecycleManager<ReservationClient>,
    invitation: RatingInvitation,
    score: u8,
    comment: String,
) -> Result<()> {
    let mut prompt: RatingPrompt<'_, _> = manager.rating_prompt(invitation).await?;
    if let Some(reason) = prompt.blocked_reason() {
        bail!(reason);
    }
    prompt.set_score(score);
    prompt.set_comment(comment);
    let rating = prompt.submit().await.context("rating failed")?;
    if let Some(feedback) = prompt.feedback() {
        render::feedback(feedback);
    }
    render::rating(&rating);
    Ok(())
}
