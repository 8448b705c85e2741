//! Decor CLI
//!
//! Command-line interface for the decoration booking API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use decor_client::DecorClient;
use decor_types::{BookingId, CreateCheckoutRequest, DecoratorId, DecoratorStatus, DeliveryStatus};

#[derive(Parser)]
#[command(name = "decor")]
#[command(author, version, about = "Decoration booking API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the booking API
    #[arg(long, env = "DECOR_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Identity token for protected endpoints
    #[arg(long, env = "DECOR_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a hosted checkout session for a booking
    Checkout {
        #[arg(long)]
        booking: String,
        /// Price in major units, e.g. 19.99
        #[arg(long)]
        cost: f64,
        #[arg(long)]
        service: String,
        #[arg(long)]
        email: String,
    },
    /// Reconcile a returning checkout session
    Confirm {
        /// Checkout session id (cs_...)
        session_id: String,
    },
    /// Payment history (requires a token)
    Payments {
        /// Only this customer's payments; must be the token's email
        #[arg(long)]
        email: Option<String>,
    },
    /// Booking operations
    Booking {
        #[command(subcommand)]
        action: BookingCommands,
    },
    /// Decorator operations
    Decorator {
        #[command(subcommand)]
        action: DecoratorCommands,
    },
    /// Look up a user's role by email
    Role { email: String },
    /// List the service catalog
    Services,
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum BookingCommands {
    /// List bookings
    List {
        #[arg(long)]
        email: Option<String>,
        /// none | pending-pickup
        #[arg(long)]
        delivery_status: Option<String>,
    },
    /// Get booking details
    Get { id: String },
    /// Delete a booking
    Delete { id: String },
}

#[derive(Subcommand)]
enum DecoratorCommands {
    /// List decorators by rating
    List {
        /// Only the top rated
        #[arg(long)]
        top: bool,
    },
    /// Approve or reject an application (admin token required)
    Review {
        id: String,
        /// pending | approved | rejected
        #[arg(long)]
        status: String,
        /// Applicant email whose role follows the decision
        #[arg(long)]
        email: Option<String>,
    },
}

fn parse_booking_id(s: &str) -> Result<BookingId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid booking ID: {}", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = DecorClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            if client.health().await? {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Checkout {
            booking,
            cost,
            service,
            email,
        } => {
            let req = CreateCheckoutRequest {
                cost,
                service_name: service,
                user_email: email,
                booking_id: parse_booking_id(&booking)?,
            };
            let resp = client.create_checkout(&req).await?;
            println!("{}", resp.url);
        }

        Commands::Confirm { session_id } => {
            print_json(&client.confirm_payment(&session_id).await?)?;
        }

        Commands::Payments { email } => {
            print_json(&client.payments(email.as_deref()).await?)?;
        }

        Commands::Booking { action } => match action {
            BookingCommands::List {
                email,
                delivery_status,
            } => {
                let status = delivery_status
                    .map(|s| s.parse::<DeliveryStatus>())
                    .transpose()?;
                print_json(&client.list_bookings(email.as_deref(), status).await?)?;
            }
            BookingCommands::Get { id } => {
                print_json(&client.get_booking(parse_booking_id(&id)?).await?)?;
            }
            BookingCommands::Delete { id } => {
                let resp = client.delete_booking(parse_booking_id(&id)?).await?;
                println!("✓ Deleted {} booking(s)", resp.deleted_count);
            }
        },

        Commands::Decorator { action } => match action {
            DecoratorCommands::List { top } => {
                print_json(&client.decorators(top).await?)?;
            }
            DecoratorCommands::Review { id, status, email } => {
                let decorator_id: DecoratorId = id
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid decorator ID: {}", id))?;
                let status: DecoratorStatus = status.parse()?;
                print_json(&client.review_decorator(decorator_id, status, email).await?)?;
            }
        },

        Commands::Role { email } => {
            println!("{}", client.user_role(&email).await?);
        }

        Commands::Services => {
            print_json(&client.services().await?)?;
        }
    }

    Ok(())
}
