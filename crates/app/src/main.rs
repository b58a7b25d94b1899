use std::error::Error;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use content::ContentClient;
use engine::{
    ActivityKind, EngineError, Money, Session, Trip, TripCategory, TripDraft, TripFilter, User,
    budget,
};

mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "globetrotter")]
#[command(about = "Plan trip itineraries, track budgets and log spend")]
struct Cli {
    /// State directory (also read from `GLOBETROTTER_STORE_DIR`); overrides
    /// `settings.toml`.
    #[arg(long, env = "GLOBETROTTER_STORE_DIR")]
    store_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Trip(TripCmd),
    City(CityCmd),
    Activity(ActivityCmd),
    Spend(SpendCmd),
    Currency(CurrencyCmd),
    Login(LoginArgs),
    Logout,
}

#[derive(Args, Debug)]
struct TripCmd {
    #[command(subcommand)]
    command: TripCommand,
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    /// List trips the dashboard way: tab filter, search, chronological.
    List {
        #[arg(long, default_value = "upcoming", value_parser = parse_filter)]
        filter: TripFilter,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Full itinerary and budget summary for one trip.
    Show { trip_id: String },
    Create(TripCreateArgs),
    Delete { trip_id: String },
}

#[derive(Args, Debug)]
struct TripCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    start_date: NaiveDate,
    #[arg(long)]
    end_date: NaiveDate,
    /// Total budget in major units, e.g. `50000` or `50000.50`.
    #[arg(long, value_parser = parse_money)]
    budget: Money,
    /// Currency code for the trip; defaults to the session currency.
    #[arg(long)]
    currency: Option<String>,
    #[arg(long, default_value_t = 1)]
    adults: u32,
    #[arg(long, default_value_t = 0)]
    children: u32,
    #[arg(long, default_value = "solo", value_parser = parse_category)]
    category: TripCategory,
    #[arg(long)]
    image: Option<String>,
    /// Ask the content service to generate the itinerary.
    #[arg(long)]
    generate: bool,
}

#[derive(Args, Debug)]
struct CityCmd {
    #[command(subcommand)]
    command: CityCommand,
}

#[derive(Subcommand, Debug)]
enum CityCommand {
    Add {
        trip_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
    },
    /// Look up a destination via the content service and merge it, with its
    /// suggested activities, into the trip.
    Suggest {
        trip_id: String,
        #[arg(long)]
        query: String,
    },
    Remove {
        trip_id: String,
        city_id: String,
    },
}

#[derive(Args, Debug)]
struct ActivityCmd {
    #[command(subcommand)]
    command: ActivityCommand,
}

#[derive(Subcommand, Debug)]
enum ActivityCommand {
    Add {
        trip_id: String,
        city_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "other", value_parser = parse_kind)]
        kind: ActivityKind,
        #[arg(long, value_parser = parse_money)]
        cost: Money,
        #[arg(long, default_value = "")]
        duration: String,
        #[arg(long)]
        time: Option<String>,
    },
    Remove {
        trip_id: String,
        city_id: String,
        activity_id: String,
    },
}

#[derive(Args, Debug)]
struct SpendCmd {
    #[command(subcommand)]
    command: SpendCommand,
}

#[derive(Subcommand, Debug)]
enum SpendCommand {
    /// Record what an activity actually cost. Logging again overwrites.
    Log {
        trip_id: String,
        city_id: String,
        activity_id: String,
        #[arg(value_parser = parse_money)]
        amount: Money,
    },
}

#[derive(Args, Debug)]
struct CurrencyCmd {
    #[command(subcommand)]
    command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
enum CurrencyCommand {
    Set { code: String },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse().map_err(|err: engine::EngineError| err.to_string())
}

fn parse_filter(raw: &str) -> Result<TripFilter, String> {
    raw.parse().map_err(|err: engine::EngineError| err.to_string())
}

fn parse_category(raw: &str) -> Result<TripCategory, String> {
    TripCategory::try_from(raw).map_err(|err| err.to_string())
}

fn parse_kind(raw: &str) -> Result<ActivityKind, String> {
    ActivityKind::try_from(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "globetrotter={level},engine={level},content={level}",
            level = settings.app.level
        ))
        .init();

    let cli = Cli::parse();
    let store_dir = cli
        .store_dir
        .unwrap_or_else(|| settings.app.store_dir.clone());
    let mut session = Session::builder().store_dir(store_dir)?.build();

    let client = settings.content.as_ref().map(|content| {
        ContentClient::new(
            reqwest::Client::new(),
            content
                .base_url
                .clone()
                .unwrap_or_else(|| ContentClient::DEFAULT_BASE_URL.to_string()),
            content.api_key.clone(),
            content
                .model
                .clone()
                .unwrap_or_else(|| ContentClient::DEFAULT_MODEL.to_string()),
        )
    });

    match cli.command {
        Command::Trip(cmd) => match cmd.command {
            TripCommand::List { filter, query } => trip_list(&session, filter, &query),
            TripCommand::Show { trip_id } => trip_show(&session, &trip_id)?,
            TripCommand::Create(args) => trip_create(&mut session, client.as_ref(), args).await?,
            TripCommand::Delete { trip_id } => {
                session.delete_trip(&trip_id)?;
                println!("deleted {trip_id}");
            }
        },
        Command::City(cmd) => match cmd.command {
            CityCommand::Add {
                trip_id,
                name,
                country,
                start_date,
                end_date,
            } => {
                let city_id =
                    session.create_city(&trip_id, name, country, start_date, end_date)?;
                println!("added city {city_id}");
            }
            CityCommand::Suggest { trip_id, query } => {
                city_suggest(&mut session, client.as_ref(), &trip_id, &query).await?;
            }
            CityCommand::Remove { trip_id, city_id } => {
                session.remove_city(&trip_id, &city_id)?;
                println!("removed city {city_id}");
            }
        },
        Command::Activity(cmd) => match cmd.command {
            ActivityCommand::Add {
                trip_id,
                city_id,
                name,
                kind,
                cost,
                duration,
                time,
            } => {
                let activity_id =
                    session.add_activity(&trip_id, &city_id, name, kind, cost, duration, time)?;
                println!("added activity {activity_id}");
            }
            ActivityCommand::Remove {
                trip_id,
                city_id,
                activity_id,
            } => {
                session.remove_activity(&trip_id, &city_id, &activity_id)?;
                println!("removed activity {activity_id}");
            }
        },
        Command::Spend(cmd) => match cmd.command {
            SpendCommand::Log {
                trip_id,
                city_id,
                activity_id,
                amount,
            } => {
                session.log_spend(&trip_id, &city_id, &activity_id, amount)?;
                println!(
                    "logged {}{} on {activity_id}",
                    session.currency().symbol,
                    amount
                );
            }
        },
        Command::Currency(cmd) => match cmd.command {
            CurrencyCommand::Set { code } => {
                let currency = session.set_currency(&code)?;
                println!("currency set to {} ({})", currency.code, currency.symbol);
            }
        },
        Command::Login(args) => {
            let user = User::new(uuid::Uuid::new_v4().to_string(), args.name, args.email);
            let name = user.name.clone();
            session.sign_in(user)?;
            println!("signed in as {name}");
        }
        Command::Logout => {
            session.sign_out()?;
            println!("signed out");
        }
    }

    Ok(())
}

fn trip_list(session: &Session, filter: TripFilter, query: &str) {
    let today = Local::now().date_naive();
    let trips = session.dashboard(filter, query, today);
    if trips.is_empty() {
        println!("no {} trips", filter.as_str());
        return;
    }
    for trip in trips {
        println!(
            "{}  {}  {} -> {}  {} cities",
            trip.id,
            trip.name,
            trip.start_date,
            trip.end_date,
            trip.cities.len()
        );
    }
}

fn trip_show(session: &Session, trip_id: &str) -> AppResult<()> {
    let trip = session.trip(trip_id)?;
    let symbol = &session.currency().symbol;

    println!("{} ({})", trip.name, trip.id);
    if !trip.description.is_empty() {
        println!("{}", trip.description);
    }
    println!(
        "{} -> {}  {}  {} travelers",
        trip.start_date,
        trip.end_date,
        trip.category,
        trip.travelers()
    );

    for city in &trip.cities {
        println!("\n[{}] {}, {}", city.id, city.city_name, city.country);
        for act in &city.activities {
            let actual = match act.actual_cost {
                Some(spent) => format!("spent {symbol}{spent}"),
                None => "not logged".to_string(),
            };
            println!(
                "  [{}] {} ({}) planned {symbol}{}, {actual}",
                act.id, act.name, act.kind, act.cost
            );
        }
    }

    print_budget(trip, symbol);
    Ok(())
}

fn print_budget(trip: &Trip, symbol: &str) {
    let breakdown = budget::breakdown(trip);
    println!("\nbudget   {symbol}{}", trip.total_budget);
    println!("planned  {symbol}{}", budget::planned_total(trip));
    println!("spent    {symbol}{}", budget::actual_total(trip));
    println!(
        "         transport {symbol}{}  stay {symbol}{}  activities {symbol}{}  food {symbol}{}",
        breakdown.transport, breakdown.stay, breakdown.activities, breakdown.food
    );
    println!(
        "per head {symbol}{}",
        budget::cost_per_person(trip)
    );
    if budget::is_over_budget(trip) {
        println!("OVER BUDGET");
    }
}

async fn trip_create(
    session: &mut Session,
    client: Option<&ContentClient>,
    args: TripCreateArgs,
) -> AppResult<()> {
    let draft = TripDraft {
        name: args.name,
        description: args.description,
        start_date: args.start_date,
        end_date: args.end_date,
        total_budget: args.budget,
        currency_code: args
            .currency
            .unwrap_or_else(|| session.currency().code.clone()),
        adults_count: args.adults,
        children_count: args.children,
        category: args.category,
        image: args.image,
    };

    let trip = if args.generate {
        let payload = match client {
            Some(client) => {
                let days = (draft.end_date - draft.start_date).num_days() + 1;
                client
                    .generate_trip(
                        &draft.name,
                        days,
                        draft.total_budget.minor() as f64 / 100.0,
                        &draft.currency_code,
                        draft.adults_count,
                        draft.children_count,
                        draft.category.as_str(),
                    )
                    .await
            }
            None => {
                tracing::warn!("content service not configured; creating an empty itinerary");
                None
            }
        };
        session.create_generated_trip(&draft, payload.as_ref())?
    } else {
        session.create_trip(&draft)?
    };

    println!("created trip {} with {} cities", trip.id, trip.cities.len());
    Ok(())
}

/// Unlike `trip create --generate` there is no itinerary to fall back to
/// here, so an absent or failed service surfaces as `ServiceUnavailable`
/// and the user adds the city manually instead.
async fn city_suggest(
    session: &mut Session,
    client: Option<&ContentClient>,
    trip_id: &str,
    query: &str,
) -> AppResult<()> {
    let Some(client) = client else {
        return Err(EngineError::ServiceUnavailable(
            "content service not configured".to_string(),
        )
        .into());
    };

    let code = session.trip(trip_id)?.currency_code.clone();
    let payload = client
        .city_with_activities(query, &code)
        .await
        .ok_or_else(|| {
            EngineError::ServiceUnavailable(format!("no suggestion for \"{query}\""))
        })?;
    session.add_suggested_city(trip_id, &payload)?;
    println!("added suggested city to {trip_id}");
    Ok(())
}
