use anyhow::anyhow;
use chrono::NaiveDate;
use clap::Args;
use skylane_booking::{IdType, PaymentMethod, SubmissionOutcome};
use skylane_core::{FlightApi, SearchQuery};
use skylane_search::{list_flights_on, FeedNotice, LocationField, LookupOutcome};
use skylane_shared::{FlightClass, FlightSummary, Masked, ProfileUpdate, TicketRecord};
use tracing::info;

use crate::state::AppState;

#[derive(Args, Debug)]
pub struct BookArgs {
    /// Flight instance id, as shown by `search` or `discover`
    #[arg(long)]
    pub flight: i64,
    #[arg(long, default_value_t = FlightClass::Economy)]
    pub class: FlightClass,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub area_code: Option<String>,
    #[arg(long, default_value = "passport")]
    pub id_type: IdType,
    #[arg(long)]
    pub id_number: Option<String>,
    #[arg(long)]
    pub birthdate: Option<NaiveDate>,
    #[arg(long)]
    pub card_name: String,
    #[arg(long, env = "SKYLANE_CARD_NUMBER", hide_env_values = true)]
    pub card_number: String,
    #[arg(long)]
    pub expiry: String,
    #[arg(long, env = "SKYLANE_CARD_CVC", hide_env_values = true)]
    pub cvc: String,
}

pub async fn login(state: &AppState, email: &str, password: &str) -> anyhow::Result<()> {
    let user = state
        .session
        .login(email, password)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("Welcome, {}!", user.display_name());
    Ok(())
}

pub async fn logout(state: &AppState) -> anyhow::Result<()> {
    state.session.logout().await.map_err(|e| anyhow!(e.user_message()))?;
    println!("Signed out.");
    Ok(())
}

pub async fn profile(
    state: &AppState,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    date_of_birth: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let update = ProfileUpdate { first_name, last_name, phone_number, date_of_birth };
    let user = if update.is_empty() {
        state.session.refresh_profile().await
    } else {
        state.session.update_profile(&update).await
    }
    .map_err(|e| anyhow!(e.user_message()))?;

    println!("{}", user.display_name());
    println!("  email:    {}", user.email);
    println!("  phone:    {}", user.phone_number.as_deref().unwrap_or("-"));
    match user.date_of_birth {
        Some(date) => println!("  born:     {}", date),
        None => println!("  born:     -"),
    }
    Ok(())
}

pub async fn locations(state: &AppState, term: &str) -> anyhow::Result<()> {
    let search = state.location_search();
    match search.input(LocationField::Origin, term).await {
        LookupOutcome::Applied(0) => println!("No matching cities or airports."),
        LookupOutcome::Applied(_) => {
            for suggestion in search.suggestions(LocationField::Origin).await {
                println!("{:<8} {}", format!("{:?}", suggestion.kind).to_lowercase(), suggestion.display_name);
            }
        }
        LookupOutcome::Cleared => println!("Type at least two characters to search."),
        LookupOutcome::Superseded => {}
        LookupOutcome::Failed(message) => return Err(anyhow!(message)),
    }
    Ok(())
}

pub async fn menu(state: &AppState) -> anyhow::Result<()> {
    let menu = state.flights().flight_menu().await.map_err(|e| anyhow!(e.user_message()))?;
    println!("Today: {}", menu.today);
    println!("Airports:");
    for airport in &menu.airports {
        match &airport.city {
            Some(city) => println!("  {} {} ({})", airport.iata_code, airport.name, city),
            None => println!("  {} {}", airport.iata_code, airport.name),
        }
    }
    println!("Airlines:");
    for airline in &menu.airlines {
        println!("  {} {}", airline.code, airline.name);
    }
    Ok(())
}

pub async fn flights(state: &AppState, date: NaiveDate, from: &str, to: &str) -> anyhow::Result<()> {
    let flights = list_flights_on(state.flights().as_ref(), date, from, to)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    if flights.is_empty() {
        println!("{}", FeedNotice::NoFlightsFound.message());
    }
    flights.iter().for_each(print_flight);
    Ok(())
}

pub async fn search(
    state: &AppState,
    from: &str,
    to: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    pages: u32,
) -> anyhow::Result<()> {
    let feed = state.results_feed();
    let query = SearchQuery::new(from, to).with_dates(start, end);
    info!("Searching {} for {}", query.date_range.label(), query.origin_term());

    feed.search(query).await.map_err(|e| anyhow!(e.user_message()))?;
    for _ in 1..pages {
        if !feed.has_more().await {
            break;
        }
        feed.load_more().await;
    }
    print_feed(&feed.flights().await, feed.notice().await)
}

pub async fn discover(state: &AppState, pages: u32) -> anyhow::Result<()> {
    let feed = state.results_feed();
    for _ in 0..pages.max(1) {
        feed.load_more().await;
    }
    print_feed(&feed.flights().await, feed.notice().await)
}

pub async fn book(state: &AppState, args: BookArgs) -> anyhow::Result<()> {
    let flight = state
        .flights()
        .flight_detail(args.flight)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    let controller = state.booking();

    {
        let workflow = controller.workflow();
        let mut workflow = workflow.lock().await;
        workflow
            .select_flight(flight, args.class)
            .map_err(|e| anyhow!(e.user_message()))?;

        if let Some(user) = state.session.current_user().await {
            workflow.prefill_from(&user).map_err(|e| anyhow!(e.user_message()))?;
        }

        let passenger = workflow.passenger_mut().map_err(|e| anyhow!(e.user_message()))?;
        let fields = [
            (&mut passenger.first_name, args.first_name),
            (&mut passenger.last_name, args.last_name),
            (&mut passenger.email, args.email),
            (&mut passenger.phone_number, args.phone),
            (&mut passenger.area_code, args.area_code),
            (&mut passenger.id_number, args.id_number),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        passenger.id_type = args.id_type;
        if args.birthdate.is_some() {
            passenger.birthdate = args.birthdate;
        }
        workflow.continue_to_payment().map_err(|e| anyhow!(e.user_message()))?;

        let payment = workflow.payment_mut().map_err(|e| anyhow!(e.user_message()))?;
        payment.cardholder_name = args.card_name;
        payment.card_number = Masked::new(args.card_number);
        payment.expiry = args.expiry;
        payment.cvc = Masked::new(args.cvc);
    }

    match controller.submit().await.map_err(|e| anyhow!(e.user_message()))? {
        SubmissionOutcome::Confirmed { ticket, redirect_after } => {
            println!("Booking confirmed!");
            print_ticket(&ticket);
            if state.session.is_authenticated().await {
                println!("Opening your tickets...");
                tokio::time::sleep(redirect_after).await;
                return tickets(state, None).await;
            }
            Ok(())
        }
        SubmissionOutcome::Failed { message } => Err(anyhow!(message)),
        SubmissionOutcome::Ignored => Ok(()),
    }
}

pub async fn tickets(state: &AppState, ticket_number: Option<&str>) -> anyhow::Result<()> {
    let desk = state.ticket_desk();
    match ticket_number {
        Some(number) => {
            let ticket = desk.get(number).await.map_err(|e| anyhow!(e.user_message()))?;
            print_ticket(&ticket);
        }
        None => {
            let tickets = desk.list().await.map_err(|e| anyhow!(e.user_message()))?;
            if tickets.is_empty() {
                println!("You have no tickets yet.");
            }
            tickets.iter().for_each(print_ticket);
        }
    }
    Ok(())
}

pub async fn pay(state: &AppState, ticket_number: &str, points: bool) -> anyhow::Result<()> {
    let method = if points { PaymentMethod::Points } else { PaymentMethod::Cash };
    let receipt = state
        .ticket_desk()
        .pay(ticket_number, method)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", receipt.message.as_deref().unwrap_or("Payment processed."));
    Ok(())
}

pub async fn checkin(state: &AppState, ticket_number: &str) -> anyhow::Result<()> {
    let receipt = state
        .ticket_desk()
        .check_in(ticket_number)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", receipt.message.as_deref().unwrap_or("Checked in."));
    Ok(())
}

pub async fn cancel(state: &AppState, ticket_number: &str) -> anyhow::Result<()> {
    let receipt = state
        .ticket_desk()
        .cancel(ticket_number)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", receipt.message.as_deref().unwrap_or("Ticket cancelled."));
    Ok(())
}

fn print_feed(flights: &[FlightSummary], notice: Option<FeedNotice>) -> anyhow::Result<()> {
    flights.iter().for_each(print_flight);
    match notice {
        Some(notice) if notice.is_error() => Err(anyhow!(notice.message().to_string())),
        Some(notice) => {
            println!("{}", notice.message());
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_flight(flight: &FlightSummary) {
    let id = flight
        .bookable_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let date = flight.date.map(|d| d.to_string()).unwrap_or_default();
    let economy = flight
        .price_for(FlightClass::Economy)
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "#{:<6} {:<8} {:<12} {:<10} {:?} from {}",
        id,
        flight.flight_number,
        flight.route_label(),
        date,
        flight.status,
        economy
    );
}

fn print_ticket(ticket: &TicketRecord) {
    println!(
        "Ticket {} | PNR {} | seat {} | {:?} | payment {:?}",
        ticket.ticket_number,
        ticket.pnr,
        ticket.seat_number.as_deref().unwrap_or("-"),
        ticket.checkin_status,
        ticket.payment_status()
    );
}
