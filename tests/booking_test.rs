mod common;

use anyhow::Result;
use common::{
    bookings_path, empty_service, flights_path, read_bookings, read_flights, seats,
    test_service, test_service_with,
};
use flightbook::application::AppError;
use flightbook::domain::{ServiceSelection, format_dollars};
use flightbook::storage::LedgerFormat;

#[tokio::test]
async fn test_book_seat_without_services() -> Result<()> {
    let (service, temp) = test_service()?;

    let result = service.book_seat("AA100", "12A", None).await?;

    assert_eq!(result.position, 0);
    assert_eq!(result.booking.destination, "New York");
    assert_eq!(read_bookings(&temp), "AA100 - New York: 12A\n");
    assert!(!read_bookings(&temp).contains('|'));

    let flight = service.get_flight("AA100").await?;
    assert_eq!(flight.seats, seats(&["12B", "14C"]));

    Ok(())
}

#[tokio::test]
async fn test_book_seat_normalizes_input() -> Result<()> {
    let (service, temp) = test_service()?;

    service.book_seat(" aa100 ", "12b ", None).await?;

    assert_eq!(read_bookings(&temp), "AA100 - New York: 12B\n");
    Ok(())
}

#[tokio::test]
async fn test_book_seat_with_services_records_cost() -> Result<()> {
    let (service, temp) = test_service()?;

    let selection = service.select_services(Some("F2"), Some("D4"), None)?;
    let result = service.book_seat("BA200", "1B", selection).await?;

    assert_eq!(result.booking.cost_cents(), Some(1150));
    assert_eq!(format_dollars(result.booking.cost_cents().unwrap()), "$11.50");
    assert_eq!(
        read_bookings(&temp),
        "BA200 - London: 1B | SERVICES:F2,D4,C0 | COST:$11.50\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_booking_rewrites_inventory() -> Result<()> {
    let (service, temp) = test_service()?;

    service.book_seat("AA100", "14C", None).await?;

    assert_eq!(
        read_flights(&temp),
        "AA100 - New York: [12A, 12B]\nBA200 - London: [1A, 1B]\nCC300 - Paris: []\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_seat_can_only_be_booked_once() -> Result<()> {
    let (service, temp) = test_service()?;

    service.book_seat("BA200", "1A", None).await?;
    let ledger_before = read_bookings(&temp);

    let result = service.book_seat("BA200", "1A", None).await;

    assert!(matches!(result, Err(AppError::SeatUnavailable { .. })));
    assert_eq!(read_bookings(&temp), ledger_before);
    assert_eq!(service.list_bookings().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_inventory_seat_is_booked_once() -> Result<()> {
    let (service, temp) = test_service()?;
    std::fs::write(flights_path(&temp), "AA100 - New York: [1A, 1A]\n")?;

    service.book_seat("AA100", "1A", None).await?;
    let second = service.book_seat("AA100", "1A", None).await;

    assert!(matches!(second, Err(AppError::SeatUnavailable { .. })));
    assert_eq!(read_bookings(&temp), "AA100 - New York: 1A\n");
    assert_eq!(read_flights(&temp), "AA100 - New York: []\n");

    Ok(())
}

#[tokio::test]
async fn test_flight_with_pipe_in_line_is_not_bookable() -> Result<()> {
    let (service, temp) = test_service()?;
    let inventory = "AA100 - New York | JFK: [1A]\nBA200 - London: [1A]\n";
    std::fs::write(flights_path(&temp), inventory)?;

    let result = service.book_seat("AA100", "1A", None).await;

    assert!(matches!(result, Err(AppError::FlightNotFound(_))));
    assert_eq!(read_flights(&temp), inventory);
    assert_eq!(read_bookings(&temp), "");

    // Every booking that is written can be read back and cancelled.
    let booked = service.book_seat("BA200", "1A", None).await?;
    assert!(service.cancel_booking(booked.position).await?.seat_restored);

    Ok(())
}

#[tokio::test]
async fn test_invalid_flight_is_rejected_without_writes() -> Result<()> {
    let (service, temp) = test_service()?;

    let result = service.book_seat("ZZ999", "1A", None).await;

    assert!(matches!(result, Err(AppError::FlightNotFound(ref n)) if n == "ZZ999"));
    assert_eq!(read_flights(&temp), common::INVENTORY);
    assert!(!bookings_path(&temp).exists());

    Ok(())
}

#[tokio::test]
async fn test_full_flight_rejects_booking() -> Result<()> {
    let (service, _temp) = test_service()?;

    let result = service.book_seat("CC300", "1A", None).await;
    assert!(matches!(result, Err(AppError::SeatUnavailable { .. })));

    Ok(())
}

#[tokio::test]
async fn test_unknown_service_code_is_rejected_before_reserving() -> Result<()> {
    let (service, temp) = test_service()?;

    let result = service
        .book_seat("AA100", "12A", Some(ServiceSelection::new("F2", "D9", "C0")))
        .await;

    assert!(matches!(result, Err(AppError::UnknownServiceCode { .. })));
    assert_eq!(read_flights(&temp), common::INVENTORY);
    assert_eq!(read_bookings(&temp), "");

    Ok(())
}

#[tokio::test]
async fn test_empty_inventory_rejects_every_booking() -> Result<()> {
    let (service, _temp) = empty_service()?;

    assert!(service.list_flights().await?.is_empty());
    for (flight, seat) in [("AA100", "12A"), ("BA200", "1A"), ("", "")] {
        let err = service.book_seat(flight, seat, None).await.unwrap_err();
        assert!(matches!(err, AppError::FlightNotFound(_)));
        assert!(err.to_string().starts_with("Invalid flight number"));
    }

    Ok(())
}

#[tokio::test]
async fn test_failed_ledger_append_releases_seat() -> Result<()> {
    let (service, temp) = test_service()?;
    // A directory where the ledger file should be makes every append fail.
    std::fs::create_dir(bookings_path(&temp))?;

    let result = service.book_seat("AA100", "12B", None).await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(read_flights(&temp), common::INVENTORY);
    let flight = service.get_flight("AA100").await?;
    assert!(flight.has_seat("12B"));

    Ok(())
}

#[tokio::test]
async fn test_jsonl_bookings_get_stable_ids() -> Result<()> {
    let (service, temp) = test_service_with(LedgerFormat::Jsonl)?;

    let first = service.book_seat("AA100", "12A", None).await?;
    let second = service
        .book_seat(
            "AA100",
            "12B",
            service.select_services(None, None, Some("C4"))?,
        )
        .await?;

    let first_id = first.booking.id.expect("jsonl booking has an id");
    let second_id = second.booking.id.expect("jsonl booking has an id");
    assert_ne!(first_id, second_id);

    let content = read_bookings(&temp);
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains(&first_id.to_string()));

    let entries = service.list_bookings().await?;
    assert_eq!(entries[1].booking.as_ref().unwrap().id, Some(second_id));
    assert_eq!(entries[1].booking.as_ref().unwrap().cost_cents(), Some(750));

    Ok(())
}

#[tokio::test]
async fn test_text_bookings_have_no_ids() -> Result<()> {
    let (service, _temp) = test_service()?;

    let result = service.book_seat("AA100", "12A", None).await?;
    assert!(result.booking.id.is_none());

    Ok(())
}

#[tokio::test]
async fn test_concurrent_bookings_for_same_seat() -> Result<()> {
    let (service, _temp) = test_service()?;

    let (a, b) = tokio::join!(
        service.book_seat("BA200", "1A", None),
        service.book_seat("BA200", "1A", None)
    );

    assert!(a.is_ok() != b.is_ok(), "exactly one booking must win");
    assert_eq!(service.list_bookings().await?.len(), 1);
    assert_eq!(service.get_flight("BA200").await?.seats, seats(&["1B"]));

    Ok(())
}
